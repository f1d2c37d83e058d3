//! Thin wrapper around the market-data ring's producer side. Owns the
//! decode-to-push path so replay and network code never touch the ring
//! directly.

use crate::ring::SpscRing;
use crate::types::MarketUpdate;
use crate::wire::decode_record;
use arrayvec::ArrayVec;

/// Updates decoded from one `push_batch` call that didn't fit before the
/// ring filled up are collected here, capped at this many per call — a
/// caller driving a hot feed is expected to retry with a fresh batch
/// rather than let this grow unbounded.
const BATCH_SPILL_CAP: usize = 64;

pub struct FeedHandler<'a> {
    queue: &'a SpscRing<MarketUpdate>,
}

impl<'a> FeedHandler<'a> {
    pub fn new(queue: &'a SpscRing<MarketUpdate>) -> Self {
        Self { queue }
    }

    /// Push one already-decoded update. `false` if the ring is full.
    pub fn on_update(&self, u: MarketUpdate) -> bool {
        self.queue.push(u).is_ok()
    }

    /// Decode and push every complete record in `bytes`. Returns the
    /// number of records consumed (decoded, whether or not the ring
    /// accepted them) and the number of trailing bytes left unconsumed
    /// (a short tail, held back for the next call).
    pub fn on_batch(&self, bytes: &[u8]) -> (usize, usize) {
        let mut offset = 0;
        let mut decoded = 0;
        // Bounded scratch so the batch loop never allocates; once full it
        // drains to the ring before decoding continues.
        let mut spill: ArrayVec<MarketUpdate, BATCH_SPILL_CAP> = ArrayVec::new();

        while let Some((update, consumed)) = decode_record(&bytes[offset..]) {
            offset += consumed;
            decoded += 1;

            if spill.is_full() {
                self.drain_spill(&mut spill);
            }
            // capacity was just ensured above, so this cannot fail.
            let _ = spill.try_push(update);
        }

        self.drain_spill(&mut spill);
        (decoded, bytes.len() - offset)
    }

    fn drain_spill(&self, spill: &mut ArrayVec<MarketUpdate, BATCH_SPILL_CAP>) {
        for update in spill.drain(..) {
            while self.queue.push(update).is_err() {
                std::hint::spin_loop();
            }
        }
    }
}
