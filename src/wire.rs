//! Fixed-size binary record decoder.
//!
//! Mirrors the "decoder" collaborator in the system overview: a pure
//! function mapping a 48-byte little-endian record prefix to one
//! `MarketUpdate`. Replay, file formats and mmap sources are out of scope —
//! this module only knows how to turn bytes already in memory into records.

use crate::types::{MarketUpdate, Price, Quantity, Side, UpdateKind};

/// Size in bytes of one wire record (see spec Section 6).
pub const RECORD_LEN: usize = 48;

/// Decode exactly one record from the front of `buf`.
///
/// Returns `(update, RECORD_LEN)` on success, or `None` if fewer than
/// `RECORD_LEN` bytes remain (short tail — signals end of stream, not an
/// error) or the record encodes an out-of-range `kind`/`side` byte.
pub fn decode_record(buf: &[u8]) -> Option<(MarketUpdate, usize)> {
    if buf.len() < RECORD_LEN {
        return None;
    }

    let timestamp = u64::from_le_bytes(buf[0..8].try_into().unwrap());
    let kind_raw = u32::from_le_bytes(buf[8..12].try_into().unwrap());
    let side_raw = u32::from_le_bytes(buf[12..16].try_into().unwrap());
    let order_id = u64::from_le_bytes(buf[16..24].try_into().unwrap());
    let price = i64::from_le_bytes(buf[24..32].try_into().unwrap());
    let qty = i64::from_le_bytes(buf[32..40].try_into().unwrap());
    // bytes 40..48 are reserved and ignored.

    let kind = match kind_raw {
        0 => UpdateKind::Add,
        1 => UpdateKind::Modify,
        2 => UpdateKind::Cancel,
        _ => return None,
    };
    let side = match side_raw {
        0 => Side::Bid,
        1 => Side::Ask,
        _ => return None,
    };

    let update = MarketUpdate::new(
        timestamp,
        kind,
        order_id,
        Price::define(price),
        Quantity::define(qty),
        side,
    );
    Some((update, RECORD_LEN))
}

/// Encode one record in the wire layout, for `generate_feed` and tests.
pub fn encode_record(u: &MarketUpdate) -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    out[0..8].copy_from_slice(&u.timestamp.to_le_bytes());
    out[8..12].copy_from_slice(&(u.kind as u32).to_le_bytes());
    out[12..16].copy_from_slice(&(u.side as u32).to_le_bytes());
    out[16..24].copy_from_slice(&u.order_id.to_le_bytes());
    out[24..32].copy_from_slice(&u.price.value().to_le_bytes());
    out[32..40].copy_from_slice(&u.qty.value().to_le_bytes());
    // 40..48 reserved, left zero.
    out
}
