/// A signed quantity, as carried on the wire and in `MarketUpdate`. Resting
/// order quantity is narrowed to `i32` once it lives in an `OrderNode`
/// (`pool.rs`); this wider newtype is for updates flowing in off the feed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(i64);

impl Quantity {
    pub fn define(quantity: i64) -> Self {
        Self(quantity)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Quantity {
    fn from(v: i64) -> Self {
        Self(v)
    }
}
