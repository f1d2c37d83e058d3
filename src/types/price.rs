/// A price expressed in ticks (integer, signed — the book never materializes
/// fractional prices; scaling to a currency unit is the caller's concern).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    pub fn define(price: i64) -> Self {
        Self(price)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Price {
    fn from(v: i64) -> Self {
        Self(v)
    }
}
