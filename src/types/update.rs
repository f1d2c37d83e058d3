use crate::types::price::Price;
use crate::types::quantity::Quantity;

pub type OrderId = u64;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Bid = 0,
    Ask = 1,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Add = 0,
    Modify = 1,
    Cancel = 2,
}

/// The unit of input to `OrderBook::apply_update`. Trivially copyable; the
/// in-memory layout here is an implementation choice and is decoded from,
/// not identical to, the 48-byte wire record in `wire.rs`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MarketUpdate {
    pub timestamp: u64,
    pub kind: UpdateKind,
    pub order_id: OrderId,
    pub price: Price,
    pub qty: Quantity,
    pub side: Side,
}

impl MarketUpdate {
    pub fn new(
        timestamp: u64,
        kind: UpdateKind,
        order_id: OrderId,
        price: Price,
        qty: Quantity,
        side: Side,
    ) -> Self {
        Self {
            timestamp,
            kind,
            order_id,
            price,
            qty,
            side,
        }
    }
}
