pub mod price;
pub mod quantity;
pub mod update;

pub use price::Price;
pub use quantity::Quantity;
pub use update::{MarketUpdate, OrderId, Side, UpdateKind};
