//! Construction-time errors. Hot-path operations never return `Result` —
//! they drop-and-continue per spec; only building a book, a ring or a
//! config can fail, and only before any trading activity starts.

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BookError {
    /// `min_price > max_price`.
    InvalidPriceRange { min_price: i64, max_price: i64 },
    /// `max_orders == 0`.
    ZeroCapacity,
    /// An SPSC ring capacity was not a power of two.
    RingCapacityNotPowerOfTwo { capacity: usize },
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::InvalidPriceRange { min_price, max_price } => write!(
                f,
                "invalid price range: min_price ({min_price}) > max_price ({max_price})"
            ),
            BookError::ZeroCapacity => write!(f, "max_orders must be greater than zero"),
            BookError::RingCapacityNotPowerOfTwo { capacity } => {
                write!(f, "ring capacity {capacity} is not a power of two")
            }
        }
    }
}

impl std::error::Error for BookError {}
