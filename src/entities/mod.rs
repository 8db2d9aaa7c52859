//! Entity type definitions
//!
//! - [`Part`] - A stocked scaffolding article with dimensions, weight and quantity
//! - [`Withdrawal`] - A recorded removal of stock

pub mod part;
pub mod withdrawal;

pub use part::Part;
pub use withdrawal::Withdrawal;
