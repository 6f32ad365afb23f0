pub mod customer;
pub mod prediction;

pub use customer::*;
pub use prediction::*;
