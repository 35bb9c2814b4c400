//! Utility modules

pub mod memory_storage;
pub mod rounding;
pub mod validation;

pub use memory_storage::*;
pub use rounding::*;
pub use validation::*;
