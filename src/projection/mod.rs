//! Read-side projections folded from master opening values and the voucher
//! stream. Nothing here writes.

pub mod inventory;
pub mod ledger;
pub mod outstanding;

pub use inventory::*;
pub use ledger::*;
pub use outstanding::*;
