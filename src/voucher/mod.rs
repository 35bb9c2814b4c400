//! Voucher module: line arithmetic, the per-type effect table and posting

pub mod builder;
pub mod effect;
pub mod engine;
pub mod line;

pub use builder::*;
pub use effect::*;
pub use engine::*;
pub use line::*;

use std::cmp::Ordering;

use crate::types::Voucher;

/// Total order every fold runs in: date, then voucher number, then posting
/// sequence
pub fn ledger_order(a: &Voucher, b: &Voucher) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.voucher_no.cmp(&b.voucher_no))
        .then_with(|| a.sequence.cmp(&b.sequence))
}
