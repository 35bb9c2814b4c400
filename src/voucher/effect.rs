//! Per voucher type effect table
//!
//! Every Dr/Cr and stock direction used by the projectors is derived here.
//! Adding a voucher type means adding a row to [`VoucherType::effect`].

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::rounding::{round_currency, round_weight};

/// Direction stock moves for the lines of a voucher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockFlow {
    In,
    Out,
}

impl StockFlow {
    pub fn opposite(self) -> Self {
        match self {
            StockFlow::In => StockFlow::Out,
            StockFlow::Out => StockFlow::In,
        }
    }
}

/// How a voucher's lines move the party's balances and our stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherEffect {
    /// Side the line fine weight posts to, if any
    pub line_metal: Option<BalanceSide>,
    /// Side the line amount posts to, if any
    pub line_cash: Option<BalanceSide>,
    pub stock: StockFlow,
}

/// Cash received from the party, on any voucher type
pub const CASH_RECEIVED_SIDE: BalanceSide = BalanceSide::Cr;
/// Bhav cutting settles metal owed into cash owed: credit metal...
pub const BHAV_METAL_SIDE: BalanceSide = BalanceSide::Cr;
/// ...and debit cash
pub const BHAV_CASH_SIDE: BalanceSide = BalanceSide::Dr;

impl VoucherType {
    /// Effect table
    pub const fn effect(self) -> VoucherEffect {
        match self {
            VoucherType::Sales => VoucherEffect {
                line_metal: Some(BalanceSide::Dr),
                line_cash: Some(BalanceSide::Dr),
                stock: StockFlow::Out,
            },
            VoucherType::Purchase => VoucherEffect {
                line_metal: Some(BalanceSide::Cr),
                line_cash: Some(BalanceSide::Cr),
                stock: StockFlow::In,
            },
            VoucherType::Issue => VoucherEffect {
                line_metal: Some(BalanceSide::Dr),
                line_cash: None,
                stock: StockFlow::Out,
            },
            VoucherType::Receipt => VoucherEffect {
                line_metal: Some(BalanceSide::Cr),
                line_cash: None,
                stock: StockFlow::In,
            },
        }
    }
}

/// Dr and Cr totals one voucher posts to its party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyMovement {
    pub metal_dr: BigDecimal,
    pub metal_cr: BigDecimal,
    pub cash_dr: BigDecimal,
    pub cash_cr: BigDecimal,
}

impl PartyMovement {
    fn zero() -> Self {
        let weight = round_weight(&BigDecimal::from(0));
        let cash = round_currency(&BigDecimal::from(0));
        Self {
            metal_dr: weight.clone(),
            metal_cr: weight,
            cash_dr: cash.clone(),
            cash_cr: cash,
        }
    }

    fn metal(&mut self, side: BalanceSide, weight: &BigDecimal) {
        match side {
            BalanceSide::Dr => self.metal_dr += weight,
            BalanceSide::Cr => self.metal_cr += weight,
        }
    }

    fn cash(&mut self, side: BalanceSide, amount: &BigDecimal) {
        match side {
            BalanceSide::Dr => self.cash_dr += amount,
            BalanceSide::Cr => self.cash_cr += amount,
        }
    }

    /// Metal Dr − Cr
    pub fn net_metal(&self) -> BigDecimal {
        &self.metal_dr - &self.metal_cr
    }

    /// Cash Dr − Cr
    pub fn net_cash(&self) -> BigDecimal {
        &self.cash_dr - &self.cash_cr
    }
}

/// Posting side after applying the reversal flag
fn oriented(side: BalanceSide, voucher: &Voucher) -> BalanceSide {
    if voucher.reversal_of.is_some() {
        side.opposite()
    } else {
        side
    }
}

/// Stock direction of a voucher's lines, reversal aware
pub fn stock_flow(voucher: &Voucher) -> StockFlow {
    let flow = voucher.voucher_type.effect().stock;
    if voucher.reversal_of.is_some() {
        flow.opposite()
    } else {
        flow
    }
}

/// Everything a voucher posts to its party: line legs from the effect table,
/// then cash received, then bhav cutting
pub fn party_movement(voucher: &Voucher) -> PartyMovement {
    let effect = voucher.voucher_type.effect();
    let mut movement = PartyMovement::zero();

    for line in &voucher.lines {
        if let Some(side) = effect.line_metal {
            movement.metal(oriented(side, voucher), &line.fine_weight);
        }
        if let Some(side) = effect.line_cash {
            movement.cash(oriented(side, voucher), &line.line_amount);
        }
    }

    if voucher.cash_received > BigDecimal::from(0) {
        movement.cash(oriented(CASH_RECEIVED_SIDE, voucher), &voucher.cash_received);
    }

    if voucher.has_bhav_cutting() {
        movement.metal(oriented(BHAV_METAL_SIDE, voucher), &voucher.bhav_cutting_weight);
        movement.cash(oriented(BHAV_CASH_SIDE, voucher), &voucher.bhav_cutting_amount);
    }

    movement
}
