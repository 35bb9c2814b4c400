//! Party ledger projection
//!
//! A party's running balance is never stored. It is folded from the party's
//! signed opening balance and its vouchers in [`ledger_order`], so the same
//! stored state always yields the same ledger.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::rounding::{currency_serde, round_currency, round_weight, weight_serde};
use crate::voucher::{ledger_order, party_movement};

/// What a ledger row records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "voucher")]
pub enum LedgerEntry {
    /// The party's opening balance
    Opening,
    /// Opening balance plus every voucher before the start of the period
    BroughtForward,
    Voucher(Box<Voucher>),
}

/// One row of a party ledger with the running balance after it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub entry: LedgerEntry,
    #[serde(with = "weight_serde")]
    pub metal_dr: BigDecimal,
    #[serde(with = "weight_serde")]
    pub metal_cr: BigDecimal,
    /// Signed running metal balance, Dr positive
    #[serde(with = "weight_serde")]
    pub metal_balance: BigDecimal,
    #[serde(with = "currency_serde")]
    pub cash_dr: BigDecimal,
    #[serde(with = "currency_serde")]
    pub cash_cr: BigDecimal,
    /// Signed running cash balance, Dr positive
    #[serde(with = "currency_serde")]
    pub cash_balance: BigDecimal,
}

impl LedgerRow {
    /// Running metal balance as (weight, side)
    pub fn metal_side(&self) -> MetalBalance {
        let (weight, side) = BalanceSide::split(&self.metal_balance);
        MetalBalance { weight, side }
    }

    /// Running cash balance as (value, side)
    pub fn cash_side(&self) -> CashBalance {
        let (value, side) = BalanceSide::split(&self.cash_balance);
        CashBalance { value, side }
    }
}

/// Ledger of one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyLedger {
    pub party: Party,
    pub opening_balance: OpeningBalance,
    /// Opening (or brought forward) row first, then one row per voucher
    pub transactions: Vec<LedgerRow>,
}

impl PartyLedger {
    /// Last row of the ledger; there is always at least the opening row
    fn last(&self) -> Option<&LedgerRow> {
        self.transactions.last()
    }

    /// Signed closing metal balance, Dr positive
    pub fn closing_metal(&self) -> BigDecimal {
        self.last()
            .map(|r| r.metal_balance.clone())
            .unwrap_or_else(|| self.opening_balance.signed_metal())
    }

    /// Signed closing cash balance, Dr positive
    pub fn closing_cash(&self) -> BigDecimal {
        self.last()
            .map(|r| r.cash_balance.clone())
            .unwrap_or_else(|| self.opening_balance.signed_cash())
    }

    /// Closing balance in (magnitude, side) form
    pub fn closing_balance(&self) -> OpeningBalance {
        let (weight, metal_side) = BalanceSide::split(&self.closing_metal());
        let (value, cash_side) = BalanceSide::split(&self.closing_cash());
        OpeningBalance {
            metal: MetalBalance {
                weight,
                side: metal_side,
            },
            cash: CashBalance {
                value,
                side: cash_side,
            },
        }
    }
}

/// Fold a party's full voucher history into its ledger.
///
/// Vouchers for other parties are ignored; input order does not matter.
pub fn project_ledger(party: &Party, vouchers: &[Voucher]) -> PartyLedger {
    project_ledger_between(party, vouchers, None, None)
}

/// Fold a party's vouchers for a period.
///
/// Vouchers dated before `from` collapse into a brought-forward row dated
/// `from`; vouchers dated after `to` are left out.
pub fn project_ledger_between(
    party: &Party,
    vouchers: &[Voucher],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> PartyLedger {
    let mut ordered: Vec<&Voucher> = vouchers
        .iter()
        .filter(|v| v.party_id == party.id)
        .filter(|v| to.is_none_or(|to| v.date <= to))
        .collect();
    ordered.sort_by(|a, b| ledger_order(a, b));

    let mut metal_balance = round_weight(&party.opening_balance.signed_metal());
    let mut cash_balance = round_currency(&party.opening_balance.signed_cash());

    let zero_weight = round_weight(&BigDecimal::from(0));
    let zero_cash = round_currency(&BigDecimal::from(0));

    let (earlier, in_period): (Vec<&Voucher>, Vec<&Voucher>) = ordered
        .into_iter()
        .partition(|v| from.is_some_and(|from| v.date < from));

    for voucher in &earlier {
        let movement = party_movement(voucher);
        metal_balance += movement.net_metal();
        cash_balance += movement.net_cash();
    }

    let opening_row = match from {
        Some(from) => LedgerRow {
            date: from,
            entry: LedgerEntry::BroughtForward,
            metal_dr: zero_weight.clone(),
            metal_cr: zero_weight,
            metal_balance: metal_balance.clone(),
            cash_dr: zero_cash.clone(),
            cash_cr: zero_cash,
            cash_balance: cash_balance.clone(),
        },
        None => LedgerRow {
            date: party.wef_date,
            entry: LedgerEntry::Opening,
            metal_dr: zero_weight.clone(),
            metal_cr: zero_weight,
            metal_balance: metal_balance.clone(),
            cash_dr: zero_cash.clone(),
            cash_cr: zero_cash,
            cash_balance: cash_balance.clone(),
        },
    };

    let mut transactions = Vec::with_capacity(in_period.len() + 1);
    transactions.push(opening_row);

    for voucher in in_period {
        let movement = party_movement(voucher);
        metal_balance = &metal_balance + &movement.metal_dr - &movement.metal_cr;
        cash_balance = &cash_balance + &movement.cash_dr - &movement.cash_cr;

        transactions.push(LedgerRow {
            date: voucher.date,
            entry: LedgerEntry::Voucher(Box::new(voucher.clone())),
            metal_dr: movement.metal_dr,
            metal_cr: movement.metal_cr,
            metal_balance: metal_balance.clone(),
            cash_dr: movement.cash_dr,
            cash_cr: movement.cash_cr,
            cash_balance: cash_balance.clone(),
        });
    }

    PartyLedger {
        party: party.clone(),
        opening_balance: party.opening_balance.clone(),
        transactions,
    }
}
