//! Core types and data structures for the metal accounting engine

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::masters::fields::FieldValue;
use crate::utils::rounding::{
    currency_serde, opt_currency_serde, opt_weight_serde, weight_serde,
};

/// Authenticated caller identity supplied by the surrounding web layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side of a party balance a value applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceSide {
    /// Debit - the party owes us
    Dr,
    /// Credit - we owe the party
    Cr,
}

impl BalanceSide {
    /// The other side
    pub fn opposite(self) -> Self {
        match self {
            BalanceSide::Dr => BalanceSide::Cr,
            BalanceSide::Cr => BalanceSide::Dr,
        }
    }

    /// Convert an unsigned amount on this side into the signed accumulator
    /// convention used by every fold: Dr positive, Cr negative.
    pub fn signed(self, amount: &BigDecimal) -> BigDecimal {
        match self {
            BalanceSide::Dr => amount.clone(),
            BalanceSide::Cr => BigDecimal::from(0) - amount,
        }
    }

    /// Split a signed accumulator value back into (magnitude, side).
    /// Zero is reported as Dr.
    pub fn split(signed: &BigDecimal) -> (BigDecimal, BalanceSide) {
        if *signed < BigDecimal::from(0) {
            (signed.abs(), BalanceSide::Cr)
        } else {
            (signed.clone(), BalanceSide::Dr)
        }
    }
}

/// Account group classification used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountGroupType {
    Asset,
    Liability,
    Income,
    Expense,
}

impl AccountGroupType {
    /// Returns the side on which balances of parties in this group normally sit
    pub fn normal_balance(&self) -> BalanceSide {
        match self {
            AccountGroupType::Asset | AccountGroupType::Expense => BalanceSide::Dr,
            AccountGroupType::Liability | AccountGroupType::Income => BalanceSide::Cr,
        }
    }
}

/// Group that parties are classified under (Sundry Debtors, Karigars, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountGroup {
    pub id: String,
    /// Unique across all groups
    pub name: String,
    pub group_type: AccountGroupType,
    pub description: Option<String>,
    pub created_by: Actor,
    pub created_at: NaiveDateTime,
}

/// Input for creating or updating an account group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInput {
    pub name: String,
    pub group_type: AccountGroupType,
    #[serde(default)]
    pub description: Option<String>,
}

/// Metal an item is made of. Open set, unknown metals go in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
    Other(String),
}

/// Unit an item is counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockUnit {
    Piece,
    Gram,
    Carat,
}

/// Opening stock of an item in fine grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningStock {
    #[serde(with = "weight_serde")]
    pub weight: BigDecimal,
}

/// Tradable metal item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Unique across all items
    pub name: String,
    pub metal: Metal,
    /// Touch, percent
    pub purity: BigDecimal,
    pub unit: StockUnit,
    pub opening_stock: OpeningStock,
    #[serde(default, with = "opt_weight_serde")]
    pub min_stock_level: Option<BigDecimal>,
    #[serde(default, with = "opt_weight_serde")]
    pub max_stock_level: Option<BigDecimal>,
    /// Values for the configured item field schema
    pub custom_fields: BTreeMap<String, FieldValue>,
    pub created_by: Actor,
    pub created_at: NaiveDateTime,
}

/// Input for creating or updating an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInput {
    pub name: String,
    pub metal: Metal,
    pub purity: BigDecimal,
    pub unit: StockUnit,
    pub opening_stock: OpeningStock,
    #[serde(default)]
    pub min_stock_level: Option<BigDecimal>,
    #[serde(default)]
    pub max_stock_level: Option<BigDecimal>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, FieldValue>,
}

/// Kind of counterparty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyType {
    Customer,
    Supplier,
    /// Goldsmith doing job work on issued metal
    Karigar,
    Other,
}

/// Opening metal balance, fine grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalBalance {
    #[serde(with = "weight_serde")]
    pub weight: BigDecimal,
    pub side: BalanceSide,
}

/// Opening cash balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashBalance {
    #[serde(with = "currency_serde")]
    pub value: BigDecimal,
    pub side: BalanceSide,
}

/// Opening balance of a party in both units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningBalance {
    pub metal: MetalBalance,
    pub cash: CashBalance,
}

impl OpeningBalance {
    /// Zero metal and zero cash
    pub fn zero() -> Self {
        Self {
            metal: MetalBalance {
                weight: BigDecimal::from(0),
                side: BalanceSide::Dr,
            },
            cash: CashBalance {
                value: BigDecimal::from(0),
                side: BalanceSide::Dr,
            },
        }
    }

    /// Signed metal weight, Dr positive
    pub fn signed_metal(&self) -> BigDecimal {
        self.metal.side.signed(&self.metal.weight)
    }

    /// Signed cash value, Dr positive
    pub fn signed_cash(&self) -> BigDecimal {
        self.cash.side.signed(&self.cash.value)
    }
}

/// Contact details of a party
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Counterparty: customer, supplier or karigar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    /// Unique across all parties
    pub unique_name: String,
    pub group_id: String,
    pub party_type: PartyType,
    pub contact: Contact,
    /// Fixed at creation, never touched by voucher posting
    pub opening_balance: OpeningBalance,
    /// Date the opening balance is effective from
    pub wef_date: NaiveDate,
    pub created_by: Actor,
    pub created_at: NaiveDateTime,
}

/// Input for creating or updating a party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyInput {
    pub name: String,
    pub unique_name: String,
    pub group_id: String,
    pub party_type: PartyType,
    #[serde(default)]
    pub contact: Contact,
    pub opening_balance: OpeningBalance,
    pub wef_date: NaiveDate,
}

/// Voucher types recorded by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    /// We sell metal to the party
    Sales,
    /// We buy metal from the party
    Purchase,
    /// Metal issued to a karigar for job work
    Issue,
    /// Metal or cash received from the party
    Receipt,
}

/// One line of a voucher as entered by the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherLineInput {
    pub item_id: String,
    pub gross_weight: BigDecimal,
    #[serde(default = "zero")]
    pub less_weight: BigDecimal,
    /// Defaults to the item's purity when absent
    #[serde(default)]
    pub purity: Option<BigDecimal>,
    #[serde(default = "zero")]
    pub wastage: BigDecimal,
    #[serde(default = "zero")]
    pub labour_rate: BigDecimal,
}

/// Voucher as submitted for posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherInput {
    /// Assigned by the engine when absent
    #[serde(default)]
    pub voucher_no: Option<String>,
    pub date: NaiveDate,
    pub voucher_type: VoucherType,
    pub party_id: String,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub lines: Vec<VoucherLineInput>,
    /// Currency per fine gram, used by bhav cutting
    #[serde(default)]
    pub metal_rate: Option<BigDecimal>,
    #[serde(default = "zero")]
    pub bhav_cutting_weight: BigDecimal,
    #[serde(default = "zero")]
    pub cash_received: BigDecimal,
}

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

/// Posted voucher line with every derived field populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherLine {
    pub item_id: String,
    #[serde(with = "weight_serde")]
    pub gross_weight: BigDecimal,
    #[serde(with = "weight_serde")]
    pub less_weight: BigDecimal,
    #[serde(with = "weight_serde")]
    pub net_weight: BigDecimal,
    pub purity: BigDecimal,
    pub wastage: BigDecimal,
    #[serde(with = "weight_serde")]
    pub fine_weight: BigDecimal,
    #[serde(with = "currency_serde")]
    pub labour_rate: BigDecimal,
    #[serde(with = "currency_serde")]
    pub labour_amount: BigDecimal,
    #[serde(with = "currency_serde")]
    pub line_amount: BigDecimal,
}

/// Posted, immutable voucher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: String,
    pub voucher_no: String,
    /// Posting sequence assigned by storage, strictly increasing
    pub sequence: u64,
    pub date: NaiveDate,
    pub voucher_type: VoucherType,
    pub party_id: String,
    pub narration: String,
    pub lines: Vec<VoucherLine>,
    #[serde(default, with = "opt_currency_serde")]
    pub metal_rate: Option<BigDecimal>,
    #[serde(with = "weight_serde")]
    pub bhav_cutting_weight: BigDecimal,
    #[serde(with = "currency_serde")]
    pub bhav_cutting_amount: BigDecimal,
    #[serde(with = "currency_serde")]
    pub cash_received: BigDecimal,
    /// Set when this voucher reverses an earlier one
    pub reversal_of: Option<String>,
    pub created_by: Actor,
    pub created_at: NaiveDateTime,
}

impl Voucher {
    /// Whether the voucher carries a bhav cutting leg
    pub fn has_bhav_cutting(&self) -> bool {
        self.bhav_cutting_weight > BigDecimal::from(0)
    }

    /// Total fine weight across all lines
    pub fn total_fine_weight(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.fine_weight).sum()
    }

    /// Total line amount across all lines
    pub fn total_line_amount(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.line_amount).sum()
    }
}

/// Filter for voucher listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoucherFilter {
    pub party_id: Option<String>,
    pub voucher_type: Option<VoucherType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl VoucherFilter {
    pub fn matches(&self, voucher: &Voucher) -> bool {
        self.party_id
            .as_deref()
            .is_none_or(|p| voucher.party_id == p)
            && self.voucher_type.is_none_or(|t| voucher.voucher_type == t)
            && self.from.is_none_or(|d| voucher.date >= d)
            && self.to.is_none_or(|d| voucher.date <= d)
    }
}

/// Kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Group,
    Item,
    Party,
    Voucher,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Group => "account group",
            EntityKind::Item => "item",
            EntityKind::Party => "party",
            EntityKind::Voucher => "voucher",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the accounting engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },
    #[error("Reference error on {entity} '{id}': {message}")]
    Reference {
        entity: EntityKind,
        id: String,
        message: String,
    },
    #[error("{entity} '{id}' is still referenced by a {referenced_by}")]
    InUse {
        entity: EntityKind,
        id: String,
        referenced_by: EntityKind,
    },
    #[error("Conflict: {entity} '{key}' already exists")]
    Conflict { entity: EntityKind, key: String },
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },
    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn reference(entity: EntityKind, id: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Reference {
            entity,
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn in_use(entity: EntityKind, id: impl Into<String>, referenced_by: EntityKind) -> Self {
        EngineError::InUse {
            entity,
            id: id.into(),
            referenced_by,
        }
    }

    pub fn conflict(entity: EntityKind, key: impl Into<String>) -> Self {
        EngineError::Conflict {
            entity,
            key: key.into(),
        }
    }

    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Error category, for callers that translate errors into responses
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::Reference { .. } | EngineError::InUse { .. } => ErrorKind::Reference,
            EngineError::Conflict { .. } => ErrorKind::Conflict,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// HTTP status the web boundary reports. A missing reference on a write
    /// is 404, a delete blocked by existing references is 409.
    pub fn http_status(&self) -> u16 {
        match self {
            EngineError::Validation { .. } => 400,
            EngineError::Reference { .. } | EngineError::NotFound { .. } => 404,
            EngineError::InUse { .. } | EngineError::Conflict { .. } => 409,
            EngineError::Storage(_) => 500,
        }
    }
}

/// Error categories. None of them are retryable by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Reference,
    Conflict,
    NotFound,
    Storage,
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
