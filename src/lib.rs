//! # Metal Accounts
//!
//! Accounting engine for jewellery and bullion traders, where every party
//! carries two balances at once: fine metal in grams and cash.
//!
//! ## Features
//!
//! - **Masters**: account groups, items with a configurable custom field schema, and parties with fixed opening balances
//! - **Vouchers**: sales, purchase, issue and receipt with fine weight, wastage and labour computed per line
//! - **Bhav cutting**: converting a metal balance into cash at a fixed rate inside a voucher
//! - **Reversals**: posted vouchers are immutable and corrected by a reversing voucher
//! - **Projections**: party ledgers with running balances, stock positions and outstanding reports, folded at read time
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use metal_accounts::{Accounts, Actor, MemoryStorage};
//!
//! let accounts = Accounts::new(MemoryStorage::new());
//! let actor = Actor::new("counter-1");
//! // accounts.create_group(..., &actor).await?;
//! # let _ = (accounts, actor);
//! ```

pub mod accounts;
pub mod config;
#[cfg(feature = "http")]
pub mod http;
pub mod masters;
pub mod projection;
pub mod traits;
pub mod types;
pub mod utils;
pub mod voucher;

// Re-export commonly used types
pub use accounts::Accounts;
pub use crate::config::EngineConfig;
pub use masters::fields::{FieldDefinition, FieldKind, FieldValue};
pub use projection::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_storage::MemoryStorage;
pub use voucher::{StockFlow, VoucherBuilder, VoucherEngine};
