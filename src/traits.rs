//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::types::*;
use crate::utils::validation::{validate_narration, validate_voucher_no};

/// Storage abstraction for the accounting engine
///
/// Implementations (PostgreSQL, SQLite, in-memory, ...) own uniqueness and
/// referential integrity: every insert, update, delete and voucher append
/// must check its constraints and apply its change as one atomic step, so
/// concurrent callers can never slip a voucher in between a delete's
/// reference check and the delete itself.
#[async_trait]
pub trait AccountsStorage: Send + Sync {
    /// Insert a group. Conflict on a duplicate name.
    async fn insert_group(&self, group: &AccountGroup) -> EngineResult<()>;

    /// Get a group by ID
    async fn get_group(&self, group_id: &str) -> EngineResult<Option<AccountGroup>>;

    /// List all groups ordered by name
    async fn list_groups(&self) -> EngineResult<Vec<AccountGroup>>;

    /// Replace a group. NotFound if missing, Conflict if the new name is taken.
    async fn update_group(&self, group: &AccountGroup) -> EngineResult<()>;

    /// Delete a group that no party belongs to
    async fn delete_group(&self, group_id: &str) -> EngineResult<()>;

    /// Insert an item. Conflict on a duplicate name.
    async fn insert_item(&self, item: &Item) -> EngineResult<()>;

    /// Get an item by ID
    async fn get_item(&self, item_id: &str) -> EngineResult<Option<Item>>;

    /// List all items ordered by name
    async fn list_items(&self) -> EngineResult<Vec<Item>>;

    /// Replace an item. NotFound if missing, Conflict if the new name is taken.
    async fn update_item(&self, item: &Item) -> EngineResult<()>;

    /// Delete an item no voucher line references
    async fn delete_item(&self, item_id: &str) -> EngineResult<()>;

    /// Insert a party. Conflict on a duplicate unique name, Reference if the
    /// group does not exist.
    async fn insert_party(&self, party: &Party) -> EngineResult<()>;

    /// Get a party by ID
    async fn get_party(&self, party_id: &str) -> EngineResult<Option<Party>>;

    /// List all parties ordered by unique name
    async fn list_parties(&self) -> EngineResult<Vec<Party>>;

    /// Replace a party. Same constraints as insert.
    async fn update_party(&self, party: &Party) -> EngineResult<()>;

    /// Delete a party no voucher references
    async fn delete_party(&self, party_id: &str) -> EngineResult<()>;

    /// Allocate the next posting sequence. Strictly increasing, never reused.
    async fn next_sequence(&self) -> EngineResult<u64>;

    /// Append a posted voucher with all of its lines, or nothing.
    ///
    /// Rejects a duplicate voucher number (Conflict), a missing party or item
    /// (Reference), and a second reversal of the same voucher (Conflict).
    async fn append_voucher(&self, voucher: &Voucher) -> EngineResult<()>;

    /// Get a voucher by ID
    async fn get_voucher(&self, voucher_id: &str) -> EngineResult<Option<Voucher>>;

    /// Vouchers matching the filter, in ledger order
    async fn list_vouchers(&self, filter: &VoucherFilter) -> EngineResult<Vec<Voucher>>;

    /// The voucher reversing `voucher_id`, if one was posted
    async fn find_reversal(&self, voucher_id: &str) -> EngineResult<Option<Voucher>>;

    /// A party and every voucher referencing it, read from one snapshot
    async fn ledger_snapshot(&self, party_id: &str)
        -> EngineResult<Option<(Party, Vec<Voucher>)>>;

    /// All items and all vouchers, read from one snapshot
    async fn inventory_snapshot(&self) -> EngineResult<(Vec<Item>, Vec<Voucher>)>;

    /// All groups, parties and vouchers, read from one snapshot
    async fn outstanding_snapshot(
        &self,
    ) -> EngineResult<(Vec<AccountGroup>, Vec<Party>, Vec<Voucher>)>;
}

/// Trait for business rules applied to vouchers on top of the engine's own
/// arithmetic checks
pub trait VoucherValidator: Send + Sync {
    /// Validate a voucher before it is computed and posted
    fn validate_voucher(&self, input: &VoucherInput) -> EngineResult<()>;
}

/// Default voucher validator: voucher number format and narration length
pub struct DefaultVoucherValidator;

impl VoucherValidator for DefaultVoucherValidator {
    fn validate_voucher(&self, input: &VoucherInput) -> EngineResult<()> {
        if let Some(ref voucher_no) = input.voucher_no {
            validate_voucher_no(voucher_no)?;
        }
        validate_narration(&input.narration)
    }
}

/// Rejects vouchers dated after a cut-off, e.g. today's date at the counter
pub struct NoFutureDateValidator {
    pub today: chrono::NaiveDate,
}

impl VoucherValidator for NoFutureDateValidator {
    fn validate_voucher(&self, input: &VoucherInput) -> EngineResult<()> {
        DefaultVoucherValidator.validate_voucher(input)?;
        if input.date > self.today {
            return Err(EngineError::validation(
                "date",
                format!("{} is after {}", input.date, self.today),
            ));
        }
        Ok(())
    }
}
