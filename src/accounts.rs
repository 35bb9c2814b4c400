//! Main orchestrator that coordinates masters, vouchers and projections

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::masters::{GroupRegistry, ItemRegistry, PartyRegistry};
use crate::projection::*;
use crate::traits::*;
use crate::types::*;
use crate::voucher::VoucherEngine;

/// Dual-ledger accounting system for a metal trading business.
///
/// Every balance it reports is folded from the stored masters and vouchers
/// at read time. Clone the storage handle into as many `Accounts` as needed;
/// storage serializes the writes.
pub struct Accounts<S: AccountsStorage> {
    storage: S,
    groups: GroupRegistry<S>,
    items: ItemRegistry<S>,
    parties: PartyRegistry<S>,
    vouchers: VoucherEngine<S>,
}

impl<S: AccountsStorage + Clone> Accounts<S> {
    /// Create a new accounting system with the default configuration
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    /// Create a new accounting system with the given configuration
    pub fn with_config(storage: S, config: EngineConfig) -> Self {
        Self {
            groups: GroupRegistry::new(storage.clone()),
            items: ItemRegistry::new(storage.clone(), config.item_fields.clone()),
            parties: PartyRegistry::new(storage.clone()),
            vouchers: VoucherEngine::new(storage.clone(), config),
            storage,
        }
    }

    /// Create a new accounting system with a custom voucher validator
    pub fn with_validator(
        storage: S,
        config: EngineConfig,
        validator: Box<dyn VoucherValidator>,
    ) -> Self {
        Self {
            groups: GroupRegistry::new(storage.clone()),
            items: ItemRegistry::new(storage.clone(), config.item_fields.clone()),
            parties: PartyRegistry::new(storage.clone()),
            vouchers: VoucherEngine::with_validator(storage.clone(), config, validator),
            storage,
        }
    }
}

impl<S: AccountsStorage> Accounts<S> {
    // Account group operations
    /// Create a new account group
    pub async fn create_group(&self, input: GroupInput, actor: &Actor) -> EngineResult<AccountGroup> {
        self.groups.create_group(input, actor).await
    }

    /// Get an account group by ID
    pub async fn get_group(&self, group_id: &str) -> EngineResult<Option<AccountGroup>> {
        self.groups.get_group(group_id).await
    }

    /// List all account groups
    pub async fn list_groups(&self) -> EngineResult<Vec<AccountGroup>> {
        self.groups.list_groups().await
    }

    /// Update an account group
    pub async fn update_group(
        &self,
        group_id: &str,
        input: GroupInput,
        actor: &Actor,
    ) -> EngineResult<AccountGroup> {
        self.groups.update_group(group_id, input, actor).await
    }

    /// Delete an account group
    pub async fn delete_group(&self, group_id: &str, actor: &Actor) -> EngineResult<()> {
        self.groups.delete_group(group_id, actor).await
    }

    // Item operations
    /// Create a new item
    pub async fn create_item(&self, input: ItemInput, actor: &Actor) -> EngineResult<Item> {
        self.items.create_item(input, actor).await
    }

    /// Get an item by ID
    pub async fn get_item(&self, item_id: &str) -> EngineResult<Option<Item>> {
        self.items.get_item(item_id).await
    }

    /// List all items
    pub async fn list_items(&self) -> EngineResult<Vec<Item>> {
        self.items.list_items().await
    }

    /// Update an item
    pub async fn update_item(
        &self,
        item_id: &str,
        input: ItemInput,
        actor: &Actor,
    ) -> EngineResult<Item> {
        self.items.update_item(item_id, input, actor).await
    }

    /// Delete an item
    pub async fn delete_item(&self, item_id: &str, actor: &Actor) -> EngineResult<()> {
        self.items.delete_item(item_id, actor).await
    }

    // Party operations
    /// Create a new party
    pub async fn create_party(&self, input: PartyInput, actor: &Actor) -> EngineResult<Party> {
        self.parties.create_party(input, actor).await
    }

    /// Get a party by ID
    pub async fn get_party(&self, party_id: &str) -> EngineResult<Option<Party>> {
        self.parties.get_party(party_id).await
    }

    /// List all parties
    pub async fn list_parties(&self) -> EngineResult<Vec<Party>> {
        self.parties.list_parties().await
    }

    /// Update a party
    pub async fn update_party(
        &self,
        party_id: &str,
        input: PartyInput,
        actor: &Actor,
    ) -> EngineResult<Party> {
        self.parties.update_party(party_id, input, actor).await
    }

    /// Delete a party
    pub async fn delete_party(&self, party_id: &str, actor: &Actor) -> EngineResult<()> {
        self.parties.delete_party(party_id, actor).await
    }

    // Voucher operations
    /// Validate, compute and post a voucher
    pub async fn post_voucher(&self, input: VoucherInput, actor: &Actor) -> EngineResult<Voucher> {
        self.vouchers.post_voucher(input, actor).await
    }

    /// Post a voucher cancelling an earlier one
    pub async fn reverse_voucher(
        &self,
        voucher_id: &str,
        date: NaiveDate,
        narration: Option<String>,
        actor: &Actor,
    ) -> EngineResult<Voucher> {
        self.vouchers
            .reverse_voucher(voucher_id, date, narration, actor)
            .await
    }

    /// Get a voucher by ID
    pub async fn get_voucher(&self, voucher_id: &str) -> EngineResult<Option<Voucher>> {
        self.vouchers.get_voucher(voucher_id).await
    }

    /// Vouchers matching the filter, in ledger order
    pub async fn list_vouchers(&self, filter: &VoucherFilter) -> EngineResult<Vec<Voucher>> {
        self.vouchers.list_vouchers(filter).await
    }

    // Projections
    /// Full ledger of a party with running metal and cash balances
    #[instrument(skip(self))]
    pub async fn get_ledger(&self, party_id: &str) -> EngineResult<PartyLedger> {
        self.get_ledger_between(party_id, None, None).await
    }

    /// Ledger of a party for a period; earlier vouchers are brought forward
    #[instrument(skip(self))]
    pub async fn get_ledger_between(
        &self,
        party_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> EngineResult<PartyLedger> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(EngineError::validation(
                    "from",
                    format!("{} is after {}", from, to),
                ));
            }
        }

        let (party, vouchers) = self
            .storage
            .ledger_snapshot(party_id)
            .await?
            .ok_or_else(|| EngineError::not_found(EntityKind::Party, party_id))?;

        let ledger = project_ledger_between(&party, &vouchers, from, to);
        debug!(
            rows = ledger.transactions.len(),
            closing_metal = %ledger.closing_metal(),
            closing_cash = %ledger.closing_cash(),
            "ledger projected"
        );
        Ok(ledger)
    }

    /// Current stock of every item
    #[instrument(skip(self))]
    pub async fn get_inventory(&self) -> EngineResult<Vec<StockPosition>> {
        let (items, vouchers) = self.storage.inventory_snapshot().await?;
        let positions = project_inventory(&items, &vouchers);
        debug!(
            items = positions.len(),
            low = positions.iter().filter(|p| p.status.is_low()).count(),
            "inventory projected"
        );
        Ok(positions)
    }

    /// Current stock of one item
    #[instrument(skip(self))]
    pub async fn get_item_stock(&self, item_id: &str) -> EngineResult<StockPosition> {
        self.get_inventory()
            .await?
            .into_iter()
            .find(|p| p.item.id == item_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Item, item_id))
    }

    /// Closing balances of every party grouped by account group
    #[instrument(skip(self))]
    pub async fn get_outstanding(&self) -> EngineResult<Vec<GroupOutstanding>> {
        let (groups, parties, vouchers) = self.storage.outstanding_snapshot().await?;
        let report = project_outstanding(&groups, &parties, &vouchers);
        debug!(groups = report.len(), "outstanding projected");
        Ok(report)
    }
}
