//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;
use crate::voucher::ledger_order;

#[derive(Debug, Default)]
struct State {
    groups: HashMap<String, AccountGroup>,
    items: HashMap<String, Item>,
    parties: HashMap<String, Party>,
    vouchers: HashMap<String, Voucher>,
    /// voucher_no -> voucher id
    voucher_numbers: HashMap<String, String>,
    /// original voucher id -> reversing voucher id
    reversals: HashMap<String, String>,
    sequence: u64,
}

impl State {
    fn group_name_taken(&self, name: &str, except: &str) -> bool {
        self.groups
            .values()
            .any(|g| g.id != except && g.name == name)
    }

    fn item_name_taken(&self, name: &str, except: &str) -> bool {
        self.items.values().any(|i| i.id != except && i.name == name)
    }

    fn unique_name_taken(&self, unique_name: &str, except: &str) -> bool {
        self.parties
            .values()
            .any(|p| p.id != except && p.unique_name == unique_name)
    }

    fn check_party(&self, party: &Party) -> EngineResult<()> {
        if !self.groups.contains_key(&party.group_id) {
            return Err(EngineError::reference(
                EntityKind::Group,
                party.group_id.clone(),
                "account group does not exist",
            ));
        }
        if self.unique_name_taken(&party.unique_name, &party.id) {
            return Err(EngineError::conflict(
                EntityKind::Party,
                party.unique_name.clone(),
            ));
        }
        Ok(())
    }

    fn sorted_vouchers<'a>(&self, vouchers: impl Iterator<Item = &'a Voucher>) -> Vec<Voucher> {
        let mut list: Vec<Voucher> = vouchers.cloned().collect();
        list.sort_by(ledger_order);
        list
    }
}

/// In-memory storage implementation for testing and development.
///
/// All state sits behind one lock: each write checks its constraints and
/// applies its change in a single critical section, and each read sees a
/// consistent snapshot. Clones share the same state.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    state: Arc<RwLock<State>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> EngineResult<()> {
        *self.write()? = State::default();
        Ok(())
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| EngineError::Storage("state lock poisoned".to_string()))
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| EngineError::Storage("state lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountsStorage for MemoryStorage {
    async fn insert_group(&self, group: &AccountGroup) -> EngineResult<()> {
        let mut state = self.write()?;
        if state.groups.contains_key(&group.id) || state.group_name_taken(&group.name, &group.id) {
            return Err(EngineError::conflict(EntityKind::Group, group.name.clone()));
        }
        state.groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> EngineResult<Option<AccountGroup>> {
        Ok(self.read()?.groups.get(group_id).cloned())
    }

    async fn list_groups(&self) -> EngineResult<Vec<AccountGroup>> {
        let mut groups: Vec<AccountGroup> = self.read()?.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn update_group(&self, group: &AccountGroup) -> EngineResult<()> {
        let mut state = self.write()?;
        if !state.groups.contains_key(&group.id) {
            return Err(EngineError::not_found(EntityKind::Group, group.id.clone()));
        }
        if state.group_name_taken(&group.name, &group.id) {
            return Err(EngineError::conflict(EntityKind::Group, group.name.clone()));
        }
        state.groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn delete_group(&self, group_id: &str) -> EngineResult<()> {
        let mut state = self.write()?;
        if !state.groups.contains_key(group_id) {
            return Err(EngineError::not_found(EntityKind::Group, group_id));
        }
        if state.parties.values().any(|p| p.group_id == group_id) {
            return Err(EngineError::in_use(
                EntityKind::Group,
                group_id,
                EntityKind::Party,
            ));
        }
        state.groups.remove(group_id);
        Ok(())
    }

    async fn insert_item(&self, item: &Item) -> EngineResult<()> {
        let mut state = self.write()?;
        if state.items.contains_key(&item.id) || state.item_name_taken(&item.name, &item.id) {
            return Err(EngineError::conflict(EntityKind::Item, item.name.clone()));
        }
        state.items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn get_item(&self, item_id: &str) -> EngineResult<Option<Item>> {
        Ok(self.read()?.items.get(item_id).cloned())
    }

    async fn list_items(&self) -> EngineResult<Vec<Item>> {
        let mut items: Vec<Item> = self.read()?.items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn update_item(&self, item: &Item) -> EngineResult<()> {
        let mut state = self.write()?;
        if !state.items.contains_key(&item.id) {
            return Err(EngineError::not_found(EntityKind::Item, item.id.clone()));
        }
        if state.item_name_taken(&item.name, &item.id) {
            return Err(EngineError::conflict(EntityKind::Item, item.name.clone()));
        }
        state.items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn delete_item(&self, item_id: &str) -> EngineResult<()> {
        let mut state = self.write()?;
        if !state.items.contains_key(item_id) {
            return Err(EngineError::not_found(EntityKind::Item, item_id));
        }
        let referenced = state
            .vouchers
            .values()
            .any(|v| v.lines.iter().any(|l| l.item_id == item_id));
        if referenced {
            return Err(EngineError::in_use(
                EntityKind::Item,
                item_id,
                EntityKind::Voucher,
            ));
        }
        state.items.remove(item_id);
        Ok(())
    }

    async fn insert_party(&self, party: &Party) -> EngineResult<()> {
        let mut state = self.write()?;
        if state.parties.contains_key(&party.id) {
            return Err(EngineError::conflict(EntityKind::Party, party.id.clone()));
        }
        state.check_party(party)?;
        state.parties.insert(party.id.clone(), party.clone());
        Ok(())
    }

    async fn get_party(&self, party_id: &str) -> EngineResult<Option<Party>> {
        Ok(self.read()?.parties.get(party_id).cloned())
    }

    async fn list_parties(&self) -> EngineResult<Vec<Party>> {
        let mut parties: Vec<Party> = self.read()?.parties.values().cloned().collect();
        parties.sort_by(|a, b| a.unique_name.cmp(&b.unique_name));
        Ok(parties)
    }

    async fn update_party(&self, party: &Party) -> EngineResult<()> {
        let mut state = self.write()?;
        if !state.parties.contains_key(&party.id) {
            return Err(EngineError::not_found(EntityKind::Party, party.id.clone()));
        }
        state.check_party(party)?;
        state.parties.insert(party.id.clone(), party.clone());
        Ok(())
    }

    async fn delete_party(&self, party_id: &str) -> EngineResult<()> {
        let mut state = self.write()?;
        if !state.parties.contains_key(party_id) {
            return Err(EngineError::not_found(EntityKind::Party, party_id));
        }
        if state.vouchers.values().any(|v| v.party_id == party_id) {
            return Err(EngineError::in_use(
                EntityKind::Party,
                party_id,
                EntityKind::Voucher,
            ));
        }
        state.parties.remove(party_id);
        Ok(())
    }

    async fn next_sequence(&self) -> EngineResult<u64> {
        let mut state = self.write()?;
        state.sequence += 1;
        Ok(state.sequence)
    }

    async fn append_voucher(&self, voucher: &Voucher) -> EngineResult<()> {
        let mut state = self.write()?;

        if state.voucher_numbers.contains_key(&voucher.voucher_no)
            || state.vouchers.contains_key(&voucher.id)
        {
            return Err(EngineError::conflict(
                EntityKind::Voucher,
                voucher.voucher_no.clone(),
            ));
        }
        if !state.parties.contains_key(&voucher.party_id) {
            return Err(EngineError::reference(
                EntityKind::Party,
                voucher.party_id.clone(),
                "party does not exist",
            ));
        }
        for (index, line) in voucher.lines.iter().enumerate() {
            if !state.items.contains_key(&line.item_id) {
                return Err(EngineError::reference(
                    EntityKind::Item,
                    line.item_id.clone(),
                    format!("item on line {} does not exist", index),
                ));
            }
        }
        if let Some(ref original_id) = voucher.reversal_of {
            let original = state.vouchers.get(original_id).ok_or_else(|| {
                EngineError::reference(
                    EntityKind::Voucher,
                    original_id.clone(),
                    "reversed voucher does not exist",
                )
            })?;
            if state.reversals.contains_key(original_id) {
                return Err(EngineError::conflict(
                    EntityKind::Voucher,
                    format!("reversal of {}", original.voucher_no),
                ));
            }
            state
                .reversals
                .insert(original_id.clone(), voucher.id.clone());
        }

        state
            .voucher_numbers
            .insert(voucher.voucher_no.clone(), voucher.id.clone());
        state.vouchers.insert(voucher.id.clone(), voucher.clone());
        Ok(())
    }

    async fn get_voucher(&self, voucher_id: &str) -> EngineResult<Option<Voucher>> {
        Ok(self.read()?.vouchers.get(voucher_id).cloned())
    }

    async fn list_vouchers(&self, filter: &VoucherFilter) -> EngineResult<Vec<Voucher>> {
        let state = self.read()?;
        Ok(state.sorted_vouchers(state.vouchers.values().filter(|v| filter.matches(v))))
    }

    async fn find_reversal(&self, voucher_id: &str) -> EngineResult<Option<Voucher>> {
        let state = self.read()?;
        Ok(state
            .reversals
            .get(voucher_id)
            .and_then(|id| state.vouchers.get(id))
            .cloned())
    }

    async fn ledger_snapshot(
        &self,
        party_id: &str,
    ) -> EngineResult<Option<(Party, Vec<Voucher>)>> {
        let state = self.read()?;
        let party = match state.parties.get(party_id) {
            Some(party) => party.clone(),
            None => return Ok(None),
        };
        let vouchers = state.sorted_vouchers(
            state.vouchers.values().filter(|v| v.party_id == party_id),
        );
        Ok(Some((party, vouchers)))
    }

    async fn inventory_snapshot(&self) -> EngineResult<(Vec<Item>, Vec<Voucher>)> {
        let state = self.read()?;
        let mut items: Vec<Item> = state.items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        let vouchers = state.sorted_vouchers(state.vouchers.values());
        Ok((items, vouchers))
    }

    async fn outstanding_snapshot(
        &self,
    ) -> EngineResult<(Vec<AccountGroup>, Vec<Party>, Vec<Voucher>)> {
        let state = self.read()?;
        let mut groups: Vec<AccountGroup> = state.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        let mut parties: Vec<Party> = state.parties.values().cloned().collect();
        parties.sort_by(|a, b| a.unique_name.cmp(&b.unique_name));
        let vouchers = state.sorted_vouchers(state.vouchers.values());
        Ok((groups, parties, vouchers))
    }
}
