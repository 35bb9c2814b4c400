//! Party management: customers, suppliers and karigars

use tracing::{info, warn};

use crate::traits::*;
use crate::types::*;
use crate::utils::rounding::{round_currency, round_weight};
use crate::utils::validation::{validate_name, validate_non_negative};

/// Manages parties and their opening balances
pub struct PartyRegistry<S: AccountsStorage> {
    storage: S,
}

impl<S: AccountsStorage> PartyRegistry<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new party with its opening balance.
    ///
    /// The group must exist; storage rechecks this atomically on insert.
    pub async fn create_party(&self, input: PartyInput, actor: &Actor) -> EngineResult<Party> {
        let input = normalize(input)?;

        let party = Party {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            unique_name: input.unique_name,
            group_id: input.group_id,
            party_type: input.party_type,
            contact: input.contact,
            opening_balance: input.opening_balance,
            wef_date: input.wef_date,
            created_by: actor.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.storage.insert_party(&party).await?;

        info!(
            party_id = %party.id,
            unique_name = %party.unique_name,
            opening_metal = %party.opening_balance.signed_metal(),
            opening_cash = %party.opening_balance.signed_cash(),
            actor = %actor,
            "party created"
        );
        Ok(party)
    }

    /// Get a party by ID
    pub async fn get_party(&self, party_id: &str) -> EngineResult<Option<Party>> {
        self.storage.get_party(party_id).await
    }

    /// Get a party by ID, returning an error if not found
    pub async fn get_party_required(&self, party_id: &str) -> EngineResult<Party> {
        self.storage
            .get_party(party_id)
            .await?
            .ok_or_else(|| EngineError::not_found(EntityKind::Party, party_id))
    }

    /// List all parties
    pub async fn list_parties(&self) -> EngineResult<Vec<Party>> {
        self.storage.list_parties().await
    }

    /// Update name, group, type and contact details.
    ///
    /// The opening balance and its wef date are fixed at creation; an input
    /// carrying a different one is rejected.
    pub async fn update_party(
        &self,
        party_id: &str,
        input: PartyInput,
        actor: &Actor,
    ) -> EngineResult<Party> {
        let input = normalize(input)?;
        let existing = self.get_party_required(party_id).await?;

        if !same_balance(&input.opening_balance, &existing.opening_balance) {
            warn!(party_id = %party_id, actor = %actor, "opening balance change refused");
            return Err(EngineError::validation(
                "opening_balance",
                "opening balance cannot be changed after creation",
            ));
        }
        if input.wef_date != existing.wef_date {
            warn!(party_id = %party_id, actor = %actor, "wef date change refused");
            return Err(EngineError::validation(
                "wef_date",
                "opening balance date cannot be changed after creation",
            ));
        }

        let party = Party {
            name: input.name,
            unique_name: input.unique_name,
            group_id: input.group_id,
            party_type: input.party_type,
            contact: input.contact,
            ..existing
        };
        self.storage.update_party(&party).await?;

        info!(party_id = %party.id, actor = %actor, "party updated");
        Ok(party)
    }

    /// Delete a party no voucher references
    pub async fn delete_party(&self, party_id: &str, actor: &Actor) -> EngineResult<()> {
        self.storage.delete_party(party_id).await?;
        info!(party_id = %party_id, actor = %actor, "party deleted");
        Ok(())
    }
}

// Compares signed values so a zero balance matches on either side
fn same_balance(a: &OpeningBalance, b: &OpeningBalance) -> bool {
    a.signed_metal() == b.signed_metal() && a.signed_cash() == b.signed_cash()
}

fn normalize(input: PartyInput) -> EngineResult<PartyInput> {
    validate_name("name", &input.name)?;
    validate_name("unique_name", &input.unique_name)?;
    if input.group_id.trim().is_empty() {
        return Err(EngineError::validation("group_id", "cannot be empty"));
    }

    let metal = &input.opening_balance.metal;
    let cash = &input.opening_balance.cash;
    validate_non_negative("opening_balance.metal.weight", &metal.weight)?;
    validate_non_negative("opening_balance.cash.value", &cash.value)?;

    let trim = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    Ok(PartyInput {
        name: input.name.trim().to_string(),
        unique_name: input.unique_name.trim().to_string(),
        group_id: input.group_id.trim().to_string(),
        party_type: input.party_type,
        contact: Contact {
            phone: trim(input.contact.phone),
            email: trim(input.contact.email),
            address: trim(input.contact.address),
            city: trim(input.contact.city),
        },
        opening_balance: OpeningBalance {
            metal: MetalBalance {
                weight: round_weight(&metal.weight),
                side: metal.side,
            },
            cash: CashBalance {
                value: round_currency(&cash.value),
                side: cash.side,
            },
        },
        wef_date: input.wef_date,
    })
}
