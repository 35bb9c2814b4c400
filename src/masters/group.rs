//! Account group management

use tracing::info;

use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_name;

/// Manages the account groups parties are classified under
pub struct GroupRegistry<S: AccountsStorage> {
    storage: S,
}

impl<S: AccountsStorage> GroupRegistry<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new account group
    pub async fn create_group(&self, input: GroupInput, actor: &Actor) -> EngineResult<AccountGroup> {
        let input = normalize(input)?;

        let group = AccountGroup {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            group_type: input.group_type,
            description: input.description,
            created_by: actor.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.storage.insert_group(&group).await?;

        info!(group_id = %group.id, name = %group.name, actor = %actor, "account group created");
        Ok(group)
    }

    /// Get a group by ID
    pub async fn get_group(&self, group_id: &str) -> EngineResult<Option<AccountGroup>> {
        self.storage.get_group(group_id).await
    }

    /// Get a group by ID, returning an error if not found
    pub async fn get_group_required(&self, group_id: &str) -> EngineResult<AccountGroup> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| EngineError::not_found(EntityKind::Group, group_id))
    }

    /// List all groups
    pub async fn list_groups(&self) -> EngineResult<Vec<AccountGroup>> {
        self.storage.list_groups().await
    }

    /// Replace the editable fields of a group
    pub async fn update_group(
        &self,
        group_id: &str,
        input: GroupInput,
        actor: &Actor,
    ) -> EngineResult<AccountGroup> {
        let input = normalize(input)?;
        let existing = self.get_group_required(group_id).await?;

        let group = AccountGroup {
            name: input.name,
            group_type: input.group_type,
            description: input.description,
            ..existing
        };
        self.storage.update_group(&group).await?;

        info!(group_id = %group.id, actor = %actor, "account group updated");
        Ok(group)
    }

    /// Delete a group no party belongs to
    pub async fn delete_group(&self, group_id: &str, actor: &Actor) -> EngineResult<()> {
        self.storage.delete_group(group_id).await?;
        info!(group_id = %group_id, actor = %actor, "account group deleted");
        Ok(())
    }
}

fn normalize(input: GroupInput) -> EngineResult<GroupInput> {
    validate_name("name", &input.name)?;
    Ok(GroupInput {
        name: input.name.trim().to_string(),
        group_type: input.group_type,
        description: input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    })
}
