//! Item master management

use bigdecimal::BigDecimal;
use tracing::info;

use crate::masters::fields::{validate_fields, FieldDefinition};
use crate::traits::*;
use crate::types::*;
use crate::utils::rounding::round_weight;
use crate::utils::validation::{validate_name, validate_non_negative, validate_percentage};

/// Manages tradable items and their custom fields
pub struct ItemRegistry<S: AccountsStorage> {
    storage: S,
    fields: Vec<FieldDefinition>,
}

impl<S: AccountsStorage> ItemRegistry<S> {
    /// Create a registry validating custom fields against `fields`
    pub fn new(storage: S, fields: Vec<FieldDefinition>) -> Self {
        Self { storage, fields }
    }

    /// Create a new item
    pub async fn create_item(&self, input: ItemInput, actor: &Actor) -> EngineResult<Item> {
        let input = self.normalize(input)?;

        let item = Item {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            metal: input.metal,
            purity: input.purity,
            unit: input.unit,
            opening_stock: input.opening_stock,
            min_stock_level: input.min_stock_level,
            max_stock_level: input.max_stock_level,
            custom_fields: input.custom_fields,
            created_by: actor.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.storage.insert_item(&item).await?;

        info!(item_id = %item.id, name = %item.name, actor = %actor, "item created");
        Ok(item)
    }

    /// Get an item by ID
    pub async fn get_item(&self, item_id: &str) -> EngineResult<Option<Item>> {
        self.storage.get_item(item_id).await
    }

    /// Get an item by ID, returning an error if not found
    pub async fn get_item_required(&self, item_id: &str) -> EngineResult<Item> {
        self.storage
            .get_item(item_id)
            .await?
            .ok_or_else(|| EngineError::not_found(EntityKind::Item, item_id))
    }

    /// List all items
    pub async fn list_items(&self) -> EngineResult<Vec<Item>> {
        self.storage.list_items().await
    }

    /// Replace the editable fields of an item.
    ///
    /// Posted voucher lines keep the purity they were computed with.
    pub async fn update_item(
        &self,
        item_id: &str,
        input: ItemInput,
        actor: &Actor,
    ) -> EngineResult<Item> {
        let input = self.normalize(input)?;
        let existing = self.get_item_required(item_id).await?;

        let item = Item {
            name: input.name,
            metal: input.metal,
            purity: input.purity,
            unit: input.unit,
            opening_stock: input.opening_stock,
            min_stock_level: input.min_stock_level,
            max_stock_level: input.max_stock_level,
            custom_fields: input.custom_fields,
            ..existing
        };
        self.storage.update_item(&item).await?;

        info!(item_id = %item.id, actor = %actor, "item updated");
        Ok(item)
    }

    /// Delete an item no voucher line references
    pub async fn delete_item(&self, item_id: &str, actor: &Actor) -> EngineResult<()> {
        self.storage.delete_item(item_id).await?;
        info!(item_id = %item_id, actor = %actor, "item deleted");
        Ok(())
    }

    fn normalize(&self, input: ItemInput) -> EngineResult<ItemInput> {
        validate_name("name", &input.name)?;
        if let Metal::Other(ref name) = input.metal {
            validate_name("metal", name)?;
        }
        validate_percentage("purity", &input.purity)?;
        validate_non_negative("opening_stock.weight", &input.opening_stock.weight)?;

        let min_stock_level = input.min_stock_level.as_ref().map(round_weight);
        let max_stock_level = input.max_stock_level.as_ref().map(round_weight);
        if let Some(ref min) = min_stock_level {
            validate_non_negative("min_stock_level", min)?;
        }
        if let Some(ref max) = max_stock_level {
            validate_non_negative("max_stock_level", max)?;
        }
        if let (Some(min), Some(max)) = (&min_stock_level, &max_stock_level) {
            if min > max {
                return Err(EngineError::validation(
                    "min_stock_level",
                    format!("{} is above max_stock_level {}", min, max),
                ));
            }
        }

        validate_fields(&self.fields, &input.custom_fields)?;

        Ok(ItemInput {
            name: input.name.trim().to_string(),
            metal: input.metal,
            purity: input.purity,
            unit: input.unit,
            opening_stock: OpeningStock {
                weight: round_weight(&input.opening_stock.weight),
            },
            min_stock_level,
            max_stock_level,
            custom_fields: input.custom_fields,
        })
    }
}

impl ItemInput {
    /// Input with no stock levels and no custom fields
    pub fn new(name: impl Into<String>, metal: Metal, purity: BigDecimal, opening: BigDecimal) -> Self {
        Self {
            name: name.into(),
            metal,
            purity,
            unit: StockUnit::Gram,
            opening_stock: OpeningStock { weight: opening },
            min_stock_level: None,
            max_stock_level: None,
            custom_fields: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masters::fields::{FieldKind, FieldValue};
    use crate::utils::memory_storage::MemoryStorage;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn registry() -> ItemRegistry<MemoryStorage> {
        ItemRegistry::new(
            MemoryStorage::new(),
            vec![
                FieldDefinition::new("hallmark", FieldKind::Text, true),
                FieldDefinition::new(
                    "stone_colour",
                    FieldKind::Color(vec!["red".to_string(), "green".to_string()]),
                    false,
                ),
            ],
        )
    }

    fn chain() -> ItemInput {
        let mut input = ItemInput::new("22K Chain", Metal::Gold, dec("91.6"), dec("100"));
        input
            .custom_fields
            .insert("hallmark".to_string(), FieldValue::Text("BIS-916".to_string()));
        input
    }

    #[tokio::test]
    async fn test_create_normalizes_weights() {
        let registry = registry();
        let item = registry
            .create_item(chain(), &Actor::new("admin"))
            .await
            .unwrap();
        assert_eq!(item.opening_stock.weight.to_string(), "100.000");
        assert_eq!(registry.get_item_required(&item.id).await.unwrap(), item);
    }

    #[tokio::test]
    async fn test_purity_out_of_range() {
        let mut input = chain();
        input.purity = dec("100.5");
        let err = registry()
            .create_item(input, &Actor::new("admin"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "purity"));
    }

    #[tokio::test]
    async fn test_negative_opening_stock_rejected() {
        let mut input = chain();
        input.opening_stock.weight = dec("-1");
        let err = registry()
            .create_item(input, &Actor::new("admin"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_min_above_max_rejected() {
        let mut input = chain();
        input.min_stock_level = Some(dec("10"));
        input.max_stock_level = Some(dec("5"));
        let err = registry()
            .create_item(input, &Actor::new("admin"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, EngineError::Validation { ref field, .. } if field == "min_stock_level")
        );
    }

    #[tokio::test]
    async fn test_custom_fields_checked_against_schema() {
        let registry = registry();
        let actor = Actor::new("admin");

        let mut missing = chain();
        missing.custom_fields.clear();
        assert!(registry.create_item(missing, &actor).await.is_err());

        let mut bad_colour = chain();
        bad_colour
            .custom_fields
            .insert("stone_colour".to_string(), FieldValue::Text("blue".to_string()));
        assert!(registry.create_item(bad_colour, &actor).await.is_err());

        let mut good = chain();
        good.custom_fields
            .insert("stone_colour".to_string(), FieldValue::Text("red".to_string()));
        let item = registry.create_item(good, &actor).await.unwrap();
        assert_eq!(item.custom_fields.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let registry = registry();
        let actor = Actor::new("admin");
        registry.create_item(chain(), &actor).await.unwrap();
        let err = registry.create_item(chain(), &actor).await.unwrap_err();
        assert_eq!(err, EngineError::conflict(EntityKind::Item, "22K Chain"));
    }
}
