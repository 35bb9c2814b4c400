//! Voucher posting: validation, line computation and atomic persistence

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::traits::*;
use crate::types::*;
use crate::utils::rounding::{round_currency, round_weight};
use crate::utils::validation::validate_non_negative;
use crate::voucher::line::{compute_line, validate_line};

/// Records vouchers. The only writer of transactional facts; balances are
/// never written here.
pub struct VoucherEngine<S: AccountsStorage> {
    storage: S,
    validator: Box<dyn VoucherValidator>,
    config: EngineConfig,
}

impl<S: AccountsStorage> VoucherEngine<S> {
    /// Create a new voucher engine
    pub fn new(storage: S, config: EngineConfig) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultVoucherValidator),
            config,
        }
    }

    /// Create a new voucher engine with custom validator
    pub fn with_validator(
        storage: S,
        config: EngineConfig,
        validator: Box<dyn VoucherValidator>,
    ) -> Self {
        Self {
            storage,
            validator,
            config,
        }
    }

    /// Validate, compute and persist a voucher
    #[instrument(skip(self, input), fields(party = %input.party_id, voucher_type = ?input.voucher_type))]
    pub async fn post_voucher(&self, input: VoucherInput, actor: &Actor) -> EngineResult<Voucher> {
        let input = round_amounts(input);
        if let Err(err) = self.check_input(&input) {
            warn!(error = %err, "voucher rejected");
            return Err(err);
        }

        let voucher = self.build_voucher(input, actor).await?;
        self.storage.append_voucher(&voucher).await?;

        info!(
            voucher_no = %voucher.voucher_no,
            sequence = voucher.sequence,
            lines = voucher.lines.len(),
            fine_weight = %voucher.total_fine_weight(),
            bhav_cutting_amount = %voucher.bhav_cutting_amount,
            actor = %actor,
            "voucher posted"
        );

        Ok(voucher)
    }

    /// Post a voucher that cancels `voucher_id`.
    ///
    /// The reversal carries the original's lines and legs with every side
    /// swapped by the projectors. A voucher can be reversed once. It is
    /// numbered `{original}/R` so that on the same date it sorts directly
    /// after the voucher it cancels.
    #[instrument(skip(self, narration))]
    pub async fn reverse_voucher(
        &self,
        voucher_id: &str,
        date: NaiveDate,
        narration: Option<String>,
        actor: &Actor,
    ) -> EngineResult<Voucher> {
        let original = self.get_voucher_required(voucher_id).await?;

        if original.reversal_of.is_some() {
            return Err(EngineError::validation(
                "voucher_id",
                format!("{} is itself a reversal", original.voucher_no),
            ));
        }
        if date < original.date {
            return Err(EngineError::validation(
                "date",
                format!("reversal dated before original voucher date {}", original.date),
            ));
        }
        if self.storage.find_reversal(voucher_id).await?.is_some() {
            return Err(EngineError::conflict(
                EntityKind::Voucher,
                format!("reversal of {}", original.voucher_no),
            ));
        }

        let input = VoucherInput {
            voucher_no: None,
            date,
            voucher_type: original.voucher_type,
            party_id: original.party_id.clone(),
            narration: narration
                .unwrap_or_else(|| format!("Reversal of {}", original.voucher_no)),
            lines: Vec::new(),
            metal_rate: original.metal_rate.clone(),
            bhav_cutting_weight: original.bhav_cutting_weight.clone(),
            cash_received: original.cash_received.clone(),
        };
        self.validator.validate_voucher(&input)?;

        let sequence = self.storage.next_sequence().await?;
        let voucher = Voucher {
            id: uuid::Uuid::new_v4().to_string(),
            voucher_no: format!("{}/R", original.voucher_no),
            sequence,
            date,
            voucher_type: original.voucher_type,
            party_id: original.party_id.clone(),
            narration: input.narration,
            lines: original.lines.clone(),
            metal_rate: original.metal_rate.clone(),
            bhav_cutting_weight: original.bhav_cutting_weight.clone(),
            bhav_cutting_amount: original.bhav_cutting_amount.clone(),
            cash_received: original.cash_received.clone(),
            reversal_of: Some(original.id.clone()),
            created_by: actor.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.storage.append_voucher(&voucher).await?;

        info!(
            voucher_no = %voucher.voucher_no,
            reverses = %original.voucher_no,
            actor = %actor,
            "voucher reversed"
        );

        Ok(voucher)
    }

    /// Get a voucher by ID
    pub async fn get_voucher(&self, voucher_id: &str) -> EngineResult<Option<Voucher>> {
        self.storage.get_voucher(voucher_id).await
    }

    /// Get a voucher by ID, returning an error if not found
    pub async fn get_voucher_required(&self, voucher_id: &str) -> EngineResult<Voucher> {
        self.storage
            .get_voucher(voucher_id)
            .await?
            .ok_or_else(|| EngineError::not_found(EntityKind::Voucher, voucher_id))
    }

    /// Vouchers matching the filter, in ledger order
    pub async fn list_vouchers(&self, filter: &VoucherFilter) -> EngineResult<Vec<Voucher>> {
        self.storage.list_vouchers(filter).await
    }

    /// Checks that need no storage access. Amounts are already rounded.
    fn check_input(&self, input: &VoucherInput) -> EngineResult<()> {
        self.validator.validate_voucher(input)?;

        validate_non_negative("cash_received", &input.cash_received)?;
        validate_non_negative("bhav_cutting_weight", &input.bhav_cutting_weight)?;

        let zero = BigDecimal::from(0);
        if input.bhav_cutting_weight > zero {
            match input.metal_rate {
                Some(ref rate) if *rate > zero => {}
                _ => {
                    return Err(EngineError::validation(
                        "metal_rate",
                        "bhav cutting requires a metal rate greater than zero",
                    ))
                }
            }
        }
        if let Some(ref rate) = input.metal_rate {
            validate_non_negative("metal_rate", rate)?;
        }

        if input.lines.is_empty() && input.bhav_cutting_weight == zero && input.cash_received == zero
        {
            return Err(EngineError::validation(
                "lines",
                "voucher must have at least one line, a bhav cutting or cash received",
            ));
        }

        for (index, line) in input.lines.iter().enumerate() {
            validate_line(index, line)?;
        }

        Ok(())
    }

    /// Resolve references and compute derived fields. Nothing is written.
    async fn build_voucher(
        &self,
        input: VoucherInput,
        actor: &Actor,
    ) -> EngineResult<Voucher> {
        if self.storage.get_party(&input.party_id).await?.is_none() {
            return Err(EngineError::reference(
                EntityKind::Party,
                input.party_id.clone(),
                "party does not exist",
            ));
        }

        let mut lines = Vec::with_capacity(input.lines.len());
        for (index, line) in input.lines.iter().enumerate() {
            let item = self.storage.get_item(&line.item_id).await?.ok_or_else(|| {
                EngineError::reference(
                    EntityKind::Item,
                    line.item_id.clone(),
                    format!("item on line {} does not exist", index),
                )
            })?;
            lines.push(compute_line(index, line, &item)?);
        }

        let bhav_cutting_amount = match input.metal_rate {
            Some(ref rate) if input.bhav_cutting_weight > BigDecimal::from(0) => {
                round_currency(&(&input.bhav_cutting_weight * rate))
            }
            _ => round_currency(&BigDecimal::from(0)),
        };

        let sequence = self.storage.next_sequence().await?;
        let voucher_no = match input.voucher_no {
            Some(ref no) => no.trim().to_string(),
            None => self.config.voucher_number(sequence)?,
        };

        Ok(Voucher {
            id: uuid::Uuid::new_v4().to_string(),
            voucher_no,
            sequence,
            date: input.date,
            voucher_type: input.voucher_type,
            party_id: input.party_id,
            narration: input.narration,
            lines,
            metal_rate: input.metal_rate,
            bhav_cutting_weight: input.bhav_cutting_weight,
            bhav_cutting_amount,
            cash_received: input.cash_received,
            reversal_of: None,
            created_by: actor.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        })
    }
}

/// Round voucher-level amounts to their stored scale so every check and
/// derived value sees what will be persisted
fn round_amounts(mut input: VoucherInput) -> VoucherInput {
    input.bhav_cutting_weight = round_weight(&input.bhav_cutting_weight);
    input.cash_received = round_currency(&input.cash_received);
    input.metal_rate = input.metal_rate.as_ref().map(round_currency);
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    async fn seeded() -> (VoucherEngine<MemoryStorage>, Actor) {
        seeded_with(EngineConfig::default()).await
    }

    async fn seeded_with(config: EngineConfig) -> (VoucherEngine<MemoryStorage>, Actor) {
        let storage = MemoryStorage::new();
        let actor = Actor::new("clerk");
        let now = chrono::Utc::now().naive_utc();
        storage
            .insert_group(&AccountGroup {
                id: "g1".to_string(),
                name: "Sundry Debtors".to_string(),
                group_type: AccountGroupType::Asset,
                description: None,
                created_by: actor.clone(),
                created_at: now,
            })
            .await
            .unwrap();
        storage
            .insert_party(&Party {
                id: "p1".to_string(),
                name: "Ramesh".to_string(),
                unique_name: "ramesh".to_string(),
                group_id: "g1".to_string(),
                party_type: PartyType::Customer,
                contact: Contact::default(),
                opening_balance: OpeningBalance::zero(),
                wef_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                created_by: actor.clone(),
                created_at: now,
            })
            .await
            .unwrap();
        storage
            .insert_item(&Item {
                id: "i1".to_string(),
                name: "22K Bangle".to_string(),
                metal: Metal::Gold,
                purity: dec("91.6"),
                unit: StockUnit::Gram,
                opening_stock: OpeningStock {
                    weight: dec("100.000"),
                },
                min_stock_level: None,
                max_stock_level: None,
                custom_fields: BTreeMap::new(),
                created_by: actor.clone(),
                created_at: now,
            })
            .await
            .unwrap();
        (VoucherEngine::new(storage, config), actor)
    }

    fn sale() -> VoucherInput {
        VoucherInput {
            voucher_no: None,
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            voucher_type: VoucherType::Sales,
            party_id: "p1".to_string(),
            narration: "bangle sale".to_string(),
            lines: vec![VoucherLineInput::new("i1", dec("10.000"))
                .wastage(dec("2.0"))
                .labour_rate(dec("400"))],
            metal_rate: None,
            bhav_cutting_weight: BigDecimal::from(0),
            cash_received: BigDecimal::from(0),
        }
    }

    #[tokio::test]
    async fn test_post_voucher_computes_lines() {
        let (engine, actor) = seeded().await;
        let voucher = engine.post_voucher(sale(), &actor).await.unwrap();

        assert_eq!(voucher.voucher_no, "V000001");
        assert_eq!(voucher.lines[0].fine_weight, dec("9.360"));
        assert_eq!(voucher.lines[0].labour_amount, dec("4000.00"));
        assert_eq!(voucher.created_by, actor);

        let stored = engine.get_voucher_required(&voucher.id).await.unwrap();
        assert_eq!(stored, voucher);
    }

    #[tokio::test]
    async fn test_bhav_cutting_amount_derived() {
        let (engine, actor) = seeded().await;
        let mut input = sale();
        input.lines.clear();
        input.voucher_type = VoucherType::Receipt;
        input.metal_rate = Some(dec("6000"));
        input.bhav_cutting_weight = dec("50.000");

        let voucher = engine.post_voucher(input, &actor).await.unwrap();
        assert_eq!(voucher.bhav_cutting_amount, dec("300000.00"));
        assert_eq!(voucher.bhav_cutting_amount.to_string(), "300000.00");
    }

    #[tokio::test]
    async fn test_bhav_cutting_without_rate_rejected() {
        let (engine, actor) = seeded().await;
        let mut input = sale();
        input.bhav_cutting_weight = dec("1.000");
        input.metal_rate = Some(dec("0"));

        let err = engine.post_voucher(input, &actor).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(engine
            .list_vouchers(&VoucherFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_empty_voucher_rejected() {
        let (engine, actor) = seeded().await;
        let mut input = sale();
        input.lines.clear();
        let err = engine.post_voucher(input, &actor).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "lines"));
    }

    #[tokio::test]
    async fn test_missing_references() {
        let (engine, actor) = seeded().await;

        let mut input = sale();
        input.party_id = "nobody".to_string();
        let err = engine.post_voucher(input, &actor).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::reference(EntityKind::Party, "nobody", "party does not exist")
        );

        let mut input = sale();
        input.lines.push(VoucherLineInput::new("ghost", dec("1.000")));
        let err = engine.post_voucher(input, &actor).await.unwrap_err();
        assert_eq!(err.http_status(), 404);
        assert!(engine
            .list_vouchers(&VoucherFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_voucher_no_conflicts() {
        let (engine, actor) = seeded().await;
        let mut input = sale();
        input.voucher_no = Some("SL-1".to_string());
        engine.post_voucher(input.clone(), &actor).await.unwrap();

        let err = engine.post_voucher(input, &actor).await.unwrap_err();
        assert_eq!(err, EngineError::conflict(EntityKind::Voucher, "SL-1"));
    }

    #[tokio::test]
    async fn test_reverse_once() {
        let (engine, actor) = seeded().await;
        let original = engine.post_voucher(sale(), &actor).await.unwrap();

        let reversal = engine
            .reverse_voucher(&original.id, original.date, None, &actor)
            .await
            .unwrap();
        assert_eq!(reversal.reversal_of.as_deref(), Some(original.id.as_str()));
        assert_eq!(reversal.lines, original.lines);
        assert_eq!(reversal.narration, "Reversal of V000001");
        assert_eq!(reversal.voucher_no, "V000001/R");

        let again = engine
            .reverse_voucher(&original.id, original.date, None, &actor)
            .await
            .unwrap_err();
        assert_eq!(again.kind(), ErrorKind::Conflict);

        let of_reversal = engine
            .reverse_voucher(&reversal.id, original.date, None, &actor)
            .await
            .unwrap_err();
        assert_eq!(of_reversal.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_reversal_cannot_predate_original() {
        let (engine, actor) = seeded().await;
        let original = engine.post_voucher(sale(), &actor).await.unwrap();
        let err = engine
            .reverse_voucher(
                &original.id,
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                None,
                &actor,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    fn bhav_only(weight: &str, rate: &str) -> VoucherInput {
        let mut input = sale();
        input.lines.clear();
        input.voucher_type = VoucherType::Receipt;
        input.metal_rate = Some(dec(rate));
        input.bhav_cutting_weight = dec(weight);
        input
    }

    #[tokio::test]
    async fn test_bhav_amount_uses_stored_weight() {
        let (engine, actor) = seeded().await;
        let voucher = engine
            .post_voucher(bhav_only("50.0004", "6000"), &actor)
            .await
            .unwrap();

        assert_eq!(voucher.bhav_cutting_weight, dec("50.000"));
        assert_eq!(voucher.bhav_cutting_amount, dec("300000.00"));
        assert_eq!(
            voucher.bhav_cutting_amount,
            round_currency(&(&voucher.bhav_cutting_weight * voucher.metal_rate.clone().unwrap()))
        );
    }

    #[tokio::test]
    async fn test_amounts_rounding_to_zero_move_nothing() {
        let (engine, actor) = seeded().await;

        let err = engine
            .post_voucher(bhav_only("0.0001", "6000"), &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "lines"));

        let mut cash_only = sale();
        cash_only.lines.clear();
        cash_only.cash_received = dec("0.004");
        let err = engine.post_voucher(cash_only, &actor).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert!(engine
            .list_vouchers(&VoucherFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_metal_rate_stored_to_paise() {
        let (engine, actor) = seeded().await;
        let voucher = engine
            .post_voucher(bhav_only("1.000", "6850.555"), &actor)
            .await
            .unwrap();
        assert_eq!(voucher.metal_rate, Some(dec("6850.56")));
        assert_eq!(voucher.bhav_cutting_amount, dec("6850.56"));
    }

    #[tokio::test]
    async fn test_voucher_without_bhav_serializes_fixed_places() {
        let (engine, actor) = seeded().await;
        let voucher = engine.post_voucher(sale(), &actor).await.unwrap();
        let json = serde_json::to_value(&voucher).unwrap();

        assert_eq!(json["bhav_cutting_weight"], "0.000");
        assert_eq!(json["bhav_cutting_amount"], "0.00");
        assert_eq!(json["cash_received"], "0.00");
        assert_eq!(json["metal_rate"], serde_json::Value::Null);
        assert_eq!(json["lines"][0]["less_weight"], "0.000");
        assert_eq!(json["lines"][0]["fine_weight"], "9.360");
    }

    #[tokio::test]
    async fn test_sequence_past_number_width_refused() {
        let config = EngineConfig {
            voucher_number_width: 1,
            ..EngineConfig::default()
        };
        let (engine, actor) = seeded_with(config).await;

        for _ in 0..9 {
            engine.post_voucher(sale(), &actor).await.unwrap();
        }
        let err = engine.post_voucher(sale(), &actor).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "voucher_no"));

        let mut numbered = sale();
        numbered.voucher_no = Some("SL-10".to_string());
        engine.post_voucher(numbered, &actor).await.unwrap();

        let numbers: Vec<String> = engine
            .list_vouchers(&VoucherFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.voucher_no)
            .collect();
        assert_eq!(numbers.len(), 10);
        assert_eq!(numbers[0], "SL-10");
        assert_eq!(numbers[1..], ["V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9"]);
    }
}
