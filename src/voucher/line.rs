//! Voucher line arithmetic: gross → net → fine, rate → labour

use bigdecimal::BigDecimal;

use crate::types::*;
use crate::utils::rounding::{round_currency, round_weight};
use crate::utils::validation::{validate_non_negative, validate_percentage};

impl VoucherLineInput {
    /// Line for `gross_weight` grams of an item at the item's own purity
    pub fn new(item_id: impl Into<String>, gross_weight: BigDecimal) -> Self {
        Self {
            item_id: item_id.into(),
            gross_weight,
            less_weight: BigDecimal::from(0),
            purity: None,
            wastage: BigDecimal::from(0),
            labour_rate: BigDecimal::from(0),
        }
    }

    /// Deduction such as stone weight
    pub fn less(mut self, less_weight: BigDecimal) -> Self {
        self.less_weight = less_weight;
        self
    }

    /// Touch for this line, overriding the item master
    pub fn purity(mut self, purity: BigDecimal) -> Self {
        self.purity = Some(purity);
        self
    }

    /// Wastage percent added to the touch
    pub fn wastage(mut self, wastage: BigDecimal) -> Self {
        self.wastage = wastage;
        self
    }

    /// Labour charged per gram of net weight
    pub fn labour_rate(mut self, labour_rate: BigDecimal) -> Self {
        self.labour_rate = labour_rate;
        self
    }
}

/// Check a line's numbers without touching storage
pub fn validate_line(index: usize, input: &VoucherLineInput) -> EngineResult<()> {
    let field = |name: &str| format!("lines[{}].{}", index, name);

    if input.item_id.trim().is_empty() {
        return Err(EngineError::validation(field("item_id"), "cannot be empty"));
    }
    validate_non_negative(&field("gross_weight"), &input.gross_weight)?;
    validate_non_negative(&field("less_weight"), &input.less_weight)?;
    if input.less_weight > input.gross_weight {
        return Err(EngineError::validation(
            field("less_weight"),
            format!(
                "less weight {} exceeds gross weight {}",
                input.less_weight, input.gross_weight
            ),
        ));
    }
    if let Some(ref purity) = input.purity {
        validate_percentage(&field("purity"), purity)?;
    }
    validate_non_negative(&field("wastage"), &input.wastage)?;
    validate_non_negative(&field("labour_rate"), &input.labour_rate)?;
    Ok(())
}

/// Compute every derived field of a line.
///
/// Weights are normalised to 3 places before subtraction so that
/// `net_weight` is exact; the fine and labour products are rounded once.
pub fn compute_line(index: usize, input: &VoucherLineInput, item: &Item) -> EngineResult<VoucherLine> {
    validate_line(index, input)?;

    let purity = match input.purity {
        Some(ref purity) => purity.clone(),
        None => {
            validate_percentage(&format!("lines[{}].purity", index), &item.purity)?;
            item.purity.clone()
        }
    };

    let gross_weight = round_weight(&input.gross_weight);
    let less_weight = round_weight(&input.less_weight);
    let net_weight = &gross_weight - &less_weight;

    let touch = &purity + &input.wastage;
    let fine_weight = round_weight(&(&net_weight * &touch / BigDecimal::from(100)));

    let labour_rate = round_currency(&input.labour_rate);
    let labour_amount = round_currency(&(&net_weight * &labour_rate));
    let line_amount = labour_amount.clone();

    Ok(VoucherLine {
        item_id: input.item_id.clone(),
        gross_weight,
        less_weight,
        net_weight,
        purity,
        wastage: input.wastage.clone(),
        fine_weight,
        labour_rate,
        labour_amount,
        line_amount,
    })
}
