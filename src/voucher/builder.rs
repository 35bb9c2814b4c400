//! Builder for voucher inputs

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// Voucher builder for assembling a [`VoucherInput`]
#[derive(Debug)]
pub struct VoucherBuilder {
    input: VoucherInput,
}

impl VoucherBuilder {
    /// Create a new voucher builder
    pub fn new(date: NaiveDate, voucher_type: VoucherType, party_id: impl Into<String>) -> Self {
        Self {
            input: VoucherInput {
                voucher_no: None,
                date,
                voucher_type,
                party_id: party_id.into(),
                narration: String::new(),
                lines: Vec::new(),
                metal_rate: None,
                bhav_cutting_weight: BigDecimal::from(0),
                cash_received: BigDecimal::from(0),
            },
        }
    }

    /// Use an operator supplied voucher number
    pub fn voucher_no(mut self, voucher_no: impl Into<String>) -> Self {
        self.input.voucher_no = Some(voucher_no.into());
        self
    }

    /// Set the narration
    pub fn narration(mut self, narration: impl Into<String>) -> Self {
        self.input.narration = narration.into();
        self
    }

    /// Add a line
    pub fn line(mut self, line: VoucherLineInput) -> Self {
        self.input.lines.push(line);
        self
    }

    /// Settle `weight` fine grams into cash at `rate` per gram
    pub fn bhav_cutting(mut self, weight: BigDecimal, rate: BigDecimal) -> Self {
        self.input.bhav_cutting_weight = weight;
        self.input.metal_rate = Some(rate);
        self
    }

    /// Cash received from the party
    pub fn cash_received(mut self, amount: BigDecimal) -> Self {
        self.input.cash_received = amount;
        self
    }

    /// Build the voucher input
    pub fn build(self) -> VoucherInput {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_lines_and_legs() {
        let input = VoucherBuilder::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            VoucherType::Sales,
            "p1",
        )
        .voucher_no("SL-7")
        .narration("counter sale")
        .line(VoucherLineInput::new("i1", BigDecimal::from(10)))
        .bhav_cutting(BigDecimal::from(5), BigDecimal::from(6000))
        .cash_received(BigDecimal::from(1000))
        .build();

        assert_eq!(input.voucher_no.as_deref(), Some("SL-7"));
        assert_eq!(input.lines.len(), 1);
        assert_eq!(input.metal_rate, Some(BigDecimal::from(6000)));
        assert_eq!(input.bhav_cutting_weight, BigDecimal::from(5));
        assert_eq!(input.cash_received, BigDecimal::from(1000));
    }
}
