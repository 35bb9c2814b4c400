//! Stock projection: item opening stock plus every voucher line, in fine grams

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;
use crate::utils::rounding::{round_weight, weight_serde};
use crate::voucher::{ledger_order, stock_flow, StockFlow};

/// Stock health of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    /// Below zero: oversold or on backorder
    Shortfall,
    /// Below the item's minimum level
    Low,
    Normal,
    /// Above the item's maximum level
    Over,
}

impl StockStatus {
    /// Status of `current` against an item's levels
    pub fn classify(item: &Item, current: &BigDecimal) -> Self {
        if *current < BigDecimal::from(0) {
            StockStatus::Shortfall
        } else if item.min_stock_level.as_ref().is_some_and(|min| current < min) {
            StockStatus::Low
        } else if item.max_stock_level.as_ref().is_some_and(|max| current > max) {
            StockStatus::Over
        } else {
            StockStatus::Normal
        }
    }

    /// Whether the position should be flagged as low stock
    pub fn is_low(&self) -> bool {
        matches!(self, StockStatus::Shortfall | StockStatus::Low)
    }
}

/// Current position of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPosition {
    pub item: Item,
    #[serde(with = "weight_serde")]
    pub opening_stock: BigDecimal,
    #[serde(with = "weight_serde")]
    pub inward: BigDecimal,
    #[serde(with = "weight_serde")]
    pub outward: BigDecimal,
    /// May be negative
    #[serde(with = "weight_serde")]
    pub current_stock: BigDecimal,
    pub status: StockStatus,
}

#[derive(Default)]
struct Flows {
    inward: BigDecimal,
    outward: BigDecimal,
}

/// Fold every voucher line into per-item stock.
///
/// Lines referencing items not in `items` are skipped. Output follows the
/// order of `items`.
pub fn project_inventory(items: &[Item], vouchers: &[Voucher]) -> Vec<StockPosition> {
    let mut ordered: Vec<&Voucher> = vouchers.iter().collect();
    ordered.sort_by(|a, b| ledger_order(a, b));

    let mut flows: HashMap<&str, Flows> = HashMap::new();
    for voucher in ordered {
        let flow = stock_flow(voucher);
        for line in &voucher.lines {
            let entry = flows.entry(line.item_id.as_str()).or_default();
            match flow {
                StockFlow::In => entry.inward += &line.fine_weight,
                StockFlow::Out => entry.outward += &line.fine_weight,
            }
        }
    }

    items
        .iter()
        .map(|item| {
            let opening_stock = round_weight(&item.opening_stock.weight);
            let (inward, outward) = match flows.get(item.id.as_str()) {
                Some(f) => (round_weight(&f.inward), round_weight(&f.outward)),
                None => (
                    round_weight(&BigDecimal::from(0)),
                    round_weight(&BigDecimal::from(0)),
                ),
            };
            let current_stock = &opening_stock + &inward - &outward;
            let status = StockStatus::classify(item, &current_stock);

            StockPosition {
                item: item.clone(),
                opening_stock,
                inward,
                outward,
                current_stock,
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn item(id: &str, opening: &str) -> Item {
        Item {
            id: id.to_string(),
            name: format!("item {}", id),
            metal: Metal::Silver,
            purity: dec("92.5"),
            unit: StockUnit::Gram,
            opening_stock: OpeningStock {
                weight: dec(opening),
            },
            min_stock_level: Some(dec("2.000")),
            max_stock_level: Some(dec("500.000")),
            custom_fields: BTreeMap::new(),
            created_by: Actor::new("admin"),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn voucher(seq: u64, voucher_type: VoucherType, item_id: &str, fine: &str) -> Voucher {
        Voucher {
            id: format!("v{}", seq),
            voucher_no: format!("V{:06}", seq),
            sequence: seq,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            voucher_type,
            party_id: "p1".to_string(),
            narration: String::new(),
            lines: vec![VoucherLine {
                item_id: item_id.to_string(),
                gross_weight: dec(fine),
                less_weight: dec("0.000"),
                net_weight: dec(fine),
                purity: dec("100"),
                wastage: dec("0"),
                fine_weight: dec(fine),
                labour_rate: dec("0"),
                labour_amount: dec("0.00"),
                line_amount: dec("0.00"),
            }],
            metal_rate: None,
            bhav_cutting_weight: dec("0"),
            bhav_cutting_amount: dec("0"),
            cash_received: dec("0"),
            reversal_of: None,
            created_by: Actor::new("clerk"),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_oversold_item_reports_shortfall() {
        let items = vec![item("i1", "5.000")];
        let vouchers = vec![voucher(1, VoucherType::Sales, "i1", "8.000")];

        let positions = project_inventory(&items, &vouchers);
        assert_eq!(positions[0].current_stock, dec("-3.000"));
        assert_eq!(positions[0].current_stock.to_string(), "-3.000");
        assert_eq!(positions[0].status, StockStatus::Shortfall);
        assert!(positions[0].status.is_low());
    }

    #[test]
    fn test_inflows_and_outflows() {
        let items = vec![item("i1", "10.000"), item("i2", "1.000")];
        let vouchers = vec![
            voucher(1, VoucherType::Purchase, "i1", "4.500"),
            voucher(2, VoucherType::Issue, "i1", "3.000"),
            voucher(3, VoucherType::Receipt, "i1", "2.750"),
            voucher(4, VoucherType::Sales, "i1", "1.000"),
        ];

        let positions = project_inventory(&items, &vouchers);
        assert_eq!(positions[0].inward, dec("7.250"));
        assert_eq!(positions[0].outward, dec("4.000"));
        assert_eq!(positions[0].current_stock, dec("13.250"));
        assert_eq!(positions[0].status, StockStatus::Normal);

        assert_eq!(positions[1].current_stock, dec("1.000"));
        assert_eq!(positions[1].status, StockStatus::Low);
    }

    #[test]
    fn test_reversal_restores_stock() {
        let items = vec![item("i1", "10.000")];
        let sale = voucher(1, VoucherType::Sales, "i1", "4.000");
        let mut reversal = voucher(2, VoucherType::Sales, "i1", "4.000");
        reversal.reversal_of = Some(sale.id.clone());

        let positions = project_inventory(&items, &[sale, reversal]);
        assert_eq!(positions[0].current_stock, dec("10.000"));
    }

    #[test]
    fn test_over_max_level() {
        let items = vec![item("i1", "499.000")];
        let vouchers = vec![voucher(1, VoucherType::Purchase, "i1", "2.000")];
        let positions = project_inventory(&items, &vouchers);
        assert_eq!(positions[0].status, StockStatus::Over);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let items = vec![item("i1", "5.000")];
        let vouchers = vec![
            voucher(2, VoucherType::Sales, "i1", "1.000"),
            voucher(1, VoucherType::Purchase, "i1", "2.000"),
        ];
        assert_eq!(
            project_inventory(&items, &vouchers),
            project_inventory(&items, &vouchers)
        );
    }
}
