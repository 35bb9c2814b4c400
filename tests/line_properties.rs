//! Property tests for line arithmetic and the projection folds

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use metal_accounts::voucher::{compute_line, validate_line};
use metal_accounts::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Weights in milligrams, 0 to 1 kg
fn weight_strategy() -> impl Strategy<Value = BigDecimal> {
    (0i64..1_000_000i64).prop_map(|n| BigDecimal::new(n.into(), 3))
}

/// Percentages with one decimal place
fn percent_strategy() -> impl Strategy<Value = BigDecimal> {
    (0i64..=1000i64).prop_map(|n| BigDecimal::new(n.into(), 1))
}

fn voucher_type_strategy() -> impl Strategy<Value = VoucherType> {
    prop_oneof![
        Just(VoucherType::Sales),
        Just(VoucherType::Purchase),
        Just(VoucherType::Issue),
        Just(VoucherType::Receipt),
    ]
}

fn item(purity: BigDecimal) -> Item {
    Item {
        id: "i1".to_string(),
        name: "Fine Gold Bar".to_string(),
        metal: Metal::Gold,
        purity,
        unit: StockUnit::Gram,
        opening_stock: OpeningStock {
            weight: BigDecimal::from(0),
        },
        min_stock_level: None,
        max_stock_level: None,
        custom_fields: BTreeMap::new(),
        created_by: Actor::new("admin"),
        created_at: NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

fn party() -> Party {
    Party {
        id: "p1".to_string(),
        name: "Suresh".to_string(),
        unique_name: "suresh".to_string(),
        group_id: "g1".to_string(),
        party_type: PartyType::Karigar,
        contact: Contact::default(),
        opening_balance: OpeningBalance::zero(),
        wef_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        created_by: Actor::new("admin"),
        created_at: NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

fn voucher(seq: u64, day: u32, voucher_type: VoucherType, line: VoucherLine, cash: BigDecimal) -> Voucher {
    Voucher {
        id: format!("v{}", seq),
        voucher_no: format!("V{:06}", seq),
        sequence: seq,
        date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
        voucher_type,
        party_id: "p1".to_string(),
        narration: String::new(),
        lines: vec![line],
        metal_rate: None,
        bhav_cutting_weight: BigDecimal::from(0),
        bhav_cutting_amount: BigDecimal::from(0),
        cash_received: cash,
        reversal_of: None,
        created_by: Actor::new("clerk"),
        created_at: NaiveDate::from_ymd_opt(2024, 4, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

fn line_strategy() -> impl Strategy<Value = VoucherLine> {
    (weight_strategy(), percent_strategy(), weight_strategy()).prop_map(|(gross, purity, rate)| {
        let input = VoucherLineInput::new("i1", gross).labour_rate(rate);
        compute_line(0, &input, &item(purity)).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Net weight plus less weight always gives back the gross weight
    #[test]
    fn prop_net_plus_less_is_gross(gross in weight_strategy(), less in weight_strategy()) {
        prop_assume!(less <= gross);
        let input = VoucherLineInput::new("i1", gross.clone()).less(less.clone());
        let line = compute_line(0, &input, &item(BigDecimal::from(100))).unwrap();

        prop_assert_eq!(&line.net_weight + &line.less_weight, gross);
        prop_assert_eq!(line.fine_weight.clone(), line.net_weight.clone());
    }

    /// Less weight above gross is always rejected
    #[test]
    fn prop_less_above_gross_rejected(gross in weight_strategy(), extra in 1i64..1000i64) {
        let less = &gross + BigDecimal::new(extra.into(), 3);
        let input = VoucherLineInput::new("i1", gross).less(less);
        prop_assert!(validate_line(0, &input).is_err());
    }

    /// Fine weight never exceeds net weight scaled by touch plus wastage,
    /// by more than half a milligram, and is always kept to 3 places
    #[test]
    fn prop_fine_weight_bounded(
        gross in weight_strategy(),
        purity in percent_strategy(),
        wastage in (0i64..=100i64).prop_map(|n| BigDecimal::new(n.into(), 1)),
    ) {
        let input = VoucherLineInput::new("i1", gross).wastage(wastage.clone());
        let line = compute_line(0, &input, &item(purity.clone())).unwrap();

        let exact = &line.net_weight * (&purity + &wastage) / BigDecimal::from(100);
        let diff = (&line.fine_weight - &exact).abs();
        prop_assert!(diff <= BigDecimal::new(5.into(), 4));
        prop_assert_eq!(line.fine_weight.as_bigint_and_exponent().1, 3);
    }

    /// The ledger does not depend on the order vouchers are handed in
    #[test]
    fn prop_ledger_order_independent(
        entries in prop::collection::vec(
            (1u32..28, voucher_type_strategy(), line_strategy(), weight_strategy()),
            1..12,
        ),
    ) {
        let vouchers: Vec<Voucher> = entries
            .into_iter()
            .enumerate()
            .map(|(i, (day, t, line, cash))| voucher(i as u64 + 1, day, t, line, cash))
            .collect();
        let mut reversed = vouchers.clone();
        reversed.reverse();

        let p = party();
        prop_assert_eq!(project_ledger(&p, &vouchers), project_ledger(&p, &reversed));
        prop_assert_eq!(
            project_inventory(&[item(BigDecimal::from(100))], &vouchers),
            project_inventory(&[item(BigDecimal::from(100))], &reversed)
        );
    }

    /// A voucher and its reversal leave the party where it started
    #[test]
    fn prop_reversal_nets_to_opening(
        t in voucher_type_strategy(),
        line in line_strategy(),
        cash in weight_strategy(),
    ) {
        let original = voucher(1, 2, t, line, cash);
        let mut reversal = original.clone();
        reversal.id = "v2".to_string();
        reversal.voucher_no = "V000002".to_string();
        reversal.sequence = 2;
        reversal.reversal_of = Some(original.id.clone());

        let ledger = project_ledger(&party(), &[original, reversal]);
        prop_assert_eq!(ledger.closing_metal(), BigDecimal::from(0));
        prop_assert_eq!(ledger.closing_cash(), BigDecimal::from(0));
    }
}
