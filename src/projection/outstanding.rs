//! Closing balances of every party, grouped by account group

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::projection::ledger::project_ledger;
use crate::types::*;
use crate::utils::rounding::{currency_serde, round_currency, round_weight, weight_serde};

/// Closing balance of one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyOutstanding {
    pub party_id: String,
    pub unique_name: String,
    pub name: String,
    /// Signed, Dr positive
    #[serde(with = "weight_serde")]
    pub metal_balance: BigDecimal,
    /// Signed, Dr positive
    #[serde(with = "currency_serde")]
    pub cash_balance: BigDecimal,
}

/// Closing balances of the parties in one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupOutstanding {
    pub group: AccountGroup,
    pub parties: Vec<PartyOutstanding>,
    #[serde(with = "weight_serde")]
    pub total_metal: BigDecimal,
    #[serde(with = "currency_serde")]
    pub total_cash: BigDecimal,
}

/// Fold every party's ledger down to its closing balance.
///
/// Groups follow the order of `groups`, parties within a group the order of
/// `parties`. Parties whose group is missing are skipped.
pub fn project_outstanding(
    groups: &[AccountGroup],
    parties: &[Party],
    vouchers: &[Voucher],
) -> Vec<GroupOutstanding> {
    let mut by_party: HashMap<&str, Vec<Voucher>> = HashMap::new();
    for voucher in vouchers {
        by_party
            .entry(voucher.party_id.as_str())
            .or_default()
            .push(voucher.clone());
    }

    groups
        .iter()
        .map(|group| {
            let members: Vec<PartyOutstanding> = parties
                .iter()
                .filter(|p| p.group_id == group.id)
                .map(|party| {
                    let history = by_party
                        .get(party.id.as_str())
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    let ledger = project_ledger(party, history);
                    PartyOutstanding {
                        party_id: party.id.clone(),
                        unique_name: party.unique_name.clone(),
                        name: party.name.clone(),
                        metal_balance: ledger.closing_metal(),
                        cash_balance: ledger.closing_cash(),
                    }
                })
                .collect();

            let total_metal: BigDecimal = members.iter().map(|m| &m.metal_balance).sum();
            let total_cash: BigDecimal = members.iter().map(|m| &m.cash_balance).sum();

            GroupOutstanding {
                group: group.clone(),
                parties: members,
                total_metal: round_weight(&total_metal),
                total_cash: round_currency(&total_cash),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn group(id: &str, name: &str) -> AccountGroup {
        AccountGroup {
            id: id.to_string(),
            name: name.to_string(),
            group_type: AccountGroupType::Asset,
            description: None,
            created_by: Actor::new("admin"),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn party(id: &str, group_id: &str, metal: &str) -> Party {
        Party {
            id: id.to_string(),
            name: id.to_uppercase(),
            unique_name: id.to_string(),
            group_id: group_id.to_string(),
            party_type: PartyType::Customer,
            contact: Contact::default(),
            opening_balance: OpeningBalance {
                metal: MetalBalance {
                    weight: dec(metal),
                    side: BalanceSide::Dr,
                },
                cash: CashBalance {
                    value: dec("1000"),
                    side: BalanceSide::Cr,
                },
            },
            wef_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            created_by: Actor::new("admin"),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_groups_total_their_parties() {
        let groups = vec![group("g1", "Debtors"), group("g2", "Karigars")];
        let parties = vec![
            party("a", "g1", "10.000"),
            party("b", "g1", "2.500"),
            party("c", "g2", "1.000"),
        ];
        let mut receipt = Voucher {
            id: "v1".to_string(),
            voucher_no: "V000001".to_string(),
            sequence: 1,
            date: NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
            voucher_type: VoucherType::Receipt,
            party_id: "a".to_string(),
            narration: String::new(),
            lines: Vec::new(),
            metal_rate: None,
            bhav_cutting_weight: dec("0"),
            bhav_cutting_amount: dec("0"),
            cash_received: dec("0"),
            reversal_of: None,
            created_by: Actor::new("clerk"),
            created_at: chrono::Utc::now().naive_utc(),
        };
        receipt.metal_rate = Some(dec("7000"));
        receipt.bhav_cutting_weight = dec("10.000");
        receipt.bhav_cutting_amount = dec("70000.00");

        let report = project_outstanding(&groups, &parties, &[receipt]);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].parties.len(), 2);
        assert_eq!(report[0].parties[0].metal_balance, dec("0.000"));
        assert_eq!(report[0].parties[0].cash_balance, dec("69000.00"));
        assert_eq!(report[0].total_metal, dec("2.500"));
        assert_eq!(report[0].total_cash, dec("68000.00"));
        assert_eq!(report[1].total_metal, dec("1.000"));
    }
}
