//! Bhav cutting example: a customer's metal balance settled into cash

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use metal_accounts::{
    AccountGroupType, Accounts, Actor, BalanceSide, CashBalance, Contact, GroupInput, ItemInput,
    LedgerEntry, Metal, MemoryStorage, MetalBalance, OpeningBalance, PartyInput, PartyType,
    VoucherBuilder, VoucherLineInput, VoucherType,
};
use metal_accounts::utils::{format_currency, format_weight};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🪙 Metal Accounts - Bhav Cutting Example\n");

    let accounts = Accounts::new(MemoryStorage::new());
    let actor = Actor::new("counter-1");

    // 1. Masters
    println!("📋 Setting up masters...");
    let debtors = accounts
        .create_group(
            GroupInput {
                name: "Sundry Debtors".to_string(),
                group_type: AccountGroupType::Asset,
                description: Some("Retail and wholesale customers".to_string()),
            },
            &actor,
        )
        .await?;

    let customer = accounts
        .create_party(
            PartyInput {
                name: "Lakshmi Jewellers".to_string(),
                unique_name: "lakshmi-jewellers".to_string(),
                group_id: debtors.id.clone(),
                party_type: PartyType::Customer,
                contact: Contact {
                    city: Some("Thrissur".to_string()),
                    ..Contact::default()
                },
                opening_balance: OpeningBalance {
                    metal: MetalBalance {
                        weight: BigDecimal::from_str("25.000")?,
                        side: BalanceSide::Dr,
                    },
                    cash: CashBalance {
                        value: BigDecimal::from(0),
                        side: BalanceSide::Dr,
                    },
                },
                wef_date: NaiveDate::from_ymd_opt(2024, 4, 1).ok_or("bad date")?,
            },
            &actor,
        )
        .await?;

    let necklace = accounts
        .create_item(
            ItemInput::new(
                "22K Necklace",
                Metal::Gold,
                BigDecimal::from_str("91.6")?,
                BigDecimal::from_str("250.000")?,
            ),
            &actor,
        )
        .await?;
    println!("  ✓ {} owes {} g fine\n", customer.name, customer.opening_balance.metal.weight);

    // 2. A sale on metal terms
    println!("💍 Posting a sale...");
    let sale = accounts
        .post_voucher(
            VoucherBuilder::new(
                NaiveDate::from_ymd_opt(2024, 4, 10).ok_or("bad date")?,
                VoucherType::Sales,
                &customer.id,
            )
            .narration("Necklace set, 2% wastage")
            .line(
                VoucherLineInput::new(&necklace.id, BigDecimal::from_str("27.450")?)
                    .less(BigDecimal::from_str("1.450")?)
                    .wastage(BigDecimal::from_str("2")?)
                    .labour_rate(BigDecimal::from(450)),
            )
            .build(),
            &actor,
        )
        .await?;
    println!(
        "  ✓ {}: {} g fine, labour ₹{}\n",
        sale.voucher_no,
        sale.total_fine_weight(),
        sale.total_line_amount()
    );

    // 3. Customer fixes the rate for part of the metal and pays some cash
    println!("📉 Fixing the rate (bhav cutting)...");
    let settlement = accounts
        .post_voucher(
            VoucherBuilder::new(
                NaiveDate::from_ymd_opt(2024, 4, 15).ok_or("bad date")?,
                VoucherType::Receipt,
                &customer.id,
            )
            .narration("Rate fixed at 6850/g")
            .bhav_cutting(BigDecimal::from_str("40.000")?, BigDecimal::from(6850))
            .cash_received(BigDecimal::from(150000))
            .build(),
            &actor,
        )
        .await?;
    println!(
        "  ✓ {}: {} g converted into ₹{}\n",
        settlement.voucher_no, settlement.bhav_cutting_weight, settlement.bhav_cutting_amount
    );

    // 4. Ledger
    println!("📒 Ledger for {}", customer.unique_name);
    let ledger = accounts.get_ledger(&customer.id).await?;
    println!(
        "  {:<12} {:<10} {:>10} {:>10} {:>14} {:>14} {:>16}",
        "Date", "Voucher", "Metal Dr", "Metal Cr", "Metal Bal", "Cash Dr", "Cash Bal"
    );
    for row in &ledger.transactions {
        let label = match &row.entry {
            LedgerEntry::Opening => "Opening".to_string(),
            LedgerEntry::BroughtForward => "B/F".to_string(),
            LedgerEntry::Voucher(v) => v.voucher_no.clone(),
        };
        let metal = row.metal_side();
        let cash = row.cash_side();
        println!(
            "  {:<12} {:<10} {:>10} {:>10} {:>10} {:?} {:>14} {:>12} {:?}",
            row.date.to_string(),
            label,
            format_weight(&row.metal_dr),
            format_weight(&row.metal_cr),
            format_weight(&metal.weight),
            metal.side,
            format_currency(&row.cash_dr),
            format_currency(&cash.value),
            cash.side
        );
    }

    let closing = ledger.closing_balance();
    println!(
        "\n  Closing: {} g {:?}, ₹{} {:?}",
        format_weight(&closing.metal.weight),
        closing.metal.side,
        format_currency(&closing.cash.value),
        closing.cash.side
    );

    Ok(())
}
