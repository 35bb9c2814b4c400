//! Karigar job work example: metal issued, ornaments received, stock report

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use metal_accounts::{
    AccountGroupType, Accounts, Actor, BalanceSide, CashBalance, Contact, EngineConfig,
    FieldDefinition, FieldKind, FieldValue, GroupInput, ItemInput, Metal, MemoryStorage,
    MetalBalance, OpeningBalance, PartyInput, PartyType, VoucherBuilder, VoucherLineInput,
    VoucherType,
};
use metal_accounts::utils::{format_currency, format_weight};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🔨 Metal Accounts - Karigar Job Work Example\n");

    let mut config = EngineConfig::load()?;
    if config.item_fields.is_empty() {
        config.item_fields = vec![
            FieldDefinition::new("design_code", FieldKind::Text, false),
            FieldDefinition::new(
                "finish",
                FieldKind::Dropdown(vec!["matte".to_string(), "polished".to_string()]),
                false,
            ),
        ];
    }
    let accounts = Accounts::with_config(MemoryStorage::new(), config);
    let actor = Actor::new("workshop");
    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 5, d).ok_or("bad date");

    let karigars = accounts
        .create_group(
            GroupInput {
                name: "Karigars".to_string(),
                group_type: AccountGroupType::Asset,
                description: None,
            },
            &actor,
        )
        .await?;

    let karigar = accounts
        .create_party(
            PartyInput {
                name: "Ravi Soni".to_string(),
                unique_name: "ravi-soni".to_string(),
                group_id: karigars.id.clone(),
                party_type: PartyType::Karigar,
                contact: Contact::default(),
                opening_balance: OpeningBalance {
                    metal: MetalBalance {
                        weight: BigDecimal::from(0),
                        side: BalanceSide::Dr,
                    },
                    cash: CashBalance {
                        value: BigDecimal::from_str("2500")?,
                        side: BalanceSide::Cr,
                    },
                },
                wef_date: day(1)?,
            },
            &actor,
        )
        .await?;

    let bar = accounts
        .create_item(
            ItemInput::new(
                "Fine Gold Bar",
                Metal::Gold,
                BigDecimal::from_str("99.5")?,
                BigDecimal::from_str("200.000")?,
            ),
            &actor,
        )
        .await?;

    let mut bangle_input = ItemInput::new(
        "22K Bangle",
        Metal::Gold,
        BigDecimal::from_str("91.6")?,
        BigDecimal::from(0),
    );
    bangle_input.min_stock_level = Some(BigDecimal::from(20));
    bangle_input
        .custom_fields
        .insert("finish".to_string(), FieldValue::Text("polished".to_string()));
    let bangle = accounts.create_item(bangle_input, &actor).await?;

    // Issue 50 g of bar to the karigar
    println!("📤 Issuing metal...");
    let issue = accounts
        .post_voucher(
            VoucherBuilder::new(day(2)?, VoucherType::Issue, &karigar.id)
                .line(VoucherLineInput::new(&bar.id, BigDecimal::from_str("50.000")?))
                .build(),
            &actor,
        )
        .await?;
    println!("  ✓ {}: {} g fine issued", issue.voucher_no, issue.total_fine_weight());

    // Receive finished bangles, labour payable to the karigar
    println!("📥 Receiving bangles...");
    let receipt = accounts
        .post_voucher(
            VoucherBuilder::new(day(9)?, VoucherType::Receipt, &karigar.id)
                .narration("6 bangles")
                .line(
                    VoucherLineInput::new(&bangle.id, BigDecimal::from_str("53.200")?)
                        .wastage(BigDecimal::from_str("1.5")?)
                        .labour_rate(BigDecimal::from(300)),
                )
                .build(),
            &actor,
        )
        .await?;
    println!(
        "  ✓ {}: {} g fine received, labour ₹{}\n",
        receipt.voucher_no,
        receipt.total_fine_weight(),
        receipt.total_line_amount()
    );

    let closing = accounts.get_ledger(&karigar.id).await?.closing_balance();
    println!(
        "⚖️  {} balance: {} g {:?}, ₹{} {:?}\n",
        karigar.name,
        format_weight(&closing.metal.weight),
        closing.metal.side,
        format_currency(&closing.cash.value),
        closing.cash.side
    );

    println!("📦 Stock position");
    for position in accounts.get_inventory().await? {
        println!(
            "  {:<16} opening {:>9}  in {:>9}  out {:>9}  current {:>9}  {:?}",
            position.item.name,
            format_weight(&position.opening_stock),
            format_weight(&position.inward),
            format_weight(&position.outward),
            format_weight(&position.current_stock),
            position.status
        );
    }

    println!("\n📊 Outstanding");
    for group in accounts.get_outstanding().await? {
        println!(
            "  {}: metal {} cash {}",
            group.group.name,
            format_weight(&group.total_metal),
            format_currency(&group.total_cash)
        );
    }

    Ok(())
}
