//! # Seed Data Generator
//!
//! Populates the database with a small warehouse catalog and a month of
//! movements, for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./database.db
//! cargo run -p estoque-db --bin seed
//!
//! # Specify database path, skip movement history
//! cargo run -p estoque-db --bin seed -- --db ./data/database.db --no-movements
//! ```
//!
//! ## Generated Data
//! - Products across EPI, tools, hardware, electrical and cleaning
//! - Every product gets an opening stock, a unit value and a threshold
//! - Movements spread over the last 30 days, all recorded through the
//!   mutation engine, so the ledger reconciles afterwards

use std::env;

use anyhow::Context;
use chrono::{Duration, Utc};
use estoque_core::{Money, NewMovement, NewProduct};
use estoque_db::{Database, DbConfig, DbError};
use tracing::info;

/// (category, unit, contract, product names)
const CATALOG: &[(&str, &str, Option<&str>, &[&str])] = &[
    (
        "EPI",
        "par",
        Some("CT-2024/001"),
        &["Luvas de Vaqueta", "Luvas Nitrílicas", "Botina de Segurança"],
    ),
    (
        "EPI",
        "un",
        Some("CT-2024/001"),
        &["Capacete Classe B", "Óculos de Proteção", "Protetor Auricular"],
    ),
    (
        "Ferramentas",
        "un",
        None,
        &["Martelo 27mm", "Chave de Fenda 1/4", "Alicate Universal", "Trena 5m"],
    ),
    (
        "Ferragens",
        "cx",
        Some("CT-2023/117"),
        &["Parafuso Sextavado M8", "Porca M8", "Arruela Lisa 8mm", "Bucha S8"],
    ),
    (
        "Elétrica",
        "m",
        None,
        &["Cabo Flexível 2,5mm", "Eletroduto 3/4", "Fita Isolante"],
    ),
    (
        "Limpeza",
        "un",
        Some("CT-2024/019"),
        &["Detergente 5L", "Pano de Chão", "Saco de Lixo 100L"],
    ),
];

const RESPONSIBLES: &[&str] = &["Ana Souza", "Bruno Lima", "Carla Dias", "Diego Alves"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    estoque_db::init_cli_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("DATABASE_DIR")
        .map(|dir| DbConfig::in_dir(dir).database_path)
        .unwrap_or_else(|_| DbConfig::in_dir(".").database_path);
    let mut with_movements = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--no-movements" => with_movements = false,
            "--help" | "-h" => {
                println!("Estoque Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: $DATABASE_DIR/database.db)");
                println!("      --no-movements  Only create products");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    println!("Estoque Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path.display());
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path.display()))?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut product_ids = Vec::new();

    for (category, unit, contract, names) in CATALOG {
        for name in names.iter() {
            let seed = product_ids.len() as i64;
            let mut input = NewProduct::new(*name, *category, *unit)
                .with_quantity(20 + (seed * 37) % 180)
                .with_unit_value(Money::from_cents(150 + (seed * 913) % 9_000))
                .with_min_stock(if seed % 4 == 0 { 0 } else { 10 + seed % 15 });
            if let Some(contract) = contract {
                input = input.with_contract(*contract);
            }

            match db.products().create(input).await {
                Ok(product) => product_ids.push(product.id),
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }

    println!("✓ Created {} products", product_ids.len());

    let mut recorded = 0;
    let mut rejected = 0;
    if with_movements {
        let now = Utc::now();
        for day in 0..30i64 {
            for (slot, product_id) in product_ids.iter().enumerate() {
                let n = day * 31 + slot as i64;
                if n % 3 != 0 {
                    continue;
                }

                let quantity = 1 + n % 12;
                let responsible = RESPONSIBLES[(n as usize) % RESPONSIBLES.len()];
                let at = now - Duration::days(29 - day) - Duration::minutes(n % 600);
                let movement = if n % 5 < 2 {
                    NewMovement::inbound(*product_id, quantity * 2, responsible)
                } else {
                    NewMovement::outbound(*product_id, quantity, responsible).with_note("Requisição de obra")
                };

                match db.movements().record(movement.at(at)).await {
                    Ok(_) => recorded += 1,
                    Err(DbError::Core(_)) => rejected += 1,
                    Err(e) => return Err(e.into()),
                }
            }
        }
        println!("✓ Recorded {} movements ({} outbound rejected for stock)", recorded, rejected);
    }

    let drift = db.movements().reconcile().await?;
    anyhow::ensure!(drift.is_empty(), "seeded ledger does not reconcile: {drift:?}");

    let low = db.reports().low_stock().await?;
    info!(
        products = product_ids.len(),
        movements = recorded,
        low_stock = low.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());
    println!("  {} products at or below minimum stock", low.len());

    Ok(())
}
