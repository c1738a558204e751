//! # Ledger Reconciliation
//!
//! Checks that every product's cached quantity equals its opening stock
//! plus the signed sum of its movements.
//!
//! ## Usage
//! ```bash
//! # Report only (exit code 1 when anything drifted)
//! cargo run -p estoque-db --bin reconcile -- --db ./database.db
//!
//! # Reset drifted quantities to the ledger value
//! cargo run -p estoque-db --bin reconcile -- --db ./database.db --repair
//!
//! # Machine-readable output
//! cargo run -p estoque-db --bin reconcile -- --json
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use estoque_db::{Database, DbConfig};
use tracing::{info, warn};

struct Args {
    db_path: PathBuf,
    repair: bool,
    json: bool,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let args: Vec<String> = env::args().collect();

    let mut parsed = Args {
        db_path: DbConfig::in_dir(env::var("DATABASE_DIR").unwrap_or_else(|_| ".".to_string()))
            .database_path,
        repair: false,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                let value = args.get(i + 1).context("--db needs a path")?;
                parsed.db_path = PathBuf::from(value);
                i += 1;
            }
            "--repair" => parsed.repair = true,
            "--json" => parsed.json = true,
            "--help" | "-h" => {
                println!("Usage: reconcile [--db <PATH>] [--repair] [--json]");
                return Ok(None);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    Ok(Some(parsed))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    estoque_db::init_cli_tracing();

    let Some(args) = parse_args()? else {
        return Ok(ExitCode::SUCCESS);
    };

    // Never create or migrate a database just to inspect it
    anyhow::ensure!(
        args.db_path.exists(),
        "database not found: {}",
        args.db_path.display()
    );

    let db = Database::new(DbConfig::new(&args.db_path).run_migrations(false))
        .await
        .with_context(|| format!("opening {}", args.db_path.display()))?;

    let (total, applied) = db.migration_status().await?;
    anyhow::ensure!(
        total == applied,
        "database schema is out of date ({applied}/{total} migrations applied)"
    );

    let discrepancies = db.movements().reconcile().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&discrepancies)?);
    } else if discrepancies.is_empty() {
        println!("✓ All products reconcile with the ledger");
    } else {
        println!("{:>6}  {:<40} {:>10} {:>10}", "ID", "Name", "Cached", "Ledger");
        for d in &discrepancies {
            println!(
                "{:>6}  {:<40} {:>10} {:>10}",
                d.product_id, d.name, d.cached_quantity, d.recomputed_quantity
            );
        }
    }

    if discrepancies.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    if !args.repair {
        warn!(count = discrepancies.len(), "Ledger drift found; rerun with --repair to fix");
        return Ok(ExitCode::FAILURE);
    }

    let mut repaired = 0;
    for d in &discrepancies {
        match db.movements().repair(d.product_id).await {
            Ok(Some(_)) => repaired += 1,
            Ok(None) => {}
            Err(e) => warn!(product_id = d.product_id, error = %e, "Repair failed"),
        }
    }

    info!(repaired, total = discrepancies.len(), "Repair finished");
    let remaining = db.movements().reconcile().await?;
    Ok(if remaining.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
