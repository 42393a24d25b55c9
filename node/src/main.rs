// Copyright (c) 2026 Agora Contributors. MIT License.
// See LICENSE for details.

//! # Agora Node
//!
//! Entry point for the `agora-node` binary. Parses CLI arguments,
//! initializes logging and metrics, and runs one subcommand:
//!
//! - `run`      executes a transaction script against the persisted ledger
//! - `template` prints an example script
//! - `inspect`  prints the persisted state
//! - `keygen`   generates a keypair
//! - `version`  prints build version information
//!
//! Results go to stdout as JSON; logs go to stderr.

mod cli;
mod logging;
mod metrics;
mod runner;
mod script;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use agora_protocol::config::DB_DIR_NAME;
use agora_protocol::identity::Keypair;
use agora_protocol::storage::{ChainState, LedgerDb};

use cli::{AgoraNodeCli, Commands};
use metrics::EngineMetrics;
use script::Script;

fn main() -> Result<()> {
    let cli = AgoraNodeCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Template(args) => template(args),
        Commands::Inspect(args) => inspect(args),
        Commands::Keygen => keygen(),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens (creating if needed) the ledger database under `data_dir`.
fn open_db(data_dir: &std::path::Path) -> Result<LedgerDb> {
    let db_path = data_dir.join(DB_DIR_NAME);
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;
    let db = LedgerDb::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    tracing::info!(path = %db_path.display(), "database opened");
    Ok(db)
}

fn run(args: cli::RunArgs) -> Result<()> {
    let script = Script::load(&args.script)?;
    tracing::info!(
        script = %args.script.display(),
        transactions = script.transactions.len(),
        data_dir = %args.data_dir.display(),
        "starting run"
    );

    let db = open_db(&args.data_dir)?;
    let metrics = EngineMetrics::new().context("failed to register metrics")?;
    let (reports, summary) = runner::run_script(&db, &script, &metrics)?;

    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }
    println!("{}", serde_json::to_string(&summary)?);

    if args.metrics {
        eprint!("{}", metrics.encode().context("failed to encode metrics")?);
    }

    if args.fail_on_abort && summary.aborted > 0 {
        bail!("{} of {} transactions aborted", summary.aborted, reports.len());
    }
    Ok(())
}

fn template(args: cli::TemplateArgs) -> Result<()> {
    let script = Script::template(args.soulbound)?;
    println!("{}", serde_json::to_string_pretty(&script)?);
    Ok(())
}

fn inspect(args: cli::InspectArgs) -> Result<()> {
    let db = open_db(&args.data_dir)?;
    let state: ChainState = db
        .load_state()
        .context("failed to load ledger state")?
        .unwrap_or_default();

    let mut out = json!({
        "state_digest": state.digest_hex(),
        "counts": record_counts(&state),
        "state": state,
    });
    if args.journal {
        out["journal"] = serde_json::to_value(db.journal().context("failed to read journal")?)?;
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Number of records of each kind, plus receipts ever issued.
fn record_counts(state: &ChainState) -> serde_json::Value {
    json!({
        "marketplaces": state.accounts.marketplaces().count(),
        "services": state.accounts.services().count(),
        "receipts": state.accounts.receipts().count(),
        "receipts_issued": state.accounts.receipt_sequence(),
    })
}

fn keygen() -> Result<()> {
    let keypair = Keypair::generate();
    tracing::info!(address = %keypair.address(), "keypair generated");
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "address": keypair.address(),
            "secret_key": keypair.secret_key_hex(),
        }))?
    );
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("agora-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol   {}", agora_protocol::config::PROTOCOL_VERSION);
    println!("state fmt  {}", agora_protocol::config::STATE_FORMAT_VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_cover_every_kind() {
        let db = LedgerDb::open_temporary().unwrap();
        let metrics = EngineMetrics::new().unwrap();
        runner::run_script(&db, &Script::template(false).unwrap(), &metrics).unwrap();

        let state: ChainState = db.load_state().unwrap().unwrap();
        let counts = record_counts(&state);
        assert_eq!(counts["marketplaces"], 1);
        assert_eq!(counts["services"], 1);
        assert_eq!(counts["receipts"], 1);
        assert_eq!(counts["receipts_issued"], 1);
    }
}
