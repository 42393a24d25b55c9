//! # CLI Interface
//!
//! Defines the command-line argument structure for `agora-node` using
//! `clap` derive. Subcommands: `run`, `template`, `inspect`, `keygen` and
//! `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use agora_protocol::config::DEFAULT_DATA_DIR;

use crate::logging::LogFormat;

/// Agora marketplace node.
///
/// Executes marketplace transactions from a JSON script against a ledger
/// persisted on disk, and inspects the resulting state.
#[derive(Parser, Debug)]
#[command(
    name = "agora-node",
    about = "Agora marketplace settlement node",
    version,
    propagate_version = true
)]
pub struct AgoraNodeCli {
    /// Log format for stderr.
    #[arg(
        long,
        global = true,
        env = "AGORA_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(
        long,
        global = true,
        default_value = "agora_node=info,agora_contracts=info,agora_protocol=warn"
    )]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the Agora node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute every transaction in a script and persist the result.
    Run(RunArgs),
    /// Print an example script for a fresh ledger.
    Template(TemplateArgs),
    /// Print the persisted state as JSON.
    Inspect(InspectArgs),
    /// Generate a keypair and print its address and secret.
    Keygen,
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the JSON script (genesis balances plus transactions).
    pub script: PathBuf,

    /// Directory holding the ledger database. Created on first run.
    #[arg(long, short = 'd', env = "AGORA_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Dump Prometheus metrics to stderr after the run.
    #[arg(long)]
    pub metrics: bool,

    /// Exit with an error if any transaction aborted.
    #[arg(long)]
    pub fail_on_abort: bool,
}

/// Arguments for the `template` subcommand.
#[derive(Parser, Debug)]
pub struct TemplateArgs {
    /// Make the example service soulbound, so its resale aborts.
    #[arg(long)]
    pub soulbound: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Directory holding the ledger database.
    #[arg(long, short = 'd', env = "AGORA_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Also print the execution journal.
    #[arg(long)]
    pub journal: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        AgoraNodeCli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = AgoraNodeCli::parse_from(["agora-node", "run", "script.json"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.script, PathBuf::from("script.json"));
                assert!(!args.metrics);
                assert!(!args.fail_on_abort);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn log_format_is_global() {
        let cli = AgoraNodeCli::parse_from(["agora-node", "keygen", "--log-format", "json"]);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(AgoraNodeCli::try_parse_from(["agora-node", "keygen", "--log-format", "yaml"]).is_err());
    }
}
