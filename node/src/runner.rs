//! Script execution against the persisted ledger.
//!
//! Loads the last snapshot (or starts empty), mints genesis balances,
//! executes the script's transactions through the atomic runtime, then
//! writes the new snapshot and appends the journal.

use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

use agora_contracts::{Outcome, Runtime};
use agora_protocol::ledger::TokenLedger;
use agora_protocol::storage::{ChainState, LedgerDb};

use crate::metrics::EngineMetrics;
use crate::script::Script;

/// Per-transaction line printed by `run`.
#[derive(Debug, Serialize)]
pub struct TxReport {
    pub tx: Uuid,
    pub operation: &'static str,
    #[serde(flatten)]
    pub result: TxResult,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxResult {
    Committed { outcome: Outcome },
    Aborted { kind: String, error: String, retryable: bool },
}

impl TxReport {
    pub fn is_committed(&self) -> bool {
        matches!(self.result, TxResult::Committed { .. })
    }
}

/// Summary of a whole run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub committed: usize,
    pub aborted: usize,
    pub state_digest: String,
}

/// Executes `script` against the state stored in `db` and persists the result.
pub fn run_script(
    db: &LedgerDb,
    script: &Script,
    metrics: &EngineMetrics,
) -> Result<(Vec<TxReport>, RunSummary)> {
    let mut state: ChainState = db
        .load_state()
        .context("failed to load ledger state")?
        .unwrap_or_default();
    tracing::info!(digest = %state.digest_hex(), "ledger state loaded");

    for balance in &script.genesis {
        state
            .ledger
            .mint(&balance.asset, &balance.owner, balance.amount)
            .with_context(|| {
                format!("failed to mint genesis balance for {}", balance.owner)
            })?;
    }
    if !script.genesis.is_empty() {
        tracing::info!(entries = script.genesis.len(), "genesis balances minted");
    }

    let mut runtime = Runtime::new(state);
    let mut reports = Vec::with_capacity(script.transactions.len());

    for tx in &script.transactions {
        let operation = tx.instruction.name();
        let started = Instant::now();
        let result = runtime.execute(tx);
        metrics.observe(operation, &result, started.elapsed());

        let result = match result {
            Ok(outcome) => TxResult::Committed { outcome },
            Err(err) => TxResult::Aborted {
                kind: err.kind().to_string(),
                retryable: err.is_retryable(),
                error: err.to_string(),
            },
        };
        reports.push(TxReport {
            tx: tx.id,
            operation,
            result,
        });
    }

    let journal = runtime.drain_journal();
    let state = runtime.into_state();
    db.save_state(&state).context("failed to save ledger state")?;
    db.append_journal(&journal)
        .context("failed to append execution journal")?;

    let committed = reports.iter().filter(|r| r.is_committed()).count();
    let summary = RunSummary {
        committed,
        aborted: reports.len() - committed,
        state_digest: state.digest_hex(),
    };
    tracing::info!(
        committed = summary.committed,
        aborted = summary.aborted,
        digest = %summary.state_digest,
        "run complete"
    );
    Ok((reports, summary))
}
