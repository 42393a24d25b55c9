//! # Runtime
//!
//! Executes transactions against a [`ChainState`] with all-or-nothing
//! semantics.
//!
//! ```text
//! committed ──clone──▶ staged ──apply(ix)──▶ Ok  ──▶ staged becomes committed
//!                                        └─▶ Err ──▶ staged dropped
//! ```
//!
//! Every executed transaction, committed or aborted, leaves one
//! [`ExecutionRecord`] in the journal. [`SharedRuntime`] serializes
//! concurrent submitters behind a mutex so each transaction sees the state
//! left by the one before it.
//!
//! Staging clones the whole state and the journal entry hashes it, so each
//! transaction costs O(state) on top of the instruction itself. The journal
//! grows until drained unless a limit is set with
//! [`Runtime::with_journal_limit`], in which case the oldest records are
//! dropped first.

use std::collections::VecDeque;
use std::sync::Arc;

use agora_protocol::identity::Address;
use agora_protocol::ledger::{MemoryLedger, TokenLedger};
use agora_protocol::storage::ChainState;
use agora_protocol::transaction::{ExecutionRecord, ExecutionStatus, Instruction, Transaction};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::catalog::create_service;
use crate::error::MarketError;
use crate::registry::initialize;
use crate::resale::{resell_service, Resale};
use crate::settlement::{purchase_service, Settlement};

/// Result of a committed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    MarketplaceInitialized(Address),
    ServiceCreated(Address),
    ServicePurchased(Settlement),
    ServiceResold(Resale),
}

/// Dispatches one instruction to its engine.
///
/// Mutates `state` in place and may leave it partially updated on error;
/// callers wanting atomicity go through [`Runtime::execute`].
pub fn apply<L: TokenLedger>(
    state: &mut ChainState<L>,
    signers: &[Address],
    instruction: &Instruction,
) -> Result<Outcome, MarketError> {
    match instruction {
        Instruction::Initialize(req) => {
            initialize(state, signers, req).map(|_| Outcome::MarketplaceInitialized(req.marketplace))
        }
        Instruction::CreateService(req) => {
            create_service(state, signers, req).map(Outcome::ServiceCreated)
        }
        Instruction::PurchaseService(req) => {
            purchase_service(state, signers, req).map(Outcome::ServicePurchased)
        }
        Instruction::ResellService(req) => {
            resell_service(state, signers, req).map(Outcome::ServiceResold)
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Single-threaded transaction executor.
#[derive(Debug, Default)]
pub struct Runtime<L = MemoryLedger> {
    state: ChainState<L>,
    journal: VecDeque<ExecutionRecord>,
    journal_limit: Option<usize>,
}

impl<L> Runtime<L>
where
    L: TokenLedger + Clone + Serialize,
{
    /// Starts from an existing state, e.g. one loaded from disk.
    pub fn new(state: ChainState<L>) -> Self {
        Self {
            state,
            journal: VecDeque::new(),
            journal_limit: None,
        }
    }

    /// Executes `tx` atomically.
    ///
    /// On success the staged state replaces the committed one. On failure
    /// the committed state is untouched.
    pub fn execute(&mut self, tx: &Transaction) -> Result<Outcome, MarketError> {
        let operation = tx.instruction.name();
        let span = info_span!("execute", tx = %tx.id, op = operation);
        let _guard = span.enter();

        let mut staged = self.state.clone();
        let result = apply(&mut staged, &tx.signers, &tx.instruction);

        let status = match &result {
            Ok(_) => {
                self.state = staged;
                ExecutionStatus::Committed
            }
            Err(err) => {
                warn!(kind = %err.kind(), retryable = err.is_retryable(), error = %err, "transaction aborted");
                ExecutionStatus::Aborted {
                    kind: err.kind().to_string(),
                    reason: err.to_string(),
                }
            }
        };

        let digest = self.state.digest_hex();
        if result.is_ok() {
            info!(digest = %digest, "transaction committed");
        }
        self.record(ExecutionRecord::new(tx.id, operation, status, digest));
        result
    }

    /// Executes each transaction in order; failures do not stop the batch.
    pub fn execute_all<'a, I>(&mut self, txs: I) -> Vec<Result<Outcome, MarketError>>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        txs.into_iter().map(|tx| self.execute(tx)).collect()
    }
}

impl<L> Runtime<L> {
    /// Keeps at most `limit` journal records, dropping the oldest.
    pub fn with_journal_limit(mut self, limit: usize) -> Self {
        self.journal_limit = Some(limit);
        self.trim_journal();
        self
    }

    fn record(&mut self, record: ExecutionRecord) {
        self.journal.push_back(record);
        self.trim_journal();
    }

    fn trim_journal(&mut self) {
        if let Some(limit) = self.journal_limit {
            while self.journal.len() > limit {
                self.journal.pop_front();
            }
        }
    }

    /// Committed state.
    pub fn state(&self) -> &ChainState<L> {
        &self.state
    }

    /// Direct access to the committed state, for seeding balances outside
    /// any transaction.
    pub fn state_mut(&mut self) -> &mut ChainState<L> {
        &mut self.state
    }

    /// Records of every transaction executed since the last drain, oldest
    /// first, within the journal limit.
    pub fn journal(&self) -> &VecDeque<ExecutionRecord> {
        &self.journal
    }

    /// Takes the journal, leaving it empty.
    pub fn drain_journal(&mut self) -> Vec<ExecutionRecord> {
        self.journal.drain(..).collect()
    }

    /// Consumes the runtime, returning the committed state.
    pub fn into_state(self) -> ChainState<L> {
        self.state
    }
}

// ---------------------------------------------------------------------------
// SharedRuntime
// ---------------------------------------------------------------------------

/// A [`Runtime`] shared between threads. Transactions run one at a time.
///
/// The journal is shared too; long-lived handles should drain it
/// periodically or build the runtime with a journal limit.
#[derive(Debug, Default)]
pub struct SharedRuntime<L = MemoryLedger> {
    inner: Arc<Mutex<Runtime<L>>>,
}

impl<L> Clone for SharedRuntime<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L> SharedRuntime<L>
where
    L: TokenLedger + Clone + Serialize,
{
    pub fn new(runtime: Runtime<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(runtime)),
        }
    }

    /// Executes `tx` while holding the lock.
    pub fn execute(&self, tx: &Transaction) -> Result<Outcome, MarketError> {
        self.inner.lock().execute(tx)
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> ChainState<L> {
        self.inner.lock().state().clone()
    }

    /// Runs `f` against the committed state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&ChainState<L>) -> R) -> R {
        f(self.inner.lock().state())
    }

    /// Takes the journal accumulated so far.
    pub fn drain_journal(&self) -> Vec<ExecutionRecord> {
        self.inner.lock().drain_journal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use agora_protocol::transaction::{CreateService, InitializeMarketplace};

    fn addr(byte: u8) -> Address {
        Address::new([byte; 32])
    }

    fn init_tx(fee: u64) -> Transaction {
        Transaction::new(Instruction::Initialize(InitializeMarketplace {
            marketplace: addr(1),
            authority: addr(2),
            fee,
        }))
        .signed_by(addr(2))
    }

    fn listing_tx(price: u64) -> Transaction {
        Transaction::new(Instruction::CreateService(CreateService {
            service: addr(4),
            vendor: addr(3),
            name: "Test Service".into(),
            description: "This is a test service".into(),
            price,
            is_soulbound: false,
        }))
        .signed_by(addr(3))
    }

    #[test]
    fn commit_is_journaled() {
        let mut rt: Runtime = Runtime::default();
        let outcome = rt.execute(&init_tx(100)).unwrap();
        assert_eq!(outcome, Outcome::MarketplaceInitialized(addr(1)));

        let record = &rt.journal()[0];
        assert!(record.is_committed());
        assert_eq!(record.operation, "initialize");
        assert_eq!(record.state_digest, rt.state().digest_hex());
    }

    #[test]
    fn abort_leaves_state_untouched() {
        let mut rt: Runtime = Runtime::default();
        rt.execute(&init_tx(100)).unwrap();
        let before = rt.state().to_bytes();

        let err = rt.execute(&listing_tx(0)).unwrap_err();
        assert_eq!(err, MarketError::InvalidPrice);
        assert_eq!(rt.state().to_bytes(), before);

        match &rt.journal()[1].status {
            ExecutionStatus::Aborted { kind, .. } => assert_eq!(kind, ErrorKind::Validation.as_str()),
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[test]
    fn drain_empties_journal() {
        let mut rt: Runtime = Runtime::default();
        rt.execute_all([&init_tx(1), &listing_tx(10)]);
        assert_eq!(rt.drain_journal().len(), 2);
        assert!(rt.journal().is_empty());
    }

    #[test]
    fn journal_limit_keeps_newest_records() {
        let mut rt: Runtime = Runtime::default().with_journal_limit(2);
        let init = init_tx(1);
        let listing = listing_tx(10);
        let duplicate = listing_tx(20);
        rt.execute_all([&init, &listing, &duplicate]);

        let journal = rt.drain_journal();
        assert_eq!(journal.len(), 2);
        assert_eq!(journal[0].tx_id, listing.id);
        assert_eq!(journal[1].tx_id, duplicate.id);
        assert!(!journal[1].is_committed());
    }

    #[test]
    fn outcome_json_names_variant() {
        let value = serde_json::to_value(Outcome::ServiceCreated(addr(4))).unwrap();
        assert_eq!(value["service_created"], addr(4).to_string());
    }

    #[test]
    fn shared_runtime_clones_share_state() {
        let shared = SharedRuntime::new(Runtime::<MemoryLedger>::default());
        let other = shared.clone();
        shared.execute(&init_tx(100)).unwrap();
        assert!(other.with_state(|s| s.accounts.marketplace(&addr(1)).is_ok()));
        assert_eq!(other.drain_journal().len(), 1);
    }
}
