//! # LedgerDb: Persistent Storage
//!
//! sled-backed persistence for the node. The simulator keeps the live
//! [`ChainState`] in memory and writes a full snapshot after each run; the
//! execution journal is appended record by record.
//!
//! ## Tree Layout
//!
//! | Tree       | Key                   | Value                     |
//! |------------|-----------------------|---------------------------|
//! | `state`    | `"current"`           | `bincode(ChainState)`     |
//! | `journal`  | `sequence` (8B BE)    | `bincode(ExecutionRecord)`|
//! | `metadata` | key (UTF-8)           | value (bytes)             |
//!
//! Journal sequences are big-endian so sled's lexicographic order is
//! execution order.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Batch, Db, Tree};
use std::path::Path;

use super::state::ChainState;
use crate::config::STATE_FORMAT_VERSION;
use crate::transaction::ExecutionRecord;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("state format version {found} is not supported (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

const STATE_KEY: &[u8] = b"current";
const META_FORMAT_VERSION: &[u8] = b"state_format_version";
const META_STATE_DIGEST: &[u8] = b"state_digest";
const META_NEXT_JOURNAL_SEQ: &[u8] = b"next_journal_sequence";

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Persistent store for chain state snapshots and the execution journal.
///
/// sled trees are safe to share across threads; clone the handle freely.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    state: Tree,
    journal: Tree,
    metadata: Tree,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database, removed when dropped. For tests.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let state = db.open_tree("state")?;
        let journal = db.open_tree("journal")?;
        let metadata = db.open_tree("metadata")?;
        Ok(Self {
            db,
            state,
            journal,
            metadata,
        })
    }

    // -- State --------------------------------------------------------------

    /// Persist a full snapshot of `state`, replacing the previous one.
    pub fn save_state<L: Serialize>(&self, state: &ChainState<L>) -> DbResult<()> {
        let bytes =
            bincode::serialize(state).map_err(|e| DbError::Serialization(e.to_string()))?;
        let digest = state.digest();

        self.state.insert(STATE_KEY, bytes)?;

        let mut meta = Batch::default();
        meta.insert(META_FORMAT_VERSION, STATE_FORMAT_VERSION.to_be_bytes().to_vec());
        meta.insert(META_STATE_DIGEST, digest.to_vec());
        self.metadata.apply_batch(meta)?;

        self.db.flush()?;
        tracing::debug!(digest = %hex::encode(digest), "state snapshot saved");
        Ok(())
    }

    /// Load the last saved snapshot, or `None` for a fresh database.
    pub fn load_state<L: DeserializeOwned>(&self) -> DbResult<Option<ChainState<L>>> {
        if let Some(raw) = self.metadata.get(META_FORMAT_VERSION)? {
            let found = decode_u32(&raw)?;
            if found != STATE_FORMAT_VERSION {
                return Err(DbError::UnsupportedFormat {
                    found,
                    expected: STATE_FORMAT_VERSION,
                });
            }
        }

        match self.state.get(STATE_KEY)? {
            Some(bytes) => {
                let state = bincode::deserialize(&bytes)
                    .map_err(|e| DbError::Serialization(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    /// Digest recorded alongside the last snapshot, if any.
    pub fn state_digest(&self) -> DbResult<Option<[u8; 32]>> {
        match self.metadata.get(META_STATE_DIGEST)? {
            Some(raw) if raw.len() == 32 => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&raw);
                Ok(Some(out))
            }
            Some(_) => Err(DbError::Serialization("malformed state digest".into())),
            None => Ok(None),
        }
    }

    // -- Journal ------------------------------------------------------------

    /// Append execution records in order.
    pub fn append_journal(&self, records: &[ExecutionRecord]) -> DbResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut next = self.next_journal_sequence()?;
        let mut batch = Batch::default();
        for record in records {
            let bytes =
                bincode::serialize(record).map_err(|e| DbError::Serialization(e.to_string()))?;
            batch.insert(next.to_be_bytes().to_vec(), bytes);
            next += 1;
        }
        self.journal.apply_batch(batch)?;
        self.metadata
            .insert(META_NEXT_JOURNAL_SEQ, next.to_be_bytes().to_vec())?;
        self.db.flush()?;
        Ok(())
    }

    /// Every journal record, oldest first.
    pub fn journal(&self) -> DbResult<Vec<ExecutionRecord>> {
        self.journal
            .iter()
            .values()
            .map(|value| {
                let bytes = value?;
                bincode::deserialize(&bytes).map_err(|e| DbError::Serialization(e.to_string()))
            })
            .collect()
    }

    /// Number of journal records.
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    fn next_journal_sequence(&self) -> DbResult<u64> {
        match self.metadata.get(META_NEXT_JOURNAL_SEQ)? {
            Some(raw) => {
                let bytes: [u8; 8] = raw[..]
                    .try_into()
                    .map_err(|_| DbError::Serialization("malformed journal sequence".into()))?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(0),
        }
    }
}

fn decode_u32(raw: &[u8]) -> DbResult<u32> {
    let bytes: [u8; 4] = raw
        .try_into()
        .map_err(|_| DbError::Serialization("malformed format version".into()))?;
    Ok(u32::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Address;
    use crate::ledger::{MemoryLedger, TokenLedger};
    use crate::transaction::{ExecutionRecord, ExecutionStatus};

    #[test]
    fn fresh_database_has_no_state() {
        let db = LedgerDb::open_temporary().unwrap();
        let loaded: Option<ChainState<MemoryLedger>> = db.load_state().unwrap();
        assert!(loaded.is_none());
        assert!(db.state_digest().unwrap().is_none());
    }

    #[test]
    fn state_snapshot_roundtrip() {
        let db = LedgerDb::open_temporary().unwrap();
        let mut state: ChainState = ChainState::default();
        state
            .ledger
            .mint(&Address::new([1u8; 32]), &Address::new([2u8; 32]), 500)
            .unwrap();

        db.save_state(&state).unwrap();
        let loaded: ChainState = db.load_state().unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(db.state_digest().unwrap(), Some(state.digest()));
    }

    #[test]
    fn journal_preserves_order() {
        let db = LedgerDb::open_temporary().unwrap();
        let first = ExecutionRecord::new(
            uuid::Uuid::new_v4(),
            "initialize",
            ExecutionStatus::Committed,
            "00".into(),
        );
        let second = ExecutionRecord::new(
            uuid::Uuid::new_v4(),
            "create_service",
            ExecutionStatus::Committed,
            "11".into(),
        );
        db.append_journal(&[first.clone()]).unwrap();
        db.append_journal(&[second.clone()]).unwrap();

        let journal = db.journal().unwrap();
        assert_eq!(journal.len(), 2);
        assert_eq!(journal[0].tx_id, first.tx_id);
        assert_eq!(journal[1].tx_id, second.tx_id);
        assert_eq!(db.journal_len(), 2);
    }
}
