//! # Storage Module
//!
//! ```text
//! accounts.rs  Marketplace, Service and Receipt records
//! state.rs     AccountStore (address-keyed records) and ChainState
//! db.rs        sled persistence for state snapshots and the journal
//! ```
//!
//! In memory, everything lives in ordered maps. On disk, everything is
//! bincode. JSON is for scripts and the CLI.

pub mod accounts;
pub mod db;
pub mod state;

pub use accounts::{AccountKind, Marketplace, Receipt, Service};
pub use db::{DbError, DbResult, LedgerDb};
pub use state::{AccountError, AccountStore, ChainState};
