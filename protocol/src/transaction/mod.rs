//! # Transactions
//!
//! A transaction is one marketplace instruction plus the addresses that
//! co-signed it. The engine in `agora-contracts` executes transactions
//! atomically and emits an [`ExecutionRecord`] for each one.

pub mod types;

pub use types::{
    CreateService, ExecutionRecord, ExecutionStatus, InitializeMarketplace, Instruction,
    PurchaseService, ResaleTarget, ResellService, Transaction,
};
