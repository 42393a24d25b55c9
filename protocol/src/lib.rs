// Copyright (c) 2026 Agora Contributors. MIT License.
// See LICENSE for details.

//! # Agora Protocol: Core Library
//!
//! Shared building blocks for the Agora service marketplace: the types every
//! other crate in the workspace speaks in.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants: field limits, derivation seeds, defaults.
//! - **crypto**: Hashing, address derivation, and Ed25519 keypairs.
//! - **identity**: The 32-byte [`Address`](identity::Address) used for every
//!   participant, record, and asset.
//! - **ledger**: The token-ledger adapter the settlement logic calls into,
//!   plus an in-memory implementation for simulation and tests.
//! - **storage**: Marketplace/Service/Receipt records, the account store,
//!   and sled-backed persistence of the whole chain state.
//! - **transaction**: Instructions, the signed transaction envelope, and
//!   execution records.
//!
//! ## Design Philosophy
//!
//! 1. Records are plain data. Behaviour lives in `agora-contracts`.
//! 2. Money math is overflow-checked. No wrapping, no saturating.
//! 3. Everything that crosses a process boundary is serde-serializable.

pub mod config;
pub mod crypto;
pub mod identity;
pub mod ledger;
pub mod storage;
pub mod transaction;
