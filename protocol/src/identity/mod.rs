//! # Identity Module
//!
//! Participants are identified by their Ed25519 public key, used directly as
//! an [`Address`]. Records and assets share the same address space, so a
//! single type flows through every instruction.
//!
//! Signature verification happens in the substrate before an instruction
//! reaches the engine. The engine only checks that the right addresses
//! appear in a transaction's signer set.

pub mod address;

pub use address::{Address, AddressError, ADDRESS_LENGTH};
pub use crate::crypto::keys::Keypair;
