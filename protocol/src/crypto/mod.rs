//! # Cryptographic Primitives
//!
//! Thin wrappers over audited crates:
//!
//! - **Ed25519** (`ed25519-dalek`) for participant identities.
//! - **SHA-256** (`sha2`) for derived addresses.
//! - **BLAKE3** (`blake3`) for state digests.

pub mod hash;
pub mod keys;

pub use hash::{blake3_hash, derive_address, domain_separated_hash, sha256_array};
pub use keys::{KeyError, Keypair};
