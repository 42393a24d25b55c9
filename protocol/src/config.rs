//! # Protocol Configuration & Constants
//!
//! Fixed parameters of the marketplace: receipt derivation seeds and the
//! defaults shared by the node.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Protocol version string, reported by `agora-node version`.
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// On-disk format version for persisted chain state. Bump whenever the
/// bincode layout of `ChainState` changes.
pub const STATE_FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Units minted for each receipt asset. A receipt is non-fungible, so
/// exactly one unit ever exists.
pub const RECEIPT_ASSET_SUPPLY: u64 = 1;

/// Seed prefix for receipt record addresses.
pub const RECEIPT_SEED: &[u8] = b"receipt";

/// Seed prefix for the one-unit asset backing a receipt.
pub const RECEIPT_ASSET_SEED: &[u8] = b"receipt-asset";

/// Domain separator mixed into every derived address so derived addresses
/// never collide with raw Ed25519 public keys by construction of the preimage.
pub const DERIVATION_DOMAIN: &[u8] = b"agora/derived-address/v1";

// ---------------------------------------------------------------------------
// Node Defaults
// ---------------------------------------------------------------------------

/// Default data directory for the node's sled database.
pub const DEFAULT_DATA_DIR: &str = ".agora";

/// Name of the sled database directory inside the data directory.
pub const DB_DIR_NAME: &str = "db";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_seeds_are_distinct() {
        assert_ne!(RECEIPT_SEED, RECEIPT_ASSET_SEED);
        assert_eq!(RECEIPT_ASSET_SUPPLY, 1);
    }
}
