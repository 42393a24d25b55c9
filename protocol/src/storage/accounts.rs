//! # Marketplace Records
//!
//! The three account kinds the marketplace stores. They are plain data:
//! every rule about who may create or change them lives in
//! `agora-contracts`.

use serde::{Deserialize, Serialize};

use crate::config::RECEIPT_ASSET_SEED;
use crate::crypto::derive_address;
use crate::identity::Address;

/// Global marketplace configuration. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marketplace {
    /// Operator identity; receives the flat fee on every purchase.
    pub authority: Address,
    /// Flat fee deducted from each purchase price.
    pub fee: u64,
}

/// A listed service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// The vendor who created the listing and receives sale proceeds.
    pub vendor: Address,
    pub name: String,
    pub description: String,
    /// Current listing price. Only resale changes it.
    pub price: u64,
    /// Receipts for this service can never change hands. Fixed at creation.
    pub is_soulbound: bool,
    /// Set at creation. Advisory: no instruction flips it.
    pub is_active: bool,
}

/// Proof of purchase of a [`Service`], backed by a one-unit asset.
///
/// `service` is an identifier only. Nothing points back from a Service to
/// its receipts, and a Service may back any number of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub owner: Address,
    pub service: Address,
    /// Copied from the Service at mint time and never changed afterwards.
    pub is_soulbound: bool,
}

impl Receipt {
    /// Address of the one-unit asset backing the receipt stored at
    /// `receipt_address`.
    pub fn asset_id(receipt_address: &Address) -> Address {
        derive_address(&[RECEIPT_ASSET_SEED, receipt_address.as_bytes()])
    }
}

/// Which kind of record an address holds. Used in error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Marketplace,
    Service,
    Receipt,
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKind::Marketplace => write!(f, "marketplace"),
            AccountKind::Service => write!(f, "service"),
            AccountKind::Receipt => write!(f, "receipt"),
        }
    }
}
