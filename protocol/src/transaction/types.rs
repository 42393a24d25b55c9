//! Instruction and transaction types.
//!
//! Each marketplace operation is one [`Instruction`] variant carrying a
//! request struct. A [`Transaction`] wraps one instruction together with the
//! set of addresses whose signatures the substrate has already verified.
//!
//! JSON shape (as accepted by `agora-node run`):
//!
//! ```json
//! {
//!   "signers": ["<buyer>"],
//!   "instruction": {
//!     "type": "purchase_service",
//!     "buyer": "<buyer>",
//!     "service": "<service>",
//!     "marketplace": "<marketplace>",
//!     "payment_asset": "<asset>",
//!     "vendor": "<vendor>",
//!     "operator": "<operator>"
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::identity::Address;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Create the global marketplace record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeMarketplace {
    /// Fresh address for the marketplace record.
    pub marketplace: Address,
    /// Operator identity. Must sign.
    pub authority: Address,
    pub fee: u64,
}

/// List a new service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateService {
    /// Fresh address for the service record.
    pub service: Address,
    /// Vendor identity. Must sign.
    pub vendor: Address,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub is_soulbound: bool,
}

/// Buy a service: pay the vendor and operator, receive a receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseService {
    /// Buyer identity. Must sign.
    pub buyer: Address,
    pub service: Address,
    pub marketplace: Address,
    /// Fungible asset the price is paid in.
    pub payment_asset: Address,
    /// Must equal the service's vendor.
    pub vendor: Address,
    /// Must equal the marketplace authority.
    pub operator: Address,
}

/// What a resale acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResaleTarget {
    /// A purchased receipt: ownership moves to the buyer.
    Receipt(Address),
    /// A listing that was never purchased: only the price changes.
    Listing(Address),
}

/// Hand a receipt (or an unsold listing) to a new holder at a new price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResellService {
    pub target: ResaleTarget,
    /// Current receipt owner, or the vendor for a listing. Must sign.
    pub seller: Address,
    /// Receiving party. Must sign when present; required for receipts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Address>,
    pub new_price: u64,
}

// ---------------------------------------------------------------------------
// Instruction
// ---------------------------------------------------------------------------

/// One marketplace operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    Initialize(InitializeMarketplace),
    CreateService(CreateService),
    PurchaseService(PurchaseService),
    ResellService(ResellService),
}

impl Instruction {
    /// Stable operation name, used in logs, metrics and the journal.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Initialize(_) => "initialize",
            Instruction::CreateService(_) => "create_service",
            Instruction::PurchaseService(_) => "purchase_service",
            Instruction::ResellService(_) => "resell_service",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An instruction plus its verified co-signers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub signers: Vec<Address>,
    pub instruction: Instruction,
}

impl Transaction {
    /// Wraps an instruction with a fresh id and no signers.
    pub fn new(instruction: Instruction) -> Self {
        Self {
            id: Uuid::new_v4(),
            signers: Vec::new(),
            instruction,
        }
    }

    /// Adds a co-signer.
    pub fn signed_by(mut self, signer: Address) -> Self {
        if !self.signers.contains(&signer) {
            self.signers.push(signer);
        }
        self
    }

    /// Returns `true` if `address` co-signed.
    pub fn is_signed_by(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }
}

// ---------------------------------------------------------------------------
// Execution Record
// ---------------------------------------------------------------------------

/// Whether a transaction took effect.
///
/// Externally tagged so the journal stays bincode-friendly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Committed,
    Aborted {
        /// Error category, e.g. `"soulbound"`.
        kind: String,
        /// Human-readable error message.
        reason: String,
    },
}

/// Journal entry written for every executed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub tx_id: Uuid,
    pub operation: String,
    pub status: ExecutionStatus,
    /// Hex digest of the committed state after this transaction.
    pub state_digest: String,
    pub executed_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn new(tx_id: Uuid, operation: &str, status: ExecutionStatus, state_digest: String) -> Self {
        Self {
            tx_id,
            operation: operation.to_string(),
            status,
            state_digest,
            executed_at: Utc::now(),
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.status, ExecutionStatus::Committed)
    }
}
