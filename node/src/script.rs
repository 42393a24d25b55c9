//! # Transaction Scripts
//!
//! A script is the JSON input to `agora-node run`: balances to mint before
//! anything executes, then the transactions to execute in order.
//!
//! ```json
//! {
//!   "genesis": [{ "asset": "<usdc>", "owner": "<buyer>", "amount": 10000 }],
//!   "transactions": [{ "signers": ["<authority>"], "instruction": { "type": "initialize", ... } }]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use agora_protocol::identity::{Address, Keypair};
use agora_protocol::storage::AccountStore;
use agora_protocol::transaction::{
    CreateService, InitializeMarketplace, Instruction, PurchaseService, ResaleTarget,
    ResellService, Transaction,
};

/// Units of the payment asset minted before the first transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub asset: Address,
    pub owner: Address,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub genesis: Vec<GenesisBalance>,
    pub transactions: Vec<Transaction>,
}

impl Script {
    /// Reads and parses a script file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse script {}", path.display()))
    }

    /// A complete marketplace round trip with freshly generated identities:
    /// initialize with fee 100, list a service at 1000, fund and purchase,
    /// then resell the receipt at 1500.
    ///
    /// The receipt address is predicted for an empty ledger; against a ledger
    /// that already holds receipts the resale targets a missing receipt.
    pub fn template(soulbound: bool) -> Result<Self> {
        let authority = Keypair::generate().address();
        let vendor = Keypair::generate().address();
        let buyer = Keypair::generate().address();
        let next_owner = Keypair::generate().address();
        let marketplace = Keypair::generate().address();
        let service = Keypair::generate().address();
        let usdc = Keypair::generate().address();

        let receipt = AccountStore::new()
            .next_receipt_address(&service, &buyer)
            .context("failed to predict receipt address")?;

        let transactions = vec![
            Transaction::new(Instruction::Initialize(InitializeMarketplace {
                marketplace,
                authority,
                fee: 100,
            }))
            .signed_by(authority),
            Transaction::new(Instruction::CreateService(CreateService {
                service,
                vendor,
                name: "Test Service".into(),
                description: "This is a test service".into(),
                price: 1_000,
                is_soulbound: soulbound,
            }))
            .signed_by(vendor),
            Transaction::new(Instruction::PurchaseService(PurchaseService {
                buyer,
                service,
                marketplace,
                payment_asset: usdc,
                vendor,
                operator: authority,
            }))
            .signed_by(buyer),
            Transaction::new(Instruction::ResellService(ResellService {
                target: ResaleTarget::Receipt(receipt),
                seller: buyer,
                buyer: Some(next_owner),
                new_price: 1_500,
            }))
            .signed_by(buyer)
            .signed_by(next_owner),
        ];

        Ok(Self {
            genesis: vec![GenesisBalance {
                asset: usdc,
                owner: buyer,
                amount: 10_000,
            }],
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_roundtrips_through_json() {
        let script = Script::template(false).unwrap();
        let json = serde_json::to_string_pretty(&script).unwrap();
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
        assert_eq!(back.transactions.len(), 4);
    }

    #[test]
    fn genesis_is_optional() {
        let script: Script = serde_json::from_str(r#"{"transactions":[]}"#).unwrap();
        assert!(script.genesis.is_empty());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Script::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read script"));
    }
}
