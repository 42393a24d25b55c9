//! # Chain State
//!
//! [`AccountStore`] is the account storage the substrate hands the engine:
//! one ordered map per record kind, sharing a single address space.
//! [`ChainState`] pairs it with the token ledger so that a whole transaction
//! can be staged on one clone and committed (or dropped) in one move.
//!
//! ## Address allocation
//!
//! An address holds at most one record of any kind. Creating a record at an
//! occupied address fails with [`AccountError::AlreadyExists`]; this is the
//! only thing preventing a marketplace from being initialized twice.
//!
//! ## Digest
//!
//! ```text
//! digest = BLAKE3-derive-key("agora chain state v1", bincode(ChainState))
//! ```
//!
//! Ordered maps make the encoding, and so the digest, independent of
//! insertion order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::accounts::{AccountKind, Marketplace, Receipt, Service};
use crate::config::RECEIPT_SEED;
use crate::crypto::{derive_address, domain_separated_hash};
use crate::identity::Address;
use crate::ledger::MemoryLedger;

const STATE_DIGEST_CONTEXT: &str = "agora chain state v1";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by account allocation and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// No record of the expected kind lives at this address.
    #[error("{kind} account not found: {address}")]
    NotFound {
        /// Expected record kind.
        kind: AccountKind,
        /// Looked-up address.
        address: Address,
    },

    /// The address is already allocated.
    #[error("account already in use: {address}")]
    AlreadyExists {
        /// Occupied address.
        address: Address,
    },

    /// The receipt sequence is exhausted.
    #[error("receipt sequence exhausted")]
    SequenceExhausted,
}

// ---------------------------------------------------------------------------
// AccountStore
// ---------------------------------------------------------------------------

/// Marketplace, Service and Receipt records keyed by address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStore {
    marketplaces: BTreeMap<Address, Marketplace>,
    services: BTreeMap<Address, Service>,
    receipts: BTreeMap<Address, Receipt>,
    /// Number of receipts ever allocated. Seeds fresh receipt addresses.
    receipt_sequence: u64,
}

impl AccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any record lives at `address`.
    pub fn is_allocated(&self, address: &Address) -> bool {
        self.marketplaces.contains_key(address)
            || self.services.contains_key(address)
            || self.receipts.contains_key(address)
    }

    fn ensure_free(&self, address: &Address) -> Result<(), AccountError> {
        if self.is_allocated(address) {
            return Err(AccountError::AlreadyExists { address: *address });
        }
        Ok(())
    }

    // -- Marketplaces -------------------------------------------------------

    pub fn create_marketplace(
        &mut self,
        address: Address,
        marketplace: Marketplace,
    ) -> Result<(), AccountError> {
        self.ensure_free(&address)?;
        self.marketplaces.insert(address, marketplace);
        Ok(())
    }

    pub fn marketplace(&self, address: &Address) -> Result<&Marketplace, AccountError> {
        self.marketplaces.get(address).ok_or(AccountError::NotFound {
            kind: AccountKind::Marketplace,
            address: *address,
        })
    }

    // -- Services -----------------------------------------------------------

    pub fn create_service(&mut self, address: Address, service: Service) -> Result<(), AccountError> {
        self.ensure_free(&address)?;
        self.services.insert(address, service);
        Ok(())
    }

    pub fn service(&self, address: &Address) -> Result<&Service, AccountError> {
        self.services.get(address).ok_or(AccountError::NotFound {
            kind: AccountKind::Service,
            address: *address,
        })
    }

    pub fn service_mut(&mut self, address: &Address) -> Result<&mut Service, AccountError> {
        self.services.get_mut(address).ok_or(AccountError::NotFound {
            kind: AccountKind::Service,
            address: *address,
        })
    }

    // -- Receipts -----------------------------------------------------------

    /// Reserves a fresh receipt address for a purchase of `service` by
    /// `buyer`, advancing the receipt sequence.
    ///
    /// ```text
    /// address = derive(["receipt", service, buyer, sequence_le])
    /// ```
    pub fn next_receipt_address(
        &mut self,
        service: &Address,
        buyer: &Address,
    ) -> Result<Address, AccountError> {
        let sequence = self.receipt_sequence;
        let address = derive_address(&[
            RECEIPT_SEED,
            service.as_bytes(),
            buyer.as_bytes(),
            &sequence.to_le_bytes(),
        ]);
        self.ensure_free(&address)?;
        self.receipt_sequence = sequence
            .checked_add(1)
            .ok_or(AccountError::SequenceExhausted)?;
        Ok(address)
    }

    pub fn create_receipt(&mut self, address: Address, receipt: Receipt) -> Result<(), AccountError> {
        self.ensure_free(&address)?;
        self.receipts.insert(address, receipt);
        Ok(())
    }

    pub fn receipt(&self, address: &Address) -> Result<&Receipt, AccountError> {
        self.receipts.get(address).ok_or(AccountError::NotFound {
            kind: AccountKind::Receipt,
            address: *address,
        })
    }

    pub fn receipt_mut(&mut self, address: &Address) -> Result<&mut Receipt, AccountError> {
        self.receipts.get_mut(address).ok_or(AccountError::NotFound {
            kind: AccountKind::Receipt,
            address: *address,
        })
    }

    /// Receipts currently owned by `owner`, ordered by address.
    pub fn receipts_owned_by(&self, owner: &Address) -> Vec<(Address, &Receipt)> {
        self.receipts
            .iter()
            .filter(|(_, r)| &r.owner == owner)
            .map(|(addr, r)| (*addr, r))
            .collect()
    }

    /// Receipts issued for `service`. A full scan: services keep no index
    /// of their receipts.
    pub fn receipts_for_service(&self, service: &Address) -> Vec<(Address, &Receipt)> {
        self.receipts
            .iter()
            .filter(|(_, r)| &r.service == service)
            .map(|(addr, r)| (*addr, r))
            .collect()
    }

    // -- Iteration ----------------------------------------------------------

    pub fn marketplaces(&self) -> impl Iterator<Item = (&Address, &Marketplace)> {
        self.marketplaces.iter()
    }

    pub fn services(&self) -> impl Iterator<Item = (&Address, &Service)> {
        self.services.iter()
    }

    pub fn receipts(&self) -> impl Iterator<Item = (&Address, &Receipt)> {
        self.receipts.iter()
    }

    /// Number of receipts ever issued.
    pub fn receipt_sequence(&self) -> u64 {
        self.receipt_sequence
    }
}

// ---------------------------------------------------------------------------
// ChainState
// ---------------------------------------------------------------------------

/// Everything a transaction can touch: records plus token balances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState<L = MemoryLedger> {
    pub accounts: AccountStore,
    pub ledger: L,
}

impl<L> ChainState<L> {
    /// Wraps an existing ledger with an empty account store.
    pub fn with_ledger(ledger: L) -> Self {
        Self {
            accounts: AccountStore::new(),
            ledger,
        }
    }
}

impl<L: Serialize> ChainState<L> {
    /// Canonical binary encoding, as persisted and as hashed.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    /// Domain-separated BLAKE3 digest of the canonical encoding.
    pub fn digest(&self) -> [u8; 32] {
        domain_separated_hash(STATE_DIGEST_CONTEXT, &self.to_bytes())
    }

    /// Hex form of [`digest`](Self::digest).
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TokenLedger;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 32])
    }

    fn service(vendor: Address) -> Service {
        Service {
            vendor,
            name: "Test Service".into(),
            description: "This is a test service".into(),
            price: 1_000,
            is_soulbound: false,
            is_active: true,
        }
    }

    #[test]
    fn address_space_is_shared_across_kinds() {
        let mut store = AccountStore::new();
        store
            .create_marketplace(addr(1), Marketplace { authority: addr(9), fee: 100 })
            .unwrap();
        let err = store.create_service(addr(1), service(addr(2))).unwrap_err();
        assert_eq!(err, AccountError::AlreadyExists { address: addr(1) });
    }

    #[test]
    fn lookup_of_wrong_kind_is_not_found() {
        let mut store = AccountStore::new();
        store.create_service(addr(3), service(addr(2))).unwrap();
        assert!(matches!(
            store.marketplace(&addr(3)),
            Err(AccountError::NotFound {
                kind: AccountKind::Marketplace,
                ..
            })
        ));
    }

    #[test]
    fn receipt_addresses_are_unique_per_sequence() {
        let mut store = AccountStore::new();
        let a = store.next_receipt_address(&addr(3), &addr(4)).unwrap();
        let b = store.next_receipt_address(&addr(3), &addr(4)).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.receipt_sequence(), 2);
    }

    #[test]
    fn receipt_queries_filter_by_owner_and_service() {
        let mut store = AccountStore::new();
        let r1 = Receipt { owner: addr(4), service: addr(3), is_soulbound: false };
        let r2 = Receipt { owner: addr(5), service: addr(3), is_soulbound: true };
        store.create_receipt(addr(10), r1.clone()).unwrap();
        store.create_receipt(addr(11), r2).unwrap();

        assert_eq!(store.receipts_owned_by(&addr(4)), vec![(addr(10), &r1)]);
        assert_eq!(store.receipts_for_service(&addr(3)).len(), 2);
        assert!(store.receipts_for_service(&addr(99)).is_empty());
    }

    #[test]
    fn digest_tracks_content() {
        let mut state: ChainState = ChainState::default();
        let empty = state.digest();
        state.ledger.mint(&addr(7), &addr(8), 10).unwrap();
        assert_ne!(state.digest(), empty);
        assert_eq!(state.digest_hex().len(), 64);
    }

    #[test]
    fn digest_is_insertion_order_independent() {
        let mut a: ChainState = ChainState::default();
        let mut b: ChainState = ChainState::default();
        a.accounts.create_service(addr(1), service(addr(9))).unwrap();
        a.accounts.create_service(addr(2), service(addr(9))).unwrap();
        b.accounts.create_service(addr(2), service(addr(9))).unwrap();
        b.accounts.create_service(addr(1), service(addr(9))).unwrap();
        assert_eq!(a.digest(), b.digest());
    }
}
