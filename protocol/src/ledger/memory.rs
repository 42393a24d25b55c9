//! In-memory [`TokenLedger`].
//!
//! Balances live in ordered maps so that serialization (and therefore the
//! state digest) is deterministic regardless of insertion order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LedgerError, TokenLedger};
use crate::identity::Address;

/// An in-process token ledger: `asset -> owner -> amount`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    balances: BTreeMap<Address, BTreeMap<Address, u64>>,
    supplies: BTreeMap<Address, u64>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every non-zero holding of `asset`, ordered by owner.
    pub fn holders(&self, asset: &Address) -> Vec<(Address, u64)> {
        self.balances
            .get(asset)
            .map(|owners| {
                owners
                    .iter()
                    .filter(|(_, amount)| **amount > 0)
                    .map(|(owner, amount)| (*owner, *amount))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of distinct assets ever minted.
    pub fn asset_count(&self) -> usize {
        self.supplies.len()
    }
}

impl TokenLedger for MemoryLedger {
    fn balance(&self, asset: &Address, owner: &Address) -> u64 {
        self.balances
            .get(asset)
            .and_then(|owners| owners.get(owner))
            .copied()
            .unwrap_or(0)
    }

    fn supply(&self, asset: &Address) -> u64 {
        self.supplies.get(asset).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }

        let available = self.balance(asset, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: *asset,
                owner: *from,
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        // Compute both sides before writing either.
        let debited = available - amount;
        let credited = self
            .balance(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                asset: *asset,
                owner: *to,
                amount,
            })?;

        let owners = self.balances.entry(*asset).or_default();
        owners.insert(*from, debited);
        owners.insert(*to, credited);

        tracing::trace!(asset = %asset.short(), from = %from.short(), to = %to.short(), amount, "transfer");
        Ok(())
    }

    fn mint(&mut self, asset: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroMint(*asset));
        }

        let overflow = LedgerError::Overflow {
            asset: *asset,
            owner: *to,
            amount,
        };
        let supply = self
            .supply(asset)
            .checked_add(amount)
            .ok_or_else(|| overflow.clone())?;
        let credited = self.balance(asset, to).checked_add(amount).ok_or(overflow)?;

        self.supplies.insert(*asset, supply);
        self.balances.entry(*asset).or_default().insert(*to, credited);

        tracing::trace!(asset = %asset.short(), to = %to.short(), amount, "mint");
        Ok(())
    }
}
