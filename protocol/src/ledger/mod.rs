//! # Token Ledger Adapter
//!
//! The settlement logic never touches balances directly. It calls into a
//! [`TokenLedger`], the seam to whatever token subsystem the host substrate
//! provides (fungible payment assets and one-unit receipt assets alike).
//!
//! Implementations must make each call all-or-nothing: a failed `transfer`
//! or `mint` leaves every balance untouched. Transaction-level atomicity
//! across several calls is the runtime's job, not the ledger's.
//!
//! [`MemoryLedger`] is the in-process implementation used by the node's
//! simulator and by tests.

pub mod memory;

use thiserror::Error;

use crate::identity::Address;

pub use memory::MemoryLedger;

/// Errors reported by a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The source holds less than the requested amount.
    #[error("insufficient balance of asset {asset}: {owner} holds {available}, needs {requested}")]
    InsufficientBalance {
        /// Asset being moved.
        asset: Address,
        /// Account being debited.
        owner: Address,
        /// Balance at the time of the call.
        available: u64,
        /// Amount requested.
        requested: u64,
    },

    /// A credit or mint would overflow `u64`.
    #[error("balance overflow for asset {asset}: crediting {amount} to {owner}")]
    Overflow {
        /// Asset being credited.
        asset: Address,
        /// Account being credited.
        owner: Address,
        /// Amount that overflowed.
        amount: u64,
    },

    /// Minting zero units is meaningless and rejected.
    #[error("cannot mint zero units of asset {0}")]
    ZeroMint(Address),
}

/// Balance bookkeeping the marketplace delegates to the token subsystem.
///
/// Balances are keyed by `(asset, owner)`, the way associated token
/// accounts are keyed on account-model ledgers.
pub trait TokenLedger {
    /// Current balance of `asset` held by `owner`. Unknown pairs hold zero.
    fn balance(&self, asset: &Address, owner: &Address) -> u64;

    /// Total minted supply of `asset`.
    fn supply(&self, asset: &Address) -> u64;

    /// Moves `amount` of `asset` from `from` to `to`.
    ///
    /// Transferring zero succeeds without touching state.
    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Creates `amount` new units of `asset` and credits them to `to`.
    fn mint(&mut self, asset: &Address, to: &Address, amount: u64) -> Result<(), LedgerError>;
}
