//! # Marketplace Registry
//!
//! Creates the global [`Marketplace`] record: who operates the marketplace
//! and the flat fee it takes on every purchase. The record is immutable once
//! written; a second `initialize` at the same address fails with
//! [`MarketError::AccountAlreadyExists`].

use agora_protocol::identity::Address;
use agora_protocol::storage::{ChainState, Marketplace};
use agora_protocol::transaction::InitializeMarketplace;

use crate::error::{MarketError, Role};
use crate::signers::require_signer;

/// Creates a marketplace at `req.marketplace` with `authority` and `fee`.
///
/// Any fee is accepted here, zero included. Whether it fits a given
/// service's price is checked at purchase time.
///
/// # Errors
///
/// - [`MarketError::MissingSigner`] if the authority did not co-sign.
/// - [`MarketError::AccountAlreadyExists`] if the address is in use.
pub fn initialize<L>(
    state: &mut ChainState<L>,
    signers: &[Address],
    req: &InitializeMarketplace,
) -> Result<Marketplace, MarketError> {
    require_signer(signers, Role::Authority, &req.authority)?;

    let marketplace = Marketplace {
        authority: req.authority,
        fee: req.fee,
    };
    state
        .accounts
        .create_marketplace(req.marketplace, marketplace.clone())?;

    tracing::debug!(
        marketplace = %req.marketplace,
        authority = %req.authority,
        fee = req.fee,
        "marketplace initialized"
    );
    Ok(marketplace)
}
