//! # Service Catalog
//!
//! Vendors list services here. A listing starts active, with the vendor as
//! the signing caller; its soulbound flag is fixed for life and copied into
//! every receipt later minted for it.

use agora_protocol::identity::Address;
use agora_protocol::storage::{ChainState, Service};
use agora_protocol::transaction::CreateService;

use crate::error::{MarketError, Role};
use crate::signers::require_signer;

/// Checks the listing fields without touching state.
///
/// Name and description are free text and stored as given; only the price
/// is constrained.
pub fn validate_listing(price: u64) -> Result<(), MarketError> {
    if price == 0 {
        return Err(MarketError::InvalidPrice);
    }
    Ok(())
}

/// Lists a new service at `req.service`.
///
/// # Errors
///
/// - [`MarketError::MissingSigner`] if the vendor did not co-sign.
/// - [`MarketError::InvalidPrice`] if the price is zero.
/// - [`MarketError::AccountAlreadyExists`] if the address is in use.
pub fn create_service<L>(
    state: &mut ChainState<L>,
    signers: &[Address],
    req: &CreateService,
) -> Result<Address, MarketError> {
    require_signer(signers, Role::Vendor, &req.vendor)?;
    validate_listing(req.price)?;

    let service = Service {
        vendor: req.vendor,
        name: req.name.clone(),
        description: req.description.clone(),
        price: req.price,
        is_soulbound: req.is_soulbound,
        is_active: true,
    };
    state.accounts.create_service(req.service, service)?;

    tracing::debug!(
        service = %req.service,
        vendor = %req.vendor,
        price = req.price,
        soulbound = req.is_soulbound,
        "service listed"
    );
    Ok(req.service)
}
