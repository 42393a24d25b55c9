//! # Resale Engine
//!
//! Hands a purchased receipt to a new holder and reprices the listing it
//! refers to. A listing that was never purchased can also be "resold" by its
//! vendor, which only changes the price.
//!
//! Soulbound receipts and listings never change hands: the flag is checked
//! right after signer presence, so a soulbound resale fails with
//! [`MarketError::SoulboundViolation`] whatever else is wrong with it.
//!
//! No payment moves on resale.

use agora_protocol::config::RECEIPT_ASSET_SUPPLY;
use agora_protocol::identity::Address;
use agora_protocol::ledger::TokenLedger;
use agora_protocol::storage::{ChainState, Receipt};
use agora_protocol::transaction::{ResaleTarget, ResellService};
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Role};
use crate::signers::{require_match, require_signer};

/// What a successful resale changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resale {
    pub target: ResaleTarget,
    /// Service whose price was updated.
    pub service: Address,
    pub previous_owner: Address,
    /// Equal to `previous_owner` for a listing resale.
    pub new_owner: Address,
    pub previous_price: u64,
    pub new_price: u64,
}

/// Resells `req.target` at `req.new_price`.
///
/// # Errors
///
/// - [`MarketError::MissingSigner`] if the seller, or a named buyer, did not
///   co-sign.
/// - [`MarketError::AccountNotFound`] for an unknown receipt or service.
/// - [`MarketError::SoulboundViolation`] if the target is soulbound.
/// - [`MarketError::MissingBuyer`] for a receipt resale without a buyer.
/// - [`MarketError::SignerMismatch`] if the seller is not the current owner
///   (receipt) or vendor (listing).
/// - [`MarketError::InvalidPrice`] if `new_price` is zero.
/// - [`MarketError::Ledger`] if the receipt asset cannot be moved.
pub fn resell_service<L: TokenLedger>(
    state: &mut ChainState<L>,
    signers: &[Address],
    req: &ResellService,
) -> Result<Resale, MarketError> {
    require_signer(signers, Role::Seller, &req.seller)?;
    if let Some(buyer) = &req.buyer {
        require_signer(signers, Role::Buyer, buyer)?;
    }

    match req.target {
        ResaleTarget::Receipt(receipt) => resell_receipt(state, req, receipt),
        ResaleTarget::Listing(service) => reprice_listing(state, req, service),
    }
}

fn resell_receipt<L: TokenLedger>(
    state: &mut ChainState<L>,
    req: &ResellService,
    receipt_address: Address,
) -> Result<Resale, MarketError> {
    let receipt = state.accounts.receipt(&receipt_address)?.clone();
    if receipt.is_soulbound {
        return Err(MarketError::SoulboundViolation);
    }

    let buyer = req.buyer.ok_or(MarketError::MissingBuyer)?;
    require_match(Role::Seller, &receipt.owner, &req.seller)?;
    if req.new_price == 0 {
        return Err(MarketError::InvalidPrice);
    }

    let previous_price = state.accounts.service(&receipt.service)?.price;

    let asset = Receipt::asset_id(&receipt_address);
    state.ledger.transfer(&asset, &req.seller, &buyer, RECEIPT_ASSET_SUPPLY)?;
    state.accounts.receipt_mut(&receipt_address)?.owner = buyer;
    state.accounts.service_mut(&receipt.service)?.price = req.new_price;

    tracing::debug!(
        receipt = %receipt_address,
        from = %req.seller,
        to = %buyer,
        new_price = req.new_price,
        "receipt resold"
    );

    Ok(Resale {
        target: req.target,
        service: receipt.service,
        previous_owner: receipt.owner,
        new_owner: buyer,
        previous_price,
        new_price: req.new_price,
    })
}

fn reprice_listing<L>(
    state: &mut ChainState<L>,
    req: &ResellService,
    service_address: Address,
) -> Result<Resale, MarketError> {
    let service = state.accounts.service(&service_address)?;
    if service.is_soulbound {
        return Err(MarketError::SoulboundViolation);
    }

    let vendor = service.vendor;
    let previous_price = service.price;
    require_match(Role::Seller, &vendor, &req.seller)?;
    if req.new_price == 0 {
        return Err(MarketError::InvalidPrice);
    }

    state.accounts.service_mut(&service_address)?.price = req.new_price;

    tracing::debug!(
        service = %service_address,
        previous_price,
        new_price = req.new_price,
        "listing repriced"
    );

    Ok(Resale {
        target: req.target,
        service: service_address,
        previous_owner: vendor,
        new_owner: vendor,
        previous_price,
        new_price: req.new_price,
    })
}
