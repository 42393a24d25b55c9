//! # Settlement Engine
//!
//! A purchase splits the service price between the vendor and the
//! marketplace operator, then mints the buyer a one-unit receipt asset and
//! records the [`Receipt`].
//!
//! ```text
//! buyer ──(price − fee)──▶ vendor
//! buyer ──(fee)──────────▶ operator      (skipped when fee == 0)
//! mint 1 × receipt asset ─▶ buyer
//! ```
//!
//! Every precondition is checked before the first ledger call. The ledger
//! calls themselves can still fail; the runtime discards the staged state
//! when they do.

use agora_protocol::config::RECEIPT_ASSET_SUPPLY;
use agora_protocol::identity::Address;
use agora_protocol::ledger::TokenLedger;
use agora_protocol::storage::{ChainState, Receipt};
use agora_protocol::transaction::PurchaseService;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Role};
use crate::signers::{require_match, require_signer};

/// What a successful purchase produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Address of the new Receipt record.
    pub receipt: Address,
    /// The one-unit asset minted to the buyer.
    pub receipt_asset: Address,
    /// Amount credited to the vendor (`price − fee`).
    pub vendor_proceeds: u64,
    /// Amount credited to the operator.
    pub marketplace_fee: u64,
}

impl Settlement {
    /// Total debited from the buyer.
    pub fn total_paid(&self) -> u64 {
        self.vendor_proceeds + self.marketplace_fee
    }
}

/// Buys the service named in `req` on behalf of `req.buyer`.
///
/// Preconditions, in order: buyer co-signed; service and marketplace exist;
/// the supplied vendor and operator match the records; the service is
/// active; the fee is below the price; the buyer can cover the price.
///
/// # Errors
///
/// - [`MarketError::MissingSigner`] if the buyer did not co-sign.
/// - [`MarketError::AccountNotFound`] for an unknown service or marketplace.
/// - [`MarketError::SignerMismatch`] for a wrong vendor or operator.
/// - [`MarketError::ServiceInactive`] if the listing is inactive.
/// - [`MarketError::FeeNotBelowPrice`] if the fee would eat the price.
/// - [`MarketError::InsufficientFunds`] if the buyer cannot pay.
/// - [`MarketError::Ledger`] if the token ledger refuses a call.
pub fn purchase_service<L: TokenLedger>(
    state: &mut ChainState<L>,
    signers: &[Address],
    req: &PurchaseService,
) -> Result<Settlement, MarketError> {
    require_signer(signers, Role::Buyer, &req.buyer)?;

    let service = state.accounts.service(&req.service)?.clone();
    let marketplace = state.accounts.marketplace(&req.marketplace)?.clone();

    require_match(Role::Vendor, &service.vendor, &req.vendor)?;
    require_match(Role::Operator, &marketplace.authority, &req.operator)?;

    if !service.is_active {
        return Err(MarketError::ServiceInactive(req.service));
    }

    let price = service.price;
    let fee = marketplace.fee;
    if fee >= price {
        return Err(MarketError::FeeNotBelowPrice { fee, price });
    }
    let vendor_proceeds = price.checked_sub(fee).ok_or(MarketError::ArithmeticOverflow)?;

    let available = state.ledger.balance(&req.payment_asset, &req.buyer);
    if available < price {
        return Err(MarketError::InsufficientFunds {
            required: price,
            available,
        });
    }

    // -- Effects ------------------------------------------------------------

    state
        .ledger
        .transfer(&req.payment_asset, &req.buyer, &req.vendor, vendor_proceeds)?;
    if fee > 0 {
        state
            .ledger
            .transfer(&req.payment_asset, &req.buyer, &req.operator, fee)?;
    }

    let receipt = state.accounts.next_receipt_address(&req.service, &req.buyer)?;
    let receipt_asset = Receipt::asset_id(&receipt);
    state
        .ledger
        .mint(&receipt_asset, &req.buyer, RECEIPT_ASSET_SUPPLY)?;
    state.accounts.create_receipt(
        receipt,
        Receipt {
            owner: req.buyer,
            service: req.service,
            is_soulbound: service.is_soulbound,
        },
    )?;

    tracing::debug!(
        service = %req.service,
        buyer = %req.buyer,
        receipt = %receipt,
        vendor_proceeds,
        fee,
        "purchase settled"
    );

    Ok(Settlement {
        receipt,
        receipt_asset,
        vendor_proceeds,
        marketplace_fee: fee,
    })
}
