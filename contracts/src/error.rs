//! # Marketplace Errors
//!
//! Every failing operation returns a [`MarketError`]. The runtime discards
//! the staged state on any error, so no error ever leaves a partial effect.
//!
//! Variants fall into four categories ([`ErrorKind`]): validation,
//! authorization, state, and the soulbound violation. Callers use
//! [`MarketError::is_retryable`] to decide between resubmitting and giving up.

use agora_protocol::identity::Address;
use agora_protocol::ledger::LedgerError;
use agora_protocol::storage::{AccountError, AccountKind};
use thiserror::Error;

/// The literal message surfaced for a soulbound resale attempt.
pub const SOULBOUND_MESSAGE: &str = "Soulbound NFTs cannot be resold";

/// The part a participant plays in an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Authority,
    Vendor,
    Buyer,
    Seller,
    Operator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Authority => write!(f, "authority"),
            Role::Vendor => write!(f, "vendor"),
            Role::Buyer => write!(f, "buyer"),
            Role::Seller => write!(f, "seller"),
            Role::Operator => write!(f, "operator"),
        }
    }
}

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Required co-signer missing, or an account does not match its record.
    Authorization,
    /// The records or balances do not allow the operation right now.
    State,
    /// Resale of a soulbound receipt or listing.
    Soulbound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authorization => "authorization",
            ErrorKind::State => "state",
            ErrorKind::Soulbound => "soulbound",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by marketplace operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    // -- Validation ---------------------------------------------------------
    /// Prices must be strictly positive.
    #[error("invalid price: must be greater than zero")]
    InvalidPrice,

    /// The marketplace fee would consume the whole price.
    #[error("marketplace fee {fee} must be less than the service price {price}")]
    FeeNotBelowPrice { fee: u64, price: u64 },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    // -- Authorization ------------------------------------------------------
    /// The participant in `role` did not co-sign the transaction.
    #[error("missing signature from {role} {address}")]
    MissingSigner { role: Role, address: Address },

    /// The resale of a receipt names no receiving party.
    #[error("resale of a receipt requires a buyer")]
    MissingBuyer,

    /// The supplied participant does not match the one on record.
    #[error("{role} mismatch: expected {expected}, got {got}")]
    SignerMismatch {
        role: Role,
        expected: Address,
        got: Address,
    },

    // -- State --------------------------------------------------------------
    #[error("service {0} is inactive")]
    ServiceInactive(Address),

    #[error("insufficient funds: price is {required}, buyer holds {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("{kind} account not found: {address}")]
    AccountNotFound { kind: AccountKind, address: Address },

    #[error("account already in use: {0}")]
    AccountAlreadyExists(Address),

    #[error("receipt sequence exhausted")]
    SequenceExhausted,

    /// The token ledger refused a transfer or mint.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    // -- Soulbound ----------------------------------------------------------
    #[error("Soulbound NFTs cannot be resold")]
    SoulboundViolation,
}

impl MarketError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketError::InvalidPrice
            | MarketError::FeeNotBelowPrice { .. }
            | MarketError::ArithmeticOverflow => ErrorKind::Validation,

            MarketError::MissingSigner { .. }
            | MarketError::MissingBuyer
            | MarketError::SignerMismatch { .. } => ErrorKind::Authorization,

            MarketError::ServiceInactive(_)
            | MarketError::InsufficientFunds { .. }
            | MarketError::AccountNotFound { .. }
            | MarketError::AccountAlreadyExists(_)
            | MarketError::SequenceExhausted
            | MarketError::Ledger(_) => ErrorKind::State,

            MarketError::SoulboundViolation => ErrorKind::Soulbound,
        }
    }

    /// Whether resubmitting after re-fetching state could succeed.
    ///
    /// Only conditions another transaction can change qualify: balances and
    /// account existence. Everything else, including a soulbound violation,
    /// fails again for the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MarketError::InsufficientFunds { .. }
                | MarketError::AccountNotFound { .. }
                | MarketError::Ledger(_)
        )
    }
}

impl From<AccountError> for MarketError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound { kind, address } => {
                MarketError::AccountNotFound { kind, address }
            }
            AccountError::AlreadyExists { address } => MarketError::AccountAlreadyExists(address),
            AccountError::SequenceExhausted => MarketError::SequenceExhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soulbound_message_is_literal() {
        assert_eq!(MarketError::SoulboundViolation.to_string(), SOULBOUND_MESSAGE);
    }

    #[test]
    fn soulbound_is_terminal() {
        assert_eq!(MarketError::SoulboundViolation.kind(), ErrorKind::Soulbound);
        assert!(!MarketError::SoulboundViolation.is_retryable());
    }

    #[test]
    fn insufficient_funds_is_retryable_state_error() {
        let err = MarketError::InsufficientFunds {
            required: 1_000,
            available: 10,
        };
        assert_eq!(err.kind(), ErrorKind::State);
        assert!(err.is_retryable());
    }

    #[test]
    fn account_errors_convert() {
        let addr = Address::new([4u8; 32]);
        let err: MarketError = AccountError::AlreadyExists { address: addr }.into();
        assert_eq!(err, MarketError::AccountAlreadyExists(addr));
        assert!(!err.is_retryable());
    }

    #[test]
    fn kinds_render_lowercase() {
        assert_eq!(MarketError::InvalidPrice.kind().to_string(), "validation");
        assert_eq!(MarketError::MissingBuyer.kind().to_string(), "authorization");
    }
}
