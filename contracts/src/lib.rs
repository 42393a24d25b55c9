//! # Agora Marketplace Contracts
//!
//! The state transitions of a two-sided service marketplace:
//!
//! - **Registry**: creates the marketplace record (operator + flat fee).
//! - **Catalog**: vendors list services.
//! - **Settlement**: a buyer pays for a service; the price is split
//!   between vendor and operator and a receipt is minted to the buyer.
//! - **Resale**: a receipt changes hands and the listing price is
//!   updated, unless the receipt is soulbound.
//! - **Runtime**: executes one transaction at a time on a staged copy of
//!   state and commits only on success.
//!
//! ## Design Principles
//!
//! 1. Each operation is a function of `(state, signers, request)` returning
//!    a result or an error. No ambient configuration.
//! 2. All validation happens before the first mutation.
//! 3. Money math uses `checked_sub`/`checked_add`.
//! 4. Soulbound is a flag checked up front, not a separate receipt type.

pub mod catalog;
pub mod error;
pub mod registry;
pub mod resale;
pub mod runtime;
pub mod settlement;
pub mod signers;

pub use error::{ErrorKind, MarketError, Role};
pub use runtime::{apply, Outcome, Runtime, SharedRuntime};
