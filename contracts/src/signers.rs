//! Co-signer checks shared by every instruction.
//!
//! Signature verification itself happens upstream; by the time a
//! transaction reaches the runtime its `signers` list holds only addresses
//! whose signatures the substrate accepted.

use agora_protocol::identity::Address;

use crate::error::{MarketError, Role};

/// Fails with [`MarketError::MissingSigner`] unless `address` co-signed.
pub fn require_signer(signers: &[Address], role: Role, address: &Address) -> Result<(), MarketError> {
    if signers.contains(address) {
        Ok(())
    } else {
        Err(MarketError::MissingSigner {
            role,
            address: *address,
        })
    }
}

/// Fails with [`MarketError::SignerMismatch`] unless the supplied account is
/// the one on record.
pub fn require_match(role: Role, expected: &Address, got: &Address) -> Result<(), MarketError> {
    if expected == got {
        Ok(())
    } else {
        Err(MarketError::SignerMismatch {
            role,
            expected: *expected,
            got: *got,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_signer_passes() {
        let a = Address::new([1u8; 32]);
        assert!(require_signer(&[Address::new([2u8; 32]), a], Role::Buyer, &a).is_ok());
    }

    #[test]
    fn absent_signer_names_role() {
        let a = Address::new([1u8; 32]);
        let err = require_signer(&[], Role::Vendor, &a).unwrap_err();
        assert_eq!(
            err,
            MarketError::MissingSigner {
                role: Role::Vendor,
                address: a
            }
        );
        assert!(err.to_string().starts_with("missing signature from vendor"));
    }

    #[test]
    fn mismatch_reports_both_sides() {
        let a = Address::new([1u8; 32]);
        let b = Address::new([2u8; 32]);
        assert!(require_match(Role::Operator, &a, &a).is_ok());
        assert!(matches!(
            require_match(Role::Operator, &a, &b),
            Err(MarketError::SignerMismatch { role: Role::Operator, .. })
        ));
    }
}
