//jetstake-common/src/validation.rs
//! Input validation utilities shared by the protocol handlers

use crate::error::{LedgerError, LedgerResult};
use crate::ledger_bail;
use crate::types::{Coins, Identity, IdentityExt};

/// Validation utilities for message fields
pub struct ValidationUtils;

impl ValidationUtils {
    /// A stake request must not forward more than it stakes
    pub fn validate_forward_amount(forward_amount: Coins, amount: Coins) -> LedgerResult<()> {
        if forward_amount > amount {
            ledger_bail!(
                Validation,
                "forward_amount {forward_amount} exceeds amount {amount}"
            );
        }
        Ok(())
    }

    /// Attached value must cover the stated amount plus the processing fee
    pub fn validate_attached_value(
        attached: Coins,
        amount: Coins,
        fee: Coins,
    ) -> LedgerResult<()> {
        let required = amount.saturating_add(fee);
        if attached < required {
            return Err(LedgerError::insufficient_value(required, attached));
        }
        Ok(())
    }

    /// Destination identities must be real addresses, not the zero marker
    pub fn validate_identity(id: &Identity) -> LedgerResult<()> {
        if id.is_zero() {
            ledger_bail!(Validation, "identity must not be zero");
        }
        Ok(())
    }
}
