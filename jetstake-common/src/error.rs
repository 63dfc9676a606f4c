//jetstake-common/src/error.rs
//! Standardized error types for all jetstake components

use crate::types::Coins;
use thiserror::Error;

/// Standard result type used throughout jetstake
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Comprehensive error type for all ledger operations
///
/// Every variant is handled locally at the receiving actor; nothing here
/// propagates across a message boundary. A handler that returns an error
/// produces no follow-on messages and the runtime bounces the remaining
/// attached value back to the sender.
#[derive(Error, Debug)]
pub enum LedgerError {
    // Attached value cannot cover the stated amount plus the processing fee
    #[error("Insufficient value: required {required}, attached {attached}")]
    InsufficientValue { required: Coins, attached: Coins },

    // Token balance cannot cover the requested outbound transfer
    #[error("Insufficient tokens: required {required}, available {available}")]
    InsufficientTokens { required: Coins, available: Coins },

    // Sender identity does not match the expected owner or router
    #[error("Unauthorized sender: expected {expected}, got {actual}")]
    Unauthorized { expected: String, actual: String },

    // Forward payload cannot be parsed as the expected embedded message
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // Message addressed to an identity with no actor and no state init
    #[error("Unknown destination: {0}")]
    UnknownDestination(String),

    // A handler received a message kind it does not speak
    #[error("Unexpected message: {0}")]
    UnexpectedMessage(String),

    // Request field validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    IO(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    // External library errors
    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl LedgerError {
    /// Create a new insufficient-value error
    pub fn insufficient_value(required: Coins, attached: Coins) -> Self {
        Self::InsufficientValue { required, attached }
    }

    /// Create a new insufficient-tokens error
    pub fn insufficient_tokens(required: Coins, available: Coins) -> Self {
        Self::InsufficientTokens {
            required,
            available,
        }
    }

    /// Create a new unauthorized-sender error
    pub fn unauthorized(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Unauthorized {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new malformed-payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create a new unexpected-message error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedMessage(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Convenience macro for creating LedgerError instances
#[macro_export]
macro_rules! ledger_error {
    ($variant:ident, $($arg:tt)*) => {
        $crate::error::LedgerError::$variant(format!($($arg)*))
    };
}

/// Convenience macro for returning early with a LedgerError
#[macro_export]
macro_rules! ledger_bail {
    ($variant:ident, $($arg:tt)*) => {
        return Err($crate::ledger_error!($variant, $($arg)*))
    };
}
