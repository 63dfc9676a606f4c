//! # Jetstake Common
//!
//! Common utilities, types and standardized patterns for the jetstake staking
//! ledger. This crate serves as the single source of truth for all shared
//! functionality across the jetstake workspace, preventing code duplication
//! and circular dependencies.
//!
//! ## Modules
//!
//! - **types**: Identities, coin amounts and shared constants
//! - **error**: The unified `LedgerError` / `LedgerResult` pair
//! - **crypto**: Deterministic identity derivation (no stored directory)
//! - **validation**: Input validation utilities for message fields

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod crypto;
pub mod error;
pub mod types;
pub mod validation;

/// Re-export commonly used types and traits
pub mod prelude {
    pub use crate::crypto::AddressDerivation;
    pub use crate::error::{LedgerError, LedgerResult};
    pub use crate::types::{
        fmt_tons, short_hex, Coins, Identity, IdentityExt, OpCode, QueryId, ONE_TON,
    };
    pub use crate::validation::ValidationUtils;

    // Re-export essential external crates
    pub use anyhow::Result;
}

/// Jetstake common crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol version for wire compatibility
pub const PROTOCOL_VERSION: u32 = 1;
