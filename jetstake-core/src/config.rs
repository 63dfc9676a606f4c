// config.rs - Configuration for jetstake-core
use jetstake_common::prelude::*;
use jetstake_common::types::runtime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Node configuration for a local staking ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Flat processing fee charged to each handled message, in nanotons
    pub processing_fee: Coins,

    /// Capacity of each actor's mailbox
    pub mailbox_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            processing_fee: runtime::DEFAULT_PROCESSING_FEE,
            mailbox_capacity: runtime::DEFAULT_MAILBOX_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Validate configuration
    pub fn validate(&self) -> LedgerResult<()> {
        if self.processing_fee == 0 {
            return Err(LedgerError::config("processing_fee must be greater than 0"));
        }
        if self.mailbox_capacity == 0 {
            return Err(LedgerError::config(
                "mailbox_capacity must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> LedgerResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| LedgerError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
