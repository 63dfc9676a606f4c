// lib.rs - Jetstake Core Library
//! # Jetstake Core
//!
//! The message-passing runtime of the jetstake staking ledger.
//!
//! This crate runs a local network of ledger actors: one tokio task per
//! actor, FIFO mailboxes, lazy state-init spawning, native value accounting
//! and bounce handling.
//!
//! ## Architecture
//!
//! - **One task per actor**: single-threaded handlers, no shared memory
//! - **FIFO delivery**: per sender/receiver pair, one envelope at a time
//! - **Lazy spawning**: missing destinations instantiated from state init
//! - **Value accounting**: node-level balances, bounces refund value minus fee
//!
//! ## Example
//!
//! ```no_run
//! use jetstake_core::{LedgerConfig, LedgerNode};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let node = LedgerNode::new(LedgerConfig::default())?;
//!     let admin = node.spawn_treasury("admin").await;
//!     let router = node.spawn_router("router", admin).await;
//!     node.settle().await;
//!     println!("router at {}", hex::encode(router));
//!     Ok(())
//! }
//! ```

/// Configuration module
pub mod config;

/// Runtime node implementation
pub mod node;

/// Prelude with commonly used types
pub mod prelude {
    pub use crate::config::LedgerConfig;
    pub use crate::node::LedgerNode;
    // Re-export jetstake-common prelude
    pub use jetstake_common::prelude::*;
}

// Re-export main types at crate root
pub use config::LedgerConfig;
pub use node::LedgerNode;

/// Jetstake core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
