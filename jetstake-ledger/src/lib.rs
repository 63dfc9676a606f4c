//! # Jetstake Ledger
//!
//! The actor state machines of the staking ledger.
//!
//! ## Architecture Overview
//!
//! Two actors implement the staking protocol proper:
//!
//! ### [`StakeAccount`] - Per-User Balances
//! - One actor per owner, created lazily on first stake
//! - Native balance plus a jetton-wallet -> amount map
//! - Clamps releases to the available balance, decrements before forwarding
//! - Mutates state strictly before emitting notifications or refunds
//!
//! ### [`StakeRouter`] - Global Entry Point
//! - Routes native and token stakes to deterministically derived accounts
//! - Sole authority over the pooled custody wallets
//! - Executes exactly one release page per message
//!
//! Two more actors round out a self-contained local network:
//!
//! ### [`JettonMaster`] / [`JettonWallet`] - Reference Token Ledger
//! - Mint, transfer, settlement, transfer-notification, excess refund
//! - Implements the external contract the router consumes
//!
//! ### [`Treasury`] - Probe Endpoint
//! - Endowed user identity recording every envelope it receives
//!
//! ## Message Discipline
//!
//! Every handler follows mutate-then-notify: balances change before any
//! outbound envelope is queued, notifications are fire-and-forget, and a
//! failed handler queues nothing while the runtime bounces the remaining
//! value. There is no rollback path anywhere in this crate.

pub mod account;
pub mod actor;
pub mod jetton;
pub mod router;
pub mod treasury;

pub use account::StakeAccount;
pub use actor::{
    Actor, Context, Envelope, JettonMasterInfo, ReceivedMessage, RouterInfo, Snapshot, StakedInfo,
    StateInit, TreasuryLog, WalletData,
};
pub use jetton::{JettonMaster, JettonWallet};
pub use router::StakeRouter;
pub use treasury::Treasury;

/// Jetstake ledger crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
