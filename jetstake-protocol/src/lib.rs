// lib.rs
//! # Jetstake Protocol
//!
//! The wire contract of the staking ledger: every message kind the actors
//! exchange, the stable 32-bit operation codes, and the forward-payload codec
//! used to embed a `StakeJetton` intent inside a standard token transfer.

pub mod messages;
pub mod payload;

pub use messages::*;
pub use payload::{comment, encode_stake_jetton, parse_comment, parse_stake_jetton, PayloadError};
