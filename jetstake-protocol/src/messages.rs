//jetstake-protocol/src/messages.rs
//! The staking ledger message set
//!
//! Each message is a 32-bit operation code plus a fixed field layout. The op
//! codes are part of the wire contract and must never change; handlers log
//! them and the bounce path echoes them back to the sender.

use jetstake_common::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable wire operation codes
pub mod ops {
    use jetstake_common::types::OpCode;

    pub const STAKE_TONCOIN: OpCode = 0x7ac4404c;
    pub const STAKE_INTERNAL: OpCode = 0xa576751e;
    pub const STAKE_NOTIFICATION: OpCode = 0x2c7981f1;
    pub const STAKE_RELEASE: OpCode = 0x51fa3a81;
    pub const STAKE_RELEASE_NOTIFICATION: OpCode = 0xe656dfa2;
    pub const EXCESSES: OpCode = 0xd53276db;
    pub const TOKEN_TRANSFER: OpCode = 0x0f8a7ea5;
    pub const TOKEN_TRANSFER_INTERNAL: OpCode = 0x178d4519;
    pub const TRANSFER_NOTIFICATION: OpCode = 0x7362d09c;
    pub const MINT_JETTON: OpCode = 0x2e11ab19;
    pub const BOUNCED: OpCode = 0xffffffff;
}

/// Opaque forward payload carried through a message chain untouched
pub type Payload = Option<Vec<u8>>;

/// Native stake request: user -> StakeRouter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeToncoin {
    pub query_id: QueryId,
    /// Native amount to credit to the sender's stake account
    pub amount: Coins,
    /// Receiver of the unused attached value
    pub response_destination: Identity,
    /// Value to attach to the terminal StakeNotification, at most `amount`
    pub forward_amount: Coins,
    pub forward_payload: Payload,
}

/// Token stake intent, embedded in a token transfer's forward payload
///
/// The token identity is implied by which jetton wallet forwards the
/// notification; only the optional native top-up and the passthrough fields
/// travel in the payload itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeJetton {
    /// Native amount to stake alongside the tokens, taken from attached value
    pub ton_amount: Coins,
    pub response_destination: Identity,
    pub forward_amount: Coins,
    pub forward_payload: Payload,
}

/// Token credit attached to a StakeInternal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JettonCredit {
    /// The router-owned jetton wallet the tokens landed in
    pub wallet: Identity,
    pub amount: Coins,
}

/// Credit instruction: StakeRouter -> StakeAccount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeInternal {
    pub query_id: QueryId,
    /// Native amount to credit; zero for a pure token stake
    pub amount: Coins,
    /// Token credit, when the stake arrived through the token ledger
    pub jetton: Option<JettonCredit>,
    pub response_destination: Identity,
    pub forward_amount: Coins,
    pub forward_payload: Payload,
}

/// Terminal stake acknowledgement: StakeAccount -> owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeNotification {
    pub query_id: QueryId,
    /// Account's native balance after the credit was applied
    pub staked_toncoin: Coins,
    pub forward_payload: Payload,
}

/// One token-release leg of a release page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseJettonInfo {
    /// Native value to accompany the token transfer for fees and forwarding
    pub ton_amount: Coins,
    pub jetton_amount: Coins,
    /// The router-owned jetton wallet holding the pooled tokens
    pub jetton_wallet: Identity,
    pub forward_amount: Coins,
    pub destination: Identity,
    pub custom_payload: Payload,
    pub forward_payload: Payload,
}

/// Release request: user -> StakeAccount -> StakeRouter
///
/// `jettons` may hold only a slice of the full set of token types the caller
/// intends to release; `jettons_idx` is the caller-driven pagination cursor
/// naming the page this message carries. Each page commits independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRelease {
    pub query_id: QueryId,
    pub owner: Identity,
    /// Native amount to release, clamped to the available balance
    pub amount: Coins,
    /// The current page's release legs, keyed by page-local index
    pub jettons: BTreeMap<u64, ReleaseJettonInfo>,
    /// Pagination cursor identifying this page
    pub jettons_idx: u64,
    /// Receiver of the released native value and the terminal notification
    pub destination: Identity,
    /// Receiver of the unused attached value
    pub response_destination: Identity,
    pub custom_payload: Payload,
    pub forward_payload: Payload,
    pub forward_amount: Coins,
}

/// Terminal release acknowledgement: StakeRouter -> user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeReleaseNotification {
    pub query_id: QueryId,
    /// Native amount actually released by this page
    pub released_toncoin: Coins,
    /// Token amounts actually dispatched by this page, per jetton wallet
    pub released_jettons: BTreeMap<Identity, Coins>,
    /// Cursor of the page this notification acknowledges
    pub jettons_idx: u64,
    pub forward_payload: Payload,
}

/// Refund of attached value not consumed by the requested operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excesses {
    pub query_id: QueryId,
}

/// Outbound token transfer request: wallet owner -> jetton wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub query_id: QueryId,
    pub amount: Coins,
    /// Owner identity the tokens are destined for
    pub destination: Identity,
    pub response_destination: Identity,
    pub custom_payload: Payload,
    pub forward_amount: Coins,
    pub forward_payload: Payload,
}

/// Wallet-to-wallet token settlement: jetton wallet -> jetton wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransferInternal {
    pub query_id: QueryId,
    pub amount: Coins,
    /// Owner of the wallet the tokens came from
    pub sender: Identity,
    pub response_destination: Identity,
    pub forward_amount: Coins,
    pub forward_payload: Payload,
}

/// Inbound transfer notice: jetton wallet -> wallet owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferNotification {
    pub query_id: QueryId,
    pub amount: Coins,
    /// Owner of the wallet the tokens came from
    pub sender: Identity,
    pub forward_payload: Payload,
}

/// Mint instruction: admin -> jetton master
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintJetton {
    pub query_id: QueryId,
    pub amount: Coins,
    pub receiver: Identity,
    pub response_destination: Identity,
    pub forward_amount: Coins,
    pub forward_payload: Payload,
}

/// Synthetic runtime notice: a message failed downstream and its remaining
/// value came back. Carries the op of the failed message for correlation.
/// Bounced envelopes are never themselves bounceable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounced {
    pub op: OpCode,
    pub query_id: QueryId,
}

/// The tagged union of every message on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    StakeToncoin(StakeToncoin),
    StakeInternal(StakeInternal),
    StakeNotification(StakeNotification),
    StakeRelease(StakeRelease),
    StakeReleaseNotification(StakeReleaseNotification),
    Excesses(Excesses),
    TokenTransfer(TokenTransfer),
    TokenTransferInternal(TokenTransferInternal),
    TransferNotification(TransferNotification),
    MintJetton(MintJetton),
    Bounced(Bounced),
}

impl Message {
    /// The wire operation code of this message
    pub fn op(&self) -> OpCode {
        match self {
            Message::StakeToncoin(_) => ops::STAKE_TONCOIN,
            Message::StakeInternal(_) => ops::STAKE_INTERNAL,
            Message::StakeNotification(_) => ops::STAKE_NOTIFICATION,
            Message::StakeRelease(_) => ops::STAKE_RELEASE,
            Message::StakeReleaseNotification(_) => ops::STAKE_RELEASE_NOTIFICATION,
            Message::Excesses(_) => ops::EXCESSES,
            Message::TokenTransfer(_) => ops::TOKEN_TRANSFER,
            Message::TokenTransferInternal(_) => ops::TOKEN_TRANSFER_INTERNAL,
            Message::TransferNotification(_) => ops::TRANSFER_NOTIFICATION,
            Message::MintJetton(_) => ops::MINT_JETTON,
            Message::Bounced(_) => ops::BOUNCED,
        }
    }

    /// The correlation id carried by this message
    pub fn query_id(&self) -> QueryId {
        match self {
            Message::StakeToncoin(m) => m.query_id,
            Message::StakeInternal(m) => m.query_id,
            Message::StakeNotification(m) => m.query_id,
            Message::StakeRelease(m) => m.query_id,
            Message::StakeReleaseNotification(m) => m.query_id,
            Message::Excesses(m) => m.query_id,
            Message::TokenTransfer(m) => m.query_id,
            Message::TokenTransferInternal(m) => m.query_id,
            Message::TransferNotification(m) => m.query_id,
            Message::MintJetton(m) => m.query_id,
            Message::Bounced(m) => m.query_id,
        }
    }

    /// Short human-readable name for log output
    pub fn name(&self) -> &'static str {
        match self {
            Message::StakeToncoin(_) => "StakeToncoin",
            Message::StakeInternal(_) => "StakeInternal",
            Message::StakeNotification(_) => "StakeNotification",
            Message::StakeRelease(_) => "StakeRelease",
            Message::StakeReleaseNotification(_) => "StakeReleaseNotification",
            Message::Excesses(_) => "Excesses",
            Message::TokenTransfer(_) => "TokenTransfer",
            Message::TokenTransferInternal(_) => "TokenTransferInternal",
            Message::TransferNotification(_) => "TransferNotification",
            Message::MintJetton(_) => "MintJetton",
            Message::Bounced(_) => "Bounced",
        }
    }
}
