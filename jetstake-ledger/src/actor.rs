//jetstake-ledger/src/actor.rs
//! The actor abstraction: envelopes, handler context and state snapshots
//!
//! An actor is an independently addressed unit of state that processes one
//! inbound envelope at a time and communicates only through outbound
//! envelopes collected in its [`Context`]. There is no shared memory and no
//! synchronous call/return between actors; the runtime delivers envelopes in
//! FIFO order per sender/receiver pair.
//!
//! The handler contract every actor follows:
//! - balances are mutated strictly before any outbound envelope is queued
//! - a handler that returns an error queues nothing; the runtime bounces the
//!   remaining attached value back to the sender
//! - notifications are fire-and-forget; their loss must never corrupt state

use jetstake_common::prelude::*;
use jetstake_protocol::Message;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::account::StakeAccount;
use crate::jetton::JettonWallet;

/// A one-way message in flight between two actors
#[derive(Debug, Clone)]
pub struct Envelope {
    pub src: Identity,
    pub dst: Identity,
    /// Native value attached to the message
    pub value: Coins,
    /// Whether remaining value returns to the sender when handling fails
    pub bounce: bool,
    /// Descriptor allowing the runtime to create the destination on first use
    pub state_init: Option<StateInit>,
    pub body: Message,
}

impl Envelope {
    /// A non-bounceable envelope with no state init
    pub fn new(src: Identity, dst: Identity, value: Coins, body: Message) -> Self {
        Self {
            src,
            dst,
            value,
            bounce: false,
            state_init: None,
            body,
        }
    }

    /// Mark the envelope bounceable
    pub fn bounceable(mut self) -> Self {
        self.bounce = true;
        self
    }

    /// Attach a state-init descriptor for lazy destination creation
    pub fn with_state_init(mut self, init: StateInit) -> Self {
        self.state_init = Some(init);
        self
    }
}

/// Descriptor from which the runtime can instantiate a missing destination
///
/// The identity of the new actor is fully determined by the descriptor; the
/// runtime refuses to spawn when the derived identity does not match the
/// envelope destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateInit {
    StakeAccount { master: Identity, owner: Identity },
    JettonWallet { master: Identity, owner: Identity },
}

impl StateInit {
    /// The identity this descriptor deterministically derives
    pub fn identity(&self) -> Identity {
        match self {
            StateInit::StakeAccount { master, owner } => {
                AddressDerivation::stake_account(master, owner)
            }
            StateInit::JettonWallet { master, owner } => {
                AddressDerivation::jetton_wallet(master, owner)
            }
        }
    }

    /// Instantiate the described actor with zeroed balances
    pub fn build(&self) -> Box<dyn Actor> {
        match self {
            StateInit::StakeAccount { master, owner } => {
                Box::new(StakeAccount::new(*master, *owner))
            }
            StateInit::JettonWallet { master, owner } => {
                Box::new(JettonWallet::new(*master, *owner))
            }
        }
    }
}

/// Per-delivery handler context: inbound value, processing fee and outbox
pub struct Context {
    self_id: Identity,
    fee: Coins,
    value: Coins,
    outbox: Vec<Envelope>,
}

impl Context {
    pub fn new(self_id: Identity, fee: Coins, value: Coins) -> Self {
        Self {
            self_id,
            fee,
            value,
            outbox: Vec::new(),
        }
    }

    /// Flat processing fee charged to this delivery
    pub fn fee(&self) -> Coins {
        self.fee
    }

    /// Native value attached to the inbound envelope
    pub fn value(&self) -> Coins {
        self.value
    }

    /// Value left over after the fee and `spent` have been consumed
    pub fn excess_after(&self, spent: Coins) -> Coins {
        self.value.saturating_sub(self.fee).saturating_sub(spent)
    }

    /// Queue an outbound envelope
    pub fn send(&mut self, dst: Identity, value: Coins, body: Message) {
        self.outbox.push(Envelope::new(self.self_id, dst, value, body));
    }

    /// Queue an outbound envelope carrying a state-init descriptor
    pub fn send_with_init(&mut self, dst: Identity, value: Coins, body: Message, init: StateInit) {
        self.outbox
            .push(Envelope::new(self.self_id, dst, value, body).with_state_init(init));
    }

    /// Inspect the queued envelopes without consuming the context
    pub fn outbox(&self) -> &[Envelope] {
        &self.outbox
    }

    /// Consume the context, yielding the queued envelopes in send order
    pub fn into_outbox(self) -> Vec<Envelope> {
        self.outbox
    }
}

/// An independently addressed, single-threaded unit of ledger state
pub trait Actor: Send {
    /// The actor's stable address
    fn identity(&self) -> Identity;

    /// Short kind name for log output
    fn kind(&self) -> &'static str;

    /// Process one inbound envelope to completion
    fn handle(&mut self, ctx: &mut Context, env: Envelope) -> LedgerResult<()>;

    /// Pure read of the actor's current state
    fn snapshot(&self) -> Snapshot;
}

/// Read-only view of one actor's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Snapshot {
    Account(StakedInfo),
    Router(RouterInfo),
    JettonMaster(JettonMasterInfo),
    JettonWallet(WalletData),
    Treasury(TreasuryLog),
}

/// Snapshot of a stake account's balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakedInfo {
    pub master: Identity,
    pub owner: Identity,
    pub staked_toncoin: Coins,
    /// Jetton wallet identity -> staked token amount
    pub staked_jettons: BTreeMap<Identity, Coins>,
}

/// Snapshot of the stake router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterInfo {
    pub identity: Identity,
    pub admin: Identity,
}

/// Snapshot of a jetton master
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JettonMasterInfo {
    pub identity: Identity,
    pub admin: Identity,
    pub total_supply: Coins,
}

/// Snapshot of a jetton wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletData {
    pub master: Identity,
    pub owner: Identity,
    pub balance: Coins,
}

/// One envelope as observed by a treasury
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub src: Identity,
    pub op: OpCode,
    pub value: Coins,
    pub body: Message,
}

/// Everything a treasury has received, in delivery order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryLog {
    pub identity: Identity,
    pub received: Vec<ReceivedMessage>,
}
