//jetstake-ledger/src/treasury.rs
//! Treasury probe actor
//!
//! An externally-controlled identity that accepts every inbound envelope and
//! records it in delivery order. Local networks use treasuries as the "user"
//! endpoints: tests drive the protocol from a treasury's identity and then
//! assert on the exact message trace it observed.

use jetstake_common::prelude::*;
use jetstake_protocol::Message;
use tracing::trace;

use crate::actor::{Actor, Context, Envelope, ReceivedMessage, Snapshot, TreasuryLog};

/// Records everything sent to it; never fails a delivery
pub struct Treasury {
    identity: Identity,
    received: Vec<ReceivedMessage>,
}

impl Treasury {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            received: Vec::new(),
        }
    }

    /// Treasury derived from a human-readable seed
    pub fn from_seed(seed: &str) -> Self {
        Self::new(AddressDerivation::from_seed(seed))
    }
}

impl Actor for Treasury {
    fn identity(&self) -> Identity {
        self.identity
    }

    fn kind(&self) -> &'static str {
        "treasury"
    }

    fn handle(&mut self, _ctx: &mut Context, env: Envelope) -> LedgerResult<()> {
        trace!(
            treasury = %short_hex(&self.identity),
            from = %short_hex(&env.src),
            op = %env.body.name(),
            value = %fmt_tons(env.value),
            "envelope recorded"
        );
        self.received.push(ReceivedMessage {
            src: env.src,
            op: env.body.op(),
            value: env.value,
            body: env.body,
        });
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Treasury(TreasuryLog {
            identity: self.identity,
            received: self.received.clone(),
        })
    }
}
