//jetstake-ledger/src/account.rs
//! Per-user stake account actor
//!
//! Owns exactly one user's staked balances: the native amount plus a map from
//! jetton wallet identity to staked token amount. No other actor mutates
//! these fields; every change arrives as a message addressed here.
//!
//! Correctness rules enforced by this actor:
//! - balances are mutated before any outbound envelope is queued, so a
//!   concurrent read is always consistent with messages already sent
//! - a release decrements before forwarding to the router and is never
//!   auto-reversed; a lost downstream message leaves the balance reduced,
//!   never negative and never double-credited
//! - release amounts are clamped to the available balance, not rejected

use jetstake_common::prelude::*;
use jetstake_protocol::{
    Message, StakeInternal, StakeNotification, StakeRelease,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::actor::{Actor, Context, Envelope, Snapshot, StakedInfo};

/// One user's staking balances, addressed at
/// `AddressDerivation::stake_account(master, owner)`
pub struct StakeAccount {
    master: Identity,
    owner: Identity,
    staked_toncoin: Coins,
    staked_jettons: BTreeMap<Identity, Coins>,
}

impl StakeAccount {
    /// A fresh, empty account. An account with all balances at zero is
    /// behaviorally identical to a fresh one.
    pub fn new(master: Identity, owner: Identity) -> Self {
        Self {
            master,
            owner,
            staked_toncoin: 0,
            staked_jettons: BTreeMap::new(),
        }
    }

    /// Pure read of the account record
    pub fn staked_info(&self) -> StakedInfo {
        StakedInfo {
            master: self.master,
            owner: self.owner,
            staked_toncoin: self.staked_toncoin,
            staked_jettons: self.staked_jettons.clone(),
        }
    }

    /// Apply a credit routed here by the stake master
    ///
    /// Side effects in order: mutate balances, refund excess value, then emit
    /// the terminal StakeNotification when the request asked for one.
    fn handle_stake_internal(
        &mut self,
        ctx: &mut Context,
        src: Identity,
        msg: StakeInternal,
    ) -> LedgerResult<()> {
        if src != self.master {
            return Err(LedgerError::unauthorized(
                short_hex(&self.master),
                short_hex(&src),
            ));
        }

        self.staked_toncoin = self.staked_toncoin.saturating_add(msg.amount);
        if let Some(credit) = &msg.jetton {
            let bucket = self.staked_jettons.entry(credit.wallet).or_insert(0);
            *bucket = bucket.saturating_add(credit.amount);
        }

        debug!(
            account = %short_hex(&self.identity()),
            owner = %short_hex(&self.owner),
            amount = %fmt_tons(msg.amount),
            jetton = msg.jetton.is_some(),
            "stake credited"
        );

        let excess = ctx.excess_after(msg.forward_amount);
        if excess > 0 {
            ctx.send(
                msg.response_destination,
                excess,
                Message::Excesses(jetstake_protocol::Excesses {
                    query_id: msg.query_id,
                }),
            );
        }

        if msg.forward_amount > 0 {
            ctx.send(
                self.owner,
                msg.forward_amount,
                Message::StakeNotification(StakeNotification {
                    query_id: msg.query_id,
                    staked_toncoin: self.staked_toncoin,
                    forward_payload: msg.forward_payload,
                }),
            );
        }

        Ok(())
    }

    /// Clamp, decrement and forward a release page to the stake master
    ///
    /// The decrement happens before the forward. A page that fails downstream
    /// is reconciled out of band, never retried by re-decrementing.
    fn handle_stake_release(
        &mut self,
        ctx: &mut Context,
        src: Identity,
        msg: StakeRelease,
    ) -> LedgerResult<()> {
        if msg.owner != self.owner || src != self.owner {
            return Err(LedgerError::unauthorized(
                short_hex(&self.owner),
                short_hex(&src),
            ));
        }

        let release_toncoin = msg.amount.min(self.staked_toncoin);
        self.staked_toncoin -= release_toncoin;

        // Re-clamp every leg of this page against the live balance. Legs that
        // clamp to zero are dropped here; the page itself is never rejected.
        let mut page = BTreeMap::new();
        for (idx, mut info) in msg.jettons {
            let available = self
                .staked_jettons
                .get(&info.jetton_wallet)
                .copied()
                .unwrap_or(0);
            let clamped = info.jetton_amount.min(available);
            if clamped == 0 {
                debug!(
                    wallet = %short_hex(&info.jetton_wallet),
                    requested = %fmt_tons(info.jetton_amount),
                    "release leg clamped to zero, skipping"
                );
                continue;
            }
            if let Some(bucket) = self.staked_jettons.get_mut(&info.jetton_wallet) {
                *bucket -= clamped;
            }
            info.jetton_amount = clamped;
            page.insert(idx, info);
        }

        debug!(
            account = %short_hex(&self.identity()),
            toncoin = %fmt_tons(release_toncoin),
            legs = page.len(),
            page_idx = msg.jettons_idx,
            "release page clamped and forwarded"
        );

        let forward_value = ctx.excess_after(0);
        ctx.send(
            self.master,
            forward_value,
            Message::StakeRelease(StakeRelease {
                query_id: msg.query_id,
                owner: msg.owner,
                amount: release_toncoin,
                jettons: page,
                jettons_idx: msg.jettons_idx,
                destination: msg.destination,
                response_destination: msg.response_destination,
                custom_payload: msg.custom_payload,
                forward_payload: msg.forward_payload,
                forward_amount: msg.forward_amount,
            }),
        );

        Ok(())
    }
}

impl Actor for StakeAccount {
    fn identity(&self) -> Identity {
        AddressDerivation::stake_account(&self.master, &self.owner)
    }

    fn kind(&self) -> &'static str {
        "stake-account"
    }

    fn handle(&mut self, ctx: &mut Context, env: Envelope) -> LedgerResult<()> {
        match env.body {
            Message::StakeInternal(msg) => self.handle_stake_internal(ctx, env.src, msg),
            Message::StakeRelease(msg) => self.handle_stake_release(ctx, env.src, msg),
            Message::Bounced(b) => {
                // Deliberately no compensation: the decrement already applied
                // stands, per the no-rollback release contract.
                warn!(
                    account = %short_hex(&self.identity()),
                    op = format_args!("{:#010x}", b.op),
                    query_id = b.query_id,
                    "downstream message bounced"
                );
                Ok(())
            }
            Message::Excesses(_) => Ok(()),
            other => Err(LedgerError::unexpected(other.name())),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Account(self.staked_info())
    }
}
