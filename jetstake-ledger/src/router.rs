//jetstake-ledger/src/router.rs
//! Global stake router actor
//!
//! Single entry point for deposits and the sole authority allowed to move
//! pooled tokens back out to users. The router owns no user balances; it
//! resolves a user's stake account deterministically from (router identity,
//! owner identity) and forwards credits there, and it executes the outbound
//! transfers of a release page on behalf of the requesting account.
//!
//! Custody model: staked native value accumulates on the router itself, and
//! staked tokens accumulate in the router-owned jetton wallets. The router is
//! the only identity those wallets accept transfer orders from.

use jetstake_common::prelude::*;
use jetstake_protocol::{
    parse_stake_jetton, Excesses, JettonCredit, Message, StakeInternal, StakeRelease,
    StakeReleaseNotification, StakeToncoin, TokenTransfer, TransferNotification,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::actor::{Actor, Context, Envelope, RouterInfo, Snapshot, StateInit};

/// The stake master: routes deposits in, executes release pages out
pub struct StakeRouter {
    identity: Identity,
    admin: Identity,
}

impl StakeRouter {
    pub fn new(identity: Identity, admin: Identity) -> Self {
        Self { identity, admin }
    }

    /// The stake account identity this router resolves for `owner`
    pub fn account_of(&self, owner: &Identity) -> Identity {
        AddressDerivation::stake_account(&self.identity, owner)
    }

    /// Validate and route a native stake to the sender's account
    fn handle_stake_toncoin(
        &mut self,
        ctx: &mut Context,
        src: Identity,
        msg: StakeToncoin,
    ) -> LedgerResult<()> {
        ValidationUtils::validate_identity(&msg.response_destination)?;
        ValidationUtils::validate_forward_amount(msg.forward_amount, msg.amount)?;
        ValidationUtils::validate_attached_value(ctx.value(), msg.amount, ctx.fee())?;

        // The staked amount stays pooled here; everything beyond amount+fee
        // travels on so the account can pay its own fee and refund the rest.
        let forward_value = ctx.value() - msg.amount - ctx.fee();
        let account = self.account_of(&src);

        debug!(
            router = %short_hex(&self.identity),
            owner = %short_hex(&src),
            amount = %fmt_tons(msg.amount),
            "native stake routed"
        );

        ctx.send_with_init(
            account,
            forward_value,
            Message::StakeInternal(StakeInternal {
                query_id: msg.query_id,
                amount: msg.amount,
                jetton: None,
                response_destination: msg.response_destination,
                forward_amount: msg.forward_amount,
                forward_payload: msg.forward_payload,
            }),
            StateInit::StakeAccount {
                master: self.identity,
                owner: src,
            },
        );
        Ok(())
    }

    /// Handle tokens landing in one of the router's jetton wallets
    ///
    /// The forward payload must parse as a StakeJetton intent and the
    /// attached value must cover the embedded native top-up. On either
    /// failure the full token amount goes straight back to the sender; no
    /// partial credit is ever applied.
    fn handle_transfer_notification(
        &mut self,
        ctx: &mut Context,
        src: Identity,
        msg: TransferNotification,
    ) -> LedgerResult<()> {
        let payload = msg.forward_payload.as_deref().unwrap_or(&[]);
        let intent = match parse_stake_jetton(payload) {
            Ok(intent) => intent,
            Err(err) => {
                warn!(
                    router = %short_hex(&self.identity),
                    wallet = %short_hex(&src),
                    sender = %short_hex(&msg.sender),
                    error = %err,
                    "malformed stake payload, refunding tokens"
                );
                self.refund_tokens(ctx, src, &msg);
                return Ok(());
            }
        };

        let required = intent.ton_amount.saturating_add(ctx.fee());
        if ctx.value() < required {
            warn!(
                router = %short_hex(&self.identity),
                attached = %fmt_tons(ctx.value()),
                required = %fmt_tons(required),
                "token stake under-funded, refunding tokens"
            );
            self.refund_tokens(ctx, src, &msg);
            return Ok(());
        }

        // The embedded native top-up stays pooled here, like a native stake.
        let forward_value = ctx.value() - intent.ton_amount - ctx.fee();
        let account = self.account_of(&msg.sender);

        debug!(
            router = %short_hex(&self.identity),
            owner = %short_hex(&msg.sender),
            wallet = %short_hex(&src),
            jetton_amount = %fmt_tons(msg.amount),
            ton_amount = %fmt_tons(intent.ton_amount),
            "token stake routed"
        );

        ctx.send_with_init(
            account,
            forward_value,
            Message::StakeInternal(StakeInternal {
                query_id: msg.query_id,
                amount: intent.ton_amount,
                jetton: Some(JettonCredit {
                    wallet: src,
                    amount: msg.amount,
                }),
                response_destination: intent.response_destination,
                forward_amount: intent.forward_amount,
                forward_payload: intent.forward_payload,
            }),
            StateInit::StakeAccount {
                master: self.identity,
                owner: msg.sender,
            },
        );
        Ok(())
    }

    /// Return the full token amount of a rejected stake to its sender
    fn refund_tokens(&self, ctx: &mut Context, wallet: Identity, msg: &TransferNotification) {
        ctx.send(
            wallet,
            ctx.excess_after(0),
            Message::TokenTransfer(TokenTransfer {
                query_id: msg.query_id,
                amount: msg.amount,
                destination: msg.sender,
                response_destination: msg.sender,
                custom_payload: None,
                forward_amount: 0,
                forward_payload: None,
            }),
        );
    }

    /// Execute one already-clamped release page
    ///
    /// Exactly one page per message: pagination is driven by repeated
    /// user-issued StakeRelease messages, never continued automatically.
    fn handle_stake_release(
        &mut self,
        ctx: &mut Context,
        src: Identity,
        msg: StakeRelease,
    ) -> LedgerResult<()> {
        let expected = self.account_of(&msg.owner);
        if src != expected {
            return Err(LedgerError::unauthorized(
                short_hex(&expected),
                short_hex(&src),
            ));
        }

        // Zero legs were already dropped by the account; tolerate them anyway
        let legs: Vec<_> = msg
            .jettons
            .values()
            .filter(|info| info.jetton_amount > 0)
            .cloned()
            .collect();

        // Saturate: an absurd page must fail the value check, not overflow
        let legs_cost = legs
            .iter()
            .fold(0 as Coins, |acc, info| acc.saturating_add(info.ton_amount));
        let required = ctx
            .fee()
            .saturating_add(legs_cost)
            .saturating_add(msg.forward_amount);
        if ctx.value() < required {
            return Err(LedgerError::insufficient_value(required, ctx.value()));
        }

        let mut released_jettons: BTreeMap<Identity, Coins> = BTreeMap::new();
        for info in &legs {
            ctx.send(
                info.jetton_wallet,
                info.ton_amount,
                Message::TokenTransfer(TokenTransfer {
                    query_id: msg.query_id,
                    amount: info.jetton_amount,
                    destination: info.destination,
                    response_destination: msg.response_destination,
                    custom_payload: info.custom_payload.clone(),
                    forward_amount: info.forward_amount,
                    forward_payload: info.forward_payload.clone(),
                }),
            );
            let entry = released_jettons.entry(info.jetton_wallet).or_insert(0);
            *entry = entry.saturating_add(info.jetton_amount);
        }

        debug!(
            router = %short_hex(&self.identity),
            owner = %short_hex(&msg.owner),
            toncoin = %fmt_tons(msg.amount),
            legs = legs.len(),
            page_idx = msg.jettons_idx,
            "release page dispatched"
        );

        // The released native value rides on the terminal notification. It is
        // paid from the pool, on top of the attached value.
        ctx.send(
            msg.destination,
            msg.amount.saturating_add(msg.forward_amount),
            Message::StakeReleaseNotification(StakeReleaseNotification {
                query_id: msg.query_id,
                released_toncoin: msg.amount,
                released_jettons,
                jettons_idx: msg.jettons_idx,
                forward_payload: msg.forward_payload,
            }),
        );

        let excess = ctx.value() - required;
        if excess > 0 {
            ctx.send(
                msg.response_destination,
                excess,
                Message::Excesses(Excesses {
                    query_id: msg.query_id,
                }),
            );
        }
        Ok(())
    }
}

impl Actor for StakeRouter {
    fn identity(&self) -> Identity {
        self.identity
    }

    fn kind(&self) -> &'static str {
        "stake-router"
    }

    fn handle(&mut self, ctx: &mut Context, env: Envelope) -> LedgerResult<()> {
        match env.body {
            Message::StakeToncoin(msg) => self.handle_stake_toncoin(ctx, env.src, msg),
            Message::TransferNotification(msg) => {
                self.handle_transfer_notification(ctx, env.src, msg)
            }
            Message::StakeRelease(msg) => self.handle_stake_release(ctx, env.src, msg),
            Message::Bounced(b) => {
                warn!(
                    router = %short_hex(&self.identity),
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
        Snapshot::Router(RouterInfo {
            identity: self.identity,
            admin: self.admin,
        })
    }
}
