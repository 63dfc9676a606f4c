//jetstake-ledger/src/jetton.rs
//! Reference jetton ledger: master and wallet actors
//!
//! A minimal fungible-token pair implementing the message contract the stake
//! router depends on: mint, transfer, wallet-to-wallet settlement,
//! transfer-notification with an opaque forward payload, and excess refunds.
//! The staking core only consumes this contract; this implementation exists
//! so local networks and the integration tests can exercise the full token
//! path without an external ledger.
//!
//! Wallets follow the same conservative rule as stake accounts: the balance
//! is decremented before the outbound settlement is sent, and a settlement
//! that bounces is not auto-credited back.

use jetstake_common::prelude::*;
use jetstake_protocol::{
    Excesses, Message, MintJetton, TokenTransfer, TokenTransferInternal, TransferNotification,
};
use tracing::{debug, warn};

use crate::actor::{
    Actor, Context, Envelope, JettonMasterInfo, Snapshot, StateInit, WalletData,
};

/// Mint authority and root of one jetton's wallet tree
pub struct JettonMaster {
    identity: Identity,
    admin: Identity,
    total_supply: Coins,
}

impl JettonMaster {
    pub fn new(identity: Identity, admin: Identity) -> Self {
        Self {
            identity,
            admin,
            total_supply: 0,
        }
    }

    /// The wallet identity this master resolves for `owner`
    pub fn wallet_of(&self, owner: &Identity) -> Identity {
        AddressDerivation::jetton_wallet(&self.identity, owner)
    }

    fn handle_mint(&mut self, ctx: &mut Context, src: Identity, msg: MintJetton) -> LedgerResult<()> {
        if src != self.admin {
            return Err(LedgerError::unauthorized(
                short_hex(&self.admin),
                short_hex(&src),
            ));
        }

        self.total_supply = self.total_supply.saturating_add(msg.amount);

        debug!(
            master = %short_hex(&self.identity),
            receiver = %short_hex(&msg.receiver),
            amount = %fmt_tons(msg.amount),
            supply = %fmt_tons(self.total_supply),
            "jetton minted"
        );

        let wallet = self.wallet_of(&msg.receiver);
        ctx.send_with_init(
            wallet,
            ctx.excess_after(0),
            Message::TokenTransferInternal(TokenTransferInternal {
                query_id: msg.query_id,
                amount: msg.amount,
                sender: self.identity,
                response_destination: msg.response_destination,
                forward_amount: msg.forward_amount,
                forward_payload: msg.forward_payload,
            }),
            StateInit::JettonWallet {
                master: self.identity,
                owner: msg.receiver,
            },
        );
        Ok(())
    }
}

impl Actor for JettonMaster {
    fn identity(&self) -> Identity {
        self.identity
    }

    fn kind(&self) -> &'static str {
        "jetton-master"
    }

    fn handle(&mut self, ctx: &mut Context, env: Envelope) -> LedgerResult<()> {
        match env.body {
            Message::MintJetton(msg) => self.handle_mint(ctx, env.src, msg),
            Message::Bounced(b) => {
                warn!(
                    master = %short_hex(&self.identity),
                    op = format_args!("{:#010x}", b.op),
                    "downstream message bounced"
                );
                Ok(())
            }
            Message::Excesses(_) => Ok(()),
            other => Err(LedgerError::unexpected(other.name())),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::JettonMaster(JettonMasterInfo {
            identity: self.identity,
            admin: self.admin,
            total_supply: self.total_supply,
        })
    }
}

/// One holder's balance of one jetton, addressed at
/// `AddressDerivation::jetton_wallet(master, owner)`
pub struct JettonWallet {
    master: Identity,
    owner: Identity,
    balance: Coins,
}

impl JettonWallet {
    pub fn new(master: Identity, owner: Identity) -> Self {
        Self {
            master,
            owner,
            balance: 0,
        }
    }

    /// Outbound transfer ordered by the wallet owner
    fn handle_transfer(
        &mut self,
        ctx: &mut Context,
        src: Identity,
        msg: TokenTransfer,
    ) -> LedgerResult<()> {
        if src != self.owner {
            return Err(LedgerError::unauthorized(
                short_hex(&self.owner),
                short_hex(&src),
            ));
        }
        if self.balance < msg.amount {
            return Err(LedgerError::insufficient_tokens(msg.amount, self.balance));
        }

        // Decrement before the settlement leaves this wallet
        self.balance -= msg.amount;

        debug!(
            wallet = %short_hex(&self.identity()),
            destination = %short_hex(&msg.destination),
            amount = %fmt_tons(msg.amount),
            "token transfer sent"
        );

        let peer = AddressDerivation::jetton_wallet(&self.master, &msg.destination);
        ctx.send_with_init(
            peer,
            ctx.excess_after(0),
            Message::TokenTransferInternal(TokenTransferInternal {
                query_id: msg.query_id,
                amount: msg.amount,
                sender: self.owner,
                response_destination: msg.response_destination,
                forward_amount: msg.forward_amount,
                forward_payload: msg.forward_payload,
            }),
            StateInit::JettonWallet {
                master: self.master,
                owner: msg.destination,
            },
        );
        Ok(())
    }

    /// Inbound settlement from the master (mint) or a sibling wallet
    fn handle_transfer_internal(
        &mut self,
        ctx: &mut Context,
        src: Identity,
        msg: TokenTransferInternal,
    ) -> LedgerResult<()> {
        let sibling = AddressDerivation::jetton_wallet(&self.master, &msg.sender);
        if src != self.master && src != sibling {
            return Err(LedgerError::unauthorized(
                short_hex(&sibling),
                short_hex(&src),
            ));
        }

        self.balance = self.balance.saturating_add(msg.amount);

        debug!(
            wallet = %short_hex(&self.identity()),
            from = %short_hex(&msg.sender),
            amount = %fmt_tons(msg.amount),
            balance = %fmt_tons(self.balance),
            "tokens credited"
        );

        if msg.forward_amount > 0 {
            ctx.send(
                self.owner,
                msg.forward_amount,
                Message::TransferNotification(TransferNotification {
                    query_id: msg.query_id,
                    amount: msg.amount,
                    sender: msg.sender,
                    forward_payload: msg.forward_payload,
                }),
            );
        }

        let excess = ctx.excess_after(msg.forward_amount);
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

impl Actor for JettonWallet {
    fn identity(&self) -> Identity {
        AddressDerivation::jetton_wallet(&self.master, &self.owner)
    }

    fn kind(&self) -> &'static str {
        "jetton-wallet"
    }

    fn handle(&mut self, ctx: &mut Context, env: Envelope) -> LedgerResult<()> {
        match env.body {
            Message::TokenTransfer(msg) => self.handle_transfer(ctx, env.src, msg),
            Message::TokenTransferInternal(msg) => {
                self.handle_transfer_internal(ctx, env.src, msg)
            }
            Message::Bounced(b) => {
                warn!(
                    wallet = %short_hex(&self.identity()),
                    op = format_args!("{:#010x}", b.op),
                    "downstream message bounced"
                );
                Ok(())
            }
            Message::Excesses(_) => Ok(()),
            other => Err(LedgerError::unexpected(other.name())),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::JettonWallet(WalletData {
            master: self.master,
            owner: self.owner,
            balance: self.balance,
        })
    }
}
