//jetstake-core/src/node.rs
//! The message-passing execution environment
//!
//! One tokio task per actor, one mpsc mailbox per actor. Delivery is FIFO
//! per sender/receiver pair: every sender queues its envelopes sequentially
//! and each mailbox preserves arrival order. An actor processes one envelope
//! to completion before the next; there is no shared memory between actors.
//!
//! The node also plays the role of the value ledger: it credits an actor's
//! native balance when an envelope is delivered and debits the sender when
//! one is posted. A handler error returns the remaining value to the sender
//! as a synthetic `Bounced` envelope (when the original was bounceable);
//! the processing fee is burned either way.

use jetstake_common::prelude::*;
use jetstake_ledger::{
    Actor, Context, Envelope, JettonMaster, Snapshot, StakeRouter, StakedInfo, Treasury,
    TreasuryLog, WalletData,
};
use jetstake_protocol::{Bounced, Message};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use jetstake_common::types::runtime::TREASURY_ENDOWMENT;

#[derive(Clone)]
struct ActorHandle {
    envelopes: mpsc::Sender<Envelope>,
    queries: mpsc::Sender<oneshot::Sender<Snapshot>>,
}

struct NodeInner {
    config: LedgerConfig,
    actors: RwLock<HashMap<Identity, ActorHandle>>,
    balances: RwLock<HashMap<Identity, Coins>>,
    /// Envelopes posted but not yet fully handled; zero means quiescent
    inflight: AtomicU64,
}

/// A local staking ledger network
///
/// Cheaply cloneable handle shared by every actor task. Actors are spawned
/// explicitly (routers, masters, treasuries) or lazily from the state-init
/// descriptor on the first envelope addressed to them.
#[derive(Clone)]
pub struct LedgerNode {
    inner: Arc<NodeInner>,
}

impl LedgerNode {
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(NodeInner {
                config,
                actors: RwLock::new(HashMap::new()),
                balances: RwLock::new(HashMap::new()),
                inflight: AtomicU64::new(0),
            }),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.inner.config
    }

    /// Register an actor and start its mailbox task
    ///
    /// Idempotent: spawning an identity that already has a live actor keeps
    /// the existing one, so a racing pair of state-init envelopes cannot
    /// orphan a mailbox.
    pub async fn spawn(&self, actor: Box<dyn Actor>) -> Identity {
        let identity = actor.identity();
        let mut actors = self.inner.actors.write().await;
        if actors.contains_key(&identity) {
            debug!(id = %short_hex(&identity), "actor already registered");
            return identity;
        }

        let (env_tx, env_rx) = mpsc::channel(self.inner.config.mailbox_capacity);
        let (query_tx, query_rx) = mpsc::channel(16);
        actors.insert(
            identity,
            ActorHandle {
                envelopes: env_tx,
                queries: query_tx,
            },
        );
        drop(actors);

        info!(kind = actor.kind(), id = %short_hex(&identity), "actor spawned");
        let node = self.clone();
        tokio::spawn(run_actor(node, actor, env_rx, query_rx));
        identity
    }

    /// Spawn the global stake router
    pub async fn spawn_router(&self, seed: &str, admin: Identity) -> Identity {
        let identity = AddressDerivation::from_seed(seed);
        self.spawn(Box::new(StakeRouter::new(identity, admin))).await
    }

    /// Spawn a jetton master (reference token ledger root)
    pub async fn spawn_jetton_master(&self, seed: &str, admin: Identity) -> Identity {
        let identity = AddressDerivation::from_seed(seed);
        self.spawn(Box::new(JettonMaster::new(identity, admin))).await
    }

    /// Spawn an endowed treasury: an externally-controlled user identity
    pub async fn spawn_treasury(&self, seed: &str) -> Identity {
        let identity = self.spawn(Box::new(Treasury::from_seed(seed))).await;
        self.inner
            .balances
            .write()
            .await
            .insert(identity, TREASURY_ENDOWMENT);
        identity
    }

    /// Inject an external bounceable message into the network
    pub async fn send(&self, src: Identity, dst: Identity, value: Coins, body: Message) {
        self.post(Envelope::new(src, dst, value, body).bounceable())
            .await;
    }

    /// Wait until every posted envelope has been fully handled
    pub async fn settle(&self) {
        while self.inner.inflight.load(Ordering::SeqCst) != 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// Query an actor's state snapshot
    pub async fn snapshot(&self, identity: &Identity) -> Option<Snapshot> {
        let handle = self.inner.actors.read().await.get(identity).cloned()?;
        let (tx, rx) = oneshot::channel();
        handle.queries.send(tx).await.ok()?;
        rx.await.ok()
    }

    /// Staked balances of a stake account
    pub async fn staked_info(&self, account: &Identity) -> Option<StakedInfo> {
        match self.snapshot(account).await? {
            Snapshot::Account(info) => Some(info),
            _ => None,
        }
    }

    /// Balance of a jetton wallet
    pub async fn wallet_data(&self, wallet: &Identity) -> Option<WalletData> {
        match self.snapshot(wallet).await? {
            Snapshot::JettonWallet(data) => Some(data),
            _ => None,
        }
    }

    /// Everything a treasury has received so far
    pub async fn treasury_log(&self, treasury: &Identity) -> Option<TreasuryLog> {
        match self.snapshot(treasury).await? {
            Snapshot::Treasury(log) => Some(log),
            _ => None,
        }
    }

    /// Native value currently held by an identity
    pub async fn balance(&self, identity: &Identity) -> Coins {
        self.inner
            .balances
            .read()
            .await
            .get(identity)
            .copied()
            .unwrap_or(0)
    }

    /// Queue an envelope for delivery, debiting the sender's native balance
    async fn post(&self, env: Envelope) {
        self.inner.inflight.fetch_add(1, Ordering::SeqCst);
        {
            let mut balances = self.inner.balances.write().await;
            let entry = balances.entry(env.src).or_insert(0);
            *entry = entry.saturating_sub(env.value);
        }

        match self.resolve(&env).await {
            Some(handle) => {
                if handle.envelopes.send(env).await.is_err() {
                    warn!("mailbox closed, dropping envelope");
                    self.inner.inflight.fetch_sub(1, Ordering::SeqCst);
                }
            }
            None => self.reject(env).await,
        }
    }

    /// Find the destination mailbox, instantiating it from the envelope's
    /// state-init descriptor when necessary
    ///
    /// Returns a boxed future to break the `Send` auto-trait cycle through
    /// `spawn` -> `run_actor` -> `deliver` -> `post` -> `resolve`.
    fn resolve<'a>(
        &'a self,
        env: &'a Envelope,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Option<ActorHandle>> + Send + 'a>>
    {
        Box::pin(async move {
            if let Some(handle) = self.inner.actors.read().await.get(&env.dst) {
                return Some(handle.clone());
            }
            let init = env.state_init.as_ref()?;
            if init.identity() != env.dst {
                warn!(
                    dst = %short_hex(&env.dst),
                    derived = %short_hex(&init.identity()),
                    "state init does not derive the destination, dropping"
                );
                return None;
            }
            self.spawn(init.build()).await;
            self.inner.actors.read().await.get(&env.dst).cloned()
        })
    }

    /// Handle an envelope with no deliverable destination
    async fn reject(&self, env: Envelope) {
        warn!(
            dst = %short_hex(&env.dst),
            op = %env.body.name(),
            "no actor at destination"
        );
        if env.bounce {
            let refund = env.value.saturating_sub(self.inner.config.processing_fee);
            if refund > 0 {
                if let Some(handle) = self.inner.actors.read().await.get(&env.src).cloned() {
                    let bounced = Envelope::new(
                        env.dst,
                        env.src,
                        refund,
                        Message::Bounced(Bounced {
                            op: env.body.op(),
                            query_id: env.body.query_id(),
                        }),
                    );
                    self.inner.inflight.fetch_add(1, Ordering::SeqCst);
                    if handle.envelopes.send(bounced).await.is_err() {
                        self.inner.inflight.fetch_sub(1, Ordering::SeqCst);
                    }
                }
            }
        }
        self.inner.inflight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Run one envelope through its actor's handler
    async fn deliver(&self, actor: &mut dyn Actor, env: Envelope) {
        // Credit the attached value before the handler runs, so outbound
        // sends are backed by it
        {
            let mut balances = self.inner.balances.write().await;
            let entry = balances.entry(env.dst).or_insert(0);
            *entry = entry.saturating_add(env.value);
        }

        let fee = self.inner.config.processing_fee;
        let src = env.src;
        let value = env.value;
        let bounce = env.bounce;
        let op = env.body.op();
        let query_id = env.body.query_id();
        let name = env.body.name();

        let mut ctx = Context::new(actor.identity(), fee, value);
        match actor.handle(&mut ctx, env) {
            Ok(()) => {
                debug!(
                    kind = actor.kind(),
                    id = %short_hex(&actor.identity()),
                    msg = name,
                    value = %fmt_tons(value),
                    "envelope handled"
                );
                for out in ctx.into_outbox() {
                    self.post(out).await;
                }
            }
            Err(err) => {
                warn!(
                    kind = actor.kind(),
                    id = %short_hex(&actor.identity()),
                    msg = name,
                    error = %err,
                    "handler failed"
                );
                let refund = value.saturating_sub(fee);
                if bounce && refund > 0 {
                    self.post(Envelope::new(
                        actor.identity(),
                        src,
                        refund,
                        Message::Bounced(Bounced { op, query_id }),
                    ))
                    .await;
                }
            }
        }
        self.inner.inflight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mailbox loop: one envelope or snapshot query at a time
async fn run_actor(
    node: LedgerNode,
    mut actor: Box<dyn Actor>,
    mut env_rx: mpsc::Receiver<Envelope>,
    mut query_rx: mpsc::Receiver<oneshot::Sender<Snapshot>>,
) {
    loop {
        tokio::select! {
            maybe_env = env_rx.recv() => match maybe_env {
                Some(env) => node.deliver(actor.as_mut(), env).await,
                None => break,
            },
            maybe_query = query_rx.recv() => match maybe_query {
                Some(reply) => {
                    let _ = reply.send(actor.snapshot());
                }
                None => break,
            },
        }
    }
    debug!(kind = actor.kind(), id = %short_hex(&actor.identity()), "actor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetstake_protocol::{ops, StakeToncoin};

    fn node() -> LedgerNode {
        LedgerNode::new(LedgerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_treasury_is_endowed() {
        let node = node();
        let user = node.spawn_treasury("user").await;
        assert_eq!(node.balance(&user).await, TREASURY_ENDOWMENT);
    }

    #[tokio::test]
    async fn test_spawn_is_idempotent() {
        let node = node();
        let admin = node.spawn_treasury("admin").await;
        let a = node.spawn_router("router", admin).await;
        let b = node.spawn_router("router", admin).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_unknown_destination_bounces_to_sender() {
        let node = node();
        let user = node.spawn_treasury("user").await;
        let nowhere = AddressDerivation::from_seed("nowhere");

        node.send(
            user,
            nowhere,
            ONE_TON,
            Message::StakeToncoin(StakeToncoin {
                query_id: 42,
                amount: ONE_TON / 2,
                response_destination: user,
                forward_amount: 0,
                forward_payload: None,
            }),
        )
        .await;
        node.settle().await;

        let log = node.treasury_log(&user).await.unwrap();
        assert_eq!(log.received.len(), 1);
        assert_eq!(log.received[0].op, ops::BOUNCED);
        match &log.received[0].body {
            Message::Bounced(b) => {
                assert_eq!(b.op, ops::STAKE_TONCOIN);
                assert_eq!(b.query_id, 42);
            }
            other => panic!("expected Bounced, got {}", other.name()),
        }
    }

    #[tokio::test]
    async fn test_failed_handler_refunds_value_minus_fee() {
        let node = node();
        let fee = node.config().processing_fee;
        let admin = node.spawn_treasury("admin").await;
        let user = node.spawn_treasury("user").await;
        let router = node.spawn_router("router", admin).await;

        // Underfunded: amount exceeds attached value
        node.send(
            user,
            router,
            ONE_TON,
            Message::StakeToncoin(StakeToncoin {
                query_id: 1,
                amount: 2 * ONE_TON,
                response_destination: user,
                forward_amount: 0,
                forward_payload: None,
            }),
        )
        .await;
        node.settle().await;

        let log = node.treasury_log(&user).await.unwrap();
        assert_eq!(log.received.len(), 1);
        assert_eq!(log.received[0].op, ops::BOUNCED);
        assert_eq!(log.received[0].value, ONE_TON - fee);
        assert_eq!(
            node.balance(&user).await,
            TREASURY_ENDOWMENT - fee
        );
    }
}
