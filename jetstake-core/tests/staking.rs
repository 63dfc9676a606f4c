// tests/staking.rs - End-to-end staking scenarios over a live network
//
// Every test runs a full LedgerNode with the default 0.01 processing fee and
// drives the protocol exclusively through externally injected messages, then
// asserts on actor snapshots and the exact traces the user treasuries saw.
use jetstake_common::prelude::*;
use jetstake_core::{LedgerConfig, LedgerNode};
use jetstake_ledger::Snapshot;
use jetstake_protocol::{
    comment, encode_stake_jetton, ops, Message, MintJetton, ReleaseJettonInfo, StakeJetton,
    StakeRelease, StakeToncoin, TokenTransfer,
};
use std::collections::BTreeMap;

const FEE: Coins = ONE_TON / 100;

struct Net {
    node: LedgerNode,
    admin: Identity,
    user: Identity,
    router: Identity,
    master: Identity,
    user_wallet: Identity,
    pooled_wallet: Identity,
    account: Identity,
}

async fn setup() -> Net {
    let node = LedgerNode::new(LedgerConfig::default()).unwrap();
    let admin = node.spawn_treasury("admin").await;
    let user = node.spawn_treasury("user").await;
    let router = node.spawn_router("stake-router", admin).await;
    let master = node.spawn_jetton_master("jetton-master", admin).await;
    Net {
        user_wallet: AddressDerivation::jetton_wallet(&master, &user),
        pooled_wallet: AddressDerivation::jetton_wallet(&master, &router),
        account: AddressDerivation::stake_account(&router, &user),
        node,
        admin,
        user,
        router,
        master,
    }
}

/// Mint `amount` of the net's jetton into the user's wallet
async fn mint(net: &Net, amount: Coins) {
    net.node
        .send(
            net.admin,
            net.master,
            ONE_TON,
            Message::MintJetton(MintJetton {
                query_id: 1,
                amount,
                receiver: net.user,
                response_destination: net.admin,
                forward_amount: ONE_TON / 20,
                forward_payload: None,
            }),
        )
        .await;
    net.node.settle().await;
}

/// Stake native value through the router
async fn stake_toncoin(net: &Net, attached: Coins, amount: Coins, forward_amount: Coins) {
    net.node
        .send(
            net.user,
            net.router,
            attached,
            Message::StakeToncoin(StakeToncoin {
                query_id: 2,
                amount,
                response_destination: net.user,
                forward_amount,
                forward_payload: None,
            }),
        )
        .await;
    net.node.settle().await;
}

/// Stake tokens through the token ledger with a native top-up
async fn stake_jetton(net: &Net, jetton_amount: Coins, ton_amount: Coins, forward_amount: Coins) {
    let intent = encode_stake_jetton(&StakeJetton {
        ton_amount,
        response_destination: net.user,
        forward_amount,
        forward_payload: None,
    })
    .unwrap();
    net.node
        .send(
            net.user,
            net.user_wallet,
            ONE_TON,
            Message::TokenTransfer(TokenTransfer {
                query_id: 3,
                amount: jetton_amount,
                destination: net.router,
                response_destination: net.user,
                custom_payload: None,
                forward_amount: ONE_TON / 2,
                forward_payload: Some(intent),
            }),
        )
        .await;
    net.node.settle().await;
}

fn release_page(
    net: &Net,
    amount: Coins,
    jettons_idx: u64,
    legs: Vec<ReleaseJettonInfo>,
) -> Message {
    let mut jettons = BTreeMap::new();
    for (idx, leg) in legs.into_iter().enumerate() {
        jettons.insert(idx as u64, leg);
    }
    Message::StakeRelease(StakeRelease {
        query_id: 4,
        owner: net.user,
        amount,
        jettons,
        jettons_idx,
        destination: net.user,
        response_destination: net.user,
        custom_payload: None,
        forward_payload: None,
        forward_amount: ONE_TON / 10,
    })
}

fn jetton_leg(net: &Net, wallet: Identity, jetton_amount: Coins) -> ReleaseJettonInfo {
    ReleaseJettonInfo {
        ton_amount: ONE_TON / 5,
        jetton_amount,
        jetton_wallet: wallet,
        forward_amount: ONE_TON / 10,
        destination: net.user,
        custom_payload: None,
        forward_payload: None,
    }
}

#[tokio::test]
async fn test_mint_prepares_user_wallet() {
    let net = setup().await;
    mint(&net, 10 * ONE_TON).await;

    let data = net.node.wallet_data(&net.user_wallet).await.unwrap();
    assert_eq!(data.balance, 10 * ONE_TON);
    assert_eq!(data.owner, net.user);

    match net.node.snapshot(&net.master).await.unwrap() {
        Snapshot::JettonMaster(info) => assert_eq!(info.total_supply, 10 * ONE_TON),
        other => panic!("unexpected snapshot {other:?}"),
    }

    // The user saw the transfer notification, the admin the excess refund
    let user_log = net.node.treasury_log(&net.user).await.unwrap();
    assert_eq!(user_log.received.len(), 1);
    assert_eq!(user_log.received[0].op, ops::TRANSFER_NOTIFICATION);
    assert_eq!(user_log.received[0].value, ONE_TON / 20);

    let admin_log = net.node.treasury_log(&net.admin).await.unwrap();
    assert_eq!(admin_log.received.len(), 1);
    assert_eq!(admin_log.received[0].op, ops::EXCESSES);
}

#[tokio::test]
async fn test_staking_toncoin() {
    let net = setup().await;
    stake_toncoin(&net, 2 * ONE_TON, ONE_TON / 2, ONE_TON / 10).await;

    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_toncoin, ONE_TON / 2);
    assert!(info.staked_jettons.is_empty());

    // Excess first, then the terminal notification, both from the account
    let log = net.node.treasury_log(&net.user).await.unwrap();
    assert_eq!(log.received.len(), 2);
    assert_eq!(log.received[0].op, ops::EXCESSES);
    // 2.0 attached, 0.5 pooled at the router, two 0.01 fees, 0.1 forwarded
    assert_eq!(log.received[0].value, 2 * ONE_TON - ONE_TON / 2 - 2 * FEE - ONE_TON / 10);
    match &log.received[1].body {
        Message::StakeNotification(n) => {
            assert_eq!(n.staked_toncoin, ONE_TON / 2);
        }
        other => panic!("expected StakeNotification, got {}", other.name()),
    }
    assert_eq!(log.received[1].value, ONE_TON / 10);

    // The user paid stake, fees and nothing else
    assert_eq!(
        net.node.balance(&net.user).await,
        jetstake_common::types::runtime::TREASURY_ENDOWMENT - ONE_TON / 2 - 2 * FEE
    );
}

#[tokio::test]
async fn test_staking_jetton_credits_native_and_bucket() {
    let net = setup().await;
    mint(&net, 10 * ONE_TON).await;
    stake_jetton(&net, ONE_TON, ONE_TON / 10, ONE_TON / 10).await;

    let data = net.node.wallet_data(&net.user_wallet).await.unwrap();
    assert_eq!(data.balance, 9 * ONE_TON);
    let pooled = net.node.wallet_data(&net.pooled_wallet).await.unwrap();
    assert_eq!(pooled.balance, ONE_TON);
    assert_eq!(pooled.owner, net.router);

    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_toncoin, ONE_TON / 10);
    assert_eq!(info.staked_jettons.get(&net.pooled_wallet), Some(&ONE_TON));

    // The native top-up produced a stake notification like a native stake
    let log = net.node.treasury_log(&net.user).await.unwrap();
    let notified: Vec<_> = log
        .received
        .iter()
        .filter(|m| m.op == ops::STAKE_NOTIFICATION)
        .collect();
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].value, ONE_TON / 10);
}

#[tokio::test]
async fn test_full_release_returns_everything() {
    let net = setup().await;
    mint(&net, 10 * ONE_TON).await;
    stake_toncoin(&net, 2 * ONE_TON, ONE_TON / 2, ONE_TON / 10).await;
    stake_jetton(&net, ONE_TON, ONE_TON / 10, ONE_TON / 10).await;

    let staked = ONE_TON / 2 + ONE_TON / 10;
    net.node
        .send(
            net.user,
            net.account,
            ONE_TON,
            release_page(&net, staked, 0, vec![jetton_leg(&net, net.pooled_wallet, ONE_TON)]),
        )
        .await;
    net.node.settle().await;

    // Balances are fully unwound
    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_toncoin, 0);
    assert_eq!(info.staked_jettons.get(&net.pooled_wallet), Some(&0));
    let data = net.node.wallet_data(&net.user_wallet).await.unwrap();
    assert_eq!(data.balance, 10 * ONE_TON);
    let pooled = net.node.wallet_data(&net.pooled_wallet).await.unwrap();
    assert_eq!(pooled.balance, 0);

    // Exactly one terminal release notification, carrying the released
    // native value on top of the forward amount
    let log = net.node.treasury_log(&net.user).await.unwrap();
    let releases: Vec<_> = log
        .received
        .iter()
        .filter(|m| m.op == ops::STAKE_RELEASE_NOTIFICATION)
        .collect();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].value, staked + ONE_TON / 10);
    match &releases[0].body {
        Message::StakeReleaseNotification(n) => {
            assert_eq!(n.released_toncoin, staked);
            assert_eq!(n.released_jettons.get(&net.pooled_wallet), Some(&ONE_TON));
            assert_eq!(n.jettons_idx, 0);
        }
        other => panic!("expected StakeReleaseNotification, got {}", other.name()),
    }

    // The released tokens arrived with their own transfer notification
    let transfers: Vec<_> = log
        .received
        .iter()
        .filter(|m| m.op == ops::TRANSFER_NOTIFICATION)
        .collect();
    // One from the mint, one from the release leg
    assert_eq!(transfers.len(), 2);
}

#[tokio::test]
async fn test_partial_release_leaves_remainder() {
    let net = setup().await;
    mint(&net, 10 * ONE_TON).await;
    stake_toncoin(&net, 2 * ONE_TON, ONE_TON / 2, ONE_TON / 10).await;
    stake_jetton(&net, ONE_TON, ONE_TON / 10, ONE_TON / 10).await;

    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_toncoin, ONE_TON / 2 + ONE_TON / 10);

    // Release 0.5 of the 0.6 staked plus the whole token bucket
    net.node
        .send(
            net.user,
            net.account,
            ONE_TON,
            release_page(
                &net,
                ONE_TON / 2,
                0,
                vec![jetton_leg(&net, net.pooled_wallet, ONE_TON)],
            ),
        )
        .await;
    net.node.settle().await;

    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_toncoin, ONE_TON / 10);
    assert_eq!(info.staked_jettons.get(&net.pooled_wallet), Some(&0));
    let data = net.node.wallet_data(&net.user_wallet).await.unwrap();
    assert_eq!(data.balance, 10 * ONE_TON);
}

#[tokio::test]
async fn test_release_clamps_to_staked_balance() {
    let net = setup().await;
    stake_toncoin(&net, ONE_TON, ONE_TON / 10, 0).await;

    net.node
        .send(
            net.user,
            net.account,
            ONE_TON / 2,
            release_page(&net, ONE_TON / 2, 0, vec![]),
        )
        .await;
    net.node.settle().await;

    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_toncoin, 0);

    // Only what was actually staked comes back
    let log = net.node.treasury_log(&net.user).await.unwrap();
    let release = log
        .received
        .iter()
        .find(|m| m.op == ops::STAKE_RELEASE_NOTIFICATION)
        .unwrap();
    match &release.body {
        Message::StakeReleaseNotification(n) => {
            assert_eq!(n.released_toncoin, ONE_TON / 10);
        }
        other => panic!("expected StakeReleaseNotification, got {}", other.name()),
    }
    assert_eq!(release.value, ONE_TON / 10 + ONE_TON / 10);
}

#[tokio::test]
async fn test_malformed_stake_payload_refunds_tokens() {
    let net = setup().await;
    mint(&net, 10 * ONE_TON).await;

    net.node
        .send(
            net.user,
            net.user_wallet,
            ONE_TON,
            Message::TokenTransfer(TokenTransfer {
                query_id: 9,
                amount: ONE_TON,
                destination: net.router,
                response_destination: net.user,
                custom_payload: None,
                forward_amount: ONE_TON / 2,
                forward_payload: Some(comment("hello")),
            }),
        )
        .await;
    net.node.settle().await;

    // Tokens made the round trip untouched and nothing got staked
    let data = net.node.wallet_data(&net.user_wallet).await.unwrap();
    assert_eq!(data.balance, 10 * ONE_TON);
    let pooled = net.node.wallet_data(&net.pooled_wallet).await.unwrap();
    assert_eq!(pooled.balance, 0);
    assert!(net.node.staked_info(&net.account).await.is_none());

    let log = net.node.treasury_log(&net.user).await.unwrap();
    assert!(log
        .received
        .iter()
        .all(|m| m.op != ops::STAKE_NOTIFICATION));
}

#[tokio::test]
async fn test_paginated_release_across_jetton_types() {
    let net = setup().await;
    let master_b = net
        .node
        .spawn_jetton_master("jetton-master-b", net.admin)
        .await;
    let user_wallet_b = AddressDerivation::jetton_wallet(&master_b, &net.user);
    let pooled_wallet_b = AddressDerivation::jetton_wallet(&master_b, &net.router);

    mint(&net, 2 * ONE_TON).await;
    net.node
        .send(
            net.admin,
            master_b,
            ONE_TON,
            Message::MintJetton(MintJetton {
                query_id: 1,
                amount: 3 * ONE_TON,
                receiver: net.user,
                response_destination: net.admin,
                forward_amount: 0,
                forward_payload: None,
            }),
        )
        .await;
    net.node.settle().await;

    // Stake one type A token and two type B tokens
    stake_jetton(&net, ONE_TON, 0, 0).await;
    let intent = encode_stake_jetton(&StakeJetton {
        ton_amount: 0,
        response_destination: net.user,
        forward_amount: 0,
        forward_payload: None,
    })
    .unwrap();
    net.node
        .send(
            net.user,
            user_wallet_b,
            ONE_TON,
            Message::TokenTransfer(TokenTransfer {
                query_id: 5,
                amount: 2 * ONE_TON,
                destination: net.router,
                response_destination: net.user,
                custom_payload: None,
                forward_amount: ONE_TON / 2,
                forward_payload: Some(intent.clone()),
            }),
        )
        .await;
    net.node.settle().await;

    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_jettons.get(&net.pooled_wallet), Some(&ONE_TON));
    assert_eq!(
        info.staked_jettons.get(&pooled_wallet_b),
        Some(&(2 * ONE_TON))
    );

    // Page 0 releases the type A bucket only
    net.node
        .send(
            net.user,
            net.account,
            ONE_TON,
            release_page(&net, 0, 0, vec![jetton_leg(&net, net.pooled_wallet, ONE_TON)]),
        )
        .await;
    net.node.settle().await;

    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_jettons.get(&net.pooled_wallet), Some(&0));
    assert_eq!(
        info.staked_jettons.get(&pooled_wallet_b),
        Some(&(2 * ONE_TON))
    );

    // A deposit of a third token between pages must not disturb page 1
    net.node
        .send(
            net.user,
            user_wallet_b,
            ONE_TON,
            Message::TokenTransfer(TokenTransfer {
                query_id: 6,
                amount: ONE_TON,
                destination: net.router,
                response_destination: net.user,
                custom_payload: None,
                forward_amount: ONE_TON / 2,
                forward_payload: Some(intent),
            }),
        )
        .await;
    net.node.settle().await;

    // Page 1 releases the whole type B bucket, including the fresh deposit
    net.node
        .send(
            net.user,
            net.account,
            ONE_TON,
            release_page(
                &net,
                0,
                1,
                vec![jetton_leg(&net, pooled_wallet_b, 3 * ONE_TON)],
            ),
        )
        .await;
    net.node.settle().await;

    let info = net.node.staked_info(&net.account).await.unwrap();
    assert_eq!(info.staked_jettons.get(&pooled_wallet_b), Some(&0));
    let data = net.node.wallet_data(&net.user_wallet).await.unwrap();
    assert_eq!(data.balance, 2 * ONE_TON);
    let data_b = net.node.wallet_data(&user_wallet_b).await.unwrap();
    assert_eq!(data_b.balance, 3 * ONE_TON);

    // Each page produced exactly one notification, echoing its cursor
    let log = net.node.treasury_log(&net.user).await.unwrap();
    let cursors: Vec<u64> = log
        .received
        .iter()
        .filter_map(|m| match &m.body {
            Message::StakeReleaseNotification(n) => Some(n.jettons_idx),
            _ => None,
        })
        .collect();
    assert_eq!(cursors, vec![0, 1]);
}
