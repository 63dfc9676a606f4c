// bin/devnet.rs - Jetstake development network
//
// Spins up a complete local staking network and drives one full scenario
// through it: mint, native stake, token stake, full release. Useful for
// eyeballing the message flow with RUST_LOG=debug.
use anyhow::Result;
use clap::Parser;
use jetstake_core::{LedgerConfig, LedgerNode};
use jetstake_protocol::{
    encode_stake_jetton, Message, MintJetton, ReleaseJettonInfo, StakeJetton, StakeRelease,
    StakeToncoin, TokenTransfer,
};
use std::collections::BTreeMap;

use jetstake_common::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "jetstake-devnet")]
#[command(about = "Jetstake development network - a local staking ledger", long_about = None)]
struct Args {
    /// Config file (TOML); flags below override it
    #[arg(short, long)]
    config: Option<String>,

    /// Flat processing fee per message, in nanotons
    #[arg(short, long)]
    fee: Option<u128>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    // Print banner
    println!(
        r#"
╔═══════════════════════════════════════════════════════════════╗
║        _      _       _        _                              ║
║       (_) ___| |_ ___| |_ __ _| | _____                       ║
║       | |/ _ \ __/ __| __/ _` | |/ / _ \                      ║
║       | |  __/ |_\__ \ || (_| |   <  __/                      ║
║      _/ |\___|\__|___/\__\__,_|_|\_\___|                      ║
║     |__/                                                      ║
║                                                               ║
║     Actor Staking Ledger - Development Network                ║
╚═══════════════════════════════════════════════════════════════╝
    "#
    );

    // Create config
    let mut config = match &args.config {
        Some(path) => LedgerConfig::load(path)
            .map_err(|e| anyhow::anyhow!("Config load failed: {}", e))?,
        None => LedgerConfig::default(),
    };
    if let Some(fee) = args.fee {
        config.processing_fee = fee;
    }
    config.log_level = args.log_level;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Config validation failed: {}", e))?;

    tracing::info!("Starting jetstake development network");
    tracing::info!("Configuration:");
    tracing::info!("  Processing fee: {}", fmt_tons(config.processing_fee));
    tracing::info!("  Mailbox capacity: {}", config.mailbox_capacity);
    tracing::info!("");

    let node = LedgerNode::new(config)?;

    // Network participants
    let admin = node.spawn_treasury("admin").await;
    let user = node.spawn_treasury("user").await;
    let router = node.spawn_router("stake-router", admin).await;
    let master = node.spawn_jetton_master("jetton-master", admin).await;

    tracing::info!("Participants:");
    tracing::info!("  admin  {}", hex::encode(admin));
    tracing::info!("  user   {}", hex::encode(user));
    tracing::info!("  router {}", hex::encode(router));
    tracing::info!("  master {}", hex::encode(master));
    tracing::info!("");

    let user_wallet = AddressDerivation::jetton_wallet(&master, &user);
    let pooled_wallet = AddressDerivation::jetton_wallet(&master, &router);
    let account = AddressDerivation::stake_account(&router, &user);

    // 1. Mint 10 jettons to the user
    tracing::info!("[1/4] minting 10 jettons to user");
    node.send(
        admin,
        master,
        ONE_TON,
        Message::MintJetton(MintJetton {
            query_id: rand::random(),
            amount: 10 * ONE_TON,
            receiver: user,
            response_destination: admin,
            forward_amount: ONE_TON / 20,
            forward_payload: None,
        }),
    )
    .await;
    node.settle().await;

    // 2. Stake 0.5 native
    tracing::info!("[2/4] staking 0.5 toncoin");
    node.send(
        user,
        router,
        2 * ONE_TON,
        Message::StakeToncoin(StakeToncoin {
            query_id: rand::random(),
            amount: ONE_TON / 2,
            response_destination: user,
            forward_amount: ONE_TON / 10,
            forward_payload: None,
        }),
    )
    .await;
    node.settle().await;

    // 3. Stake 1 jetton plus a 0.1 native top-up, through the token ledger
    tracing::info!("[3/4] staking 1.0 jetton with a 0.1 toncoin top-up");
    let intent = encode_stake_jetton(&StakeJetton {
        ton_amount: ONE_TON / 10,
        response_destination: user,
        forward_amount: ONE_TON / 10,
        forward_payload: None,
    })?;
    node.send(
        user,
        user_wallet,
        ONE_TON,
        Message::TokenTransfer(TokenTransfer {
            query_id: rand::random(),
            amount: ONE_TON,
            destination: router,
            response_destination: user,
            custom_payload: None,
            forward_amount: ONE_TON / 2,
            forward_payload: Some(intent),
        }),
    )
    .await;
    node.settle().await;

    if let Some(info) = node.staked_info(&account).await {
        tracing::info!(
            "staked after deposits: {} toncoin, {} jetton types",
            fmt_tons(info.staked_toncoin),
            info.staked_jettons.len()
        );
    }

    // 4. Release everything in a single page
    tracing::info!("[4/4] releasing the full position");
    let mut jettons = BTreeMap::new();
    jettons.insert(
        0,
        ReleaseJettonInfo {
            ton_amount: ONE_TON / 5,
            jetton_amount: ONE_TON,
            jetton_wallet: pooled_wallet,
            forward_amount: ONE_TON / 10,
            destination: user,
            custom_payload: None,
            forward_payload: None,
        },
    );
    node.send(
        user,
        account,
        ONE_TON,
        Message::StakeRelease(StakeRelease {
            query_id: rand::random(),
            owner: user,
            amount: ONE_TON / 2 + ONE_TON / 10,
            jettons,
            jettons_idx: 0,
            destination: user,
            response_destination: user,
            custom_payload: None,
            forward_payload: None,
            forward_amount: ONE_TON / 10,
        }),
    )
    .await;
    node.settle().await;

    // Final state
    tracing::info!("");
    tracing::info!("Final state:");
    if let Some(info) = node.staked_info(&account).await {
        tracing::info!("  account toncoin: {}", fmt_tons(info.staked_toncoin));
        for (wallet, amount) in &info.staked_jettons {
            tracing::info!("  account jetton {}: {}", short_hex(wallet), fmt_tons(*amount));
        }
    }
    if let Some(data) = node.wallet_data(&user_wallet).await {
        tracing::info!("  user jetton balance: {}", fmt_tons(data.balance));
    }
    if let Some(log) = node.treasury_log(&user).await {
        tracing::info!("  user received {} messages:", log.received.len());
        for msg in &log.received {
            tracing::info!(
                "    {} value={} from={}",
                msg.body.name(),
                fmt_tons(msg.value),
                short_hex(&msg.src)
            );
        }
    }
    tracing::info!("  user native balance: {}", fmt_tons(node.balance(&user).await));

    Ok(())
}
