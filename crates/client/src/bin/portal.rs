// Copyright 2025 Boundless, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use common::{PortalConfig, Wave};
use portal_client::Portal;
use portal_client::provider::eth::EthProvider;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Connect a wallet to the WavePortal contract, print the wave log,
/// optionally send a wave, then tail live waves until interrupted.
#[derive(Parser)]
struct Args {
    /// Ethereum private key used to sign the wave transaction
    #[arg(long, env = "ETH_WALLET_PRIVATE_KEY")]
    wallet_private_key: PrivateKeySigner,

    /// Websocket RPC endpoint URL
    #[arg(long, env = "ETH_WS_RPC_URL")]
    ws_rpc_url: String,

    /// Address of the deployed WavePortal contract
    #[arg(long, env = "WAVE_PORTAL_ADDRESS")]
    portal_address: Address,

    /// Message to wave with; without one the log is only tailed
    #[arg(long)]
    message: Option<String>,
}

fn print_wave(wave: &Wave) {
    println!("{}  {}  {}", wave.timestamp, wave.address, wave.message);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::try_parse()?;

    let config = PortalConfig::new(args.portal_address);
    let provider = EthProvider::connect(&args.ws_rpc_url, args.wallet_private_key, &config)
        .await
        .context("failed to connect to the rpc endpoint")?;
    let portal = Portal::new(Some(provider), config);

    // Adopt an existing authorization if the node has one, otherwise
    // prompt.
    let account = match portal
        .check_existing_connection()
        .await
        .context("account discovery failed")?
    {
        Some(account) => account,
        None => match portal.connect_wallet().await {
            Ok(account) => account,
            Err(err) => {
                if let Some(notice) = portal.take_notice() {
                    println!("{notice}");
                }
                return Err(err).context("wallet connection failed");
            }
        },
    };

    let snapshot = portal.snapshot();
    println!("connected as {account}");
    println!("total waves: {}", snapshot.wave_count);
    for wave in &snapshot.waves {
        print_wave(wave);
    }

    if let Some(message) = args.message {
        portal.set_draft(message);
        match portal.wave().await {
            Ok(tx_hash) => {
                println!("wave mined: {tx_hash}");
                println!("total waves: {}", portal.snapshot().wave_count);
            }
            Err(err) => {
                if let Some(notice) = portal.take_notice() {
                    println!("{notice}");
                }
                warn!(%err, "wave failed");
            }
        }
    }

    println!("tailing live waves, ctrl-c to exit");
    let mut seen = portal.snapshot().waves.len();
    let tail = async {
        loop {
            tokio::time::sleep(Duration::from_secs(2)).await;
            let snapshot = portal.snapshot();
            for wave in &snapshot.waves[seen..] {
                print_wave(wave);
            }
            seen = snapshot.waves.len();
        }
    };
    tokio::select! {
        _ = tail => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    portal.teardown();

    Ok(())
}
