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

//! Alloy-backed wallet provider speaking to a node over websocket.
//!
//! The websocket transport is required so the NewWave subscription can
//! push events instead of polling.

use super::{PendingWave, ProviderError, WalletProvider, WaveStream};
use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder, WsConnect};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::TransportError;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use common::{PortalConfig, WaveRecord};
use futures::{FutureExt, StreamExt};
use tracing::warn;

sol! {
    #[sol(rpc)]
    interface IWavePortal {
        struct Wave {
            address waver;
            string message;
            uint256 timestamp;
        }

        /// @notice Total number of waves ever recorded.
        function getTotalWaves() external view returns (uint256);

        /// @notice Full wave history in emission order.
        function getAllWaves() external view returns (Wave[] memory);

        /// @notice Record a wave with a message.
        function wave(string calldata _message) external;

        event NewWave(address indexed from, uint256 timestamp, string message);
    }
}

impl From<IWavePortal::Wave> for WaveRecord {
    fn from(w: IWavePortal::Wave) -> Self {
        Self {
            waver: w.waver,
            timestamp: clamp_secs(w.timestamp),
            message: w.message,
        }
    }
}

impl From<IWavePortal::NewWave> for WaveRecord {
    fn from(ev: IWavePortal::NewWave) -> Self {
        Self {
            waver: ev.from,
            timestamp: clamp_secs(ev.timestamp),
            message: ev.message,
        }
    }
}

fn clamp_secs(secs: U256) -> u64 {
    u64::try_from(secs).unwrap_or(u64::MAX)
}

fn transport_err(err: TransportError) -> ProviderError {
    ProviderError::Network(err.to_string())
}

fn contract_err(err: alloy::contract::Error) -> ProviderError {
    ProviderError::Network(err.to_string())
}

/// Wallet provider backed by an alloy websocket provider and a local
/// signer.
pub struct EthProvider {
    provider: DynProvider,
    contract: IWavePortal::IWavePortalInstance<DynProvider>,
}

impl EthProvider {
    pub async fn connect(
        ws_url: &str,
        signer: PrivateKeySigner,
        config: &PortalConfig,
    ) -> Result<Self, ProviderError> {
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_ws(WsConnect::new(ws_url))
            .await
            .map_err(transport_err)?
            .erased();
        let contract = IWavePortal::new(config.contract_address, provider.clone());
        Ok(Self { provider, contract })
    }
}

#[async_trait]
impl WalletProvider for EthProvider {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.provider.get_accounts().await.map_err(transport_err)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        // Browser wallets prompt on eth_requestAccounts; plain nodes
        // answer it like eth_accounts. There is no typed helper, so go
        // through the raw transport.
        let accounts: Vec<Address> = self
            .provider
            .raw_request("eth_requestAccounts".into(), [(); 0])
            .await
            .map_err(|err| {
                // EIP-1193 code 4001: the user declined the request.
                match err.as_error_resp() {
                    Some(resp) if resp.code == 4001 => ProviderError::Rejected,
                    _ => ProviderError::Network(err.to_string()),
                }
            })?;
        Ok(accounts)
    }

    async fn total_waves(&self) -> Result<u64, ProviderError> {
        let count = self
            .contract
            .getTotalWaves()
            .call()
            .await
            .map_err(contract_err)?;
        u64::try_from(count)
            .map_err(|_| ProviderError::Network("wave count exceeds u64".to_string()))
    }

    async fn all_waves(&self) -> Result<Vec<WaveRecord>, ProviderError> {
        let waves = self
            .contract
            .getAllWaves()
            .call()
            .await
            .map_err(contract_err)?;
        Ok(waves.into_iter().map(WaveRecord::from).collect())
    }

    async fn submit_wave(
        &self,
        message: &str,
        gas_limit: u64,
    ) -> Result<PendingWave, ProviderError> {
        let pending = self
            .contract
            .wave(message.to_string())
            .gas(gas_limit)
            .send()
            .await
            .map_err(contract_err)?;
        let tx_hash = *pending.tx_hash();

        let confirmation = async move {
            let receipt = pending
                .get_receipt()
                .await
                .map_err(|err| ProviderError::Network(err.to_string()))?;
            if !receipt.status() {
                return Err(ProviderError::Reverted(tx_hash.to_string()));
            }
            Ok(())
        }
        .boxed();

        Ok(PendingWave::new(tx_hash, confirmation))
    }

    async fn subscribe_new_waves(&self) -> Result<WaveStream, ProviderError> {
        let subscription = self
            .contract
            .NewWave_filter()
            .subscribe()
            .await
            .map_err(transport_err)?;
        let stream = subscription
            .into_stream()
            .filter_map(|item| {
                let record = match item {
                    Ok((event, _log)) => Some(WaveRecord::from(event)),
                    Err(err) => {
                        warn!(%err, "dropping undecodable NewWave event");
                        None
                    }
                };
                futures::future::ready(record)
            })
            .boxed();
        Ok(stream)
    }
}
