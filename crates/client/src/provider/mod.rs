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

//! Wallet provider boundary.
//!
//! Everything the portal consumes from the outside world (account
//! authorization, contract reads, the wave write, the NewWave event
//! stream) is expressed as the transport-agnostic [`WalletProvider`]
//! trait. Runtime transports are adapters: [`eth::EthProvider`] speaks
//! to a real node, [`mock::MockProvider`] is deterministic and
//! in-memory for tests and offline smoke paths.

pub mod eth;
pub mod mock;

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use common::WaveRecord;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use thiserror::Error;

/// Live stream of NewWave events, in emission order.
pub type WaveStream = BoxStream<'static, WaveRecord>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authorization rejected by the user")]
    Rejected,
    #[error("network error: {0}")]
    Network(String),
    #[error("transaction reverted: {0}")]
    Reverted(String),
}

/// Handle to a submitted wave transaction.
///
/// The transaction hash is available immediately; mining confirmation
/// is awaited separately via [`PendingWave::confirmed`].
pub struct PendingWave {
    tx_hash: TxHash,
    confirmation: BoxFuture<'static, Result<(), ProviderError>>,
}

impl PendingWave {
    pub fn new(
        tx_hash: TxHash,
        confirmation: BoxFuture<'static, Result<(), ProviderError>>,
    ) -> Self {
        Self {
            tx_hash,
            confirmation,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Resolves once the transaction is mined, or fails if it reverted
    /// or the provider dropped it.
    pub async fn confirmed(self) -> Result<(), ProviderError> {
        self.confirmation.await
    }
}

/// Required wallet and contract capabilities, as a minimal
/// transport-agnostic trait.
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Accounts the wallet has already authorized, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Prompts the wallet to authorize an account.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Total number of waves recorded by the contract.
    async fn total_waves(&self) -> Result<u64, ProviderError>;

    /// Full wave history, in event-emission order.
    async fn all_waves(&self) -> Result<Vec<WaveRecord>, ProviderError>;

    /// Submits a wave write. Returns as soon as the transaction is
    /// accepted into the mempool, without awaiting confirmation.
    async fn submit_wave(
        &self,
        message: &str,
        gas_limit: u64,
    ) -> Result<PendingWave, ProviderError>;

    /// Subscribes to the contract's NewWave event stream.
    async fn subscribe_new_waves(&self) -> Result<WaveStream, ProviderError>;
}
