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

//! Stateless typed facade over the WavePortal contract operations.

use crate::error::PortalError;
use crate::provider::{PendingWave, WalletProvider, WaveStream};
use common::{PortalConfig, Wave};
use std::sync::Arc;

pub struct ContractClient<P> {
    provider: Option<Arc<P>>,
    config: PortalConfig,
}

impl<P> Clone for ContractClient<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P: WalletProvider> ContractClient<P> {
    /// `provider` is `None` when no wallet provider is present; every
    /// operation then fails with [`PortalError::ProviderAbsent`] instead
    /// of crashing.
    pub fn new(provider: Option<Arc<P>>, config: PortalConfig) -> Self {
        Self { provider, config }
    }

    fn provider(&self) -> Result<&P, PortalError> {
        self.provider
            .as_deref()
            .ok_or(PortalError::ProviderAbsent)
    }

    pub async fn read_total_waves(&self) -> Result<u64, PortalError> {
        self.provider()?
            .total_waves()
            .await
            .map_err(|err| PortalError::Read(err.to_string()))
    }

    /// Reads the full history and normalizes each record into a [`Wave`].
    pub async fn read_all_waves(&self) -> Result<Vec<Wave>, PortalError> {
        let records = self
            .provider()?
            .all_waves()
            .await
            .map_err(|err| PortalError::Read(err.to_string()))?;
        Ok(records.into_iter().map(Wave::from).collect())
    }

    /// Submits a wave with the configured gas ceiling. Returns as soon
    /// as the transaction is accepted, without awaiting confirmation.
    pub async fn submit_wave(&self, message: &str) -> Result<PendingWave, PortalError> {
        if message.is_empty() {
            return Err(PortalError::Validation(
                "message must not be empty".to_string(),
            ));
        }
        self.provider()?
            .submit_wave(message, self.config.gas_limit)
            .await
            .map_err(|err| PortalError::Transaction(err.to_string()))
    }

    pub async fn subscribe_new_waves(&self) -> Result<WaveStream, PortalError> {
        self.provider()?
            .subscribe_new_waves()
            .await
            .map_err(|err| PortalError::Read(err.to_string()))
    }
}
