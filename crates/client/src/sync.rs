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

//! Event synchronizer: reconciles the bulk history read with the live
//! NewWave subscription into one duplicate-free log.

use crate::contract::ContractClient;
use crate::error::PortalError;
use crate::provider::WalletProvider;
use crate::store::ViewStore;
use common::Wave;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct EventSync<P> {
    client: ContractClient<P>,
    store: ViewStore,
}

impl<P> Clone for EventSync<P> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: self.store.clone(),
        }
    }
}

impl<P: WalletProvider> EventSync<P> {
    pub fn new(client: ContractClient<P>, store: ViewStore) -> Self {
        Self { client, store }
    }

    /// Replaces the local log wholesale with the on-chain history, the
    /// authoritative baseline. On failure the previous log is kept.
    pub async fn bulk_load(&self) -> Result<(), PortalError> {
        let waves = self.client.read_all_waves().await?;
        debug!(count = waves.len(), "loaded wave history");
        self.store.replace_waves(waves);
        Ok(())
    }

    /// Merges the on-chain history into the local log, so a just-mined
    /// wave shows up even if the subscription has not delivered it yet.
    /// Entries that arrived over the subscription are kept.
    pub async fn catch_up(&self) -> Result<(), PortalError> {
        let waves = self.client.read_all_waves().await?;
        for wave in waves {
            self.store.append_wave(wave);
        }
        Ok(())
    }

    /// Installs the live NewWave subscription. Each delivered event is
    /// appended (duplicates suppressed) and the wave count refreshed.
    ///
    /// The returned guard cancels the subscription when dropped, so a
    /// torn-down session cannot keep appending to the log.
    pub async fn subscribe(&self) -> Result<SyncGuard, PortalError> {
        let mut stream = self.client.subscribe_new_waves().await?;
        let client = self.client.clone();
        let store = self.store.clone();
        let task = tokio::spawn(async move {
            while let Some(record) = stream.next().await {
                let wave = Wave::from(record);
                if store.append_wave(wave.clone()) {
                    debug!(address = %wave.address, "observed new wave");
                } else {
                    debug!(address = %wave.address, "suppressed duplicate wave");
                }
                match client.read_total_waves().await {
                    Ok(count) => store.set_wave_count(count),
                    Err(err) => warn!(%err, "wave count refresh failed"),
                }
            }
            debug!("wave event stream ended");
        });
        Ok(SyncGuard { task })
    }
}

/// Cancellable handle to the live subscription.
pub struct SyncGuard {
    task: JoinHandle<()>,
}

impl SyncGuard {
    pub fn unsubscribe(self) {
        // Dropping aborts the pump task.
    }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
