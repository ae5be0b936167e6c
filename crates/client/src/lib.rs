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

//! Client core for the WavePortal contract: connect a wallet, submit
//! waves, and keep a duplicate-free local log of every wave the
//! contract has recorded. Rendering is left to whoever consumes
//! [`ViewSnapshot`] values from the portal.

pub mod connection;
pub mod contract;
pub mod error;
pub mod provider;
pub mod store;
pub mod sync;
pub mod tracker;

pub use error::PortalError;
pub use store::ViewSnapshot;

use alloy_primitives::{Address, TxHash};
use common::{Notice, PortalConfig};
use connection::ConnectionManager;
use contract::ContractClient;
use provider::WalletProvider;
use std::sync::Arc;
use store::ViewStore;
use sync::EventSync;
use tracker::TxTracker;

/// One portal session: the components wired together behind the
/// surface the rendering layer calls into.
pub struct Portal<P> {
    connection: ConnectionManager<P>,
    tracker: TxTracker<P>,
    store: ViewStore,
}

impl<P: WalletProvider> Portal<P> {
    /// Builds a session against the given provider, or a degraded one
    /// when `provider` is `None` (connect and write actions report the
    /// provider as absent instead of crashing).
    pub fn new(provider: Option<P>, config: PortalConfig) -> Self {
        let provider = provider.map(Arc::new);
        let store = ViewStore::new();
        let client = ContractClient::new(provider.clone(), config);
        let sync = EventSync::new(client.clone(), store.clone());
        let connection =
            ConnectionManager::new(provider, client.clone(), store.clone(), sync.clone());
        let tracker = TxTracker::new(client, store.clone(), sync);
        Self {
            connection,
            tracker,
            store,
        }
    }

    /// Adopts an already-authorized account without prompting, if the
    /// wallet has one.
    pub async fn check_existing_connection(&self) -> Result<Option<Address>, PortalError> {
        self.connection.check_existing().await
    }

    /// Prompts the wallet for authorization.
    pub async fn connect_wallet(&self) -> Result<Address, PortalError> {
        self.connection.connect().await
    }

    /// Submits the current draft as a wave and drives it to resolution.
    pub async fn wave(&self) -> Result<TxHash, PortalError> {
        self.tracker.wave().await
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        self.store.set_draft(draft);
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.store.snapshot()
    }

    pub fn take_notice(&self) -> Option<Notice> {
        self.store.take_notice()
    }

    /// Ends the session: cancels the live subscription and clears the
    /// account.
    pub fn teardown(&self) {
        self.connection.teardown();
    }
}
