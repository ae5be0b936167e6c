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

//! Transaction tracker: drives a single wave submission from draft to
//! mined or failed.

use crate::contract::ContractClient;
use crate::error::PortalError;
use crate::provider::WalletProvider;
use crate::store::ViewStore;
use crate::sync::EventSync;
use alloy_primitives::TxHash;
use common::{Notice, TxStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

pub struct TxTracker<P> {
    client: ContractClient<P>,
    store: ViewStore,
    sync: EventSync<P>,
    in_flight: AtomicBool,
}

impl<P: WalletProvider> TxTracker<P> {
    pub fn new(client: ContractClient<P>, store: ViewStore, sync: EventSync<P>) -> Self {
        Self {
            client,
            store,
            sync,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submits the current draft as a wave and drives it to resolution.
    ///
    /// Exactly one transaction is tracked at a time; a call made while
    /// one is outstanding is rejected without touching the contract.
    pub async fn wave(&self) -> Result<TxHash, PortalError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(PortalError::AlreadyPending);
        }
        let result = self.drive().await;
        self.in_flight.store(false, Ordering::Release);
        result
    }

    async fn drive(&self) -> Result<TxHash, PortalError> {
        let draft = self.store.draft();
        if draft.is_empty() {
            self.store.set_notice(Notice::EmptyMessage);
            return Err(PortalError::Validation(
                "message must not be empty".to_string(),
            ));
        }

        let pending = match self.client.submit_wave(&draft).await {
            Ok(pending) => pending,
            Err(err) => return Err(self.fail(err)),
        };
        let tx_hash = pending.tx_hash();
        self.store.begin_tx(tx_hash);
        info!(%tx_hash, "wave submitted, mining");

        if let Err(err) = pending.confirmed().await {
            return Err(self.fail(PortalError::Transaction(err.to_string())));
        }
        info!(%tx_hash, "wave mined");

        // The post-wave count must be in the store before the terminal
        // status becomes visible.
        match self.client.read_total_waves().await {
            Ok(count) => self.store.set_wave_count(count),
            Err(err) => warn!(%err, "wave count refresh failed"),
        }
        self.store.clear_draft();
        if let Err(err) = self.sync.catch_up().await {
            warn!(%err, "post-wave catch-up failed");
        }
        self.store.resolve_tx(TxStatus::Succeeded);
        Ok(tx_hash)
    }

    /// The draft is discarded on failure as well as on success.
    fn fail(&self, err: PortalError) -> PortalError {
        warn!(%err, "wave failed");
        self.store.clear_draft();
        self.store.set_notice(Notice::TransactionFailed);
        self.store.resolve_tx(TxStatus::Failed(err.to_string()));
        err
    }
}
