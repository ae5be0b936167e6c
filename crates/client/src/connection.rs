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

//! Connection manager: account discovery and the per-session setup that
//! follows it (initial load, live subscription).

use crate::contract::ContractClient;
use crate::error::PortalError;
use crate::provider::WalletProvider;
use crate::store::ViewStore;
use crate::sync::{EventSync, SyncGuard};
use alloy_primitives::Address;
use common::Notice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub struct ConnectionManager<P> {
    provider: Option<Arc<P>>,
    client: ContractClient<P>,
    store: ViewStore,
    sync: EventSync<P>,
    subscription: Mutex<Option<SyncGuard>>,
    load_started: AtomicBool,
}

impl<P: WalletProvider> ConnectionManager<P> {
    pub fn new(
        provider: Option<Arc<P>>,
        client: ContractClient<P>,
        store: ViewStore,
        sync: EventSync<P>,
    ) -> Self {
        Self {
            provider,
            client,
            store,
            sync,
            subscription: Mutex::new(None),
            load_started: AtomicBool::new(false),
        }
    }

    /// Adopts an already-authorized account if the wallet has one,
    /// without prompting the user. A missing provider or a failed
    /// discovery is reported as "not connected", never as a crash.
    pub async fn check_existing(&self) -> Result<Option<Address>, PortalError> {
        let Some(provider) = self.provider.as_deref() else {
            info!("no wallet provider detected");
            return Ok(None);
        };
        let accounts = match provider.accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!(%err, "account discovery failed");
                return Ok(None);
            }
        };
        match accounts.first() {
            Some(&account) => {
                info!(%account, "found an authorized account");
                self.adopt(account).await;
                Ok(Some(account))
            }
            None => {
                info!("no authorized account found");
                Ok(None)
            }
        }
    }

    /// Prompts the wallet for authorization and adopts the granted
    /// account.
    pub async fn connect(&self) -> Result<Address, PortalError> {
        let Some(provider) = self.provider.as_deref() else {
            self.store.set_notice(Notice::ProviderMissing);
            return Err(PortalError::ProviderAbsent);
        };
        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!(%err, "wallet connection failed");
                self.store.set_notice(Notice::ConnectionRejected);
                return Err(PortalError::AuthorizationRejected);
            }
        };
        let Some(&account) = accounts.first() else {
            self.store.set_notice(Notice::ConnectionRejected);
            return Err(PortalError::AuthorizationRejected);
        };
        info!(%account, "wallet connected");
        self.adopt(account).await;
        Ok(account)
    }

    /// Tears down the session: cancels the live subscription, clears
    /// the account and re-arms the initial load. The last log and count
    /// stay visible.
    pub fn teardown(&self) {
        if let Some(guard) = self
            .subscription
            .lock()
            .expect("subscription lock poisoned")
            .take()
        {
            guard.unsubscribe();
        }
        self.store.clear_account();
        self.load_started.store(false, Ordering::Release);
    }

    /// Records the account and runs the initial load once per session.
    /// Repeated adoption while a load is in flight or done is a no-op.
    async fn adopt(&self, account: Address) {
        self.store.set_account(account);
        if self.load_started.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(err) = self.sync.bulk_load().await {
            warn!(%err, "initial wave history load failed");
            // Re-arm so the next connect trigger retries the load.
            self.load_started.store(false, Ordering::Release);
        }
        match self.client.read_total_waves().await {
            Ok(count) => self.store.set_wave_count(count),
            Err(err) => warn!(%err, "initial wave count read failed"),
        }
        self.install_subscription().await;
    }

    /// Installs the live subscription exactly once per session, after
    /// the bulk load has been initiated.
    async fn install_subscription(&self) {
        if self
            .subscription
            .lock()
            .expect("subscription lock poisoned")
            .is_some()
        {
            return;
        }
        match self.sync.subscribe().await {
            Ok(guard) => {
                let mut slot = self
                    .subscription
                    .lock()
                    .expect("subscription lock poisoned");
                if slot.is_none() {
                    *slot = Some(guard);
                }
                // A guard that lost the race is dropped, which cancels it.
            }
            Err(err) => warn!(%err, "wave subscription failed"),
        }
    }
}
