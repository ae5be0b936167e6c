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

//! Deterministic in-memory wallet provider for tests and offline smoke
//! paths.

use super::{PendingWave, ProviderError, WalletProvider, WaveStream};
use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use common::WaveRecord;
use futures::{FutureExt, StreamExt};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// In-memory provider with a deterministic clock and transaction ids.
///
/// Failure modes (prompt rejection, read failures, mining failures) and
/// confirmation timing are controlled by the test through the setters.
#[derive(Clone, Default)]
pub struct MockProvider {
    inner: Arc<Inner>,
}

struct Inner {
    authorized: Mutex<Vec<Address>>,
    reject_prompt: Mutex<bool>,
    fail_reads: Mutex<bool>,
    fail_mining: Mutex<bool>,
    hold_confirmations: Mutex<bool>,
    held: Mutex<Vec<oneshot::Sender<()>>>,
    history: Mutex<Vec<WaveRecord>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<WaveRecord>>>,
    time_secs: Mutex<u64>,
    tx_counter: Mutex<u64>,
    prompt_calls: Mutex<u64>,
    submit_calls: Mutex<u64>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            authorized: Mutex::new(Vec::new()),
            reject_prompt: Mutex::new(false),
            fail_reads: Mutex::new(false),
            fail_mining: Mutex::new(false),
            hold_confirmations: Mutex::new(false),
            held: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            time_secs: Mutex::new(1_700_000_000), // deterministic default
            tx_counter: Mutex::new(0),
            prompt_calls: Mutex::new(0),
            submit_calls: Mutex::new(0),
        }
    }
}

impl Inner {
    fn next_timestamp(&self) -> u64 {
        let mut t = self.time_secs.lock().expect("mutex poisoned");
        *t = t.saturating_add(10);
        *t
    }

    fn next_tx_hash(&self) -> TxHash {
        let mut n = self.tx_counter.lock().expect("mutex poisoned");
        *n = n.saturating_add(1);
        TxHash::from(U256::from(*n))
    }

    fn append_and_broadcast(&self, record: WaveRecord) {
        self.history
            .lock()
            .expect("mutex poisoned")
            .push(record.clone());
        self.subscribers
            .lock()
            .expect("mutex poisoned")
            .retain(|tx| tx.send(record.clone()).is_ok());
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_authorized(account: Address) -> Self {
        let mock = Self::default();
        mock.authorize(account);
        mock
    }

    pub fn authorize(&self, account: Address) {
        self.inner
            .authorized
            .lock()
            .expect("mutex poisoned")
            .push(account);
    }

    pub fn set_reject_prompt(&self, reject: bool) {
        *self.inner.reject_prompt.lock().expect("mutex poisoned") = reject;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.inner.fail_reads.lock().expect("mutex poisoned") = fail;
    }

    pub fn set_fail_mining(&self, fail: bool) {
        *self.inner.fail_mining.lock().expect("mutex poisoned") = fail;
    }

    /// When set, submitted waves stay pending until
    /// [`MockProvider::release_confirmations`] is called.
    pub fn hold_confirmations(&self, hold: bool) {
        *self.inner.hold_confirmations.lock().expect("mutex poisoned") = hold;
    }

    pub fn release_confirmations(&self) {
        let held: Vec<_> = self
            .inner
            .held
            .lock()
            .expect("mutex poisoned")
            .drain(..)
            .collect();
        for gate in held {
            let _ = gate.send(());
        }
    }

    /// Appends a wave to the chain history without emitting an event,
    /// as if it was mined before this session subscribed.
    pub fn seed_wave(&self, waver: Address, message: &str) -> WaveRecord {
        let record = WaveRecord {
            waver,
            timestamp: self.inner.next_timestamp(),
            message: message.to_string(),
        };
        self.inner
            .history
            .lock()
            .expect("mutex poisoned")
            .push(record.clone());
        record
    }

    /// Mines a wave from another participant: appends it to the history
    /// and delivers it to every live subscriber.
    pub fn emit_external_wave(&self, waver: Address, message: &str) -> WaveRecord {
        let record = WaveRecord {
            waver,
            timestamp: self.inner.next_timestamp(),
            message: message.to_string(),
        };
        self.inner.append_and_broadcast(record.clone());
        record
    }

    /// Re-delivers an already-known record to every live subscriber,
    /// as chains do when a query and a subscription overlap.
    pub fn redeliver(&self, record: WaveRecord) {
        self.inner
            .subscribers
            .lock()
            .expect("mutex poisoned")
            .retain(|tx| tx.send(record.clone()).is_ok());
    }

    pub fn prompt_calls(&self) -> u64 {
        *self.inner.prompt_calls.lock().expect("mutex poisoned")
    }

    /// Number of subscription channels handed out and not yet dropped.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .expect("mutex poisoned")
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    pub fn submit_calls(&self) -> u64 {
        *self.inner.submit_calls.lock().expect("mutex poisoned")
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(self.inner.authorized.lock().expect("mutex poisoned").clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let mut prompts = self.inner.prompt_calls.lock().expect("mutex poisoned");
        *prompts = prompts.saturating_add(1);
        drop(prompts);

        if *self.inner.reject_prompt.lock().expect("mutex poisoned") {
            return Err(ProviderError::Rejected);
        }
        Ok(self.inner.authorized.lock().expect("mutex poisoned").clone())
    }

    async fn total_waves(&self) -> Result<u64, ProviderError> {
        if *self.inner.fail_reads.lock().expect("mutex poisoned") {
            return Err(ProviderError::Network("simulated read failure".to_string()));
        }
        Ok(self.inner.history.lock().expect("mutex poisoned").len() as u64)
    }

    async fn all_waves(&self) -> Result<Vec<WaveRecord>, ProviderError> {
        if *self.inner.fail_reads.lock().expect("mutex poisoned") {
            return Err(ProviderError::Network("simulated read failure".to_string()));
        }
        Ok(self.inner.history.lock().expect("mutex poisoned").clone())
    }

    async fn submit_wave(
        &self,
        message: &str,
        _gas_limit: u64,
    ) -> Result<PendingWave, ProviderError> {
        let mut submits = self.inner.submit_calls.lock().expect("mutex poisoned");
        *submits = submits.saturating_add(1);
        drop(submits);

        let waver = self
            .inner
            .authorized
            .lock()
            .expect("mutex poisoned")
            .first()
            .copied()
            .ok_or_else(|| ProviderError::Network("no authorized account".to_string()))?;

        let tx_hash = self.inner.next_tx_hash();
        let record = WaveRecord {
            waver,
            timestamp: self.inner.next_timestamp(),
            message: message.to_string(),
        };

        let gate = if *self.inner.hold_confirmations.lock().expect("mutex poisoned") {
            let (tx, rx) = oneshot::channel();
            self.inner.held.lock().expect("mutex poisoned").push(tx);
            Some(rx)
        } else {
            None
        };
        let fail = *self.inner.fail_mining.lock().expect("mutex poisoned");
        let inner = Arc::clone(&self.inner);

        let confirmation = async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if fail {
                return Err(ProviderError::Reverted(tx_hash.to_string()));
            }
            inner.append_and_broadcast(record);
            Ok(())
        }
        .boxed();

        Ok(PendingWave::new(tx_hash, confirmation))
    }

    async fn subscribe_new_waves(&self) -> Result<WaveStream, ProviderError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .lock()
            .expect("mutex poisoned")
            .push(tx);
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|record| (record, rx))
        })
        .boxed();
        Ok(stream)
    }
}
