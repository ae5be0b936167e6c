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

//! Single source of truth for everything the rendering layer shows.
//!
//! All mutations are small atomic operations behind one lock, never
//! held across an await point, so the transaction path and the event
//! subscription can interleave freely.

use alloy_primitives::{Address, TxHash};
use common::{Notice, TxStatus, Wave, WaveLog};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ViewState {
    account: Option<Address>,
    wave_count: u64,
    waves: WaveLog,
    draft: String,
    tx: TxStatus,
    last_tx: Option<TxStatus>,
    notice: Option<Notice>,
}

/// Point-in-time copy of the view state, handed to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub account: Option<Address>,
    pub wave_count: u64,
    pub waves: Vec<Wave>,
    pub draft: String,
    pub tx: TxStatus,
    /// Terminal status of the most recently resolved transaction, kept
    /// after the active slot resets to idle.
    pub last_tx: Option<TxStatus>,
    pub notice: Option<Notice>,
}

/// Shared, cheaply clonable view state store.
#[derive(Clone, Default)]
pub struct ViewStore {
    state: Arc<Mutex<ViewState>>,
}

impl ViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().expect("view state lock poisoned")
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.lock();
        ViewSnapshot {
            account: state.account,
            wave_count: state.wave_count,
            waves: state.waves.entries().to_vec(),
            draft: state.draft.clone(),
            tx: state.tx.clone(),
            last_tx: state.last_tx.clone(),
            notice: state.notice.clone(),
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.lock().account
    }

    pub fn set_account(&self, account: Address) {
        self.lock().account = Some(account);
    }

    pub fn clear_account(&self) {
        self.lock().account = None;
    }

    pub fn set_wave_count(&self, count: u64) {
        self.lock().wave_count = count;
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        self.lock().draft = draft.into();
    }

    pub fn clear_draft(&self) {
        self.lock().draft.clear();
    }

    /// Wholesale replace of the wave log.
    pub fn replace_waves(&self, waves: Vec<Wave>) {
        self.lock().waves.replace(waves);
    }

    /// Appends a wave unless the identical triple is already present.
    /// The duplicate check and the append happen under one lock.
    pub fn append_wave(&self, wave: Wave) -> bool {
        self.lock().waves.push_unique(wave)
    }

    pub fn tx_status(&self) -> TxStatus {
        self.lock().tx.clone()
    }

    /// Records a freshly submitted transaction, starting a new cycle.
    pub fn begin_tx(&self, tx_hash: TxHash) {
        let mut state = self.lock();
        state.tx = TxStatus::Pending(tx_hash);
        state.last_tx = None;
    }

    /// Records the terminal status of the tracked transaction and
    /// resets the active slot to idle for the next attempt.
    pub fn resolve_tx(&self, terminal: TxStatus) {
        let mut state = self.lock();
        state.last_tx = Some(terminal);
        state.tx = TxStatus::Idle;
    }

    pub fn set_notice(&self, notice: Notice) {
        self.lock().notice = Some(notice);
    }

    /// Hands the pending notice to the renderer, clearing it.
    pub fn take_notice(&self) -> Option<Notice> {
        self.lock().notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, address};

    #[test]
    fn resolve_resets_active_slot_and_keeps_outcome() {
        let store = ViewStore::new();
        store.begin_tx(B256::ZERO);
        assert!(store.tx_status().is_pending());
        store.resolve_tx(TxStatus::Succeeded);
        assert!(store.tx_status().is_idle());
        assert_eq!(store.snapshot().last_tx, Some(TxStatus::Succeeded));
    }

    #[test]
    fn new_cycle_clears_previous_outcome() {
        let store = ViewStore::new();
        store.resolve_tx(TxStatus::Failed("nope".to_string()));
        store.begin_tx(B256::ZERO);
        assert_eq!(store.snapshot().last_tx, None);
    }

    #[test]
    fn notice_is_taken_once() {
        let store = ViewStore::new();
        store.set_notice(Notice::EmptyMessage);
        assert_eq!(store.take_notice(), Some(Notice::EmptyMessage));
        assert_eq!(store.take_notice(), None);
    }

    #[test]
    fn account_set_and_clear() {
        let store = ViewStore::new();
        let account = address!("911c2D38B982D28F920D9C3357776553e13FBd53");
        store.set_account(account);
        assert_eq!(store.account(), Some(account));
        store.clear_account();
        assert_eq!(store.account(), None);
    }
}
