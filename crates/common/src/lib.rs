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

use alloy_primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Gas ceiling applied to every `wave` submission.
pub const WAVE_GAS_LIMIT: u64 = 300_000;

/// Immutable configuration for a deployed WavePortal contract.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub contract_address: Address,
    pub gas_limit: u64,
}

impl PortalConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            gas_limit: WAVE_GAS_LIMIT,
        }
    }
}

/// Raw wave record as the contract returns it: address, seconds since
/// epoch, message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRecord {
    pub waver: Address,
    pub timestamp: u64,
    pub message: String,
}

/// A single observed wave, normalized for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wave {
    pub address: Address,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl From<WaveRecord> for Wave {
    fn from(rec: WaveRecord) -> Self {
        let secs = i64::try_from(rec.timestamp).unwrap_or(i64::MAX);
        // On-chain timestamps outside chrono's range clamp to the maximum
        // representable instant rather than failing the whole load.
        let timestamp = DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            address: rec.waver,
            timestamp,
            message: rec.message,
        }
    }
}

/// Append-only log of waves in observed order.
///
/// An identical (address, timestamp, message) triple is recorded once no
/// matter how many channels deliver it; the set index makes the
/// check-and-append a single operation on the log.
#[derive(Debug, Clone, Default)]
pub struct WaveLog {
    entries: Vec<Wave>,
    seen: HashSet<Wave>,
}

impl WaveLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a wave unless the identical triple was already observed.
    /// Returns whether the wave was appended.
    pub fn push_unique(&mut self, wave: Wave) -> bool {
        if !self.seen.insert(wave.clone()) {
            return false;
        }
        self.entries.push(wave);
        true
    }

    /// Replaces the log wholesale with the given history.
    pub fn replace<I: IntoIterator<Item = Wave>>(&mut self, waves: I) {
        self.entries.clear();
        self.seen.clear();
        for wave in waves {
            self.push_unique(wave);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Wave] {
        &self.entries
    }
}

/// Lifecycle of the single tracked in-flight transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    #[default]
    Idle,
    Pending(TxHash),
    Succeeded,
    Failed(String),
}

impl TxStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, TxStatus::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TxStatus::Pending(_))
    }
}

/// User-facing conditions surfaced by the core; how they are presented
/// is up to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    ProviderMissing,
    ConnectionRejected,
    EmptyMessage,
    TransactionFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Notice::ProviderMissing => "no wallet provider detected, install one to connect",
            Notice::ConnectionRejected => "wallet connection was declined",
            Notice::EmptyMessage => "leave a short message before waving",
            Notice::TransactionFailed => "something went wrong sending your wave, try again",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn record(ts: u64, message: &str) -> WaveRecord {
        WaveRecord {
            waver: address!("911c2D38B982D28F920D9C3357776553e13FBd53"),
            timestamp: ts,
            message: message.to_string(),
        }
    }

    #[test]
    fn normalizes_seconds_to_instant() {
        let wave = Wave::from(record(1_700_000_000, "gm"));
        assert_eq!(wave.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(wave.message, "gm");
    }

    #[test]
    fn unrepresentable_timestamp_clamps() {
        let wave = Wave::from(record(u64::MAX, "late"));
        assert_eq!(wave.timestamp, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn log_suppresses_duplicate_triples() {
        let mut log = WaveLog::new();
        assert!(log.push_unique(Wave::from(record(1, "hello"))));
        assert!(!log.push_unique(Wave::from(record(1, "hello"))));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn log_keeps_distinct_waves_in_observed_order() {
        let mut log = WaveLog::new();
        log.push_unique(Wave::from(record(2, "second")));
        log.push_unique(Wave::from(record(1, "first")));
        log.push_unique(Wave::from(record(2, "also second")));
        let messages: Vec<_> = log.entries().iter().map(|w| w.message.as_str()).collect();
        assert_eq!(messages, ["second", "first", "also second"]);
    }

    #[test]
    fn replace_resets_the_duplicate_index() {
        let mut log = WaveLog::new();
        log.push_unique(Wave::from(record(1, "old")));
        log.replace(vec![Wave::from(record(5, "new"))]);
        assert_eq!(log.len(), 1);
        assert!(log.push_unique(Wave::from(record(1, "old"))));
    }
}
