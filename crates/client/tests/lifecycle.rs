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

//! Session lifecycle driven end to end against the deterministic mock
//! provider: connection, wave submission, and event reconciliation.

use alloy_primitives::{Address, address};
use common::{Notice, PortalConfig, TxStatus};
use portal_client::provider::mock::MockProvider;
use portal_client::{Portal, PortalError};
use std::sync::Arc;
use std::time::Duration;

const USER: Address = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
const FRIEND: Address = address!("911c2D38B982D28F920D9C3357776553e13FBd53");
const CONTRACT: Address = address!("7E5F4552091A69125d5DfCb7b8C2659029395Bdf");

fn portal_with(mock: &MockProvider) -> Portal<MockProvider> {
    Portal::new(Some(mock.clone()), PortalConfig::new(CONTRACT))
}

/// Lets the subscription pump drain everything delivered so far.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

async fn wait_for_pending(portal: &Portal<MockProvider>) {
    for _ in 0..100 {
        if portal.snapshot().tx.is_pending() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("transaction never became pending");
}

#[tokio::test]
async fn no_provider_is_reported_not_fatal() {
    let portal: Portal<MockProvider> = Portal::new(None, PortalConfig::new(CONTRACT));

    assert_eq!(portal.check_existing_connection().await.unwrap(), None);

    let err = portal.connect_wallet().await.unwrap_err();
    assert!(matches!(err, PortalError::ProviderAbsent));
    assert_eq!(portal.snapshot().account, None);
    assert_eq!(portal.take_notice(), Some(Notice::ProviderMissing));
}

#[tokio::test]
async fn existing_authorization_is_adopted_without_prompting() {
    let mock = MockProvider::with_authorized(USER);
    mock.seed_wave(FRIEND, "hi");
    mock.seed_wave(USER, "yo");
    let portal = portal_with(&mock);

    let account = portal.check_existing_connection().await.unwrap();

    assert_eq!(account, Some(USER));
    assert_eq!(mock.prompt_calls(), 0);
    let snapshot = portal.snapshot();
    assert_eq!(snapshot.account, Some(USER));
    assert_eq!(snapshot.wave_count, 2);
    assert_eq!(snapshot.waves.len(), 2);
    assert_eq!(snapshot.waves[0].message, "hi");
    assert_eq!(snapshot.waves[1].message, "yo");
}

#[tokio::test]
async fn rejected_prompt_leaves_the_session_disconnected() {
    let mock = MockProvider::with_authorized(USER);
    mock.set_reject_prompt(true);
    let portal = portal_with(&mock);

    let err = portal.connect_wallet().await.unwrap_err();

    assert!(matches!(err, PortalError::AuthorizationRejected));
    assert_eq!(portal.snapshot().account, None);
    assert_eq!(portal.take_notice(), Some(Notice::ConnectionRejected));
}

#[tokio::test]
async fn successful_wave_updates_count_log_and_draft() {
    let mock = MockProvider::with_authorized(USER);
    let portal = portal_with(&mock);
    portal.connect_wallet().await.unwrap();
    let before = portal.snapshot().wave_count;

    portal.set_draft("hello");
    portal.wave().await.unwrap();

    let snapshot = portal.snapshot();
    assert_eq!(snapshot.draft, "");
    assert_eq!(snapshot.wave_count, before + 1);
    assert!(
        snapshot
            .waves
            .iter()
            .any(|w| w.address == USER && w.message == "hello")
    );
    assert_eq!(snapshot.tx, TxStatus::Idle);
    assert_eq!(snapshot.last_tx, Some(TxStatus::Succeeded));
}

#[tokio::test]
async fn failed_mining_resolves_to_idle_with_a_notice() {
    let mock = MockProvider::with_authorized(USER);
    mock.seed_wave(FRIEND, "before");
    let portal = portal_with(&mock);
    portal.connect_wallet().await.unwrap();
    mock.set_fail_mining(true);

    portal.set_draft("doomed");
    let err = portal.wave().await.unwrap_err();

    assert!(matches!(err, PortalError::Transaction(_)));
    let snapshot = portal.snapshot();
    assert_eq!(snapshot.draft, "");
    assert_eq!(snapshot.wave_count, 1);
    assert_eq!(snapshot.waves.len(), 1);
    assert_eq!(snapshot.tx, TxStatus::Idle);
    assert!(matches!(snapshot.last_tx, Some(TxStatus::Failed(_))));
    assert_eq!(portal.take_notice(), Some(Notice::TransactionFailed));
    assert_eq!(mock.submit_calls(), 1);
}

#[tokio::test]
async fn empty_draft_never_reaches_the_contract() {
    let mock = MockProvider::with_authorized(USER);
    let portal = portal_with(&mock);
    portal.connect_wallet().await.unwrap();

    let err = portal.wave().await.unwrap_err();

    assert!(matches!(err, PortalError::Validation(_)));
    assert_eq!(mock.submit_calls(), 0);
    let snapshot = portal.snapshot();
    assert_eq!(snapshot.tx, TxStatus::Idle);
    assert_eq!(snapshot.last_tx, None);
    assert_eq!(portal.take_notice(), Some(Notice::EmptyMessage));
}

#[tokio::test]
async fn second_wave_is_rejected_while_one_is_pending() {
    let mock = MockProvider::with_authorized(USER);
    let portal = Arc::new(portal_with(&mock));
    portal.connect_wallet().await.unwrap();
    mock.hold_confirmations(true);

    portal.set_draft("first");
    let background = {
        let portal = Arc::clone(&portal);
        tokio::spawn(async move { portal.wave().await })
    };
    wait_for_pending(&portal).await;

    let err = portal.wave().await.unwrap_err();
    assert!(matches!(err, PortalError::AlreadyPending));
    assert_eq!(mock.submit_calls(), 1);

    mock.release_confirmations();
    background.await.unwrap().unwrap();
    let snapshot = portal.snapshot();
    assert_eq!(snapshot.wave_count, 1);
    assert_eq!(snapshot.last_tx, Some(TxStatus::Succeeded));
}

#[tokio::test]
async fn live_events_merge_while_a_wave_is_mining() {
    let mock = MockProvider::with_authorized(USER);
    let portal = Arc::new(portal_with(&mock));
    portal.connect_wallet().await.unwrap();
    mock.hold_confirmations(true);

    portal.set_draft("mine");
    let background = {
        let portal = Arc::clone(&portal);
        tokio::spawn(async move { portal.wave().await })
    };
    wait_for_pending(&portal).await;

    mock.emit_external_wave(FRIEND, "theirs");
    settle().await;
    assert_eq!(portal.snapshot().waves.len(), 1);

    mock.release_confirmations();
    background.await.unwrap().unwrap();
    let snapshot = portal.snapshot();
    assert_eq!(snapshot.waves.len(), 2);
    assert_eq!(snapshot.wave_count, 2);
}

#[tokio::test]
async fn redelivered_event_does_not_grow_the_log() {
    let mock = MockProvider::with_authorized(USER);
    let seeded = mock.seed_wave(FRIEND, "gm");
    let portal = portal_with(&mock);
    portal.connect_wallet().await.unwrap();
    assert_eq!(portal.snapshot().waves.len(), 1);

    mock.redeliver(seeded);
    settle().await;

    let snapshot = portal.snapshot();
    assert_eq!(snapshot.waves.len(), 1);
    assert_eq!(snapshot.wave_count, 1);
}

#[tokio::test]
async fn live_event_appends_and_refreshes_the_count() {
    let mock = MockProvider::with_authorized(USER);
    let portal = portal_with(&mock);
    portal.connect_wallet().await.unwrap();

    mock.emit_external_wave(FRIEND, "sup");
    settle().await;

    let snapshot = portal.snapshot();
    assert_eq!(snapshot.waves.len(), 1);
    assert_eq!(snapshot.waves[0].address, FRIEND);
    assert_eq!(snapshot.wave_count, 1);
}

#[tokio::test]
async fn repeated_connects_install_one_subscription() {
    let mock = MockProvider::with_authorized(USER);
    let portal = portal_with(&mock);

    portal.connect_wallet().await.unwrap();
    portal.connect_wallet().await.unwrap();
    portal.check_existing_connection().await.unwrap();

    assert_eq!(mock.subscriber_count(), 1);
}

#[tokio::test]
async fn teardown_cancels_the_subscription() {
    let mock = MockProvider::with_authorized(USER);
    let portal = portal_with(&mock);
    portal.connect_wallet().await.unwrap();

    portal.teardown();
    settle().await;
    assert_eq!(portal.snapshot().account, None);

    mock.emit_external_wave(FRIEND, "after teardown");
    settle().await;
    assert_eq!(portal.snapshot().waves.len(), 0);
    assert_eq!(mock.subscriber_count(), 0);
}

#[tokio::test]
async fn failed_bulk_load_keeps_the_session_and_retries_on_reconnect() {
    let mock = MockProvider::with_authorized(USER);
    mock.seed_wave(FRIEND, "history");
    mock.set_fail_reads(true);
    let portal = portal_with(&mock);

    portal.connect_wallet().await.unwrap();
    let snapshot = portal.snapshot();
    assert_eq!(snapshot.account, Some(USER));
    assert_eq!(snapshot.waves.len(), 0);

    mock.set_fail_reads(false);
    portal.connect_wallet().await.unwrap();
    let snapshot = portal.snapshot();
    assert_eq!(snapshot.waves.len(), 1);
    assert_eq!(snapshot.wave_count, 1);
    assert_eq!(mock.subscriber_count(), 1);
}
