//! Integration tests for the resolver-driven reset-password page.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use common::{RecordingNavigator, ScriptedProvider};
use workflow360_account_flows::{ResetPasswordFlow, ResetStage, DASHBOARD_ROUTE};
use workflow360_adapter_memory::MemoryProvider;
use workflow360_core::traits::IdentityProvider;
use workflow360_core::types::OtpPurpose;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

async fn drain_timers() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_landing_with_fragment_opens_update_mode() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed_user("user@example.com", "Oldpass1", true).await;
    let navigator = RecordingNavigator::new();

    let flow = ResetPasswordFlow::initialize(
        provider,
        navigator,
        &url("https://app.example.com/auth/reset-password#access_token=at&refresh_token=rt&type=recovery"),
    )
    .await;

    assert_eq!(flow.stage(), ResetStage::Update);
}

#[tokio::test(start_paused = true)]
async fn test_plain_landing_opens_request_mode() {
    let provider = Arc::new(MemoryProvider::new());
    let navigator = RecordingNavigator::new();

    let flow = ResetPasswordFlow::initialize(
        provider,
        navigator,
        &url("https://app.example.com/auth/reset-password"),
    )
    .await;

    assert_eq!(flow.stage(), ResetStage::Request);
}

#[tokio::test(start_paused = true)]
async fn test_request_mode_sends_recovery_code() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed_user("user@example.com", "Oldpass1", true).await;
    let navigator = RecordingNavigator::new();

    let mut flow = ResetPasswordFlow::initialize(
        provider.clone(),
        navigator,
        &url("https://app.example.com/auth/reset-password"),
    )
    .await;
    flow.submit_request("user@example.com").await;

    assert!(flow.notice().unwrap().contains("user@example.com"));
    let deliveries = provider.outbox().await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].purpose, OtpPurpose::Recovery);
}

#[tokio::test(start_paused = true)]
async fn test_update_mode_keeps_session_and_redirects_to_dashboard() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed_user("user@example.com", "Oldpass1", true).await;
    let code = provider.issue_exchange_code("user@example.com").await;
    let navigator = RecordingNavigator::new();

    let mut flow = ResetPasswordFlow::initialize(
        provider.clone(),
        navigator.clone(),
        &url(&format!("https://app.example.com/auth/reset-password?code={code}")),
    )
    .await;
    assert_eq!(flow.stage(), ResetStage::Update);

    flow.submit_new_password("Abcdefg1", "Abcdefg1").await;
    assert_eq!(flow.stage(), ResetStage::Success);
    // in-place update: still signed in
    assert!(provider.current_session().await.unwrap().is_some());

    tokio::time::advance(Duration::from_secs(2)).await;
    drain_timers().await;
    assert_eq!(navigator.routes(), [DASHBOARD_ROUTE]);
}

#[tokio::test(start_paused = true)]
async fn test_update_mode_with_lost_session_fails_locally() {
    let provider = ScriptedProvider::new();
    provider.hold_session(Some(workflow360_core::types::Session::new("at", "rt")));
    let navigator = RecordingNavigator::new();

    let mut flow = ResetPasswordFlow::initialize(
        provider.clone(),
        navigator,
        &url("https://app.example.com/auth/reset-password?type=recovery"),
    )
    .await;
    assert_eq!(flow.stage(), ResetStage::Update);

    provider.hold_session(None);
    flow.submit_new_password("Abcdefg1", "Abcdefg1").await;

    assert_eq!(provider.update_calls.load(Ordering::SeqCst), 0);
    assert_eq!(flow.stage(), ResetStage::Update);
    assert_eq!(flow.error(), Some("Session expired, please restart"));
}
