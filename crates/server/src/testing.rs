//! Shared fixtures for handler tests.

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;

use kindness_core::config::AppConfig;
use kindness_core::InstallRecord;
use kindness_db::{connect_with_settings, migrations, DbPool, SqlInstallStore};

use crate::routes::AppState;

pub async fn memory_pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    pool
}

pub fn test_config(api_base: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.slack.signing_secret = "test-signing-secret".to_string().into();
    config.slack.api_base_url = api_base.to_string();
    config
}

pub fn app_state(pool: DbPool, config: AppConfig) -> AppState {
    AppState::new(config, Arc::new(SqlInstallStore::new(pool)))
}

/// Headers carrying a fresh, valid v0 signature for `body`.
pub fn signed_headers(state: &AppState, body: &str) -> HeaderMap {
    let timestamp = Utc::now().timestamp().to_string();
    let signature = state.verifier.expected_signature(&timestamp, body);

    let mut headers = HeaderMap::new();
    headers.insert("x-slack-request-timestamp", timestamp.parse().expect("timestamp header"));
    headers.insert("x-slack-signature", signature.parse().expect("signature header"));
    headers
}

pub fn command_body(team_id: &str, channel_id: &str, trigger_id: &str) -> String {
    serde_urlencoded::to_string([
        ("team_id", team_id),
        ("channel_id", channel_id),
        ("trigger_id", trigger_id),
    ])
    .expect("command body")
}

/// A workspace with a configured channel, as left behind by the install
/// flow plus one config save.
pub fn installed_record() -> InstallRecord {
    let mut record = InstallRecord::fresh(
        "T777",
        "Acme",
        "xoxb-recorded".to_string().into(),
        Some("B123".to_string()),
        1_700_000_000_000,
    );
    record.channel_id = Some("C42".to_string());
    record
}
