//! Slack-facing HTTP routes and the shared application state.
//!
//! Endpoints:
//! - `POST /slack/interact`          — interactivity payloads (modal submissions)
//! - `POST /slack/commands/kindness` — `/kindness` opens the submission modal
//! - `POST /slack/commands/config`   — `/kindness-config` opens the config modal
//! - `POST /slack/commands/reset`    — `/kindness-reset` opens the reset modal
//! - `GET  /oauth/redirect`          — OAuth install callback
//!
//! Every Slack POST carries a v0 signature over the raw body, so the
//! handlers take the body as a raw string and verify it before any form
//! parsing.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use kindness_core::{AppConfig, SignatureVerifier};
use kindness_db::InstallStore;
use kindness_slack::{FallbackConfig, InteractionRouter, SlackClient, SlackGateway};

use crate::{commands, interact, oauth};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<SignatureVerifier>,
    pub store: Arc<dyn InstallStore>,
    pub slack: Arc<SlackClient>,
    pub router: Arc<InteractionRouter>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn InstallStore>) -> Self {
        let verifier = Arc::new(SignatureVerifier::new(config.slack.signing_secret.clone()));
        let slack = Arc::new(SlackClient::new(&config.slack.api_base_url));
        let gateway: Arc<dyn SlackGateway> = slack.clone();
        let fallback = FallbackConfig {
            default_bot_token: non_empty_secret(&config.slack.default_bot_token),
            default_channel: non_empty(&config.slack.default_channel),
        };
        let router = Arc::new(InteractionRouter::new(store.clone(), gateway, fallback));

        Self { config: Arc::new(config), verifier, store, slack, router }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/slack/interact", post(interact::handle))
        .route("/slack/commands/kindness", post(commands::kindness))
        .route("/slack/commands/config", post(commands::config))
        .route("/slack/commands/reset", post(commands::reset))
        .route("/oauth/redirect", get(oauth::redirect))
        .with_state(state)
}

/// Checks the `v0` signature headers against the raw body. A rejected
/// request answers 401 before the body is parsed.
pub fn verify_signature(
    state: &AppState,
    headers: &HeaderMap,
    body: &str,
) -> Result<(), (StatusCode, &'static str)> {
    let timestamp = header_str(headers, "x-slack-request-timestamp");
    let signature = header_str(headers, "x-slack-signature");

    state.verifier.verify(timestamp, signature, body).map_err(|error| {
        warn!(error = %error, "rejected a request with an invalid slack signature");
        (StatusCode::UNAUTHORIZED, "Invalid signature")
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_empty_secret(value: &SecretString) -> Option<SecretString> {
    (!value.expose_secret().trim().is_empty()).then(|| value.clone())
}
