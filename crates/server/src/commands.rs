//! Slash command endpoints.
//!
//! Each command answers inside Slack's three-second window by opening a
//! modal against the `trigger_id`. The response body is echoed back to
//! the invoking user, so a non-empty body here is a user-facing message
//! and an empty 200 is a silent acknowledgement.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{error, warn};

use kindness_core::InstallRecord;
use kindness_db::InstallStore;
use kindness_slack::resolver::is_canonical_channel_id;
use kindness_slack::{views, SlackGateway};

use crate::routes::{verify_signature, AppState};

#[derive(Debug, Default, Deserialize)]
struct SlashCommand {
    #[serde(default)]
    team_id: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    trigger_id: String,
}

/// `/kindness` opens the act submission modal. There is no channel
/// precondition and failures stay silent: a non-empty response would be
/// echoed into the channel the user typed in.
pub async fn kindness(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, String), (StatusCode, &'static str)> {
    verify_signature(&state, &headers, &body)?;
    let command = parse_command(&body);

    let record = fetch_record(&state, &command.team_id).await;
    let Some(token) = bot_token(&state, record.as_ref()) else {
        warn!(team_id = %command.team_id, "no bot token available; skipping the submission modal");
        return Ok((StatusCode::OK, String::new()));
    };

    let view = views::submission_modal(&command.team_id, &command.channel_id);
    if let Err(error) = state.slack.open_view(&token, &command.trigger_id, &view).await {
        error!(error = %error, team_id = %command.team_id, "views.open failed for the submission modal");
    }

    Ok((StatusCode::OK, String::new()))
}

/// `/kindness-config` opens the season configuration modal, prefilled
/// from the stored record. Must be run inside the channel the season
/// should post to; that channel id rides along in the view metadata.
pub async fn config(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, String), (StatusCode, &'static str)> {
    verify_signature(&state, &headers, &body)?;
    let command = parse_command(&body);

    if !is_canonical_channel_id(&command.channel_id) {
        return Ok((
            StatusCode::OK,
            "Please run /kindness-config inside the channel you want to use.".to_string(),
        ));
    }

    let record = fetch_record(&state, &command.team_id).await;
    let Some(token) = bot_token(&state, record.as_ref()) else {
        error!(team_id = %command.team_id, "no bot token available; cannot open the config modal");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Error opening config modal"));
    };

    let view = views::config_modal(record.as_ref(), &command.team_id, &command.channel_id);
    if let Err(error) = state.slack.open_view(&token, &command.trigger_id, &view).await {
        error!(error = %error, team_id = %command.team_id, "views.open failed for the config modal");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Error opening config modal"));
    }

    Ok((StatusCode::OK, String::new()))
}

/// `/kindness-reset` opens the season reset modal, prefilled from the
/// stored record. Dates and goal only; the channel is not part of a reset.
pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, String), (StatusCode, &'static str)> {
    verify_signature(&state, &headers, &body)?;
    let command = parse_command(&body);

    if !is_canonical_channel_id(&command.channel_id) {
        return Ok((
            StatusCode::OK,
            "Please run /kindness-reset in the target channel.".to_string(),
        ));
    }

    let record = fetch_record(&state, &command.team_id).await;
    let Some(token) = bot_token(&state, record.as_ref()) else {
        error!(team_id = %command.team_id, "no bot token available; cannot open the reset modal");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Error opening reset modal"));
    };

    let view = views::reset_modal(record.as_ref(), &command.team_id);
    if let Err(error) = state.slack.open_view(&token, &command.trigger_id, &view).await {
        error!(error = %error, team_id = %command.team_id, "views.open failed for the reset modal");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Error opening reset modal"));
    }

    Ok((StatusCode::OK, String::new()))
}

fn parse_command(body: &str) -> SlashCommand {
    serde_urlencoded::from_str(body).unwrap_or_default()
}

async fn fetch_record(state: &AppState, team_id: &str) -> Option<InstallRecord> {
    match state.store.fetch(team_id).await {
        Ok(record) => record,
        Err(error) => {
            error!(error = %error, team_id = %team_id, "install lookup failed during a slash command");
            None
        }
    }
}

fn bot_token(state: &AppState, record: Option<&InstallRecord>) -> Option<SecretString> {
    record
        .map(|record| record.bot_token.clone())
        .filter(|token| !token.expose_secret().is_empty())
        .or_else(|| {
            let default = &state.config.slack.default_bot_token;
            (!default.expose_secret().trim().is_empty()).then(|| default.clone())
        })
}
