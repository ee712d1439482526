//! OAuth install callback.
//!
//! Slack redirects here after a workspace admin approves the app. The
//! handler exchanges the `code` for workspace credentials and stores a
//! fresh install record keyed by team id. Responses are small HTML pages
//! rendered into the installing admin's browser.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{error, info};

use kindness_core::InstallRecord;
use kindness_db::InstallStore;

use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OauthQuery {
    #[serde(default)]
    code: String,
}

pub async fn redirect(
    State(state): State<AppState>,
    Query(query): Query<OauthQuery>,
) -> (StatusCode, Html<String>) {
    if query.code.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Html("<h1>Missing code</h1><p>Install via Slack first.</p>".to_string()),
        );
    }

    let slack = &state.config.slack;
    if slack.client_id.trim().is_empty()
        || slack.client_secret.expose_secret().trim().is_empty()
        || slack.redirect_url.trim().is_empty()
    {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(
                "<h1>Server not configured</h1>\
                 <p>Missing one or more settings: slack.client_id, slack.client_secret, \
                 slack.redirect_url.</p>"
                    .to_string(),
            ),
        );
    }

    let access = match state
        .slack
        .oauth_access(&slack.client_id, &slack.client_secret, &slack.redirect_url, &query.code)
        .await
    {
        Ok(access) => access,
        Err(error) => {
            error!(error = %error, "oauth token exchange failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("<h1>Error</h1><pre>{}</pre>", escape_html(&error.to_string()))),
            );
        }
    };

    if !access.ok {
        let detail = access.error.as_deref().unwrap_or("unknown_error");
        error!(error = %detail, "slack rejected the oauth exchange");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Slack OAuth failed</h1><pre>{}</pre>", escape_html(detail))),
        );
    }

    let team = access.team.unwrap_or_default();
    let (team_id, access_token) = match (team.id, access.access_token) {
        (Some(team_id), Some(access_token)) => (team_id, access_token),
        (team_id, _) => {
            let missing = if team_id.is_none() { "team.id" } else { "access_token" };
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("<h1>Missing data from Slack</h1><pre>response had no {missing}</pre>")),
            );
        }
    };
    let team_name = team.name.unwrap_or_default();

    let record = InstallRecord::fresh(
        team_id,
        team_name.clone(),
        access_token.into(),
        access.bot_user_id,
        Utc::now().timestamp_millis(),
    );

    if let Err(error) = state.store.install(&record).await {
        error!(error = %error, team_id = %record.team_id, "failed to store the workspace install");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Error</h1><pre>{}</pre>", escape_html(&error.to_string()))),
        );
    }

    info!(event_name = "oauth.install.completed", team_id = %record.team_id, "workspace install stored");

    let display = if team_name.is_empty() { record.team_id.as_str() } else { team_name.as_str() };
    (StatusCode::OK, Html(success_page(display)))
}

fn success_page(team_label: &str) -> String {
    format!(
        "<h1>Installed to {}</h1>\n\
         <p>Your Kindness Challenge bot is now connected.</p>\n\
         <ol>\n\
         <li>Create or choose a channel (e.g., <code>#kindness-campaign</code>) and invite the bot.</li>\n\
         <li>Run <code>/kindness</code> to test logging an act.</li>\n\
         <li>Run <code>/kindness-config</code> to set your Start/End dates & goal.</li>\n\
         </ol>\n\
         <p>You can close this window.</p>",
        escape_html(team_label)
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
