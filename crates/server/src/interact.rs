//! The interactivity endpoint.
//!
//! Slack posts a form-encoded body whose `payload` field holds the
//! interaction JSON. Anything that cannot be parsed is acknowledged with
//! `clear` so the user's modal never hangs on a malformed delivery.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use kindness_slack::payload::classify;
use kindness_slack::{InteractionPayload, InteractionResponse};

use crate::routes::{verify_signature, AppState};

#[derive(Debug, Default, Deserialize)]
struct InteractForm {
    #[serde(default)]
    payload: String,
}

pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<InteractionResponse>, (StatusCode, &'static str)> {
    verify_signature(&state, &headers, &body)?;

    let form: InteractForm = match serde_urlencoded::from_str(&body) {
        Ok(form) => form,
        Err(error) => {
            warn!(error = %error, "interaction body was not form-encoded; acknowledging");
            return Ok(Json(InteractionResponse::Clear));
        }
    };

    let payload = match InteractionPayload::from_json(&form.payload) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(error = %error, "interaction payload was not json; acknowledging");
            return Ok(Json(InteractionResponse::Clear));
        }
    };

    Ok(Json(state.router.route(classify(&payload)).await))
}
