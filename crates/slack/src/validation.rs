//! Config save validation.
//!
//! A save must name a usable channel before anything else is worth
//! checking: either the user typed one, or the modal was opened from a
//! real channel we can fall back to. Field errors come back keyed by
//! block id, the shape the `errors` response action wants.

use std::collections::BTreeMap;

use secrecy::SecretString;
use tracing::warn;

use kindness_core::season::{SeasonFieldErrors, SeasonForm, SeasonWindow};

use crate::client::SlackGateway;
use crate::payload::{CHANNEL_BLOCK, END_BLOCK, GOAL_BLOCK, START_BLOCK};
use crate::resolver::{is_canonical_channel_id, resolve_channel};

pub const CHANNEL_NOT_FOUND_ERROR: &str = "Channel not found. Invite the bot to the channel and try again, or run /kindness-config in the target channel and leave this blank.";
pub const CHANNEL_PRECONDITION_ERROR: &str = "Run /kindness-config in the target channel.";

/// A config save that passed every check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedSeason {
    pub channel_id: String,
    pub window: SeasonWindow,
}

pub fn season_field_errors(errors: &SeasonFieldErrors) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if let Some(message) = errors.goal {
        map.insert(GOAL_BLOCK.to_string(), message.to_string());
    }
    if let Some(message) = errors.start {
        map.insert(START_BLOCK.to_string(), message.to_string());
    }
    if let Some(message) = errors.end {
        map.insert(END_BLOCK.to_string(), message.to_string());
    }
    map
}

/// Validates a config save end to end.
///
/// The channel precondition runs first and short-circuits alone: with no
/// typed channel and no usable channel to fall back to, nothing else the
/// user fixes in the form can make the save succeed. After that, season
/// field errors and a failed channel lookup are collected together.
pub async fn validate_season(
    gateway: &dyn SlackGateway,
    token: Option<&SecretString>,
    form: &SeasonForm,
    channel_input: Option<&str>,
    fallback_channel: Option<&str>,
) -> Result<ValidatedSeason, BTreeMap<String, String>> {
    let fallback = fallback_channel.filter(|channel| is_canonical_channel_id(channel));
    if channel_input.is_none() && fallback.is_none() {
        return Err(single_error(CHANNEL_BLOCK, CHANNEL_PRECONDITION_ERROR));
    }

    let mut errors = BTreeMap::new();
    let window = form.parse();
    if let Err(field_errors) = &window {
        errors.extend(season_field_errors(field_errors));
    }

    let channel_id = match channel_input {
        Some(input) => match lookup_channel(gateway, token, input).await {
            Some(id) => Some(id),
            None => {
                errors.insert(CHANNEL_BLOCK.to_string(), CHANNEL_NOT_FOUND_ERROR.to_string());
                None
            }
        },
        None => fallback.map(str::to_string),
    };

    match (window, channel_id) {
        (Ok(window), Some(channel_id)) if errors.is_empty() => {
            Ok(ValidatedSeason { channel_id, window })
        }
        _ => Err(errors),
    }
}

async fn lookup_channel(
    gateway: &dyn SlackGateway,
    token: Option<&SecretString>,
    input: &str,
) -> Option<String> {
    let token = token?;
    match resolve_channel(gateway, token, input).await {
        Ok(resolved) => resolved,
        Err(error) => {
            warn!(error = %error, "channel lookup failed during config validation");
            None
        }
    }
}

fn single_error(block: &str, message: &str) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    errors.insert(block.to_string(), message.to_string());
    errors
}
