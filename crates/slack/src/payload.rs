//! Interaction payload decoding and classification.
//!
//! Slack delivers interactivity as a form-encoded `payload` field holding a
//! JSON document. Everything here is lenient on missing fields so that a
//! payload we do not recognize degrades to [`Interaction::Unrecognized`]
//! instead of a decode failure.

use std::collections::HashMap;

use serde::Deserialize;

use kindness_core::season::SeasonForm;

pub const SUBMISSION_CALLBACK_ID: &str = "kindness_modal";
pub const CONFIG_CALLBACK_ID: &str = "kindness_config_modal";
pub const RESET_CALLBACK_ID: &str = "kindness_reset_modal";

pub const START_BLOCK: &str = "start_block";
pub const START_ACTION: &str = "start";
pub const END_BLOCK: &str = "end_block";
pub const END_ACTION: &str = "end";
pub const GOAL_BLOCK: &str = "goal_block";
pub const GOAL_ACTION: &str = "goal";
pub const CHANNEL_BLOCK: &str = "channel_block";
pub const CHANNEL_ACTION: &str = "channel";
pub const DESCRIPTION_BLOCK: &str = "description_block";
pub const DESCRIPTION_ACTION: &str = "description";
pub const PRAYER_BLOCK: &str = "prayer_block";
pub const PRAYER_ACTION: &str = "prayer";
pub const ANON_BLOCK: &str = "anon_block";
pub const ANON_ACTION: &str = "anon_choice";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InteractionPayload {
    #[serde(rename = "type", default)]
    pub payload_type: String,
    #[serde(default)]
    pub team: Option<TeamRef>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub view: Option<ViewPayload>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ViewPayload {
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub state: ViewState,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, StateValue>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StateValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SelectedOption {
    #[serde(default)]
    pub value: String,
}

/// Context a modal carried through `private_metadata`. Stored as a JSON
/// string by the modal builders; anything unreadable decodes to defaults.
#[derive(Clone, Debug, Default, Deserialize)]
struct ViewMetadata {
    #[serde(default)]
    team_id: String,
    #[serde(default)]
    channel_id: String,
}

impl InteractionPayload {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// A view submission reduced to the data its handler needs.
#[derive(Clone, Debug)]
pub enum Interaction {
    Submission(ActSubmission),
    ConfigSave(ConfigSubmission),
    SeasonReset(ResetSubmission),
    Unrecognized,
}

#[derive(Clone, Debug)]
pub struct ActSubmission {
    pub team_id: String,
    pub team_domain: Option<String>,
    pub username: String,
    pub description: String,
    pub prayer: Option<String>,
    pub include_name: bool,
    pub metadata_channel: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ConfigSubmission {
    pub team_id: String,
    pub form: SeasonForm,
    /// Channel typed into the optional config input, if any.
    pub channel_input: Option<String>,
    /// Channel the modal was opened from, carried in the view metadata.
    pub fallback_channel: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResetSubmission {
    pub team_id: String,
    pub form: SeasonForm,
}

/// Sorts a decoded payload into the workflow it belongs to. Anything that
/// is not a view submission with a known callback id and a team id comes
/// back as [`Interaction::Unrecognized`].
pub fn classify(payload: &InteractionPayload) -> Interaction {
    if payload.payload_type != "view_submission" {
        return Interaction::Unrecognized;
    }
    let Some(view) = &payload.view else {
        return Interaction::Unrecognized;
    };
    let metadata: ViewMetadata =
        serde_json::from_str(&view.private_metadata).unwrap_or_default();
    let team_id = if !metadata.team_id.is_empty() {
        metadata.team_id.clone()
    } else {
        payload.team.as_ref().map(|team| team.id.clone()).unwrap_or_default()
    };
    if team_id.is_empty() {
        return Interaction::Unrecognized;
    }

    match view.callback_id.as_str() {
        CONFIG_CALLBACK_ID => Interaction::ConfigSave(ConfigSubmission {
            team_id,
            form: season_form(view),
            channel_input: non_empty(state_value(view, CHANNEL_BLOCK, CHANNEL_ACTION).trim()),
            fallback_channel: non_empty(&metadata.channel_id),
        }),
        RESET_CALLBACK_ID => Interaction::SeasonReset(ResetSubmission {
            team_id,
            form: season_form(view),
        }),
        SUBMISSION_CALLBACK_ID => Interaction::Submission(ActSubmission {
            team_id,
            team_domain: payload
                .team
                .as_ref()
                .map(|team| team.domain.clone())
                .filter(|domain| !domain.is_empty()),
            username: payload
                .user
                .as_ref()
                .map(|user| user.name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or("Someone")
                .to_string(),
            description: state_value(view, DESCRIPTION_BLOCK, DESCRIPTION_ACTION),
            prayer: non_empty(state_value(view, PRAYER_BLOCK, PRAYER_ACTION).trim()),
            include_name: selected_value(view, ANON_BLOCK, ANON_ACTION).as_deref() == Some("yes"),
            metadata_channel: non_empty(&metadata.channel_id),
        }),
        _ => Interaction::Unrecognized,
    }
}

fn season_form(view: &ViewPayload) -> SeasonForm {
    SeasonForm {
        start: state_value(view, START_BLOCK, START_ACTION).trim().to_string(),
        end: state_value(view, END_BLOCK, END_ACTION).trim().to_string(),
        goal: state_value(view, GOAL_BLOCK, GOAL_ACTION).trim().to_string(),
    }
}

fn state_value(view: &ViewPayload, block: &str, action: &str) -> String {
    view.state
        .values
        .get(block)
        .and_then(|actions| actions.get(action))
        .and_then(|entry| entry.value.clone())
        .unwrap_or_default()
}

fn selected_value(view: &ViewPayload, block: &str, action: &str) -> Option<String> {
    view.state
        .values
        .get(block)
        .and_then(|actions| actions.get(action))
        .and_then(|entry| entry.selected_option.as_ref())
        .map(|option| option.value.clone())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
