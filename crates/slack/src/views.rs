//! Typed Block Kit trees for the three modals.
//!
//! Views serialize straight into the `views.open` request body, so every
//! field name here matches the wire format. The block and action ids are
//! shared with [`crate::payload`], which reads them back out of the view
//! state on submission.

use chrono::DateTime;
use serde::Serialize;
use serde_json::json;

use kindness_core::install::{InstallRecord, DEFAULT_GOAL};

use crate::payload::{
    ANON_ACTION, ANON_BLOCK, CHANNEL_ACTION, CHANNEL_BLOCK, CONFIG_CALLBACK_ID,
    DESCRIPTION_ACTION, DESCRIPTION_BLOCK, END_ACTION, END_BLOCK, GOAL_ACTION, GOAL_BLOCK,
    PRAYER_ACTION, PRAYER_BLOCK, RESET_CALLBACK_ID, START_ACTION, START_BLOCK,
    SUBMISSION_CALLBACK_ID,
};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewText {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl ViewText {
    fn plain(text: impl Into<String>) -> Self {
        ViewText::PlainText { text: text.into() }
    }

    fn mrkdwn(text: impl Into<String>) -> Self {
        ViewText::Mrkdwn { text: text.into() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SelectOption {
    pub text: ViewText,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewElement {
    PlainTextInput {
        action_id: String,
        multiline: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_value: Option<String>,
    },
    StaticSelect {
        action_id: String,
        options: Vec<SelectOption>,
    },
}

impl ViewElement {
    fn text_entry(action_id: &str, initial_value: Option<String>) -> Self {
        ViewElement::PlainTextInput {
            action_id: action_id.to_string(),
            multiline: false,
            initial_value,
        }
    }

    fn multiline_entry(action_id: &str) -> Self {
        ViewElement::PlainTextInput {
            action_id: action_id.to_string(),
            multiline: true,
            initial_value: None,
        }
    }

    fn choice(action_id: &str, options: Vec<SelectOption>) -> Self {
        ViewElement::StaticSelect { action_id: action_id.to_string(), options }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewBlock {
    Input {
        block_id: String,
        label: ViewText,
        element: ViewElement,
        optional: bool,
    },
    Section {
        block_id: String,
        text: ViewText,
    },
}

impl ViewBlock {
    fn input(block_id: &str, label: &str, element: ViewElement) -> Self {
        ViewBlock::Input {
            block_id: block_id.to_string(),
            label: ViewText::plain(label),
            element,
            optional: false,
        }
    }

    fn optional_input(block_id: &str, label: &str, element: ViewElement) -> Self {
        ViewBlock::Input {
            block_id: block_id.to_string(),
            label: ViewText::plain(label),
            element,
            optional: true,
        }
    }

    fn section(block_id: &str, text: &str) -> Self {
        ViewBlock::Section { block_id: block_id.to_string(), text: ViewText::mrkdwn(text) }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub callback_id: String,
    pub private_metadata: String,
    pub title: ViewText,
    pub submit: ViewText,
    pub close: ViewText,
    pub blocks: Vec<ViewBlock>,
}

/// The act submission modal opened by `/kindness`.
pub fn submission_modal(team_id: &str, channel_id: &str) -> ModalView {
    ModalView {
        kind: "modal",
        callback_id: SUBMISSION_CALLBACK_ID.to_string(),
        private_metadata: json!({"team_id": team_id, "channel_id": channel_id}).to_string(),
        title: ViewText::plain("Kindness Challenge"),
        submit: ViewText::plain("Submit"),
        close: ViewText::plain("Cancel"),
        blocks: vec![
            ViewBlock::input(
                DESCRIPTION_BLOCK,
                "What act of kindness did you do?",
                ViewElement::multiline_entry(DESCRIPTION_ACTION),
            ),
            ViewBlock::optional_input(
                PRAYER_BLOCK,
                "How can we pray for this situation?",
                ViewElement::multiline_entry(PRAYER_ACTION),
            ),
            ViewBlock::input(
                ANON_BLOCK,
                "Include your name?",
                ViewElement::choice(
                    ANON_ACTION,
                    vec![
                        SelectOption { text: ViewText::plain("Yes"), value: "yes".to_string() },
                        SelectOption {
                            text: ViewText::plain("No (post anonymously)"),
                            value: "no".to_string(),
                        },
                    ],
                ),
            ),
        ],
    }
}

/// The configuration modal opened by `/kindness-config`, prefilled from
/// the current record when one exists.
pub fn config_modal(record: Option<&InstallRecord>, team_id: &str, channel_id: &str) -> ModalView {
    let start = record.and_then(|r| r.season_start).and_then(format_epoch_date);
    let end = record.and_then(|r| r.season_end).and_then(format_epoch_date);
    let goal = record.map_or(DEFAULT_GOAL, |r| r.goal).to_string();
    let channel = record.and_then(|r| r.channel_id.clone());

    ModalView {
        kind: "modal",
        callback_id: CONFIG_CALLBACK_ID.to_string(),
        private_metadata: json!({"team_id": team_id, "channel_id": channel_id}).to_string(),
        title: ViewText::plain("Kindness Config"),
        submit: ViewText::plain("Save"),
        close: ViewText::plain("Cancel"),
        blocks: vec![
            ViewBlock::input(
                START_BLOCK,
                "Start date (YYYY-MM-DD)",
                ViewElement::text_entry(START_ACTION, start),
            ),
            ViewBlock::input(
                END_BLOCK,
                "End date (YYYY-MM-DD)",
                ViewElement::text_entry(END_ACTION, end),
            ),
            ViewBlock::input(
                GOAL_BLOCK,
                "Goal (number of acts)",
                ViewElement::text_entry(GOAL_ACTION, Some(goal)),
            ),
            ViewBlock::optional_input(
                CHANNEL_BLOCK,
                "Channel",
                ViewElement::text_entry(CHANNEL_ACTION, channel),
            ),
        ],
    }
}

/// The season reset modal opened by `/kindness-reset`, prefilled with
/// the current season. Dates and goal only; the configured channel is
/// untouched by a reset.
pub fn reset_modal(record: Option<&InstallRecord>, team_id: &str) -> ModalView {
    let start = record.and_then(|r| r.season_start).and_then(format_epoch_date);
    let end = record.and_then(|r| r.season_end).and_then(format_epoch_date);
    let goal = record.map_or(DEFAULT_GOAL, |r| r.goal).to_string();

    ModalView {
        kind: "modal",
        callback_id: RESET_CALLBACK_ID.to_string(),
        private_metadata: json!({"team_id": team_id}).to_string(),
        title: ViewText::plain("Reset Kindness Season"),
        submit: ViewText::plain("Reset"),
        close: ViewText::plain("Cancel"),
        blocks: vec![
            ViewBlock::section("reset_note", "Set new dates and goal. The channel stays the same."),
            ViewBlock::input(
                START_BLOCK,
                "New start date (YYYY-MM-DD)",
                ViewElement::text_entry(START_ACTION, start),
            ),
            ViewBlock::input(
                END_BLOCK,
                "New end date (YYYY-MM-DD)",
                ViewElement::text_entry(END_ACTION, end),
            ),
            ViewBlock::input(
                GOAL_BLOCK,
                "New goal (number of acts)",
                ViewElement::text_entry(GOAL_ACTION, Some(goal)),
            ),
        ],
    }
}

fn format_epoch_date(secs: i64) -> Option<String> {
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0).map(|moment| moment.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_of(view: &serde_json::Value) -> serde_json::Value {
        serde_json::from_str(view["private_metadata"].as_str().expect("metadata is a string"))
            .expect("metadata is json")
    }

    #[test]
    fn submission_modal_serializes_the_block_kit_shape() {
        let value = serde_json::to_value(submission_modal("T1", "C1")).expect("serializes");

        assert_eq!(value["type"], "modal");
        assert_eq!(value["callback_id"], "kindness_modal");
        assert_eq!(value["title"]["type"], "plain_text");
        assert_eq!(value["title"]["text"], "Kindness Challenge");
        assert_eq!(value["submit"]["text"], "Submit");
        assert_eq!(value["blocks"][0]["block_id"], "description_block");
        assert_eq!(value["blocks"][0]["element"]["type"], "plain_text_input");
        assert_eq!(value["blocks"][0]["element"]["multiline"], true);
        assert_eq!(value["blocks"][0]["optional"], false);
        assert_eq!(value["blocks"][1]["block_id"], "prayer_block");
        assert_eq!(value["blocks"][1]["optional"], true);
        assert_eq!(value["blocks"][2]["element"]["type"], "static_select");
        assert_eq!(value["blocks"][2]["element"]["options"][0]["value"], "yes");
        assert_eq!(
            value["blocks"][2]["element"]["options"][1]["text"]["text"],
            "No (post anonymously)"
        );

        let metadata = metadata_of(&value);
        assert_eq!(metadata["team_id"], "T1");
        assert_eq!(metadata["channel_id"], "C1");
    }

    #[test]
    fn config_modal_prefills_from_the_install_record() {
        let mut record = InstallRecord::fresh(
            "T1",
            "Acme",
            "xoxb-token".to_string().into(),
            Some("U0BOT".to_string()),
            1_700_000_000_000,
        );
        record.channel_id = Some("C42".to_string());
        record.goal = 250;
        record.season_start = Some(1_767_225_600);
        record.season_end = Some(1_772_323_200);

        let value = serde_json::to_value(config_modal(Some(&record), "T1", "C9"))
            .expect("serializes");

        assert_eq!(value["blocks"][0]["element"]["initial_value"], "2026-01-01");
        assert_eq!(value["blocks"][1]["element"]["initial_value"], "2026-03-01");
        assert_eq!(value["blocks"][2]["element"]["initial_value"], "250");
        assert_eq!(value["blocks"][3]["element"]["initial_value"], "C42");
        assert_eq!(value["blocks"][3]["optional"], true);

        let metadata = metadata_of(&value);
        assert_eq!(metadata["channel_id"], "C9");
    }

    #[test]
    fn config_modal_defaults_without_a_record() {
        let value = serde_json::to_value(config_modal(None, "T1", "C9")).expect("serializes");

        assert_eq!(value["title"]["text"], "Kindness Config");
        assert_eq!(value["submit"]["text"], "Save");
        assert_eq!(value["blocks"][0]["element"].get("initial_value"), None);
        assert_eq!(value["blocks"][1]["element"].get("initial_value"), None);
        assert_eq!(value["blocks"][2]["element"]["initial_value"], "100");
        assert_eq!(value["blocks"][3]["element"].get("initial_value"), None);
    }

    #[test]
    fn reset_modal_prefills_the_current_season_without_a_channel_input() {
        let mut record = InstallRecord::fresh(
            "T1",
            "Acme",
            "xoxb-token".to_string().into(),
            Some("U0BOT".to_string()),
            1_700_000_000_000,
        );
        record.goal = 40;
        record.season_start = Some(1_767_225_600);

        let value = serde_json::to_value(reset_modal(Some(&record), "T1")).expect("serializes");

        assert_eq!(value["callback_id"], "kindness_reset_modal");
        assert_eq!(value["submit"]["text"], "Reset");
        assert_eq!(value["blocks"][0]["type"], "section");
        assert_eq!(
            value["blocks"][0]["text"]["text"],
            "Set new dates and goal. The channel stays the same."
        );
        assert_eq!(value["blocks"][1]["element"]["initial_value"], "2026-01-01");
        assert_eq!(value["blocks"][2]["element"].get("initial_value"), None);
        assert_eq!(value["blocks"][3]["element"]["initial_value"], "40");
        assert_eq!(value["blocks"].as_array().expect("blocks array").len(), 4);

        let metadata = metadata_of(&value);
        assert_eq!(metadata["team_id"], "T1");
        assert_eq!(metadata.get("channel_id"), None);
    }

    #[test]
    fn reset_modal_defaults_without_a_record() {
        let value = serde_json::to_value(reset_modal(None, "T1")).expect("serializes");

        assert_eq!(value["blocks"][1]["element"].get("initial_value"), None);
        assert_eq!(value["blocks"][3]["element"]["initial_value"], "100");
    }
}
