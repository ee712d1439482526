//! Slack Integration - interaction pipeline for the Kindness Challenge bot
//!
//! This crate provides the Slack-facing half of the bot:
//! - **Gateway** (`client`) - the Web API slice the pipeline consumes
//! - **Resolution** (`resolver`) - channel references to canonical ids
//! - **Counting** (`counter`) - prior acts scanned from channel history
//! - **Payloads** (`payload`) - interactivity payloads into typed interactions
//! - **Views** (`views`) - the submission, config, and reset modals
//! - **Validation** (`validation`) - season forms into field-keyed errors
//! - **Routing** (`router`) - the view-submission workflows
//!
//! # Getting Started
//!
//! 1. Create a Slack app at https://api.slack.com/apps
//! 2. Enable Interactivity and point it at `/slack/interact`
//! 3. Add slash commands: `/kindness`, `/kindness-config`, `/kindness-reset`
//! 4. Set env vars: `KINDNESS_SLACK_SIGNING_SECRET` plus the OAuth client pair
//!
//! # Architecture
//!
//! ```text
//! View Submission → InteractionPayload → Interaction → InteractionRouter
//!                                                           ↓
//!                                        InstallStore + SlackGateway
//! ```
//!
//! # Key Types
//!
//! - `SlackGateway` - trait over the four Web API calls, `SlackClient` over HTTP
//! - `Interaction` - tagged classification of an inbound payload
//! - `InteractionRouter` - runs the workflows and always answers the dialog
//! - `FallbackConfig` - explicit default credential/channel for bare installs

pub mod client;
pub mod counter;
pub mod payload;
pub mod resolver;
pub mod router;
pub mod validation;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Channel, ChannelPage, HistoryMessage, HistoryPage, SlackApiError, SlackClient, SlackGateway};
pub use payload::{ActSubmission, ConfigSubmission, Interaction, InteractionPayload, ResetSubmission};
pub use router::{FallbackConfig, InteractionResponse, InteractionRouter};
pub use views::{config_modal, reset_modal, submission_modal, ModalView};
