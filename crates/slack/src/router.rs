//! Interaction routing.
//!
//! One router serves every workspace: each interaction carries its team
//! id, the install record supplies the credential and season, and
//! environment fallbacks cover workspaces that have no usable record.
//! Slack closes the modal on any HTTP 200, so handlers answer `Clear`
//! on every failure that validation cannot surface as a field error.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use serde::Serialize;
use tracing::{error, info, warn};

use kindness_core::install::{InstallRecord, DEFAULT_GOAL};
use kindness_core::progress::Progress;
use kindness_db::{InstallStore, StoreError};

use crate::client::SlackGateway;
use crate::counter::count_matching_history;
use crate::payload::{ActSubmission, ConfigSubmission, Interaction, ResetSubmission};
use crate::validation::{season_field_errors, validate_season};

/// The immediate answer to a view submission, serialized straight into
/// the interactivity response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "response_action", rename_all = "lowercase")]
pub enum InteractionResponse {
    Clear,
    Errors { errors: BTreeMap<String, String> },
}

/// Environment-level fallbacks for workspaces without a usable record.
#[derive(Clone, Debug, Default)]
pub struct FallbackConfig {
    pub default_bot_token: Option<SecretString>,
    pub default_channel: Option<String>,
}

/// Write-back attempts before a conflicted save is dropped.
const WRITE_RETRY_LIMIT: usize = 3;

pub struct InteractionRouter {
    store: Arc<dyn InstallStore>,
    gateway: Arc<dyn SlackGateway>,
    fallback: FallbackConfig,
}

impl InteractionRouter {
    pub fn new(
        store: Arc<dyn InstallStore>,
        gateway: Arc<dyn SlackGateway>,
        fallback: FallbackConfig,
    ) -> Self {
        Self { store, gateway, fallback }
    }

    /// Dispatches one classified interaction to its workflow.
    pub async fn route(&self, interaction: Interaction) -> InteractionResponse {
        match interaction {
            Interaction::Submission(act) => self.handle_submission(act).await,
            Interaction::ConfigSave(config) => self.handle_config_save(config).await,
            Interaction::SeasonReset(reset) => self.handle_season_reset(reset).await,
            Interaction::Unrecognized => InteractionResponse::Clear,
        }
    }

    async fn handle_submission(&self, act: ActSubmission) -> InteractionResponse {
        let record = match self.store.fetch(&act.team_id).await {
            Ok(record) => record,
            Err(error) => {
                error!(team_id = %act.team_id, error = %error, "install lookup failed; submission dropped");
                return InteractionResponse::Clear;
            }
        };

        let token = record
            .as_ref()
            .map(|record| record.bot_token.clone())
            .or_else(|| self.fallback.default_bot_token.clone());
        let channel = record
            .as_ref()
            .and_then(|record| record.channel_id.clone())
            .or_else(|| act.metadata_channel.clone())
            .or_else(|| self.fallback.default_channel.clone());
        let (Some(token), Some(channel)) = (token, channel) else {
            warn!(team_id = %act.team_id, "no credential or channel for the celebration post");
            return InteractionResponse::Clear;
        };

        let team_label = record
            .as_ref()
            .map(|record| record.team_name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| act.team_domain.clone())
            .unwrap_or_else(|| "teammate".to_string());
        let mut base_text = if act.include_name {
            format!("{} shared: _\"{}\"_", act.username, act.description)
        } else {
            format!("A {} teammate shared: _\"{}\"_", team_label, act.description)
        };
        if let Some(prayer) = &act.prayer {
            base_text.push_str(&format!("\n🙏 Prayer request: _\"{prayer}\"_"));
        }

        // Before the season starts the act is shared without a number or
        // candle bar, and nothing is counted.
        let now = Utc::now().timestamp();
        let season_started = record.as_ref().map_or(true, |record| record.season_started(now));
        if !season_started {
            if let Err(error) = self.gateway.post_message(&token, &channel, &base_text).await {
                warn!(channel = %channel, error = %error, "pre-season post failed");
            }
            return InteractionResponse::Clear;
        }

        let goal = record.as_ref().map_or(DEFAULT_GOAL, |record| record.goal);
        let oldest = record.as_ref().map_or(0, InstallRecord::history_oldest);
        let bot_user = record.as_ref().and_then(|record| record.bot_user.as_deref());
        let count = match count_matching_history(
            self.gateway.as_ref(),
            &token,
            &channel,
            bot_user,
            oldest,
        )
        .await
        {
            Ok(count) => count,
            Err(error) => {
                warn!(channel = %channel, error = %error, "history scan failed; counting from zero");
                0
            }
        };

        let progress = Progress::for_act(count + 1, goal);
        let text = format!(
            "Act #{}: {}\nOnly {} more to go!\n{}",
            progress.act_number,
            base_text,
            progress.remaining,
            progress.bar()
        );
        if let Err(error) = self.gateway.post_message(&token, &channel, &text).await {
            warn!(channel = %channel, error = %error, "celebration post failed");
        }
        InteractionResponse::Clear
    }

    async fn handle_config_save(&self, config: ConfigSubmission) -> InteractionResponse {
        let record = match self.store.fetch(&config.team_id).await {
            Ok(record) => record,
            Err(error) => {
                error!(team_id = %config.team_id, error = %error, "install lookup failed; config save dropped");
                return InteractionResponse::Clear;
            }
        };

        let token = record
            .as_ref()
            .map(|record| record.bot_token.clone())
            .or_else(|| self.fallback.default_bot_token.clone());
        let season = match validate_season(
            self.gateway.as_ref(),
            token.as_ref(),
            &config.form,
            config.channel_input.as_deref(),
            config.fallback_channel.as_deref(),
        )
        .await
        {
            Ok(season) => season,
            Err(errors) => return InteractionResponse::Errors { errors },
        };

        let Some(record) = record else {
            info!(team_id = %config.team_id, "config save without an install record; nothing to update");
            return InteractionResponse::Clear;
        };

        self.write_season(
            record,
            |record| {
                record.channel_id = Some(season.channel_id.clone());
                record.goal = season.window.goal;
                record.season_start = Some(season.window.start);
                record.season_end = Some(season.window.end);
            },
            "config save",
        )
        .await;
        InteractionResponse::Clear
    }

    async fn handle_season_reset(&self, reset: ResetSubmission) -> InteractionResponse {
        let window = match reset.form.parse() {
            Ok(window) => window,
            Err(field_errors) => {
                return InteractionResponse::Errors { errors: season_field_errors(&field_errors) };
            }
        };

        let record = match self.store.fetch(&reset.team_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                info!(team_id = %reset.team_id, "season reset without an install record; nothing to update");
                return InteractionResponse::Clear;
            }
            Err(error) => {
                error!(team_id = %reset.team_id, error = %error, "install lookup failed; season reset dropped");
                return InteractionResponse::Clear;
            }
        };

        // A reset rewrites the dates and goal; the channel stays put.
        self.write_season(
            record,
            |record| {
                record.goal = window.goal;
                record.season_start = Some(window.start);
                record.season_end = Some(window.end);
            },
            "season reset",
        )
        .await;
        InteractionResponse::Clear
    }

    /// Applies `apply` to the record and writes it back, re-fetching and
    /// re-applying on a version conflict. After [`WRITE_RETRY_LIMIT`]
    /// conflicted attempts the save is dropped with a warning.
    async fn write_season<F>(&self, mut record: InstallRecord, apply: F, context: &'static str)
    where
        F: Fn(&mut InstallRecord),
    {
        apply(&mut record);
        for attempt in 1..=WRITE_RETRY_LIMIT {
            match self.store.compare_and_swap(&record).await {
                Ok(()) => return,
                Err(StoreError::VersionConflict { .. }) if attempt < WRITE_RETRY_LIMIT => {
                    match self.store.fetch(&record.team_id).await {
                        Ok(Some(fresh)) => {
                            record = fresh;
                            apply(&mut record);
                        }
                        Ok(None) => {
                            info!(team_id = %record.team_id, context, "record removed mid-write; dropping the update");
                            return;
                        }
                        Err(error) => {
                            error!(team_id = %record.team_id, context, error = %error, "re-fetch failed after a write conflict");
                            return;
                        }
                    }
                }
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(team_id = %record.team_id, context, attempts = WRITE_RETRY_LIMIT, "giving up after repeated write conflicts");
                    return;
                }
                Err(error) => {
                    error!(team_id = %record.team_id, context, error = %error, "season write failed");
                    return;
                }
            }
        }
    }
}
