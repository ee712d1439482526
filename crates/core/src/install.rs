//! The per-workspace install record.

use secrecy::SecretString;

/// Goal assigned at install time, before any configuration save.
pub const DEFAULT_GOAL: i64 = 100;

/// One row per Slack workspace, created by the OAuth install flow.
///
/// Credential and identity fields (`bot_token`, `bot_user`, `team_name`,
/// `installed_at`) are written only by a fresh install; configuration and
/// reset saves rewrite the season fields. `version` is the optimistic
/// concurrency token checked on every write-back.
#[derive(Clone, Debug)]
pub struct InstallRecord {
    pub team_id: String,
    pub team_name: String,
    pub bot_token: SecretString,
    pub bot_user: Option<String>,
    /// Unix milliseconds at install time.
    pub installed_at: i64,
    pub channel_id: Option<String>,
    pub goal: i64,
    /// Unix seconds, UTC midnight of the configured start date.
    pub season_start: Option<i64>,
    /// Unix seconds, UTC midnight of the configured end date.
    pub season_end: Option<i64>,
    pub version: i64,
}

impl InstallRecord {
    /// The record shape written at install time: no channel, no season,
    /// default goal.
    pub fn fresh(
        team_id: impl Into<String>,
        team_name: impl Into<String>,
        bot_token: SecretString,
        bot_user: Option<String>,
        installed_at: i64,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            team_name: team_name.into(),
            bot_token,
            bot_user,
            installed_at,
            channel_id: None,
            goal: DEFAULT_GOAL,
            season_start: None,
            season_end: None,
            version: 1,
        }
    }

    /// Whether acts should be counted and celebrated at `now` (unix
    /// seconds). A missing or zero start means the season is always on.
    pub fn season_started(&self, now: i64) -> bool {
        match self.season_start {
            Some(start) if start > 0 => now >= start,
            _ => true,
        }
    }

    /// Inclusive lower bound for the history scan; zero means all time.
    pub fn history_oldest(&self) -> i64 {
        self.season_start.unwrap_or(0).max(0)
    }
}
