//! Season act counting.
//!
//! Celebration posts are authored by the bot, so the running act count is
//! recovered by scanning channel history for messages whose `bot_id`
//! matches the installed bot user. No separate counter state to drift.

use secrecy::SecretString;

use crate::client::{SlackApiError, SlackGateway};

/// Counts history messages in `channel` authored by `bot_user` since
/// `oldest` (unix seconds, inclusive; zero scans all of history),
/// draining `conversations.history` pagination.
///
/// Without a recorded bot user nothing can match, so the scan is skipped
/// and the count is zero.
pub async fn count_matching_history(
    gateway: &dyn SlackGateway,
    token: &SecretString,
    channel: &str,
    bot_user: Option<&str>,
    oldest: i64,
) -> Result<i64, SlackApiError> {
    let Some(bot_user) = bot_user else {
        return Ok(0);
    };

    let mut count = 0_i64;
    let mut cursor: Option<String> = None;
    loop {
        let page = gateway.channel_history(token, channel, oldest, cursor.as_deref()).await?;
        count += page
            .messages
            .iter()
            .filter(|message| message.bot_id.as_deref() == Some(bot_user))
            .count() as i64;
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(count),
        }
    }
}
