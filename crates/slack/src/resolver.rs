//! Channel reference resolution.
//!
//! Config saves accept a channel as a `<#C123|name>` mention, a bare
//! channel id, or a plain name with or without the leading `#`. Mentions
//! and bare ids resolve locally; only a name lookup costs a listing call.

use secrecy::SecretString;

use crate::client::{Channel, SlackApiError, SlackGateway};

/// Canonical channel ids start with `C` and stay alphanumeric.
pub fn is_canonical_channel_id(value: &str) -> bool {
    let mut chars = value.chars();
    if !matches!(chars.next(), Some('C') | Some('c')) {
        return false;
    }
    let rest = chars.as_str();
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Drains `conversations.list` pagination into one vector.
pub async fn collect_channels(
    gateway: &dyn SlackGateway,
    token: &SecretString,
) -> Result<Vec<Channel>, SlackApiError> {
    let mut channels = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = gateway.list_channels(token, cursor.as_deref()).await?;
        channels.extend(page.channels);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(channels),
        }
    }
}

/// Resolves a user-supplied channel reference to a channel id. `Ok(None)`
/// means nothing matched; listing failures surface as the error.
pub async fn resolve_channel(
    gateway: &dyn SlackGateway,
    token: &SecretString,
    raw: &str,
) -> Result<Option<String>, SlackApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Some(id) = mention_channel_id(trimmed) {
        return Ok(Some(id.to_string()));
    }
    if is_canonical_channel_id(trimmed) {
        return Ok(Some(trimmed.to_string()));
    }

    let name = trimmed.strip_prefix('#').unwrap_or(trimmed).to_lowercase();
    let channels = collect_channels(gateway, token).await?;
    Ok(channels
        .into_iter()
        .find(|channel| channel.name.to_lowercase() == name)
        .map(|channel| channel.id))
}

/// The id inside a `<#C123|name>` mention. The pipe is part of the
/// mention syntax; without it the input is treated as a name.
fn mention_channel_id(value: &str) -> Option<&str> {
    let inner = value.strip_prefix("<#")?.strip_suffix('>')?;
    let (id, _name) = inner.split_once('|')?;
    is_canonical_channel_id(id).then_some(id)
}
