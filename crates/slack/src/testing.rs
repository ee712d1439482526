//! Scripted gateway for exercising pipeline logic without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::client::{ChannelPage, HistoryPage, SlackApiError, SlackGateway};
use crate::views::ModalView;

#[derive(Clone, Debug)]
pub(crate) struct PostedMessage {
    pub token: String,
    pub channel: String,
    pub text: String,
}

#[derive(Clone, Debug)]
pub(crate) struct HistoryCall {
    pub channel: String,
    pub oldest: i64,
}

/// Pages are consumed in script order; an exhausted script yields empty
/// final pages so drains terminate.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    channel_pages: Mutex<VecDeque<Result<ChannelPage, SlackApiError>>>,
    history_pages: Mutex<VecDeque<Result<HistoryPage, SlackApiError>>>,
    post_failures: Mutex<VecDeque<SlackApiError>>,
    pub list_calls: Mutex<usize>,
    pub history_calls: Mutex<Vec<HistoryCall>>,
    pub posts: Mutex<Vec<PostedMessage>>,
    pub opened_views: Mutex<Vec<ModalView>>,
}

impl ScriptedGateway {
    pub fn push_channel_page(&self, page: ChannelPage) {
        self.channel_pages.lock().expect("lock").push_back(Ok(page));
    }

    pub fn push_channel_error(&self, error: SlackApiError) {
        self.channel_pages.lock().expect("lock").push_back(Err(error));
    }

    pub fn push_history_page(&self, page: HistoryPage) {
        self.history_pages.lock().expect("lock").push_back(Ok(page));
    }

    pub fn push_history_error(&self, error: SlackApiError) {
        self.history_pages.lock().expect("lock").push_back(Err(error));
    }

    pub fn fail_next_post(&self, error: SlackApiError) {
        self.post_failures.lock().expect("lock").push_back(error);
    }
}

#[async_trait]
impl SlackGateway for ScriptedGateway {
    async fn list_channels(
        &self,
        _token: &SecretString,
        _cursor: Option<&str>,
    ) -> Result<ChannelPage, SlackApiError> {
        *self.list_calls.lock().expect("lock") += 1;
        self.channel_pages.lock().expect("lock").pop_front().unwrap_or_else(|| Ok(ChannelPage::default()))
    }

    async fn channel_history(
        &self,
        _token: &SecretString,
        channel: &str,
        oldest: i64,
        _cursor: Option<&str>,
    ) -> Result<HistoryPage, SlackApiError> {
        self.history_calls
            .lock()
            .expect("lock")
            .push(HistoryCall { channel: channel.to_string(), oldest });
        self.history_pages.lock().expect("lock").pop_front().unwrap_or_else(|| Ok(HistoryPage::default()))
    }

    async fn post_message(
        &self,
        token: &SecretString,
        channel: &str,
        text: &str,
    ) -> Result<(), SlackApiError> {
        if let Some(error) = self.post_failures.lock().expect("lock").pop_front() {
            return Err(error);
        }
        self.posts.lock().expect("lock").push(PostedMessage {
            token: token.expose_secret().to_string(),
            channel: channel.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn open_view(
        &self,
        _token: &SecretString,
        _trigger_id: &str,
        view: &ModalView,
    ) -> Result<(), SlackApiError> {
        self.opened_views.lock().expect("lock").push(view.clone());
        Ok(())
    }
}
