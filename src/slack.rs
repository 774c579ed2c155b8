use crate::error::BoxError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), BoxError>;
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

/// Slack Web API answers 200 even on failure; `ok` carries the outcome.
#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackResponse {
    fn into_result(self) -> Result<(), BoxError> {
        if self.ok {
            Ok(())
        } else {
            let error = self.error.unwrap_or_else(|| "unknown_error".to_string());
            Err(format!("Slack API error: {error}").into())
        }
    }
}

pub struct SlackClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    pub fn new(client: Client, base_url: &str, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }
}

#[async_trait]
impl ChatClient for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), BoxError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&PostMessage { channel, text })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Slack HTTP error {status}: {body}").into());
        }

        let parsed: SlackResponse = res.json().await?;
        parsed.into_result()
    }
}
