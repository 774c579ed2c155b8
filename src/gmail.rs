// src/gmail.rs

use crate::auth::GoogleAuth;
use crate::body::ContentNode;
use crate::error::BoxError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use urlencoding::encode;

const GMAIL_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// One page of a message listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePage {
    pub ids: Vec<String>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDetail {
    pub id: String,
    pub subject: Option<String>,
    pub content: ContentNode,
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn list_messages(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MessagePage, BoxError>;

    async fn get_message(&self, id: &str) -> Result<MessageDetail, BoxError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMessagesResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Message {
    id: String,
    payload: Option<MessagePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<MessageHeader>,
    body: Option<MessagePartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct MessagePartBody {
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageHeader {
    name: String,
    value: String,
}

impl From<MessagePart> for ContentNode {
    fn from(part: MessagePart) -> Self {
        if part.parts.is_empty() {
            ContentNode::leaf(part.mime_type, part.body.and_then(|b| b.data))
        } else {
            ContentNode::composite(
                part.mime_type,
                part.parts.into_iter().map(ContentNode::from).collect(),
            )
        }
    }
}

fn subject_of(headers: &[MessageHeader]) -> Option<String> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("subject"))
        .map(|h| h.value.clone())
}

impl TryFrom<Message> for MessageDetail {
    type Error = BoxError;

    fn try_from(msg: Message) -> Result<Self, Self::Error> {
        let payload = msg
            .payload
            .ok_or_else(|| format!("message {} has no payload", msg.id))?;
        let subject = subject_of(&payload.headers);
        Ok(MessageDetail {
            id: msg.id,
            subject,
            content: payload.into(),
        })
    }
}

/// Gmail v1 REST client for the authorized user's mailbox.
pub struct GmailClient {
    client: Client,
    auth: Arc<GoogleAuth>,
}

impl GmailClient {
    pub fn new(client: Client, auth: Arc<GoogleAuth>) -> Self {
        Self { client, auth }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, BoxError> {
        let token = self.auth.access_token().await?;
        let res = self.client.get(url).bearer_auth(token).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Gmail API error {status}: {body}").into());
        }
        Ok(res.json().await?)
    }
}

fn list_url(query: &str, page_size: u32, page_token: Option<&str>) -> String {
    let mut url = format!(
        "{GMAIL_BASE}/messages?q={}&maxResults={page_size}",
        encode(query)
    );
    if let Some(token) = page_token {
        url.push_str("&pageToken=");
        url.push_str(&encode(token));
    }
    url
}

#[async_trait]
impl MailProvider for GmailClient {
    async fn list_messages(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MessagePage, BoxError> {
        let url = list_url(query, page_size, page_token);
        let response: ListMessagesResponse = self.get_json(&url).await?;
        Ok(MessagePage {
            ids: response.messages.into_iter().map(|m| m.id).collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn get_message(&self, id: &str) -> Result<MessageDetail, BoxError> {
        let url = format!("{GMAIL_BASE}/messages/{}?format=full", encode(id));
        let message: Message = self.get_json(&url).await?;
        message.try_into()
    }
}
