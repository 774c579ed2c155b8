// src/llm.rs

use crate::config::LlmSection;
use crate::error::BoxError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Single-turn text completion.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, BoxError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI-compatible `/chat/completions` client. Defaults to Groq.
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl ChatCompletionClient {
    pub fn new(llm: &LlmSection, api_key: String) -> Result<Self, BoxError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()?;
        info!(url = %llm.base_url, model = %llm.model, "Using chat completion backend");
        Ok(Self {
            client,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            model: llm.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionService for ChatCompletionClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, BoxError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("LLM API error {status}: {body}").into());
        }

        let chat_response: ChatResponse = response.json().await?;
        first_choice(chat_response)
    }
}

fn first_choice(response: ChatResponse) -> Result<String, BoxError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| "Empty response from LLM".into())
}
