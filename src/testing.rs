//! In-memory collaborators for unit tests.

use crate::body::{ContentNode, encode};
use crate::error::BoxError;
use crate::gmail::{MailProvider, MessageDetail, MessagePage};
use crate::llm::CompletionService;
use crate::sheets::{SpreadsheetInfo, SpreadsheetStore};
use crate::slack::ChatClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

enum Reply {
    Fixed(String),
    EchoBody,
    Fail,
}

pub struct FakeCompletion {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub fn replying(text: &str) -> Self {
        Self::with(Reply::Fixed(text.to_string()))
    }

    /// Replies with the text being summarized.
    pub fn echo_body() -> Self {
        Self::with(Reply::EchoBody)
    }

    pub fn failing() -> Self {
        Self::with(Reply::Fail)
    }

    fn with(reply: Reply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String, BoxError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::EchoBody => Ok(prompt
                .split_once("\n\n")
                .map(|(_, body)| body.to_string())
                .unwrap_or_default()),
            Reply::Fail => Err("503 Service Unavailable".into()),
        }
    }
}

pub fn text_message(id: &str, subject: Option<&str>, body: &str) -> MessageDetail {
    MessageDetail {
        id: id.to_string(),
        subject: subject.map(str::to_string),
        content: ContentNode::composite(
            "multipart/alternative",
            vec![ContentNode::leaf("text/plain", Some(encode(body)))],
        ),
    }
}

/// Pages are served in order; page `n` hands out token `page-{n+1}` when another page follows.
pub struct FakeMail {
    pages: Vec<Result<Vec<String>, String>>,
    messages: HashMap<String, MessageDetail>,
    list_calls: Mutex<Vec<(String, u32, Option<String>)>>,
}

impl FakeMail {
    pub fn new(pages: Vec<Result<Vec<&str>, String>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|p| p.map(|ids| ids.into_iter().map(str::to_string).collect()))
                .collect(),
            messages: HashMap::new(),
            list_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_message(mut self, detail: MessageDetail) -> Self {
        self.messages.insert(detail.id.clone(), detail);
        self
    }

    pub fn list_calls(&self) -> Vec<(String, u32, Option<String>)> {
        self.list_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailProvider for FakeMail {
    async fn list_messages(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MessagePage, BoxError> {
        let index = {
            let mut calls = self.list_calls.lock().unwrap();
            calls.push((query.to_string(), page_size, page_token.map(str::to_string)));
            calls.len() - 1
        };
        let page = self
            .pages
            .get(index)
            .ok_or("listing requested past the last page")?;
        match page {
            Ok(ids) => Ok(MessagePage {
                ids: ids.clone(),
                next_page_token: (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 2)),
            }),
            Err(e) => Err(e.clone().into()),
        }
    }

    async fn get_message(&self, id: &str) -> Result<MessageDetail, BoxError> {
        self.messages
            .get(id)
            .cloned()
            .ok_or_else(|| format!("404 message {id} not found").into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetCall {
    Info(String),
    Clear(String, String),
    Update(String, String, Vec<Vec<String>>),
}

#[derive(Default)]
pub struct FakeSheets {
    pub fail_info: bool,
    pub fail_clear: bool,
    pub fail_update: bool,
    pub(crate) calls: Mutex<Vec<SheetCall>>,
}

impl FakeSheets {
    pub fn calls(&self) -> Vec<SheetCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpreadsheetStore for FakeSheets {
    async fn spreadsheet_info(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, BoxError> {
        self.calls
            .lock()
            .unwrap()
            .push(SheetCall::Info(spreadsheet_id.to_string()));
        if self.fail_info {
            return Err("404 Requested entity was not found".into());
        }
        Ok(SpreadsheetInfo {
            title: "Daily Report".to_string(),
            sheets: vec!["Sheet1".to_string()],
        })
    }

    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(SheetCall::Clear(
            spreadsheet_id.to_string(),
            range.to_string(),
        ));
        if self.fail_clear {
            return Err("403 The caller does not have permission".into());
        }
        Ok(())
    }

    async fn update_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(SheetCall::Update(
            spreadsheet_id.to_string(),
            range.to_string(),
            rows.to_vec(),
        ));
        if self.fail_update {
            return Err("500 Internal error".into());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeChat {
    pub fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeChat {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), BoxError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        if self.fail {
            return Err("Slack API error: not_in_channel".into());
        }
        Ok(())
    }
}
