// src/runner.rs

use crate::config::ReportSection;
use crate::error::ReportError;
use crate::fetcher::MailFetcher;
use crate::gmail::MailProvider;
use crate::llm::CompletionService;
use crate::notifier::Notifier;
use crate::publisher::ReportPublisher;
use crate::report::FetchStats;
use crate::sheets::SpreadsheetStore;
use crate::slack::ChatClient;
use crate::summarizer::Summarizer;
use crate::window::TimeWindow;
use std::fmt;
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Fetching,
    Publishing,
    Notifying,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Start => "START",
            RunState::Fetching => "FETCHING",
            RunState::Publishing => "PUBLISHING",
            RunState::Notifying => "NOTIFYING",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Per-run settings resolved from the config file.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub spreadsheet_id: String,
    pub sheet_range: String,
    pub slack_channel: String,
    pub utc_offset: UtcOffset,
    pub page_size: u32,
    pub page_delay: Duration,
    pub summary_max_length: usize,
}

impl ReportConfig {
    pub fn from_section(section: &ReportSection) -> Result<Self, crate::error::ConfigError> {
        Ok(Self {
            spreadsheet_id: section.spreadsheet_id.clone(),
            sheet_range: section.sheet_range.clone(),
            slack_channel: section.slack_channel.clone(),
            utc_offset: section.utc_offset()?,
            page_size: section.clamped_page_size(),
            page_delay: section.page_delay(),
            summary_max_length: section.summary_max_length,
        })
    }
}

pub struct Collaborators<'a> {
    pub mail: &'a dyn MailProvider,
    pub llm: &'a dyn CompletionService,
    pub sheets: &'a dyn SpreadsheetStore,
    pub chat: &'a dyn ChatClient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub fetch: FetchStats,
}

/// Fetch, publish, notify. One instance per run.
pub struct ReportRunner<'a> {
    config: ReportConfig,
    deps: Collaborators<'a>,
    state: RunState,
}

impl<'a> ReportRunner<'a> {
    pub fn new(config: ReportConfig, deps: Collaborators<'a>) -> Self {
        Self {
            config,
            deps,
            state: RunState::Start,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        info!(from = %self.state, to = %next, "Run state");
        self.state = next;
    }

    pub async fn run(&mut self) -> Result<RunSummary, ReportError> {
        self.run_at(OffsetDateTime::now_utc()).await
    }

    /// Runs the report as if the clock read `now`.
    pub async fn run_at(&mut self, now: OffsetDateTime) -> Result<RunSummary, ReportError> {
        if self.state != RunState::Start {
            warn!(state = %self.state, "Report already ran, refusing to start again");
            return Err(ReportError::AlreadyRun(self.state));
        }
        info!("Starting daily report");
        self.transition(RunState::Fetching);
        let window = TimeWindow::for_day(now, self.config.utc_offset);
        let summarizer = Summarizer::new(self.deps.llm, self.config.summary_max_length);
        let fetcher = MailFetcher::new(
            self.deps.mail,
            summarizer,
            self.config.page_size,
            self.config.page_delay,
        );
        let (batch, fetch) = fetcher.fetch(&window).await;

        self.transition(RunState::Publishing);
        let publisher = ReportPublisher::new(
            self.deps.sheets,
            &self.config.spreadsheet_id,
            &self.config.sheet_range,
        );
        let published = publisher
            .publish(&batch, now.to_offset(self.config.utc_offset))
            .await;
        if let Err(e) = published {
            return Err(self.fail(e));
        }

        self.transition(RunState::Notifying);
        let notified = Notifier::new(self.deps.chat, &self.config.slack_channel)
            .notify(&batch)
            .await;
        if let Err(e) = notified {
            return Err(self.fail(e));
        }

        self.transition(RunState::Done);
        info!(rows = batch.len(), "Daily report completed");
        Ok(RunSummary {
            rows: batch.len(),
            fetch,
        })
    }

    fn fail(&mut self, e: ReportError) -> ReportError {
        error!(state = %self.state, error = %e, "Daily report failed");
        self.transition(RunState::Failed);
        e
    }
}
