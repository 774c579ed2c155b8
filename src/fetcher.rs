// src/fetcher.rs

use crate::body;
use crate::error::BoxError;
use crate::gmail::MailProvider;
use crate::report::{FetchStats, ReportBatch, SummaryRow};
use crate::summarizer::Summarizer;
use crate::window::TimeWindow;
use std::time::Duration;
use tracing::{Instrument, debug, error, info, info_span, warn};

pub const NO_SUBJECT: &str = "No Subject";

/// Walks every page of the window's listing and summarizes each message.
pub struct MailFetcher<'a> {
    provider: &'a dyn MailProvider,
    summarizer: Summarizer<'a>,
    page_size: u32,
    page_delay: Duration,
}

impl<'a> MailFetcher<'a> {
    pub fn new(
        provider: &'a dyn MailProvider,
        summarizer: Summarizer<'a>,
        page_size: u32,
        page_delay: Duration,
    ) -> Self {
        Self {
            provider,
            summarizer,
            page_size,
            page_delay,
        }
    }

    /// Never fails. A broken message is skipped; a broken page ends
    /// pagination and keeps what was collected so far.
    pub async fn fetch(&self, window: &TimeWindow) -> (ReportBatch, FetchStats) {
        let query = window.search_query();
        info!(start = %window.start(), end = %window.end(), query = %query, "Fetching emails");

        let mut batch = ReportBatch::new();
        let mut stats = FetchStats::default();
        let mut page_token: Option<String> = None;

        loop {
            let page_number = stats.pages + 1;
            let page = match self
                .provider
                .list_messages(&query, self.page_size, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!(page = page_number, error = %e, "Listing failed, stopping pagination");
                    stats.truncated = true;
                    break;
                }
            };

            stats.pages = page_number;
            stats.listed += page.ids.len();
            info!(
                page = page_number,
                token = ?page_token,
                found = page.ids.len(),
                total = stats.listed,
                "Listed page"
            );

            for id in &page.ids {
                let span = info_span!("message", id = %id);
                match self.process_message(id).instrument(span).await {
                    Ok(row) => {
                        info!(id = %id, subject = %row.subject, "Processed email");
                        batch.push(row);
                        stats.processed += 1;
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "Skipping email");
                        stats.skipped += 1;
                    }
                }
            }

            match page.next_page_token {
                Some(token) => {
                    page_token = Some(token);
                    tokio::time::sleep(self.page_delay).await;
                }
                None => {
                    info!("All emails have been fetched");
                    break;
                }
            }
        }

        info!(
            pages = stats.pages,
            listed = stats.listed,
            processed = stats.processed,
            skipped = stats.skipped,
            truncated = stats.truncated,
            "Fetch complete"
        );
        (batch, stats)
    }

    async fn process_message(&self, id: &str) -> Result<SummaryRow, BoxError> {
        let detail = self.provider.get_message(id).await?;
        let body = body::extract_body(&detail.content);
        debug!(id = %detail.id, mime = detail.content.mime_type(), chars = body.len(), "Extracted body");

        let summary = self.summarizer.summarize(&body).await;
        let subject = detail.subject.unwrap_or_else(|| NO_SUBJECT.to_string());
        Ok(SummaryRow::new(subject, summary))
    }
}
