use crate::error::ReportError;
use crate::report::ReportBatch;
use crate::slack::ChatClient;
use tracing::info;

/// Entries listed in the chat message; the rest are only counted.
pub const MAX_LISTED: usize = 5;

pub const NO_EMAILS_MESSAGE: &str = "No new emails found. Google Sheet updated with placeholder.";

pub struct Notifier<'a> {
    chat: &'a dyn ChatClient,
    channel: &'a str,
}

impl<'a> Notifier<'a> {
    pub fn new(chat: &'a dyn ChatClient, channel: &'a str) -> Self {
        Self { chat, channel }
    }

    /// Sends one message. Not retried.
    pub async fn notify(&self, batch: &ReportBatch) -> Result<(), ReportError> {
        let text = render_message(batch);
        info!(channel = %self.channel, "Sending chat notification");
        self.chat
            .post_message(self.channel, &text)
            .await
            .map_err(|source| ReportError::NotifyFailed {
                channel: self.channel.to_string(),
                source,
            })?;
        info!("Notification sent");
        Ok(())
    }
}

pub fn render_message(batch: &ReportBatch) -> String {
    if batch.is_empty() {
        return NO_EMAILS_MESSAGE.to_string();
    }

    let mut message = format!(
        "Daily Report: Processed {} emails and updated Google Sheet.\n\nSummaries:\n",
        batch.len()
    );
    for (i, row) in batch.rows().iter().take(MAX_LISTED).enumerate() {
        message.push_str(&format!("{}. {}: {}\n", i + 1, row.subject, row.summary));
    }
    if batch.len() > MAX_LISTED {
        message.push_str(&format!("...and {} more emails.", batch.len() - MAX_LISTED));
    }
    message
}
