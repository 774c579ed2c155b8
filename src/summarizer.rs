use crate::llm::CompletionService;
use tracing::warn;

pub const NO_CONTENT: &str = "No readable content.";

pub const DEFAULT_MAX_LENGTH: usize = 130;

/// Google Sheets rejects cells over 50k characters.
pub const CELL_LIMIT: usize = 50_000;

/// Compresses message bodies into a sentence or two.
pub struct Summarizer<'a> {
    service: &'a dyn CompletionService,
    max_length: usize,
}

impl<'a> Summarizer<'a> {
    pub fn new(service: &'a dyn CompletionService, max_length: usize) -> Self {
        Self {
            service,
            max_length: max_length.clamp(1, CELL_LIMIT),
        }
    }

    /// Never fails and never returns an empty string. A failed LLM call
    /// degrades to the first `max_length` characters of the input.
    pub async fn summarize(&self, text: &str) -> String {
        if text.is_empty() {
            return NO_CONTENT.to_string();
        }

        let prompt = format!(
            "Summarize the following text in 1-2 sentences (max {} words):\n\n{text}",
            self.max_length
        );
        let max_tokens = u32::try_from(self.max_length).unwrap_or(u32::MAX);

        match self.service.complete(&prompt, max_tokens).await {
            Ok(summary) => {
                let summary = summary.trim();
                if summary.is_empty() {
                    warn!("LLM returned an empty summary, using truncated body");
                    self.fallback(text)
                } else {
                    truncate_chars(summary, CELL_LIMIT).to_string()
                }
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed, using truncated body");
                self.fallback(text)
            }
        }
    }

    fn fallback(&self, text: &str) -> String {
        let prefix = truncate_chars(text, self.max_length);
        if prefix.trim().is_empty() {
            NO_CONTENT.to_string()
        } else {
            prefix.to_string()
        }
    }
}

/// Longest prefix of `s` holding at most `max` chars.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
