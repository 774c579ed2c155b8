use thiserror::Error;

/// Error type returned by the collaborator traits (mail, sheets, chat, LLM).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unrecovered failures that end a run after fetching.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The target spreadsheet could not be resolved before writing.
    #[error("spreadsheet {spreadsheet_id} is not reachable: {source}")]
    SpreadsheetUnavailable {
        spreadsheet_id: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to clear range {range}: {source}")]
    ClearFailed {
        range: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write {rows} rows to {range}: {source}")]
    WriteFailed {
        range: String,
        rows: usize,
        #[source]
        source: BoxError,
    },

    /// The runner already left START; a runner drives a single report.
    #[error("report run already finished in state {0}")]
    AlreadyRun(crate::runner::RunState),

    /// Chat delivery failed. The spreadsheet has already been written at this point.
    #[error("failed to post to {channel}: {source}")]
    NotifyFailed {
        channel: String,
        #[source]
        source: BoxError,
    },
}

/// Startup failures, raised before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set (environment or .env file)")]
    MissingSecret(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid reference timezone offset {0}h")]
    InvalidOffset(i8),
}
