// src/window.rs

use time::{Duration, OffsetDateTime, UtcOffset};

/// Offset from local midnight to the window start. Keeps the boundary off exact midnight.
const START_AFTER_MIDNIGHT: Duration = Duration::minutes(1);

/// Length of the overnight window.
const WINDOW_LENGTH: Duration = Duration::hours(9);

/// The UTC range of one daily fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl TimeWindow {
    /// Window for the local date of `now` in `offset`: 00:01 to 09:01 local, expressed in UTC.
    pub fn for_day(now: OffsetDateTime, offset: UtcOffset) -> Self {
        let local_midnight = now.to_offset(offset).date().midnight().assume_offset(offset);
        let start = local_midnight + START_AFTER_MIDNIGHT;
        let end = start + WINDOW_LENGTH;

        Self {
            start: start.to_offset(UtcOffset::UTC),
            end: end.to_offset(UtcOffset::UTC),
        }
    }

    pub fn start(&self) -> OffsetDateTime {
        self.start
    }

    pub fn end(&self) -> OffsetDateTime {
        self.end
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start.unix_timestamp()
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end.unix_timestamp()
    }

    /// Gmail search filter for mail received inside the window, spam and trash excluded.
    pub fn search_query(&self) -> String {
        format!(
            "after:{} before:{} -in:spam -in:trash",
            self.start_timestamp(),
            self.end_timestamp()
        )
    }
}
