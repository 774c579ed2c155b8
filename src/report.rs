/// One spreadsheet row: the message subject and its summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub subject: String,
    pub summary: String,
}

impl SummaryRow {
    pub fn new(subject: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            summary: summary.into(),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![self.subject.clone(), self.summary.clone()]
    }
}

/// Rows for one run, in the mail provider's listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBatch {
    rows: Vec<SummaryRow>,
}

impl ReportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: SummaryRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }
}

impl FromIterator<SummaryRow> for ReportBatch {
    fn from_iter<I: IntoIterator<Item = SummaryRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Counters logged at the end of fetching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub pages: usize,
    pub listed: usize,
    pub processed: usize,
    pub skipped: usize,
    /// Set when a listing call failed and pagination stopped early.
    pub truncated: bool,
}
