use crate::error::ReportError;
use crate::report::ReportBatch;
use crate::sheets::SpreadsheetStore;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::info;

pub const PLACEHOLDER_LABEL: &str = "No emails";

/// Replaces the contents of the target range with the batch.
pub struct ReportPublisher<'a> {
    store: &'a dyn SpreadsheetStore,
    spreadsheet_id: &'a str,
    range: &'a str,
}

impl<'a> ReportPublisher<'a> {
    pub fn new(store: &'a dyn SpreadsheetStore, spreadsheet_id: &'a str, range: &'a str) -> Self {
        Self {
            store,
            spreadsheet_id,
            range,
        }
    }

    /// Lookup, clear, then write. The clear and the write are separate calls,
    /// so a crash between them leaves the range empty until the next run.
    pub async fn publish(
        &self,
        batch: &ReportBatch,
        generated_at: OffsetDateTime,
    ) -> Result<(), ReportError> {
        let rows = rows_for(batch, generated_at);
        info!(rows = rows.len(), "Updating Google Sheet");

        let sheet = self
            .store
            .spreadsheet_info(self.spreadsheet_id)
            .await
            .map_err(|source| ReportError::SpreadsheetUnavailable {
                spreadsheet_id: self.spreadsheet_id.to_string(),
                source,
            })?;
        info!(title = %sheet.title, tabs = ?sheet.sheets, "Spreadsheet found");

        self.store
            .clear_range(self.spreadsheet_id, self.range)
            .await
            .map_err(|source| ReportError::ClearFailed {
                range: self.range.to_string(),
                source,
            })?;
        info!(range = %self.range, "Cleared range");

        self.store
            .update_range(self.spreadsheet_id, self.range, &rows)
            .await
            .map_err(|source| ReportError::WriteFailed {
                range: self.range.to_string(),
                rows: rows.len(),
                source,
            })?;
        info!("Google Sheet updated");

        Ok(())
    }
}

/// Cell values for the batch, or the single placeholder row when it is empty.
fn rows_for(batch: &ReportBatch, generated_at: OffsetDateTime) -> Vec<Vec<String>> {
    if batch.is_empty() {
        let stamp = generated_at
            .format(format_description!(
                "[year]/[month]/[day] [hour]:[minute]:[second]"
            ))
            .unwrap_or_else(|_| generated_at.unix_timestamp().to_string());
        vec![vec![
            PLACEHOLDER_LABEL.to_string(),
            format!("No emails found on {stamp}"),
        ]]
    } else {
        batch.rows().iter().map(|r| r.to_cells()).collect()
    }
}
