use crate::auth::GoogleAuth;
use crate::error::BoxError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use urlencoding::encode;

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Title and tab names of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetInfo {
    pub title: String,
    pub sheets: Vec<String>,
}

#[async_trait]
pub trait SpreadsheetStore: Send + Sync {
    async fn spreadsheet_info(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, BoxError>;

    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<(), BoxError>;

    /// Writes `rows` starting at the origin of `range`, values taken literally.
    async fn update_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), BoxError>;
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    properties: Properties,
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

impl From<Spreadsheet> for SpreadsheetInfo {
    fn from(s: Spreadsheet) -> Self {
        SpreadsheetInfo {
            title: s.properties.title,
            sheets: s.sheets.into_iter().map(|s| s.properties.title).collect(),
        }
    }
}

/// Google Sheets v4 REST client.
pub struct SheetsClient {
    client: Client,
    auth: Arc<GoogleAuth>,
}

impl SheetsClient {
    pub fn new(client: Client, auth: Arc<GoogleAuth>) -> Self {
        Self { client, auth }
    }

    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, BoxError> {
        let token = self.auth.access_token().await?;
        let res = req.bearer_auth(token).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Sheets API error {status}: {body}").into());
        }
        Ok(res)
    }
}

fn values_url(spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{SHEETS_BASE}/{}/values/{}",
        encode(spreadsheet_id),
        encode(range)
    )
}

#[async_trait]
impl SpreadsheetStore for SheetsClient {
    async fn spreadsheet_info(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, BoxError> {
        let url = format!(
            "{SHEETS_BASE}/{}?fields=properties.title,sheets.properties.title",
            encode(spreadsheet_id)
        );
        let res = self.send(self.client.get(&url)).await?;
        let sheet: Spreadsheet = res.json().await?;
        Ok(sheet.into())
    }

    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<(), BoxError> {
        let url = format!("{}:clear", values_url(spreadsheet_id, range));
        self.send(self.client.post(&url).json(&serde_json::json!({})))
            .await?;
        Ok(())
    }

    async fn update_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), BoxError> {
        let url = format!(
            "{}?valueInputOption=RAW",
            values_url(spreadsheet_id, range)
        );
        let body = ValueRange {
            range,
            major_dimension: "ROWS",
            values: rows,
        };
        self.send(self.client.put(&url).json(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_path_encoded() {
        assert_eq!(
            values_url("abc", "Sheet1!A:B"),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/Sheet1%21A%3AB"
        );
    }

    #[test]
    fn spreadsheet_metadata_lists_tabs() {
        let raw = r#"{
            "properties": {"title": "Daily Report"},
            "sheets": [{"properties": {"title": "Sheet1"}}, {"properties": {"title": "Archive"}}]
        }"#;
        let info: SpreadsheetInfo = serde_json::from_str::<Spreadsheet>(raw).unwrap().into();
        assert_eq!(info.title, "Daily Report");
        assert_eq!(info.sheets, vec!["Sheet1", "Archive"]);
    }

    #[test]
    fn update_body_is_row_major() {
        let rows = vec![vec!["A".to_string(), "x".to_string()]];
        let body = serde_json::to_value(ValueRange {
            range: "Sheet1!A:B",
            major_dimension: "ROWS",
            values: &rows,
        })
        .unwrap();
        assert_eq!(body["majorDimension"], "ROWS");
        assert_eq!(body["values"][0][1], "x");
    }
}
