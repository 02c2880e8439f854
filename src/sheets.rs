use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ArchiverError;
use crate::grid::{CellRef, Dimension, RangeRef, SheetsClient, TabProperties, qualified};

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    grid_properties: Option<GridProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Clone)]
pub struct SheetsHttpClient {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsHttpClient {
    pub fn new(
        base_url: &str,
        spreadsheet_id: &str,
        access_token: &str,
    ) -> Result<Self, ArchiverError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("uptime-archiver/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ArchiverError::SheetsHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| ArchiverError::SheetsHttp(err.to_string()))?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| ArchiverError::MissingSetting(format!("sheets base url: {err}")))?;
        Ok(Self {
            client,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ArchiverError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ArchiverError::SheetsHttp("base url cannot carry a path".to_string()))?
            .extend(segments);
        Ok(url)
    }

    fn batch_url(&self) -> Result<Url, ArchiverError> {
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        self.url(&[target.as_str()])
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ArchiverError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|err| ArchiverError::SheetsHttp(err.to_string()))?;
        Self::handle_status(response)
    }

    fn handle_status(response: Response) -> Result<Response, ArchiverError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "Google Sheets request failed".to_string());
        Err(ArchiverError::SheetsStatus { status, message })
    }

    fn batch_update(&self, request: Value) -> Result<(), ArchiverError> {
        let url = self.batch_url()?;
        let body = json!({ "requests": [request] });
        debug!(%url, %body, "sheets batch update");
        self.send(self.client.post(url).json(&body))?;
        Ok(())
    }
}

impl SheetsClient for SheetsHttpClient {
    fn find_tab(&self, title: &str) -> Result<Option<TabProperties>, ArchiverError> {
        let mut url = self.url(&[self.spreadsheet_id.as_str()])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        debug!(%url, title, "sheets lookup");
        let response = self.send(self.client.get(url))?;
        let spreadsheet: SpreadsheetResponse = response
            .json()
            .map_err(|err| ArchiverError::MalformedResponse(err.to_string()))?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|entry| entry.properties)
            .find(|properties| properties.title == title)
            .map(|properties| {
                let grid = properties.grid_properties.unwrap_or(GridProperties {
                    row_count: 0,
                    column_count: 0,
                });
                TabProperties {
                    id: properties.sheet_id,
                    title: properties.title,
                    row_count: grid.row_count,
                    column_count: grid.column_count,
                }
            }))
    }

    fn create_tab(&self, title: &str) -> Result<(), ArchiverError> {
        self.batch_update(json!({
            "addSheet": { "properties": { "title": title } }
        }))
    }

    fn read_range(&self, tab: &str, range: RangeRef) -> Result<Vec<Vec<String>>, ArchiverError> {
        let a1 = qualified(tab, range);
        let url = self.url(&[self.spreadsheet_id.as_str(), "values", a1.as_str()])?;
        debug!(%url, "sheets read");
        let response = self.send(self.client.get(url))?;
        let values: ValueRange = response
            .json()
            .map_err(|err| ArchiverError::MalformedResponse(err.to_string()))?;
        Ok(values
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    fn write_cell(&self, tab: &str, cell: CellRef, value: &str) -> Result<(), ArchiverError> {
        let a1 = qualified(tab, cell);
        let mut url = self.url(&[self.spreadsheet_id.as_str(), "values", a1.as_str()])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({ "range": a1, "values": [[value]] });
        debug!(%url, value, "sheets write");
        self.send(self.client.put(url).json(&body))?;
        Ok(())
    }

    fn insert_dimension(
        &self,
        tab_id: i64,
        dimension: Dimension,
        index: usize,
    ) -> Result<(), ArchiverError> {
        self.batch_update(json!({
            "insertDimension": {
                "range": {
                    "sheetId": tab_id,
                    "dimension": dimension.as_str(),
                    "startIndex": index,
                    "endIndex": index + 1,
                },
                "inheritFromBefore": index > 0,
            }
        }))
    }

    fn append_dimension(
        &self,
        tab_id: i64,
        dimension: Dimension,
        count: usize,
    ) -> Result<(), ArchiverError> {
        self.batch_update(json!({
            "appendDimension": {
                "sheetId": tab_id,
                "dimension": dimension.as_str(),
                "length": count,
            }
        }))
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
