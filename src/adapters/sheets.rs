//! Google Sheets v4 REST sink for a single worksheet.

use crate::adapters::google_auth::TokenProvider;
use crate::adapters::http::{read_json, transport_error};
use crate::domain::model::{FormatRule, Row, RowStyle};
use crate::domain::ports::SheetSink;
use crate::utils::error::{Result, SyncError};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

const SHEETS_SERVICE: &str = "Google Sheets";
const FORMAT_FIELDS: &str = "userEnteredFormat(backgroundColor,textFormat)";

#[derive(Debug, Clone, Copy, Serialize)]
struct Color {
    red: f64,
    green: f64,
    blue: f64,
}

const HEADER_BACKGROUND: Color = Color { red: 0.8, green: 0.8, blue: 0.8 };
const HIGHLIGHT_BACKGROUND: Color = Color { red: 1.0, green: 1.0, blue: 0.8 };

/// Quotes a worksheet title for A1 notation (`It's` -> `'It''s'`).
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

pub struct GoogleSheetsClient<A: TokenProvider> {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    worksheet_id: i64,
    auth: A,
    title: OnceCell<String>,
}

impl<A: TokenProvider> GoogleSheetsClient<A> {
    pub fn new(
        base_url: &str,
        spreadsheet_id: impl Into<String>,
        worksheet_id: i64,
        auth: A,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| SyncError::InvalidConfigValueError {
            field: "sheets.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::ConfigError {
                message: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            worksheet_id,
            auth,
            title: OnceCell::new(),
        })
    }

    /// `/v4/spreadsheets/` followed by `tail`, each segment percent-encoded.
    fn endpoint(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidConfigValueError {
                field: "sheets.base_url".to_string(),
                value: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(tail);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.auth.access_token().await?;
        tracing::debug!("{} {}", method, url);
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    /// The Sheets API answers 401/403/404 when the service account was never
    /// given access or the ids are wrong; those are configuration problems.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(SHEETS_SERVICE, e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::ConfigError {
                message: format!(
                    "service account has no write access to spreadsheet {} (HTTP {})",
                    self.spreadsheet_id,
                    response.status().as_u16()
                ),
            }),
            StatusCode::NOT_FOUND => Err(SyncError::ConfigError {
                message: format!("spreadsheet {} not found", self.spreadsheet_id),
            }),
            _ => read_json(SHEETS_SERVICE, response).await,
        }
    }

    /// Title of the configured worksheet, looked up once by numeric id.
    pub async fn sheet_title(&self) -> Result<&str> {
        self.title
            .get_or_try_init(|| async {
                let mut url = self.endpoint(&[self.spreadsheet_id.as_str()])?;
                url.query_pairs_mut()
                    .append_pair("fields", "sheets.properties(sheetId,title)");
                let request = self.request(Method::GET, url).await?;
                let spreadsheet: SpreadsheetProperties = self.send(request).await?;

                spreadsheet
                    .sheets
                    .into_iter()
                    .map(|s| s.properties)
                    .find(|p| p.sheet_id == self.worksheet_id)
                    .map(|p| p.title)
                    .ok_or_else(|| SyncError::ConfigError {
                        message: format!(
                            "worksheet {} not found in spreadsheet {}",
                            self.worksheet_id, self.spreadsheet_id
                        ),
                    })
            })
            .await
            .map(String::as_str)
    }

    fn repeat_cell(&self, rule: &FormatRule) -> serde_json::Value {
        let mut range = json!({
            "sheetId": self.worksheet_id,
            "startColumnIndex": 0,
            "endColumnIndex": Row::HEADERS.len(),
        });
        if let Some((start, end)) = rule.rows {
            range["startRowIndex"] = json!(start);
            range["endRowIndex"] = json!(end);
        }

        let format = match rule.style {
            RowStyle::Plain => json!({}),
            RowStyle::Header => json!({
                "backgroundColor": HEADER_BACKGROUND,
                "textFormat": {"bold": true},
            }),
            RowStyle::Highlight => json!({"backgroundColor": HIGHLIGHT_BACKGROUND}),
        };

        json!({
            "repeatCell": {
                "range": range,
                "cell": {"userEnteredFormat": format},
                "fields": FORMAT_FIELDS,
            }
        })
    }
}

impl<A: TokenProvider> SheetSink for GoogleSheetsClient<A> {
    async fn clear(&self) -> Result<()> {
        let range = quote_sheet_title(self.sheet_title().await?);
        let clear_range = format!("{}:clear", range);
        let url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", clear_range.as_str()])?;
        let request = self.request(Method::POST, url).await?.json(&json!({}));
        let _: serde_json::Value = self.send(request).await?;
        tracing::debug!("Cleared {}", range);
        Ok(())
    }

    async fn write_values(&self, values: &[Vec<String>]) -> Result<()> {
        let range = format!("{}!A1", quote_sheet_title(self.sheet_title().await?));
        let mut url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });
        let request = self.request(Method::PUT, url).await?.json(&body);
        let response: UpdateValuesResponse = self.send(request).await?;
        tracing::debug!(
            "Sheets reported {} updated rows",
            response.updated_rows.unwrap_or_default()
        );
        Ok(())
    }

    async fn apply_formats(&self, formats: &[FormatRule]) -> Result<()> {
        if formats.is_empty() {
            return Ok(());
        }
        let requests: Vec<serde_json::Value> = formats.iter().map(|f| self.repeat_cell(f)).collect();
        let batch_update = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.endpoint(&[batch_update.as_str()])?;
        let request = self
            .request(Method::POST, url)
            .await?
            .json(&json!({ "requests": requests }));
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "spreadsheet {} (worksheet {})",
            self.spreadsheet_id, self.worksheet_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
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
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_rows: Option<u64>,
}
