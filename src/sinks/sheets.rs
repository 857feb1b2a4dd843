use crate::error::SinkError;
use crate::models::{Card, HEADER};
use crate::sinks::auth::{ServiceAccountKey, SHEETS_SCOPE};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Where the sheet sink writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    /// Worksheet (tab) title
    pub worksheet: String,
    /// Path to the service-account JSON key
    pub credential_path: PathBuf,
}

/// The few spreadsheet operations the sink relies on
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Titles of every worksheet in the spreadsheet
    async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SinkError>;

    /// Remove all values from a worksheet
    async fn clear(&self, spreadsheet_id: &str, worksheet: &str) -> Result<(), SinkError>;

    /// Append rows after the last non-empty row of a worksheet
    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), SinkError>;
}

/// Replace the content of a worksheet with a header row and one row per card.
///
/// The worksheet must already exist. Nothing is retried.
pub async fn write_sheet<A: SheetsApi + ?Sized>(
    api: &A,
    spreadsheet_id: &str,
    worksheet: &str,
    cards: &[Card],
) -> Result<(), SinkError> {
    let titles = api.worksheet_titles(spreadsheet_id).await?;
    if !titles.iter().any(|t| t == worksheet) {
        return Err(SinkError::Api(format!(
            "worksheet {worksheet:?} not found in spreadsheet {spreadsheet_id}"
        )));
    }

    api.clear(spreadsheet_id, worksheet).await?;

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(cards.len() + 1);
    rows.push(HEADER.iter().map(|h| Value::from(*h)).collect());
    rows.extend(cards.iter().map(Card::to_sheet_row));
    api.append_rows(spreadsheet_id, worksheet, rows).await?;

    info!(
        "📤 Uploaded {} cards to spreadsheet {} ({})",
        cards.len(),
        spreadsheet_id,
        worksheet
    );
    Ok(())
}

/// Authenticate with the target's service account and write the cards.
pub async fn upload(target: &SheetTarget, cards: &[Card], timeout: Duration) -> Result<(), SinkError> {
    let api = GoogleSheetsClient::connect(&target.credential_path, timeout).await?;
    write_sheet(&api, &target.spreadsheet_id, &target.worksheet, cards).await
}

/// Google Sheets v4 REST client authenticated with a bearer token
pub struct GoogleSheetsClient {
    client: Client,
    base: Url,
    access_token: String,
}

impl GoogleSheetsClient {
    /// Read the service-account key and exchange it for an access token.
    pub async fn connect(credential_path: &Path, timeout: Duration) -> Result<Self, SinkError> {
        let key = ServiceAccountKey::from_file(credential_path).await?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Api(format!("failed to build HTTP client: {e}")))?;

        let access_token = key.fetch_access_token(&client, SHEETS_SCOPE).await?;
        info!("Authenticated as {}", key.client_email);

        Self::with_token(client, access_token)
    }

    pub fn with_token(client: Client, access_token: String) -> Result<Self, SinkError> {
        let base = Url::parse(SHEETS_API_BASE)
            .map_err(|e| SinkError::Api(format!("bad API base URL: {e}")))?;
        Ok(Self {
            client,
            base,
            access_token,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SinkError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SinkError::Api(format!("cannot extend API URL {}", self.base)))?
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str, action: &str) -> Result<Url, SinkError> {
        self.url(&[spreadsheet_id, "values", &format!("{range}:{action}")])
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, SinkError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SinkError::Api(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = format!("{status}: {body}");
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SinkError::Auth(message)),
            _ => Err(SinkError::Api(message)),
        }
    }
}

/// A1 range covering a whole worksheet, quoting the title.
fn sheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SinkError> {
        let mut url = self.url(&[spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let meta: SpreadsheetMeta = self
            .send(self.client.get(url))
            .await?
            .json()
            .await
            .map_err(|e| SinkError::Api(format!("unexpected spreadsheet metadata: {e}")))?;

        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn clear(&self, spreadsheet_id: &str, worksheet: &str) -> Result<(), SinkError> {
        let url = self.values_url(spreadsheet_id, &sheet_range(worksheet), "clear")?;
        debug!("Clearing {}", url);
        self.send(self.client.post(url).json(&json!({}))).await?;
        Ok(())
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), SinkError> {
        let range = format!("{}!A1", sheet_range(worksheet));
        let mut url = self.values_url(spreadsheet_id, &range, "append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        debug!("Appending {} rows to {}", rows.len(), worksheet);
        let body = json!({ "majorDimension": "ROWS", "values": rows });
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }
}
