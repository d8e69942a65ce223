//! Google Sheets data source client.
//!
//! One batched `values:batchGet` request per source per cycle; the response
//! aligns positionally with the requested ranges.

use crate::error::FetchError;
use crate::value::CellNode;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Narrow interface to the tabular data source.
#[async_trait]
pub trait SheetClient: Send + Sync {
    /// Fetch all `ranges` of one worksheet in a single batched request.
    /// The returned nodes align positionally with `ranges`.
    async fn batch_fetch(
        &self,
        spreadsheet_id: &str,
        worksheet_id: &str,
        ranges: &[String],
    ) -> Result<Vec<CellNode>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub api_key: String,
    /// API endpoint, overridable for tests.
    pub base_url: String,
    /// Bounded per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://sheets.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct GoogleSheetsClient {
    client: Client,
    config: SheetsConfig,
}

impl GoogleSheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    #[serde(rename = "valueRanges", default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    /// Omitted entirely by the API when the range holds no values.
    #[serde(default)]
    values: Option<serde_json::Value>,
}

#[async_trait]
impl SheetClient for GoogleSheetsClient {
    async fn batch_fetch(
        &self,
        spreadsheet_id: &str,
        worksheet_id: &str,
        ranges: &[String],
    ) -> Result<Vec<CellNode>, FetchError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values:batchGet",
            self.config.base_url, spreadsheet_id
        );

        let mut query: Vec<(&str, String)> = vec![("key", self.config.api_key.clone())];
        for range in ranges {
            query.push(("ranges", format!("{worksheet_id}!{range}")));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Transport(format!("request timed out: {e}"))
                } else {
                    FetchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                retriable: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            });
        }

        let body: BatchGetResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Transport(format!("failed to parse response: {e}")))?;

        if body.value_ranges.len() != ranges.len() {
            return Err(FetchError::Shape {
                want: ranges.len(),
                got: body.value_ranges.len(),
            });
        }

        Ok(body
            .value_ranges
            .into_iter()
            .map(|vr| match vr.values {
                Some(values) => CellNode::from_json(&values),
                None => CellNode::empty(),
            })
            .collect())
    }
}
