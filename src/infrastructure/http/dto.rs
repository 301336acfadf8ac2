//! Wire formats for the shortening API.

use crate::domain::entities::{HistoryItem, HistoryPage};
use crate::error::{ClientError, ClientResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

/// Body of `POST /shorten`.
#[derive(Debug, Serialize)]
pub struct ShortenBody<'a> {
    pub long_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

/// Body of `POST /bulk-shorten`.
#[derive(Debug, Serialize)]
pub struct BulkShortenBody {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

/// Body of `POST /history`.
#[derive(Debug, Serialize)]
pub struct HistoryBody {
    pub page: u32,
    pub limit: u32,
}

/// Common response envelope: `{success, data?, results?, error?, message?}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    pub results: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl<T> Envelope<T> {
    /// Extracts the payload, preferring `data` over `results`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] when `success` is false
    /// - [`ClientError::Decode`] when neither `data` nor `results` is present
    pub fn into_payload(self, status: u16) -> ClientResult<T> {
        if !self.success {
            let message = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "Request was not successful".to_string());
            return Err(ClientError::api(status, message));
        }

        self.data
            .or(self.results)
            .ok_or_else(|| ClientError::decode("response contains no data"))
    }
}

/// Body of a non-success response, when the server sends one.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    /// Server-provided message, if any.
    pub fn parse_message(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .message
            .or(parsed.error)
            .filter(|message| !message.trim().is_empty())
    }
}

/// History payload: either paged metadata or a bare item list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    Paged(PagedHistory),
    Bare(Vec<HistoryItem>),
}

/// Totals may arrive as numbers or numeric strings.
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedHistory {
    #[serde(default)]
    pub data: Vec<HistoryItem>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub total_pages: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub total_items: u64,
}

impl From<HistoryPayload> for HistoryPage {
    fn from(payload: HistoryPayload) -> Self {
        match payload {
            HistoryPayload::Paged(paged) => {
                HistoryPage::new(paged.data, paged.total_pages, paged.total_items)
            }
            HistoryPayload::Bare(items) => {
                let total = items.len() as u64;
                HistoryPage::new(items, 1, total)
            }
        }
    }
}
