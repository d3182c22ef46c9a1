//! Thin client for the Airtable table holding testimonial rows.
//!
//! Every call checks the response status and reports failures with the HTTP
//! status and body. Nothing here retries.

use std::time::Duration;

use anyhow::{Context, Result};
use folio_shared::{NewTestimonial, TestimonialFields, TestimonialRecord};
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::RowStoreConfig;

/// Page cap used by every listing in this service.
pub const LIST_LIMIT: u32 = 100;

#[derive(Debug, Error)]
pub enum RowStoreError {
    #[error("row store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("row store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("row store response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<Value>,
}

/// Acknowledgement returned for a deleted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRecord {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    api_base: String,
    base_id: String,
    api_key: String,
    table_name: String,
}

impl AirtableClient {
    pub fn new(config: &RowStoreConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build row store HTTP client")?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            base_id: config.base_id.clone(),
            api_key: config.api_key.clone(),
            table_name: config.table_name.clone(),
        })
    }

    pub fn table_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.api_base,
            urlencoding::encode(&self.base_id),
            urlencoding::encode(&self.table_name)
        )
    }

    pub fn record_url(&self, record_id: &str) -> String {
        format!("{}/{}", self.table_url(), urlencoding::encode(record_id))
    }

    pub async fn list_records(
        &self,
        max_records: Option<u32>,
    ) -> Result<Vec<TestimonialRecord>, RowStoreError> {
        let mut request = self.request(Method::GET, self.table_url());
        if let Some(max_records) = max_records {
            request = request.query(&[("maxRecords", max_records)]);
        }
        let page: ListResponse = self.send(request).await?;
        Ok(decode_rows(page.records))
    }

    /// Insert a row holding exactly the five submitted cells.
    pub async fn create_record(
        &self,
        row: &NewTestimonial,
    ) -> Result<TestimonialRecord, RowStoreError> {
        let request = self
            .request(Method::POST, self.table_url())
            .json(&json!({ "fields": row }));
        self.send(request).await
    }

    /// Overwrite only the cells set in `fields`.
    pub async fn update_fields(
        &self,
        record_id: &str,
        fields: &TestimonialFields,
    ) -> Result<TestimonialRecord, RowStoreError> {
        let request = self
            .request(Method::PATCH, self.record_url(record_id))
            .json(&json!({ "fields": fields }));
        self.send(request).await
    }

    pub async fn delete_record(&self, record_id: &str) -> Result<DeletedRecord, RowStoreError> {
        let request = self.request(Method::DELETE, self.record_url(record_id));
        self.send(request).await
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RowStoreError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RowStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|err| RowStoreError::Decode(err.to_string()))
    }
}

/// Decode listed rows one by one; a row that cannot be read is logged and
/// left out so it does not hide the rest of the table.
fn decode_rows(rows: Vec<Value>) -> Vec<TestimonialRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").and_then(Value::as_str).unwrap_or("?").to_string();
            match serde_json::from_value::<TestimonialRecord>(row) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!("skipping unreadable row store record {id}: {err}");
                    None
                },
            }
        })
        .collect()
}
