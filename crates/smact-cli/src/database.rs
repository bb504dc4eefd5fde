use crate::error::{CliError, Result};
use reqwest::{Client, Request};
use serde::Deserialize;
use smactpp::core::io::records::MaterialRecord;
use tracing::{debug, info};

const SUMMARY_ENDPOINT: &str = "materials/summary/";
const SUMMARY_FIELDS: &str = "material_id,formula_pretty,energy_above_hull,band_gap,theoretical";
const API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    data: Vec<MaterialRecord>,
}

/// Minimal client for the Materials Project summary endpoint.
#[derive(Debug, Clone)]
pub struct MaterialsProjectClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MaterialsProjectClient {
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn build_request(&self, formula: &str) -> Result<Request> {
        let url = format!("{}/{}", self.base_url, SUMMARY_ENDPOINT);
        let request = self
            .client
            .get(url)
            .query(&[("formula", formula), ("_fields", SUMMARY_FIELDS)])
            .header(API_KEY_HEADER, &self.api_key)
            .build()?;
        Ok(request)
    }

    /// Fetches every summary document for `formula`. HTTP error statuses are returned as
    /// errors; an undecodable body is a `CliError::Database`.
    pub async fn fetch_formula(&self, formula: &str) -> Result<Vec<MaterialRecord>> {
        let request = self.build_request(formula)?;
        debug!(url = %request.url(), "Querying Materials Project.");
        let body = self
            .client
            .execute(request)
            .await?
            .error_for_status()?
            .text()
            .await?;
        let records = parse_summary(&body)
            .map_err(|e| CliError::Database(format!("response for '{}': {}", formula, e)))?;
        info!(formula, count = records.len(), "Received records.");
        Ok(records)
    }
}

/// Decodes a summary response body of the form `{"data": [...]}`.
pub fn parse_summary(body: &str) -> std::result::Result<Vec<MaterialRecord>, serde_json::Error> {
    serde_json::from_str::<SummaryResponse>(body).map(|r| r.data)
}
