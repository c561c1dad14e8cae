use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::RegistryConfig;

/// One party (legal entity) record as returned by the registry.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PartySuggestion {
    /// Display name, usually the short name with legal form
    pub value: String,
    #[serde(default)]
    pub unrestricted_value: Option<String>,
    #[serde(default)]
    pub data: PartyData,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PartyData {
    #[serde(default)]
    pub inn: Option<String>,
    #[serde(default)]
    pub kpp: Option<String>,
    #[serde(default)]
    pub ogrn: Option<String>,
    #[serde(default)]
    pub address: Option<PartyAddress>,
    #[serde(default)]
    pub state: Option<PartyState>,
    #[serde(default)]
    pub management: Option<PartyManagement>,
    #[serde(default)]
    pub okved: Option<String>,
    #[serde(default)]
    pub okveds: Option<Vec<PartyOkved>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PartyAddress {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PartyState {
    /// `ACTIVE`, `LIQUIDATING`, `LIQUIDATED`, ...
    #[serde(default)]
    pub status: Option<String>,
    /// Unix time in milliseconds
    #[serde(default)]
    pub registration_date: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PartyManagement {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub post: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PartyOkved {
    #[serde(default)]
    pub main: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionsResponse {
    #[serde(default)]
    suggestions: Vec<PartySuggestion>,
}

#[derive(Debug, Serialize)]
struct PartyQuery<'a> {
    query: &'a str,
    count: u32,
}

/// A company registry that can be searched by tax id or by name fragment.
#[async_trait]
pub trait CompanyRegistry: Send + Sync {
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<PartySuggestion>>;

    async fn suggest(&self, query: &str, count: u32) -> Result<Vec<PartySuggestion>>;
}

/// DaData suggestions API client.
#[derive(Clone)]
pub struct DadataClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_key: Option<String>,
}

impl DadataClient {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("ContractDesk/1.0")
            .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
            .build()
            .context("Failed to build registry HTTP client")?;

        let base_url = url::Url::parse(&config.base_url)
            .with_context(|| format!("Invalid registry base URL: {}", config.base_url))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            secret_key: Some(config.secret_key.clone()).filter(|s| !s.is_empty()),
        })
    }

    async fn post_party(
        &self,
        endpoint: &str,
        query: &str,
        count: u32,
    ) -> Result<Vec<PartySuggestion>> {
        let url = format!("{}/{endpoint}/party", self.base_url);

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Accept", "application/json")
            .json(&PartyQuery { query, count });

        if let Some(secret) = &self.secret_key {
            request = request.header("X-Secret", secret);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Registry request to {endpoint} failed"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Registry {endpoint} returned {status}: {body}");
        }

        let body: SuggestionsResponse = response
            .json()
            .await
            .with_context(|| format!("Unexpected registry {endpoint} response"))?;

        debug!(endpoint, results = body.suggestions.len(), "Registry responded");
        Ok(body.suggestions)
    }
}

#[async_trait]
impl CompanyRegistry for DadataClient {
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Option<PartySuggestion>> {
        let results = self.post_party("findById", tax_id, 1).await?;
        Ok(results.into_iter().next())
    }

    async fn suggest(&self, query: &str, count: u32) -> Result<Vec<PartySuggestion>> {
        self.post_party("suggest", query, count).await
    }
}
