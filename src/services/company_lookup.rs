//! Company lookup proxy in front of the external registry.
//!
//! Registry failures (network, timeouts, unexpected payloads) are logged and
//! reported as "nothing found": the lookup only prefills contract forms.

use chrono::DateTime;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::clients::dadata::{CompanyRegistry, PartySuggestion};

pub const MIN_QUERY_LEN: usize = 3;
pub const DEFAULT_SUGGEST_COUNT: u32 = 5;
const MAX_SUGGEST_COUNT: u32 = 20;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Query must be at least {MIN_QUERY_LEN} characters")]
    InvalidQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyInfo {
    pub name: String,
    pub tax_id: Option<String>,
    pub registration_id: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
    /// `YYYY-MM-DD`
    pub registration_date: Option<String>,
    pub director: Option<String>,
    pub director_title: Option<String>,
    pub industry_code: Option<String>,
    pub industry_name: Option<String>,
}

impl From<PartySuggestion> for CompanyInfo {
    fn from(party: PartySuggestion) -> Self {
        let data = party.data;

        let (status, registration_date) = data.state.map_or((None, None), |state| {
            let date = state
                .registration_date
                .and_then(DateTime::from_timestamp_millis)
                .map(|d| d.format("%Y-%m-%d").to_string());
            (state.status, date)
        });

        let (director, director_title) = data
            .management
            .map_or((None, None), |m| (m.name, m.post));

        let main_okved = data
            .okveds
            .unwrap_or_default()
            .into_iter()
            .find(|o| o.main);

        Self {
            name: party.value,
            tax_id: data.inn,
            registration_id: data.ogrn,
            address: data.address.and_then(|a| a.value),
            status,
            registration_date,
            director,
            director_title,
            industry_code: data
                .okved
                .or_else(|| main_okved.as_ref().and_then(|o| o.code.clone())),
            industry_name: main_okved.and_then(|o| o.name),
        }
    }
}

#[derive(Clone)]
pub struct CompanyLookupService {
    registry: Arc<dyn CompanyRegistry>,
}

impl CompanyLookupService {
    #[must_use]
    pub fn new(registry: Arc<dyn CompanyRegistry>) -> Self {
        Self { registry }
    }

    pub async fn lookup(&self, tax_id: &str) -> Option<CompanyInfo> {
        let tax_id = tax_id.trim();
        if tax_id.is_empty() {
            return None;
        }

        match self.registry.find_by_tax_id(tax_id).await {
            Ok(party) => party.map(CompanyInfo::from),
            Err(e) => {
                warn!(tax_id, error = %e, "Company registry lookup failed");
                None
            }
        }
    }

    /// Autocomplete by name or tax id fragment. `count` is clamped to 1..=20.
    pub async fn suggest(
        &self,
        query: &str,
        count: Option<u32>,
    ) -> Result<Vec<CompanyInfo>, LookupError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(LookupError::InvalidQuery);
        }

        let count = count
            .unwrap_or(DEFAULT_SUGGEST_COUNT)
            .clamp(1, MAX_SUGGEST_COUNT);

        match self.registry.suggest(query, count).await {
            Ok(parties) => Ok(parties.into_iter().map(CompanyInfo::from).collect()),
            Err(e) => {
                warn!(query, error = %e, "Company registry suggest failed");
                Ok(vec![])
            }
        }
    }

    pub async fn address(&self, tax_id: &str) -> Option<String> {
        self.lookup(tax_id).await.and_then(|c| c.address)
    }

    pub async fn director(&self, tax_id: &str) -> Option<String> {
        self.lookup(tax_id).await.and_then(|c| c.director)
    }
}
