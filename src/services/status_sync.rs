//! Self-healing of stored contract status.
//!
//! Status is persisted but derived from `end_date`. Whenever contracts are
//! read, the derived value is compared to the stored one and stale rows are
//! corrected in place before being handed back. There is no background job.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::db::{ContractRecord, Store};
use crate::domain::{ContractStatus, derive_status};
use crate::services::contract_service::ContractView;

/// Derives the status of every record, persists corrections, and returns views.
pub async fn observe(
    store: &Store,
    records: Vec<ContractRecord>,
    now: DateTime<Utc>,
) -> Result<Vec<ContractView>> {
    let mut stale: HashMap<ContractStatus, Vec<i32>> = HashMap::new();

    let views: Vec<ContractView> = records
        .into_iter()
        .map(|record| {
            let info = derive_status(record.end_date, now);
            if record.status != Some(info.status) {
                stale.entry(info.status).or_default().push(record.id);
            }
            ContractView::new(record, info)
        })
        .collect();

    for (status, ids) in stale {
        let corrected = store.set_contract_status(&ids, status).await?;
        debug!(?ids, %status, corrected, "Corrected stale contract status");
    }

    Ok(views)
}

pub async fn observe_one(
    store: &Store,
    record: ContractRecord,
    now: DateTime<Utc>,
) -> Result<ContractView> {
    let mut views = observe(store, vec![record], now).await?;
    views
        .pop()
        .ok_or_else(|| anyhow::anyhow!("Status observation returned no contract"))
}
