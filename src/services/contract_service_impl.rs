//! `SeaORM` implementation of the `ContractService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::info;

use crate::db::{NewContract, Store};
use crate::domain::{ChangeSet, ContractStatus, HistoryEntry, Principal, derive_status};
use crate::services::contract_service::{
    ContractDraft, ContractError, ContractPatch, ContractQuery, ContractService, ContractStats,
    ContractView, StatusCounts,
};
use crate::services::policy::{self, Forbidden};
use crate::services::status_sync;
use crate::services::validation;

pub struct SeaOrmContractService {
    store: Store,
}

impl SeaOrmContractService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn parse_status(raw: &str) -> Result<ContractStatus, ContractError> {
        ContractStatus::parse(raw).ok_or_else(|| ContractError::InvalidStatus(raw.to_string()))
    }

    async fn ensure_lawyer_exists(&self, lawyer_id: i32) -> Result<(), ContractError> {
        if self.store.user_exists(lawyer_id).await? {
            Ok(())
        } else {
            Err(ContractError::LawyerNotFound(lawyer_id))
        }
    }

    async fn ensure_inn_free(&self, inn: &str) -> Result<(), ContractError> {
        if self.store.get_contract_by_inn(inn).await?.is_some() {
            Err(ContractError::DuplicateTaxId(inn.to_string()))
        } else {
            Ok(())
        }
    }
}

fn validate_draft(draft: &ContractDraft) -> Result<(), String> {
    validation::company_name(&draft.company_name)?;
    validation::inn(&draft.inn)?;
    validation::director(&draft.director)?;
    validation::address(&draft.address)
}

fn validate_patch(patch: &ContractPatch) -> Result<(), String> {
    if let Some(v) = &patch.company_name {
        validation::company_name(v)?;
    }
    if let Some(v) = &patch.inn {
        validation::inn(v)?;
    }
    if let Some(v) = &patch.director {
        validation::director(v)?;
    }
    if let Some(v) = &patch.address {
        validation::address(v)?;
    }
    Ok(())
}

fn matches_search(view: &ContractView, needle: &str) -> bool {
    let c = &view.contract;
    [&c.company_name, &c.inn, &c.director, &c.address]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl ContractService for SeaOrmContractService {
    async fn list(
        &self,
        caller: &Principal,
        query: ContractQuery,
    ) -> Result<Vec<ContractView>, ContractError> {
        let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(Self::parse_status(raw)?),
            None => None,
        };
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let owner = policy::visible_owner(caller, query.lawyer_id);
        let records = self.store.list_contracts(owner).await?;
        let views = status_sync::observe(&self.store, records, Utc::now()).await?;

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        Ok(views
            .into_iter()
            .filter(|v| status.is_none_or(|s| v.status == s))
            .filter(|v| needle.as_deref().is_none_or(|n| matches_search(v, n)))
            .skip(skip)
            .take(limit)
            .collect())
    }

    async fn get(&self, caller: &Principal, id: i32) -> Result<ContractView, ContractError> {
        let record = self
            .store
            .get_contract(id)
            .await?
            .ok_or(ContractError::NotFound(id))?;

        policy::owner_or_admin(caller, record.lawyer_id)?;

        Ok(status_sync::observe_one(&self.store, record, Utc::now()).await?)
    }

    async fn create(
        &self,
        caller: &Principal,
        draft: ContractDraft,
    ) -> Result<ContractView, ContractError> {
        validate_draft(&draft).map_err(ContractError::Validation)?;

        self.ensure_inn_free(&draft.inn).await?;

        let lawyer_id = draft.lawyer_id.unwrap_or(caller.id);
        if lawyer_id != caller.id {
            if !caller.is_admin() {
                return Err(Forbidden("Cannot create a contract for another lawyer").into());
            }
            self.ensure_lawyer_exists(lawyer_id).await?;
        }

        let now = Utc::now();
        let info = derive_status(draft.end_date, now);

        let record = self
            .store
            .insert_contract(NewContract {
                company_name: draft.company_name,
                inn: draft.inn,
                director: draft.director,
                address: draft.address,
                end_date: draft.end_date,
                status: info.status,
                comments: draft.comments,
                has_nd: draft.has_nd,
                history: vec![HistoryEntry::created(caller, now)],
                lawyer_id,
            })
            .await?;

        info!(
            contract_id = record.id,
            inn = %record.inn,
            lawyer_id,
            by = caller.id,
            "Contract created"
        );

        Ok(ContractView::new(record, info))
    }

    async fn update(
        &self,
        caller: &Principal,
        id: i32,
        patch: ContractPatch,
    ) -> Result<ContractView, ContractError> {
        let record = self
            .store
            .get_contract(id)
            .await?
            .ok_or(ContractError::NotFound(id))?;

        policy::owner_or_admin(caller, record.lawyer_id)?;

        if let Some(raw) = patch.status.as_deref() {
            Self::parse_status(raw)?;
        }
        validate_patch(&patch).map_err(ContractError::Validation)?;

        let now = Utc::now();
        let mut next = record.clone();
        let mut changes = ChangeSet::new();

        if let Some(v) = patch.company_name
            && changes.record("company_name", &next.company_name, &v)
        {
            next.company_name = v;
        }
        if let Some(v) = patch.inn
            && changes.record("inn", &next.inn, &v)
        {
            next.inn = v;
        }
        if let Some(v) = patch.director
            && changes.record("director", &next.director, &v)
        {
            next.director = v;
        }
        if let Some(v) = patch.address
            && changes.record("address", &next.address, &v)
        {
            next.address = v;
        }
        if let Some(v) = patch.end_date
            && changes.record("end_date", &next.end_date, &v)
        {
            next.end_date = v;
        }
        if let Some(v) = patch.comments
            && changes.record("comments", &next.comments, &v)
        {
            next.comments = v;
        }
        if let Some(v) = patch.has_nd
            && changes.record("has_nd", &next.has_nd, &v)
        {
            next.has_nd = v;
        }
        if let Some(v) = patch.lawyer_id
            && changes.record("lawyer_id", &next.lawyer_id, &v)
        {
            next.lawyer_id = v;
        }

        if changes.is_empty() {
            return Ok(status_sync::observe_one(&self.store, record, now).await?);
        }

        if changes.contains("inn") {
            self.ensure_inn_free(&next.inn).await?;
        }
        if changes.contains("lawyer_id") {
            if !caller.is_admin() {
                return Err(Forbidden("Only administrators can reassign contracts").into());
            }
            self.ensure_lawyer_exists(next.lawyer_id).await?;
        }

        let info = derive_status(next.end_date, now);
        next.status = Some(info.status);
        next.updated_at = now;

        let changed = changes.len();
        next.history.push(HistoryEntry::updated(caller, changes, now));

        self.store.save_contract(&next).await?;

        info!(contract_id = id, changed, by = caller.id, "Contract updated");
        Ok(ContractView::new(next, info))
    }

    async fn delete(&self, caller: &Principal, id: i32) -> Result<(), ContractError> {
        policy::require_admin(caller)?;

        if !self.store.delete_contract(id).await? {
            return Err(ContractError::NotFound(id));
        }

        info!(contract_id = id, by = caller.id, "Contract deleted");
        Ok(())
    }

    async fn stats(
        &self,
        caller: &Principal,
        lawyer_id: Option<i32>,
    ) -> Result<ContractStats, ContractError> {
        let owner = policy::visible_owner(caller, lawyer_id);
        let records = self.store.list_contracts(owner).await?;
        let views = status_sync::observe(&self.store, records, Utc::now()).await?;

        let counts: StatusCounts = views.iter().collect();

        let per_lawyer = if owner.is_none() {
            let mut per_lawyer = BTreeMap::new();
            for user in self.store.list_all_users().await? {
                let owned: StatusCounts = views
                    .iter()
                    .filter(|v| v.contract.lawyer_id == user.id)
                    .collect();
                per_lawyer.insert(user.username, owned);
            }
            Some(per_lawyer)
        } else {
            None
        };

        Ok(ContractStats { counts, per_lawyer })
    }
}
