use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use serde::Serialize;
use tracing::warn;

use crate::domain::{ContractStatus, HistoryEntry};
use crate::entities::contracts;

/// A stored contract with its history decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractRecord {
    pub id: i32,
    pub company_name: String,
    pub inn: String,
    pub director: String,
    pub address: String,
    pub end_date: DateTime<Utc>,
    /// Last stored status; `None` if the column holds something unrecognised.
    #[serde(skip)]
    pub status: Option<ContractStatus>,
    pub comments: Option<String>,
    pub has_nd: bool,
    pub history: Vec<HistoryEntry>,
    pub lawyer_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<contracts::Model> for ContractRecord {
    type Error = anyhow::Error;

    fn try_from(model: contracts::Model) -> Result<Self> {
        let history: Vec<HistoryEntry> = serde_json::from_value(model.history)
            .with_context(|| format!("Malformed history on contract {}", model.id))?;

        let status = ContractStatus::parse(&model.status);
        if status.is_none() {
            warn!(contract_id = model.id, status = %model.status, "Unknown stored contract status");
        }

        Ok(Self {
            id: model.id,
            company_name: model.company_name,
            inn: model.inn,
            director: model.director,
            address: model.address,
            end_date: model.end_date,
            status,
            comments: model.comments,
            has_nd: model.has_nd,
            history,
            lawyer_id: model.lawyer_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Fields for a contract about to be inserted.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub company_name: String,
    pub inn: String,
    pub director: String,
    pub address: String,
    pub end_date: DateTime<Utc>,
    pub status: ContractStatus,
    pub comments: Option<String>,
    pub has_nd: bool,
    pub history: Vec<HistoryEntry>,
    pub lawyer_id: i32,
}

pub struct ContractRepository {
    conn: DatabaseConnection,
}

impl ContractRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn history_json(history: &[HistoryEntry]) -> Result<serde_json::Value> {
        serde_json::to_value(history).context("Failed to serialize contract history")
    }

    pub async fn get(&self, id: i32) -> Result<Option<ContractRecord>> {
        contracts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query contract by ID")?
            .map(ContractRecord::try_from)
            .transpose()
    }

    pub async fn get_by_inn(&self, inn: &str) -> Result<Option<ContractRecord>> {
        contracts::Entity::find()
            .filter(contracts::Column::Inn.eq(inn))
            .one(&self.conn)
            .await
            .context("Failed to query contract by INN")?
            .map(ContractRecord::try_from)
            .transpose()
    }

    /// All contracts, or only those owned by `owner`, ordered by id.
    pub async fn list(&self, owner: Option<i32>) -> Result<Vec<ContractRecord>> {
        let mut query = contracts::Entity::find();
        if let Some(owner) = owner {
            query = query.filter(contracts::Column::LawyerId.eq(owner));
        }

        query
            .order_by_asc(contracts::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list contracts")?
            .into_iter()
            .map(ContractRecord::try_from)
            .collect()
    }

    pub async fn insert(&self, contract: NewContract) -> Result<ContractRecord> {
        let now = Utc::now();

        let active = contracts::ActiveModel {
            company_name: Set(contract.company_name),
            inn: Set(contract.inn.clone()),
            director: Set(contract.director),
            address: Set(contract.address),
            end_date: Set(contract.end_date),
            status: Set(contract.status.as_str().to_string()),
            comments: Set(contract.comments),
            has_nd: Set(contract.has_nd),
            history: Set(Self::history_json(&contract.history)?),
            lawyer_id: Set(contract.lawyer_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to insert contract for INN {}", contract.inn))?;

        ContractRecord::try_from(model)
    }

    /// Writes every mutable column of `contract` back.
    pub async fn save(&self, contract: &ContractRecord) -> Result<()> {
        let status = contract
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();

        let active = contracts::ActiveModel {
            id: Set(contract.id),
            company_name: Set(contract.company_name.clone()),
            inn: Set(contract.inn.clone()),
            director: Set(contract.director.clone()),
            address: Set(contract.address.clone()),
            end_date: Set(contract.end_date),
            status: Set(status),
            comments: Set(contract.comments.clone()),
            has_nd: Set(contract.has_nd),
            history: Set(Self::history_json(&contract.history)?),
            lawyer_id: Set(contract.lawyer_id),
            created_at: Set(contract.created_at),
            updated_at: Set(contract.updated_at),
        };

        active
            .update(&self.conn)
            .await
            .with_context(|| format!("Failed to save contract {}", contract.id))?;

        Ok(())
    }

    /// Corrects the stored status of `ids`. Leaves `updated_at` and history alone.
    pub async fn set_status(&self, ids: &[i32], status: ContractStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = contracts::Entity::update_many()
            .col_expr(contracts::Column::Status, Expr::value(status.as_str()))
            .filter(contracts::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.conn)
            .await
            .context("Failed to correct contract status")?;

        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = contracts::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete contract")?;

        Ok(result.rows_affected > 0)
    }
}
