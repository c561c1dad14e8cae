use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_id, validate_limit};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::Principal;
use crate::services::{ContractDraft, ContractPatch, ContractQuery, ContractStats, ContractView};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub lawyer_id: Option<i32>,
}

/// GET /contracts
///
/// Supports `skip`, `limit`, `status`, `lawyer_id` and `search`. Lawyers only
/// ever see their own contracts.
pub async fn list_contracts(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    WithRejection(Query(query), _): WithRejection<Query<ContractQuery>, ApiError>,
) -> Result<Json<ApiResponse<Vec<ContractView>>>, ApiError> {
    validate_limit(query.limit)?;
    let contracts = state.contract_service().list(&principal, query).await?;
    Ok(Json(ApiResponse::success(contracts)))
}

/// GET /contracts/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    WithRejection(Query(query), _): WithRejection<Query<StatsQuery>, ApiError>,
) -> Result<Json<ApiResponse<ContractStats>>, ApiError> {
    let stats = state
        .contract_service()
        .stats(&principal, query.lawyer_id)
        .await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// POST /contracts
pub async fn create_contract(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    WithRejection(Json(payload), _): WithRejection<Json<ContractDraft>, ApiError>,
) -> Result<Json<ApiResponse<ContractView>>, ApiError> {
    let contract = state
        .contract_service()
        .create(&principal, payload)
        .await?;
    Ok(Json(ApiResponse::success(contract)))
}

/// GET /contracts/{id}
pub async fn get_contract(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ContractView>>, ApiError> {
    let id = validate_id("contract", id)?;
    let contract = state.contract_service().get(&principal, id).await?;
    Ok(Json(ApiResponse::success(contract)))
}

/// PUT /contracts/{id}
pub async fn update_contract(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    WithRejection(Json(payload), _): WithRejection<Json<ContractPatch>, ApiError>,
) -> Result<Json<ApiResponse<ContractView>>, ApiError> {
    let id = validate_id("contract", id)?;
    let contract = state
        .contract_service()
        .update(&principal, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(contract)))
}

/// DELETE /contracts/{id}
pub async fn delete_contract(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("contract", id)?;
    state.contract_service().delete(&principal, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Contract {id} deleted"
    )))))
}
