//! Company registry passthrough used to prefill contract forms.
//!
//! Registry outages surface as "not found" (or an empty suggestion list),
//! never as a server error.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use std::sync::Arc;

use super::{AddressResponse, ApiError, ApiResponse, AppState, DirectorResponse};
use crate::services::CompanyInfo;

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub count: Option<u32>,
}

/// GET /api/dadata/company/{inn}
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(inn): Path<String>,
) -> Result<Json<ApiResponse<CompanyInfo>>, ApiError> {
    let company = state
        .company_lookup()
        .lookup(&inn)
        .await
        .ok_or_else(|| ApiError::not_found("Company with INN", &inn))?;
    Ok(Json(ApiResponse::success(company)))
}

/// GET /api/dadata/suggest?query=&count=
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<SuggestQuery>, ApiError>,
) -> Result<Json<ApiResponse<Vec<CompanyInfo>>>, ApiError> {
    let companies = state
        .company_lookup()
        .suggest(&params.query, params.count)
        .await?;
    Ok(Json(ApiResponse::success(companies)))
}

/// GET /api/dadata/address/{inn}
pub async fn get_address(
    State(state): State<Arc<AppState>>,
    Path(inn): Path<String>,
) -> Result<Json<ApiResponse<AddressResponse>>, ApiError> {
    let address = state
        .company_lookup()
        .address(&inn)
        .await
        .ok_or_else(|| ApiError::NotFound("Address not found".to_string()))?;
    Ok(Json(ApiResponse::success(AddressResponse { address })))
}

/// GET /api/dadata/director/{inn}
pub async fn get_director(
    State(state): State<Arc<AppState>>,
    Path(inn): Path<String>,
) -> Result<Json<ApiResponse<DirectorResponse>>, ApiError> {
    let director = state
        .company_lookup()
        .director(&inn)
        .await
        .ok_or_else(|| ApiError::NotFound("Director not found".to_string()))?;
    Ok(Json(ApiResponse::success(DirectorResponse { director })))
}
