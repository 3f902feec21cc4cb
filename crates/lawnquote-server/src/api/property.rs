//! Property validation and full analysis.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use lawnquote_core::ProviderKind;
use lawnquote_providers::{AnalysisRequest, PropertyAnalysis, PropertyValidation};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{json_body, map_analysis_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ValidateRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeRequest {
    pub address: Option<String>,
    pub address_id: Option<String>,
    pub provider: Option<ProviderKind>,
}

/// POST /api/v1/property/validate
pub(super) async fn validate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PropertyValidation>>, ApiError> {
    let body = json_body(&req_id.0, body)?;
    let (Some(lat), Some(lng)) = (body.lat, body.lng) else {
        return Err(ApiError::new(
            &req_id.0,
            "validation_error",
            "Coordinates required",
        ));
    };

    let result = state
        .analyzer
        .validate_property(lat, lng, body.address.as_deref())
        .await
        .map_err(|e| map_analysis_error(&req_id.0, &e))?;

    Ok(ApiResponse::new(result, req_id))
}

/// POST /api/v1/property/analyze
pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PropertyAnalysis>>, ApiError> {
    let body = json_body(&req_id.0, body)?;
    let request = AnalysisRequest {
        address: body.address,
        handle: body.address_id,
        provider: body.provider,
    };

    let analysis = state
        .analyzer
        .analyze(&request)
        .await
        .map_err(|e| map_analysis_error(&req_id.0, &e))?;

    Ok(ApiResponse::new(analysis, req_id))
}
