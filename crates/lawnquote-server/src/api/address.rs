//! Address autocomplete and handle resolution.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use lawnquote_core::{AddressCandidate, ProviderKind, ResolvedAddress};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{json_body, map_analysis_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SuggestQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DetailsRequest {
    pub address_id: String,
    pub provider: Option<ProviderKind>,
}

/// GET /api/v1/address/suggest?q=
///
/// Short or missing queries return an empty list.
pub(super) async fn suggest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SuggestQuery>,
) -> Json<ApiResponse<Vec<AddressCandidate>>> {
    let q = query.q.unwrap_or_default();
    let suggestions = state.analyzer.resolver().suggest(&q).await;
    ApiResponse::new(suggestions, req_id)
}

/// POST /api/v1/address/details
pub(super) async fn details(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<DetailsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ResolvedAddress>>, ApiError> {
    let body = json_body(&req_id.0, body)?;
    let address_id = body.address_id.trim();
    if address_id.is_empty() {
        return Err(ApiError::new(
            &req_id.0,
            "validation_error",
            "addressId is required",
        ));
    }

    let provider = body.provider.unwrap_or(ProviderKind::Addy);
    let resolved = state
        .analyzer
        .resolver()
        .details(provider, address_id)
        .await
        .map_err(|e| map_analysis_error(&req_id.0, &e))?;

    Ok(ApiResponse::new(resolved, req_id))
}
