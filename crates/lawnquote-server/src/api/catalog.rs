use axum::{extract::State, Extension, Json};
use lawnquote_core::{Service, POPULAR_SUBURBS};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ServiceCatalog {
    services: Vec<Service>,
    popular_suburbs: &'static [&'static str],
}

/// GET /api/v1/services
pub(super) async fn list_services(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ServiceCatalog>> {
    ApiResponse::new(
        ServiceCatalog {
            services: state.catalog.services.clone(),
            popular_suburbs: POPULAR_SUBURBS,
        },
        req_id,
    )
}
