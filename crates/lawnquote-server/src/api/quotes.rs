//! Pricing, booking submission and the admin quote queue.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use lawnquote_core::{
    calculate_price, Catalog, Coordinates, DogSize, Frequency, PriceBreakdown, PriceRequest,
    PropertyMetrics,
};
use lawnquote_db::{DbError, NewQuote, QuoteRow, QuoteStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{json_body, map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

const DOG_CLEANUP_SERVICE: &str = "dogcleanup";
const MAX_NAME_LEN: usize = 200;
const MAX_PHONE_LEN: usize = 40;
const MAX_NOTES_LEN: usize = 2_000;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PriceQuoteRequest {
    #[serde(flatten)]
    pub metrics: PropertyMetrics,
    pub services: Vec<String>,
    pub frequency: Frequency,
    pub suburb: Option<String>,
    pub dog_size: Option<DogSize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateQuoteRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub preferred_start_date: Option<NaiveDate>,
    pub address: String,
    pub suburb: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub validation_confidence: Option<u8>,
    #[serde(flatten)]
    pub metrics: PropertyMetrics,
    pub services: Vec<String>,
    pub frequency: Frequency,
    pub dog_size: Option<DogSize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusUpdateRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QuoteItem {
    public_id: Uuid,
    status: String,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    notes: Option<String>,
    preferred_start_date: Option<NaiveDate>,
    address: String,
    suburb: Option<String>,
    coordinates: Option<Coordinates>,
    total_area_sqm: i32,
    lawn_area_sqm: i32,
    gradient: String,
    estimated_edging_m: i32,
    access_difficulty: String,
    hedge_length_m: i32,
    validation_confidence: Option<i16>,
    services: Vec<String>,
    frequency: String,
    dog_size: Option<String>,
    price_breakdown: serde_json::Value,
    final_price: i32,
    status_changed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<QuoteRow> for QuoteItem {
    fn from(row: QuoteRow) -> Self {
        let coordinates = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };
        Self {
            public_id: row.public_id,
            status: row.status,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_email: row.customer_email,
            notes: row.notes,
            preferred_start_date: row.preferred_start_date,
            address: row.address,
            suburb: row.suburb,
            coordinates,
            total_area_sqm: row.total_area_sqm,
            lawn_area_sqm: row.lawn_area_sqm,
            gradient: row.gradient,
            estimated_edging_m: row.estimated_edging_m,
            access_difficulty: row.access_difficulty,
            hedge_length_m: row.hedge_length_m,
            validation_confidence: row.validation_confidence,
            services: row.services,
            frequency: row.frequency,
            dog_size: row.dog_size,
            price_breakdown: row.price_breakdown,
            final_price: row.final_price,
            status_changed_at: row.status_changed_at,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validation_error(req_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(req_id, "validation_error", message)
}

fn validate_metrics(req_id: &str, metrics: &PropertyMetrics) -> Result<(), ApiError> {
    metrics
        .check_invariants()
        .map_err(|e| validation_error(req_id, e.to_string()))
}

/// Keeps catalog service ids, in request order, without duplicates.
fn known_services(
    req_id: &str,
    catalog: &Catalog,
    requested: &[String],
) -> Result<Vec<String>, ApiError> {
    let mut services: Vec<String> = Vec::new();
    for id in requested {
        let id = id.trim().to_ascii_lowercase();
        if catalog.service(&id).is_some() {
            if !services.contains(&id) {
                services.push(id);
            }
        } else {
            tracing::debug!(service = %id, "ignoring unknown service id");
        }
    }

    if services.is_empty() {
        return Err(validation_error(
            req_id,
            "at least one known service must be selected",
        ));
    }
    Ok(services)
}

fn required_text(
    req_id: &str,
    field: &str,
    value: &str,
    max_len: usize,
) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_len {
        return Err(validation_error(
            req_id,
            format!("{field} must be 1–{max_len} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn to_db_int(req_id: &str, field: &str, value: u32) -> Result<i32, ApiError> {
    i32::try_from(value).map_err(|_| validation_error(req_id, format!("{field} is out of range")))
}

fn price_for(
    catalog: &Catalog,
    services: &[String],
    frequency: Frequency,
    metrics: &PropertyMetrics,
    suburb: Option<&str>,
    dog_size: Option<DogSize>,
) -> PriceBreakdown {
    calculate_price(
        catalog,
        &PriceRequest {
            metrics,
            services,
            frequency,
            suburb,
            dog_size,
        },
    )
}

fn parse_public_id(req_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| validation_error(req_id, format!("'{raw}' is not a valid quote id")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/quotes/price: price a selection without storing anything.
pub(super) async fn price_quote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<PriceQuoteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PriceBreakdown>>, ApiError> {
    let body = json_body(&req_id.0, body)?;
    let rid = &req_id.0;
    validate_metrics(rid, &body.metrics)?;

    let breakdown = price_for(
        &state.catalog,
        &body.services,
        body.frequency,
        &body.metrics,
        body.suburb.as_deref(),
        body.dog_size,
    );

    Ok(ApiResponse::new(breakdown, req_id))
}

/// POST /api/v1/quotes: submit a booking. The price is always recomputed
/// server-side.
pub(super) async fn create_quote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<CreateQuoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<QuoteItem>>), ApiError> {
    let body = json_body(&req_id.0, body)?;
    let rid = &req_id.0;

    let customer_name = required_text(rid, "customerName", &body.customer_name, MAX_NAME_LEN)?;
    let customer_phone = required_text(rid, "customerPhone", &body.customer_phone, MAX_PHONE_LEN)?;
    let address = required_text(rid, "address", &body.address, MAX_NAME_LEN)?;
    let customer_email = optional_text(body.customer_email.as_deref());
    if customer_email.as_deref().is_some_and(|e| !e.contains('@')) {
        return Err(validation_error(rid, "customerEmail must be an email address"));
    }
    let notes = optional_text(body.notes.as_deref());
    if notes.as_deref().is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
        return Err(validation_error(
            rid,
            format!("notes must be at most {MAX_NOTES_LEN} characters"),
        ));
    }
    if let Some(point) = body.coordinates {
        if !point.is_valid() {
            return Err(validation_error(rid, "coordinates are out of range"));
        }
    }
    if body.validation_confidence.is_some_and(|c| c > 100) {
        return Err(validation_error(rid, "validationConfidence must be 0–100"));
    }

    validate_metrics(rid, &body.metrics)?;
    let services = known_services(rid, &state.catalog, &body.services)?;
    if services.iter().any(|s| s == DOG_CLEANUP_SERVICE) && body.dog_size.is_none() {
        return Err(validation_error(
            rid,
            "dogSize is required when dog cleanup is selected",
        ));
    }

    let suburb = optional_text(body.suburb.as_deref());
    let breakdown = price_for(
        &state.catalog,
        &services,
        body.frequency,
        &body.metrics,
        suburb.as_deref(),
        body.dog_size,
    );
    let price_breakdown = serde_json::to_value(&breakdown).map_err(|e| {
        tracing::error!(error = %e, "price breakdown serialization failed");
        ApiError::new(rid, "internal_error", "could not store quote")
    })?;

    let metrics = &body.metrics;
    let new_quote = NewQuote {
        customer_name,
        customer_phone,
        customer_email,
        notes,
        preferred_start_date: body.preferred_start_date,
        address,
        suburb,
        latitude: body.coordinates.map(|c| c.lat),
        longitude: body.coordinates.map(|c| c.lng),
        total_area_sqm: to_db_int(rid, "totalAreaSqm", metrics.total_area_sqm)?,
        lawn_area_sqm: to_db_int(rid, "lawnAreaSqm", metrics.lawn_area_sqm)?,
        gradient: metrics.gradient.to_string(),
        estimated_edging_m: to_db_int(rid, "estimatedEdgingM", metrics.estimated_edging_m)?,
        access_difficulty: metrics.access_difficulty.to_string(),
        hedge_length_m: to_db_int(rid, "hedgeLengthM", metrics.hedge_length_m)?,
        validation_confidence: body.validation_confidence.map(i16::from),
        services,
        frequency: body.frequency.as_str().to_owned(),
        dog_size: body.dog_size.map(|d| d.as_str().to_owned()),
        price_breakdown,
        final_price: to_db_int(rid, "finalPrice", breakdown.final_price)?,
    };

    let row = lawnquote_db::insert_quote(&state.pool, &new_quote)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::new(QuoteItem::from(row), req_id),
    ))
}

/// GET /api/v1/admin/quotes
pub(super) async fn list_quotes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<QuoteListQuery>,
) -> Result<Json<ApiResponse<Vec<QuoteItem>>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<QuoteStatus>)
        .transpose()
        .map_err(|e| validation_error(&req_id.0, e))?;

    let rows = lawnquote_db::list_quotes(&state.pool, status, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(QuoteItem::from).collect();
    Ok(ApiResponse::new(data, req_id))
}

/// GET /api/v1/admin/quotes/:public_id
pub(super) async fn get_quote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<String>,
) -> Result<Json<ApiResponse<QuoteItem>>, ApiError> {
    let rid = &req_id.0;
    let public_id = parse_public_id(rid, &public_id)?;

    let row = lawnquote_db::get_quote_by_public_id(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("quote {public_id} not found")))?;

    Ok(ApiResponse::new(QuoteItem::from(row), req_id))
}

/// PATCH /api/v1/admin/quotes/:public_id/status
pub(super) async fn update_quote_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<String>,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<QuoteItem>>, ApiError> {
    let body = json_body(&req_id.0, body)?;
    let rid = &req_id.0;
    let public_id = parse_public_id(rid, &public_id)?;
    let status: QuoteStatus = body
        .status
        .parse()
        .map_err(|e: String| validation_error(rid, e))?;

    let row = lawnquote_db::update_quote_status(&state.pool, public_id, status)
        .await
        .map_err(|e| match e {
            DbError::NotFound => {
                ApiError::new(rid, "not_found", format!("quote {public_id} not found"))
            }
            err @ DbError::InvalidQuoteTransition { .. } => {
                ApiError::new(rid, "conflict", err.to_string())
            }
            other => map_db_error(rid.clone(), &other),
        })?;

    Ok(ApiResponse::new(QuoteItem::from(row), req_id))
}
