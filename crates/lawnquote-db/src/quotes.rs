//! Database operations for `quotes`.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const QUOTE_COLUMNS: &str = "id, public_id, customer_name, customer_phone, customer_email, notes, \
     preferred_start_date, address, suburb, latitude, longitude, total_area_sqm, lawn_area_sqm, \
     gradient, estimated_edging_m, access_difficulty, hedge_length_m, validation_confidence, \
     services, frequency, dog_size, price_breakdown, final_price, status, status_changed_at, \
     created_at";

/// Lifecycle of a booked quote. Only `pending` quotes can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl QuoteStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Confirmed => "confirmed",
            QuoteStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(QuoteStatus::Pending),
            "confirmed" => Ok(QuoteStatus::Confirmed),
            "cancelled" => Ok(QuoteStatus::Cancelled),
            other => Err(format!("unknown quote status '{other}'")),
        }
    }
}

/// A row from the `quotes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuoteRow {
    pub id: i64,
    pub public_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub preferred_start_date: Option<NaiveDate>,
    pub address: String,
    pub suburb: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_area_sqm: i32,
    pub lawn_area_sqm: i32,
    pub gradient: String,
    pub estimated_edging_m: i32,
    pub access_difficulty: String,
    pub hedge_length_m: i32,
    pub validation_confidence: Option<i16>,
    pub services: Vec<String>,
    pub frequency: String,
    pub dog_size: Option<String>,
    /// The server-computed `PriceBreakdown` as JSON.
    pub price_breakdown: serde_json::Value,
    pub final_price: i32,
    pub status: String,
    pub status_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Values for a new `pending` quote.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub preferred_start_date: Option<NaiveDate>,
    pub address: String,
    pub suburb: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_area_sqm: i32,
    pub lawn_area_sqm: i32,
    pub gradient: String,
    pub estimated_edging_m: i32,
    pub access_difficulty: String,
    pub hedge_length_m: i32,
    pub validation_confidence: Option<i16>,
    pub services: Vec<String>,
    pub frequency: String,
    pub dog_size: Option<String>,
    pub price_breakdown: serde_json::Value,
    pub final_price: i32,
}

/// Inserts a quote in `pending` status with a freshly generated `public_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including check-constraint
/// violations such as a lawn area larger than the section.
pub async fn insert_quote(pool: &PgPool, quote: &NewQuote) -> Result<QuoteRow, DbError> {
    let public_id = Uuid::new_v4();

    let sql = format!(
        "INSERT INTO quotes (public_id, customer_name, customer_phone, customer_email, notes, \
             preferred_start_date, address, suburb, latitude, longitude, total_area_sqm, \
             lawn_area_sqm, gradient, estimated_edging_m, access_difficulty, hedge_length_m, \
             validation_confidence, services, frequency, dog_size, price_breakdown, final_price, \
             status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21, $22, 'pending') \
         RETURNING {QUOTE_COLUMNS}"
    );

    let row = sqlx::query_as::<_, QuoteRow>(&sql)
        .bind(public_id)
        .bind(&quote.customer_name)
        .bind(&quote.customer_phone)
        .bind(&quote.customer_email)
        .bind(&quote.notes)
        .bind(quote.preferred_start_date)
        .bind(&quote.address)
        .bind(&quote.suburb)
        .bind(quote.latitude)
        .bind(quote.longitude)
        .bind(quote.total_area_sqm)
        .bind(quote.lawn_area_sqm)
        .bind(&quote.gradient)
        .bind(quote.estimated_edging_m)
        .bind(&quote.access_difficulty)
        .bind(quote.hedge_length_m)
        .bind(quote.validation_confidence)
        .bind(quote.services.as_slice())
        .bind(&quote.frequency)
        .bind(&quote.dog_size)
        .bind(&quote.price_breakdown)
        .bind(quote.final_price)
        .fetch_one(pool)
        .await?;

    tracing::info!(public_id = %row.public_id, final_price = row.final_price, "quote stored");
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_quote_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<QuoteRow>, DbError> {
    let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE public_id = $1");
    let row = sqlx::query_as::<_, QuoteRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Newest first, optionally restricted to one status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_quotes(
    pool: &PgPool,
    status: Option<QuoteStatus>,
    limit: i64,
) -> Result<Vec<QuoteRow>, DbError> {
    let sql = format!(
        "SELECT {QUOTE_COLUMNS} FROM quotes \
         WHERE ($1::TEXT IS NULL OR status = $1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, QuoteRow>(&sql)
        .bind(status.map(QuoteStatus::as_str))
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Moves a `pending` quote to `confirmed` or `cancelled`.
///
/// # Errors
///
/// - [`DbError::NotFound`] if no quote has this `public_id`.
/// - [`DbError::InvalidQuoteTransition`] if the quote is no longer pending or
///   `status` is `pending`.
/// - [`DbError::Sqlx`] if a query fails.
pub async fn update_quote_status(
    pool: &PgPool,
    public_id: Uuid,
    status: QuoteStatus,
) -> Result<QuoteRow, DbError> {
    if status == QuoteStatus::Pending {
        return Err(DbError::InvalidQuoteTransition {
            public_id,
            current_status: QuoteStatus::Pending.as_str().to_string(),
            requested: status.as_str(),
        });
    }

    let sql = format!(
        "UPDATE quotes \
         SET status = $1, status_changed_at = NOW() \
         WHERE public_id = $2 AND status = 'pending' \
         RETURNING {QUOTE_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, QuoteRow>(&sql)
        .bind(status.as_str())
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

    if let Some(row) = updated {
        tracing::info!(%public_id, status = %status, "quote status changed");
        return Ok(row);
    }

    match get_quote_by_public_id(pool, public_id).await? {
        Some(existing) => Err(DbError::InvalidQuoteTransition {
            public_id,
            current_status: existing.status,
            requested: status.as_str(),
        }),
        None => Err(DbError::NotFound),
    }
}
