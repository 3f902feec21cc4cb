//! Deterministic per-visit pricing.
//!
//! Adjustments are computed in floating point and only rounded where they are
//! reported; the discount and final price are taken from the unrounded
//! subtotal so rounding never compounds.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, BASE_SERVICE_ID};
use crate::geo::round_half_up;
use crate::types::{AccessDifficulty, DogSize, Frequency, Gradient, PropertyMetrics};

const HEDGE_MIN_PRICE: f64 = 25.0;
const HEDGE_PRICE_PER_M: f64 = 2.0;
const EDGING_MIN_PRICE: f64 = 15.0;
const EDGING_PRICE_PER_M: f64 = 0.5;

/// Lawn-size bucket used for the size multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    XLarge,
}

impl SizeCategory {
    #[must_use]
    pub fn from_lawn_area(lawn_area_sqm: u32) -> Self {
        match lawn_area_sqm {
            0..150 => Self::Small,
            150..300 => Self::Medium,
            300..500 => Self::Large,
            _ => Self::XLarge,
        }
    }

    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Small => 1.0,
            Self::Medium => 1.3,
            Self::Large => 1.6,
            Self::XLarge => 2.0,
        }
    }
}

fn gradient_multiplier(gradient: Gradient) -> f64 {
    match gradient {
        Gradient::Flat => 1.0,
        Gradient::GentleSlope => 1.1,
        Gradient::ModerateSlope => 1.2,
        Gradient::Steep => 1.4,
    }
}

fn access_multiplier(access: AccessDifficulty) -> f64 {
    match access {
        AccessDifficulty::Easy => 1.0,
        AccessDifficulty::Standard => 1.05,
        AccessDifficulty::Tricky => 1.15,
    }
}

/// Everything a price depends on.
#[derive(Debug, Clone, Copy)]
pub struct PriceRequest<'a> {
    pub metrics: &'a PropertyMetrics,
    pub services: &'a [String],
    pub frequency: Frequency,
    pub suburb: Option<&'a str>,
    pub dog_size: Option<DogSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

/// Itemised per-visit price, whole dollars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_price: u32,
    pub size_category: SizeCategory,
    pub size_adjustment: u32,
    pub gradient_adjustment: u32,
    pub access_adjustment: u32,
    pub travel_adjustment: u32,
    pub services_total: u32,
    pub subtotal: u32,
    pub frequency: Frequency,
    pub frequency_discount: u32,
    pub final_price: u32,
    pub price_range: PriceRange,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dollars(value: f64) -> u32 {
    round_half_up(value).max(0.0) as u32
}

/// Price of one selected add-on, `None` for ids the catalog does not know.
fn add_on_price(catalog: &Catalog, id: &str, request: &PriceRequest<'_>) -> Option<f64> {
    let service = catalog.service(id)?;
    let price = match (id, request.dog_size) {
        ("dogcleanup", Some(size)) => size.cleanup_price(),
        ("hedges", _) => {
            HEDGE_MIN_PRICE.max(f64::from(request.metrics.hedge_length_m) * HEDGE_PRICE_PER_M)
        }
        ("edging", _) => {
            EDGING_MIN_PRICE.max(f64::from(request.metrics.estimated_edging_m) * EDGING_PRICE_PER_M)
        }
        _ => service.base_price,
    };
    Some(price)
}

/// Price one visit. Pure: identical inputs always give identical output.
#[must_use]
pub fn calculate_price(catalog: &Catalog, request: &PriceRequest<'_>) -> PriceBreakdown {
    let base = catalog.base_price();
    let metrics = request.metrics;

    let size_category = SizeCategory::from_lawn_area(metrics.lawn_area_sqm);
    let size_adjustment = base * (size_category.multiplier() - 1.0);
    let gradient_adjustment = base * (gradient_multiplier(metrics.gradient) - 1.0);
    let access_adjustment = base * (access_multiplier(metrics.access_difficulty) - 1.0);

    let travel_multiplier = request
        .suburb
        .and_then(|name| catalog.suburb(name))
        .map_or(1.0, |s| s.travel_multiplier);
    let travel_adjustment = base * (travel_multiplier - 1.0);

    let services_total: f64 = request
        .services
        .iter()
        .filter(|id| id.as_str() != BASE_SERVICE_ID)
        .filter_map(|id| add_on_price(catalog, id, request))
        .sum();

    let subtotal = base
        + size_adjustment
        + gradient_adjustment
        + access_adjustment
        + travel_adjustment
        + services_total;

    let frequency_discount = subtotal * request.frequency.discount_rate();
    let final_price = dollars(subtotal - frequency_discount);

    PriceBreakdown {
        base_price: dollars(base),
        size_category,
        size_adjustment: dollars(size_adjustment),
        gradient_adjustment: dollars(gradient_adjustment),
        access_adjustment: dollars(access_adjustment),
        travel_adjustment: dollars(travel_adjustment),
        services_total: dollars(services_total),
        subtotal: dollars(subtotal),
        frequency: request.frequency,
        frequency_discount: dollars(frequency_discount),
        final_price,
        price_range: PriceRange {
            min: dollars(f64::from(final_price) * 0.9),
            max: dollars(f64::from(final_price) * 1.1),
        },
    }
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
