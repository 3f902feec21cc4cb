use super::*;
use crate::catalog::Catalog;
use crate::types::{AccessDifficulty, DogSize, Frequency, Gradient, PropertyMetrics};

fn mornington_metrics() -> PropertyMetrics {
    PropertyMetrics {
        total_area_sqm: 550,
        lawn_area_sqm: 275,
        gradient: Gradient::ModerateSlope,
        estimated_edging_m: 91,
        access_difficulty: AccessDifficulty::Easy,
        hedge_length_m: 0,
    }
}

fn services(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| (*s).to_string()).collect()
}

fn price(
    metrics: &PropertyMetrics,
    ids: &[&str],
    frequency: Frequency,
    suburb: Option<&str>,
    dog_size: Option<DogSize>,
) -> PriceBreakdown {
    let selected = services(ids);
    calculate_price(
        &Catalog::builtin(),
        &PriceRequest {
            metrics,
            services: &selected,
            frequency,
            suburb,
            dog_size,
        },
    )
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[test]
fn mornington_fortnightly_mowing_only() {
    let breakdown = price(
        &mornington_metrics(),
        &["mowing"],
        Frequency::Fortnightly,
        Some("Mornington"),
        None,
    );

    assert_eq!(breakdown.base_price, 40);
    assert_eq!(breakdown.size_category, SizeCategory::Medium);
    assert_eq!(breakdown.size_adjustment, 12);
    assert_eq!(breakdown.gradient_adjustment, 8);
    assert_eq!(breakdown.access_adjustment, 0);
    assert_eq!(breakdown.travel_adjustment, 0);
    assert_eq!(breakdown.services_total, 0);
    assert_eq!(breakdown.subtotal, 60);
    assert_eq!(breakdown.frequency_discount, 6);
    assert_eq!(breakdown.final_price, 54);
    assert_eq!(breakdown.price_range, PriceRange { min: 49, max: 59 });
}

#[test]
fn xlarge_steep_tricky_monthly() {
    let metrics = PropertyMetrics {
        total_area_sqm: 1000,
        lawn_area_sqm: 600,
        gradient: Gradient::Steep,
        estimated_edging_m: 135,
        access_difficulty: AccessDifficulty::Tricky,
        hedge_length_m: 0,
    };
    let breakdown = price(&metrics, &["mowing"], Frequency::Monthly, None, None);

    assert_eq!(breakdown.size_category, SizeCategory::XLarge);
    assert_eq!(breakdown.size_adjustment, 40);
    assert_eq!(breakdown.gradient_adjustment, 16);
    assert_eq!(breakdown.access_adjustment, 6);
    assert_eq!(breakdown.frequency_discount, 0);
    assert_eq!(breakdown.final_price, 102);
    assert_eq!(breakdown.price_range, PriceRange { min: 92, max: 112 });
}

#[test]
fn discount_uses_unrounded_subtotal() {
    // subtotal 105.5 -> 10.55 off -> 94.95 -> 95
    let breakdown = price(
        &mornington_metrics(),
        &["mowing", "edging"],
        Frequency::Fortnightly,
        Some("Mornington"),
        None,
    );
    assert_eq!(breakdown.services_total, 46);
    assert_eq!(breakdown.subtotal, 106);
    assert_eq!(breakdown.final_price, 95);
}

// ---------------------------------------------------------------------------
// Add-ons
// ---------------------------------------------------------------------------

#[test]
fn medium_dog_cleanup_adds_exactly_fifteen() {
    for lawn in [50, 275, 900] {
        let metrics = PropertyMetrics {
            lawn_area_sqm: lawn,
            total_area_sqm: 1500,
            ..mornington_metrics()
        };
        let without = price(&metrics, &["mowing"], Frequency::Monthly, None, None);
        let with = price(
            &metrics,
            &["mowing", "dogcleanup"],
            Frequency::Monthly,
            None,
            Some(DogSize::Medium),
        );
        assert_eq!(with.services_total - without.services_total, 15);
    }
}

#[test]
fn dog_cleanup_without_size_uses_catalog_price() {
    let breakdown = price(
        &mornington_metrics(),
        &["dogcleanup"],
        Frequency::Monthly,
        None,
        None,
    );
    assert_eq!(breakdown.services_total, 10);
}

#[test]
fn hedges_have_minimum_price() {
    let mut metrics = mornington_metrics();
    let short = price(&metrics, &["hedges"], Frequency::Monthly, None, None);
    assert_eq!(short.services_total, 25);

    metrics.hedge_length_m = 20;
    let long = price(&metrics, &["hedges"], Frequency::Monthly, None, None);
    assert_eq!(long.services_total, 40);
}

#[test]
fn edging_has_minimum_price() {
    let metrics = PropertyMetrics {
        estimated_edging_m: 20,
        ..mornington_metrics()
    };
    let breakdown = price(&metrics, &["edging"], Frequency::Monthly, None, None);
    assert_eq!(breakdown.services_total, 15);
}

#[test]
fn flat_add_ons_use_catalog_price() {
    let breakdown = price(
        &mornington_metrics(),
        &["weedspray", "leaves"],
        Frequency::Monthly,
        None,
        None,
    );
    assert_eq!(breakdown.services_total, 40);
}

#[test]
fn unknown_services_are_ignored() {
    let known = price(&mornington_metrics(), &["mowing"], Frequency::Weekly, None, None);
    let with_unknown = price(
        &mornington_metrics(),
        &["mowing", "gutter-clean"],
        Frequency::Weekly,
        None,
        None,
    );
    assert_eq!(known, with_unknown);
}

// ---------------------------------------------------------------------------
// Travel and frequency
// ---------------------------------------------------------------------------

#[test]
fn travel_multiplier_from_suburb() {
    let breakdown = price(
        &mornington_metrics(),
        &["mowing"],
        Frequency::Monthly,
        Some("port chalmers"),
        None,
    );
    assert_eq!(breakdown.travel_adjustment, 10);
    assert_eq!(breakdown.final_price, 70);
}

#[test]
fn unknown_suburb_has_no_travel_adjustment() {
    let breakdown = price(
        &mornington_metrics(),
        &["mowing"],
        Frequency::Monthly,
        Some("Gotham"),
        None,
    );
    assert_eq!(breakdown.travel_adjustment, 0);
}

#[test]
fn weekly_discount_is_fifteen_percent() {
    let breakdown = price(&mornington_metrics(), &["mowing"], Frequency::Weekly, None, None);
    assert_eq!(breakdown.frequency_discount, 9);
    assert_eq!(breakdown.final_price, 51);
}

#[test]
fn pricing_is_idempotent() {
    let metrics = mornington_metrics();
    let a = price(
        &metrics,
        &["mowing", "edging", "hedges", "dogcleanup"],
        Frequency::Weekly,
        Some("Roslyn"),
        Some(DogSize::Large),
    );
    let b = price(
        &metrics,
        &["mowing", "edging", "hedges", "dogcleanup"],
        Frequency::Weekly,
        Some("Roslyn"),
        Some(DogSize::Large),
    );
    assert_eq!(a, b);
}

#[test]
fn breakdown_serializes_camel_case() {
    let breakdown = price(&mornington_metrics(), &["mowing"], Frequency::Fortnightly, None, None);
    let json = serde_json::to_value(&breakdown).unwrap();
    assert_eq!(json["finalPrice"], 54);
    assert_eq!(json["priceRange"]["min"], 49);
    assert_eq!(json["sizeCategory"], "medium");
    assert_eq!(json["frequency"], "fortnightly");
}

#[test]
fn size_buckets() {
    assert_eq!(SizeCategory::from_lawn_area(149), SizeCategory::Small);
    assert_eq!(SizeCategory::from_lawn_area(150), SizeCategory::Medium);
    assert_eq!(SizeCategory::from_lawn_area(499), SizeCategory::Large);
    assert_eq!(SizeCategory::from_lawn_area(500), SizeCategory::XLarge);
}
