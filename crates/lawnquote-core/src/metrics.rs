//! Property-metrics estimation from parcel area and suburb heuristics.
//!
//! Everything here is deterministic except the hedge length, which draws from
//! the caller's random source until hedges can be measured from imagery.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::geo::round_half_up;
use crate::types::{AccessDifficulty, AddressComponents, Gradient, PropertyMetrics, SlopeCategory};

const STEEP_SUBURBS: &[&str] = &[
    "signal hill",
    "unity park",
    "halfway bush",
    "wakari",
    "maori hill",
    "roslyn",
];
const MODERATE_SUBURBS: &[&str] = &[
    "kaikorai",
    "mornington",
    "belleknowes",
    "woodhaugh",
    "opoho",
    "normanby",
];
const GENTLE_SUBURBS: &[&str] = &[
    "andersons bay",
    "musselburgh",
    "vauxhall",
    "tainui",
    "caversham",
];

/// Older hill suburbs with narrow driveways and steps.
const TRICKY_ACCESS_SUBURBS: &[&str] = &["roslyn", "maori hill", "belleknowes"];

const SMALL_SECTION_SUBURBS: &[&str] =
    &["south dunedin", "st kilda", "caversham", "dunedin central"];
const LARGE_SECTION_SUBURBS: &[&str] = &["mosgiel", "brighton", "outram", "fairfield"];

/// Section size assumed when no parcel could be found.
pub const DEFAULT_TOTAL_AREA_SQM: u32 = 600;
const SMALL_SECTION_AREA_SQM: u32 = 500;
const LARGE_SECTION_AREA_SQM: u32 = 900;

const DEFAULT_SUBURB: &str = "Dunedin";

static SUBURB_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([^,]+)").expect("valid suburb regex"));

fn matches_any(suburb: &str, list: &[&str]) -> bool {
    let lower = suburb.to_lowercase();
    list.iter().any(|s| lower.contains(s))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_u32(value: f64) -> u32 {
    round_half_up(value).max(0.0) as u32
}

/// Lawn share of the section: smaller sections are mostly house.
#[must_use]
pub fn estimate_lawn_area(total_area_sqm: u32) -> u32 {
    let share = match total_area_sqm {
        0..300 => 0.40,
        300..600 => 0.50,
        600..1000 => 0.55,
        _ => 0.60,
    };
    round_u32(f64::from(total_area_sqm) * share)
}

/// Suburb fallback when terrain data is unavailable. Steep beats moderate
/// beats gentle.
#[must_use]
pub fn suburb_gradient(suburb: &str) -> Gradient {
    if matches_any(suburb, STEEP_SUBURBS) {
        Gradient::Steep
    } else if matches_any(suburb, MODERATE_SUBURBS) {
        Gradient::ModerateSlope
    } else if matches_any(suburb, GENTLE_SUBURBS) {
        Gradient::GentleSlope
    } else {
        Gradient::Flat
    }
}

/// Outside perimeter plus an allowance for paths and garden beds.
#[must_use]
pub fn estimate_edging(lawn_area_sqm: u32) -> u32 {
    let side = f64::from(lawn_area_sqm).sqrt();
    round_u32(side * 4.0 + side * 1.5)
}

#[must_use]
pub fn estimate_access(total_area_sqm: u32, suburb: &str) -> AccessDifficulty {
    if matches_any(suburb, TRICKY_ACCESS_SUBURBS) {
        AccessDifficulty::Tricky
    } else if total_area_sqm < 400 {
        AccessDifficulty::Standard
    } else {
        AccessDifficulty::Easy
    }
}

/// Placeholder until hedges are measured: roughly 30% of sections get 5–20 m.
pub fn estimate_hedge_length<R: Rng>(rng: &mut R) -> u32 {
    if rng.random::<f64>() > 0.7 {
        round_u32(rng.random::<f64>() * 15.0 + 5.0)
    } else {
        0
    }
}

/// Build the pricing input for one quote request.
///
/// `terrain` wins over the suburb table whenever elevation data was available.
pub fn estimate_metrics<R: Rng>(
    total_area_sqm: u32,
    suburb: &str,
    terrain: Option<SlopeCategory>,
    rng: &mut R,
) -> PropertyMetrics {
    let lawn_area_sqm = estimate_lawn_area(total_area_sqm);
    let gradient = terrain.map_or_else(|| suburb_gradient(suburb), SlopeCategory::to_gradient);

    PropertyMetrics {
        total_area_sqm,
        lawn_area_sqm,
        gradient,
        estimated_edging_m: estimate_edging(lawn_area_sqm),
        access_difficulty: estimate_access(total_area_sqm, suburb),
        hedge_length_m: estimate_hedge_length(rng),
    }
}

/// Section size to assume when the parcel registry has nothing.
#[must_use]
pub fn default_total_area(suburb: &str) -> u32 {
    if matches_any(suburb, SMALL_SECTION_SUBURBS) {
        SMALL_SECTION_AREA_SQM
    } else if matches_any(suburb, LARGE_SECTION_SUBURBS) {
        LARGE_SECTION_AREA_SQM
    } else {
        DEFAULT_TOTAL_AREA_SQM
    }
}

/// Suburb used by the heuristics: the structured component, else the segment
/// after the street in the address text, else the city, else `Dunedin`.
#[must_use]
pub fn extract_suburb(address: &str, components: Option<&AddressComponents>) -> String {
    if let Some(suburb) = components
        .and_then(|c| c.suburb.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return suburb.to_string();
    }

    if let Some(segment) = SUBURB_SEGMENT
        .captures(address)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
    {
        return segment.to_string();
    }

    components
        .and_then(|c| c.city.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBURB)
        .to_string()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn lawn_share_buckets() {
        assert_eq!(estimate_lawn_area(299), 120);
        assert_eq!(estimate_lawn_area(300), 150);
        assert_eq!(estimate_lawn_area(550), 275);
        assert_eq!(estimate_lawn_area(600), 330);
        assert_eq!(estimate_lawn_area(1000), 600);
        assert_eq!(estimate_lawn_area(0), 0);
    }

    #[test]
    fn gradient_priority_steep_first() {
        assert_eq!(suburb_gradient("Maori Hill"), Gradient::Steep);
        assert_eq!(suburb_gradient("mornington"), Gradient::ModerateSlope);
        assert_eq!(suburb_gradient("Andersons Bay"), Gradient::GentleSlope);
        assert_eq!(suburb_gradient("St Kilda"), Gradient::Flat);
    }

    #[test]
    fn access_rules() {
        assert_eq!(estimate_access(800, "Roslyn"), AccessDifficulty::Tricky);
        assert_eq!(estimate_access(399, "St Clair"), AccessDifficulty::Standard);
        assert_eq!(estimate_access(550, "Mornington"), AccessDifficulty::Easy);
    }

    #[test]
    fn mornington_scenario_metrics() {
        let mut rng = StdRng::seed_from_u64(7);
        let metrics = estimate_metrics(550, "Mornington", None, &mut rng);
        assert_eq!(metrics.lawn_area_sqm, 275);
        assert_eq!(metrics.gradient, Gradient::ModerateSlope);
        assert_eq!(metrics.estimated_edging_m, 91);
        assert_eq!(metrics.access_difficulty, AccessDifficulty::Easy);
        assert!(metrics.lawn_area_sqm <= metrics.total_area_sqm);
    }

    #[test]
    fn terrain_overrides_suburb_table() {
        let mut rng = StdRng::seed_from_u64(7);
        let metrics = estimate_metrics(550, "Mornington", Some(SlopeCategory::Flat), &mut rng);
        assert_eq!(metrics.gradient, Gradient::Flat);

        let metrics = estimate_metrics(550, "St Kilda", Some(SlopeCategory::VerySteep), &mut rng);
        assert_eq!(metrics.gradient, Gradient::Steep);
    }

    #[test]
    fn seeded_rng_reproduces_metrics() {
        let a = estimate_metrics(700, "Wakari", None, &mut StdRng::seed_from_u64(42));
        let b = estimate_metrics(700, "Wakari", None, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn hedge_length_is_zero_or_within_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut saw_hedge = false;
        for _ in 0..200 {
            let hedge = estimate_hedge_length(&mut rng);
            assert!(hedge == 0 || (5..=20).contains(&hedge), "got {hedge}");
            saw_hedge |= hedge > 0;
        }
        assert!(saw_hedge);
    }

    #[test]
    fn default_area_bands() {
        assert_eq!(default_total_area("South Dunedin"), 500);
        assert_eq!(default_total_area("Mosgiel"), 900);
        assert_eq!(default_total_area("Mornington"), 600);
    }

    #[test]
    fn suburb_extraction_order() {
        let components = AddressComponents {
            suburb: Some("Kew".to_string()),
            city: Some("Dunedin".to_string()),
            ..AddressComponents::default()
        };
        assert_eq!(extract_suburb("12 Main St, Mornington", Some(&components)), "Kew");
        assert_eq!(
            extract_suburb("12 Main Street, Mornington, Dunedin 9011", None),
            "Mornington"
        );

        let city_only = AddressComponents {
            city: Some("Mosgiel".to_string()),
            ..AddressComponents::default()
        };
        assert_eq!(extract_suburb("12 Main Street", Some(&city_only)), "Mosgiel");
        assert_eq!(extract_suburb("12 Main Street", None), "Dunedin");
    }
}
