//! Cross-checks a resolved point against the authoritative address registry.

use lawnquote_core::geo::round_half_up;
use lawnquote_core::{address_text_similarity, confidence_score, distance_meters, Coordinates};

use crate::linz::LinzClient;
use crate::types::{RegistryAddress, ValidationResult};

/// Similarity assumed when the caller supplied only coordinates.
const NEUTRAL_TEXT_SIMILARITY: f64 = 0.5;

/// Scores the nearest registry candidate against `point` and `address_text`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_candidates(
    point: Coordinates,
    address_text: Option<&str>,
    candidates: &[RegistryAddress],
) -> ValidationResult {
    let nearest = candidates
        .iter()
        .map(|c| {
            let d = distance_meters(point.lat, point.lng, c.coordinates.lat, c.coordinates.lng);
            (c, d)
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b));

    let Some((candidate, distance)) = nearest else {
        return ValidationResult::unmatched();
    };

    let similarity = address_text.map_or(NEUTRAL_TEXT_SIMILARITY, |text| {
        address_text_similarity(text, &candidate.full_address)
    });

    ValidationResult {
        matched: true,
        matched_address: Some(candidate.full_address.clone()),
        distance_meters: Some(round_half_up(distance).max(0.0) as u32),
        confidence: confidence_score(distance, similarity),
    }
}

/// Registry lookup plus scoring. A failed lookup is logged and reported as
/// unmatched.
pub async fn cross_validate(
    linz: &LinzClient,
    point: Coordinates,
    address_text: Option<&str>,
    candidate_count: usize,
) -> ValidationResult {
    match linz.addresses_near(point, candidate_count).await {
        Ok(candidates) => score_candidates(point, address_text, &candidates),
        Err(e) => {
            tracing::warn!(provider = "linz", error = %e, "address cross-validation failed");
            ValidationResult::unmatched()
        }
    }
}
