//! Slope estimation from a handful of elevation samples across a parcel.

use lawnquote_core::geo::round_tenth;
use lawnquote_core::{categorize_slope, diagonal_meters, sample_points_in_bbox, Geometry};

use crate::elevation::ElevationClient;
use crate::types::{ElevationStats, SlopeStats, Terrain};

/// A 3x3 grid.
pub const TERRAIN_SAMPLE_COUNT: usize = 9;

/// Summarise elevation samples for `boundary`. `None` when no sample has an
/// elevation.
#[must_use]
pub fn terrain_from_samples(boundary: &Geometry, samples: &[Option<f64>]) -> Option<Terrain> {
    let valid: Vec<f64> = samples.iter().flatten().copied().filter(|e| e.is_finite()).collect();
    if valid.is_empty() {
        return None;
    }

    let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let diagonal = diagonal_meters(boundary);
    let percent = if diagonal > 0.0 {
        range / diagonal * 100.0
    } else {
        0.0
    };

    Some(Terrain {
        elevation: ElevationStats {
            min: round_tenth(min),
            max: round_tenth(max),
            range: round_tenth(range),
        },
        slope: SlopeStats {
            percent: round_tenth(percent),
            category: categorize_slope(percent),
        },
    })
}

/// Single-attempt terrain lookup. Any failure degrades to `None`.
pub async fn fetch_terrain(client: &ElevationClient, boundary: &Geometry) -> Option<Terrain> {
    let points = sample_points_in_bbox(boundary, TERRAIN_SAMPLE_COUNT);
    if points.is_empty() {
        return None;
    }

    match client.elevations(&points).await {
        Ok(samples) => terrain_from_samples(boundary, &samples),
        Err(e) => {
            tracing::warn!(provider = "opentopodata", error = %e, "elevation lookup failed");
            None
        }
    }
}
