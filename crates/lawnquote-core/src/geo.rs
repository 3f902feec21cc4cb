//! Small-scale geodesy helpers.
//!
//! Polygon maths projects lon/lat onto a local equirectangular plane using a
//! scale taken from the ring's latitude. That is accurate to well under a
//! percent for suburban sections and useless at country scale.

use std::collections::HashSet;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::types::{Coordinates, SlopeCategory};

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const METERS_PER_LAT_DEGREE: f64 = 110_540.0;
const METERS_PER_LNG_DEGREE_AT_EQUATOR: f64 = 111_320.0;

/// Diagonal reported for geometry that cannot be measured.
pub const DEFAULT_DIAGONAL_M: f64 = 50.0;

/// Distance at which the spatial half of the confidence score reaches zero.
const CONFIDENCE_DISTANCE_CUTOFF_M: f64 = 50.0;

/// GeoJSON polygon geometry as served by the parcel registry.
///
/// Positions are `[lng, lat]`; any extra ordinates are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

impl Geometry {
    /// Outer ring of the polygon, or of the first polygon of a multipolygon.
    #[must_use]
    pub fn outer_ring(&self) -> Vec<Coordinates> {
        let ring = match self {
            Geometry::Polygon(rings) => rings.first(),
            Geometry::MultiPolygon(polygons) => polygons.first().and_then(|rings| rings.first()),
        };

        ring.map(|positions| {
            positions
                .iter()
                .filter(|p| p.len() >= 2)
                .map(|p| Coordinates { lat: p[1], lng: p[0] })
                .collect()
        })
        .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bbox {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

fn bbox(ring: &[Coordinates]) -> Bbox {
    ring.iter().fold(
        Bbox {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lng: f64::INFINITY,
            max_lng: f64::NEG_INFINITY,
        },
        |b, c| Bbox {
            min_lat: b.min_lat.min(c.lat),
            max_lat: b.max_lat.max(c.lat),
            min_lng: b.min_lng.min(c.lng),
            max_lng: b.max_lng.max(c.lng),
        },
    )
}

fn meters_per_lng_degree(lat: f64) -> f64 {
    METERS_PER_LNG_DEGREE_AT_EQUATOR * (lat * PI / 180.0).cos()
}

/// Haversine great-circle distance in metres.
#[must_use]
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Shoelace area of the outer ring in square metres. Zero for rings with
/// fewer than three positions.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn polygon_area_sqm(geometry: &Geometry) -> f64 {
    let ring = geometry.outer_ring();
    if ring.len() < 3 {
        return 0.0;
    }

    let mean_lat = ring.iter().map(|c| c.lat).sum::<f64>() / ring.len() as f64;
    let m_lng = meters_per_lng_degree(mean_lat);

    // Translate to the first vertex so the cross products stay small.
    let origin = ring[0];
    let projected: Vec<(f64, f64)> = ring
        .iter()
        .map(|c| {
            (
                (c.lng - origin.lng) * m_lng,
                (c.lat - origin.lat) * METERS_PER_LAT_DEGREE,
            )
        })
        .collect();

    let sum: f64 = projected
        .iter()
        .zip(projected.iter().cycle().skip(1))
        .map(|((x1, y1), (x2, y2))| x1 * y2 - x2 * y1)
        .sum();

    sum.abs() / 2.0
}

/// Grid of cell centres over the ring's bounding box, truncated to `count`.
///
/// Points may fall outside a non-convex parcel; callers only rely on the
/// count. Returns an empty list for unmeasurable geometry.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn sample_points_in_bbox(geometry: &Geometry, count: usize) -> Vec<Coordinates> {
    let ring = geometry.outer_ring();
    if ring.len() < 3 || count == 0 {
        return Vec::new();
    }

    let b = bbox(&ring);
    let grid = (count as f64).sqrt().ceil() as usize;
    let step = grid as f64;

    let mut points = Vec::with_capacity(grid * grid);
    for i in 0..grid {
        for j in 0..grid {
            let lng = b.min_lng + (b.max_lng - b.min_lng) * (i as f64 + 0.5) / step;
            let lat = b.min_lat + (b.max_lat - b.min_lat) * (j as f64 + 0.5) / step;
            points.push(Coordinates { lat, lng });
        }
    }
    points.truncate(count);
    points
}

/// Bounding-box diagonal in metres, [`DEFAULT_DIAGONAL_M`] for unmeasurable
/// geometry.
#[must_use]
pub fn diagonal_meters(geometry: &Geometry) -> f64 {
    let ring = geometry.outer_ring();
    if ring.len() < 3 {
        return DEFAULT_DIAGONAL_M;
    }

    let b = bbox(&ring);
    let centre_lat = (b.min_lat + b.max_lat) / 2.0;
    let width = (b.max_lng - b.min_lng) * meters_per_lng_degree(centre_lat);
    let height = (b.max_lat - b.min_lat) * METERS_PER_LAT_DEGREE;
    width.hypot(height)
}

#[must_use]
pub fn categorize_slope(percent: f64) -> SlopeCategory {
    if percent < 5.0 {
        SlopeCategory::Flat
    } else if percent < 15.0 {
        SlopeCategory::GentleSlope
    } else if percent < 25.0 {
        SlopeCategory::ModerateSlope
    } else if percent < 35.0 {
        SlopeCategory::Steep
    } else {
        SlopeCategory::VerySteep
    }
}

/// Word-overlap similarity in `[0, 1]`: shared words over the larger word set.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn address_text_similarity(a: &str, b: &str) -> f64 {
    let words = |s: &str| -> HashSet<String> {
        s.to_lowercase()
            .replace(',', "")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    };

    let set_a = words(a);
    let set_b = words(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let shared = set_a.intersection(&set_b).count();
    shared as f64 / set_a.len().max(set_b.len()) as f64
}

/// Blends proximity (60%) and text similarity (40%) into a 0–100 score.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn confidence_score(distance_meters: f64, text_similarity: f64) -> u8 {
    let distance_score = (1.0 - distance_meters / CONFIDENCE_DISTANCE_CUTOFF_M).max(0.0);
    let blended = (0.6 * distance_score + 0.4 * text_similarity) * 100.0;
    round_half_up(blended).clamp(0.0, 100.0) as u8
}

/// Web-mercator slippy-map tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn lat_lng_to_tile(lat: f64, lng: f64, zoom: u8) -> TileCoord {
    let n = f64::from(1_u32 << zoom.min(30));
    let lat_rad = lat.to_radians();
    let x = ((lng + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();
    TileCoord {
        x: x.clamp(0.0, n - 1.0) as u32,
        y: y.clamp(0.0, n - 1.0) as u32,
        zoom,
    }
}

/// Rounds halves towards positive infinity, matching how prices have always
/// been displayed (`2.5 -> 3`, `-2.5 -> -2`).
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to one decimal place for display.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}
