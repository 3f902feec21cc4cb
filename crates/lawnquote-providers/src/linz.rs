//! LINZ Data Service WFS client: NZ address points and primary parcels, plus
//! the basemaps aerial tile URL.

use lawnquote_core::{polygon_area_sqm, Coordinates, Geometry, TileCoord};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{build_client, get_json, id_to_string, join, parse_base_url, ClientSettings};
use crate::types::{AreaSource, Parcel, RegistryAddress};

const DEFAULT_BASE_URL: &str = "https://data.linz.govt.nz/";
const AERIAL_TILES_BASE: &str = "https://basemaps.linz.govt.nz/v1/tiles/aerial/WebMercatorQuad";

/// NZ Addresses.
pub const ADDRESS_LAYER: u32 = 105_689;
/// NZ Primary Parcels.
pub const PARCEL_LAYER: u32 = 50_823;

/// Roughly 50 m either side of the point at NZ latitudes.
const ADDRESS_SEARCH_HALF_WIDTH_DEG: f64 = 0.0005;
const PARCEL_FALLBACK_HALF_WIDTH_DEG: f64 = 0.001;

/// Attribute names the parcel layers have used for their calculated area.
const AREA_ATTRIBUTES: &[&str] = &["calc_area", "calculated_area", "area_sq_m", "shape_area"];

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: Option<serde_json::Value>,
    #[serde(default)]
    properties: serde_json::Map<String, serde_json::Value>,
    geometry: Option<serde_json::Value>,
}

fn point_of(geometry: &serde_json::Value) -> Option<Coordinates> {
    let coords = geometry.get("coordinates")?.as_array()?;
    let lng = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    Coordinates::new(lat, lng).ok()
}

fn registry_area(properties: &serde_json::Map<String, serde_json::Value>) -> Option<f64> {
    AREA_ATTRIBUTES.iter().find_map(|key| {
        let value = properties.get(*key)?;
        let area = value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))?;
        (area.is_finite() && area > 0.0).then_some(area)
    })
}

fn to_registry_address(feature: Feature) -> Option<RegistryAddress> {
    let full_address = feature.properties.get("full_address")?.as_str()?.to_string();
    let coordinates = point_of(feature.geometry.as_ref()?)?;
    Some(RegistryAddress {
        full_address,
        coordinates,
    })
}

fn to_parcel(feature: Feature) -> Option<Parcel> {
    let boundary: Geometry = match feature.geometry.map(serde_json::from_value) {
        Some(Ok(geometry)) => geometry,
        Some(Err(e)) => {
            tracing::warn!(provider = "linz", error = %e, "parcel geometry is not a polygon");
            return None;
        }
        None => return None,
    };

    let id = feature
        .properties
        .get("id")
        .and_then(id_to_string)
        .or_else(|| feature.id.as_ref().and_then(id_to_string))
        .unwrap_or_default();

    let (area_sqm, area_source) = match registry_area(&feature.properties) {
        Some(area) => (area, AreaSource::Registry),
        None => (polygon_area_sqm(&boundary), AreaSource::Geometry),
    };

    Some(Parcel {
        id,
        area_sqm,
        area_source,
        boundary,
    })
}

fn bbox_param(point: Coordinates, half_width: f64) -> String {
    format!(
        "{},{},{},{}",
        point.lng - half_width,
        point.lat - half_width,
        point.lng + half_width,
        point.lat + half_width
    )
}

pub struct LinzClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl LinzClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, settings: &ClientSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        settings: &ClientSettings,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(settings)?,
            api_key: api_key.to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// WFS `GetFeature` URL for `layer` with the common parameters set.
    fn wfs_url(&self, layer: u32) -> Result<Url, ProviderError> {
        let key = utf8_percent_encode(&self.api_key, NON_ALPHANUMERIC);
        let mut url = join(&self.base_url, &format!("services;key={key}/wfs"))?;
        url.query_pairs_mut()
            .append_pair("service", "WFS")
            .append_pair("version", "2.0.0")
            .append_pair("request", "GetFeature")
            .append_pair("typeNames", &format!("layer-{layer}"))
            .append_pair("outputFormat", "application/json");
        Ok(url)
    }

    /// Registry address points within ~50 m of `point`, at most `count`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn addresses_near(
        &self,
        point: Coordinates,
        count: usize,
    ) -> Result<Vec<RegistryAddress>, ProviderError> {
        let mut url = self.wfs_url(ADDRESS_LAYER)?;
        url.query_pairs_mut()
            .append_pair("bbox", &bbox_param(point, ADDRESS_SEARCH_HALF_WIDTH_DEG))
            .append_pair("count", &count.to_string());

        let collection: FeatureCollection = get_json(&self.client, url, "linz addresses").await?;
        Ok(collection
            .features
            .into_iter()
            .filter_map(to_registry_address)
            .collect())
    }

    /// The parcel whose boundary intersects `point`.
    ///
    /// Falls back to the first parcel in a small bounding box when the
    /// intersection query finds nothing or is rejected by the service.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure or an unexpected body.
    pub async fn parcel_at(&self, point: Coordinates) -> Result<Option<Parcel>, ProviderError> {
        let mut url = self.wfs_url(PARCEL_LAYER)?;
        url.query_pairs_mut().append_pair(
            "cql_filter",
            &format!("INTERSECTS(shape, POINT({} {}))", point.lng, point.lat),
        );

        match get_json::<FeatureCollection>(&self.client, url, "linz parcel").await {
            Ok(collection) => {
                if let Some(parcel) = collection.features.into_iter().find_map(to_parcel) {
                    return Ok(Some(parcel));
                }
            }
            Err(ProviderError::UnexpectedStatus { status, .. }) => {
                tracing::debug!(
                    provider = "linz",
                    status,
                    "intersects query rejected, trying bbox"
                );
            }
            Err(e) => return Err(e),
        }

        let mut url = self.wfs_url(PARCEL_LAYER)?;
        url.query_pairs_mut()
            .append_pair("srsName", "EPSG:4326")
            .append_pair(
                "bbox",
                &format!(
                    "{},EPSG:4326",
                    bbox_param(point, PARCEL_FALLBACK_HALF_WIDTH_DEG)
                ),
            )
            .append_pair("count", "1");

        let collection: FeatureCollection =
            get_json(&self.client, url, "linz parcel bbox").await?;
        Ok(collection.features.into_iter().find_map(to_parcel))
    }

    /// Aerial basemap tile covering `tile`.
    #[must_use]
    pub fn aerial_tile_url(&self, tile: TileCoord) -> String {
        let key = utf8_percent_encode(&self.api_key, NON_ALPHANUMERIC);
        format!(
            "{AERIAL_TILES_BASE}/{}/{}/{}.webp?api={key}",
            tile.zoom, tile.x, tile.y
        )
    }
}
