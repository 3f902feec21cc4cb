//! Google Places autocomplete and place details, restricted to New Zealand.

use lawnquote_core::{
    AddressCandidate, AddressComponents, Coordinates, ProviderKind, ResolvedAddress,
};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{build_client, get_json, join, parse_base_url, ClientSettings};
use crate::provider::{AddressProvider, BoxFuture};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

/// Google misses some NZ rural addresses, so it ranks below Addy.
const CANDIDATE_CONFIDENCE: f64 = 0.85;

const DETAIL_FIELDS: &str = "geometry,formatted_address,address_components";

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    description: String,
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    status: String,
    result: Option<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    geometry: Option<PlaceGeometry>,
    formatted_address: Option<String>,
    #[serde(default)]
    address_components: Vec<PlaceComponent>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: PlaceLocation,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PlaceComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

/// `OK` and `ZERO_RESULTS` are the only non-error statuses Places returns.
fn check_status(status: &str) -> Result<(), ProviderError> {
    match status {
        "" | "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ProviderError::ApiStatus {
            provider: "google",
            status: other.to_string(),
        }),
    }
}

fn component(components: &[PlaceComponent], kind: &str) -> Option<String> {
    components
        .iter()
        .find(|c| c.types.iter().any(|t| t == kind))
        .map(|c| c.long_name.clone())
}

fn parse_components(components: &[PlaceComponent]) -> AddressComponents {
    AddressComponents {
        street_number: component(components, "street_number"),
        street: component(components, "route"),
        suburb: component(components, "sublocality"),
        city: component(components, "locality"),
        region: component(components, "administrative_area_level_1"),
        postcode: component(components, "postal_code"),
    }
}

pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl GooglePlacesClient {
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

    /// Autocomplete predictions. These carry no components; call
    /// [`GooglePlacesClient::place_details`] for those.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure, a non-2xx status, an
    /// error status in the envelope, or an unexpected body.
    pub async fn autocomplete(
        &self,
        input: &str,
        limit: usize,
    ) -> Result<Vec<AddressCandidate>, ProviderError> {
        let mut url = join(&self.base_url, "autocomplete/json")?;
        url.query_pairs_mut()
            .append_pair("input", input)
            .append_pair("components", "country:nz")
            .append_pair("key", &self.api_key);

        let response: AutocompleteResponse =
            get_json(&self.client, url, "google autocomplete").await?;
        check_status(&response.status)?;

        Ok(response
            .predictions
            .into_iter()
            .take(limit)
            .map(|p| AddressCandidate {
                source: ProviderKind::Google,
                handle: p.place_id,
                address: p.description,
                components: None,
                confidence: CANDIDATE_CONFIDENCE,
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure, a non-2xx status, an
    /// error status in the envelope, or an unexpected body.
    pub async fn place_details(
        &self,
        place_id: &str,
    ) -> Result<Option<ResolvedAddress>, ProviderError> {
        let mut url = join(&self.base_url, "details/json")?;
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("fields", DETAIL_FIELDS)
            .append_pair("key", &self.api_key);

        let response: DetailsResponse = get_json(&self.client, url, "google details").await?;
        check_status(&response.status)?;

        let Some(result) = response.result else {
            return Ok(None);
        };
        let Some(location) = result.geometry.map(|g| g.location) else {
            tracing::debug!(provider = "google", place_id, "place has no geometry");
            return Ok(None);
        };
        let Ok(coordinates) = Coordinates::new(location.lat, location.lng) else {
            tracing::warn!(
                provider = "google",
                place_id,
                lat = location.lat,
                lng = location.lng,
                "place has invalid coordinates"
            );
            return Ok(None);
        };

        let components = parse_components(&result.address_components);
        let full_address = result.formatted_address.unwrap_or_default();

        Ok(Some(ResolvedAddress {
            source: ProviderKind::Google,
            coordinates,
            full_address,
            components: Some(components),
        }))
    }
}

impl AddressProvider for GooglePlacesClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<AddressCandidate>, ProviderError>> {
        Box::pin(self.autocomplete(query, limit))
    }

    fn details<'a>(
        &'a self,
        handle: &'a str,
    ) -> BoxFuture<'a, Result<Option<ResolvedAddress>, ProviderError>> {
        Box::pin(self.place_details(handle))
    }
}
