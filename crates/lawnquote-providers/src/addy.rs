//! Client for the Addy NZ address autocomplete API.

use lawnquote_core::{
    AddressCandidate, AddressComponents, Coordinates, ProviderKind, ResolvedAddress,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{build_client, get_json, id_to_string, join, parse_base_url, ClientSettings};
use crate::provider::{AddressProvider, BoxFuture};

const DEFAULT_BASE_URL: &str = "https://api.addysolutions.com/";

/// Addy's fuzzy matching is strong for NZ street addresses.
const CANDIDATE_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    addresses: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: serde_json::Value,
    a: String,
    street: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    postcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    a: Option<String>,
    full: Option<String>,
    /// Longitude.
    x: Option<f64>,
    /// Latitude.
    y: Option<f64>,
    street: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    region: Option<String>,
    postcode: Option<String>,
}

pub struct AddyClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl AddyClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, settings: &ClientSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// Client pointed at a custom base URL (for testing with wiremock).
    ///
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

    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn search_addresses(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AddressCandidate>, ProviderError> {
        let mut url = join(&self.base_url, "search")?;
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("s", query)
            .append_pair("max", &limit.to_string());

        let response: SearchResponse = get_json(&self.client, url, "addy search").await?;

        let candidates = response
            .addresses
            .into_iter()
            .filter_map(|hit| {
                let handle = id_to_string(&hit.id)?;
                Some(AddressCandidate {
                    source: ProviderKind::Addy,
                    handle,
                    address: hit.a,
                    components: Some(AddressComponents {
                        street_number: None,
                        street: hit.street,
                        suburb: hit.suburb,
                        city: hit.city,
                        region: None,
                        postcode: hit.postcode,
                    }),
                    confidence: CANDIDATE_CONFIDENCE,
                })
            })
            .take(limit)
            .collect();

        Ok(candidates)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn address_details(
        &self,
        address_id: &str,
    ) -> Result<Option<ResolvedAddress>, ProviderError> {
        let segment = utf8_percent_encode(address_id, NON_ALPHANUMERIC).to_string();
        let mut url = join(&self.base_url, &format!("address/{segment}"))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let detail: DetailResponse = get_json(&self.client, url, "addy details").await?;

        let (Some(lng), Some(lat)) = (detail.x, detail.y) else {
            tracing::debug!(provider = "addy", address_id, "details carried no coordinates");
            return Ok(None);
        };
        let Ok(coordinates) = Coordinates::new(lat, lng) else {
            tracing::warn!(
                provider = "addy",
                address_id,
                lat,
                lng,
                "details carried invalid coordinates"
            );
            return Ok(None);
        };

        let Some(full_address) = detail.a.or(detail.full) else {
            return Ok(None);
        };

        Ok(Some(ResolvedAddress {
            source: ProviderKind::Addy,
            coordinates,
            full_address,
            components: Some(AddressComponents {
                street_number: None,
                street: detail.street,
                suburb: detail.suburb,
                city: detail.city,
                region: detail.region,
                postcode: detail.postcode,
            }),
        }))
    }
}

impl AddressProvider for AddyClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Addy
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<AddressCandidate>, ProviderError>> {
        Box::pin(self.search_addresses(query, limit))
    }

    fn details<'a>(
        &'a self,
        handle: &'a str,
    ) -> BoxFuture<'a, Result<Option<ResolvedAddress>, ProviderError>> {
        Box::pin(self.address_details(handle))
    }
}
