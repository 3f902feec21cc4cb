//! `OpenTopoData` batch elevation lookups.

use lawnquote_core::Coordinates;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{build_client, get_json, join, parse_base_url, ClientSettings};

const DEFAULT_BASE_URL: &str = "https://api.opentopodata.org/v1/";
pub const DEFAULT_DATASET: &str = "nzdem8m";

/// The public API rejects larger batches.
const MAX_LOCATIONS: usize = 100;

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    status: String,
    #[serde(default)]
    results: Vec<ElevationSample>,
}

#[derive(Debug, Deserialize)]
struct ElevationSample {
    elevation: Option<f64>,
}

pub struct ElevationClient {
    client: Client,
    base_url: Url,
    dataset: String,
}

impl ElevationClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(dataset: &str, settings: &ClientSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(dataset, settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        dataset: &str,
        settings: &ClientSettings,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(settings)?,
            base_url: parse_base_url(base_url)?,
            dataset: dataset.to_owned(),
        })
    }

    /// One elevation per input point, in order; `None` where the dataset has
    /// no value (sea, outside coverage).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network failure, a non-2xx status, a
    /// non-`OK` envelope status, or an unexpected body.
    pub async fn elevations(
        &self,
        points: &[Coordinates],
    ) -> Result<Vec<Option<f64>>, ProviderError> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let locations = points
            .iter()
            .take(MAX_LOCATIONS)
            .map(|p| format!("{},{}", p.lat, p.lng))
            .collect::<Vec<_>>()
            .join("|");

        let mut url = join(&self.base_url, &self.dataset)?;
        url.query_pairs_mut().append_pair("locations", &locations);

        let response: ElevationResponse = get_json(&self.client, url, "opentopodata").await?;
        if response.status != "OK" {
            return Err(ProviderError::ApiStatus {
                provider: "opentopodata",
                status: response.status,
            });
        }

        Ok(response.results.into_iter().map(|r| r.elevation).collect())
    }
}
