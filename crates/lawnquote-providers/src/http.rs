//! Plumbing shared by every provider client.

use std::time::Duration;

use lawnquote_core::AppConfig;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

const DEFAULT_TIMEOUT_SECS: u64 = 8;
const DEFAULT_USER_AGENT: &str = "lawnquote/0.1 (property-analysis)";

/// Timeout and identification applied to every outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.provider_timeout_secs,
            user_agent: config.provider_user_agent.clone(),
        }
    }
}

pub(crate) fn build_client(settings: &ClientSettings) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
        .user_agent(settings.user_agent.as_str())
        .build()
        .map_err(ProviderError::http)?;
    Ok(client)
}

/// Parses `base_url`, normalised to end in exactly one slash so that
/// [`Url::join`] appends to it instead of replacing the last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ProviderError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url, ProviderError> {
    base.join(path).map_err(|e| ProviderError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Sends a GET, requires a 2xx status, and decodes the body as `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: Url,
    context: &str,
) -> Result<T, ProviderError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(ProviderError::http)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::UnexpectedStatus {
            status: status.as_u16(),
            context: context.to_string(),
        });
    }

    let body = response.text().await.map_err(ProviderError::http)?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

/// Provider ids arrive as either JSON strings or numbers.
pub(crate) fn id_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
