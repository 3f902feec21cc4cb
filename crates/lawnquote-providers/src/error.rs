use thiserror::Error;

/// Failure talking to one external service.
///
/// Error messages carry a short context label (`"addy search"`) rather than the
/// request URL because several providers embed API keys in the URL.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    /// Always built through [`ProviderError::http`], which strips the URL.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("unexpected HTTP status {status} from {context}")]
    UnexpectedStatus { status: u16, context: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service answered 200 but reported a failure in its envelope.
    #[error("{provider} returned status {status}")]
    ApiStatus {
        provider: &'static str,
        status: String,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ProviderError {
    pub(crate) fn http(error: reqwest::Error) -> Self {
        Self::Http(error.without_url())
    }
}

/// The only failures that abort an analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not resolve address '{input}'")]
    AddressNotResolved { input: String },
}

impl AnalysisError {
    /// Hint shown to the user alongside an unresolved address.
    pub const SUGGESTION: &'static str =
        "Please select an address from the autocomplete suggestions";
}
