//! Prioritised address resolution over any number of [`AddressProvider`]s.

use std::collections::HashSet;
use std::sync::Arc;

use lawnquote_core::{
    is_in_service_area, with_region_hint, AddressCandidate, ProviderKind, ResolvedAddress,
};

use crate::error::AnalysisError;
use crate::provider::AddressProvider;

/// Queries shorter than this return no suggestions.
pub const MIN_SUGGEST_QUERY_CHARS: usize = 3;
/// Suggestions returned to the UI.
pub const MAX_SUGGESTIONS: usize = 6;
/// Raw hits requested so enough survive the service-area filter.
const SUGGEST_FETCH_LIMIT: usize = 15;

/// What the caller knows about the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressQuery<'a> {
    Text(&'a str),
    Handle {
        provider: ProviderKind,
        handle: &'a str,
    },
}

impl AddressQuery<'_> {
    fn describe(&self) -> String {
        match self {
            AddressQuery::Text(text) => (*text).to_string(),
            AddressQuery::Handle { provider, handle } => format!("{provider}:{handle}"),
        }
    }
}

pub struct AddressResolver {
    providers: Vec<Arc<dyn AddressProvider>>,
    region_hint: String,
}

impl AddressResolver {
    /// `providers` are consulted in order.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn AddressProvider>>, region_hint: &str) -> Self {
        Self {
            providers,
            region_hint: region_hint.to_owned(),
        }
    }

    #[must_use]
    pub fn configured(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    fn provider(&self, kind: ProviderKind) -> Option<&Arc<dyn AddressProvider>> {
        self.providers.iter().find(|p| p.kind() == kind)
    }

    /// Autocomplete suggestions within the service area.
    ///
    /// A later provider is only asked when every earlier one came back empty.
    /// Provider failures are logged and skipped.
    pub async fn suggest(&self, query: &str) -> Vec<AddressCandidate> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGEST_QUERY_CHARS {
            return Vec::new();
        }

        let search_query = with_region_hint(query, &self.region_hint);

        for provider in &self.providers {
            let kind = provider.kind();
            match provider.search(&search_query, SUGGEST_FETCH_LIMIT).await {
                Ok(candidates) => {
                    let filtered = filter_suggestions(candidates);
                    tracing::debug!(provider = %kind, count = filtered.len(), "suggestions");
                    if !filtered.is_empty() {
                        return filtered;
                    }
                }
                Err(e) => {
                    tracing::warn!(provider = %kind, error = %e, "address search failed");
                }
            }
        }

        Vec::new()
    }

    /// Details for a handle previously returned by [`AddressResolver::suggest`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::AddressNotResolved`] when the provider is not
    /// configured, fails, or has no location for the handle.
    pub async fn details(
        &self,
        provider: ProviderKind,
        handle: &str,
    ) -> Result<ResolvedAddress, AnalysisError> {
        self.resolve(AddressQuery::Handle { provider, handle }).await
    }

    /// Turn a query into coordinates.
    ///
    /// Free text goes to each provider in turn: search, take the top hit, fetch
    /// its details. A handle goes straight to its own provider.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::AddressNotResolved`] when no provider produced
    /// coordinates.
    pub async fn resolve(
        &self,
        query: AddressQuery<'_>,
    ) -> Result<ResolvedAddress, AnalysisError> {
        let resolved = match query {
            AddressQuery::Handle { provider, handle } => {
                self.resolve_handle(provider, handle).await
            }
            AddressQuery::Text(text) => self.resolve_text(text).await,
        };

        resolved.ok_or_else(|| AnalysisError::AddressNotResolved {
            input: query.describe(),
        })
    }

    async fn resolve_handle(&self, kind: ProviderKind, handle: &str) -> Option<ResolvedAddress> {
        let Some(provider) = self.provider(kind) else {
            tracing::warn!(provider = %kind, "address provider not configured");
            return None;
        };

        match provider.details(handle).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(provider = %kind, error = %e, "address details failed");
                None
            }
        }
    }

    async fn resolve_text(&self, text: &str) -> Option<ResolvedAddress> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        for provider in &self.providers {
            let kind = provider.kind();
            let top = match provider.search(text, 1).await {
                Ok(candidates) => candidates.into_iter().next(),
                Err(e) => {
                    tracing::warn!(provider = %kind, error = %e, "address search failed");
                    continue;
                }
            };
            let Some(top) = top else {
                tracing::debug!(provider = %kind, "no search results");
                continue;
            };

            match provider.details(&top.handle).await {
                Ok(Some(resolved)) => return Some(resolved),
                Ok(None) => {
                    tracing::debug!(provider = %kind, handle = %top.handle, "top hit has no location");
                }
                Err(e) => tracing::warn!(provider = %kind, error = %e, "address details failed"),
            }
        }

        None
    }
}

/// Service-area filter, case-insensitive de-duplication, truncation.
fn filter_suggestions(candidates: Vec<AddressCandidate>) -> Vec<AddressCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| is_in_service_area(&c.address))
        .filter(|c| seen.insert(c.address.to_lowercase()))
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
