use std::future::Future;
use std::pin::Pin;

use lawnquote_core::{AddressCandidate, ProviderKind, ResolvedAddress};

use crate::error::ProviderError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One address search backend.
///
/// The resolver holds a prioritised list of these and never branches on
/// which concrete backend it is talking to.
pub trait AddressProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Fuzzy search; at most `limit` candidates, best first.
    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<AddressCandidate>, ProviderError>>;

    /// Coordinates and components for a handle from [`AddressProvider::search`].
    /// `Ok(None)` when the provider knows no location for the handle.
    fn details<'a>(
        &'a self,
        handle: &'a str,
    ) -> BoxFuture<'a, Result<Option<ResolvedAddress>, ProviderError>>;
}
