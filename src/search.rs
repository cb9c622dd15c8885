//! Artist search facade.
//!
//! The object a front end holds: one circuit breaker guarding the catalog's
//! resolve-then-fetch operation.
//!
//! ```text
//! execute(query)
//!     → trim / reject empty
//!     → CircuitBreaker::execute
//!         → CatalogClient::search (search/artist, then artist/<id>/top)
//!     → tracks, or SearchError (CircuitOpen distinguished)
//! ```

use futures_util::future::{BoxFuture, FutureExt};
use std::sync::Arc;

use crate::catalog::{CatalogClient, TrackRecord};
use crate::config::SearchConfig;
use crate::error::{InitError, SearchError, SearchResult};
use crate::remote::{HttpTransport, RemoteCallAdapter, Transport};
use crate::resilience::circuit_breaker::{BreakerState, CircuitBreaker};

/// Name used for the catalog breaker in logs and metrics.
pub const BREAKER_NAME: &str = "catalog";

type SearchOp = Box<dyn FnMut(String) -> BoxFuture<'static, SearchResult<Vec<TrackRecord>>> + Send>;

/// Searches an artist's top tracks behind a circuit breaker.
///
/// `execute` borrows mutably: one search at a time per instance.
pub struct ArtistSearch {
    breaker: CircuitBreaker<SearchOp>,
}

impl ArtistSearch {
    /// Build with the HTTP transport described by `config`.
    pub fn new(config: &SearchConfig) -> Result<Self, InitError> {
        let transport = HttpTransport::new(&config.api.user_agent)?;
        Self::with_transport(config, transport)
    }

    /// Build over an arbitrary transport.
    pub fn with_transport<T: Transport>(config: &SearchConfig, transport: T) -> Result<Self, InitError> {
        let adapter = RemoteCallAdapter::new(transport, config.timeouts.request());
        let catalog = Arc::new(CatalogClient::new(adapter, &config.api)?);

        let op: SearchOp = Box::new(move |query: String| {
            let catalog = Arc::clone(&catalog);
            async move { catalog.search(&query).await }.boxed()
        });

        tracing::debug!(
            base_url = %config.api.base_url,
            failure_threshold = config.breaker.failure_threshold,
            recovery_timeout_ms = config.breaker.recovery_timeout_ms,
            request_timeout_ms = config.timeouts.request_ms,
            "Artist search initialized"
        );

        Ok(Self {
            breaker: CircuitBreaker::new(BREAKER_NAME, &config.breaker, op),
        })
    }

    /// Top tracks of the artist best matching `query`.
    pub async fn execute(&mut self, query: &str) -> SearchResult<Vec<TrackRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery("query is empty".to_string()));
        }

        tracing::info!(query, state = %self.breaker.state(), "Searching artist");
        self.breaker
            .execute(query.to_string())
            .await
            .map_err(SearchError::from)
    }

    pub fn breaker_state(&self) -> BreakerState {
        self.breaker.state()
    }

    pub fn failure_count(&self) -> u32 {
        self.breaker.failure_count()
    }
}

impl std::fmt::Debug for ArtistSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtistSearch")
            .field("breaker", &self.breaker)
            .finish()
    }
}
