//! Async wrapper around [`AuctionResults`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free. Store
//! queries are fast, but live retrieval can take seconds per page, so the
//! store lock is taken per query and never held across a live pull.
//!
//! # Example
//!
//! ```no_run
//! use auction_results::{AsyncAuctionResults, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AsyncAuctionResults::builder().build().await.unwrap();
//!
//!     let response = client
//!         .search(SearchRequest {
//!             make: Some("Ferrari".into()),
//!             ..Default::default()
//!         })
//!         .await
//!         .unwrap();
//! }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{AuctionError, Result};
use crate::models::{
    AggregationPlan, AggregationRow, FilterSpec, SearchRequest, SearchResponse, StoreRecord,
};
use crate::orchestrator::SearchController;
use crate::retriever::FallbackRetriever;
use crate::store::PrimaryStore;
use crate::{AuctionResults, AuctionResultsBuilder};

// ---------------------------------------------------------------------------
// AsyncAuctionResultsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncAuctionResults`] instance.
#[derive(Default)]
pub struct AsyncAuctionResultsBuilder {
    inner: AuctionResultsBuilder,
}

impl AsyncAuctionResultsBuilder {
    /// See [`AuctionResultsBuilder::database_path`].
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.database_path(path);
        self
    }

    /// See [`AuctionResultsBuilder::in_memory`].
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.inner = self.inner.in_memory(in_memory);
        self
    }

    /// See [`AuctionResultsBuilder::retriever_url`].
    pub fn retriever_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.retriever_url(url);
        self
    }

    /// See [`AuctionResultsBuilder::timeout`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    /// See [`AuctionResultsBuilder::retriever`].
    pub fn retriever(mut self, retriever: Box<dyn FallbackRetriever>) -> Self {
        self.inner = self.inner.retriever(retriever);
        self
    }

    /// Build the client on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncAuctionResults> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || {
            let client = inner.build()?;
            Ok(AsyncAuctionResults::from_sync(client))
        })
        .await
        .map_err(|e| AuctionError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncAuctionResults
// ---------------------------------------------------------------------------

/// Async wrapper around [`AuctionResults`].
///
/// The DuckDB connection is not `Sync`, so the client sits behind a
/// [`Mutex`]. Store queries take turns; live retrieval runs outside the
/// lock and may overlap with other requests.
#[derive(Clone)]
pub struct AsyncAuctionResults {
    inner: Arc<Mutex<AuctionResults>>,
    retriever: Arc<dyn FallbackRetriever>,
}

impl AsyncAuctionResults {
    /// Create a new builder for configuring the async client.
    pub fn builder() -> AsyncAuctionResultsBuilder {
        AsyncAuctionResultsBuilder::default()
    }

    /// Wrap an already-built sync client.
    pub fn from_sync(client: AuctionResults) -> Self {
        let retriever = Arc::clone(client.retriever());
        Self {
            inner: Arc::new(Mutex::new(client)),
            retriever,
        }
    }

    /// Run a sync operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&AuctionResults) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = lock(&client)?;
            f(&guard)
        })
        .await
        .map_err(|e| AuctionError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Answer a search or aggregation request asynchronously.
    ///
    /// Only the store queries hold the client lock.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let client = self.inner.clone();
        let retriever = self.retriever.clone();
        tokio::task::spawn_blocking(move || {
            let store = SharedStore { client: &client };
            SearchController::new(&store, retriever.as_ref()).run(request)
        })
        .await
        .map_err(|e| AuctionError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Distinct makes present in the store.
    pub async fn makes(&self) -> Result<Vec<String>> {
        self.run(|c| c.makes()).await
    }
}

// ---------------------------------------------------------------------------
// SharedStore
// ---------------------------------------------------------------------------

/// Store adapter that locks the shared client for the duration of one query.
struct SharedStore<'a> {
    client: &'a Mutex<AuctionResults>,
}

impl PrimaryStore for SharedStore<'_> {
    fn query(&self, filter: &FilterSpec) -> Result<Vec<StoreRecord>> {
        lock(self.client)?.results().query(filter)
    }

    fn grouped(&self, filter: &FilterSpec, plan: &AggregationPlan) -> Result<Vec<AggregationRow>> {
        lock(self.client)?.results().grouped(filter, plan)
    }
}

fn lock(client: &Mutex<AuctionResults>) -> Result<MutexGuard<'_, AuctionResults>> {
    client
        .lock()
        .map_err(|_| AuctionError::InvalidArgument("client lock poisoned".into()))
}
