//! Historical auction results for collectible vehicles.
//!
//! Answers filtered sale-result queries from a DuckDB store of previously
//! captured results, falling back to a live-retrieval service when the store
//! has nothing (or a fresh pull is forced). Every response carries
//! normalized listings plus display-ready market statistics. Grouped
//! aggregation queries ("count by make") run against the store alone.
//!
//! # Quick start
//!
//! ```no_run
//! use auction_results::{AuctionResults, SearchRequest};
//!
//! let client = AuctionResults::builder()
//!     .retriever_url("http://localhost:8080/live-results")
//!     .build()
//!     .unwrap();
//!
//! let response = client
//!     .search(SearchRequest {
//!         make: Some("Porsche".into()),
//!         model: Some("911".into()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod outcome;
pub mod queries;
pub mod retriever;
#[cfg(feature = "server")]
pub mod server;
pub mod sorting;
pub mod sql_builder;
pub mod stats;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncAuctionResults;
pub use connection::Connection;
pub use error::{AuctionError, Result};
pub use models::{FilterSpec, SearchRequest, SearchResponse, Source};
pub use orchestrator::SearchController;
pub use outcome::Outcome;
pub use retriever::{FallbackRetriever, HttpRetriever};
pub use sql_builder::SqlBuilder;
pub use store::PrimaryStore;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use retriever::UnconfiguredRetriever;

// ---------------------------------------------------------------------------
// AuctionResultsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AuctionResults`] client.
///
/// Use [`AuctionResults::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](AuctionResultsBuilder::build).
pub struct AuctionResultsBuilder {
    database_path: Option<PathBuf>,
    in_memory: bool,
    retriever_url: Option<String>,
    timeout: Duration,
    retriever: Option<Box<dyn FallbackRetriever>>,
}

impl Default for AuctionResultsBuilder {
    fn default() -> Self {
        Self {
            database_path: None,
            in_memory: false,
            retriever_url: None,
            timeout: config::DEFAULT_TIMEOUT,
            retriever: None,
        }
    }
}

impl AuctionResultsBuilder {
    /// Set the DuckDB database file.
    ///
    /// If not set, the platform data directory is used (e.g.
    /// `~/.local/share/auction-results/results.duckdb` on Linux).
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a throwaway in-memory store. Overrides `database_path`.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Endpoint of the live-retrieval service.
    ///
    /// Without one (and without a custom [`retriever`](Self::retriever)),
    /// every fallback comes back as `scraper_fallback`.
    pub fn retriever_url(mut self, url: impl Into<String>) -> Self {
        self.retriever_url = Some(url.into());
        self
    }

    /// HTTP timeout for live retrieval. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom live-retrieval collaborator. Takes precedence over
    /// [`retriever_url`](Self::retriever_url).
    pub fn retriever(mut self, retriever: Box<dyn FallbackRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Open the store (creating the results table if needed) and wire up
    /// the retriever.
    pub fn build(self) -> Result<AuctionResults> {
        let conn = if self.in_memory {
            Connection::open_in_memory()?
        } else {
            let path = self.database_path.unwrap_or_else(config::default_database_path);
            Connection::open(path)?
        };
        conn.ensure_results_table()?;

        let retriever: Arc<dyn FallbackRetriever> = match (self.retriever, self.retriever_url) {
            (Some(custom), _) => Arc::from(custom),
            (None, Some(url)) => Arc::new(HttpRetriever::with_timeout(url, self.timeout)?),
            (None, None) => {
                tracing::warn!("No live-retrieval endpoint configured.");
                Arc::new(UnconfiguredRetriever)
            }
        };

        Ok(AuctionResults { conn, retriever })
    }
}

// ---------------------------------------------------------------------------
// AuctionResults
// ---------------------------------------------------------------------------

/// The main entry point: a results store plus a live-retrieval fallback.
///
/// Created via [`AuctionResults::builder()`].
pub struct AuctionResults {
    conn: Connection,
    retriever: Arc<dyn FallbackRetriever>,
}

impl AuctionResults {
    /// Create a new builder for configuring the client.
    pub fn builder() -> AuctionResultsBuilder {
        AuctionResultsBuilder::default()
    }

    /// Access the store query interface.
    pub fn results(&self) -> queries::ResultQuery<'_> {
        queries::ResultQuery::new(&self.conn)
    }

    /// Answer a search or aggregation request.
    pub fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let store = self.results();
        SearchController::new(&store, self.retriever.as_ref()).run(request)
    }

    /// The live-retrieval collaborator. Shared, so callers can run live
    /// pulls without holding on to the store.
    pub fn retriever(&self) -> &Arc<dyn FallbackRetriever> {
        &self.retriever
    }

    /// Distinct makes present in the store.
    pub fn makes(&self) -> Result<Vec<String>> {
        self.results().makes()
    }

    /// Replace the stored results with the contents of a newline-delimited
    /// JSON file, one captured result per line. Returns the row count.
    ///
    /// The table keeps its schema: columns missing from the file are NULL.
    pub fn import_ndjson<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref().to_string_lossy();
        self.conn.import_results_ndjson(&path)
    }

    /// Execute a raw SQL query against the store.
    ///
    /// Escape hatch for queries not covered by the typed interfaces.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Return a reference to the underlying [`Connection`].
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl fmt::Display for AuctionResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .conn
            .execute_scalar(
                &format!("SELECT COUNT(*) FROM {}", config::RESULTS_TABLE),
                &[],
            )
            .ok()
            .flatten()
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        write!(f, "AuctionResults(stored_results={})", rows)
    }
}
