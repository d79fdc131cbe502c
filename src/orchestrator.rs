//! Request orchestration: validation, source selection, normalization,
//! statistics, and ordering.
//!
//! The listing path always produces a response, possibly empty: the store is
//! tried first (unless a live pull is forced), live retrieval second, and a
//! failed retrieval yields an empty `scraper_fallback` result. The
//! aggregation path runs against the store only and surfaces its failures.

use crate::error::Result;
use crate::models::{
    AggregationEnvelope, FilterSpec, RawRecord, ResponseEnvelope, SearchRequest, SearchResponse,
    Sorting, Source,
};
use crate::normalize::normalize_all;
use crate::outcome::Outcome;
use crate::queries::AggregationQuery;
use crate::retriever::FallbackRetriever;
use crate::sorting::{post_filter, sort_results};
use crate::stats::summarize;
use crate::store::PrimaryStore;

/// Source-selection states of the listing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    QueryStore,
    Retrieve,
    Done(Source),
}

/// Runs one request against a store and a fallback retriever.
pub struct SearchController<'a> {
    store: &'a dyn PrimaryStore,
    retriever: &'a dyn FallbackRetriever,
}

impl<'a> SearchController<'a> {
    pub fn new(store: &'a dyn PrimaryStore, retriever: &'a dyn FallbackRetriever) -> Self {
        Self { store, retriever }
    }

    /// Validate `request` and answer it.
    ///
    /// Only validation errors and aggregation store failures are returned
    /// as `Err`; listing-path source failures become fallbacks.
    pub fn run(&self, request: SearchRequest) -> Result<SearchResponse> {
        let filter = FilterSpec::from_request(&request)?;

        if filter.is_aggregation() {
            return self.aggregate(&filter, request).map(SearchResponse::Aggregated);
        }

        let (source, raw) = self.select_source(&filter);

        // Statistics come from the raw records, before client-side filtering.
        let summary = summarize(&raw);
        let mut results = normalize_all(&raw);

        if source != Source::Database {
            let before = results.len();
            results = post_filter(results, &filter);
            tracing::debug!(before, after = results.len(), "Post-filtered live results.");
        }

        let sort_by = filter.sort_by();
        let sort_order = filter.sort_order();
        sort_results(&mut results, &sort_by, sort_order);

        let message = match source {
            Source::Database => format!("Found {} results in database", results.len()),
            Source::Scraper => format!("Retrieved {} live results", results.len()),
            Source::ScraperFallback => "Live retrieval failed; no results available".to_string(),
        };
        tracing::info!(source = source.as_str(), count = results.len(), "Search complete.");

        Ok(SearchResponse::Results(ResponseEnvelope {
            message,
            summary,
            results,
            source,
            sorting: Sorting {
                sort_by: sort_by.to_string(),
                sort_order,
            },
            filters: request,
        }))
    }

    /// Walk the source states until one produces the request's records.
    pub fn select_source(&self, filter: &FilterSpec) -> (Source, Vec<RawRecord>) {
        let mut records = Vec::new();
        let mut stage = if filter.force_scrape {
            tracing::info!("Live pull forced; skipping store.");
            Stage::Retrieve
        } else {
            Stage::QueryStore
        };

        loop {
            stage = match stage {
                Stage::QueryStore => match self.store.fetch(filter) {
                    Outcome::Rows(rows) => {
                        records = rows.into_iter().map(RawRecord::Store).collect();
                        Stage::Done(Source::Database)
                    }
                    Outcome::Empty => {
                        tracing::info!("No stored results; falling back to live retrieval.");
                        Stage::Retrieve
                    }
                    Outcome::Failed(e) => {
                        tracing::warn!(error = %e, "Store query failed; falling back to live retrieval.");
                        Stage::Retrieve
                    }
                },
                Stage::Retrieve => match self.retriever.retrieve(filter) {
                    Outcome::Rows(rows) => {
                        records = rows.into_iter().map(RawRecord::Retrieved).collect();
                        Stage::Done(Source::Scraper)
                    }
                    Outcome::Empty => Stage::Done(Source::Scraper),
                    Outcome::Failed(e) => {
                        tracing::warn!(error = %e, "Live retrieval failed; returning empty results.");
                        Stage::Done(Source::ScraperFallback)
                    }
                },
                Stage::Done(source) => return (source, records),
            };
        }
    }

    fn aggregate(&self, filter: &FilterSpec, request: SearchRequest) -> Result<AggregationEnvelope> {
        let rows = AggregationQuery::new(self.store).aggregate(filter)?;
        Ok(AggregationEnvelope {
            message: format!("Found {} groups", rows.len()),
            results: rows,
            source: Source::Database,
            sorting: Sorting {
                sort_by: filter.sort_by().to_string(),
                sort_order: filter.sort_order(),
            },
            filters: request,
        })
    }
}
