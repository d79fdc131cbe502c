use serde::{Deserialize, Serialize};

use crate::models::aggregation::AggregationRow;
use crate::models::filter::{SearchRequest, SortOrder};
use crate::models::result::{NormalizedResult, SummaryStatistics};

/// Which source contributed the records of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Database,
    Scraper,
    /// Live retrieval was attempted and failed; results are empty.
    ScraperFallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Database => "database",
            Source::Scraper => "scraper",
            Source::ScraperFallback => "scraper_fallback",
        }
    }
}

/// Effective ordering echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    pub sort_by: String,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub message: String,
    pub summary: SummaryStatistics,
    pub results: Vec<NormalizedResult>,
    pub source: Source,
    pub sorting: Sorting,
    pub filters: SearchRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationEnvelope {
    pub message: String,
    pub results: Vec<AggregationRow>,
    pub source: Source,
    pub sorting: Sorting,
    pub filters: SearchRequest,
}

/// Outcome of a search request: either listings or grouped rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Results(ResponseEnvelope),
    Aggregated(AggregationEnvelope),
}

impl SearchResponse {
    pub fn source(&self) -> Source {
        match self {
            SearchResponse::Results(r) => r.source,
            SearchResponse::Aggregated(a) => a.source,
        }
    }

    pub fn results(&self) -> Option<&ResponseEnvelope> {
        match self {
            SearchResponse::Results(r) => Some(r),
            SearchResponse::Aggregated(_) => None,
        }
    }

    pub fn aggregated(&self) -> Option<&AggregationEnvelope> {
        match self {
            SearchResponse::Results(_) => None,
            SearchResponse::Aggregated(a) => Some(a),
        }
    }
}
