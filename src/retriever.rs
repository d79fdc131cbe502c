//! Live-retrieval collaborator.
//!
//! The controller only needs [`FallbackRetriever::fetch`]. [`HttpRetriever`]
//! implements it against a retrieval service that pages through live auction
//! results and returns them as JSON; page parsing happens on that service.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config;
use crate::error::{AuctionError, Result};
use crate::models::{FilterSpec, RetrievedRecord, StatusFilter};
use crate::outcome::Outcome;

/// Contract for pulling live results when the store cannot answer.
///
/// Implementations are shared across concurrent requests.
pub trait FallbackRetriever: Send + Sync {
    /// Fetch up to `filter.max_pages` pages of results.
    fn fetch(&self, filter: &FilterSpec) -> Result<Vec<RetrievedRecord>>;

    /// [`fetch`](Self::fetch), classified into an [`Outcome`].
    fn retrieve(&self, filter: &FilterSpec) -> Outcome<RetrievedRecord> {
        Outcome::from(self.fetch(filter))
    }
}

/// Retriever used when none is configured. Always fails, so requests that
/// reach it come back tagged `scraper_fallback`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredRetriever;

impl FallbackRetriever for UnconfiguredRetriever {
    fn fetch(&self, _filter: &FilterSpec) -> Result<Vec<RetrievedRecord>> {
        Err(AuctionError::Retrieval(
            "no live-retrieval endpoint configured".into(),
        ))
    }
}

/// A page as returned by the retrieval service.
#[derive(Deserialize)]
#[serde(untagged)]
enum Page {
    Bare(Vec<RetrievedRecord>),
    Wrapped { results: Vec<RetrievedRecord> },
}

impl Page {
    fn into_records(self) -> Vec<RetrievedRecord> {
        match self {
            Page::Bare(records) | Page::Wrapped { results: records } => records,
        }
    }
}

/// Blocking HTTP client for a live-retrieval service.
///
/// Sends `GET {endpoint}?make=..&model=..&page=N` for each page in turn and
/// stops at the first empty page.
pub struct HttpRetriever {
    endpoint: String,
    client: Client,
}

impl HttpRetriever {
    /// Create a retriever for `endpoint` with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, config::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query parameters describing `filter`, without the page number.
    pub fn query_params(filter: &FilterSpec) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(make) = &filter.make {
            params.push(("make", make.clone()));
        }
        if let Some(model) = &filter.model {
            params.push(("model", model.clone()));
        }
        if let Some(y) = filter.year_min {
            params.push(("yearMin", y.to_string()));
        }
        if let Some(y) = filter.year_max {
            params.push(("yearMax", y.to_string()));
        }
        if let Some(d) = filter.sold_date_min {
            params.push(("soldDateMin", d.to_string()));
        }
        if let Some(d) = filter.sold_date_max {
            params.push(("soldDateMax", d.to_string()));
        }
        match filter.status {
            StatusFilter::Any => {}
            StatusFilter::Sold => params.push(("status", "sold".into())),
            StatusFilter::Unsold => params.push(("status", "unsold".into())),
        }
        if let Some(t) = &filter.transmission {
            params.push(("transmission", t.clone()));
        }
        params
    }

    fn fetch_page(&self, filter: &FilterSpec, page: u32) -> Result<Vec<RetrievedRecord>> {
        let mut params = Self::query_params(filter);
        params.push(("page", page.to_string()));

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()?
            .error_for_status()?;
        let page: Page = resp.json()?;
        Ok(page.into_records())
    }
}

impl FallbackRetriever for HttpRetriever {
    fn fetch(&self, filter: &FilterSpec) -> Result<Vec<RetrievedRecord>> {
        let mut records = Vec::new();
        for page in 1..=filter.max_pages {
            let batch = self.fetch_page(filter, page)?;
            tracing::debug!(page, count = batch.len(), "Fetched live results page.");
            if batch.is_empty() {
                break;
            }
            records.extend(batch);
        }
        Ok(records)
    }
}
