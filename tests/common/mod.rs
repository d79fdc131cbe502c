//! Shared fixtures for the integration tests.
//!
//! `sample_client()` builds an in-memory store loaded with a handful of
//! captured results (via an NDJSON temp file). The test doubles at the bottom
//! stand in for the store and the live retriever and count their calls.

#![allow(dead_code)]

use std::cell::Cell;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use auction_results::error::{AuctionError, Result};
use auction_results::models::{
    AggregationPlan, AggregationRow, FilterSpec, RetrievedRecord, StoreRecord,
};
use auction_results::{AuctionResults, FallbackRetriever, PrimaryStore};
use tempfile::NamedTempFile;

/// In-memory client with the sample results loaded and no live retriever.
pub fn sample_client() -> AuctionResults {
    let client = AuctionResults::builder().in_memory(true).build().unwrap();
    load_sample_results(&client);
    client
}

/// In-memory client with the sample results and the given retriever.
pub fn sample_client_with(retriever: Box<dyn FallbackRetriever>) -> AuctionResults {
    let client = AuctionResults::builder()
        .in_memory(true)
        .retriever(retriever)
        .build()
        .unwrap();
    load_sample_results(&client);
    client
}

pub fn load_sample_results(client: &AuctionResults) {
    let rows = vec![
        serde_json::json!({
            "title": "2016 Porsche 911 GT3 RS",
            "year": 2016,
            "make": "Porsche",
            "model": "911",
            "sold_price": 215000,
            "bid_amount": 215000,
            "sold_date": "2023-05-10",
            "status": "sold",
            "url": "https://example.com/listing/gt3rs",
            "mileage": 8000,
            "bidders": 30,
            "watchers": 900,
            "comments": 120,
            "image_url": "https://example.com/img/gt3rs.jpg",
            "transmission": "Manual",
            "normalized_color": "Red"
        }),
        serde_json::json!({
            "title": "2019 Porsche 911 Carrera T",
            "year": 2019,
            "make": "Porsche",
            "model": "911",
            "sold_price": 128500,
            "bid_amount": 128500,
            "sold_date": "2024-01-20",
            "status": "sold",
            "url": "https://example.com/listing/carrera-t",
            "mileage": 12000,
            "bidders": 22,
            "watchers": 610,
            "comments": 75,
            "image_url": "https://example.com/img/carrera-t.jpg",
            "transmission": "Manual",
            "normalized_color": "Silver"
        }),
        serde_json::json!({
            "title": "2018 Porsche 911 Turbo S",
            "year": 2018,
            "make": "Porsche",
            "model": "911",
            "sold_price": null,
            "bid_amount": 150000,
            "sold_date": "2023-11-02",
            "status": "unsold",
            "url": "https://example.com/listing/turbo-s",
            "mileage": 15000,
            "bidders": 12,
            "watchers": 450,
            "comments": 40,
            "image_url": null,
            "transmission": "Automatic",
            "normalized_color": "Black"
        }),
        serde_json::json!({
            "title": "2012 Porsche Cayenne Turbo",
            "year": 2012,
            "make": "Porsche",
            "model": "Cayenne",
            "sold_price": 28000,
            "bid_amount": 28000,
            "sold_date": "2022-07-14",
            "status": "sold",
            "url": "https://example.com/listing/cayenne",
            "mileage": 80000,
            "bidders": 9,
            "watchers": 200,
            "comments": 18,
            "image_url": null,
            "transmission": "Automatic",
            "normalized_color": "White"
        }),
        serde_json::json!({
            "title": "1995 BMW M3 Coupe",
            "year": 1995,
            "make": "BMW",
            "model": "M3",
            "sold_price": 42000,
            "bid_amount": 42000,
            "sold_date": "2023-03-03",
            "status": "sold",
            "url": "https://example.com/listing/m3",
            "mileage": 120000,
            "bidders": 15,
            "watchers": 380,
            "comments": 55,
            "image_url": null,
            "transmission": "Manual",
            "normalized_color": "Red"
        }),
        serde_json::json!({
            "title": "2001 BMW M5",
            "year": 2001,
            "make": "BMW",
            "model": "M5",
            "sold_price": 35000,
            "bid_amount": 35000,
            "sold_date": "2024-02-11",
            "status": "sold",
            "url": "https://example.com/listing/m5",
            "mileage": null,
            "bidders": 11,
            "watchers": 290,
            "comments": 33,
            "image_url": null,
            "transmission": "Manual",
            "normalized_color": "Black"
        }),
        serde_json::json!({
            "title": "2021 Ferrari F8 Tributo &#8211; Rosso Corsa",
            "year": 2021,
            "make": "Ferrari",
            "model": "F8 Tributo",
            "sold_price": null,
            "bid_amount": 240000,
            "sold_date": "2024-03-01",
            "status": "unsold",
            "url": "https://example.com/listing/f8",
            "mileage": 3000,
            "bidders": 8,
            "watchers": 700,
            "comments": 64,
            "image_url": null,
            "transmission": "Automatic",
            "normalized_color": "Red"
        }),
    ];

    let mut file = NamedTempFile::new().unwrap();
    for row in &rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    client.import_ndjson(file.path()).unwrap();
    // The temp file is dropped here; DuckDB has already copied the rows.
}

pub fn store_record(title: &str, status: &str, sold_price: Option<f64>, sold_date: &str) -> StoreRecord {
    StoreRecord {
        title: Some(title.to_string()),
        status: Some(status.to_string()),
        sold_price,
        sold_date: Some(sold_date.to_string()),
        ..Default::default()
    }
}

pub fn retrieved_record(
    title: &str,
    status: &str,
    sold_price: &str,
    transmission: Option<&str>,
) -> RetrievedRecord {
    RetrievedRecord {
        title: Some(title.to_string()),
        status: Some(status.to_string()),
        sold_price: Some(sold_price.to_string()),
        transmission: transmission.map(str::to_string),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Store double returning canned rows, or failing on demand.
#[derive(Default)]
pub struct MockStore {
    pub records: Vec<StoreRecord>,
    pub groups: Vec<AggregationRow>,
    pub fail: bool,
    pub query_calls: Cell<usize>,
    pub grouped_calls: Cell<usize>,
}

impl MockStore {
    pub fn with_records(records: Vec<StoreRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl PrimaryStore for MockStore {
    fn query(&self, _filter: &FilterSpec) -> Result<Vec<StoreRecord>> {
        self.query_calls.set(self.query_calls.get() + 1);
        if self.fail {
            return Err(AuctionError::Store("connection refused".into()));
        }
        Ok(self.records.clone())
    }

    fn grouped(&self, _filter: &FilterSpec, _plan: &AggregationPlan) -> Result<Vec<AggregationRow>> {
        self.grouped_calls.set(self.grouped_calls.get() + 1);
        if self.fail {
            return Err(AuctionError::Store("connection refused".into()));
        }
        Ok(self.groups.clone())
    }
}

/// Retriever double returning canned records, or failing on demand. The
/// call counter is shared so it can be read after the double is boxed.
#[derive(Default, Clone)]
pub struct MockRetriever {
    pub records: Vec<RetrievedRecord>,
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl MockRetriever {
    pub fn with_records(records: Vec<RetrievedRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FallbackRetriever for MockRetriever {
    fn fetch(&self, _filter: &FilterSpec) -> Result<Vec<RetrievedRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AuctionError::Retrieval("upstream timed out".into()));
        }
        Ok(self.records.clone())
    }
}
