//! Async client: builder and request dispatch on the blocking pool.

#![cfg(feature = "async")]

mod common;

use std::time::{Duration, Instant};

use auction_results::error::Result;
use auction_results::models::{FilterSpec, RetrievedRecord, SearchRequest};
use auction_results::{AsyncAuctionResults, FallbackRetriever, Source};

/// Live retriever that takes a while to answer with nothing.
struct SlowRetriever(Duration);

impl FallbackRetriever for SlowRetriever {
    fn fetch(&self, _filter: &FilterSpec) -> Result<Vec<RetrievedRecord>> {
        std::thread::sleep(self.0);
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn builder_opens_empty_store() {
    let client = AsyncAuctionResults::builder()
        .in_memory(true)
        .build()
        .await
        .unwrap();

    assert!(client.makes().await.unwrap().is_empty());

    let response = client
        .search(SearchRequest {
            make: Some("Porsche".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(response.source(), Source::ScraperFallback);
}

#[tokio::test]
async fn clones_share_one_store() {
    let client = AsyncAuctionResults::from_sync(common::sample_client());
    let other = client.clone();

    let (a, b) = tokio::join!(
        client.search(SearchRequest {
            make: Some("BMW".into()),
            ..Default::default()
        }),
        other.makes(),
    );

    assert_eq!(a.unwrap().results().unwrap().results.len(), 2);
    assert_eq!(b.unwrap().len(), 3);
}

#[tokio::test]
async fn validation_errors_pass_through() {
    let client = AsyncAuctionResults::from_sync(common::sample_client());

    let err = client.search(SearchRequest::default()).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_live_pull_does_not_block_store_reads() {
    let client = AsyncAuctionResults::from_sync(common::sample_client_with(Box::new(
        SlowRetriever(Duration::from_millis(1500)),
    )));

    let searching = tokio::spawn({
        let client = client.clone();
        async move {
            client
                .search(SearchRequest {
                    make: Some("Porsche".into()),
                    force_scrape: Some(true),
                    ..Default::default()
                })
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    let makes = client.makes().await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(makes.len(), 3);

    let response = searching.await.unwrap().unwrap();
    assert_eq!(response.source(), Source::Scraper);
}
