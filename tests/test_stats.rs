//! Summary statistics over mixed-source records.

mod common;

use auction_results::models::{RawRecord, StoreRecord};
use auction_results::stats::{average_mileage, sold_percentage, summarize};
use common::{retrieved_record, store_record};

fn with_mileage(mileage: Option<i64>) -> RawRecord {
    RawRecord::Store(StoreRecord {
        status: Some("sold".into()),
        mileage,
        ..Default::default()
    })
}

#[test]
fn empty_set_has_placeholders() {
    let s = summarize(&[]);
    assert_eq!(s.total_results, 0);
    assert_eq!(s.average_sold_price, "N/A");
    assert_eq!(s.highest_sold_price, "N/A");
    assert_eq!(s.lowest_sold_price, "N/A");
    assert_eq!(s.sold_percentage, "0%");
    assert_eq!(s.average_mileage, "N/A");
}

#[test]
fn sold_percentage_rounds_to_whole_percent() {
    let sold = || RawRecord::from(store_record("a", "sold", Some(1.0), "2024-01-01"));
    let unsold = || RawRecord::from(store_record("b", "unsold", None, "2024-01-01"));

    assert_eq!(sold_percentage(&[sold(), sold(), sold(), unsold()]), "75%");
    assert_eq!(sold_percentage(&[sold(), unsold(), unsold()]), "33%");
    assert_eq!(sold_percentage(&[sold(), sold(), unsold()]), "67%");
    assert_eq!(sold_percentage(&[unsold()]), "0%");
}

#[test]
fn status_match_ignores_case() {
    let records = vec![RawRecord::from(store_record("a", "SOLD", Some(5000.0), "2024-01-01"))];
    let s = summarize(&records);
    assert_eq!(s.sold_percentage, "100%");
    assert_eq!(s.average_sold_price, "$5,000");
}

#[test]
fn average_rounds_half_up() {
    let records = vec![
        RawRecord::from(store_record("a", "sold", Some(199.0), "2024-01-01")),
        RawRecord::from(store_record("b", "sold", Some(200.0), "2024-01-02")),
    ];
    let s = summarize(&records);
    assert_eq!(s.average_sold_price, "$200");
    assert_eq!(s.highest_sold_price, "$200");
    assert_eq!(s.lowest_sold_price, "$199");
}

#[test]
fn average_of_two_sales() {
    let records = vec![
        RawRecord::from(store_record("a", "sold", Some(100.0), "2024-01-01")),
        RawRecord::from(store_record("b", "sold", Some(300.0), "2024-01-02")),
    ];
    assert_eq!(summarize(&records).average_sold_price, "$200");
}

#[test]
fn unsold_prices_are_ignored() {
    let records = vec![
        RawRecord::from(store_record("a", "sold", Some(30000.0), "2024-01-01")),
        RawRecord::from(store_record("b", "unsold", Some(90000.0), "2024-01-02")),
    ];
    let s = summarize(&records);
    assert_eq!(s.total_results, 2);
    assert_eq!(s.highest_sold_price, "$30,000");
    assert_eq!(s.sold_percentage, "50%");
}

#[test]
fn retrieved_prices_are_parsed_from_display_strings() {
    let records = vec![
        RawRecord::from(retrieved_record("a", "sold", "$12,345", None)),
        RawRecord::from(retrieved_record("b", "sold", "$10,000", None)),
        // Carries no number, so it does not count towards the price stats.
        RawRecord::from(retrieved_record("c", "sold", "Not sold", None)),
    ];
    let s = summarize(&records);
    assert_eq!(s.average_sold_price, "$11,173");
    assert_eq!(s.highest_sold_price, "$12,345");
    assert_eq!(s.lowest_sold_price, "$10,000");
    assert_eq!(s.sold_percentage, "100%");
}

#[test]
fn mixed_sources_share_one_summary() {
    let records = vec![
        RawRecord::from(store_record("a", "sold", Some(50000.0), "2024-01-01")),
        RawRecord::from(retrieved_record("b", "sold", "$70,000", None)),
    ];
    assert_eq!(summarize(&records).average_sold_price, "$60,000");
}

#[test]
fn average_mileage_uses_reported_values_only() {
    let records = vec![
        with_mileage(Some(45_000)),
        with_mileage(Some(50_000)),
        with_mileage(None),
    ];
    assert_eq!(average_mileage(&records), "47,500 miles");
    assert_eq!(average_mileage(&[with_mileage(None)]), "N/A");
    assert_eq!(average_mileage(&[with_mileage(Some(850))]), "850 miles");
}
