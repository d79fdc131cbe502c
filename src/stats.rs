//! Summary statistics over raw records.
//!
//! Works on [`RawRecord`]s rather than normalized results so prices are read
//! in their source encoding, never from display strings.

use crate::models::{RawRecord, SummaryStatistics};
use crate::normalize::{format_usd_rounded, group_thousands};

const NOT_AVAILABLE: &str = "N/A";

/// Compute display-ready summary metrics for one result set.
pub fn summarize(records: &[RawRecord]) -> SummaryStatistics {
    let sold_prices: Vec<f64> = records
        .iter()
        .filter(|r| r.is_sold())
        .filter_map(RawRecord::sold_price)
        .collect();

    let (average, highest, lowest) = if sold_prices.is_empty() {
        (
            NOT_AVAILABLE.to_string(),
            NOT_AVAILABLE.to_string(),
            NOT_AVAILABLE.to_string(),
        )
    } else {
        let total: f64 = sold_prices.iter().sum();
        let max = sold_prices.iter().copied().fold(f64::MIN, f64::max);
        let min = sold_prices.iter().copied().fold(f64::MAX, f64::min);
        (
            format_usd_rounded(total / sold_prices.len() as f64),
            format_usd_rounded(max),
            format_usd_rounded(min),
        )
    };

    SummaryStatistics {
        total_results: records.len(),
        average_sold_price: average,
        highest_sold_price: highest,
        lowest_sold_price: lowest,
        sold_percentage: sold_percentage(records),
        average_mileage: average_mileage(records),
    }
}

/// Share of sold records, rounded to a whole percent. `"0%"` when empty.
pub fn sold_percentage(records: &[RawRecord]) -> String {
    if records.is_empty() {
        return "0%".to_string();
    }
    let sold = records.iter().filter(|r| r.is_sold()).count();
    let pct = (100.0 * sold as f64 / records.len() as f64).round();
    format!("{}%", pct as i64)
}

/// Mean mileage over records that report one, e.g. `"45,000 miles"`.
pub fn average_mileage(records: &[RawRecord]) -> String {
    let miles: Vec<i64> = records.iter().filter_map(RawRecord::mileage).collect();
    if miles.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    let avg = (miles.iter().sum::<i64>() as f64 / miles.len() as f64).round() as i64;
    let digits = group_thousands(&avg.abs().to_string());
    if avg < 0 {
        format!("-{digits} miles")
    } else {
        format!("{digits} miles")
    }
}
