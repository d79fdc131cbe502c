use serde::{Deserialize, Serialize};

use crate::models::record::RetrievedRecord;

// ---------------------------------------------------------------------------
// NormalizedResult — canonical per-listing shape
// ---------------------------------------------------------------------------

/// One listing in the canonical shape returned to callers, whichever source
/// it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub title: String,
    pub year: Option<i64>,
    pub make: String,
    pub model: String,
    pub sold_price_display: String,
    pub bid_amount_display: String,
    /// Parsed from whichever display string applies (sold price if sold,
    /// else bid amount). `0.0` when unparseable.
    pub numeric_price: f64,
    pub sold_date: Option<String>,
    pub status: String,
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidders: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
}

impl NormalizedResult {
    pub fn is_sold(&self) -> bool {
        self.status == "sold"
    }
}

/// A normalized result re-enters the pipeline as a retrieval-shaped record,
/// since both carry display-formatted prices.
impl From<NormalizedResult> for RetrievedRecord {
    fn from(r: NormalizedResult) -> Self {
        RetrievedRecord {
            title: Some(r.title),
            year: r.year,
            make: Some(r.make),
            model: Some(r.model),
            sold_price: Some(r.sold_price_display),
            bid_amount: Some(r.bid_amount_display),
            sold_date: r.sold_date,
            status: Some(r.status),
            url: r.url,
            mileage: r.mileage,
            bidders: r.bidders,
            watchers: r.watchers,
            comments: r.comments,
            image_url: r.image_url,
            transmission: r.transmission,
        }
    }
}

// ---------------------------------------------------------------------------
// SummaryStatistics — display-ready market summary
// ---------------------------------------------------------------------------

/// Summary metrics for one result set. Every value is already formatted
/// for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    pub total_results: usize,
    pub average_sold_price: String,
    pub highest_sold_price: String,
    pub lowest_sold_price: String,
    pub sold_percentage: String,
    pub average_mileage: String,
}
