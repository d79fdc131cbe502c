use serde::{Deserialize, Serialize};

use crate::normalize::{format_usd, parse_price};

// ---------------------------------------------------------------------------
// StoreRecord — row of the `auction_results` table
// ---------------------------------------------------------------------------

/// A captured result as persisted in the primary store. Prices are numeric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreRecord {
    pub title: Option<String>,
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub sold_price: Option<f64>,
    pub bid_amount: Option<f64>,
    pub sold_date: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub mileage: Option<i64>,
    pub bidders: Option<i64>,
    pub watchers: Option<i64>,
    pub comments: Option<i64>,
    pub image_url: Option<String>,
    pub transmission: Option<String>,
}

// ---------------------------------------------------------------------------
// RetrievedRecord — live-retrieval payload item
// ---------------------------------------------------------------------------

/// A result as produced by the live-retrieval collaborator. Prices arrive
/// as currency-formatted strings such as `"$12,345"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub sold_price: Option<String>,
    #[serde(default)]
    pub bid_amount: Option<String>,
    #[serde(default, alias = "endDate")]
    pub sold_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mileage: Option<i64>,
    #[serde(default)]
    pub bidders: Option<i64>,
    #[serde(default)]
    pub watchers: Option<i64>,
    #[serde(default)]
    pub comments: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
}

// ---------------------------------------------------------------------------
// RawRecord — either source, before normalization
// ---------------------------------------------------------------------------

/// Source-specific record. Never passed beyond normalization and
/// statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Store(StoreRecord),
    Retrieved(RetrievedRecord),
}

impl RawRecord {
    pub fn status(&self) -> Option<&str> {
        match self {
            RawRecord::Store(r) => r.status.as_deref(),
            RawRecord::Retrieved(r) => r.status.as_deref(),
        }
    }

    pub fn is_sold(&self) -> bool {
        self.status()
            .map(|s| s.trim().eq_ignore_ascii_case("sold"))
            .unwrap_or(false)
    }

    /// Sold price in the source's own encoding, decoded to a number.
    ///
    /// `None` when the source carries no price (missing, blank, or a string
    /// without any digits).
    pub fn sold_price(&self) -> Option<f64> {
        match self {
            RawRecord::Store(r) => r.sold_price,
            RawRecord::Retrieved(r) => r
                .sold_price
                .as_deref()
                .filter(|s| s.chars().any(|c| c.is_ascii_digit()))
                .map(parse_price),
        }
    }

    pub fn mileage(&self) -> Option<i64> {
        match self {
            RawRecord::Store(r) => r.mileage,
            RawRecord::Retrieved(r) => r.mileage,
        }
    }

    pub fn transmission(&self) -> Option<&str> {
        match self {
            RawRecord::Store(r) => r.transmission.as_deref(),
            RawRecord::Retrieved(r) => r.transmission.as_deref(),
        }
    }

    /// Display string for the sold price.
    pub fn sold_price_display(&self) -> String {
        match self {
            RawRecord::Store(r) => store_price_display(r.sold_price),
            RawRecord::Retrieved(r) => retrieved_price_display(r.sold_price.as_deref()),
        }
    }

    /// Display string for the high bid.
    pub fn bid_amount_display(&self) -> String {
        match self {
            RawRecord::Store(r) => store_price_display(r.bid_amount),
            RawRecord::Retrieved(r) => retrieved_price_display(r.bid_amount.as_deref()),
        }
    }
}

impl From<StoreRecord> for RawRecord {
    fn from(r: StoreRecord) -> Self {
        RawRecord::Store(r)
    }
}

impl From<RetrievedRecord> for RawRecord {
    fn from(r: RetrievedRecord) -> Self {
        RawRecord::Retrieved(r)
    }
}

pub(crate) const MISSING_PRICE: &str = "N/A";

fn store_price_display(price: Option<f64>) -> String {
    match price {
        Some(p) => format_usd(p),
        None => MISSING_PRICE.to_string(),
    }
}

fn retrieved_price_display(price: Option<&str>) -> String {
    match price.map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => MISSING_PRICE.to_string(),
    }
}
