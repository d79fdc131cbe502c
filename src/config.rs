use std::path::PathBuf;
use std::time::Duration;

/// DuckDB table holding previously captured auction results.
pub const RESULTS_TABLE: &str = "auction_results";

pub const DEFAULT_MAX_PAGES: u32 = 1;
pub const MAX_PAGES_LIMIT: u32 = 10;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Columns that may be used as a `groupBy` key.
pub const GROUP_BY_FIELDS: &[&str] = &[
    "status",
    "make",
    "model",
    "year",
    "normalized_color",
    "transmission",
];

/// Columns that may be fed to an aggregate function. `*` is only valid
/// for `count`.
pub const AGGREGATE_FIELDS: &[&str] = &[
    "*",
    "sold_price",
    "bid_amount",
    "mileage",
    "year",
    "bidders",
    "watchers",
    "comments",
];

/// Columns of the results table with their DuckDB types. Imports are
/// cast to these, whatever types were inferred from the file.
pub const RESULTS_COLUMNS: &[(&str, &str)] = &[
    ("title", "VARCHAR"),
    ("year", "INTEGER"),
    ("make", "VARCHAR"),
    ("model", "VARCHAR"),
    ("sold_price", "DOUBLE"),
    ("bid_amount", "DOUBLE"),
    ("sold_date", "DATE"),
    ("status", "VARCHAR"),
    ("url", "VARCHAR"),
    ("mileage", "BIGINT"),
    ("bidders", "INTEGER"),
    ("watchers", "INTEGER"),
    ("comments", "INTEGER"),
    ("image_url", "VARCHAR"),
    ("transmission", "VARCHAR"),
    ("normalized_color", "VARCHAR"),
];

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("auction-results").join("results.duckdb")
    } else {
        PathBuf::from(".auction-results").join("results.duckdb")
    }
}
