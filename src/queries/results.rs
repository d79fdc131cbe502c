//! Listing queries against the DuckDB `auction_results` table.

use serde_json::Value;

use crate::config::RESULTS_TABLE;
use crate::connection::Connection;
use crate::error::{AuctionError, Result};
use crate::models::{AggregationPlan, AggregationRow, FilterSpec, StatusFilter, StoreRecord};
use crate::queries::aggregations::build_grouped_query;
use crate::sql_builder::SqlBuilder;
use crate::store::PrimaryStore;

/// Columns read back for each listing. Dates are cast so they arrive as
/// `YYYY-MM-DD` text whatever the column type.
const RESULT_COLUMNS: &[&str] = &[
    "title",
    "year",
    "make",
    "model",
    "sold_price",
    "bid_amount",
    "CAST(sold_date AS VARCHAR) AS sold_date",
    "status",
    "url",
    "mileage",
    "bidders",
    "watchers",
    "comments",
    "image_url",
    "transmission",
];

// ---------------------------------------------------------------------------
// ResultQuery
// ---------------------------------------------------------------------------

/// Query interface for captured auction results backed by DuckDB.
pub struct ResultQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ResultQuery<'a> {
    /// Create a new `ResultQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Build the listing query for `filter`.
    ///
    /// Known sort fields are ordered store-side with missing values last;
    /// unknown ones get no ORDER BY.
    pub fn build_query(filter: &FilterSpec) -> (String, Vec<String>) {
        let mut qb = SqlBuilder::new(RESULTS_TABLE);
        qb.select(RESULT_COLUMNS);
        apply_filters(&mut qb, filter);

        if let Some(column) = filter.sort_by().column() {
            qb.order_by(&[format!(
                "{} {} NULLS LAST",
                column,
                filter.sort_order().as_sql()
            )]);
        }

        qb.build()
    }

    /// Distinct makes present in the store, alphabetically.
    pub fn makes(&self) -> Result<Vec<String>> {
        let (sql, params) = SqlBuilder::new(RESULTS_TABLE)
            .select(&["make"])
            .distinct()
            .where_clause("make IS NOT NULL AND TRIM(make) <> ''", &[])
            .order_by(&["make ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .into_iter()
            .filter_map(|mut r| match r.remove("make") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            })
            .collect())
    }
}

impl PrimaryStore for ResultQuery<'_> {
    fn query(&self, filter: &FilterSpec) -> Result<Vec<StoreRecord>> {
        let (sql, params) = Self::build_query(filter);
        tracing::debug!(%sql, ?params, "Querying results store.");
        self.conn.execute_into(&sql, &params).map_err(store_error)
    }

    fn grouped(&self, filter: &FilterSpec, plan: &AggregationPlan) -> Result<Vec<AggregationRow>> {
        let (sql, params) = build_grouped_query(filter, plan);
        tracing::debug!(%sql, ?params, "Running grouped query.");
        let rows = self.conn.execute(&sql, &params).map_err(store_error)?;

        Ok(rows
            .into_iter()
            .map(|mut row| AggregationRow {
                group_by: plan.group_by.clone(),
                key: row.remove(&plan.group_by).unwrap_or(Value::Null),
                values: plan
                    .aggregations
                    .iter()
                    .map(|agg| {
                        let alias = agg.alias();
                        let value = row.remove(&alias).unwrap_or(Value::Null);
                        (alias, value)
                    })
                    .collect(),
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn store_error(e: AuctionError) -> AuctionError {
    AuctionError::Store(e.to_string())
}

/// Add the WHERE predicates shared by listing and grouped queries.
pub(crate) fn apply_filters(qb: &mut SqlBuilder, filter: &FilterSpec) {
    // -- make: substring ------------------------------------------------
    if let Some(ref make) = filter.make {
        qb.where_contains("make", make);
    }

    // -- model: substring on model or title -----------------------------
    if let Some(ref model) = filter.model {
        let pattern = format!("%{}%", model);
        qb.where_or(&[
            ("LOWER(model) LIKE LOWER(?)", pattern.as_str()),
            ("LOWER(title) LIKE LOWER(?)", pattern.as_str()),
        ]);
    }

    // -- year range (inclusive) -----------------------------------------
    if let Some(y) = filter.year_min {
        qb.where_gte("year", &y.to_string());
    }
    if let Some(y) = filter.year_max {
        qb.where_lte("year", &y.to_string());
    }

    // -- sold date range (inclusive) ------------------------------------
    if let Some(d) = filter.sold_date_min {
        qb.where_gte("CAST(sold_date AS DATE)", &d.to_string());
    }
    if let Some(d) = filter.sold_date_max {
        qb.where_lte("CAST(sold_date AS DATE)", &d.to_string());
    }

    // -- status ---------------------------------------------------------
    match filter.status {
        StatusFilter::Any => {}
        StatusFilter::Sold => {
            qb.where_eq("LOWER(status)", "sold");
        }
        StatusFilter::Unsold => {
            qb.where_ne("COALESCE(LOWER(status), '')", "sold");
        }
    }

    // -- transmission: substring ----------------------------------------
    if let Some(ref t) = filter.transmission {
        qb.where_contains("transmission", t);
    }
}
