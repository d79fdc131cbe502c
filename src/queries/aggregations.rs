//! Grouped aggregate queries ("count by make", "average price by year").
//!
//! Aggregations only ever run against the primary store. A store failure is
//! returned to the caller as [`AuctionError::AggregationStore`] instead of
//! falling back to live retrieval: an empty aggregate is indistinguishable
//! from a real "no sales" answer.

use crate::config::{AGGREGATE_FIELDS, GROUP_BY_FIELDS, RESULTS_TABLE};
use crate::error::{AuctionError, Result};
use crate::models::{AggregateFunction, AggregationPlan, AggregationRow, FilterSpec};
use crate::queries::results::apply_filters;
use crate::sorting::sort_aggregation_rows;
use crate::sql_builder::SqlBuilder;
use crate::store::PrimaryStore;

/// Aggregation engine over any [`PrimaryStore`].
pub struct AggregationQuery<'a> {
    store: &'a dyn PrimaryStore,
}

impl<'a> AggregationQuery<'a> {
    pub fn new(store: &'a dyn PrimaryStore) -> Self {
        Self { store }
    }

    /// Check `filter`'s grouping against the allow-lists.
    pub fn plan(filter: &FilterSpec) -> Result<AggregationPlan> {
        let group_by = filter
            .group_by
            .as_deref()
            .ok_or_else(|| AuctionError::Validation("groupBy is required".into()))?;
        if !GROUP_BY_FIELDS.contains(&group_by) {
            return Err(AuctionError::Validation(format!(
                "cannot group by {group_by:?}; allowed: {}",
                GROUP_BY_FIELDS.join(", ")
            )));
        }
        if filter.aggregation.is_empty() {
            return Err(AuctionError::Validation(
                "at least one aggregation is required".into(),
            ));
        }

        for agg in &filter.aggregation {
            if !AGGREGATE_FIELDS.contains(&agg.field.as_str()) {
                return Err(AuctionError::Validation(format!(
                    "cannot aggregate field {:?}",
                    agg.field
                )));
            }
            if agg.field == "*" && agg.function != AggregateFunction::Count {
                return Err(AuctionError::Validation(format!(
                    "{} requires a column, not '*'",
                    agg.function.as_str()
                )));
            }
        }

        Ok(AggregationPlan {
            group_by: group_by.to_string(),
            aggregations: filter.aggregation.clone(),
        })
    }

    /// Run the grouped query and apply the requested ordering.
    ///
    /// Rows are only re-sorted when the caller gave `sortBy` or `sortOrder`;
    /// the sort key is always the first aggregate.
    pub fn aggregate(&self, filter: &FilterSpec) -> Result<Vec<AggregationRow>> {
        let plan = Self::plan(filter)?;

        let mut rows = self.store.grouped(filter, &plan).map_err(|e| {
            tracing::error!(error = %e, group_by = %plan.group_by, "Grouped query failed.");
            AuctionError::AggregationStore(Box::new(e))
        })?;

        if filter.has_explicit_sort() {
            sort_aggregation_rows(&mut rows, filter.sort_order());
        }

        Ok(rows)
    }
}

/// Build the grouped SQL for `plan`, with the same predicates as listing
/// queries. Rows come back ordered by group key.
pub fn build_grouped_query(filter: &FilterSpec, plan: &AggregationPlan) -> (String, Vec<String>) {
    let mut cols = vec![plan.group_by.clone()];
    for agg in &plan.aggregations {
        cols.push(format!(
            "{}({}) AS \"{}\"",
            agg.function.as_sql(),
            agg.field,
            agg.alias()
        ));
    }

    let mut qb = SqlBuilder::new(RESULTS_TABLE);
    qb.select(cols.as_slice());
    apply_filters(&mut qb, filter);
    qb.group_by(&[plan.group_by.as_str()]);
    qb.order_by(&[format!("{} ASC NULLS LAST", plan.group_by)]);
    qb.build()
}
