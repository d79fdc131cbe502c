//! Contract for the persisted results store.

use crate::error::Result;
use crate::models::{AggregationPlan, AggregationRow, FilterSpec, StoreRecord};
use crate::outcome::Outcome;

/// The persisted store of previously captured auction results.
///
/// [`ResultQuery`](crate::queries::ResultQuery) implements this over DuckDB;
/// tests substitute in-memory doubles.
pub trait PrimaryStore {
    /// Records matching `filter`, in store order.
    fn query(&self, filter: &FilterSpec) -> Result<Vec<StoreRecord>>;

    /// Grouped aggregate rows for `plan`, restricted by `filter`.
    fn grouped(&self, filter: &FilterSpec, plan: &AggregationPlan) -> Result<Vec<AggregationRow>>;

    /// [`query`](Self::query), classified into an [`Outcome`].
    fn fetch(&self, filter: &FilterSpec) -> Outcome<StoreRecord> {
        Outcome::from(self.query(filter))
    }
}
