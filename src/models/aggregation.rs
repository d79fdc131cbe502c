use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::models::filter::Aggregation;

// ---------------------------------------------------------------------------
// AggregationPlan — validated grouped query
// ---------------------------------------------------------------------------

/// A grouped query whose column names have been checked against the
/// allow-lists in [`crate::config`].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationPlan {
    pub group_by: String,
    pub aggregations: Vec<Aggregation>,
}

// ---------------------------------------------------------------------------
// AggregationRow — one bucket of a grouped query
// ---------------------------------------------------------------------------

/// One group with its aggregate values, in the order they were requested.
///
/// Serializes as a flat object, e.g. `{"make": "Porsche", "count": 12}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRow {
    pub group_by: String,
    pub key: Value,
    pub values: Vec<(String, Value)>,
}

impl AggregationRow {
    /// Value of the first requested aggregate, used for sorting.
    pub fn primary_value(&self) -> &Value {
        self.values.first().map(|(_, v)| v).unwrap_or(&Value::Null)
    }

    pub fn get(&self, alias: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, v)| v)
    }
}

impl Serialize for AggregationRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(&self.group_by, &self.key)?;
        for (alias, value) in &self.values {
            map.serialize_entry(alias, value)?;
        }
        map.end()
    }
}
