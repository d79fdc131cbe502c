//! Post-fetch ordering and client-side filtering.
//!
//! All sorts are stable: records that compare equal keep the order the
//! source returned them in.

use std::cmp::Ordering;

use serde_json::Value;
use time::macros::format_description;
use time::{Date, Month};

use crate::models::{AggregationRow, FilterSpec, NormalizedResult, SortField, SortOrder, StatusFilter};

/// Order results by `field`. Unknown fields leave the order unchanged.
///
/// Records missing the sort key go last in either direction.
pub fn sort_results(results: &mut [NormalizedResult], field: &SortField, order: SortOrder) {
    match field {
        SortField::SoldDate => results.sort_by(|a, b| {
            compare_present(
                a.sold_date.as_deref().and_then(parse_sold_date),
                b.sold_date.as_deref().and_then(parse_sold_date),
                order,
            )
        }),
        SortField::Mileage => {
            results.sort_by(|a, b| compare_present(a.mileage, b.mileage, order))
        }
        SortField::SoldPrice => results.sort_by(|a, b| {
            let ord = a
                .numeric_price
                .partial_cmp(&b.numeric_price)
                .unwrap_or(Ordering::Equal);
            directed(ord, order)
        }),
        SortField::Other(name) => {
            tracing::debug!(sort_by = %name, "Unrecognized sort field; keeping source order.");
        }
    }
}

/// Re-apply the status and transmission filters to results that came from
/// live retrieval, which cannot always push them down.
pub fn post_filter(results: Vec<NormalizedResult>, filter: &FilterSpec) -> Vec<NormalizedResult> {
    let transmission = filter.transmission.as_deref().map(str::to_lowercase);
    results
        .into_iter()
        .filter(|r| match filter.status {
            StatusFilter::Any => true,
            StatusFilter::Sold => r.is_sold(),
            StatusFilter::Unsold => !r.is_sold(),
        })
        .filter(|r| match &transmission {
            None => true,
            Some(wanted) => r
                .transmission
                .as_deref()
                .map(|t| t.to_lowercase().contains(wanted.as_str()))
                .unwrap_or(false),
        })
        .collect()
}

/// Order grouped rows by their first aggregate value.
///
/// Numbers compare numerically; anything else compares as text, case-folded
/// first and then exactly. Nulls compare as empty text.
pub fn sort_aggregation_rows(rows: &mut [AggregationRow], order: SortOrder) {
    rows.sort_by(|a, b| directed(compare_values(a.primary_value(), b.primary_value()), order));
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    let (x, y) = (value_text(a), value_text(b));
    x.to_lowercase()
        .cmp(&y.to_lowercase())
        .then_with(|| x.cmp(&y))
}

fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn directed(ord: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

fn compare_present<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(x.cmp(&y), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parse `YYYY-MM-DD` (optionally followed by a time) or `M/D/YYYY`.
pub fn parse_sold_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = Date::parse(prefix, format_description!("[year]-[month]-[day]")) {
            return Some(date);
        }
    }

    let mut parts = raw.split('/');
    let month: u8 = parts.next()?.trim().parse().ok()?;
    let day: u8 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_date_shapes() {
        let expected = Date::from_calendar_date(2024, Month::March, 9).unwrap();
        assert_eq!(parse_sold_date("2024-03-09"), Some(expected));
        assert_eq!(parse_sold_date("2024-03-09 00:00:00"), Some(expected));
        assert_eq!(parse_sold_date("3/9/2024"), Some(expected));
        assert_eq!(parse_sold_date("sometime"), None);
        assert_eq!(parse_sold_date("13/40/2024"), None);
    }

    #[test]
    fn text_values_compare_case_insensitively() {
        assert_eq!(
            compare_values(&Value::from("alfa"), &Value::from("BMW")),
            Ordering::Less
        );
        assert_eq!(compare_values(&Value::from(2), &Value::from(10.5)), Ordering::Less);
        assert_eq!(compare_values(&Value::Null, &Value::from("a")), Ordering::Less);
    }
}
