use std::fmt;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

use crate::config;
use crate::error::{AuctionError, Result};

// ---------------------------------------------------------------------------
// SearchRequest — raw request payload
// ---------------------------------------------------------------------------

/// Request payload as received on the wire.
///
/// Every field is optional; [`FilterSpec::from_request`] applies defaults and
/// validation. The request is echoed back verbatim as `filters` in responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_max: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date_min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date_max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_scrape: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Vec<Aggregation>>,
}

impl SearchRequest {
    /// Parse a request from a JSON value, reporting shape errors as
    /// validation failures.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| AuctionError::Validation(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Any,
    Sold,
    Unsold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Field a result list can be ordered by.
///
/// Unrecognized names are kept as [`SortField::Other`] so they can be echoed
/// back; sorting by them leaves the order unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    SoldDate,
    Mileage,
    SoldPrice,
    Other(String),
}

impl SortField {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sold_date" | "solddate" | "date" => SortField::SoldDate,
            "mileage" => SortField::Mileage,
            "sold_price" | "soldprice" | "price" => SortField::SoldPrice,
            _ => SortField::Other(name.to_string()),
        }
    }

    /// Store column backing this field, if any.
    pub fn column(&self) -> Option<&'static str> {
        match self {
            SortField::SoldDate => Some("sold_date"),
            SortField::Mileage => Some("mileage"),
            SortField::SoldPrice => Some("sold_price"),
            SortField::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SortField::SoldDate => "sold_date",
            SortField::Mileage => "mileage",
            SortField::SoldPrice => "sold_price",
            SortField::Other(name) => name,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Count,
    Avg,
    Sum,
}

impl AggregateFunction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Sum => "SUM",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Sum => "sum",
        }
    }
}

/// One requested aggregate, e.g. `{"function": "avg", "field": "sold_price"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub function: AggregateFunction,
    pub field: String,
}

impl Aggregation {
    pub fn new(function: AggregateFunction, field: &str) -> Self {
        Self {
            function,
            field: field.to_string(),
        }
    }

    /// Output column name: `count` for `count(*)`, else `{function}_{field}`.
    pub fn alias(&self) -> String {
        if self.field == "*" {
            self.function.as_str().to_string()
        } else {
            format!("{}_{}", self.function.as_str(), self.field)
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec — validated filters
// ---------------------------------------------------------------------------

/// Validated, defaulted filters for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub sold_date_min: Option<Date>,
    pub sold_date_max: Option<Date>,
    pub status: StatusFilter,
    pub transmission: Option<String>,
    pub force_scrape: bool,
    pub max_pages: u32,
    /// `None` when the caller did not supply one; see [`FilterSpec::sort_by`].
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub group_by: Option<String>,
    pub aggregation: Vec<Aggregation>,
}

impl FilterSpec {
    /// Validate a request and apply defaults.
    ///
    /// `make` is required unless the request is a grouped aggregation.
    pub fn from_request(req: &SearchRequest) -> Result<Self> {
        let spec = FilterSpec {
            make: non_blank(&req.make),
            model: non_blank(&req.model),
            year_min: req.year_min,
            year_max: req.year_max,
            sold_date_min: parse_date_filter("soldDateMin", &req.sold_date_min)?,
            sold_date_max: parse_date_filter("soldDateMax", &req.sold_date_max)?,
            status: req.status.unwrap_or_default(),
            transmission: non_blank(&req.transmission),
            force_scrape: req.force_scrape.unwrap_or(false),
            max_pages: req
                .max_pages
                .unwrap_or(config::DEFAULT_MAX_PAGES)
                .clamp(1, config::MAX_PAGES_LIMIT),
            sort_by: non_blank(&req.sort_by).map(|s| SortField::parse(&s)),
            sort_order: req.sort_order,
            group_by: non_blank(&req.group_by),
            aggregation: req.aggregation.clone().unwrap_or_default(),
        };

        if spec.make.is_none() && !spec.is_aggregation() {
            return Err(AuctionError::Validation("make is required".into()));
        }
        if let (Some(min), Some(max)) = (spec.year_min, spec.year_max) {
            if min > max {
                return Err(AuctionError::Validation(format!(
                    "yearMin ({min}) is greater than yearMax ({max})"
                )));
            }
        }
        if let (Some(min), Some(max)) = (spec.sold_date_min, spec.sold_date_max) {
            if min > max {
                return Err(AuctionError::Validation(format!(
                    "soldDateMin ({min}) is after soldDateMax ({max})"
                )));
            }
        }

        Ok(spec)
    }

    /// True when the request carries both a `groupBy` and at least one
    /// aggregate function.
    pub fn is_aggregation(&self) -> bool {
        self.group_by.is_some() && !self.aggregation.is_empty()
    }

    /// Effective sort field (defaults to `sold_date`).
    pub fn sort_by(&self) -> SortField {
        self.sort_by.clone().unwrap_or_default()
    }

    /// Effective sort direction (defaults to descending).
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }

    /// Whether the caller asked for any ordering at all.
    pub fn has_explicit_sort(&self) -> bool {
        self.sort_by.is_some() || self.sort_order.is_some()
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_date_filter(name: &str, value: &Option<String>) -> Result<Option<Date>> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };
    Date::parse(&raw, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| AuctionError::Validation(format!("{name} must be YYYY-MM-DD, got {raw:?}")))
}
