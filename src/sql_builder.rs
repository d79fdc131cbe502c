//! SQL builder with parameterized query construction.
//!
//! All user-supplied values go through DuckDB's parameter binding (`?` placeholders),
//! never through string interpolation. Builder methods return `&mut Self` for chaining.
//! Column names are the one exception: callers must only pass names drawn from
//! a fixed allow-list (see [`crate::config`]).
//!
//! # Example
//!
//! ```rust
//! use auction_results::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("auction_results")
//!     .where_contains("make", "Porsche")
//!     .where_gte("year", "2015")
//!     .order_by(&["sold_date DESC NULLS LAST"])
//!     .build();
//! ```

/// Builds parameterized SQL queries safely.
///
/// All user-supplied values go through DuckDB's parameter binding (`?` placeholders),
/// never through string interpolation. Methods return `&mut Self` for chaining.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    is_distinct: bool,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table or view.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            is_distinct: false,
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select<S: AsRef<str>>(&mut self, cols: &[S]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Add DISTINCT to the SELECT clause.
    pub fn distinct(&mut self) -> &mut Self {
        self.is_distinct = true;
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    ///
    /// The caller provides a condition using `?` for each parameter value.
    /// Parameters are appended in order.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add a case-insensitive LIKE condition.
    ///
    /// Generates: `LOWER({column}) LIKE LOWER(?)`
    pub fn where_like(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("LOWER({}) LIKE LOWER(?)", column));
        self.params.push(value.to_string());
        self
    }

    /// Add a case-insensitive substring condition.
    ///
    /// Same as [`where_like`](Self::where_like) with the value wrapped in `%`.
    pub fn where_contains(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_like(column, &format!("%{}%", value))
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add an inequality condition: `{column} <> ?`.
    pub fn where_ne(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} <> ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add a greater-than-or-equal condition: `{column} >= ?`.
    pub fn where_gte(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} >= ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add a less-than-or-equal condition: `{column} <= ?`.
    pub fn where_lte(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} <= ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add OR-combined conditions.
    ///
    /// Each condition is a `(sql_fragment, param_value)` tuple where the fragment
    /// uses `?` as a placeholder.
    ///
    /// # Example
    ///
    /// ```rust
    /// use auction_results::SqlBuilder;
    /// let mut builder = SqlBuilder::new("auction_results");
    /// builder.where_or(&[("model = ?", "911"), ("title = ?", "911")]);
    /// // -> WHERE (model = ? OR title = ?)
    /// ```
    pub fn where_or(&mut self, conditions: &[(&str, &str)]) -> &mut Self {
        if conditions.is_empty() {
            return self;
        }
        let mut or_parts = Vec::with_capacity(conditions.len());
        for (cond, param) in conditions {
            or_parts.push(cond.to_string());
            self.params.push(param.to_string());
        }
        self.where_clauses
            .push(format!("({})", or_parts.join(" OR ")));
        self
    }

    /// Add GROUP BY columns.
    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols
            .extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"make ASC"`, `"sold_price DESC"`).
    pub fn order_by<S: AsRef<str>>(&mut self, clauses: &[S]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.as_ref().to_string()));
        self
    }

    /// Build the final SQL string and parameter list.
    ///
    /// Returns a tuple of `(sql_string, params_list)` ready for execution.
    pub fn build(&self) -> (String, Vec<String>) {
        let distinct = if self.is_distinct { "DISTINCT " } else { "" };
        let cols = self.select_cols.join(", ");
        let mut parts = vec![
            format!("SELECT {}{}", distinct, cols),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        (parts.join("\n"), self.params.clone())
    }
}
