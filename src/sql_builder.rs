//! SQL builder with parameterized query construction.
//!
//! All filter values go through DuckDB's parameter binding (`?` placeholders),
//! never through string interpolation. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use booking_dashboard::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("visit v")
//!     .join("JOIN route r ON v.route_id = r.route_id")
//!     .where_eq("r.route_name", "North loop")
//!     .where_date_gte("v.visit_date", "2024-01-01")
//!     .order_by(&["v.visit_date DESC"])
//!     .limit(100)
//!     .build();
//! ```

/// Builds parameterized SQL queries safely.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    is_distinct: bool,
    from_table: String,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table, optionally with an alias
    /// (`"reservation r"`).
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            is_distinct: false,
            from_table: table.to_string(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add DISTINCT to the SELECT clause.
    pub fn distinct(&mut self) -> &mut Self {
        self.is_distinct = true;
        self
    }

    /// Add a JOIN clause.
    ///
    /// The clause should be a full JOIN expression, e.g.
    /// `"LEFT JOIN client c ON r.client_id = c.client_id"`.
    pub fn join(&mut self, clause: &str) -> &mut Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Keep rows whose date column falls on or after `date` (`YYYY-MM-DD`).
    ///
    /// Both sides are cast to DATE, so timestamps compare by day.
    pub fn where_date_gte(&mut self, column: &str, date: &str) -> &mut Self {
        self.where_clauses
            .push(format!("CAST({} AS DATE) >= CAST(? AS DATE)", column));
        self.params.push(date.to_string());
        self
    }

    /// Keep rows whose date column falls on or before `date` (`YYYY-MM-DD`).
    pub fn where_date_lte(&mut self, column: &str, date: &str) -> &mut Self {
        self.where_clauses
            .push(format!("CAST({} AS DATE) <= CAST(? AS DATE)", column));
        self.params.push(date.to_string());
        self
    }

    /// Add ORDER BY clauses (e.g. `"reservation_date DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let distinct = if self.is_distinct { "DISTINCT " } else { "" };
        let cols = self.select_cols.join(", ");
        let mut parts = vec![
            format!("SELECT {}{}", distinct, cols),
            format!("FROM {}", self.from_table),
        ];

        for j in &self.joins {
            parts.push(j.clone());
        }

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
