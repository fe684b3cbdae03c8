// ABOUTME: Row query builder with equality, membership and ordering filters
// ABOUTME: Renders to PostgREST query parameters and is evaluated directly by the memory backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use std::fmt::{self, Display};

/// Comparison applied by a [`Filter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    /// `column = value`
    Eq(String),
    /// `column <> value`
    Neq(String),
    /// `column IN (values)`
    In(Vec<String>),
    /// `column IS NULL`
    IsNull,
    /// Case-insensitive substring match
    ILike(String),
}

/// One condition on a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Column name
    pub column: String,
    /// Comparison
    pub op: FilterOp,
}

impl Filter {
    /// PostgREST operator syntax, e.g. `eq.abc` or `in.(a,b)`
    #[must_use]
    pub fn to_param_value(&self) -> String {
        match &self.op {
            FilterOp::Eq(value) => format!("eq.{value}"),
            FilterOp::Neq(value) => format!("neq.{value}"),
            FilterOp::In(values) => {
                let joined = values
                    .iter()
                    .map(|v| quote_list_item(v))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("in.({joined})")
            }
            FilterOp::IsNull => "is.null".to_owned(),
            FilterOp::ILike(pattern) => format!("ilike.*{pattern}*"),
        }
    }
}

/// Values containing list delimiters must be double-quoted inside `in.(...)`
fn quote_list_item(value: &str) -> String {
    if value.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_owned()
    }
}

/// Sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Column name
    pub column: String,
    /// Ascending when true
    pub ascending: bool,
}

impl Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.ascending { "asc" } else { "desc" };
        write!(f, "{}.{direction}", self.column)
    }
}

/// A select/update/delete target: one collection plus filters, ordering and limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Collection name
    pub collection: String,
    /// Conditions, all of which must hold
    pub filters: Vec<Filter>,
    /// Sort keys in priority order
    pub order: Vec<Order>,
    /// Maximum number of rows
    pub limit: Option<usize>,
}

impl Query {
    /// Start a query on `collection`
    #[must_use]
    pub fn table(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    fn push(mut self, column: &str, op: FilterOp) -> Self {
        self.filters.push(Filter {
            column: column.to_owned(),
            op,
        });
        self
    }

    /// Require `column = value`
    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.push(column, FilterOp::Eq(value.to_string()))
    }

    /// Require `column <> value`
    #[must_use]
    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.push(column, FilterOp::Neq(value.to_string()))
    }

    /// Require `column` to be one of `values`
    #[must_use]
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.push(column, FilterOp::In(values))
    }

    /// Require `column IS NULL`
    #[must_use]
    pub fn is_null(self, column: &str) -> Self {
        self.push(column, FilterOp::IsNull)
    }

    /// Case-insensitive substring match
    #[must_use]
    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        let cleaned: String = pattern
            .trim()
            .chars()
            .filter(|c| !matches!(c, '*' | '%'))
            .collect();
        self.push(column, FilterOp::ILike(cleaned))
    }

    /// Add an ascending or descending sort key
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_owned(),
            ascending,
        });
        self
    }

    /// Limit the number of returned rows
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a filter can never match (empty `in` list)
    #[must_use]
    pub fn matches_nothing(&self) -> bool {
        self.filters
            .iter()
            .any(|f| matches!(&f.op, FilterOp::In(values) if values.is_empty()))
    }

    /// Render filters only, as used by update and delete
    #[must_use]
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| (f.column.clone(), f.to_param_value()))
            .collect()
    }

    /// Render the full select parameters
    #[must_use]
    pub fn select_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_owned(), "*".to_owned())];
        params.extend(self.filter_params());
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_owned(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_select_params_render_postgrest_syntax() {
        let id = Uuid::nil();
        let query = Query::table("workout_sets")
            .eq("workout_exercise_id", id)
            .eq("is_warmup", false)
            .order("set_number", true)
            .limit(10);

        assert_eq!(
            query.select_params(),
            vec![
                ("select".to_owned(), "*".to_owned()),
                (
                    "workout_exercise_id".to_owned(),
                    format!("eq.{id}")
                ),
                ("is_warmup".to_owned(), "eq.false".to_owned()),
                ("order".to_owned(), "set_number.asc".to_owned()),
                ("limit".to_owned(), "10".to_owned()),
            ]
        );
    }

    #[test]
    fn test_in_list_quotes_reserved_characters() {
        let query = Query::table("exercises").in_list("name", ["Squat", "Press, Bench"]);
        assert_eq!(
            query.filters[0].to_param_value(),
            "in.(Squat,\"Press, Bench\")"
        );
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let empty: Vec<Uuid> = Vec::new();
        assert!(Query::table("workouts").in_list("id", empty).matches_nothing());
        assert!(!Query::table("workouts").eq("id", 1).matches_nothing());
    }

    #[test]
    fn test_ilike_strips_wildcards() {
        let query = Query::table("exercises").ilike("name", " *press% ");
        assert_eq!(query.filters[0].to_param_value(), "ilike.*press*");
    }
}
