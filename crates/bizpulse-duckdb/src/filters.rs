//! Generic filtered reads/deletes over the logical tables.
//!
//! Filters are a conjunction of `(column, op, value)` with the operator set
//! {eq, gte, lte}. Table and column names come from closed enums and
//! `&'static str` literals at call sites — never from request input — so
//! the rendered SQL contains no user-controlled identifiers; values always
//! go through bind parameters.

use duckdb::types::ToSql;

/// The logical tables of the store. Rendering goes through [`Table::name`]
/// so a table name can never be injected as a raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    VisitLogs,
    BusinessInteractions,
    AiSearchLogs,
    LiveUsers,
    UserTracking,
    Businesses,
    Categories,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::VisitLogs => "visit_logs",
            Table::BusinessInteractions => "business_interactions",
            Table::AiSearchLogs => "ai_search_logs",
            Table::LiveUsers => "live_users",
            Table::UserTracking => "user_tracking",
            Table::Businesses => "businesses",
            Table::Categories => "categories",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

impl FilterOp {
    fn sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    Int(i64),
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub column: &'static str,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<FilterValue>) -> Self {
        Self { column, op: FilterOp::Eq, value: value.into() }
    }

    pub fn gte(column: &'static str, value: impl Into<FilterValue>) -> Self {
        Self { column, op: FilterOp::Gte, value: value.into() }
    }

    pub fn lte(column: &'static str, value: impl Into<FilterValue>) -> Self {
        Self { column, op: FilterOp::Lte, value: value.into() }
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

/// Render a conjunction to `" WHERE a >= ?1 AND b = ?2"` plus its bind
/// parameters, or an empty clause for an empty filter set.
pub(crate) fn where_clause(filters: &[Filter]) -> (String, Vec<Box<dyn ToSql + Send>>) {
    if filters.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut sql = String::from(" WHERE ");
    let mut params: Vec<Box<dyn ToSql + Send>> = Vec::with_capacity(filters.len());
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        sql.push_str(&format!("{} {} ?{}", filter.column, filter.op.sql(), i + 1));
        params.push(match &filter.value {
            FilterValue::Text(v) => Box::new(v.clone()),
            FilterValue::Bool(v) => Box::new(*v),
            FilterValue::Int(v) => Box::new(*v),
        });
    }
    (sql, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_set_renders_no_clause() {
        let (sql, params) = where_clause(&[]);
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn conjunction_renders_in_order_with_numbered_params() {
        let (sql, params) = where_clause(&[
            Filter::gte("visited_at", "2024-01-01 00:00:00"),
            Filter::eq("is_active", true),
            Filter::lte("result_count", 5i64),
        ]);
        assert_eq!(
            sql,
            " WHERE visited_at >= ?1 AND is_active = ?2 AND result_count <= ?3"
        );
        assert_eq!(params.len(), 3);
    }
}
