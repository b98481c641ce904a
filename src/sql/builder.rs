//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from the table
//! registry. Column names are embedded only after a registry check; values are
//! always `$n` binds with an explicit cast to the column's Postgres type.

use crate::tables::TableDef;
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL (safe: only from the registry).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// One ordering field, `-` prefix meaning descending. Ties among equal sort
/// keys are store-dependent; no secondary key is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub descending: bool,
}

impl SortSpec {
    /// Newest-first, the listing default.
    pub fn created_desc() -> Self {
        SortSpec {
            column: "created_at".to_string(),
            descending: true,
        }
    }

    /// Parse `[-]fieldname`. Unknown fields fall back to the default
    /// ordering instead of reaching the store.
    pub fn parse(table: &TableDef, raw: &str) -> Self {
        let (descending, field) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        if table.has_column(field) {
            SortSpec {
                column: field.to_string(),
                descending,
            }
        } else {
            Self::created_desc()
        }
    }

    fn to_order_clause(&self) -> String {
        format!(
            " ORDER BY {} {}",
            quoted(&self.column),
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn column_list(table: &TableDef) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `$n::type` so text-encoded binds convert to the column's type server-side.
fn placeholder(table: &TableDef, column: &str, n: usize) -> String {
    match table.column(column) {
        Some(c) => format!("${}::{}", n, c.pg_type),
        None => format!("${}", n),
    }
}

/// AND-joined equality predicates. Filters on columns outside the registry
/// are skipped (the caller is expected to have dropped them already).
fn where_clause(q: &mut QueryBuf, table: &TableDef, filters: &[(String, Value)]) -> String {
    let mut parts = Vec::new();
    for (col, val) in filters {
        if table.has_column(col) {
            let n = q.push_param(val.clone());
            parts.push(format!("{} = {}", quoted(col), placeholder(table, col, n)));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT with filters, one ordering field, LIMIT/OFFSET.
pub fn select_list(
    table: &TableDef,
    filters: &[(String, Value)],
    sort: &SortSpec,
    limit: u32,
    offset: u64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_part = where_clause(&mut q, table, filters);
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        column_list(table),
        quoted(table.name),
        where_part,
        sort.to_order_clause(),
        limit,
        offset
    );
    q
}

/// COUNT sharing the list's filter predicate, ignoring pagination and sort.
pub fn count(table: &TableDef, filters: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_part = where_clause(&mut q, table, filters);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(table.name), where_part);
    q
}

/// SELECT by id.
pub fn select_by_id(table: &TableDef, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        column_list(table),
        quoted(table.name),
        quoted("id"),
        placeholder(table, "id", n)
    );
    q
}

/// INSERT in registry column order, only columns present in body, RETURNING
/// the full row. The caller fills in id and timestamps beforehand.
pub fn insert(table: &TableDef, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table.columns {
        let Some(val) = body.get(c.name) else { continue };
        let n = q.push_param(val.clone());
        cols.push(quoted(c.name));
        placeholders.push(placeholder(table, c.name, n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(table.name),
        cols.join(", "),
        placeholders.join(", "),
        column_list(table)
    );
    q
}

/// UPDATE by id: SET only columns present in body, never `id`, RETURNING the
/// full row. The caller bumps `updated_at` beforehand.
pub fn update(table: &TableDef, id: &Value, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in table.columns {
        if c.name == "id" {
            continue;
        }
        let Some(val) = body.get(c.name) else { continue };
        let n = q.push_param(val.clone());
        sets.push(format!("{} = {}", quoted(c.name), placeholder(table, c.name, n)));
    }
    if sets.is_empty() {
        return select_by_id(table, id);
    }
    let id_param = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        sets.join(", "),
        quoted("id"),
        placeholder(table, "id", id_param),
        column_list(table)
    );
    q
}

/// DELETE by id.
pub fn delete(table: &TableDef, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id.clone());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(table.name),
        quoted("id"),
        placeholder(table, "id", n)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn events() -> &'static TableDef {
        TableDef::lookup("events").unwrap()
    }

    #[test]
    fn list_without_filters_uses_default_order() {
        let q = select_list(events(), &[], &SortSpec::created_desc(), 100, 0);
        assert!(q.sql.contains("FROM \"events\""));
        assert!(q.sql.contains("ORDER BY \"created_at\" DESC"));
        assert!(q.sql.ends_with("LIMIT 100 OFFSET 0"));
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn filters_are_and_joined_in_order() {
        let filters = vec![
            ("category".to_string(), json!("news")),
            ("status".to_string(), json!("public")),
        ];
        let q = select_list(events(), &filters, &SortSpec::created_desc(), 10, 20);
        assert!(q
            .sql
            .contains("WHERE \"category\" = $1::text AND \"status\" = $2::text"));
        assert_eq!(q.params, vec![json!("news"), json!("public")]);
    }

    #[test]
    fn unknown_filter_column_never_reaches_sql() {
        let filters = vec![("nonsense\" OR 1=1 --".to_string(), json!("x"))];
        let q = select_list(events(), &filters, &SortSpec::created_desc(), 10, 0);
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn count_shares_predicate_without_pagination() {
        let filters = vec![("status".to_string(), json!("public"))];
        let q = count(events(), &filters);
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM \"events\" WHERE \"status\" = $1::text"
        );
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn sort_parse_honors_direction_prefix() {
        let asc = SortSpec::parse(events(), "title");
        assert_eq!(asc.column, "title");
        assert!(!asc.descending);
        let desc = SortSpec::parse(events(), "-event_date");
        assert_eq!(desc.column, "event_date");
        assert!(desc.descending);
    }

    #[test]
    fn sort_parse_falls_back_for_unknown_column() {
        let s = SortSpec::parse(events(), "-no_such_column");
        assert_eq!(s, SortSpec::created_desc());
    }

    #[test]
    fn insert_only_emits_present_columns_and_returns_row() {
        let body: HashMap<String, Value> = [
            ("id".to_string(), json!("abc")),
            ("title".to_string(), json!("Sports Day")),
            ("event_date".to_string(), json!("2026-05-10T00:00:00Z")),
        ]
        .into_iter()
        .collect();
        let q = insert(events(), &body);
        assert!(q.sql.starts_with("INSERT INTO \"events\" (\"id\", \"title\", \"event_date\")"));
        assert!(q.sql.contains("VALUES ($1::text, $2::text, $3::timestamptz)"));
        assert!(q.sql.contains("RETURNING"));
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn update_skips_id_and_binds_id_last() {
        let body: HashMap<String, Value> = [
            ("id".to_string(), json!("should-be-ignored")),
            ("status".to_string(), json!("公開")),
            ("updated_at".to_string(), json!("2026-05-11T09:00:00Z")),
        ]
        .into_iter()
        .collect();
        let q = update(events(), &json!("abc"), &body);
        assert!(!q.sql.contains("\"id\" = $1"));
        assert!(q.sql.contains("\"status\" = $1::text"));
        assert!(q.sql.contains("\"updated_at\" = $2::timestamptz"));
        assert!(q.sql.contains("WHERE \"id\" = $3::text"));
        assert!(q.sql.contains("RETURNING"));
        assert_eq!(q.params.last().unwrap(), &json!("abc"));
    }

    #[test]
    fn update_with_no_settable_fields_degrades_to_select() {
        let body: HashMap<String, Value> = [("id".to_string(), json!("x"))].into_iter().collect();
        let q = update(events(), &json!("abc"), &body);
        assert!(q.sql.starts_with("SELECT"));
        assert_eq!(q.params, vec![json!("abc")]);
    }

    #[test]
    fn delete_is_a_single_bound_statement() {
        let q = delete(events(), &json!("abc"));
        assert_eq!(q.sql, "DELETE FROM \"events\" WHERE \"id\" = $1::text");
        assert_eq!(q.params, vec![json!("abc")]);
    }
}
