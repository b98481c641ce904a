//! Generic CRUD execution against PostgreSQL.

use crate::error::AppError;
use crate::sql::{self, PgBindValue, QueryBuf, SortSpec};
use crate::tables::TableDef;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

pub struct TableService;

impl TableService {
    pub const DEFAULT_LIMIT: u32 = 100;
    pub const MAX_LIMIT: u32 = 1000;

    /// List rows with equality filters, one ordering field, and offset
    /// pagination. Returns the page of rows plus the unpaginated total from
    /// a COUNT sharing the same predicate.
    pub async fn list(
        pool: &PgPool,
        table: &TableDef,
        filters: &[(String, Value)],
        sort: &SortSpec,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Value>, u64), AppError> {
        let limit = limit.min(Self::MAX_LIMIT);
        let offset = u64::from(page.max(1) - 1) * u64::from(limit);
        let q = sql::select_list(table, filters, sort, limit, offset);
        let rows = Self::query_many(pool, &q).await?;
        let total = Self::query_count(pool, &sql::count(table, filters)).await?;
        Ok((rows, total))
    }

    /// Fetch one row by id. Returns None when no row matches.
    pub async fn read(pool: &PgPool, table: &TableDef, id: &str) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(table, &Value::String(id.to_string()));
        Self::fetch_optional(pool, &q).await
    }

    /// Insert one row. Missing id and timestamps are filled in; body keys
    /// outside the table's columns never reach the statement. Returns the
    /// inserted row (RETURNING, so the write and read-back are one atomic
    /// statement).
    pub async fn create(
        pool: &PgPool,
        table: &TableDef,
        body: HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let body = with_creation_defaults(body);
        let q = sql::insert(table, &body);
        Self::fetch_optional(pool, &q)
            .await?
            .ok_or_else(|| AppError::Internal("insert returned no row".into()))
    }

    /// Update one row by id, bumping `updated_at`. PUT and PATCH share this
    /// path: only the fields present in body are written either way.
    /// Returns None when no row matches.
    pub async fn update(
        pool: &PgPool,
        table: &TableDef,
        id: &str,
        body: HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let body = with_update_stamp(body);
        let q = sql::update(table, &Value::String(id.to_string()), &body);
        Self::fetch_optional(pool, &q).await
    }

    /// Delete by id. Succeeds whether or not a row matched; the gateway does
    /// not distinguish "deleted" from "nothing to delete".
    pub async fn delete(pool: &PgPool, table: &TableDef, id: &str) -> Result<(), AppError> {
        let q = sql::delete(table, &Value::String(id.to_string()));
        Self::execute(pool, &q).await
    }

    async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p)?);
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p)?);
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.as_ref().map(row_to_json))
    }

    async fn query_count(pool: &PgPool, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "count");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p)?);
        }
        let row = query.fetch_one(pool).await?;
        use sqlx::Row;
        let n: i64 = row.try_get(0)?;
        Ok(n.max(0) as u64)
    }

    async fn execute(pool: &PgPool, q: &QueryBuf) -> Result<(), AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p)?);
        }
        query.execute(pool).await?;
        Ok(())
    }
}

/// ISO-8601 with milliseconds, the format the admin front-end writes.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Randomized v4-format identifier. A non-colliding token, not a security
/// token.
fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fill in id and both timestamps where the caller left them out. One `now`
/// for both so a fresh record has `created_at == updated_at`.
fn with_creation_defaults(mut body: HashMap<String, Value>) -> HashMap<String, Value> {
    let now = now_timestamp();
    body.entry("id".to_string())
        .or_insert_with(|| Value::String(generate_id()));
    body.entry("created_at".to_string())
        .or_insert_with(|| Value::String(now.clone()));
    body.entry("updated_at".to_string())
        .or_insert_with(|| Value::String(now));
    body
}

/// Overwrite `updated_at` with now on every update, full or partial.
fn with_update_stamp(mut body: HashMap<String, Value>) -> HashMap<String, Value> {
    body.insert("updated_at".to_string(), Value::String(now_timestamp()));
    body
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        map.insert(col.name().to_string(), cell_to_value(row, col.name()));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(f)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}
