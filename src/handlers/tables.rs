//! Table CRUD handlers: list, get, create, update (PUT and PATCH), delete.
//!
//! Every handler resolves the table against the allow-list first; nothing
//! touches the store for an unknown table name.

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::response::{ListResponse, Pagination};
use crate::service::TableService;
use crate::sql::SortSpec;
use crate::state::AppState;
use crate::tables::TableDef;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn resolve_table(name: &str) -> Result<&'static TableDef, AppError> {
    TableDef::lookup(name).ok_or_else(|| AppError::InvalidTable(name.to_string()))
}

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// `page` and `limit` fall back to their defaults on absent, zero, or
/// unparseable input.
fn positive_param(params: &HashMap<String, String>, key: &str, default: u32) -> u32 {
    params
        .get(key)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Everything except `page`/`limit`/`sort` is an equality filter, kept only
/// when it names a registered column (the front-end's `_=` cache-busters fall
/// out here).
fn collect_filters(table: &TableDef, params: HashMap<String, String>) -> Vec<(String, Value)> {
    let mut filters: Vec<(String, Value)> = params
        .into_iter()
        .filter(|(k, _)| !matches!(k.as_str(), "page" | "limit" | "sort"))
        .filter(|(k, _)| table.has_column(k))
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    filters.sort_by(|a, b| a.0.cmp(&b.0));
    filters
}

pub async fn list(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let table = resolve_table(&table_name)?;
    let page = positive_param(&params, "page", 1);
    let limit = positive_param(&params, "limit", TableService::DEFAULT_LIMIT).min(TableService::MAX_LIMIT);
    let sort = params
        .get("sort")
        .map(|s| SortSpec::parse(table, s))
        .unwrap_or_else(SortSpec::created_desc);
    let filters = collect_filters(table, params);

    let (rows, total) = TableService::list(&state.pool, table, &filters, &sort, page, limit).await?;
    Ok(Json(ListResponse {
        data: rows,
        pagination: Pagination::new(page, limit, total),
    }))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path((table_name, id)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let table = resolve_table(&table_name)?;
    let row = TableService::read(&state.pool, table, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(id))?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let table = resolve_table(&table_name)?;
    let body = body_to_map(body)?;
    let row = TableService::create(&state.pool, table, body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Bound to both PUT and PATCH: the source treats full and partial update
/// identically, writing only the fields present in the body.
pub async fn update(
    State(state): State<AppState>,
    Path((table_name, id)): Path<(String, String)>,
    JsonBody(body): JsonBody,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let table = resolve_table(&table_name)?;
    let body = body_to_map(body)?;
    let row = TableService::update(&state.pool, table, &id, body)
        .await?
        .ok_or_else(|| AppError::NotFound(id))?;
    Ok(Json(row))
}

pub async fn delete_one(
    State(state): State<AppState>,
    Path((table_name, id)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let table = resolve_table(&table_name)?;
    TableService::delete(&state.pool, table, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
