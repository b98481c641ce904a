//! Bootstrap DDL generated from the table registry, so the gateway runs
//! against an empty database.

use crate::error::AppError;
use crate::tables::{TableDef, TABLES};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

fn create_table_ddl(table: &TableDef) -> String {
    let cols: Vec<String> = table
        .columns
        .iter()
        .map(|c| match c.name {
            "id" => format!("{} TEXT PRIMARY KEY", quote_ident(c.name)),
            "created_at" | "updated_at" => format!(
                "{} TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                quote_ident(c.name)
            ),
            _ => format!("{} {}", quote_ident(c.name), c.pg_type.to_uppercase()),
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(table.name),
        cols.join(", ")
    )
}

/// Create every allow-listed table if absent. Idempotent; call at startup.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for table in TABLES {
        let ddl = create_table_ddl(table);
        tracing::debug!(table = table.name, "ensure table");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects
/// to the default `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
