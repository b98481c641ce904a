//! Table CRUD routes with permissive CORS.
//!
//! Uses a parameterized path so handlers resolve the table name against the
//! allow-list themselves. The CORS layer answers OPTIONS preflights and adds
//! `Access-Control-Allow-Origin: *` on every response; the consuming pages
//! are served from a separate static host.

use crate::handlers::tables::{create, delete_one, get_one, list, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

pub fn table_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/tables/:table", get(list).post(create))
        .route(
            "/tables/:table/:id",
            get(get_one).put(update).patch(update).delete(delete_one),
        )
        .layer(cors)
        .with_state(state)
}
