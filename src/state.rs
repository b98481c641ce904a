//! Shared application state. The gateway is stateless per request; the pool
//! is the only thing handlers share.

use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}
