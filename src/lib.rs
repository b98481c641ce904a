//! Table gateway: generic REST-over-table CRUD for the school CMS store.
//!
//! Maps `{table, id?}` plus query parameters onto parameterized queries
//! against PostgreSQL. Table names come from a fixed allow-list; column
//! names from a per-table registry; values are always bound parameters.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod tables;

pub use error::AppError;
pub use response::{ListResponse, Pagination};
pub use routes::{common_routes, table_routes};
pub use service::TableService;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables};
pub use tables::{TableDef, TABLES};
