//! HTTP handlers for the table CRUD surface.

pub mod tables;
pub use tables::*;
