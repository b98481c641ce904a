//! List response envelope. Single records are returned bare, as the admin
//! front-end expects.

use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct ListResponse {
    pub data: Vec<Value>,
    pub pagination: Pagination,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl Pagination {
    /// `totalPages = ceil(total / limit)`; zero rows means zero pages.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Pagination {
            page,
            limit,
            total,
            total_pages: total.div_ceil(u64::from(limit)),
        }
    }
}
