//! Fixed table registry: the deploy-time allow-list and per-table columns.
//!
//! The gateway only touches tables named here, and only the columns named
//! here ever reach generated SQL. Everything else is rejected or dropped
//! before the store sees it.

/// One column of a registered table. `pg_type` drives both the bootstrap DDL
/// and the `$n::type` casts on bound parameters.
#[derive(Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub pg_type: &'static str,
}

/// A registered table: its name and full column set.
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

macro_rules! col {
    ($name:literal) => {
        ColumnDef { name: $name, pg_type: "text" }
    };
    ($name:literal, $ty:literal) => {
        ColumnDef { name: $name, pg_type: $ty }
    };
}

/// Every table carries the bookkeeping trio: `id` (text primary key),
/// `created_at`, `updated_at`.
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: "blog_posts",
        columns: &[
            col!("id"),
            col!("title"),
            col!("category"),
            col!("status"),
            col!("author"),
            col!("content"),
            col!("excerpt"),
            col!("featured_image"),
            col!("published_at", "timestamptz"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
    TableDef {
        name: "newsletters",
        columns: &[
            col!("id"),
            col!("title"),
            col!("issue_number", "bigint"),
            col!("issue_date", "timestamptz"),
            col!("description"),
            col!("pdf_url"),
            col!("status"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
    TableDef {
        name: "events",
        columns: &[
            col!("id"),
            col!("title"),
            col!("description"),
            col!("event_date", "timestamptz"),
            col!("location"),
            col!("category"),
            col!("status"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
    TableDef {
        name: "page_contents",
        columns: &[
            col!("id"),
            col!("page_name"),
            col!("section_key"),
            col!("content"),
            col!("status"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
    TableDef {
        name: "media",
        columns: &[
            col!("id"),
            col!("file_name"),
            col!("file_size", "bigint"),
            col!("mime_type"),
            col!("data_url"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
    TableDef {
        name: "site_settings",
        columns: &[
            col!("id"),
            col!("setting_key"),
            col!("setting_value"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
    TableDef {
        name: "access_logs",
        columns: &[
            col!("id"),
            col!("page_name"),
            col!("referrer"),
            col!("user_agent"),
            col!("visited_at", "timestamptz"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
    TableDef {
        name: "access_stats",
        columns: &[
            col!("id"),
            col!("stat_type"),
            col!("year_month"),
            col!("page_name"),
            col!("view_count", "bigint"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
    TableDef {
        name: "uploaded_pdfs",
        columns: &[
            col!("id"),
            col!("file_name"),
            col!("file_size", "bigint"),
            col!("file_data"),
            col!("category"),
            col!("created_at", "timestamptz"),
            col!("updated_at", "timestamptz"),
        ],
    },
];

impl TableDef {
    /// Resolve a caller-supplied table name against the allow-list.
    pub fn lookup(name: &str) -> Option<&'static TableDef> {
        TABLES.iter().find(|t| t.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}
