//! Custom extractors.

mod body;
pub use body::JsonBody;
