//! Cache key building for resource queries
//!
//! This crate turns a resource kind and its query parameters into a
//! deterministic string key, so logically identical queries share one
//! cache entry.

pub mod builder;
pub mod errors;
pub mod prelude;
pub mod query;
pub mod value;

pub use builder::{CacheKey, KeyBuilder};
pub use errors::KeyError;
pub use query::{ListQuery, Pagination, SortOrder, SortSpec};
pub use value::ParamValue;
