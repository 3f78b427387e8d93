//! Convenience re-exports for common cache-key usage

pub use crate::builder::{CacheKey, KeyBuilder};
pub use crate::errors::KeyError;
pub use crate::query::{ListQuery, Pagination, SortOrder, SortSpec};
pub use crate::value::ParamValue;
