//! Core types for federated discovery search: categories, queries, and results.

/// Content categories and the overview pseudo-category.
pub mod category;
/// Search query and per-source request types.
pub mod query;
/// Per-source and aggregated result types.
pub mod result;

pub use category::{Category, ParseCategoryError};
pub use query::{Filters, SearchQuery, SearchRequest};
pub use result::{AggregatedResultSet, Item, SearchMode, SourceErrorKind, SourceResult};
