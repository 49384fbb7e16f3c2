//! Federated discovery search over four independent content sources.
//!
//! One query fans out to the creator, user, post and product sources, each
//! behind a [`SourceAdapter`] that contains its failures. The [`Dispatcher`]
//! issues a batch per query change, the [`InvalidationController`] tags it
//! with a generation, and the [`ResultMerger`] publishes the batch only if no
//! newer query has started in the meantime.
//!
//! [`DiscoveryService`] wires these together behind the query-state setters
//! that a search page drives.

pub mod adapter;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod invalidation;
pub mod memory;
pub mod merger;
pub mod query_state;
mod service;

pub use adapter::{BackendPage, BackendQuery, DomainAdapter, DomainProfile, SearchBackend, SourceAdapter, SourceAdapters};
pub use config::SearchConfig;
pub use dispatcher::{DispatchPlan, Dispatcher};
pub use error::{BackendError, ConfigError, FixtureError};
pub use invalidation::{BatchPhase, DispatchBatch, InvalidationController};
pub use memory::{Fixtures, MemoryBackend, Record};
pub use merger::{MergeOutcome, ResultMerger};
pub use query_state::QueryState;
pub use service::{DiscoveryService, SearchTicket};
pub use sift_primitives::{
	AggregatedResultSet, Category, Filters, Item, SearchMode, SearchQuery, SearchRequest, SourceErrorKind, SourceResult,
};
