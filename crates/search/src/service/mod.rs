//! Discovery search service: query state, dispatch, and result publication.
//!
//! # Purpose
//!
//! * Owns the single-writer [`crate::QueryState`] and the dispatcher wired to it.
//! * Re-dispatches on every intent change (text, tab, filters, page).
//! * Exposes published [`crate::AggregatedResultSet`] snapshots to consumers.
//!
//! # Mental model
//!
//! * `DiscoveryService` is a generation-scoped command handle:
//!   * every setter bumps the generation by starting a new batch.
//!   * a batch's results are published only if no newer batch has started.
//! * Batches are never cancelled; superseded batches finish and are dropped
//!   at merge time.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints | Constructed / mutated in |
//! |---|---|---|---|
//! | [`DiscoveryService`] | Handle over query state and dispatcher | Must dispatch after every intent change | this module |
//! | [`SearchTicket`] | Generation returned by one change | Resolves to the first set at or after its generation | `core.rs` |
//! | [`crate::InvalidationController`] | Current batch and generation | Must gate every publish | `invalidation.rs` |
//! | [`crate::ResultMerger`] | Builds and publishes sets | Must replace sets wholesale | `merger.rs` |
//!
//! # Invariants
//!
//! * Must reset the page to 1 on text, tab, or filter changes.
//! * Must not invoke any source for blank text.
//! * Must never publish a batch after a newer batch has started.
//! * Must publish only after every source in the batch has settled.
//!
//! # Concurrency & ordering
//!
//! * Setters hold the query-state lock while starting a batch, so generation
//!   order matches intent order.
//! * Lock order is query state, then invalidation state; merge takes only the
//!   latter.
//!
//! # Failure modes & recovery
//!
//! * Source failure or timeout: the set is published with `partial = true`
//!   and the failure recorded per category; call `retry_failed` to re-run.
//! * Every source failing: still published, all categories empty.
//! * Service dropped mid-batch: the batch task keeps the publisher alive, so
//!   outstanding tickets still resolve.

mod core;

pub use self::core::{DiscoveryService, SearchTicket};
