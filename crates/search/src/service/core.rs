use std::sync::Arc;

use parking_lot::Mutex;
use sift_primitives::{AggregatedResultSet, Category, Filters, SearchQuery};
use tokio::sync::watch;

use crate::adapter::SourceAdapters;
use crate::config::SearchConfig;
use crate::dispatcher::Dispatcher;
use crate::invalidation::{BatchPhase, InvalidationController};
use crate::merger::ResultMerger;
use crate::query_state::QueryState;

/// Handle returned by every dispatching operation.
#[derive(Debug)]
pub struct SearchTicket {
	generation: u64,
	results: watch::Receiver<Arc<AggregatedResultSet>>,
}

impl SearchTicket {
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Waits for this ticket's result, or a newer one if it was superseded.
	///
	/// Returns `None` if the service is dropped before anything is published.
	pub async fn wait(mut self) -> Option<Arc<AggregatedResultSet>> {
		let generation = self.generation;
		let set = self.results.wait_for(|set| set.generation >= generation).await.ok()?;
		Some(Arc::clone(&*set))
	}
}

/// Federated search over the four discovery sources.
pub struct DiscoveryService {
	state: Mutex<QueryState>,
	dispatcher: Dispatcher,
	invalidation: InvalidationController,
	merger: ResultMerger,
}

impl DiscoveryService {
	pub fn new(adapters: SourceAdapters, config: SearchConfig) -> Self {
		let invalidation = InvalidationController::new();
		let merger = ResultMerger::new(invalidation.clone(), config.overview_limit);
		let dispatcher = Dispatcher::new(adapters, config, invalidation.clone(), merger.clone());
		Self {
			state: Mutex::new(QueryState::new()),
			dispatcher,
			invalidation,
			merger,
		}
	}

	/// Replaces the whole query and dispatches it.
	pub fn search(&self, text: impl Into<String>, category: Category, filters: Filters, page: u32) -> SearchTicket {
		self.update(|state| {
			state.set_text(text);
			state.set_category(category);
			state.set_filters(filters);
			state.set_page(page);
		})
	}

	pub fn set_text(&self, text: impl Into<String>) -> SearchTicket {
		self.update(|state| state.set_text(text))
	}

	pub fn set_category(&self, category: Category) -> SearchTicket {
		self.update(|state| state.set_category(category))
	}

	pub fn set_filters(&self, filters: Filters) -> SearchTicket {
		self.update(|state| state.set_filters(filters))
	}

	pub fn set_page(&self, page: u32) -> SearchTicket {
		self.update(|state| state.set_page(page))
	}

	/// Drills into `category` from the overview, starting at page 1.
	pub fn view_more(&self, category: Category) -> SearchTicket {
		self.update(|state| state.set_category(category))
	}

	/// Seeds the query from a `?q=&type=` string and dispatches it.
	pub fn seed_from_url(&self, query_string: &str) -> SearchTicket {
		let seeded = QueryState::from_url_query(query_string);
		self.update(|state| *state = seeded)
	}

	/// Re-dispatches the current query unchanged.
	pub fn retry_failed(&self) -> SearchTicket {
		self.update(|_| {})
	}

	/// Restores the zero query and makes any in-flight batch inert.
	pub fn reset(&self) -> u64 {
		let mut state = self.state.lock();
		state.reset();
		let generation = self.invalidation.invalidate();
		self.merger.clear(generation);
		tracing::debug!(generation, phase = self.invalidation.phase().label(), "search.reset");
		generation
	}

	pub fn query(&self) -> SearchQuery {
		self.state.lock().snapshot()
	}

	pub fn latest(&self) -> Arc<AggregatedResultSet> {
		self.merger.latest()
	}

	pub fn subscribe(&self) -> watch::Receiver<Arc<AggregatedResultSet>> {
		self.merger.subscribe()
	}

	pub fn phase(&self) -> BatchPhase {
		self.invalidation.phase()
	}

	/// Returns true while the current generation still has sources in flight.
	pub fn is_loading(&self) -> bool {
		matches!(self.phase(), BatchPhase::Dispatching | BatchPhase::Settling)
	}

	pub fn config(&self) -> &SearchConfig {
		self.dispatcher.config()
	}

	fn update(&self, change: impl FnOnce(&mut QueryState)) -> SearchTicket {
		let mut state = self.state.lock();
		change(&mut state);
		let results = self.merger.subscribe();
		let generation = self.dispatcher.dispatch(state.query());
		SearchTicket { generation, results }
	}
}
