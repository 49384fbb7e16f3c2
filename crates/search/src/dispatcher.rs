//! Mode selection and concurrent fan-out to source adapters.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use sift_primitives::{Category, SearchMode, SearchQuery, SearchRequest, SourceErrorKind, SourceResult};
use sift_worker::{SettledJoinSet, TaskClass};

use crate::adapter::SourceAdapters;
use crate::config::SearchConfig;
use crate::invalidation::InvalidationController;
use crate::merger::ResultMerger;

/// Slack past a source's own timeout before the dispatcher gives up on it.
pub const DEADLINE_GRACE: Duration = Duration::from_millis(50);

/// Which sources a query needs, with what requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
	pub mode: SearchMode,
	pub requests: Vec<(Category, SearchRequest)>,
}

impl DispatchPlan {
	/// Plans `query` without side effects.
	///
	/// Blank text plans nothing. The overview asks every source for the first
	/// `overview_limit` items; a drill-down asks one source for `query.page`.
	pub fn for_query(query: &SearchQuery, config: &SearchConfig) -> Self {
		if query.is_blank() {
			return Self {
				mode: SearchMode::Empty,
				requests: Vec::new(),
			};
		}

		let request = |page: u32, limit: u32| SearchRequest {
			text: query.text.trim().to_string(),
			filters: query.filters.clone(),
			page,
			limit,
		};

		match query.category {
			Category::All => Self {
				mode: SearchMode::Overview,
				requests: Category::SOURCES
					.into_iter()
					.map(|category| (category, request(1, config.overview_limit)))
					.collect(),
			},
			category => Self {
				mode: SearchMode::Single(category),
				requests: vec![(category, request(query.page.max(1), config.page_size))],
			},
		}
	}

	pub fn sources(&self) -> BTreeSet<Category> {
		self.requests.iter().map(|(category, _)| *category).collect()
	}
}

/// Issues one batch per query and hands settled results to the merger.
#[derive(Clone)]
pub struct Dispatcher {
	adapters: SourceAdapters,
	config: Arc<SearchConfig>,
	invalidation: InvalidationController,
	merger: ResultMerger,
}

impl Dispatcher {
	pub fn new(adapters: SourceAdapters, config: SearchConfig, invalidation: InvalidationController, merger: ResultMerger) -> Self {
		Self {
			adapters,
			config: Arc::new(config),
			invalidation,
			merger,
		}
	}

	pub fn config(&self) -> &SearchConfig {
		&self.config
	}

	/// Starts a batch for `query` and returns its generation immediately.
	///
	/// Source calls run concurrently on the worker runtime. The batch is
	/// merged once every call has settled; a call that panics or outlives
	/// its deadline settles as a failed result for its source alone.
	pub fn dispatch(&self, query: &SearchQuery) -> u64 {
		let plan = DispatchPlan::for_query(query, &self.config);
		let generation = self.invalidation.begin_batch(query.clone(), plan.sources());

		if plan.mode == SearchMode::Empty {
			tracing::debug!(generation, "search.empty_query");
			self.merger.merge(generation, SearchMode::Empty, Vec::new());
			return generation;
		}

		tracing::info!(
			generation,
			mode = ?plan.mode,
			sources = plan.requests.len(),
			page = query.page,
			"search.dispatch"
		);

		let adapters = self.adapters.clone();
		let config = Arc::clone(&self.config);
		let invalidation = self.invalidation.clone();
		let merger = self.merger.clone();
		sift_worker::spawn(TaskClass::Interactive, async move {
			let mode = plan.mode;
			let mut calls = SettledJoinSet::new(TaskClass::SourceCall);
			for (category, request) in plan.requests {
				let Some(adapter) = adapters.get(category).cloned() else {
					continue;
				};
				let timeout = config.timeout_for(category);
				calls.spawn(category, async move {
					match tokio::time::timeout(timeout + DEADLINE_GRACE, adapter.query(&request, timeout)).await {
						Ok(result) => result,
						Err(_elapsed) => {
							tracing::warn!(
								generation,
								category = %category,
								timeout_ms = timeout.as_millis() as u64,
								"source adapter ignored its timeout; settling as timed out"
							);
							SourceResult::failed(category, SourceErrorKind::Timeout)
						}
					}
				});
			}

			let mut results = Vec::with_capacity(calls.len());
			while let Some((category, outcome)) = calls.join_next().await {
				let result = outcome.unwrap_or_else(|err| {
					let reason = sift_worker::panic_message(err).unwrap_or_else(|| "cancelled".to_string());
					tracing::warn!(generation, category = %category, reason = %reason, "source task aborted");
					SourceResult::failed(category, SourceErrorKind::Panicked)
				});
				invalidation.settle(generation, category);
				results.push(result);
			}

			merger.merge(generation, mode, results);
		});

		generation
	}
}
