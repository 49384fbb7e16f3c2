//! Assembly and publication of aggregated result sets.

use std::collections::HashSet;
use std::sync::Arc;

use sift_primitives::{AggregatedResultSet, Item, SearchMode, SourceErrorKind, SourceResult};
use tokio::sync::watch;

use crate::invalidation::{BatchPhase, InvalidationController};

/// What happened to a batch at merge time.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
	/// The batch was current and its set is now visible.
	Published(Arc<AggregatedResultSet>),
	/// A newer batch started first; nothing was published.
	Discarded,
}

impl MergeOutcome {
	pub fn published(&self) -> Option<&Arc<AggregatedResultSet>> {
		match self {
			Self::Published(set) => Some(set),
			Self::Discarded => None,
		}
	}
}

/// Builds result sets and publishes them, wholesale, for current generations.
///
/// Subscribers observe whole `Arc` snapshots through a watch channel; a set is
/// never patched after publication.
#[derive(Debug, Clone)]
pub struct ResultMerger {
	invalidation: InvalidationController,
	overview_limit: usize,
	publisher: Arc<watch::Sender<Arc<AggregatedResultSet>>>,
}

impl ResultMerger {
	pub fn new(invalidation: InvalidationController, overview_limit: u32) -> Self {
		let (publisher, _) = watch::channel(Arc::new(AggregatedResultSet::empty(0)));
		Self {
			invalidation,
			overview_limit: overview_limit as usize,
			publisher: Arc::new(publisher),
		}
	}

	pub fn subscribe(&self) -> watch::Receiver<Arc<AggregatedResultSet>> {
		self.publisher.subscribe()
	}

	/// Most recently published set.
	pub fn latest(&self) -> Arc<AggregatedResultSet> {
		Arc::clone(&*self.publisher.borrow())
	}

	/// Merges one settled batch and publishes it if `generation` is current.
	pub fn merge(&self, generation: u64, mode: SearchMode, results: Vec<SourceResult>) -> MergeOutcome {
		let terminal = if mode == SearchMode::Empty {
			BatchPhase::Empty
		} else {
			BatchPhase::Published
		};
		let overview_limit = self.overview_limit;
		self.publish(generation, terminal, move || assemble(generation, mode, results, overview_limit))
	}

	/// Publishes an empty set for a reset generation.
	pub fn clear(&self, generation: u64) -> MergeOutcome {
		self.publish(generation, BatchPhase::Idle, move || AggregatedResultSet::empty(generation))
	}

	fn publish(&self, generation: u64, terminal: BatchPhase, build: impl FnOnce() -> AggregatedResultSet) -> MergeOutcome {
		let mut published = None;
		self.invalidation.commit(generation, terminal, || {
			let set = Arc::new(build());
			self.publisher.send_replace(Arc::clone(&set));
			published = Some(set);
		});

		match published {
			Some(set) => {
				tracing::debug!(
					generation,
					mode = ?set.mode,
					phase = terminal.label(),
					categories = set.by_category.len(),
					partial = set.partial,
					"search.publish"
				);
				MergeOutcome::Published(set)
			}
			None => {
				tracing::debug!(generation, current = self.invalidation.current_generation(), "search.discard_stale");
				MergeOutcome::Discarded
			}
		}
	}
}

/// Assembles one batch's source results into an aggregated set.
///
/// In overview mode every source keeps at most `overview_limit` items. In
/// single-category mode results for other categories are ignored and the
/// drilled-down category's page count is exposed. Failed sources keep an
/// empty entry so "queried, nothing" stays distinct from "not queried".
pub fn assemble(generation: u64, mode: SearchMode, results: Vec<SourceResult>, overview_limit: usize) -> AggregatedResultSet {
	let mut set = AggregatedResultSet {
		generation,
		mode,
		..AggregatedResultSet::default()
	};

	for result in results {
		let cap = match mode {
			SearchMode::Empty => continue,
			SearchMode::Single(category) if result.source != category => continue,
			SearchMode::Single(_) => {
				set.total_pages = Some(result.total_pages);
				usize::MAX
			}
			SearchMode::Overview => overview_limit,
		};

		if result.failed {
			set.partial = true;
			let kind = result.error_kind.unwrap_or(SourceErrorKind::Transport);
			set.failures.insert(result.source, kind);
		}
		set.totals.insert(result.source, result.total);
		set.by_category.insert(result.source, dedup_items(result.items, cap));
	}

	set
}

fn dedup_items(items: Vec<Item>, cap: usize) -> Vec<Item> {
	let mut seen = HashSet::new();
	items.into_iter().filter(|item| seen.insert(Arc::clone(&item.id))).take(cap).collect()
}
