//! Generation-based staleness detection for dispatch batches.
//!
//! Superseded batches are never cancelled; they run to completion and their
//! results are dropped at commit time. The controller is the only component
//! that advances or compares the generation counter, and it does both under
//! one lock so a publish can never race a newer batch's start.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use sift_primitives::{Category, SearchQuery};
use sift_worker::GenerationClock;

/// Lifecycle phase of the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
	/// Nothing dispatched since start or reset.
	#[default]
	Idle,
	/// Source calls issued, none settled yet.
	Dispatching,
	/// At least one source call has settled.
	Settling,
	/// The current generation's results are visible.
	Published,
	/// Blank query; an empty result is visible.
	Empty,
}

impl BatchPhase {
	pub const fn label(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Dispatching => "dispatching",
			Self::Settling => "settling",
			Self::Published => "published",
			Self::Empty => "empty",
		}
	}
}

/// One in-flight dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchBatch {
	pub generation: u64,
	pub query: SearchQuery,
	/// Sources that have not settled yet.
	pub pending: BTreeSet<Category>,
}

#[derive(Debug, Default)]
struct ControllerState {
	batch: Option<DispatchBatch>,
	phase: BatchPhase,
}

/// Owns the current [`DispatchBatch`] and the generation counter.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InvalidationController {
	clock: GenerationClock,
	state: Arc<Mutex<ControllerState>>,
}

impl InvalidationController {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a batch for `query`, marking any previous batch stale.
	pub fn begin_batch(&self, query: SearchQuery, pending: BTreeSet<Category>) -> u64 {
		let mut state = self.state.lock();
		let generation = self.clock.next();
		let batch = DispatchBatch {
			generation,
			query,
			pending,
		};
		if let Some(previous) = state.batch.replace(batch) {
			tracing::debug!(
				superseded = previous.generation,
				generation,
				unsettled = previous.pending.len(),
				"search.batch_superseded"
			);
		}
		state.phase = BatchPhase::Dispatching;
		generation
	}

	/// Returns true if no newer batch (or reset) has started since `generation`.
	pub fn is_current(&self, generation: u64) -> bool {
		let _state = self.state.lock();
		self.clock.is_current(generation)
	}

	/// Records that `category` has settled within `generation`.
	///
	/// Stale generations are ignored.
	pub fn settle(&self, generation: u64, category: Category) {
		let mut state = self.state.lock();
		let ControllerState { batch, phase } = &mut *state;
		if let Some(batch) = batch.as_mut().filter(|batch| batch.generation == generation) {
			batch.pending.remove(&category);
			if *phase == BatchPhase::Dispatching {
				*phase = BatchPhase::Settling;
			}
		}
	}

	/// Runs `publish` if `generation` is still current, then retires its batch
	/// and moves to `terminal`.
	///
	/// Returns false, without running `publish`, for stale generations.
	pub fn commit(&self, generation: u64, terminal: BatchPhase, publish: impl FnOnce()) -> bool {
		let mut state = self.state.lock();
		if !self.clock.is_current(generation) {
			return false;
		}
		publish();
		state.phase = terminal;
		if state.batch.as_ref().is_some_and(|batch| batch.generation == generation) {
			state.batch = None;
		}
		true
	}

	/// Retires `generation`'s batch without publishing anything.
	pub fn complete(&self, generation: u64) {
		let mut state = self.state.lock();
		if state.batch.as_ref().is_some_and(|batch| batch.generation == generation) {
			state.batch = None;
		}
	}

	/// Makes every in-flight batch stale and returns to [`BatchPhase::Idle`].
	///
	/// Returns the new generation, which has no batch.
	pub fn invalidate(&self) -> u64 {
		let mut state = self.state.lock();
		let generation = self.clock.next();
		state.batch = None;
		state.phase = BatchPhase::Idle;
		generation
	}

	pub fn phase(&self) -> BatchPhase {
		self.state.lock().phase
	}

	pub fn current_generation(&self) -> u64 {
		self.clock.current()
	}

	/// Copy of the in-flight batch, if any.
	pub fn current_batch(&self) -> Option<DispatchBatch> {
		self.state.lock().batch.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sources() -> BTreeSet<Category> {
		Category::SOURCES.into_iter().collect()
	}

	#[test]
	fn newer_batch_makes_older_stale() {
		let controller = InvalidationController::new();
		let first = controller.begin_batch(SearchQuery::new("gốm", Category::All), sources());
		let second = controller.begin_batch(SearchQuery::new("gốm sứ", Category::All), sources());

		assert!(second > first);
		assert!(!controller.is_current(first));
		assert!(controller.is_current(second));
		assert_eq!(controller.current_batch().map(|batch| batch.generation), Some(second));
	}

	#[test]
	fn settle_tracks_pending_sources_for_current_batch_only() {
		let controller = InvalidationController::new();
		let stale = controller.begin_batch(SearchQuery::new("a", Category::All), sources());
		let current = controller.begin_batch(SearchQuery::new("ab", Category::All), sources());
		assert_eq!(controller.phase(), BatchPhase::Dispatching);

		controller.settle(stale, Category::Posts);
		assert_eq!(controller.current_batch().unwrap().pending.len(), 4);
		assert_eq!(controller.phase(), BatchPhase::Dispatching);

		controller.settle(current, Category::Posts);
		let batch = controller.current_batch().unwrap();
		assert!(!batch.pending.contains(&Category::Posts));
		assert_eq!(batch.pending.len(), 3);
		assert_eq!(controller.phase(), BatchPhase::Settling);
	}

	#[test]
	fn commit_publishes_only_current_generation() {
		let controller = InvalidationController::new();
		let stale = controller.begin_batch(SearchQuery::new("a", Category::All), sources());
		let current = controller.begin_batch(SearchQuery::new("b", Category::All), sources());

		let mut published = Vec::new();
		assert!(!controller.commit(stale, BatchPhase::Published, || published.push(stale)));
		assert!(controller.commit(current, BatchPhase::Published, || published.push(current)));

		assert_eq!(published, vec![current]);
		assert_eq!(controller.phase(), BatchPhase::Published);
		assert!(controller.current_batch().is_none());
	}

	#[test]
	fn invalidate_discards_in_flight_batch() {
		let controller = InvalidationController::new();
		let generation = controller.begin_batch(SearchQuery::new("a", Category::Posts), BTreeSet::from([Category::Posts]));
		let cleared = controller.invalidate();

		assert!(cleared > generation);
		assert_eq!(controller.phase(), BatchPhase::Idle);
		assert!(controller.current_batch().is_none());
		assert!(!controller.commit(generation, BatchPhase::Published, || panic!("stale publish")));
	}

	#[test]
	fn complete_retires_matching_batch() {
		let controller = InvalidationController::new();
		let generation = controller.begin_batch(SearchQuery::new("a", Category::Users), BTreeSet::from([Category::Users]));
		controller.complete(generation.wrapping_add(1));
		assert!(controller.current_batch().is_some());
		controller.complete(generation);
		assert!(controller.current_batch().is_none());
	}

	#[test]
	fn phase_labels_track_lifecycle() {
		let controller = InvalidationController::new();
		assert_eq!(controller.phase().label(), "idle");
		let generation = controller.begin_batch(SearchQuery::new("a", Category::Users), BTreeSet::from([Category::Users]));
		assert_eq!(controller.phase().label(), "dispatching");
		controller.settle(generation, Category::Users);
		assert_eq!(controller.phase().label(), "settling");
		controller.commit(generation, BatchPhase::Published, || {});
		assert_eq!(controller.phase().label(), "published");
		assert_eq!(BatchPhase::Empty.label(), "empty");
	}
}
