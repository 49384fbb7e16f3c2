use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generation clock for dispatch batches.
///
/// Clones share the same counter.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	last: Arc<AtomicU64>,
}

impl GenerationClock {
	/// Creates a clock whose first generation is 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Advances the clock and returns the new generation.
	pub fn next(&self) -> u64 {
		self.last.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Returns the most recently issued generation, or 0 before the first.
	pub fn current(&self) -> u64 {
		self.last.load(Ordering::Acquire)
	}

	/// Returns true when `generation` is the most recently issued one.
	pub fn is_current(&self, generation: u64) -> bool {
		self.current() == generation
	}
}
