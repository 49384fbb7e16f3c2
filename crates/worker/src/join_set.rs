use std::collections::HashMap;
use std::future::Future;

use tokio::task::{Id, JoinError, JoinSet};

use crate::TaskClass;

/// Keyed wrapper around a Tokio [`JoinSet`] with all-settled semantics.
///
/// Every spawned task is tagged with a key. Joining yields the key together
/// with the task's outcome, so a panicked or aborted task still reports which
/// unit of work it was instead of tearing down the whole set.
#[derive(Debug)]
pub struct SettledJoinSet<K, T> {
	class: TaskClass,
	keys: HashMap<Id, K>,
	inner: JoinSet<T>,
}

impl<K, T> SettledJoinSet<K, T>
where
	T: Send + 'static,
{
	/// Creates an empty join set for the given task class.
	pub fn new(class: TaskClass) -> Self {
		Self {
			class,
			keys: HashMap::new(),
			inner: JoinSet::new(),
		}
	}

	/// Returns the number of tasks that have not been joined yet.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// Returns `true` if every task has been joined.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Spawns `fut` on the current worker runtime under `key`.
	pub fn spawn<F>(&mut self, key: K, fut: F)
	where
		F: Future<Output = T> + Send + 'static,
	{
		tracing::trace!(worker_class = self.class.as_str(), pending = self.inner.len(), "worker.join_set.spawn");
		let handle = crate::current_handle();
		let abort = self.inner.spawn_on(fut, &handle);
		self.keys.insert(abort.id(), key);
	}

	/// Waits for the next task to settle, successfully or not.
	pub async fn join_next(&mut self) -> Option<(K, Result<T, JoinError>)> {
		loop {
			let (id, outcome) = match self.inner.join_next_with_id().await? {
				Ok((id, value)) => (id, Ok(value)),
				Err(err) => (err.id(), Err(err)),
			};
			if let Some(key) = self.keys.remove(&id) {
				return Some((key, outcome));
			}
		}
	}

	/// Waits until every task has settled and returns all outcomes in
	/// completion order.
	pub async fn join_all(mut self) -> Vec<(K, Result<T, JoinError>)> {
		let mut settled = Vec::with_capacity(self.inner.len());
		while let Some(entry) = self.join_next().await {
			settled.push(entry);
		}
		settled
	}
}

/// Extracts the panic message from a join error, or `None` when the task was
/// cancelled rather than panicking.
pub fn panic_message(err: JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}
	let payload = err.into_panic();
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		Some((*msg).to_string())
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		Some(msg.clone())
	} else {
		Some("non-string panic payload".to_string())
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	#[tokio::test]
	async fn join_all_reports_every_key_despite_failures() {
		let mut set = SettledJoinSet::new(TaskClass::SourceCall);
		set.spawn("slow", async {
			tokio::time::sleep(Duration::from_millis(20)).await;
			1
		});
		set.spawn("boom", async { panic!("source exploded") });
		set.spawn("fast", async { 3 });
		assert_eq!(set.len(), 3);

		let mut settled = set.join_all().await;
		settled.sort_by_key(|(key, _)| *key);
		let keys: Vec<_> = settled.iter().map(|(key, _)| *key).collect();
		assert_eq!(keys, vec!["boom", "fast", "slow"]);

		assert!(settled[0].1.as_ref().is_err_and(JoinError::is_panic));
		assert_eq!(settled[1].1.as_ref().ok(), Some(&3));
		assert_eq!(settled[2].1.as_ref().ok(), Some(&1));
	}

	#[tokio::test]
	async fn empty_set_settles_immediately() {
		let set: SettledJoinSet<u8, ()> = SettledJoinSet::new(TaskClass::Interactive);
		assert!(set.is_empty());
		assert!(set.join_all().await.is_empty());
	}
}
