#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use sift_search::{
	BackendError, BackendPage, BackendQuery, Category, DiscoveryService, Item, SearchBackend, SearchConfig, SourceAdapters,
};
use tokio::time::{sleep, timeout};

/// How a scripted backend answers one query.
#[derive(Debug, Clone)]
pub struct Script {
	pub delay: Duration,
	pub reply: Result<BackendPage, BackendError>,
}

impl Script {
	/// `count` items with ids `<text>-<n>` out of `total`.
	pub fn page(text: &str, count: usize, total: u64) -> Self {
		Self {
			delay: Duration::ZERO,
			reply: Ok(BackendPage {
				items: (0..count).map(|i| Item::new(format!("{text}-{i}"), Category::All, json!({ "n": i }))).collect(),
				total,
				total_pages: 0,
			}),
		}
	}

	pub fn fail(error: BackendError) -> Self {
		Self {
			delay: Duration::ZERO,
			reply: Err(error),
		}
	}

	pub fn delayed(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}
}

type ScriptFn = dyn Fn(&BackendQuery) -> Script + Send + Sync;

/// Backend answering from a closure and recording every query it sees.
pub struct ScriptedBackend {
	calls: AtomicUsize,
	seen: Mutex<Vec<BackendQuery>>,
	script: Box<ScriptFn>,
}

impl ScriptedBackend {
	pub fn new(script: impl Fn(&BackendQuery) -> Script + Send + Sync + 'static) -> Arc<Self> {
		Arc::new(Self {
			calls: AtomicUsize::new(0),
			seen: Mutex::new(Vec::new()),
			script: Box::new(script),
		})
	}

	/// Answers every query with `count` items named after the query text.
	pub fn echo(count: usize, total: u64) -> Arc<Self> {
		Self::new(move |query| Script::page(&query_text(query), count, total))
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn seen(&self) -> Vec<BackendQuery> {
		self.seen.lock().clone()
	}
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
	async fn search(&self, query: BackendQuery) -> Result<BackendPage, BackendError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let script = (self.script)(&query);
		self.seen.lock().push(query);
		if !script.delay.is_zero() {
			sleep(script.delay).await;
		}
		script.reply
	}
}

/// Text of a backend query, wherever the domain put it.
pub fn query_text(query: &BackendQuery) -> String {
	query
		.text
		.clone()
		.or_else(|| query.filters.get("search").and_then(|v| v.as_str()).map(str::to_string))
		.unwrap_or_default()
}

pub struct Harness {
	pub service: DiscoveryService,
	pub creators: Arc<ScriptedBackend>,
	pub users: Arc<ScriptedBackend>,
	pub posts: Arc<ScriptedBackend>,
	pub products: Arc<ScriptedBackend>,
}

impl Harness {
	pub fn new(
		creators: Arc<ScriptedBackend>,
		users: Arc<ScriptedBackend>,
		posts: Arc<ScriptedBackend>,
		products: Arc<ScriptedBackend>,
	) -> Self {
		Self::with_config(creators, users, posts, products, test_config())
	}

	pub fn with_config(
		creators: Arc<ScriptedBackend>,
		users: Arc<ScriptedBackend>,
		posts: Arc<ScriptedBackend>,
		products: Arc<ScriptedBackend>,
		config: SearchConfig,
	) -> Self {
		let adapters = SourceAdapters::from_backends(creators.clone(), users.clone(), posts.clone(), products.clone());
		Self {
			service: DiscoveryService::new(adapters, config),
			creators,
			users,
			posts,
			products,
		}
	}

	pub fn total_calls(&self) -> usize {
		self.creators.calls() + self.users.calls() + self.posts.calls() + self.products.calls()
	}
}

pub fn test_config() -> SearchConfig {
	SearchConfig {
		source_timeout_ms: 200,
		..SearchConfig::default()
	}
}

pub async fn wait_until<F>(name: &str, mut condition: F)
where
	F: FnMut() -> bool,
{
	timeout(Duration::from_secs(2), async move {
		loop {
			if condition() {
				return;
			}
			sleep(Duration::from_millis(10)).await;
		}
	})
	.await
	.unwrap_or_else(|_| panic!("timed out waiting for {name}"));
}
