//! In-memory fixture backend for tests and the demo CLI.
//!
//! Matching is a plain case-insensitive substring test on record titles; this
//! is a stand-in for a real domain service, not a ranking engine.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sift_primitives::{Category, Item};

use crate::adapter::{BackendPage, BackendQuery, SEARCH_FILTER, SearchBackend, SourceAdapters};
use crate::error::{BackendError, FixtureError};

/// One fixture document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub attrs: BTreeMap<String, Value>,
}

/// [`SearchBackend`] over a fixed list of records.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
	category: Category,
	records: Vec<Record>,
	known_keys: BTreeSet<String>,
	latency: Option<Duration>,
	failure: Option<BackendError>,
}

impl MemoryBackend {
	pub fn new(category: Category, records: Vec<Record>) -> Self {
		let known_keys = records.iter().flat_map(|record| record.attrs.keys().cloned()).collect();
		Self {
			category,
			records,
			known_keys,
			latency: None,
			failure: None,
		}
	}

	/// Delays every answer by `latency`.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	/// Answers every query with `failure`.
	pub fn with_failure(mut self, failure: BackendError) -> Self {
		self.failure = Some(failure);
		self
	}

	fn matches(&self, record: &Record, needle: Option<&str>, filters: &BTreeMap<String, Value>) -> bool {
		if let Some(needle) = needle
			&& !needle.is_empty()
			&& !record.title.to_lowercase().contains(needle)
		{
			return false;
		}
		filters
			.iter()
			.filter(|(key, _)| key.as_str() != SEARCH_FILTER && self.known_keys.contains(key.as_str()))
			.all(|(key, value)| record.attrs.get(key) == Some(value))
	}
}

#[async_trait]
impl SearchBackend for MemoryBackend {
	async fn search(&self, query: BackendQuery) -> Result<BackendPage, BackendError> {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}
		if let Some(failure) = &self.failure {
			return Err(failure.clone());
		}

		let needle = query
			.text
			.as_deref()
			.or_else(|| query.filters.get(SEARCH_FILTER).and_then(Value::as_str))
			.map(|text| text.trim().to_lowercase());

		let matched: Vec<&Record> = self
			.records
			.iter()
			.filter(|record| self.matches(record, needle.as_deref(), &query.filters))
			.collect();

		let total = matched.len() as u64;
		if query.limit == 0 {
			return Ok(BackendPage {
				items: Vec::new(),
				total,
				total_pages: 0,
			});
		}

		let limit = query.limit as usize;
		let start = (query.page.max(1) as usize - 1).saturating_mul(limit);
		let items = matched
			.into_iter()
			.skip(start)
			.take(limit)
			.map(|record| {
				Item::new(
					record.id.as_str(),
					self.category,
					json!({ "title": record.title, "attrs": record.attrs }),
				)
			})
			.collect();

		Ok(BackendPage {
			items,
			total,
			total_pages: u32::try_from(total.div_ceil(u64::from(query.limit))).unwrap_or(u32::MAX),
		})
	}
}

/// Fixture catalogs for all four sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixtures {
	pub creators: Vec<Record>,
	pub users: Vec<Record>,
	pub posts: Vec<Record>,
	pub products: Vec<Record>,
}

impl Fixtures {
	/// Parses `{ "creators": [...], "users": [...], ... }`.
	///
	/// Missing sections are empty; unknown section names are an error.
	pub fn from_json_str(source: &str) -> Result<Self, FixtureError> {
		let sections: BTreeMap<String, Vec<Record>> = serde_json::from_str(source)?;
		let mut fixtures = Self::default();
		for (name, records) in sections {
			match name.parse::<Category>()? {
				Category::Creators => fixtures.creators = records,
				Category::Users => fixtures.users = records,
				Category::Posts => fixtures.posts = records,
				Category::Products => fixtures.products = records,
				Category::All => return Err(FixtureError::UnknownCategory(sift_primitives::ParseCategoryError(name))),
			}
		}
		Ok(fixtures)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|error| FixtureError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_json_str(&source)
	}

	/// Builds the four domain adapters over memory backends.
	pub fn into_adapters(self) -> SourceAdapters {
		SourceAdapters::from_backends(
			Arc::new(MemoryBackend::new(Category::Creators, self.creators)),
			Arc::new(MemoryBackend::new(Category::Users, self.users)),
			Arc::new(MemoryBackend::new(Category::Posts, self.posts)),
			Arc::new(MemoryBackend::new(Category::Products, self.products)),
		)
	}
}
