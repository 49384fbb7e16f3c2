use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Category;

/// Opaque, source-tagged result payload.
///
/// Only `id` is read by the aggregator, for list-key stability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
	pub id: Arc<str>,
	pub source: Category,
	#[serde(default)]
	pub payload: serde_json::Value,
}

impl Item {
	pub fn new(id: impl Into<Arc<str>>, source: Category, payload: serde_json::Value) -> Self {
		Self {
			id: id.into(),
			source,
			payload,
		}
	}
}

/// Why a single source produced no results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceErrorKind {
	/// The source did not answer within its timeout.
	Timeout,
	/// The source rejected the request (4xx).
	Rejected { status: u16 },
	/// The source failed to serve the request (5xx).
	Unavailable { status: u16 },
	/// The request never produced a status.
	Transport,
	/// The response could not be interpreted.
	Decode,
	/// The adapter task aborted before settling.
	Panicked,
}

impl SourceErrorKind {
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Timeout => "timeout",
			Self::Rejected { .. } => "rejected",
			Self::Unavailable { .. } => "unavailable",
			Self::Transport => "transport",
			Self::Decode => "decode",
			Self::Panicked => "panicked",
		}
	}
}

/// One source's answer for one batch.
///
/// A failed result never carries items or totals; use [`SourceResult::failed`]
/// and [`SourceResult::completed`] to construct it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
	pub source: Category,
	pub items: Vec<Item>,
	pub total: u64,
	pub total_pages: u32,
	pub failed: bool,
	pub error_kind: Option<SourceErrorKind>,
}

impl SourceResult {
	pub fn completed(source: Category, items: Vec<Item>, total: u64, total_pages: u32) -> Self {
		Self {
			source,
			items,
			total,
			total_pages,
			failed: false,
			error_kind: None,
		}
	}

	pub fn failed(source: Category, kind: SourceErrorKind) -> Self {
		Self {
			source,
			items: Vec::new(),
			total: 0,
			total_pages: 0,
			failed: true,
			error_kind: Some(kind),
		}
	}
}

/// Which shape an [`AggregatedResultSet`] has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "category", rename_all = "snake_case")]
pub enum SearchMode {
	/// Blank query; nothing was dispatched.
	#[default]
	Empty,
	/// Capped slice of every source.
	Overview,
	/// Full pagination over one source.
	Single(Category),
}

/// The externally visible, immutable result of one accepted batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResultSet {
	pub generation: u64,
	pub mode: SearchMode,
	pub by_category: BTreeMap<Category, Vec<Item>>,
	pub totals: BTreeMap<Category, u64>,
	/// Page count for the drilled-down category; `None` in overview mode.
	pub total_pages: Option<u32>,
	pub failures: BTreeMap<Category, SourceErrorKind>,
	pub partial: bool,
}

impl AggregatedResultSet {
	/// Result for a blank query: no categories, nothing partial.
	pub fn empty(generation: u64) -> Self {
		Self {
			generation,
			..Self::default()
		}
	}

	/// Items for `category`, or `None` when the category was not queried.
	pub fn items(&self, category: Category) -> Option<&[Item]> {
		self.by_category.get(&category).map(Vec::as_slice)
	}

	pub fn total(&self, category: Category) -> Option<u64> {
		self.totals.get(&category).copied()
	}

	/// Returns true when every queried source failed.
	pub fn all_failed(&self) -> bool {
		!self.by_category.is_empty() && self.failures.len() == self.by_category.len()
	}
}
