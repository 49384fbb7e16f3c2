use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Category;

/// Generic filter map shared by every source.
///
/// Keys carry partially overlapping semantics across domains; each source
/// adapter keeps the keys it understands and drops the rest.
pub type Filters = BTreeMap<String, serde_json::Value>;

/// The user's search intent: text, tab, filters and page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
	pub text: String,
	pub category: Category,
	#[serde(default)]
	pub filters: Filters,
	/// 1-based page; only meaningful in single-category mode.
	pub page: u32,
}

impl Default for SearchQuery {
	fn default() -> Self {
		Self {
			text: String::new(),
			category: Category::All,
			filters: Filters::new(),
			page: 1,
		}
	}
}

impl SearchQuery {
	/// Creates a first-page query for `text` in `category`.
	pub fn new(text: impl Into<String>, category: Category) -> Self {
		Self {
			text: text.into(),
			category,
			..Self::default()
		}
	}

	/// Returns true when the text holds nothing but whitespace.
	pub fn is_blank(&self) -> bool {
		self.text.trim().is_empty()
	}
}

/// Request handed to a single source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
	pub text: String,
	pub filters: Filters,
	pub page: u32,
	pub limit: u32,
}
