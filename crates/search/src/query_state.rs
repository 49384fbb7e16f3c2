//! Owned, single-writer search intent.

use sift_primitives::{Category, Filters, SearchQuery};

/// The current search text, tab, filters and page.
///
/// Every setter except [`QueryState::set_page`] resets the page to 1, since
/// pagination is only meaningful within a stable query. Readers take
/// [`QueryState::snapshot`]s; the live state is never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
	query: SearchQuery,
}

impl QueryState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds state from an existing query, clamping its page to at least 1.
	pub fn from_query(mut query: SearchQuery) -> Self {
		query.page = query.page.max(1);
		Self { query }
	}

	/// Seeds state from a `?q=<text>&type=<category>` query string.
	///
	/// The leading `?` is optional. A missing or unrecognised `type` selects
	/// the overview; any other parameter is ignored.
	pub fn from_url_query(query_string: &str) -> Self {
		let mut state = Self::new();
		let raw = query_string.trim().trim_start_matches('?');
		for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
			match key.as_ref() {
				"q" => state.query.text = value.into_owned(),
				"type" => state.query.category = value.parse().unwrap_or(Category::All),
				_ => {}
			}
		}
		state
	}

	pub fn query(&self) -> &SearchQuery {
		&self.query
	}

	/// Immutable copy for concurrent readers.
	pub fn snapshot(&self) -> SearchQuery {
		self.query.clone()
	}

	pub fn set_text(&mut self, text: impl Into<String>) {
		self.query.text = text.into();
		self.query.page = 1;
	}

	pub fn set_category(&mut self, category: Category) {
		self.query.category = category;
		self.query.page = 1;
	}

	pub fn set_filters(&mut self, filters: Filters) {
		self.query.filters = filters;
		self.query.page = 1;
	}

	/// Moves to `page`; 0 is treated as 1.
	pub fn set_page(&mut self, page: u32) {
		self.query.page = page.max(1);
	}

	/// Restores the zero-value query.
	pub fn reset(&mut self) {
		self.query = SearchQuery::default();
	}
}
