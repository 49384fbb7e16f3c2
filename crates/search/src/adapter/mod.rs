//! Source adapters: the failure-containment boundary around each domain backend.
//!
//! Every domain (creators, users, posts, products) exposes the same outbound
//! contract, [`SearchBackend`]. A [`DomainAdapter`] translates the generic
//! [`SearchRequest`] into that domain's call using a static [`DomainProfile`]
//! and converts anything the backend does wrong into a failed
//! [`SourceResult`]. Nothing escapes an adapter as an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sift_primitives::{Category, Filters, Item, SearchRequest, SourceErrorKind, SourceResult};

use crate::error::BackendError;

/// Filter key carrying free text for backends that list rather than search.
pub const SEARCH_FILTER: &str = "search";

/// Query sent to one domain backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendQuery {
	/// Native free text; `None` when the domain takes text as a filter.
	pub text: Option<String>,
	pub filters: Filters,
	pub page: u32,
	pub limit: u32,
}

/// One page of backend results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendPage {
	pub items: Vec<Item>,
	pub total: u64,
	pub total_pages: u32,
}

/// Outbound contract of a domain search or list service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
	async fn search(&self, query: BackendQuery) -> Result<BackendPage, BackendError>;
}

/// Uniform per-source query interface used by the dispatcher.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
	/// The source this adapter serves.
	fn category(&self) -> Category;

	/// Runs one request under `timeout`; always settles to a result.
	async fn query(&self, request: &SearchRequest, timeout: Duration) -> SourceResult;
}

/// Where a domain expects the free-text part of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPlacement {
	/// Passed as the backend's native text argument.
	Native,
	/// Passed as a filter under the given key.
	Filter(&'static str),
}

/// Static translation table for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainProfile {
	pub category: Category,
	/// Generic filter keys this domain understands.
	pub accepted: &'static [&'static str],
	/// Generic key to backend key renames, applied after acceptance.
	pub renames: &'static [(&'static str, &'static str)],
	pub text: TextPlacement,
}

impl DomainProfile {
	pub const CREATORS: Self = Self {
		category: Category::Creators,
		accepted: &["location", "craft", "verified"],
		renames: &[],
		text: TextPlacement::Native,
	};

	pub const USERS: Self = Self {
		category: Category::Users,
		accepted: &["location", "role"],
		renames: &[],
		text: TextPlacement::Native,
	};

	pub const POSTS: Self = Self {
		category: Category::Posts,
		accepted: &["tag", "author", "status"],
		renames: &[],
		text: TextPlacement::Filter(SEARCH_FILTER),
	};

	pub const PRODUCTS: Self = Self {
		category: Category::Products,
		accepted: &["category", "craft", "min_price", "max_price", "in_stock"],
		renames: &[("category", "category_id")],
		text: TextPlacement::Native,
	};

	/// Translates a generic request into this domain's backend query.
	///
	/// Keys outside [`Self::accepted`] are dropped, not rejected.
	pub fn translate(&self, request: &SearchRequest) -> BackendQuery {
		let mut filters = Filters::new();
		for (key, value) in &request.filters {
			if !self.accepted.contains(&key.as_str()) {
				tracing::trace!(category = %self.category, key = %key, "search.filter_dropped");
				continue;
			}
			let backend_key = self
				.renames
				.iter()
				.find(|(from, _)| *from == key.as_str())
				.map_or(key.as_str(), |(_, to)| *to);
			filters.insert(backend_key.to_string(), value.clone());
		}

		let text = request.text.trim().to_string();
		let text = match self.text {
			TextPlacement::Native => Some(text),
			TextPlacement::Filter(key) => {
				filters.insert(key.to_string(), serde_json::Value::String(text));
				None
			}
		};

		BackendQuery {
			text,
			filters,
			page: request.page.max(1),
			limit: request.limit,
		}
	}
}

/// [`SourceAdapter`] over a [`SearchBackend`] using a [`DomainProfile`].
#[derive(Clone)]
pub struct DomainAdapter {
	profile: DomainProfile,
	backend: Arc<dyn SearchBackend>,
}

impl std::fmt::Debug for DomainAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DomainAdapter").field("profile", &self.profile).finish_non_exhaustive()
	}
}

impl DomainAdapter {
	pub fn new(profile: DomainProfile, backend: Arc<dyn SearchBackend>) -> Self {
		Self { profile, backend }
	}

	pub fn creators(backend: Arc<dyn SearchBackend>) -> Self {
		Self::new(DomainProfile::CREATORS, backend)
	}

	pub fn users(backend: Arc<dyn SearchBackend>) -> Self {
		Self::new(DomainProfile::USERS, backend)
	}

	pub fn posts(backend: Arc<dyn SearchBackend>) -> Self {
		Self::new(DomainProfile::POSTS, backend)
	}

	pub fn products(backend: Arc<dyn SearchBackend>) -> Self {
		Self::new(DomainProfile::PRODUCTS, backend)
	}

	pub const fn profile(&self) -> &DomainProfile {
		&self.profile
	}

	fn accept(&self, page: BackendPage, limit: u32) -> SourceResult {
		let category = self.profile.category;
		let items: Vec<Item> = page
			.items
			.into_iter()
			.take(limit as usize)
			.map(|mut item| {
				item.source = category;
				item
			})
			.collect();
		let total_pages = if page.total_pages == 0 && page.total > 0 && limit > 0 {
			u32::try_from(page.total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
		} else {
			page.total_pages
		};
		SourceResult::completed(category, items, page.total, total_pages)
	}
}

#[async_trait]
impl SourceAdapter for DomainAdapter {
	fn category(&self) -> Category {
		self.profile.category
	}

	async fn query(&self, request: &SearchRequest, timeout: Duration) -> SourceResult {
		let category = self.profile.category;
		let started = Instant::now();
		let backend_query = self.profile.translate(request);

		let result = match tokio::time::timeout(timeout, self.backend.search(backend_query)).await {
			Ok(Ok(page)) => self.accept(page, request.limit),
			Ok(Err(error)) => {
				tracing::warn!(category = %category, error = %error, "source backend failed; continuing without it");
				SourceResult::failed(category, error.kind())
			}
			Err(_elapsed) => {
				tracing::warn!(
					category = %category,
					timeout_ms = timeout.as_millis() as u64,
					"source timed out; continuing without it"
				);
				SourceResult::failed(category, SourceErrorKind::Timeout)
			}
		};

		tracing::debug!(
			category = %category,
			elapsed_ms = started.elapsed().as_millis() as u64,
			outcome = result.error_kind.as_ref().map_or("ok", SourceErrorKind::as_str),
			items = result.items.len(),
			total = result.total,
			"search.source"
		);
		result
	}
}

/// The four source adapters, one per concrete category.
#[derive(Clone)]
pub struct SourceAdapters {
	pub creators: Arc<dyn SourceAdapter>,
	pub users: Arc<dyn SourceAdapter>,
	pub posts: Arc<dyn SourceAdapter>,
	pub products: Arc<dyn SourceAdapter>,
}

impl SourceAdapters {
	/// Wraps four domain backends in their [`DomainAdapter`]s.
	pub fn from_backends(
		creators: Arc<dyn SearchBackend>,
		users: Arc<dyn SearchBackend>,
		posts: Arc<dyn SearchBackend>,
		products: Arc<dyn SearchBackend>,
	) -> Self {
		Self {
			creators: Arc::new(DomainAdapter::creators(creators)),
			users: Arc::new(DomainAdapter::users(users)),
			posts: Arc::new(DomainAdapter::posts(posts)),
			products: Arc::new(DomainAdapter::products(products)),
		}
	}

	/// Adapter for `category`; `None` for [`Category::All`].
	pub fn get(&self, category: Category) -> Option<&Arc<dyn SourceAdapter>> {
		match category {
			Category::All => None,
			Category::Creators => Some(&self.creators),
			Category::Users => Some(&self.users),
			Category::Posts => Some(&self.posts),
			Category::Products => Some(&self.products),
		}
	}
}
