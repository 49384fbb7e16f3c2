use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A searchable content domain, or [`Category::All`] for the overview tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	/// Overview across every source.
	#[default]
	All,
	Creators,
	Users,
	Posts,
	Products,
}

impl Category {
	/// The four concrete sources, in overview order.
	pub const SOURCES: [Category; 4] = [Self::Creators, Self::Users, Self::Posts, Self::Products];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::All => "all",
			Self::Creators => "creators",
			Self::Users => "users",
			Self::Posts => "posts",
			Self::Products => "products",
		}
	}

	/// Returns true for the overview pseudo-category.
	pub const fn is_all(self) -> bool {
		matches!(self, Self::All)
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a category name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}' (expected all, creators, users, posts or products)")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
	type Err = ParseCategoryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim();
		[Self::All, Self::Creators, Self::Users, Self::Posts, Self::Products]
			.into_iter()
			.find(|category| category.as_str().eq_ignore_ascii_case(name))
			.ok_or_else(|| ParseCategoryError(name.to_string()))
	}
}
