//! Search configuration loaded from TOML.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sift_primitives::Category;

use crate::error::ConfigError;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Page sizes and per-source timeouts for the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
	/// Per-source item cap in overview mode.
	pub overview_limit: u32,
	/// Page size in single-category mode.
	pub page_size: u32,
	/// Default timeout for one source call.
	pub source_timeout_ms: u64,
	/// Per-category timeout overrides, keyed by category name.
	pub source_timeouts_ms: BTreeMap<String, u64>,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			overview_limit: 6,
			page_size: 20,
			source_timeout_ms: 3000,
			source_timeouts_ms: BTreeMap::new(),
		}
	}
}

impl SearchConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		toml::from_str::<Self>(source)?.validated()
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&source)
	}

	/// Checks ranges and canonicalizes override keys.
	pub fn validated(mut self) -> Result<Self> {
		if self.overview_limit == 0 {
			return Err(ConfigError::Invalid("overview_limit must be greater than zero".into()));
		}
		if self.page_size == 0 {
			return Err(ConfigError::Invalid("page_size must be greater than zero".into()));
		}
		if self.source_timeout_ms == 0 {
			return Err(ConfigError::Invalid("source_timeout_ms must be greater than zero".into()));
		}

		let mut overrides = BTreeMap::new();
		for (key, timeout_ms) in std::mem::take(&mut self.source_timeouts_ms) {
			let category: Category = key.parse().map_err(|err| ConfigError::Invalid(format!("source_timeouts_ms: {err}")))?;
			if category.is_all() {
				return Err(ConfigError::Invalid("source_timeouts_ms: 'all' is not a source".into()));
			}
			if timeout_ms == 0 {
				return Err(ConfigError::Invalid(format!("source_timeouts_ms.{category} must be greater than zero")));
			}
			overrides.insert(category.as_str().to_string(), timeout_ms);
		}
		self.source_timeouts_ms = overrides;
		Ok(self)
	}

	/// Timeout budget for one call to `category`'s source.
	pub fn timeout_for(&self, category: Category) -> Duration {
		let ms = self.source_timeouts_ms.get(category.as_str()).copied().unwrap_or(self.source_timeout_ms);
		Duration::from_millis(ms)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		let config = SearchConfig::from_toml_str("").unwrap();
		assert_eq!(config, SearchConfig::default());
		assert_eq!(config.overview_limit, 6);
		assert_eq!(config.page_size, 20);
		assert_eq!(config.timeout_for(Category::Posts), Duration::from_secs(3));
	}

	#[test]
	fn per_source_overrides_are_canonicalized() {
		let config = SearchConfig::from_toml_str(
			r#"
			source_timeout_ms = 800

			[source_timeouts_ms]
			Products = 1500
			"#,
		)
		.unwrap();
		assert_eq!(config.timeout_for(Category::Products), Duration::from_millis(1500));
		assert_eq!(config.timeout_for(Category::Creators), Duration::from_millis(800));
		assert!(config.source_timeouts_ms.contains_key("products"));
	}

	#[test]
	fn rejects_zero_limits_and_overview_overrides() {
		assert!(matches!(SearchConfig::from_toml_str("page_size = 0"), Err(ConfigError::Invalid(_))));
		assert!(matches!(
			SearchConfig::from_toml_str("[source_timeouts_ms]\nall = 10"),
			Err(ConfigError::Invalid(_))
		));
		assert!(matches!(
			SearchConfig::from_toml_str("[source_timeouts_ms]\nevents = 10"),
			Err(ConfigError::Invalid(_))
		));
	}

	#[test]
	fn rejects_unknown_fields() {
		assert!(matches!(SearchConfig::from_toml_str("page_limit = 3"), Err(ConfigError::Toml(_))));
	}

	#[test]
	fn load_reports_missing_file_path() {
		let dir = tempfile::tempdir().expect("must create tempdir");
		let missing = dir.path().join("sift.toml");
		let err = SearchConfig::load(&missing).unwrap_err();
		assert!(err.to_string().contains("sift.toml"), "unexpected error: {err}");
	}

	#[test]
	fn load_reads_file() {
		let mut file = tempfile::NamedTempFile::new().expect("must create temp file");
		writeln!(file, "overview_limit = 4\npage_size = 10").expect("must write config");
		let config = SearchConfig::load(file.path()).unwrap();
		assert_eq!(config.overview_limit, 4);
		assert_eq!(config.page_size, 10);
	}
}
