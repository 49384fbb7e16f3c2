//! Error types for backends, configuration and fixture loading.

use std::path::PathBuf;

use sift_primitives::{ParseCategoryError, SourceErrorKind};
use thiserror::Error;

/// Failure reported by a domain search backend.
///
/// Adapters never let these escape; they become failed source results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
	/// The backend answered with a non-success HTTP-like status.
	#[error("backend returned status {status}: {message}")]
	Status {
		/// Status code reported by the backend.
		status: u16,
		/// Human-readable detail from the response body.
		message: String,
	},

	/// The request failed before any status was received.
	#[error("transport error: {0}")]
	Transport(String),

	/// The response could not be decoded into a result page.
	#[error("undecodable response: {0}")]
	Decode(String),
}

impl BackendError {
	/// Classifies this error for the aggregated result.
	pub fn kind(&self) -> SourceErrorKind {
		match self {
			Self::Status { status, .. } if (400..500).contains(status) => SourceErrorKind::Rejected { status: *status },
			Self::Status { status, .. } if (500..600).contains(status) => SourceErrorKind::Unavailable { status: *status },
			Self::Status { .. } | Self::Transport(_) => SourceErrorKind::Transport,
			Self::Decode(_) => SourceErrorKind::Decode,
		}
	}
}

/// Errors that can occur when loading search configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value parsed but is out of range.
	#[error("invalid config: {0}")]
	Invalid(String),
}

/// Errors that can occur when loading fixture catalogs.
#[derive(Debug, Error)]
pub enum FixtureError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("fixture JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("fixture section: {0}")]
	UnknownCategory(#[from] ParseCategoryError),
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(BackendError::Status { status: 404, message: "missing".into() }, SourceErrorKind::Rejected { status: 404 })]
	#[case(BackendError::Status { status: 503, message: "busy".into() }, SourceErrorKind::Unavailable { status: 503 })]
	#[case(BackendError::Status { status: 302, message: "moved".into() }, SourceErrorKind::Transport)]
	#[case(BackendError::Transport("reset".into()), SourceErrorKind::Transport)]
	#[case(BackendError::Decode("eof".into()), SourceErrorKind::Decode)]
	fn classifies_backend_errors(#[case] error: BackendError, #[case] expected: SourceErrorKind) {
		assert_eq!(error.kind(), expected);
	}
}
