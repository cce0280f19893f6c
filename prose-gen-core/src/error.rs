//! Error handling shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = ProseGenError> = std::result::Result<T, E>;

/// Failures surfaced by model construction, generation, or corpus I/O.
#[derive(Debug, Error)]
pub enum ProseGenError {
	/// Model configuration failed validation (bad order, unusable markers).
	#[error("invalid configuration: {0}")]
	Configuration(String),
	/// Generation reached a context the model never observed.
	#[error("no learned continuation for context [{0}]")]
	DataSparsity(String),
	/// Training saw no usable token sequences at all.
	#[error("corpus produced no n-gram observations")]
	EmptyCorpus,
	/// Filesystem error with the offending path attached when known.
	#[error("io error while processing {path:?}: {source}")]
	Io {
		/// Underlying error returned by the standard library.
		source: std::io::Error,
		/// Path associated with the failure if available.
		path: Option<PathBuf>,
	},
	/// Model cache serialization or deserialization failure.
	#[error("serialization error: {0}")]
	Serialization(String),
}

impl From<postcard::Error> for ProseGenError {
	fn from(err: postcard::Error) -> Self {
		Self::Serialization(err.to_string())
	}
}

impl ProseGenError {
	/// Helper constructor that attaches an optional path when wrapping IO errors.
	pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
		Self::Io { source, path }
	}
}
