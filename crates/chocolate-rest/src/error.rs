//! Error types for resource mockups.

use chocolate_core::MockupError;
use thiserror::Error;

/// Errors that can occur while building resource payloads.
#[derive(Debug, Error)]
pub enum RestError {
	/// No resource is registered under the key.
	#[error("Resource not registered: {0}")]
	UnregisteredResource(String),

	/// The serialization format is not supported.
	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),

	/// An encoded payload did not decode to an object.
	#[error("Payload is not an object: {0}")]
	InvalidPayload(String),

	/// Creating the backing model instance failed.
	#[error(transparent)]
	Mockup(#[from] MockupError),

	/// JSON encoding failed.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// YAML encoding failed.
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for resource operations.
pub type RestResult<T> = Result<T, RestError>;
