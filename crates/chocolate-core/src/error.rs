//! Error types for mockup generation.
//!
//! Every error propagates to the caller unchanged; test data generation is
//! expected to fail loudly on misconfiguration.

use thiserror::Error;

/// Errors raised by a [`ModelStore`](crate::store::ModelStore).
#[derive(Debug, Error)]
pub enum StoreError {
	/// No row with the given primary key.
	#[error("{model} matching pk={pk} does not exist")]
	DoesNotExist {
		/// Model key.
		model: String,
		/// Primary key looked up.
		pk: i64,
	},

	/// The model has no field with that name.
	#[error("Unknown field: {model}.{field}")]
	UnknownField {
		/// Model key.
		model: String,
		/// Field name.
		field: String,
	},

	/// Backend specific failure.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Errors that can occur while building mockups.
#[derive(Debug, Error)]
pub enum MockupError {
	/// No mockup is registered under the key.
	#[error("Model not registered: {0}")]
	NotRegistered(String),

	/// A bare model name matches mockups from several applications.
	#[error("Multiple mockups match '{key}': {}", candidates.join(", "))]
	AmbiguousKey {
		/// Bare key that was looked up.
		key: String,
		/// Namespaced keys sharing that name.
		candidates: Vec<String>,
	},

	/// The schema provider does not know the model.
	#[error("Unknown model: {0}")]
	UnknownModel(String),

	/// No generator or default exists for a field that needs a value.
	#[error("Could not mockup data for {model}.{field} ({kind})")]
	MissingGenerator {
		/// Model name.
		model: String,
		/// Field name.
		field: String,
		/// Field type name.
		kind: String,
	},

	/// Every generated value for a unique field collided with stored rows.
	#[error("No unique value for {model}.{field} after {attempts} attempts")]
	UniqueExhausted {
		/// Model name.
		model: String,
		/// Field name.
		field: String,
		/// Number of generated candidates.
		attempts: usize,
	},

	/// Related-object creation nested deeper than the configured limit.
	#[error("Recursion limit of {depth} reached while creating {model}; force a value to break the cycle")]
	RecursionLimit {
		/// Model being created when the limit was hit.
		model: String,
		/// Configured maximum depth.
		depth: usize,
	},

	/// A to-many field received a value it cannot link.
	#[error("Invalid value for to-many field {field}: {reason}")]
	InvalidRelationValue {
		/// Accessor name.
		field: String,
		/// What was wrong with it.
		reason: String,
	},

	/// The model has no to-many accessor with that name.
	#[error("Unknown relation: {model}.{accessor}")]
	UnknownRelation {
		/// Model key.
		model: String,
		/// Accessor name.
		accessor: String,
	},

	/// Persistence failed.
	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Result type alias for mockup operations.
pub type MockupResult<T> = Result<T, MockupError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
