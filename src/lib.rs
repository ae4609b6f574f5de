//! # Chocolate
//!
//! Mockup data for test suites: saved model instances with every field
//! populated, and the REST payloads of the resources exposing them.
//!
//! This facade re-exports the workspace crates:
//!
//! - [`models`] - schema, generators, model mockups and the in-memory store
//! - [`rest`] - resource mockups producing GET and POST payloads
//!
//! ## Feature Flags
//!
//! - `rest` (default) - REST resource mockups
//! - `yaml` - YAML payloads for the REST layer
//! - `full` - All features enabled
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chocolate::prelude::*;
//!
//! let schema = Arc::new(Schema::new().with_model(
//!     ModelDescriptor::new("blog", "Actor").field(FieldDescriptor::char("name", 32)),
//! ));
//! let store = Arc::new(MemoryStore::new(schema.clone()));
//! let factory = ModelFactory::new(schema, store);
//!
//! let actor = factory.create(&ModelKey::new("blog", "actor"), Overrides::new()).unwrap();
//! assert!(actor.get("name").and_then(|v| v.as_str()).is_some());
//! ```

pub use chocolate_core as models;
#[cfg(feature = "rest")]
pub use chocolate_rest as rest;

pub use chocolate_core::{
	FactoryConfig, FieldValue, Instance, Lookup, MemoryStore, MockupData, MockupError,
	MockupResult, MockupSeeder, ModelFactory, ModelKey, ModelStore, Overrides, overrides,
};

#[cfg(feature = "rest")]
pub use chocolate_rest::{Api, ModelResource, Resource, ResourceFactory, RestError, RestResult};

/// Commonly used types, including the REST layer when enabled.
pub mod prelude {
	pub use chocolate_core::prelude::*;

	#[cfg(feature = "rest")]
	pub use chocolate_rest::{
		Api, ModelResource, Resource, ResourceFactory, ResourceField, RestError, RestResult,
	};
}
