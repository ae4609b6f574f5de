//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use chocolate_core::prelude::*;
//!
//! let key = ModelKey::new("blog", "Entry");
//! let forced = overrides! { "content" => "Homer Simpson" };
//! assert_eq!(key.to_string(), "blog.entry");
//! assert!(forced.contains("content"));
//! ```

// Error types
pub use crate::error::{MockupError, MockupResult, StoreError, StoreResult};

// Schema types
pub use crate::key::ModelKey;
pub use crate::schema::{
	FieldDefault, FieldDescriptor, FieldKind, ModelDescriptor, RelatedName, Schema,
	SchemaProvider,
};

// Values
pub use crate::value::{FieldValue, Instance, Overrides};

// Engine
pub use crate::config::FactoryConfig;
pub use crate::data::MockupData;
pub use crate::factory::{Lookup, MockupRef, ModelFactory};
pub use crate::generators::{GeneratorRegistry, ValueGenerator};
pub use crate::mockup::MockupSeeder;

// Storage
pub use crate::store::{MemoryStore, ModelStore};

pub use crate::overrides;
