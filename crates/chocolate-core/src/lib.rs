//! Schema-driven mockup generation for persisted model instances.
//!
//! Given a model schema, this crate creates fully populated, saved instances
//! for test suites. Callers force any subset of fields; every other field gets
//! a random value of the right type, related objects are created on demand,
//! and to-many relations can be filled by count or with explicit instances.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use chocolate_core::prelude::*;
//!
//! let user = ModelKey::new("auth", "user");
//! let entry = ModelKey::new("blog", "entry");
//! let schema = Arc::new(
//!     Schema::new()
//!         .with_model(ModelDescriptor::new("auth", "User").field(FieldDescriptor::char("username", 30)))
//!         .with_model(
//!             ModelDescriptor::new("blog", "Entry")
//!                 .field(FieldDescriptor::text("content"))
//!                 .field(FieldDescriptor::foreign_key("author", user.clone()))
//!                 .field(FieldDescriptor::datetime("created")),
//!         )
//!         .with_model(
//!             ModelDescriptor::new("blog", "Comment")
//!                 .field(FieldDescriptor::foreign_key("post", entry.clone()).related_name("comments"))
//!                 .field(FieldDescriptor::text("content")),
//!         ),
//! );
//! let store = Arc::new(MemoryStore::new(schema.clone()));
//! let factory = ModelFactory::new(schema, store);
//! factory.register(&entry).unwrap();
//!
//! let post = factory
//!     .create("entry", overrides! { "content" => "Homer Simpson", "comments" => 2 })
//!     .unwrap();
//!
//! assert_eq!(post.get("content").and_then(|v| v.as_str()), Some("Homer Simpson"));
//! assert!(post.related("author").is_some());
//! assert_eq!(factory.related(&post, "comments").unwrap().count().unwrap(), 2);
//! ```
//!
//! # Architecture
//!
//! - [`schema`] - model and field descriptors, read through [`SchemaProvider`]
//! - [`generators`] - random value generators keyed by field type name
//! - [`classifier`] - regular vs to-many field classification
//! - [`MockupData`] - the value set collected before saving
//! - [`ModelMockup`] / [`MockupSeeder`] - per-model generation and hooks
//! - [`ModelFactory`] - registration and lookup of mockups
//! - [`store`] - persistence through [`ModelStore`], with [`MemoryStore`]

#![warn(rustdoc::missing_crate_level_docs)]

pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod factory;
pub mod generators;
pub mod key;
pub mod mockup;
pub mod prelude;
pub mod related;
pub mod schema;
pub mod store;
pub mod value;

// Re-export commonly used types at crate root
pub use classifier::{FieldClassifier, FieldSets, Relation, ToManyField};
pub use config::FactoryConfig;
pub use data::MockupData;
pub use error::{MockupError, MockupResult, StoreError, StoreResult};
pub use factory::{Lookup, MockupRef, ModelFactory};
pub use generators::{GeneratorRegistry, ValueGenerator};
pub use key::ModelKey;
pub use mockup::{MockupSeeder, ModelMockup};
pub use related::RelatedManager;
pub use schema::SchemaProvider;
pub use store::{MemoryStore, ModelStore};
pub use value::{FieldValue, Instance, Overrides};
