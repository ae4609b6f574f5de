//! Mockup REST payloads for resources backed by models.
//!
//! A [`ResourceFactory`] wraps a [`ModelFactory`](chocolate_core::ModelFactory)
//! and an [`Api`]. For each resource it can create a saved object and its
//! locator, the payload a GET of that object would return, or a payload
//! suitable for a POST that creates a new one.
//!
//! # Features
//!
//! - `json` - JSON payloads (enabled by default)
//! - `yaml` - YAML payloads (`application/x-yaml`, `text/yaml`)
//! - `full` - All features enabled
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chocolate_core::prelude::*;
//! use chocolate_rest::{Api, ModelResource, ResourceFactory};
//!
//! let schema = Arc::new(Schema::new().with_model(
//!     ModelDescriptor::new("blog", "Entry").field(FieldDescriptor::text("content")),
//! ));
//! let store = Arc::new(MemoryStore::new(schema.clone()));
//! let models = Arc::new(ModelFactory::new(schema.clone(), store));
//!
//! let entry = ModelResource::from_schema(&*schema, "EntryResource", &ModelKey::new("blog", "entry")).unwrap();
//! let api = Arc::new(Api::new("v1").with_resource(entry));
//! let resources = ResourceFactory::new(api, models).unwrap();
//!
//! let (uri, instance) = resources.get("entry").unwrap().create(Overrides::new()).unwrap();
//! assert_eq!(uri, format!("/api/v1/entry/{}/", instance.pk()));
//!
//! let post = resources.get("entry").unwrap().create_post_data(overrides! { "content" => "Hi" }).unwrap();
//! assert_eq!(post["content"], "Hi");
//! assert!(!post.contains_key("id"));
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

pub mod api;
pub mod error;
pub mod factory;
pub mod resource;

pub use api::Api;
pub use error::{RestError, RestResult};
pub use factory::{ResourceFactory, ResourceMockup, ResourceMockupRef};
pub use resource::{Bundle, ModelResource, Resource, ResourceField, ResourceFieldKind};
