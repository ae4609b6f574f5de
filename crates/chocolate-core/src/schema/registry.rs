//! Schema introspection provider.
//!
//! The engine reads model metadata through [`SchemaProvider`]. [`Schema`] is
//! the in-process implementation: an app registry keyed by
//! `(app_label, model_name)`.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::model::ModelDescriptor;
use crate::key::ModelKey;

/// Source of model metadata.
pub trait SchemaProvider: Send + Sync {
	/// Looks up a model by key.
	fn model(&self, key: &ModelKey) -> Option<Arc<ModelDescriptor>>;

	/// Every known model, in a stable order.
	fn models(&self) -> Vec<Arc<ModelDescriptor>>;
}

/// Registry of model descriptors.
///
/// # Examples
///
/// ```
/// use chocolate_core::ModelKey;
/// use chocolate_core::schema::{ModelDescriptor, Schema, SchemaProvider};
///
/// let schema = Schema::new();
/// schema.register(ModelDescriptor::new("blog", "Actor"));
///
/// assert!(schema.model(&ModelKey::new("blog", "actor")).is_some());
/// assert_eq!(schema.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
	models: Arc<RwLock<BTreeMap<ModelKey, Arc<ModelDescriptor>>>>,
}

impl Schema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a model, replacing any model with the same key.
	pub fn register(&self, model: ModelDescriptor) -> Arc<ModelDescriptor> {
		let model = Arc::new(model);
		self.models
			.write()
			.insert(model.key().clone(), Arc::clone(&model));
		model
	}

	/// Builder-style registration.
	pub fn with_model(self, model: ModelDescriptor) -> Self {
		self.register(model);
		self
	}

	/// Models registered under an application label.
	pub fn app_models(&self, app_label: &str) -> Vec<Arc<ModelDescriptor>> {
		self.models
			.read()
			.values()
			.filter(|model| model.key().app_label() == app_label)
			.cloned()
			.collect()
	}

	pub fn count(&self) -> usize {
		self.models.read().len()
	}
}

impl SchemaProvider for Schema {
	fn model(&self, key: &ModelKey) -> Option<Arc<ModelDescriptor>> {
		self.models.read().get(key).cloned()
	}

	fn models(&self) -> Vec<Arc<ModelDescriptor>> {
		self.models.read().values().cloned().collect()
	}
}
