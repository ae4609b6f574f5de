//! API registry of resources.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::resource::Resource;

/// A named collection of resources, keyed by resource name.
///
/// # Examples
///
/// ```
/// use chocolate_core::ModelKey;
/// use chocolate_rest::api::Api;
/// use chocolate_rest::resource::{ModelResource, Resource};
///
/// let mut api = Api::new("v1");
/// api.register(ModelResource::new("EntryResource", ModelKey::new("blog", "entry")));
///
/// let entry = api.canonical_resource_for("entry").unwrap();
/// assert_eq!(entry.type_name(), "EntryResource");
/// ```
pub struct Api {
	api_name: String,
	registry: BTreeMap<String, Arc<dyn Resource>>,
}

impl Api {
	pub fn new(api_name: impl Into<String>) -> Self {
		Self {
			api_name: api_name.into(),
			registry: BTreeMap::new(),
		}
	}

	pub fn api_name(&self) -> &str {
		&self.api_name
	}

	/// Adds a resource, replacing any resource with the same name.
	pub fn register<R>(&mut self, mut resource: R)
	where
		R: Resource + 'static,
	{
		resource.set_api_name(&self.api_name);
		let name = resource.resource_name().to_string();
		debug!(api = %self.api_name, resource = %name, "registered resource");
		self.registry.insert(name, Arc::new(resource));
	}

	/// Builder-style [`register`](Self::register).
	pub fn with_resource<R>(mut self, resource: R) -> Self
	where
		R: Resource + 'static,
	{
		self.register(resource);
		self
	}

	pub fn get(&self, resource_name: &str) -> Option<Arc<dyn Resource>> {
		self.registry.get(resource_name).cloned()
	}

	/// The resource registered under `resource_name`.
	pub fn canonical_resource_for(&self, resource_name: &str) -> RestResult<Arc<dyn Resource>> {
		self.get(resource_name)
			.ok_or_else(|| RestError::UnregisteredResource(resource_name.to_string()))
	}

	/// Registered resources, ordered by name.
	pub fn resources(&self) -> impl Iterator<Item = &Arc<dyn Resource>> {
		self.registry.values()
	}

	pub fn len(&self) -> usize {
		self.registry.len()
	}

	pub fn is_empty(&self) -> bool {
		self.registry.is_empty()
	}
}

impl fmt::Debug for Api {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Api")
			.field("api_name", &self.api_name)
			.field("resources", &self.registry.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resource::ModelResource;
	use chocolate_core::{Instance, ModelKey};
	use rstest::rstest;
	use std::collections::BTreeMap;

	#[rstest]
	fn test_register_sets_api_name() {
		// Arrange
		let api = Api::new("v1").with_resource(ModelResource::new(
			"EntryResource",
			ModelKey::new("blog", "entry"),
		));
		let instance = Instance::new(ModelKey::new("blog", "entry"), 1, BTreeMap::new());

		// Act
		let resource = api.canonical_resource_for("entry").unwrap();

		// Assert
		assert_eq!(resource.resource_uri(&instance), "/api/v1/entry/1/");
	}

	#[rstest]
	fn test_unknown_resource() {
		let api = Api::new("v1");
		assert!(api.is_empty());
		assert!(matches!(
			api.canonical_resource_for("entry"),
			Err(RestError::UnregisteredResource(name)) if name == "entry"
		));
	}

	#[rstest]
	fn test_custom_resource_name() {
		let api = Api::new("v1").with_resource(
			ModelResource::new("PostResource", ModelKey::new("blog", "entry"))
				.with_resource_name("posts"),
		);
		assert!(api.get("posts").is_some());
		assert!(api.get("post").is_none());
		assert_eq!(api.len(), 1);
	}
}
