//! Resource factory: GET and POST payload mockups.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chocolate_core::schema::FieldDescriptor;
use chocolate_core::{FieldValue, Instance, Lookup, MockupError, ModelFactory, Overrides};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::api::Api;
use crate::error::{RestError, RestResult};
use crate::resource::{
	Bundle, Resource, ResourceField, ResourceFieldKind, resource_key, serialize_map,
};

/// Mockup of one resource.
pub struct ResourceMockup {
	resource: Arc<dyn Resource>,
}

impl ResourceMockup {
	pub fn new(resource: Arc<dyn Resource>) -> Self {
		Self { resource }
	}

	pub fn resource(&self) -> &Arc<dyn Resource> {
		&self.resource
	}
}

/// Registry of resource mockups for an [`Api`].
///
/// Each resource's backing model is registered with the model factory unless
/// it already is, so custom model mockups keep applying.
pub struct ResourceFactory {
	api: Arc<Api>,
	models: Arc<ModelFactory>,
	mockups: RwLock<BTreeMap<String, Arc<ResourceMockup>>>,
}

impl ResourceFactory {
	pub fn new(api: Arc<Api>, models: Arc<ModelFactory>) -> RestResult<Self> {
		let factory = Self {
			api,
			models,
			mockups: RwLock::new(BTreeMap::new()),
		};
		for resource in factory.api.resources() {
			if !factory.models.is_registered(resource.model()) {
				factory.models.register(resource.model())?;
			}
			factory.register(Arc::clone(resource));
		}
		Ok(factory)
	}

	/// Registration key for a resource name or type name.
	pub fn key(name: &str) -> String {
		resource_key(name)
	}

	/// Registers a resource under its resource name.
	pub fn register(&self, resource: Arc<dyn Resource>) {
		let key = Self::key(resource.resource_name());
		debug!(resource = %key, model = %resource.model(), "registered resource mockup");
		self.mockups
			.write()
			.insert(key, Arc::new(ResourceMockup::new(resource)));
	}

	pub fn get(&self, name: &str) -> RestResult<ResourceMockupRef<'_>> {
		let key = Self::key(name);
		let mockup = self
			.mockups
			.read()
			.get(&key)
			.cloned()
			.ok_or(RestError::UnregisteredResource(key))?;
		Ok(ResourceMockupRef {
			factory: self,
			mockup,
		})
	}

	pub fn keys(&self) -> Vec<String> {
		self.mockups.read().keys().cloned().collect()
	}

	pub fn api(&self) -> &Api {
		&self.api
	}

	pub fn model_factory(&self) -> &ModelFactory {
		&self.models
	}
}

impl fmt::Debug for ResourceFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResourceFactory")
			.field("api", &self.api.api_name())
			.field("mockups", &self.keys())
			.finish()
	}
}

/// A resolved resource mockup, borrowed from its factory.
pub struct ResourceMockupRef<'f> {
	factory: &'f ResourceFactory,
	mockup: Arc<ResourceMockup>,
}

impl<'f> ResourceMockupRef<'f> {
	pub fn resource(&self) -> &Arc<dyn Resource> {
		self.mockup.resource()
	}

	/// Creates a saved instance of the backing model and returns its locator.
	pub fn create(&self, overrides: Overrides) -> RestResult<(String, Instance)> {
		let resource = self.resource();
		let instance = self
			.factory
			.models
			.create(Lookup::Model(resource.model()), overrides)?;
		Ok((resource.resource_uri(&instance), instance))
	}

	/// Payload a GET of a freshly created object would return.
	///
	/// To-many fields list the locators of the related objects.
	pub fn create_get_data(&self, overrides: Overrides) -> RestResult<Map<String, Value>> {
		let bundle = self.dehydrated(overrides)?;
		let json = self.resource().serialize(&bundle, "application/json")?;
		match serde_json::from_str::<Value>(&json)? {
			Value::Object(map) => Ok(map),
			_ => Err(RestError::InvalidPayload(json)),
		}
	}

	/// [`create_get_data`](Self::create_get_data) encoded in `format`.
	pub fn create_get_data_as(&self, format: &str, overrides: Overrides) -> RestResult<String> {
		let bundle = self.dehydrated(overrides)?;
		self.resource().serialize(&bundle, format)
	}

	/// Payload that would create a new object through a POST.
	///
	/// Read-only fields and the `id` and `resource_uri` fields are left out.
	/// Foreign keys become the locator of a related object: the forced
	/// instance when one of the right model is given, otherwise a newly
	/// created one. Other fields take the forced value, or a value generated
	/// for the model attribute they read, or for the field's own kind.
	/// Fields that end up null are left out. No instance of the resource's
	/// own model is saved.
	pub fn create_post_data(&self, overrides: Overrides) -> RestResult<Map<String, Value>> {
		let mut output = Map::new();
		for field in self.resource().fields() {
			if field.excluded_from_post() {
				continue;
			}
			if let Some(value) = self.post_value(field, &overrides)? {
				output.insert(field.name.clone(), value);
			}
		}
		Ok(output)
	}

	/// [`create_post_data`](Self::create_post_data) encoded in `format`.
	pub fn create_post_data_as(&self, format: &str, overrides: Overrides) -> RestResult<String> {
		serialize_map(&self.create_post_data(overrides)?, format)
	}

	fn dehydrated(&self, overrides: Overrides) -> RestResult<Bundle> {
		let (_, instance) = self.create(overrides)?;
		let resource = self.resource();
		let mut bundle = resource.build_bundle(instance);
		for field in resource.fields() {
			let ResourceFieldKind::ToMany { .. } = &field.kind else {
				continue;
			};
			let accessor = field.attribute.as_deref().unwrap_or(&field.name);
			let related = self.factory.models.related(&bundle.obj, accessor)?.all()?;
			bundle = bundle.with_related(accessor, related);
		}
		resource.full_dehydrate(bundle)
	}

	fn post_value(&self, field: &ResourceField, overrides: &Overrides) -> RestResult<Option<Value>> {
		let models = &self.factory.models;
		match &field.kind {
			ResourceFieldKind::ForeignKey { to } => {
				let related = self.factory.api.canonical_resource_for(to)?;
				let forced = overrides
					.get(&field.name)
					.and_then(FieldValue::as_instance)
					.filter(|instance| {
						models
							.classifier()
							.is_instance_of(instance.model(), related.model())
					});
				let obj = match forced {
					Some(instance) => instance.clone(),
					None => models.create(Lookup::Model(related.model()), Overrides::new())?,
				};
				Ok(Some(Value::String(related.resource_uri(&obj))))
			}
			ResourceFieldKind::ToMany { .. } => {
				warn!(field = %field.name, "to-many resource fields are not mocked up in post data");
				Ok(None)
			}
			kind => {
				let value = if let Some(forced) = overrides.get(&field.name) {
					Some(forced.clone())
				} else if let Some(attribute) = &field.attribute {
					let mockup = models.get(Lookup::Model(self.resource().model()))?;
					match mockup.mockup().generate_value(models, attribute) {
						Ok(value) => value,
						Err(MockupError::MissingGenerator { kind: model_kind, .. }) => {
							warn!(field = %field.name, kind = %model_kind, "no generator for resource field, skipping");
							return Ok(None);
						}
						Err(err) => return Err(err.into()),
					}
				} else {
					let Some(generator) = kind.model_kind().and_then(|model_kind| {
						models
							.generators()
							.for_field(&FieldDescriptor::new(&field.name, model_kind))
					}) else {
						warn!(field = %field.name, kind = ?kind, "no generator for resource field, skipping");
						return Ok(None);
					};
					Some(generator.generate())
				};
				Ok(value.filter(|value| !value.is_null()).map(Value::from))
			}
		}
	}
}

impl fmt::Debug for ResourceMockupRef<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResourceMockupRef")
			.field("resource", &self.resource().resource_name())
			.finish()
	}
}
