//! Model factory: mockup registration and lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::classifier::FieldClassifier;
use crate::config::FactoryConfig;
use crate::data::MockupData;
use crate::error::{MockupError, MockupResult};
use crate::generators::GeneratorRegistry;
use crate::key::ModelKey;
use crate::mockup::{MockupSeeder, ModelMockup};
use crate::related::RelatedManager;
use crate::schema::{ModelDescriptor, SchemaProvider};
use crate::store::ModelStore;
use crate::value::{Instance, Overrides};

/// What a mockup is looked up by.
///
/// Strings are registration keys: `"app.model"` matches exactly, a bare
/// `"model"` matches by model name across applications. Model keys and
/// instances name a concrete model and register it on first use.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
	Name(&'a str),
	Model(&'a ModelKey),
	Instance(&'a Instance),
}

impl<'a> From<&'a str> for Lookup<'a> {
	fn from(name: &'a str) -> Self {
		Lookup::Name(name)
	}
}

impl<'a> From<&'a String> for Lookup<'a> {
	fn from(name: &'a String) -> Self {
		Lookup::Name(name)
	}
}

impl<'a> From<&'a ModelKey> for Lookup<'a> {
	fn from(key: &'a ModelKey) -> Self {
		Lookup::Model(key)
	}
}

impl<'a> From<&'a Instance> for Lookup<'a> {
	fn from(instance: &'a Instance) -> Self {
		Lookup::Instance(instance)
	}
}

/// Registry of model mockups bound to a schema and a store.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use chocolate_core::{ModelFactory, ModelKey, overrides};
/// use chocolate_core::schema::{FieldDescriptor, ModelDescriptor, Schema};
/// use chocolate_core::store::MemoryStore;
///
/// let schema = Arc::new(Schema::new().with_model(
///     ModelDescriptor::new("blog", "Actor").field(FieldDescriptor::char("name", 32)),
/// ));
/// let store = Arc::new(MemoryStore::new(schema.clone()));
/// let factory = ModelFactory::new(schema, store);
/// factory.register(&ModelKey::new("blog", "actor")).unwrap();
///
/// let actor = factory.create("actor", overrides! { "name" => "Homer" }).unwrap();
/// assert_eq!(actor.get("name").and_then(|v| v.as_str()), Some("Homer"));
/// ```
pub struct ModelFactory {
	schema: Arc<dyn SchemaProvider>,
	store: Arc<dyn ModelStore>,
	generators: GeneratorRegistry,
	config: FactoryConfig,
	mockups: RwLock<BTreeMap<ModelKey, Arc<ModelMockup>>>,
}

impl ModelFactory {
	pub fn new(schema: Arc<dyn SchemaProvider>, store: Arc<dyn ModelStore>) -> Self {
		Self {
			schema,
			store,
			generators: GeneratorRegistry::new(),
			config: FactoryConfig::default(),
			mockups: RwLock::new(BTreeMap::new()),
		}
	}

	pub fn with_config(mut self, config: FactoryConfig) -> Self {
		self.config = config;
		self
	}

	/// Replaces the generator registry. Applies to mockups registered afterwards.
	pub fn with_generators(mut self, generators: GeneratorRegistry) -> Self {
		self.generators = generators;
		self
	}

	/// Registers the default mockup for a model, replacing any previous one.
	pub fn register(&self, key: &ModelKey) -> MockupResult<()> {
		self.install(key, None)
	}

	/// Registers a mockup with a custom seeder, replacing any previous one.
	pub fn register_with<S>(&self, key: &ModelKey, seeder: S) -> MockupResult<()>
	where
		S: MockupSeeder + 'static,
	{
		self.install(key, Some(Arc::new(seeder)))
	}

	fn install(&self, key: &ModelKey, seeder: Option<Arc<dyn MockupSeeder>>) -> MockupResult<()> {
		let model = self
			.schema
			.model(key)
			.ok_or_else(|| MockupError::UnknownModel(key.to_string()))?;
		let custom = seeder.is_some();
		let mockup = ModelMockup::new(self, model, seeder)?;
		self.mockups.write().insert(key.clone(), Arc::new(mockup));
		debug!(model = %key, custom, "registered mockup");
		Ok(())
	}

	pub fn is_registered(&self, key: &ModelKey) -> bool {
		self.mockups.read().contains_key(key)
	}

	pub fn registered_keys(&self) -> Vec<ModelKey> {
		self.mockups.read().keys().cloned().collect()
	}

	/// Resolves a lookup to its mockup.
	pub fn get<'a>(&self, lookup: impl Into<Lookup<'a>>) -> MockupResult<MockupRef<'_>> {
		let mockup = match lookup.into() {
			Lookup::Name(name) => self.find_by_name(name)?,
			Lookup::Model(key) => self.find_or_register(key)?,
			Lookup::Instance(instance) => self.find_or_register(instance.model())?,
		};
		Ok(MockupRef {
			factory: self,
			mockup,
		})
	}

	/// Shorthand for `get(lookup)?.create(overrides)`.
	pub fn create<'a>(
		&self,
		lookup: impl Into<Lookup<'a>>,
		overrides: Overrides,
	) -> MockupResult<Instance> {
		self.get(lookup)?.create(overrides)
	}

	/// Manager for a to-many accessor of a saved instance.
	pub fn related(&self, instance: &Instance, accessor: &str) -> MockupResult<RelatedManager<'_>> {
		let field = self.classifier().to_many(instance.model(), accessor)?;
		Ok(RelatedManager::new(self, instance.clone(), field))
	}

	pub fn schema(&self) -> &dyn SchemaProvider {
		self.schema.as_ref()
	}

	pub fn store(&self) -> &dyn ModelStore {
		self.store.as_ref()
	}

	pub fn generators(&self) -> &GeneratorRegistry {
		&self.generators
	}

	pub fn config(&self) -> &FactoryConfig {
		&self.config
	}

	pub fn classifier(&self) -> FieldClassifier<'_> {
		FieldClassifier::new(self.schema.as_ref())
	}

	fn find_by_name(&self, name: &str) -> MockupResult<Arc<ModelMockup>> {
		let mockups = self.mockups.read();
		if let Some(key) = ModelKey::parse(name) {
			return mockups
				.get(&key)
				.cloned()
				.ok_or_else(|| MockupError::NotRegistered(key.to_string()));
		}

		let mut matches = mockups.iter().filter(|(key, _)| key.matches_name(name));
		match (matches.next(), matches.next()) {
			(None, _) => Err(MockupError::NotRegistered(name.to_lowercase())),
			(Some((_, mockup)), None) => Ok(Arc::clone(mockup)),
			(Some(_), Some(_)) => Err(MockupError::AmbiguousKey {
				key: name.to_lowercase(),
				candidates: mockups
					.keys()
					.filter(|key| key.matches_name(name))
					.map(ToString::to_string)
					.collect(),
			}),
		}
	}

	fn find_or_register(&self, key: &ModelKey) -> MockupResult<Arc<ModelMockup>> {
		if let Some(mockup) = self.mockups.read().get(key).cloned() {
			return Ok(mockup);
		}
		self.register(key)?;
		self.mockups
			.read()
			.get(key)
			.cloned()
			.ok_or_else(|| MockupError::NotRegistered(key.to_string()))
	}
}

impl fmt::Debug for ModelFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelFactory")
			.field("mockups", &self.registered_keys())
			.field("config", &self.config)
			.finish()
	}
}

/// A resolved mockup, borrowed from its factory.
#[derive(Clone)]
pub struct MockupRef<'f> {
	factory: &'f ModelFactory,
	mockup: Arc<ModelMockup>,
}

impl<'f> MockupRef<'f> {
	pub fn key(&self) -> &ModelKey {
		self.mockup.key()
	}

	pub fn model(&self) -> &Arc<ModelDescriptor> {
		self.mockup.model()
	}

	pub fn mockup(&self) -> &ModelMockup {
		&self.mockup
	}

	/// Builds the data set for one instance without saving anything but the
	/// related objects it needs.
	pub fn build_data_set(&self, overrides: Overrides) -> MockupResult<MockupData<'f>> {
		self.mockup.build_data_set(self.factory, overrides)
	}

	/// Creates and saves one instance.
	pub fn create(&self, overrides: Overrides) -> MockupResult<Instance> {
		self.mockup.create(self.factory, overrides)
	}

	/// Creates `count` instances sharing the same overrides.
	pub fn create_batch(&self, count: usize, overrides: Overrides) -> MockupResult<Vec<Instance>> {
		self.mockup.create_batch(self.factory, count, overrides)
	}
}

impl fmt::Debug for MockupRef<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MockupRef")
			.field("key", self.key())
			.finish()
	}
}
