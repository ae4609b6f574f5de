//! Per-model mockups.
//!
//! A [`ModelMockup`] decides, once at registration, how each field of its
//! model gets a value: a related instance, the declared default, a value
//! generator, or nothing for auto primary keys. Creating an instance runs the
//! optional [`MockupSeeder`], fills the remaining fields and saves the result.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::data::MockupData;
use crate::error::{MockupError, MockupResult, StoreError};
use crate::factory::{Lookup, ModelFactory};
use crate::generators::ValueGenerator;
use crate::key::ModelKey;
use crate::schema::{FieldDefault, FieldDescriptor, FieldKind, ModelDescriptor};
use crate::value::{FieldValue, Instance, Overrides};

/// Hook run on a fresh data set before automatic generation.
///
/// Values set here win over generated ones; values forced by the caller win
/// over both (see [`MockupData::set`]).
///
/// # Examples
///
/// ```
/// use chocolate_core::{MockupData, MockupResult};
///
/// fn juan(data: &mut MockupData<'_>) -> MockupResult<()> {
///     data.set("first_name", "Juan");
///     Ok(())
/// }
/// # let _: &dyn chocolate_core::MockupSeeder = &juan;
/// ```
pub trait MockupSeeder: Send + Sync {
	fn mockup_data(&self, data: &mut MockupData<'_>) -> MockupResult<()>;
}

impl<F> MockupSeeder for F
where
	F: Fn(&mut MockupData<'_>) -> MockupResult<()> + Send + Sync,
{
	fn mockup_data(&self, data: &mut MockupData<'_>) -> MockupResult<()> {
		self(data)
	}
}

#[derive(Clone)]
enum Strategy {
	Related(ModelKey),
	Default(FieldDefault),
	Generate(Arc<dyn ValueGenerator>),
	AutoPrimaryKey,
	Missing,
}

#[derive(Clone)]
struct FieldPlan {
	/// Model declaring the field; uniqueness is checked against its rows.
	owner: ModelKey,
	field: FieldDescriptor,
	strategy: Strategy,
}

impl FieldPlan {
	fn strategy_name(&self) -> &'static str {
		match self.strategy {
			Strategy::Related(_) => "related",
			Strategy::Default(_) => "default",
			Strategy::Generate(_) => "generate",
			Strategy::AutoPrimaryKey => "auto",
			Strategy::Missing => "missing",
		}
	}
}

/// Mockup for one model.
pub struct ModelMockup {
	key: ModelKey,
	model: Arc<ModelDescriptor>,
	plans: Vec<FieldPlan>,
	seeder: Option<Arc<dyn MockupSeeder>>,
}

impl ModelMockup {
	pub(crate) fn new(
		factory: &ModelFactory,
		model: Arc<ModelDescriptor>,
		seeder: Option<Arc<dyn MockupSeeder>>,
	) -> MockupResult<Self> {
		let plans = factory
			.classifier()
			.concrete_fields(model.key())?
			.into_iter()
			.filter(|(_, field)| !field.kind.is_many_to_many())
			.map(|(owner, field)| {
				let strategy = match (&field.kind, &field.default) {
					(FieldKind::ForeignKey { to, .. }, _) => Strategy::Related(to.clone()),
					(_, Some(default)) => Strategy::Default(default.clone()),
					_ if field.is_auto_primary_key() => Strategy::AutoPrimaryKey,
					_ => factory
						.generators()
						.for_field(&field)
						.map(Strategy::Generate)
						.unwrap_or(Strategy::Missing),
				};
				FieldPlan {
					owner,
					field,
					strategy,
				}
			})
			.collect();

		Ok(Self {
			key: model.key().clone(),
			model,
			plans,
			seeder,
		})
	}

	pub fn key(&self) -> &ModelKey {
		&self.key
	}

	pub fn model(&self) -> &Arc<ModelDescriptor> {
		&self.model
	}

	pub fn has_seeder(&self) -> bool {
		self.seeder.is_some()
	}

	/// Produces a value for one field of the model.
	///
	/// Returns `Ok(None)` when the field gets no value: an auto primary key,
	/// or a default that is null. Foreign keys create the related instance.
	pub fn generate_value(
		&self,
		factory: &ModelFactory,
		field: &str,
	) -> MockupResult<Option<FieldValue>> {
		let plan = self
			.plans
			.iter()
			.find(|plan| plan.field.name == field)
			.ok_or_else(|| StoreError::UnknownField {
				model: self.key.to_string(),
				field: field.to_string(),
			})?;
		self.value_for(factory, plan)
	}

	/// Generates a value for `field` and sets it on the data set.
	///
	/// Forced fields are left untouched.
	pub fn generate_into(
		&self,
		factory: &ModelFactory,
		data: &mut MockupData<'_>,
		field: &str,
	) -> MockupResult<()> {
		if data.is_forced(field) {
			return Ok(());
		}
		if let Some(value) = self.generate_value(factory, field)? {
			data.set(field, value);
		}
		Ok(())
	}

	fn value_for(&self, factory: &ModelFactory, plan: &FieldPlan) -> MockupResult<Option<FieldValue>> {
		let name = &plan.field.name;
		trace!(model = %self.key, field = %name, strategy = plan.strategy_name(), "generating value");
		let value = match &plan.strategy {
			Strategy::Related(to) => {
				let related = factory.get(Lookup::Model(to))?.create(Overrides::new())?;
				FieldValue::from(related)
			}
			Strategy::Default(default) => default.resolve(),
			Strategy::Generate(generator) => self.generate_unique(factory, plan, generator.as_ref())?,
			Strategy::AutoPrimaryKey => return Ok(None),
			Strategy::Missing => {
				return Err(MockupError::MissingGenerator {
					model: self.model.name().to_string(),
					field: name.clone(),
					kind: plan.field.kind.type_name().to_string(),
				});
			}
		};
		Ok((!value.is_null()).then_some(value))
	}

	fn generate_unique(
		&self,
		factory: &ModelFactory,
		plan: &FieldPlan,
		generator: &dyn ValueGenerator,
	) -> MockupResult<FieldValue> {
		if !plan.field.unique {
			return Ok(generator.generate());
		}

		let attempts = factory.config().max_unique_attempts;
		for attempt in 1..=attempts {
			let value = generator.generate();
			if value.is_null() || !factory.store().exists(&plan.owner, &plan.field.name, &value)? {
				return Ok(value);
			}
			trace!(
				model = %self.key,
				field = %plan.field.name,
				attempt,
				"generated value already taken, retrying"
			);
		}
		Err(MockupError::UniqueExhausted {
			model: self.model.name().to_string(),
			field: plan.field.name.clone(),
			attempts,
		})
	}

	/// Runs the seeder and fills every field that still has no value.
	pub fn build_data_set<'f>(
		&self,
		factory: &'f ModelFactory,
		overrides: Overrides,
	) -> MockupResult<MockupData<'f>> {
		let mut data = MockupData::new(factory, overrides);
		if let Some(seeder) = &self.seeder {
			seeder.mockup_data(&mut data)?;
		}

		for plan in &self.plans {
			if data.contains(&plan.field.name) {
				continue;
			}
			if let Some(value) = self.value_for(factory, plan)? {
				data.set(plan.field.name.clone(), value);
			}
		}
		Ok(data)
	}

	/// Builds a data set and saves it as a new instance.
	pub fn create(&self, factory: &ModelFactory, overrides: Overrides) -> MockupResult<Instance> {
		let _guard = DepthGuard::enter(&self.key, factory.config().max_depth)?;
		let data = self.build_data_set(factory, overrides)?;
		let instance = data.materialize(&self.model)?;
		debug!(model = %self.key, pk = instance.pk(), "created mockup instance");
		Ok(instance)
	}

	pub fn create_batch(
		&self,
		factory: &ModelFactory,
		count: usize,
		overrides: Overrides,
	) -> MockupResult<Vec<Instance>> {
		(0..count)
			.map(|_| self.create(factory, overrides.clone()))
			.collect()
	}
}

impl fmt::Debug for ModelMockup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelMockup")
			.field("key", &self.key)
			.field(
				"plans",
				&self
					.plans
					.iter()
					.map(|plan| (plan.field.name.as_str(), plan.strategy_name()))
					.collect::<Vec<_>>(),
			)
			.field("seeder", &self.seeder.is_some())
			.finish()
	}
}

thread_local! {
	static CREATION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Tracks nested `create` calls on the current thread.
struct DepthGuard;

impl DepthGuard {
	fn enter(model: &ModelKey, max_depth: usize) -> MockupResult<Self> {
		CREATION_DEPTH.with(|depth| {
			if depth.get() >= max_depth {
				return Err(MockupError::RecursionLimit {
					model: model.to_string(),
					depth: max_depth,
				});
			}
			depth.set(depth.get() + 1);
			Ok(DepthGuard)
		})
	}
}

impl Drop for DepthGuard {
	fn drop(&mut self) {
		CREATION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::Schema;
	use crate::store::MemoryStore;
	use rstest::rstest;

	fn factory(schema: Schema) -> ModelFactory {
		let schema = Arc::new(schema);
		let store = Arc::new(MemoryStore::new(schema.clone()));
		ModelFactory::new(schema, store)
	}

	#[rstest]
	fn test_strategies_resolved_at_registration() {
		// Arrange
		let factory = factory(Schema::new().with_model(
			ModelDescriptor::new("blog", "Movie")
				.field(FieldDescriptor::char("name", 32).unique())
				.field(FieldDescriptor::integer("score").default_value(0))
				.field(FieldDescriptor::new(
					"color",
					FieldKind::Custom("ColorField".into()),
				)),
		));

		// Act
		let mockup = ModelMockup::new(
			&factory,
			factory.schema().model(&ModelKey::new("blog", "movie")).unwrap(),
			None,
		)
		.unwrap();

		// Assert
		let strategies: Vec<_> = mockup
			.plans
			.iter()
			.map(|plan| (plan.field.name.as_str(), plan.strategy_name()))
			.collect();
		assert_eq!(
			strategies,
			vec![
				("id", "auto"),
				("name", "generate"),
				("score", "default"),
				("color", "missing"),
			]
		);
	}

	#[rstest]
	fn test_null_default_is_not_a_value() {
		let factory = factory(Schema::new().with_model(
			ModelDescriptor::new("blog", "Note")
				.field(FieldDescriptor::integer("rating").null().default_value(FieldValue::Null)),
		));
		let key = ModelKey::new("blog", "note");
		factory.register(&key).unwrap();
		let mockup = factory.get(&key).unwrap();

		let value = mockup.mockup().generate_value(&factory, "rating").unwrap();
		let data = mockup.build_data_set(Overrides::new()).unwrap();

		assert_eq!(value, None);
		assert!(!data.contains("rating"));
	}

	#[rstest]
	fn test_generate_value_unknown_field() {
		let factory = factory(Schema::new().with_model(ModelDescriptor::new("blog", "Note")));
		let key = ModelKey::new("blog", "note");
		let mockup = factory.get(&key).unwrap();

		let result = mockup.mockup().generate_value(&factory, "missing");

		assert!(matches!(
			result,
			Err(MockupError::Store(StoreError::UnknownField { .. }))
		));
	}

	#[rstest]
	fn test_depth_guard_unwinds() {
		let key = ModelKey::new("blog", "entry");
		{
			let _outer = DepthGuard::enter(&key, 2).unwrap();
			let _inner = DepthGuard::enter(&key, 2).unwrap();
			assert!(matches!(
				DepthGuard::enter(&key, 2),
				Err(MockupError::RecursionLimit { depth: 2, .. })
			));
		}
		assert!(DepthGuard::enter(&key, 1).is_ok());
	}
}
