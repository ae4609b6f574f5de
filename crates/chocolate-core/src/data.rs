//! Mockup data sets.

use std::collections::BTreeMap;
use std::collections::btree_map;

use tracing::debug;

use crate::classifier::Relation;
use crate::error::{MockupError, MockupResult};
use crate::factory::{Lookup, ModelFactory};
use crate::related::RelatedManager;
use crate::schema::ModelDescriptor;
use crate::value::{FieldValue, Instance, Overrides};

/// Field values collected for one instance before it is saved.
///
/// Caller-forced values are copied in first and are never replaced by
/// [`set`](Self::set) or [`set_related`](Self::set_related). Plain map
/// operations ([`insert`](Self::insert), [`remove`](Self::remove),
/// [`merge`](Self::merge)) ignore that protection.
pub struct MockupData<'f> {
	factory: &'f ModelFactory,
	forced: Overrides,
	data: BTreeMap<String, FieldValue>,
}

impl<'f> MockupData<'f> {
	pub fn new(factory: &'f ModelFactory, forced: Overrides) -> Self {
		let data = forced
			.iter()
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect();
		Self {
			factory,
			forced,
			data,
		}
	}

	pub fn factory(&self) -> &'f ModelFactory {
		self.factory
	}

	/// Values forced by the caller of `create`.
	pub fn forced(&self) -> &Overrides {
		&self.forced
	}

	pub fn is_forced(&self, name: &str) -> bool {
		self.forced.contains(name)
	}

	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.data.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.data.contains_key(name)
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		self.data.insert(name.into(), value.into());
	}

	pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
		self.data.remove(name)
	}

	/// Copies every pair into the data set.
	pub fn merge<I, K, V>(&mut self, values: I)
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<FieldValue>,
	{
		for (name, value) in values {
			self.insert(name, value);
		}
	}

	/// Sets a value unless the caller forced this field.
	///
	/// An explicit [`FieldValue::Null`] is stored as such.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		let name = name.into();
		if self.is_forced(&name) {
			return;
		}
		self.data.insert(name, value.into());
	}

	/// Creates one instance of the looked-up model and sets it, unless the
	/// caller forced this field.
	pub fn set_related<'a>(
		&mut self,
		name: impl Into<String>,
		lookup: impl Into<Lookup<'a>>,
	) -> MockupResult<()> {
		let name = name.into();
		if self.is_forced(&name) {
			return Ok(());
		}
		let related = self.factory.get(lookup)?.create(Overrides::new())?;
		self.data.insert(name, FieldValue::from(related));
		Ok(())
	}

	pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
		self.data.iter()
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Saves an instance of `model` from this data set.
	///
	/// Regular fields are saved with the row. To-many values are then
	/// resolved and linked: a count creates that many related instances
	/// (already pointing at the new row for reverse foreign keys), an
	/// instance or a list of instances is linked as is, and null is skipped.
	/// Keys naming no field of the model are ignored.
	pub fn materialize(&self, model: &ModelDescriptor) -> MockupResult<Instance> {
		let factory = self.factory;
		let sets = factory.classifier().classify(model.key())?;

		let regular = sets
			.regular
			.iter()
			.filter_map(|name| self.data.get(name).map(|value| (name.clone(), value.clone())))
			.collect();
		let instance = factory.store().insert(model, regular)?;

		for to_many in &sets.to_many {
			let Some(value) = self.data.get(&to_many.accessor) else {
				continue;
			};
			let targets = match value {
				FieldValue::Null => continue,
				FieldValue::Int(count) if *count < 0 => {
					return Err(MockupError::InvalidRelationValue {
						field: to_many.accessor.clone(),
						reason: format!("negative count {}", count),
					});
				}
				FieldValue::Int(count) => {
					let related = factory.get(Lookup::Model(to_many.relation.related_model()))?;
					match &to_many.relation {
						Relation::ReverseForeignKey { field, .. } => {
							let overrides = Overrides::new().with(field.clone(), &instance);
							related.create_batch(*count as usize, overrides)?;
							debug!(
								model = %model.key(),
								accessor = %to_many.accessor,
								count,
								"created reverse related instances"
							);
							continue;
						}
						Relation::ManyToMany { .. } => {
							related.create_batch(*count as usize, Overrides::new())?
						}
					}
				}
				FieldValue::Instance(related) => vec![related.as_ref().clone()],
				FieldValue::Instances(related) => related.clone(),
				other => {
					return Err(MockupError::InvalidRelationValue {
						field: to_many.accessor.clone(),
						reason: format!(
							"expected a count, an instance or a list of instances, got {}",
							other.kind()
						),
					});
				}
			};
			RelatedManager::new(factory, instance.clone(), to_many.clone()).add(&targets)?;
		}

		Ok(instance)
	}
}

impl std::fmt::Debug for MockupData<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MockupData")
			.field("forced", &self.forced)
			.field("data", &self.data)
			.finish()
	}
}
