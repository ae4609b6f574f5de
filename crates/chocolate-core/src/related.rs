//! Managers for to-many accessors.

use tracing::debug;

use crate::classifier::{Relation, ToManyField};
use crate::error::{MockupError, MockupResult};
use crate::factory::{Lookup, ModelFactory};
use crate::key::ModelKey;
use crate::schema::FieldKind;
use crate::store::LinkSide;
use crate::value::{FieldValue, Instance, Overrides};

/// Adds and lists the instances behind one to-many accessor of a saved
/// instance.
///
/// Reverse foreign keys are updated in place. Many-to-many links go through
/// the custom through model when the relation has one, and through the
/// store's join table otherwise.
pub struct RelatedManager<'f> {
	factory: &'f ModelFactory,
	owner: Instance,
	field: ToManyField,
}

impl<'f> RelatedManager<'f> {
	pub fn new(factory: &'f ModelFactory, owner: Instance, field: ToManyField) -> Self {
		Self {
			factory,
			owner,
			field,
		}
	}

	pub fn accessor(&self) -> &str {
		&self.field.accessor
	}

	pub fn related_model(&self) -> &ModelKey {
		self.field.relation.related_model()
	}

	pub fn add(&self, related: &[Instance]) -> MockupResult<()> {
		for value in related {
			self.check_model(value)?;
			match &self.field.relation {
				Relation::ReverseForeignKey { field, .. } => {
					self.factory
						.store()
						.update(value, field, FieldValue::from(&self.owner))?;
				}
				Relation::ManyToMany {
					through: Some(through),
					..
				} => {
					self.create_through_row(through, value)?;
				}
				Relation::ManyToMany {
					table,
					side,
					through: None,
					..
				} => {
					let (source, target) = match side {
						LinkSide::Source => (self.owner.pk(), value.pk()),
						LinkSide::Target => (value.pk(), self.owner.pk()),
					};
					self.factory.store().link(table, source, target)?;
				}
			}
		}
		debug!(
			model = %self.owner.model(),
			pk = self.owner.pk(),
			accessor = %self.field.accessor,
			count = related.len(),
			"linked related instances"
		);
		Ok(())
	}

	pub fn all(&self) -> MockupResult<Vec<Instance>> {
		let store = self.factory.store();
		match &self.field.relation {
			Relation::ReverseForeignKey { related, field } => {
				Ok(store.filter(related, field, &FieldValue::from(&self.owner))?)
			}
			Relation::ManyToMany {
				related,
				through: Some(through),
				..
			} => {
				let (owner_fk, related_fk) = self.through_fields(through)?;
				store
					.filter(through, &owner_fk, &FieldValue::from(&self.owner))?
					.iter()
					.filter_map(|row| row.related(&related_fk).map(Instance::pk))
					.map(|pk| store.get(related, pk).map_err(MockupError::from))
					.collect()
			}
			Relation::ManyToMany {
				related,
				table,
				side,
				through: None,
			} => store
				.linked(table, self.owner.pk(), *side)?
				.into_iter()
				.map(|pk| store.get(related, pk).map_err(MockupError::from))
				.collect(),
		}
	}

	pub fn count(&self) -> MockupResult<usize> {
		Ok(self.all()?.len())
	}

	fn check_model(&self, value: &Instance) -> MockupResult<()> {
		if self
			.factory
			.classifier()
			.is_instance_of(value.model(), self.related_model())
		{
			Ok(())
		} else {
			Err(MockupError::InvalidRelationValue {
				field: self.field.accessor.clone(),
				reason: format!(
					"expected {} instance, got {}",
					self.related_model(),
					value.model()
				),
			})
		}
	}

	/// Saves one through-model row joining the owner and `value`.
	///
	/// Each foreign key of the through model takes the owner or the value,
	/// whichever it accepts, the owner first.
	fn create_through_row(&self, through: &ModelKey, value: &Instance) -> MockupResult<()> {
		let classifier = self.factory.classifier();
		let mut overrides = Overrides::new();
		let mut owner_used = false;
		for (_, field) in classifier.concrete_fields(through)? {
			let FieldKind::ForeignKey { to, .. } = &field.kind else {
				continue;
			};
			if !owner_used && classifier.is_instance_of(self.owner.model(), to) {
				overrides.insert(field.name.clone(), &self.owner);
				owner_used = true;
			} else if classifier.is_instance_of(value.model(), to) {
				overrides.insert(field.name.clone(), value);
			}
		}
		self.factory.get(Lookup::Model(through))?.create(overrides)?;
		Ok(())
	}

	/// Foreign keys of a through model pointing at the owner and at the
	/// related model.
	fn through_fields(&self, through: &ModelKey) -> MockupResult<(String, String)> {
		let classifier = self.factory.classifier();
		let mut owner_fk = None;
		let mut related_fk = None;
		for (_, field) in classifier.concrete_fields(through)? {
			let FieldKind::ForeignKey { to, .. } = &field.kind else {
				continue;
			};
			if owner_fk.is_none() && classifier.is_instance_of(self.owner.model(), to) {
				owner_fk = Some(field.name.clone());
			} else if related_fk.is_none()
				&& classifier.is_instance_of(self.related_model(), to)
			{
				related_fk = Some(field.name.clone());
			}
		}
		owner_fk
			.zip(related_fk)
			.ok_or_else(|| MockupError::UnknownRelation {
				model: through.to_string(),
				accessor: self.field.accessor.clone(),
			})
	}
}
