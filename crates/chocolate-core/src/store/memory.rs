//! In-memory [`ModelStore`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{LinkSide, ManyToManyTable, ModelStore};
use crate::error::{StoreError, StoreResult};
use crate::key::ModelKey;
use crate::schema::{FieldKind, ModelDescriptor, SchemaProvider};
use crate::value::{FieldValue, Instance};

// Guards against parent cycles in a malformed schema.
const MAX_INHERITANCE_DEPTH: usize = 64;

#[derive(Debug, Clone)]
struct Row {
	concrete: ModelKey,
	values: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Default)]
struct Table {
	next_id: i64,
	rows: BTreeMap<i64, Row>,
}

#[derive(Debug, Default)]
struct State {
	// Keyed by the root model of each inheritance chain.
	tables: HashMap<ModelKey, Table>,
	links: HashMap<ManyToManyTable, Vec<(i64, i64)>>,
}

/// Process-local store with multi-table inheritance semantics.
///
/// A model and all of its descendants share one primary key sequence. A row
/// saved for a child model is visible through queries on every ancestor,
/// projected onto that ancestor's fields.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use std::sync::Arc;
/// use chocolate_core::ModelKey;
/// use chocolate_core::schema::{FieldDescriptor, ModelDescriptor, Schema, SchemaProvider};
/// use chocolate_core::store::{MemoryStore, ModelStore};
///
/// let schema = Schema::new();
/// let actor = schema.register(
///     ModelDescriptor::new("blog", "Actor").field(FieldDescriptor::char("name", 32)),
/// );
/// let store = MemoryStore::new(Arc::new(schema));
///
/// let saved = store.insert(&actor, BTreeMap::new()).unwrap();
/// assert_eq!(saved.pk(), 1);
/// assert_eq!(store.count(&ModelKey::new("blog", "actor")).unwrap(), 1);
/// ```
pub struct MemoryStore {
	schema: Arc<dyn SchemaProvider>,
	state: Mutex<State>,
}

impl MemoryStore {
	pub fn new(schema: Arc<dyn SchemaProvider>) -> Self {
		Self {
			schema,
			state: Mutex::new(State::default()),
		}
	}

	/// Removes every row and link.
	pub fn clear(&self) {
		let mut state = self.state.lock();
		state.tables.clear();
		state.links.clear();
	}

	/// Inheritance chain of a model, root first.
	fn lineage(&self, key: &ModelKey) -> StoreResult<Vec<Arc<ModelDescriptor>>> {
		let mut chain = Vec::new();
		let mut current = Some(key.clone());
		while let Some(key) = current {
			if chain.len() >= MAX_INHERITANCE_DEPTH {
				return Err(StoreError::Backend(format!(
					"inheritance chain of {} is too deep",
					key
				)));
			}
			let model = self
				.schema
				.model(&key)
				.ok_or_else(|| StoreError::Backend(format!("unknown model {}", key)))?;
			current = model.parent().cloned();
			chain.push(model);
		}
		chain.reverse();
		Ok(chain)
	}

	fn root(&self, key: &ModelKey) -> StoreResult<ModelKey> {
		let lineage = self.lineage(key)?;
		Ok(lineage
			.first()
			.map(|model| model.key().clone())
			.unwrap_or_else(|| key.clone()))
	}

	fn is_a(&self, concrete: &ModelKey, model: &ModelKey) -> StoreResult<bool> {
		Ok(self
			.lineage(concrete)?
			.iter()
			.any(|ancestor| ancestor.key() == model))
	}

	/// Names of the stored (non many-to-many) fields of a model.
	fn column_names(&self, key: &ModelKey) -> StoreResult<Vec<String>> {
		Ok(self
			.lineage(key)?
			.iter()
			.flat_map(|model| model.fields().iter())
			.filter(|field| !field.kind.is_many_to_many())
			.map(|field| field.name.clone())
			.collect())
	}

	fn pk_name(&self, key: &ModelKey) -> StoreResult<String> {
		Ok(self
			.lineage(key)?
			.iter()
			.find_map(|model| model.primary_key().map(|field| field.name.clone()))
			.unwrap_or_else(|| "id".to_string()))
	}

	fn project(&self, model: &ModelKey, pk: i64, row: &Row) -> StoreResult<Instance> {
		let values = self
			.column_names(model)?
			.into_iter()
			.filter_map(|name| row.values.get(&name).map(|value| (name, value.clone())))
			.collect();
		Ok(Instance::new(model.clone(), pk, values))
	}

	/// Foreign keys compare by row identity, so a child instance matches
	/// the same row seen through its parent.
	fn values_match(&self, stored: &FieldValue, wanted: &FieldValue) -> StoreResult<bool> {
		match (stored, wanted) {
			(FieldValue::Instance(stored), FieldValue::Instance(wanted)) => Ok(stored.pk()
				== wanted.pk()
				&& self.root(stored.model())? == self.root(wanted.model())?),
			_ => Ok(stored == wanted),
		}
	}

	fn does_not_exist(model: &ModelKey, pk: i64) -> StoreError {
		StoreError::DoesNotExist {
			model: model.to_string(),
			pk,
		}
	}
}

impl ModelStore for MemoryStore {
	fn insert(
		&self,
		model: &ModelDescriptor,
		mut values: BTreeMap<String, FieldValue>,
	) -> StoreResult<Instance> {
		let lineage = self.lineage(model.key())?;
		let root = self.root(model.key())?;
		let pk_name = self.pk_name(model.key())?;

		let fields: Vec<_> = lineage
			.iter()
			.flat_map(|model| model.fields().iter())
			.filter(|field| !field.kind.is_many_to_many())
			.collect();
		if let Some(unknown) = values
			.keys()
			.find(|name| !fields.iter().any(|field| &field.name == *name))
		{
			return Err(StoreError::UnknownField {
				model: model.key().to_string(),
				field: unknown.clone(),
			});
		}
		for field in &fields {
			if field.kind == FieldKind::AutoField || values.contains_key(&field.name) {
				continue;
			}
			let value = field
				.default
				.as_ref()
				.map(|default| default.resolve())
				.unwrap_or(FieldValue::Null);
			values.insert(field.name.clone(), value);
		}

		let mut state = self.state.lock();
		let table = state.tables.entry(root).or_default();
		let pk = match values.get(&pk_name) {
			Some(FieldValue::Int(pk)) => *pk,
			_ => table.next_id + 1,
		};
		if table.rows.contains_key(&pk) {
			return Err(StoreError::Backend(format!(
				"duplicate primary key {} for {}",
				pk,
				model.key()
			)));
		}
		table.next_id = table.next_id.max(pk);
		values.insert(pk_name, FieldValue::Int(pk));

		let row = Row {
			concrete: model.key().clone(),
			values,
		};
		table.rows.insert(pk, row.clone());
		drop(state);

		self.project(model.key(), pk, &row)
	}

	fn get(&self, model: &ModelKey, pk: i64) -> StoreResult<Instance> {
		let root = self.root(model)?;
		let row = {
			let state = self.state.lock();
			state
				.tables
				.get(&root)
				.and_then(|table| table.rows.get(&pk))
				.cloned()
		};
		match row {
			Some(row) if self.is_a(&row.concrete, model)? => self.project(model, pk, &row),
			_ => Err(Self::does_not_exist(model, pk)),
		}
	}

	fn filter(
		&self,
		model: &ModelKey,
		field: &str,
		value: &FieldValue,
	) -> StoreResult<Vec<Instance>> {
		if !self.column_names(model)?.iter().any(|name| name == field) {
			return Err(StoreError::UnknownField {
				model: model.to_string(),
				field: field.to_string(),
			});
		}
		let mut matches = Vec::new();
		for (pk, row) in self.rows_of(model)? {
			if let Some(stored) = row.values.get(field) {
				if self.values_match(stored, value)? {
					matches.push(self.project(model, pk, &row)?);
				}
			}
		}
		Ok(matches)
	}

	fn all(&self, model: &ModelKey) -> StoreResult<Vec<Instance>> {
		self.rows_of(model)?
			.into_iter()
			.map(|(pk, row)| self.project(model, pk, &row))
			.collect()
	}

	fn update(&self, instance: &Instance, field: &str, value: FieldValue) -> StoreResult<Instance> {
		if !self
			.column_names(instance.model())?
			.iter()
			.any(|name| name == field)
		{
			return Err(StoreError::UnknownField {
				model: instance.model().to_string(),
				field: field.to_string(),
			});
		}
		let root = self.root(instance.model())?;
		let row = {
			let mut state = self.state.lock();
			let row = state
				.tables
				.get_mut(&root)
				.and_then(|table| table.rows.get_mut(&instance.pk()))
				.ok_or_else(|| Self::does_not_exist(instance.model(), instance.pk()))?;
			row.values.insert(field.to_string(), value);
			row.clone()
		};
		self.project(instance.model(), instance.pk(), &row)
	}

	fn link(&self, table: &ManyToManyTable, source: i64, target: i64) -> StoreResult<()> {
		let mut state = self.state.lock();
		let rows = state.links.entry(table.clone()).or_default();
		if !rows.contains(&(source, target)) {
			rows.push((source, target));
		}
		Ok(())
	}

	fn linked(&self, table: &ManyToManyTable, pk: i64, side: LinkSide) -> StoreResult<Vec<i64>> {
		let state = self.state.lock();
		let Some(rows) = state.links.get(table) else {
			return Ok(Vec::new());
		};
		Ok(rows
			.iter()
			.filter_map(|&(source, target)| match side {
				LinkSide::Source if source == pk => Some(target),
				LinkSide::Target if target == pk => Some(source),
				_ => None,
			})
			.collect())
	}
}

impl MemoryStore {
	/// Rows of `model` and its descendants, in primary key order.
	fn rows_of(&self, model: &ModelKey) -> StoreResult<Vec<(i64, Row)>> {
		let root = self.root(model)?;
		let rows: Vec<(i64, Row)> = {
			let state = self.state.lock();
			state
				.tables
				.get(&root)
				.map(|table| {
					table
						.rows
						.iter()
						.map(|(pk, row)| (*pk, row.clone()))
						.collect()
				})
				.unwrap_or_default()
		};
		let mut visible = Vec::with_capacity(rows.len());
		for (pk, row) in rows {
			if self.is_a(&row.concrete, model)? {
				visible.push((pk, row));
			}
		}
		Ok(visible)
	}
}

impl fmt::Debug for MemoryStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		f.debug_struct("MemoryStore")
			.field("tables", &state.tables.len())
			.field("links", &state.links.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{FieldDescriptor, Schema};
	use rstest::{fixture, rstest};

	struct Fixture {
		store: MemoryStore,
		user: Arc<ModelDescriptor>,
		zombie: Arc<ModelDescriptor>,
		entry: Arc<ModelDescriptor>,
	}

	#[fixture]
	fn fixture() -> Fixture {
		let schema = Schema::new();
		let user = schema.register(
			ModelDescriptor::new("auth", "User").field(FieldDescriptor::char("username", 30)),
		);
		let zombie = schema.register(
			ModelDescriptor::new("zombie_blog", "User")
				.inherits(ModelKey::new("auth", "user"))
				.field(FieldDescriptor::integer("brains_eaten").default_value(0)),
		);
		let entry = schema.register(
			ModelDescriptor::new("blog", "Entry")
				.field(FieldDescriptor::text("content"))
				.field(FieldDescriptor::foreign_key(
					"author",
					ModelKey::new("auth", "user"),
				)),
		);
		Fixture {
			store: MemoryStore::new(Arc::new(schema)),
			user,
			zombie,
			entry,
		}
	}

	fn values(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
		pairs
			.iter()
			.map(|(name, value)| (name.to_string(), value.clone()))
			.collect()
	}

	#[rstest]
	fn test_insert_assigns_sequential_ids(fixture: Fixture) {
		// Act
		let first = fixture.store.insert(&fixture.user, BTreeMap::new()).unwrap();
		let second = fixture.store.insert(&fixture.user, BTreeMap::new()).unwrap();

		// Assert
		assert_eq!(first.pk(), 1);
		assert_eq!(second.pk(), 2);
		assert_eq!(second.get("id"), Some(&FieldValue::Int(2)));
		assert_eq!(first.get("username"), Some(&FieldValue::Null));
	}

	#[rstest]
	fn test_child_rows_visible_through_parent(fixture: Fixture) {
		// Arrange
		let user_key = fixture.user.key().clone();
		let zombie_key = fixture.zombie.key().clone();
		fixture.store.insert(&fixture.user, BTreeMap::new()).unwrap();

		// Act
		let zombie = fixture
			.store
			.insert(&fixture.zombie, values(&[("username", "brainz".into())]))
			.unwrap();

		// Assert
		assert_eq!(zombie.pk(), 2);
		assert_eq!(zombie.get("brains_eaten"), Some(&FieldValue::Int(0)));
		assert_eq!(fixture.store.count(&user_key).unwrap(), 2);
		assert_eq!(fixture.store.count(&zombie_key).unwrap(), 1);
		let as_user = fixture.store.get(&user_key, 2).unwrap();
		assert_eq!(as_user.get("username"), Some(&FieldValue::from("brainz")));
		assert!(as_user.get("brains_eaten").is_none());
		assert!(fixture.store.get(&zombie_key, 1).is_err());
	}

	#[rstest]
	fn test_filter_matches_foreign_key_by_row(fixture: Fixture) {
		// Arrange
		let zombie = fixture.store.insert(&fixture.zombie, BTreeMap::new()).unwrap();
		let entry = fixture
			.store
			.insert(&fixture.entry, values(&[("author", zombie.clone().into())]))
			.unwrap();
		let as_user = fixture.store.get(fixture.user.key(), zombie.pk()).unwrap();

		// Act
		let found = fixture
			.store
			.filter(fixture.entry.key(), "author", &as_user.into())
			.unwrap();

		// Assert
		assert_eq!(found, vec![entry]);
	}

	#[rstest]
	fn test_unknown_field_is_rejected(fixture: Fixture) {
		let result = fixture
			.store
			.insert(&fixture.user, values(&[("brains_eaten", 3.into())]));
		assert!(matches!(result, Err(StoreError::UnknownField { .. })));

		let result = fixture
			.store
			.filter(fixture.user.key(), "nope", &FieldValue::Null);
		assert!(matches!(result, Err(StoreError::UnknownField { .. })));
	}

	#[rstest]
	fn test_explicit_primary_key(fixture: Fixture) {
		let saved = fixture
			.store
			.insert(&fixture.user, values(&[("id", 10.into())]))
			.unwrap();
		let next = fixture.store.insert(&fixture.user, BTreeMap::new()).unwrap();
		let duplicate = fixture
			.store
			.insert(&fixture.user, values(&[("id", 10.into())]));

		assert_eq!(saved.pk(), 10);
		assert_eq!(next.pk(), 11);
		assert!(matches!(duplicate, Err(StoreError::Backend(_))));
	}

	#[rstest]
	fn test_update_sets_field(fixture: Fixture) {
		let user = fixture.store.insert(&fixture.user, BTreeMap::new()).unwrap();
		let updated = fixture
			.store
			.update(&user, "username", "homer".into())
			.unwrap();
		assert_eq!(updated.get("username"), Some(&FieldValue::from("homer")));
		assert_eq!(
			fixture
				.store
				.get(fixture.user.key(), user.pk())
				.unwrap()
				.get("username"),
			Some(&FieldValue::from("homer"))
		);
	}

	#[rstest]
	fn test_links_are_deduplicated(fixture: Fixture) {
		let table = ManyToManyTable::new(ModelKey::new("blog", "movie"), "actors");
		fixture.store.link(&table, 1, 7).unwrap();
		fixture.store.link(&table, 1, 7).unwrap();
		fixture.store.link(&table, 2, 7).unwrap();

		assert_eq!(fixture.store.linked(&table, 1, LinkSide::Source).unwrap(), vec![7]);
		assert_eq!(
			fixture.store.linked(&table, 7, LinkSide::Target).unwrap(),
			vec![1, 2]
		);
	}

	#[rstest]
	fn test_clear(fixture: Fixture) {
		fixture.store.insert(&fixture.user, BTreeMap::new()).unwrap();
		fixture.store.clear();
		assert_eq!(fixture.store.count(fixture.user.key()).unwrap(), 0);
	}
}
