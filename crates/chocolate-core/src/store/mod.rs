//! Persistence interface.
//!
//! The engine saves instances and links relations only through
//! [`ModelStore`]. [`MemoryStore`] keeps everything in process memory.

mod memory;

pub use memory::MemoryStore;

use std::collections::BTreeMap;

use crate::error::StoreResult;
use crate::key::ModelKey;
use crate::schema::ModelDescriptor;
use crate::value::{FieldValue, Instance};

/// Join table of a many-to-many field without a custom through model.
///
/// Identified by the model declaring the field and the field name. The
/// declaring model's rows are the source side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManyToManyTable {
	pub owner: ModelKey,
	pub field: String,
}

impl ManyToManyTable {
	pub fn new(owner: ModelKey, field: impl Into<String>) -> Self {
		Self {
			owner,
			field: field.into(),
		}
	}
}

/// Side of a many-to-many link a primary key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkSide {
	/// The model declaring the field.
	Source,
	/// The model the field points at.
	Target,
}

/// Storage backend for mockup instances.
pub trait ModelStore: Send + Sync {
	/// Saves a new row and returns its snapshot.
	///
	/// Fields absent from `values` take their declared default, or null.
	fn insert(
		&self,
		model: &ModelDescriptor,
		values: BTreeMap<String, FieldValue>,
	) -> StoreResult<Instance>;

	fn get(&self, model: &ModelKey, pk: i64) -> StoreResult<Instance>;

	/// Rows of `model` (including rows of its child models) whose field
	/// equals `value`.
	fn filter(&self, model: &ModelKey, field: &str, value: &FieldValue)
	-> StoreResult<Vec<Instance>>;

	fn all(&self, model: &ModelKey) -> StoreResult<Vec<Instance>>;

	fn count(&self, model: &ModelKey) -> StoreResult<usize> {
		Ok(self.all(model)?.len())
	}

	/// Sets one field of a saved row.
	fn update(&self, instance: &Instance, field: &str, value: FieldValue) -> StoreResult<Instance>;

	/// Adds a row to a join table. Linking twice is a no-op.
	fn link(&self, table: &ManyToManyTable, source: i64, target: i64) -> StoreResult<()>;

	/// Primary keys linked to `pk`, which sits on `side` of the table.
	fn linked(&self, table: &ManyToManyTable, pk: i64, side: LinkSide) -> StoreResult<Vec<i64>>;

	fn exists(&self, model: &ModelKey, field: &str, value: &FieldValue) -> StoreResult<bool> {
		Ok(!self.filter(model, field, value)?.is_empty())
	}
}
