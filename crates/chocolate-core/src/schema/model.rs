//! Model descriptors.

use super::field::FieldDescriptor;
use crate::key::ModelKey;

/// Introspected schema of one model type.
///
/// A model without a parent gets an auto-incrementing `id` primary key.
/// A model created with [`inherits`](ModelDescriptor::inherits) drops it and
/// shares the parent's primary key, the way multi-table inheritance does.
///
/// # Examples
///
/// ```
/// use chocolate_core::ModelKey;
/// use chocolate_core::schema::{FieldDescriptor, ModelDescriptor};
///
/// let entry = ModelDescriptor::new("blog", "Entry")
///     .field(FieldDescriptor::text("content"))
///     .field(FieldDescriptor::foreign_key("author", ModelKey::new("auth", "user")));
///
/// assert_eq!(entry.key().to_string(), "blog.entry");
/// assert_eq!(entry.fields().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
	key: ModelKey,
	name: String,
	parent: Option<ModelKey>,
	fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
	pub fn new(app_label: impl AsRef<str>, name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			key: ModelKey::new(app_label, &name),
			name,
			parent: None,
			fields: vec![FieldDescriptor::auto("id")],
		}
	}

	/// Declares a concrete parent model.
	pub fn inherits(mut self, parent: ModelKey) -> Self {
		self.fields.retain(|field| !field.is_auto_primary_key());
		self.parent = Some(parent);
		self
	}

	/// Appends a field. Declaration order is preserved.
	pub fn field(mut self, field: FieldDescriptor) -> Self {
		self.fields.push(field);
		self
	}

	pub fn key(&self) -> &ModelKey {
		&self.key
	}

	/// Declared (class) name, with its original casing.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn parent(&self) -> Option<&ModelKey> {
		self.parent.as_ref()
	}

	/// Locally declared fields, without inherited ones.
	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}

	pub fn local_field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.name == name)
	}

	pub fn primary_key(&self) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.primary_key)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_new_model_has_auto_id() {
		let model = ModelDescriptor::new("blog", "Actor");
		let pk = model.primary_key().expect("auto primary key");
		assert_eq!(pk.name, "id");
		assert!(pk.is_auto_primary_key());
	}

	#[rstest]
	fn test_child_model_drops_auto_id() {
		let child = ModelDescriptor::new("zombie_blog", "User")
			.inherits(ModelKey::new("auth", "user"))
			.field(FieldDescriptor::integer("brains_eaten").default_value(0));

		assert!(child.primary_key().is_none());
		assert_eq!(child.parent(), Some(&ModelKey::new("auth", "user")));
		assert_eq!(child.fields().len(), 1);
	}

	#[rstest]
	fn test_name_keeps_casing() {
		let model = ModelDescriptor::new("zombie_blog", "GutturalComment");
		assert_eq!(model.name(), "GutturalComment");
		assert_eq!(model.key().model_name(), "gutturalcomment");
	}
}
