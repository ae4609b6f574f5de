//! Field classification.
//!
//! Splits the fields reachable from a model into regular fields (scalars and
//! forward foreign keys, saved with the row) and to-many fields (forward
//! many-to-many fields plus reverse accessors of relations pointing at the
//! model), which can only be filled once the row exists.

use std::sync::Arc;

use crate::error::{MockupError, MockupResult};
use crate::key::ModelKey;
use crate::schema::{FieldDescriptor, FieldKind, ModelDescriptor, SchemaProvider};
use crate::store::{LinkSide, ManyToManyTable};

// Guards against parent cycles in a malformed schema.
const MAX_INHERITANCE_DEPTH: usize = 64;

/// How a to-many accessor reaches its related rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
	/// Rows of `related` whose foreign key `field` points at the owner.
	ReverseForeignKey { related: ModelKey, field: String },
	/// Rows of `related` linked through a join table or a through model.
	ManyToMany {
		related: ModelKey,
		table: ManyToManyTable,
		/// Side of the join the owner sits on.
		side: LinkSide,
		through: Option<ModelKey>,
	},
}

impl Relation {
	pub fn related_model(&self) -> &ModelKey {
		match self {
			Relation::ReverseForeignKey { related, .. } | Relation::ManyToMany { related, .. } => {
				related
			}
		}
	}
}

/// A to-many accessor of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToManyField {
	pub accessor: String,
	pub relation: Relation,
}

/// Result of [`FieldClassifier::classify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSets {
	pub to_many: Vec<ToManyField>,
	pub regular: Vec<String>,
}

impl FieldSets {
	pub fn to_many_field(&self, accessor: &str) -> Option<&ToManyField> {
		self.to_many.iter().find(|field| field.accessor == accessor)
	}
}

/// Reads model structure from a [`SchemaProvider`].
///
/// # Examples
///
/// ```
/// use chocolate_core::ModelKey;
/// use chocolate_core::classifier::FieldClassifier;
/// use chocolate_core::schema::{FieldDescriptor, ModelDescriptor, Schema};
///
/// let schema = Schema::new()
///     .with_model(ModelDescriptor::new("blog", "Entry").field(FieldDescriptor::text("content")))
///     .with_model(
///         ModelDescriptor::new("blog", "Comment")
///             .field(FieldDescriptor::foreign_key("post", ModelKey::new("blog", "entry")).related_name("comments")),
///     );
///
/// let sets = FieldClassifier::new(&schema).classify(&ModelKey::new("blog", "entry")).unwrap();
/// assert_eq!(sets.regular, vec!["id", "content"]);
/// assert_eq!(sets.to_many[0].accessor, "comments");
/// ```
pub struct FieldClassifier<'a> {
	schema: &'a dyn SchemaProvider,
}

impl<'a> FieldClassifier<'a> {
	pub fn new(schema: &'a dyn SchemaProvider) -> Self {
		Self { schema }
	}

	pub fn model(&self, key: &ModelKey) -> MockupResult<Arc<ModelDescriptor>> {
		self.schema
			.model(key)
			.ok_or_else(|| MockupError::UnknownModel(key.to_string()))
	}

	/// The model and its ancestors, root first.
	pub fn lineage(&self, key: &ModelKey) -> MockupResult<Vec<Arc<ModelDescriptor>>> {
		let mut chain = Vec::new();
		let mut current = Some(key.clone());
		while let Some(key) = current {
			if chain.len() >= MAX_INHERITANCE_DEPTH {
				return Err(MockupError::UnknownModel(format!(
					"{} (inheritance cycle)",
					key
				)));
			}
			let model = self.model(&key)?;
			current = model.parent().cloned();
			chain.push(model);
		}
		chain.reverse();
		Ok(chain)
	}

	/// Every field of the model, inherited fields first, paired with the
	/// model declaring it.
	pub fn concrete_fields(&self, key: &ModelKey) -> MockupResult<Vec<(ModelKey, FieldDescriptor)>> {
		Ok(self
			.lineage(key)?
			.iter()
			.flat_map(|model| {
				model
					.fields()
					.iter()
					.map(|field| (model.key().clone(), field.clone()))
			})
			.collect())
	}

	/// Whether `model` is `ancestor` or inherits from it.
	pub fn is_instance_of(&self, model: &ModelKey, ancestor: &ModelKey) -> bool {
		self.lineage(model)
			.map(|chain| chain.iter().any(|model| model.key() == ancestor))
			.unwrap_or(false)
	}

	pub fn classify(&self, key: &ModelKey) -> MockupResult<FieldSets> {
		let lineage = self.lineage(key)?;
		let mut sets = FieldSets::default();

		for model in &lineage {
			for field in model.fields() {
				match &field.kind {
					FieldKind::ManyToMany { to, through, .. } => sets.to_many.push(ToManyField {
						accessor: field.name.clone(),
						relation: Relation::ManyToMany {
							related: to.clone(),
							table: ManyToManyTable::new(model.key().clone(), &field.name),
							side: LinkSide::Source,
							through: through.clone(),
						},
					}),
					_ => sets.regular.push(field.name.clone()),
				}
			}
		}

		for declaring in self.schema.models() {
			for field in declaring.fields() {
				let Some(target) = field.kind.related_model() else {
					continue;
				};
				if !lineage.iter().any(|model| model.key() == target) {
					continue;
				}
				let relation = match &field.kind {
					FieldKind::ForeignKey { related_name, .. } => related_name
						.accessor(declaring.key())
						.map(|accessor| (accessor, Relation::ReverseForeignKey {
							related: declaring.key().clone(),
							field: field.name.clone(),
						})),
					FieldKind::ManyToMany {
						related_name,
						through,
						..
					} => related_name.accessor(declaring.key()).map(|accessor| {
						(accessor, Relation::ManyToMany {
							related: declaring.key().clone(),
							table: ManyToManyTable::new(declaring.key().clone(), &field.name),
							side: LinkSide::Target,
							through: through.clone(),
						})
					}),
					_ => None,
				};
				if let Some((accessor, relation)) = relation {
					sets.to_many.push(ToManyField { accessor, relation });
				}
			}
		}

		Ok(sets)
	}

	/// Looks up one to-many accessor of a model.
	pub fn to_many(&self, key: &ModelKey, accessor: &str) -> MockupResult<ToManyField> {
		self.classify(key)?
			.to_many_field(accessor)
			.cloned()
			.ok_or_else(|| MockupError::UnknownRelation {
				model: key.to_string(),
				accessor: accessor.to_string(),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::Schema;
	use rstest::{fixture, rstest};

	#[fixture]
	fn schema() -> Schema {
		let user = ModelKey::new("auth", "user");
		let entry = ModelKey::new("blog", "entry");
		let actor = ModelKey::new("blog", "actor");
		Schema::new()
			.with_model(ModelDescriptor::new("auth", "User").field(FieldDescriptor::char("username", 30)))
			.with_model(
				ModelDescriptor::new("blog", "Entry")
					.field(FieldDescriptor::text("content"))
					.field(FieldDescriptor::foreign_key("author", user.clone())),
			)
			.with_model(
				ModelDescriptor::new("blog", "Comment")
					.field(FieldDescriptor::foreign_key("post", entry).related_name("comments"))
					.field(FieldDescriptor::text("content")),
			)
			.with_model(ModelDescriptor::new("blog", "Actor").field(FieldDescriptor::char("name", 32)))
			.with_model(
				ModelDescriptor::new("blog", "Movie")
					.field(FieldDescriptor::many_to_many("actors", actor).related_name("movies")),
			)
			.with_model(
				ModelDescriptor::new("blog", "Badge")
					.field(FieldDescriptor::foreign_key("owner", user.clone()).hide_related()),
			)
			.with_model(
				ModelDescriptor::new("zombie_blog", "User")
					.inherits(user)
					.field(FieldDescriptor::integer("brains_eaten")),
			)
	}

	fn accessors(sets: &FieldSets) -> Vec<&str> {
		sets.to_many.iter().map(|field| field.accessor.as_str()).collect()
	}

	#[rstest]
	fn test_reverse_foreign_key(schema: Schema) {
		// Act
		let sets = FieldClassifier::new(&schema)
			.classify(&ModelKey::new("blog", "entry"))
			.unwrap();

		// Assert
		assert_eq!(sets.regular, vec!["id", "content", "author"]);
		assert_eq!(
			sets.to_many,
			vec![ToManyField {
				accessor: "comments".into(),
				relation: Relation::ReverseForeignKey {
					related: ModelKey::new("blog", "comment"),
					field: "post".into(),
				},
			}]
		);
	}

	#[rstest]
	#[case("movie", "actors", LinkSide::Source)]
	#[case("actor", "movies", LinkSide::Target)]
	fn test_many_to_many_both_sides(
		schema: Schema,
		#[case] model: &str,
		#[case] accessor: &str,
		#[case] side: LinkSide,
	) {
		let field = FieldClassifier::new(&schema)
			.to_many(&ModelKey::new("blog", model), accessor)
			.unwrap();

		match field.relation {
			Relation::ManyToMany {
				table,
				side: found,
				through,
				..
			} => {
				assert_eq!(table, ManyToManyTable::new(ModelKey::new("blog", "movie"), "actors"));
				assert_eq!(found, side);
				assert_eq!(through, None);
			}
			other => panic!("unexpected relation {:?}", other),
		}
	}

	#[rstest]
	fn test_hidden_reverse_accessor_is_skipped(schema: Schema) {
		let sets = FieldClassifier::new(&schema)
			.classify(&ModelKey::new("auth", "user"))
			.unwrap();

		assert_eq!(accessors(&sets), vec!["entry_set"]);
	}

	#[rstest]
	fn test_child_inherits_fields_and_reverse_accessors(schema: Schema) {
		let classifier = FieldClassifier::new(&schema);
		let zombie = ModelKey::new("zombie_blog", "user");

		let sets = classifier.classify(&zombie).unwrap();

		assert_eq!(sets.regular, vec!["id", "username", "brains_eaten"]);
		assert_eq!(accessors(&sets), vec!["entry_set"]);
		assert!(classifier.is_instance_of(&zombie, &ModelKey::new("auth", "user")));
		assert!(!classifier.is_instance_of(&ModelKey::new("auth", "user"), &zombie));
	}

	#[rstest]
	fn test_unknown_relation(schema: Schema) {
		let result = FieldClassifier::new(&schema).to_many(&ModelKey::new("blog", "entry"), "tags");
		assert!(matches!(result, Err(MockupError::UnknownRelation { .. })));
	}

	#[rstest]
	fn test_unknown_model(schema: Schema) {
		let result = FieldClassifier::new(&schema).classify(&ModelKey::new("blog", "smarttag"));
		assert!(matches!(result, Err(MockupError::UnknownModel(_))));
	}
}
