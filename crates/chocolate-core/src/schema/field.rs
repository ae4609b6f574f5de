//! Field descriptors.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::key::ModelKey;
use crate::value::FieldValue;

/// Name of the reverse accessor a relation exposes on its target model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RelatedName {
	/// `<model_name>_set`, derived from the declaring model.
	#[default]
	Default,
	Named(String),
	/// The relation cannot be reached from the target side.
	Hidden,
}

impl RelatedName {
	/// Resolves the accessor name for a relation declared on `declaring`.
	pub fn accessor(&self, declaring: &ModelKey) -> Option<String> {
		match self {
			RelatedName::Default => Some(format!("{}_set", declaring.model_name())),
			RelatedName::Named(name) => Some(name.clone()),
			RelatedName::Hidden => None,
		}
	}
}

/// Semantic type tag of a model field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
	AutoField,
	Boolean,
	NullBoolean,
	Char {
		max_length: usize,
	},
	Text,
	Email,
	Url,
	Slug,
	IpAddress,
	Integer,
	BigInteger,
	SmallInteger,
	PositiveInteger,
	PositiveSmallInteger,
	Float,
	Decimal {
		max_digits: u32,
		decimal_places: u32,
	},
	Date,
	DateTime,
	Time,
	FilePath {
		roots: Vec<PathBuf>,
	},
	Uuid,
	ForeignKey {
		to: ModelKey,
		related_name: RelatedName,
	},
	ManyToMany {
		to: ModelKey,
		related_name: RelatedName,
		through: Option<ModelKey>,
	},
	/// A field type the engine knows only by name.
	Custom(String),
}

impl FieldKind {
	/// Type name used to look up value generators.
	pub fn type_name(&self) -> &str {
		match self {
			FieldKind::AutoField => "AutoField",
			FieldKind::Boolean => "BooleanField",
			FieldKind::NullBoolean => "NullBooleanField",
			FieldKind::Char { .. } => "CharField",
			FieldKind::Text => "TextField",
			FieldKind::Email => "EmailField",
			FieldKind::Url => "URLField",
			FieldKind::Slug => "SlugField",
			FieldKind::IpAddress => "IPAddressField",
			FieldKind::Integer => "IntegerField",
			FieldKind::BigInteger => "BigIntegerField",
			FieldKind::SmallInteger => "SmallIntegerField",
			FieldKind::PositiveInteger => "PositiveIntegerField",
			FieldKind::PositiveSmallInteger => "PositiveSmallIntegerField",
			FieldKind::Float => "FloatField",
			FieldKind::Decimal { .. } => "DecimalField",
			FieldKind::Date => "DateField",
			FieldKind::DateTime => "DateTimeField",
			FieldKind::Time => "TimeField",
			FieldKind::FilePath { .. } => "FilePathField",
			FieldKind::Uuid => "UUIDField",
			FieldKind::ForeignKey { .. } => "ForeignKey",
			FieldKind::ManyToMany { .. } => "ManyToManyField",
			FieldKind::Custom(name) => name,
		}
	}

	pub fn is_many_to_many(&self) -> bool {
		matches!(self, FieldKind::ManyToMany { .. })
	}

	/// Target model of a relation field.
	pub fn related_model(&self) -> Option<&ModelKey> {
		match self {
			FieldKind::ForeignKey { to, .. } | FieldKind::ManyToMany { to, .. } => Some(to),
			_ => None,
		}
	}
}

/// Default declared on a field: a constant or a callable evaluated per use.
#[derive(Clone)]
pub enum FieldDefault {
	Value(FieldValue),
	Callable(Arc<dyn Fn() -> FieldValue + Send + Sync>),
}

impl FieldDefault {
	pub fn resolve(&self) -> FieldValue {
		match self {
			FieldDefault::Value(value) => value.clone(),
			FieldDefault::Callable(f) => f(),
		}
	}
}

impl fmt::Debug for FieldDefault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
			FieldDefault::Callable(_) => f.write_str("Callable(..)"),
		}
	}
}

/// Metadata for one declared model field.
///
/// # Examples
///
/// ```
/// use chocolate_core::schema::{FieldDescriptor, FieldKind};
///
/// let name = FieldDescriptor::char("name", 32).unique();
/// assert_eq!(name.kind, FieldKind::Char { max_length: 32 });
/// assert!(name.unique);
/// ```
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
	pub name: String,
	pub kind: FieldKind,
	pub null: bool,
	pub unique: bool,
	pub primary_key: bool,
	pub default: Option<FieldDefault>,
}

impl FieldDescriptor {
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			null: false,
			unique: false,
			primary_key: false,
			default: None,
		}
	}

	/// Auto-incrementing primary key.
	pub fn auto(name: impl Into<String>) -> Self {
		let mut field = Self::new(name, FieldKind::AutoField);
		field.primary_key = true;
		field.unique = true;
		field
	}

	pub fn char(name: impl Into<String>, max_length: usize) -> Self {
		Self::new(name, FieldKind::Char { max_length })
	}

	pub fn text(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Text)
	}

	pub fn integer(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Integer)
	}

	pub fn boolean(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Boolean)
	}

	pub fn date(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Date)
	}

	pub fn datetime(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::DateTime)
	}

	pub fn decimal(name: impl Into<String>, max_digits: u32, decimal_places: u32) -> Self {
		Self::new(
			name,
			FieldKind::Decimal {
				max_digits,
				decimal_places,
			},
		)
	}

	pub fn foreign_key(name: impl Into<String>, to: ModelKey) -> Self {
		Self::new(
			name,
			FieldKind::ForeignKey {
				to,
				related_name: RelatedName::Default,
			},
		)
	}

	pub fn many_to_many(name: impl Into<String>, to: ModelKey) -> Self {
		Self::new(
			name,
			FieldKind::ManyToMany {
				to,
				related_name: RelatedName::Default,
				through: None,
			},
		)
	}

	pub fn null(mut self) -> Self {
		self.null = true;
		self
	}

	pub fn unique(mut self) -> Self {
		self.unique = true;
		self
	}

	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self.unique = true;
		self
	}

	pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
		self.default = Some(FieldDefault::Value(value.into()));
		self
	}

	pub fn default_with<F>(mut self, f: F) -> Self
	where
		F: Fn() -> FieldValue + Send + Sync + 'static,
	{
		self.default = Some(FieldDefault::Callable(Arc::new(f)));
		self
	}

	/// Sets the reverse accessor name of a relation field.
	///
	/// Has no effect on scalar fields.
	pub fn related_name(mut self, name: impl Into<String>) -> Self {
		self.set_related_name(RelatedName::Named(name.into()));
		self
	}

	/// Removes the reverse accessor of a relation field.
	pub fn hide_related(mut self) -> Self {
		self.set_related_name(RelatedName::Hidden);
		self
	}

	/// Routes a many-to-many relation through an explicit join model.
	pub fn through(mut self, model: ModelKey) -> Self {
		if let FieldKind::ManyToMany { through, .. } = &mut self.kind {
			*through = Some(model);
		}
		self
	}

	fn set_related_name(&mut self, name: RelatedName) {
		match &mut self.kind {
			FieldKind::ForeignKey { related_name, .. } | FieldKind::ManyToMany { related_name, .. } => {
				*related_name = name;
			}
			_ => {}
		}
	}

	pub fn is_auto_primary_key(&self) -> bool {
		self.primary_key && self.kind == FieldKind::AutoField
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_related_name_accessor() {
		let comment = ModelKey::new("blog", "Comment");

		assert_eq!(
			RelatedName::Default.accessor(&comment).as_deref(),
			Some("comment_set")
		);
		assert_eq!(
			RelatedName::Named("comments".into())
				.accessor(&comment)
				.as_deref(),
			Some("comments")
		);
		assert_eq!(RelatedName::Hidden.accessor(&comment), None);
	}

	#[rstest]
	fn test_relation_builders() {
		let field = FieldDescriptor::many_to_many("members", ModelKey::new("blog", "person"))
			.related_name("groups")
			.through(ModelKey::new("blog", "membership"));

		match field.kind {
			FieldKind::ManyToMany {
				related_name,
				through,
				..
			} => {
				assert_eq!(related_name, RelatedName::Named("groups".into()));
				assert_eq!(through, Some(ModelKey::new("blog", "membership")));
			}
			other => panic!("unexpected kind {:?}", other),
		}
	}

	#[rstest]
	fn test_related_name_ignored_on_scalar() {
		let field = FieldDescriptor::text("content").related_name("ignored");
		assert_eq!(field.kind, FieldKind::Text);
	}

	#[rstest]
	fn test_callable_default_is_evaluated_each_time() {
		use std::sync::atomic::{AtomicI64, Ordering};
		let counter = Arc::new(AtomicI64::new(0));
		let shared = counter.clone();
		let field = FieldDescriptor::integer("seq")
			.default_with(move || FieldValue::Int(shared.fetch_add(1, Ordering::SeqCst)));

		let default = field.default.expect("default set");
		assert_eq!(default.resolve(), FieldValue::Int(0));
		assert_eq!(default.resolve(), FieldValue::Int(1));
	}

	#[rstest]
	#[case(FieldKind::Char { max_length: 3 }, "CharField")]
	#[case(FieldKind::Custom("ColorField".into()), "ColorField")]
	#[case(FieldKind::Url, "URLField")]
	fn test_type_name(#[case] kind: FieldKind, #[case] expected: &str) {
		assert_eq!(kind.type_name(), expected);
	}
}
