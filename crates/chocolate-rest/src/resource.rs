//! REST resources over models.
//!
//! A [`Resource`] exposes one model through a set of [`ResourceField`]s and
//! turns instances into response payloads. [`ModelResource`] is the
//! conventional implementation: its fields mirror the model's scalar fields,
//! plus the `id` and `resource_uri` fields every resource carries.

use std::collections::BTreeMap;

use chocolate_core::schema::{FieldKind, SchemaProvider};
use chocolate_core::{FieldClassifier, FieldValue, Instance, ModelKey};
use serde_json::{Map, Value};

use crate::error::{RestError, RestResult};

/// Field names that only exist once an object has been saved.
pub const ID_FIELD: &str = "id";
pub const RESOURCE_URI_FIELD: &str = "resource_uri";

/// Semantic type tag of a resource field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceFieldKind {
	Boolean,
	Date,
	DateTime,
	Integer,
	Float,
	Time,
	Char,
	Decimal,
	/// Link to another resource, by resource name.
	ForeignKey { to: String },
	/// Collection of links to another resource.
	ToMany { to: String },
	/// A field type known only by name.
	Custom(String),
}

impl ResourceFieldKind {
	/// Resource field kind mirroring a model field kind, if any.
	pub fn from_model_kind(kind: &FieldKind) -> Option<Self> {
		let kind = match kind {
			FieldKind::AutoField
			| FieldKind::Integer
			| FieldKind::BigInteger
			| FieldKind::SmallInteger
			| FieldKind::PositiveInteger
			| FieldKind::PositiveSmallInteger => ResourceFieldKind::Integer,
			FieldKind::Boolean | FieldKind::NullBoolean => ResourceFieldKind::Boolean,
			FieldKind::Char { .. }
			| FieldKind::Text
			| FieldKind::Email
			| FieldKind::Url
			| FieldKind::Slug
			| FieldKind::IpAddress
			| FieldKind::FilePath { .. }
			| FieldKind::Uuid => ResourceFieldKind::Char,
			FieldKind::Float => ResourceFieldKind::Float,
			FieldKind::Decimal { .. } => ResourceFieldKind::Decimal,
			FieldKind::Date => ResourceFieldKind::Date,
			FieldKind::DateTime => ResourceFieldKind::DateTime,
			FieldKind::Time => ResourceFieldKind::Time,
			FieldKind::ForeignKey { .. } | FieldKind::ManyToMany { .. } => return None,
			FieldKind::Custom(name) => ResourceFieldKind::Custom(name.clone()),
		};
		Some(kind)
	}

	/// Model field kind used to generate values for this resource kind.
	pub fn model_kind(&self) -> Option<FieldKind> {
		let kind = match self {
			ResourceFieldKind::Boolean => FieldKind::Boolean,
			ResourceFieldKind::Date => FieldKind::Date,
			ResourceFieldKind::DateTime => FieldKind::DateTime,
			ResourceFieldKind::Integer => FieldKind::Integer,
			ResourceFieldKind::Float => FieldKind::Float,
			ResourceFieldKind::Time => FieldKind::Time,
			ResourceFieldKind::Char => FieldKind::Char { max_length: 255 },
			ResourceFieldKind::Decimal => FieldKind::Decimal {
				max_digits: 10,
				decimal_places: 2,
			},
			ResourceFieldKind::Custom(name) => FieldKind::Custom(name.clone()),
			ResourceFieldKind::ForeignKey { .. } | ResourceFieldKind::ToMany { .. } => return None,
		};
		Some(kind)
	}
}

/// One field of a resource.
///
/// # Examples
///
/// ```
/// use chocolate_rest::resource::{ResourceField, ResourceFieldKind};
///
/// let entry = ResourceField::foreign_key("entry", "entry").attribute("post");
/// assert_eq!(entry.attribute.as_deref(), Some("post"));
/// assert!(!entry.readonly);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceField {
	pub name: String,
	pub kind: ResourceFieldKind,
	/// Model attribute the field reads from.
	pub attribute: Option<String>,
	pub readonly: bool,
}

impl ResourceField {
	pub fn new(name: impl Into<String>, kind: ResourceFieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			attribute: None,
			readonly: false,
		}
	}

	pub fn char(name: impl Into<String>) -> Self {
		Self::new(name, ResourceFieldKind::Char)
	}

	pub fn integer(name: impl Into<String>) -> Self {
		Self::new(name, ResourceFieldKind::Integer)
	}

	pub fn foreign_key(name: impl Into<String>, to: impl Into<String>) -> Self {
		Self::new(name, ResourceFieldKind::ForeignKey { to: to.into() })
	}

	pub fn to_many(name: impl Into<String>, to: impl Into<String>) -> Self {
		Self::new(name, ResourceFieldKind::ToMany { to: to.into() })
	}

	pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
		self.attribute = Some(attribute.into());
		self
	}

	pub fn readonly(mut self) -> Self {
		self.readonly = true;
		self
	}

	/// Whether post payloads leave this field out.
	pub fn excluded_from_post(&self) -> bool {
		self.readonly || self.name == ID_FIELD || self.name == RESOURCE_URI_FIELD
	}
}

/// An object paired with its dehydrated payload.
#[derive(Debug, Clone)]
pub struct Bundle {
	pub obj: Instance,
	pub data: Map<String, Value>,
	/// Objects behind the to-many accessors of `obj`, keyed by accessor.
	pub related: BTreeMap<String, Vec<Instance>>,
}

impl Bundle {
	pub fn new(obj: Instance) -> Self {
		Self {
			obj,
			data: Map::new(),
			related: BTreeMap::new(),
		}
	}

	pub fn with_related(mut self, accessor: impl Into<String>, related: Vec<Instance>) -> Self {
		self.related.insert(accessor.into(), related);
		self
	}
}

/// A REST resource exposing one model.
pub trait Resource: Send + Sync {
	/// Name used in locators and as the registration key.
	fn resource_name(&self) -> &str;

	/// Declared type name, such as `EntryResource`.
	fn type_name(&self) -> &str;

	/// Model backing the resource.
	fn model(&self) -> &ModelKey;

	fn fields(&self) -> &[ResourceField];

	/// Called when the resource joins an [`Api`](crate::api::Api).
	fn set_api_name(&mut self, _api_name: &str) {}

	/// Locator of another resource's object within the same API.
	fn uri_for(&self, resource_name: &str, pk: i64) -> String;

	/// Locator of one object.
	fn resource_uri(&self, instance: &Instance) -> String {
		self.uri_for(self.resource_name(), instance.pk())
	}

	fn build_bundle(&self, obj: Instance) -> Bundle {
		Bundle::new(obj)
	}

	/// Fills the bundle's payload from its object.
	fn full_dehydrate(&self, bundle: Bundle) -> RestResult<Bundle>;

	/// Encodes the bundle's payload.
	///
	/// `application/json` is always supported; `application/x-yaml` and
	/// `text/yaml` need the `yaml` feature.
	fn serialize(&self, bundle: &Bundle, format: &str) -> RestResult<String> {
		serialize_map(&bundle.data, format)
	}
}

/// Encodes a payload map in a supported format.
pub fn serialize_map(data: &Map<String, Value>, format: &str) -> RestResult<String> {
	match format {
		"application/json" => Ok(serde_json::to_string(data)?),
		#[cfg(feature = "yaml")]
		"application/x-yaml" | "text/yaml" => Ok(serde_yaml::to_string(data)?),
		other => Err(RestError::UnsupportedFormat(other.to_string())),
	}
}

/// Resource name derived from a type name: lowercase, `resource` suffix removed.
///
/// # Examples
///
/// ```
/// use chocolate_rest::resource::resource_key;
///
/// assert_eq!(resource_key("EntryResource"), "entry");
/// assert_eq!(resource_key("comment"), "comment");
/// ```
pub fn resource_key(type_name: &str) -> String {
	let key = type_name.to_lowercase();
	match key.strip_suffix("resource") {
		Some(stripped) => stripped.to_string(),
		None => key,
	}
}

/// Resource whose fields mirror a model.
///
/// # Examples
///
/// ```
/// use chocolate_core::ModelKey;
/// use chocolate_core::schema::{FieldDescriptor, ModelDescriptor, Schema};
/// use chocolate_rest::resource::{ModelResource, Resource};
///
/// let schema = Schema::new().with_model(
///     ModelDescriptor::new("blog", "Entry").field(FieldDescriptor::text("content")),
/// );
/// let resource = ModelResource::from_schema(&schema, "EntryResource", &ModelKey::new("blog", "entry")).unwrap();
///
/// assert_eq!(resource.resource_name(), "entry");
/// let names: Vec<_> = resource.fields().iter().map(|f| f.name.as_str()).collect();
/// assert_eq!(names, vec!["id", "content", "resource_uri"]);
/// ```
#[derive(Debug, Clone)]
pub struct ModelResource {
	type_name: String,
	resource_name: String,
	model: ModelKey,
	fields: Vec<ResourceField>,
	api_name: Option<String>,
}

impl ModelResource {
	/// A resource with only the `resource_uri` field.
	pub fn new(type_name: impl Into<String>, model: ModelKey) -> Self {
		let type_name = type_name.into();
		Self {
			resource_name: resource_key(&type_name),
			type_name,
			model,
			fields: vec![ResourceField::char(RESOURCE_URI_FIELD).readonly()],
			api_name: None,
		}
	}

	/// A resource exposing every scalar field of the model.
	///
	/// Relation fields are not exposed; add them with
	/// [`with_field`](Self::with_field).
	pub fn from_schema(
		schema: &dyn SchemaProvider,
		type_name: impl Into<String>,
		model: &ModelKey,
	) -> RestResult<Self> {
		let mut resource = Self::new(type_name, model.clone());
		let mut fields = Vec::new();
		for (_, field) in FieldClassifier::new(schema).concrete_fields(model)? {
			let Some(kind) = ResourceFieldKind::from_model_kind(&field.kind) else {
				continue;
			};
			fields.push(ResourceField::new(&field.name, kind).attribute(&field.name));
		}
		fields.append(&mut resource.fields);
		resource.fields = fields;
		Ok(resource)
	}

	/// Overrides the resource name derived from the type name.
	pub fn with_resource_name(mut self, name: impl Into<String>) -> Self {
		self.resource_name = name.into();
		self
	}

	/// Adds a field, replacing any field with the same name.
	pub fn with_field(mut self, field: ResourceField) -> Self {
		match self.fields.iter_mut().find(|existing| existing.name == field.name) {
			Some(existing) => *existing = field,
			None => self.fields.push(field),
		}
		self
	}

	pub fn api_name(&self) -> Option<&str> {
		self.api_name.as_deref()
	}

	fn dehydrate_field(&self, field: &ResourceField, bundle: &Bundle) -> Value {
		let obj = &bundle.obj;
		if field.name == RESOURCE_URI_FIELD {
			return Value::String(self.resource_uri(obj));
		}
		if let ResourceFieldKind::ToMany { to } = &field.kind {
			let accessor = field.attribute.as_deref().unwrap_or(&field.name);
			if let Some(related) = bundle.related.get(accessor) {
				return self.uri_list(to, related);
			}
		}
		let Some(value) = field.attribute.as_deref().and_then(|attribute| obj.get(attribute)) else {
			return Value::Null;
		};
		match (&field.kind, value) {
			(ResourceFieldKind::ForeignKey { to }, FieldValue::Instance(related)) => {
				Value::String(self.uri_for(to, related.pk()))
			}
			(ResourceFieldKind::ForeignKey { to }, FieldValue::Int(pk)) => {
				Value::String(self.uri_for(to, *pk))
			}
			(ResourceFieldKind::ToMany { to }, FieldValue::Instances(related)) => {
				self.uri_list(to, related)
			}
			_ => Value::from(value),
		}
	}

	fn uri_list(&self, resource_name: &str, related: &[Instance]) -> Value {
		Value::Array(
			related
				.iter()
				.map(|instance| Value::String(self.uri_for(resource_name, instance.pk())))
				.collect(),
		)
	}
}

impl Resource for ModelResource {
	fn resource_name(&self) -> &str {
		&self.resource_name
	}

	fn type_name(&self) -> &str {
		&self.type_name
	}

	fn model(&self) -> &ModelKey {
		&self.model
	}

	fn fields(&self) -> &[ResourceField] {
		&self.fields
	}

	fn set_api_name(&mut self, api_name: &str) {
		self.api_name = Some(api_name.to_string());
	}

	fn uri_for(&self, resource_name: &str, pk: i64) -> String {
		match &self.api_name {
			Some(api) => format!("/api/{}/{}/{}/", api, resource_name, pk),
			None => format!("/{}/{}/", resource_name, pk),
		}
	}

	fn full_dehydrate(&self, mut bundle: Bundle) -> RestResult<Bundle> {
		for field in &self.fields {
			let value = self.dehydrate_field(field, &bundle);
			bundle.data.insert(field.name.clone(), value);
		}
		Ok(bundle)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chocolate_core::schema::{FieldDescriptor, ModelDescriptor, Schema};
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::collections::BTreeMap;

	#[fixture]
	fn schema() -> Schema {
		Schema::new()
			.with_model(ModelDescriptor::new("blog", "Entry").field(FieldDescriptor::text("content")))
			.with_model(
				ModelDescriptor::new("blog", "Comment")
					.field(FieldDescriptor::foreign_key("post", ModelKey::new("blog", "entry")))
					.field(FieldDescriptor::text("content"))
					.field(FieldDescriptor::integer("rating").null()),
			)
	}

	fn comment_resource(schema: &Schema) -> ModelResource {
		ModelResource::from_schema(schema, "CommentResource", &ModelKey::new("blog", "comment"))
			.unwrap()
			.with_field(ResourceField::foreign_key("entry", "entry").attribute("post"))
			.with_field(ResourceField::integer("upvotes").readonly())
	}

	#[rstest]
	#[case("EntryResource", "entry")]
	#[case("GutturalCommentResource", "gutturalcomment")]
	#[case("Resource", "")]
	#[case("tag", "tag")]
	fn test_resource_key(#[case] type_name: &str, #[case] expected: &str) {
		assert_eq!(resource_key(type_name), expected);
	}

	#[rstest]
	fn test_from_schema_skips_relations(schema: Schema) {
		let resource = comment_resource(&schema);

		let names: Vec<_> = resource.fields().iter().map(|f| f.name.as_str()).collect();

		assert_eq!(
			names,
			vec!["id", "content", "rating", "resource_uri", "entry", "upvotes"]
		);
	}

	#[rstest]
	fn test_uri_uses_api_name(schema: Schema) {
		let mut resource = comment_resource(&schema);
		let instance = Instance::new(ModelKey::new("blog", "comment"), 3, BTreeMap::new());
		assert_eq!(resource.resource_uri(&instance), "/comment/3/");

		resource.set_api_name("v1");

		assert_eq!(resource.resource_uri(&instance), "/api/v1/comment/3/");
	}

	#[rstest]
	fn test_full_dehydrate(schema: Schema) {
		// Arrange
		let mut resource = comment_resource(&schema);
		resource.set_api_name("v1");
		let entry = Instance::new(ModelKey::new("blog", "entry"), 7, BTreeMap::new());
		let mut values = BTreeMap::new();
		values.insert("id".to_string(), FieldValue::Int(2));
		values.insert("post".to_string(), FieldValue::from(entry));
		values.insert("content".to_string(), FieldValue::from("Some content"));
		values.insert("rating".to_string(), FieldValue::Null);
		let comment = Instance::new(ModelKey::new("blog", "comment"), 2, values);

		// Act
		let bundle = resource.full_dehydrate(resource.build_bundle(comment)).unwrap();

		// Assert
		assert_eq!(
			Value::Object(bundle.data),
			json!({
				"id": 2,
				"content": "Some content",
				"rating": null,
				"resource_uri": "/api/v1/comment/2/",
				"entry": "/api/v1/entry/7/",
				"upvotes": null,
			})
		);
	}

	#[rstest]
	fn test_full_dehydrate_lists_related_locators(schema: Schema) {
		// Arrange
		let mut resource =
			ModelResource::from_schema(&schema, "EntryResource", &ModelKey::new("blog", "entry"))
				.unwrap()
				.with_field(ResourceField::to_many("comments", "comment").attribute("comments"));
		resource.set_api_name("v1");
		let comments = [4, 9]
			.map(|pk| Instance::new(ModelKey::new("blog", "comment"), pk, BTreeMap::new()))
			.to_vec();
		let entry = Instance::new(ModelKey::new("blog", "entry"), 1, BTreeMap::new());
		let bundle = resource.build_bundle(entry).with_related("comments", comments);

		// Act
		let bundle = resource.full_dehydrate(bundle).unwrap();

		// Assert
		assert_eq!(
			bundle.data["comments"],
			json!(["/api/v1/comment/4/", "/api/v1/comment/9/"])
		);
	}

	#[rstest]
	fn test_to_many_without_related_is_null() {
		let resource = ModelResource::new("EntryResource", ModelKey::new("blog", "entry"))
			.with_field(ResourceField::to_many("comments", "comment"));
		let entry = Instance::new(ModelKey::new("blog", "entry"), 1, BTreeMap::new());

		let bundle = resource.full_dehydrate(resource.build_bundle(entry)).unwrap();

		assert_eq!(bundle.data["comments"], Value::Null);
	}

	#[rstest]
	fn test_excluded_from_post() {
		assert!(ResourceField::integer("id").excluded_from_post());
		assert!(ResourceField::char("resource_uri").excluded_from_post());
		assert!(ResourceField::integer("upvotes").readonly().excluded_from_post());
		assert!(!ResourceField::char("content").excluded_from_post());
	}

	#[rstest]
	fn test_unsupported_format() {
		let result = serialize_map(&Map::new(), "text/csv");
		assert!(matches!(result, Err(RestError::UnsupportedFormat(format)) if format == "text/csv"));
	}

	#[rstest]
	fn test_model_kind_mapping() {
		assert_eq!(
			ResourceFieldKind::from_model_kind(&FieldKind::Text),
			Some(ResourceFieldKind::Char)
		);
		assert_eq!(
			ResourceFieldKind::from_model_kind(&FieldKind::ForeignKey {
				to: ModelKey::new("auth", "user"),
				related_name: Default::default(),
			}),
			None
		);
		assert_eq!(ResourceFieldKind::ToMany { to: "tag".into() }.model_kind(), None);
	}
}
