//! Field values, persisted instances and caller overrides.

use std::collections::BTreeMap;
use std::collections::btree_map;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::key::ModelKey;

/// A value held by a model field or requested for one.
///
/// `Int` doubles as the "create N related objects" request when it is
/// assigned to a to-many field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Decimal(Decimal),
	Text(String),
	Date(NaiveDate),
	DateTime(DateTime<Utc>),
	Time(NaiveTime),
	Uuid(Uuid),
	Instance(Box<Instance>),
	Instances(Vec<Instance>),
}

impl FieldValue {
	pub fn is_null(&self) -> bool {
		matches!(self, FieldValue::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			FieldValue::Text(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			FieldValue::Int(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			FieldValue::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_instance(&self) -> Option<&Instance> {
		match self {
			FieldValue::Instance(instance) => Some(instance),
			_ => None,
		}
	}

	/// Short name of the variant, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			FieldValue::Null => "null",
			FieldValue::Bool(_) => "bool",
			FieldValue::Int(_) => "int",
			FieldValue::Float(_) => "float",
			FieldValue::Decimal(_) => "decimal",
			FieldValue::Text(_) => "text",
			FieldValue::Date(_) => "date",
			FieldValue::DateTime(_) => "datetime",
			FieldValue::Time(_) => "time",
			FieldValue::Uuid(_) => "uuid",
			FieldValue::Instance(_) => "instance",
			FieldValue::Instances(_) => "instances",
		}
	}
}

impl From<&FieldValue> for Value {
	fn from(value: &FieldValue) -> Self {
		match value {
			FieldValue::Null => Value::Null,
			FieldValue::Bool(b) => Value::Bool(*b),
			FieldValue::Int(i) => Value::from(*i),
			FieldValue::Float(f) => serde_json::Number::from_f64(*f)
				.map(Value::Number)
				.unwrap_or(Value::Null),
			FieldValue::Decimal(d) => Value::String(d.to_string()),
			FieldValue::Text(s) => Value::String(s.clone()),
			FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
			FieldValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
			FieldValue::Time(t) => Value::String(t.format("%H:%M:%S").to_string()),
			FieldValue::Uuid(u) => Value::String(u.to_string()),
			FieldValue::Instance(instance) => Value::from(instance.pk()),
			FieldValue::Instances(instances) => {
				Value::Array(instances.iter().map(|i| Value::from(i.pk())).collect())
			}
		}
	}
}

impl From<FieldValue> for Value {
	fn from(value: FieldValue) -> Self {
		Value::from(&value)
	}
}

macro_rules! impl_from {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl From<$ty> for FieldValue {
				fn from(value: $ty) -> Self {
					FieldValue::$variant(value.into())
				}
			}
		)*
	};
}

impl_from! {
	bool => Bool,
	i64 => Int,
	i32 => Int,
	u32 => Int,
	f64 => Float,
	Decimal => Decimal,
	String => Text,
	&str => Text,
	NaiveDate => Date,
	DateTime<Utc> => DateTime,
	NaiveTime => Time,
	Uuid => Uuid,
	Vec<Instance> => Instances,
}

impl From<Instance> for FieldValue {
	fn from(value: Instance) -> Self {
		FieldValue::Instance(Box::new(value))
	}
}

impl From<&Instance> for FieldValue {
	fn from(value: &Instance) -> Self {
		FieldValue::Instance(Box::new(value.clone()))
	}
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(FieldValue::Null)
	}
}

/// A persisted model instance as returned by a [`ModelStore`](crate::store::ModelStore).
///
/// The snapshot carries the primary key and every stored field value. Foreign
/// keys are held as nested instances. Two instances are equal when they share
/// model and primary key.
#[derive(Debug, Clone)]
pub struct Instance {
	model: ModelKey,
	pk: i64,
	values: BTreeMap<String, FieldValue>,
}

impl Instance {
	pub fn new(model: ModelKey, pk: i64, values: BTreeMap<String, FieldValue>) -> Self {
		Self { model, pk, values }
	}

	pub fn model(&self) -> &ModelKey {
		&self.model
	}

	pub fn pk(&self) -> i64 {
		self.pk
	}

	pub fn get(&self, field: &str) -> Option<&FieldValue> {
		self.values.get(field)
	}

	/// Returns the related instance stored under a foreign key field.
	pub fn related(&self, field: &str) -> Option<&Instance> {
		self.get(field).and_then(FieldValue::as_instance)
	}

	pub fn values(&self) -> &BTreeMap<String, FieldValue> {
		&self.values
	}

	pub(crate) fn set(&mut self, field: impl Into<String>, value: FieldValue) {
		self.values.insert(field.into(), value);
	}
}

impl PartialEq for Instance {
	fn eq(&self, other: &Self) -> bool {
		self.model == other.model && self.pk == other.pk
	}
}

impl Eq for Instance {}

/// Caller-forced field values for a single `create` call.
///
/// # Examples
///
/// ```
/// use chocolate_core::{FieldValue, Overrides};
///
/// let overrides = Overrides::new().with("content", "Homer Simpson").with("comments", 2);
/// assert_eq!(overrides.get("comments"), Some(&FieldValue::Int(2)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides(BTreeMap<String, FieldValue>);

impl Overrides {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a forced value, replacing any earlier one for the same name.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
		self.0.insert(name.into(), value.into());
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		self.0.insert(name.into(), value.into());
	}

	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.0.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
		self.0.iter()
	}
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Overrides {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(name, value)| (name.into(), value.into()))
				.collect(),
		)
	}
}

impl IntoIterator for Overrides {
	type Item = (String, FieldValue);
	type IntoIter = btree_map::IntoIter<String, FieldValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a Overrides {
	type Item = (&'a String, &'a FieldValue);
	type IntoIter = btree_map::Iter<'a, String, FieldValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

/// Builds an [`Overrides`] map from `name => value` pairs.
///
/// # Examples
///
/// ```
/// use chocolate_core::overrides;
///
/// let forced = overrides! { "content" => "Homer Simpson", "comments" => 2 };
/// assert_eq!(forced.len(), 2);
/// assert!(overrides! {}.is_empty());
/// ```
#[macro_export]
macro_rules! overrides {
	() => {
		$crate::Overrides::new()
	};
	($($name:expr => $value:expr),+ $(,)?) => {
		$crate::Overrides::new()$(.with($name, $value))+
	};
}
