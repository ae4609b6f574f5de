//! Random value generators.
//!
//! Each generator produces values for one semantic field type. Generators
//! that depend on field parameters (maximum length, precision, file roots)
//! are built from the [`FieldDescriptor`] they serve.
//!
//! [`GeneratorRegistry`] maps a field type name
//! ([`FieldKind::type_name`](crate::schema::FieldKind::type_name)) to a
//! generator constructor.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, NaiveTime, Timelike, Utc};
use fake::Fake;
use fake::faker::filesystem::en::FileName;
use fake::faker::internet::en::{DomainSuffix, IPv4, SafeEmail};
use fake::faker::lorem::en::{Paragraph, Word, Words};
use once_cell::sync::Lazy;
use rand::Rng;
use rust_decimal::Decimal;

use crate::schema::{FieldDescriptor, FieldKind};
use crate::value::FieldValue;

/// Produces random values for a field.
pub trait ValueGenerator: Send + Sync {
	fn generate(&self) -> FieldValue;
}

impl<F> ValueGenerator for F
where
	F: Fn() -> FieldValue + Send + Sync,
{
	fn generate(&self) -> FieldValue {
		self()
	}
}

/// Constructor of a generator for a given field.
pub type GeneratorConstructor =
	Arc<dyn Fn(&FieldDescriptor) -> Arc<dyn ValueGenerator> + Send + Sync>;

/// Uniform boolean.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanGenerator;

impl ValueGenerator for BooleanGenerator {
	fn generate(&self) -> FieldValue {
		FieldValue::Bool(rand::thread_rng().r#gen())
	}
}

/// `true`, `false` or null with equal odds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBooleanGenerator;

impl ValueGenerator for NullBooleanGenerator {
	fn generate(&self) -> FieldValue {
		match rand::thread_rng().gen_range(0..3) {
			0 => FieldValue::Null,
			1 => FieldValue::Bool(true),
			_ => FieldValue::Bool(false),
		}
	}
}

const TEN_YEARS_IN_DAYS: i64 = 3650;

/// A date within the last ten years.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateGenerator;

impl ValueGenerator for DateGenerator {
	fn generate(&self) -> FieldValue {
		let days = rand::thread_rng().gen_range(0..=TEN_YEARS_IN_DAYS);
		FieldValue::Date(Utc::now().date_naive() - Duration::days(days))
	}
}

/// A UTC timestamp within the last ten years, truncated to whole seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeGenerator;

impl ValueGenerator for DateTimeGenerator {
	fn generate(&self) -> FieldValue {
		let seconds = rand::thread_rng().gen_range(0..=TEN_YEARS_IN_DAYS * 86_400);
		let moment = Utc::now() - Duration::seconds(seconds);
		FieldValue::DateTime(moment.with_nanosecond(0).unwrap_or(moment))
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeGenerator;

impl ValueGenerator for TimeGenerator {
	fn generate(&self) -> FieldValue {
		let seconds = rand::thread_rng().gen_range(0..86_400);
		FieldValue::Time(
			NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default(),
		)
	}
}

/// Integer within inclusive bounds.
#[derive(Debug, Clone, Copy)]
pub struct IntegerGenerator {
	min: i64,
	max: i64,
}

impl IntegerGenerator {
	pub fn new(min: i64, max: i64) -> Self {
		Self {
			min: min.min(max),
			max: max.max(min),
		}
	}

	/// Bounds matching a field's integer flavour.
	pub fn for_kind(kind: &FieldKind) -> Self {
		match kind {
			FieldKind::BigInteger => Self::new(i64::MIN, i64::MAX),
			FieldKind::SmallInteger => Self::new(i16::MIN.into(), i16::MAX.into()),
			FieldKind::PositiveInteger => Self::new(0, i32::MAX.into()),
			FieldKind::PositiveSmallInteger => Self::new(0, i16::MAX.into()),
			_ => Self::new(i32::MIN.into(), i32::MAX.into()),
		}
	}
}

impl Default for IntegerGenerator {
	fn default() -> Self {
		Self::for_kind(&FieldKind::Integer)
	}
}

impl ValueGenerator for IntegerGenerator {
	fn generate(&self) -> FieldValue {
		FieldValue::Int(rand::thread_rng().gen_range(self.min..=self.max))
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatGenerator;

impl ValueGenerator for FloatGenerator {
	fn generate(&self) -> FieldValue {
		FieldValue::Float(rand::thread_rng().gen_range(-1_000_000.0..1_000_000.0))
	}
}

/// Fixed-point number fitting `max_digits` and `decimal_places`.
#[derive(Debug, Clone, Copy)]
pub struct DecimalGenerator {
	digits: u32,
	scale: u32,
}

// Largest digit count whose power of ten still fits an i64 mantissa.
const MAX_MANTISSA_DIGITS: u32 = 18;
// Largest scale rust_decimal accepts.
const MAX_SCALE: u32 = 28;

impl DecimalGenerator {
	pub fn new(max_digits: u32, decimal_places: u32) -> Self {
		let scale = decimal_places.min(MAX_SCALE);
		Self {
			digits: max_digits.max(scale).min(MAX_MANTISSA_DIGITS),
			scale,
		}
	}
}

impl ValueGenerator for DecimalGenerator {
	fn generate(&self) -> FieldValue {
		let mut rng = rand::thread_rng();
		let bound = 10_i64.pow(self.digits);
		let mut mantissa = rng.gen_range(0..bound);
		if rng.r#gen() {
			mantissa = -mantissa;
		}
		FieldValue::Decimal(Decimal::new(mantissa, self.scale))
	}
}

/// Lorem words cut to the field's maximum length.
#[derive(Debug, Clone, Copy)]
pub struct CharGenerator {
	max_length: usize,
}

impl CharGenerator {
	pub fn new(max_length: usize) -> Self {
		Self { max_length }
	}
}

impl ValueGenerator for CharGenerator {
	fn generate(&self) -> FieldValue {
		let words: Vec<String> = Words(1..4).fake();
		FieldValue::Text(words.join(" ").chars().take(self.max_length).collect())
	}
}

/// Lorem paragraphs for unbounded text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoremGenerator;

impl ValueGenerator for LoremGenerator {
	fn generate(&self) -> FieldValue {
		FieldValue::Text(Paragraph(1..4).fake())
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmailGenerator;

impl ValueGenerator for EmailGenerator {
	fn generate(&self) -> FieldValue {
		FieldValue::Text(SafeEmail().fake())
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UrlGenerator;

impl ValueGenerator for UrlGenerator {
	fn generate(&self) -> FieldValue {
		let host: String = Word().fake();
		let suffix: String = DomainSuffix().fake();
		FieldValue::Text(format!("http://www.{}.{}/", host, suffix))
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IpAddressGenerator;

impl ValueGenerator for IpAddressGenerator {
	fn generate(&self) -> FieldValue {
		FieldValue::Text(IPv4().fake())
	}
}

/// Lowercase words joined by hyphens.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugGenerator;

impl ValueGenerator for SlugGenerator {
	fn generate(&self) -> FieldValue {
		let words: Vec<String> = Words(1..4).fake();
		FieldValue::Text(words.join("-").to_lowercase())
	}
}

/// A file name under one of the field's root directories.
#[derive(Debug, Clone, Default)]
pub struct FilePathGenerator {
	roots: Vec<PathBuf>,
}

impl FilePathGenerator {
	pub fn new(roots: Vec<PathBuf>) -> Self {
		Self { roots }
	}
}

impl ValueGenerator for FilePathGenerator {
	fn generate(&self) -> FieldValue {
		let name: String = FileName().fake();
		let path = if self.roots.is_empty() {
			PathBuf::from(name)
		} else {
			let index = rand::thread_rng().gen_range(0..self.roots.len());
			self.roots[index].join(name)
		};
		FieldValue::Text(path.to_string_lossy().into_owned())
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl ValueGenerator for UuidGenerator {
	fn generate(&self) -> FieldValue {
		FieldValue::Uuid(uuid::Uuid::new_v4())
	}
}

fn constructor<F, G>(build: F) -> GeneratorConstructor
where
	F: Fn(&FieldDescriptor) -> G + Send + Sync + 'static,
	G: ValueGenerator + 'static,
{
	Arc::new(move |field: &FieldDescriptor| {
		Arc::new(build(field)) as Arc<dyn ValueGenerator>
	})
}

static BUILTIN_GENERATORS: Lazy<HashMap<String, GeneratorConstructor>> = Lazy::new(|| {
	let mut map: HashMap<String, GeneratorConstructor> = HashMap::new();
	map.insert("BooleanField".into(), constructor(|_| BooleanGenerator));
	map.insert("NullBooleanField".into(), constructor(|_| NullBooleanGenerator));
	map.insert("DateField".into(), constructor(|_| DateGenerator));
	map.insert("DateTimeField".into(), constructor(|_| DateTimeGenerator));
	map.insert("TimeField".into(), constructor(|_| TimeGenerator));
	for name in [
		"IntegerField",
		"BigIntegerField",
		"SmallIntegerField",
		"PositiveIntegerField",
		"PositiveSmallIntegerField",
	] {
		map.insert(
			name.into(),
			constructor(|field| IntegerGenerator::for_kind(&field.kind)),
		);
	}
	map.insert("FloatField".into(), constructor(|_| FloatGenerator));
	map.insert(
		"DecimalField".into(),
		constructor(|field| match field.kind {
			FieldKind::Decimal {
				max_digits,
				decimal_places,
			} => DecimalGenerator::new(max_digits, decimal_places),
			_ => DecimalGenerator::new(10, 2),
		}),
	);
	map.insert(
		"CharField".into(),
		constructor(|field| match field.kind {
			FieldKind::Char { max_length } => CharGenerator::new(max_length),
			_ => CharGenerator::new(255),
		}),
	);
	map.insert("TextField".into(), constructor(|_| LoremGenerator));
	map.insert("EmailField".into(), constructor(|_| EmailGenerator));
	map.insert("URLField".into(), constructor(|_| UrlGenerator));
	map.insert("IPAddressField".into(), constructor(|_| IpAddressGenerator));
	map.insert("SlugField".into(), constructor(|_| SlugGenerator));
	map.insert(
		"FilePathField".into(),
		constructor(|field| match &field.kind {
			FieldKind::FilePath { roots } => FilePathGenerator::new(roots.clone()),
			_ => FilePathGenerator::default(),
		}),
	);
	map.insert("UUIDField".into(), constructor(|_| UuidGenerator));
	map
});

/// Map from field type name to generator constructor.
///
/// A new registry holds the built-in generators. Constructors can be added
/// for custom field types or replace a built-in.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use chocolate_core::FieldValue;
/// use chocolate_core::generators::{GeneratorRegistry, ValueGenerator};
/// use chocolate_core::schema::{FieldDescriptor, FieldKind};
///
/// let mut registry = GeneratorRegistry::new();
/// registry.register("ColorField", |_: &FieldDescriptor| {
///     Arc::new(|| FieldValue::from("#ff00ff")) as Arc<dyn ValueGenerator>
/// });
///
/// let field = FieldDescriptor::new("color", FieldKind::Custom("ColorField".into()));
/// let generator = registry.for_field(&field).unwrap();
/// assert_eq!(generator.generate(), FieldValue::from("#ff00ff"));
/// ```
#[derive(Clone)]
pub struct GeneratorRegistry {
	constructors: HashMap<String, GeneratorConstructor>,
}

impl GeneratorRegistry {
	pub fn new() -> Self {
		Self {
			constructors: BUILTIN_GENERATORS.clone(),
		}
	}

	/// A registry without any generator.
	pub fn empty() -> Self {
		Self {
			constructors: HashMap::new(),
		}
	}

	/// Registers a constructor for a field type name, replacing any previous one.
	pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F)
	where
		F: Fn(&FieldDescriptor) -> Arc<dyn ValueGenerator> + Send + Sync + 'static,
	{
		self.constructors
			.insert(type_name.into(), Arc::new(constructor));
	}

	/// Builder-style [`register`](Self::register).
	pub fn with<F>(mut self, type_name: impl Into<String>, constructor: F) -> Self
	where
		F: Fn(&FieldDescriptor) -> Arc<dyn ValueGenerator> + Send + Sync + 'static,
	{
		self.register(type_name, constructor);
		self
	}

	pub fn contains(&self, type_name: &str) -> bool {
		self.constructors.contains_key(type_name)
	}

	/// Builds a generator for the field, if its type has one.
	pub fn for_field(&self, field: &FieldDescriptor) -> Option<Arc<dyn ValueGenerator>> {
		self.constructors
			.get(field.kind.type_name())
			.map(|build| build(field))
	}
}

impl Default for GeneratorRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for GeneratorRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&String> = self.constructors.keys().collect();
		names.sort();
		f.debug_struct("GeneratorRegistry")
			.field("types", &names)
			.finish()
	}
}
