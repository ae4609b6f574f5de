//! Custom seeders, generator registries and generation limits

use std::sync::Arc;

use chocolate_core::prelude::*;
use chocolate_test::fixtures::{blog_schema, count, empty_factory, model_factory, register_blog_models};
use chocolate_test::{ScriptedGenerator, init_test_logging};
use rstest::rstest;

fn first_name(instance: &Instance) -> Option<&str> {
	instance.get("first_name").and_then(FieldValue::as_str)
}

fn juan(data: &mut MockupData<'_>) -> MockupResult<()> {
	data.set("first_name", "Juan");
	Ok(())
}

/// Comments authored by a user named after the forced `first_name`.
fn named_author_comment(data: &mut MockupData<'_>) -> MockupResult<()> {
	let name = data
		.forced()
		.get("first_name")
		.cloned()
		.unwrap_or_else(|| FieldValue::from("Anonymous"));
	let author = data
		.factory()
		.create("user", Overrides::new().with("first_name", name))?;
	data.set("author", author);
	data.set("rating", FieldValue::Null);
	Ok(())
}

#[rstest]
fn test_seeder_value_is_used(model_factory: Arc<ModelFactory>) {
	// Arrange
	model_factory
		.register_with(&ModelKey::new("auth", "user"), juan)
		.unwrap();

	// Act
	let user = model_factory.create("user", Overrides::new()).unwrap();

	// Assert
	assert_eq!(first_name(&user), Some("Juan"));
	assert!(user.get("last_name").and_then(FieldValue::as_str).is_some());
}

#[rstest]
fn test_forced_value_beats_seeder(model_factory: Arc<ModelFactory>) {
	model_factory
		.register_with(&ModelKey::new("auth", "user"), juan)
		.unwrap();

	let user = model_factory
		.create("user", overrides! { "first_name" => "Felipe" })
		.unwrap();

	assert_eq!(first_name(&user), Some("Felipe"));
}

#[rstest]
fn test_seeder_creates_nested_instances(model_factory: Arc<ModelFactory>) {
	// Arrange
	model_factory
		.register_with(&ModelKey::new("blog", "comment"), named_author_comment)
		.unwrap();

	// Act
	let comment = model_factory
		.create("comment", overrides! { "first_name" => "Felipe" })
		.unwrap();
	let anonymous = model_factory.create("comment", Overrides::new()).unwrap();

	// Assert
	assert_eq!(first_name(comment.related("author").unwrap()), Some("Felipe"));
	assert_eq!(first_name(anonymous.related("author").unwrap()), Some("Anonymous"));
	assert_eq!(comment.get("rating"), Some(&FieldValue::Null));
	// one author per comment plus one per generated entry author
	assert_eq!(count(&model_factory, "auth", "user"), 4);
}

#[rstest]
fn test_seeder_applies_to_reverse_relation_counts(model_factory: Arc<ModelFactory>) {
	model_factory
		.register_with(&ModelKey::new("blog", "comment"), named_author_comment)
		.unwrap();

	let entry = model_factory
		.create("entry", overrides! { "comments" => 3 })
		.unwrap();

	for comment in model_factory.related(&entry, "comments").unwrap().all().unwrap() {
		assert_eq!(comment.get("rating"), Some(&FieldValue::Null));
		assert_eq!(comment.related("post"), Some(&entry));
	}
}

#[rstest]
fn test_seeder_can_generate_single_fields(model_factory: Arc<ModelFactory>) {
	// Arrange
	fn rating_only(data: &mut MockupData<'_>) -> MockupResult<()> {
		let factory = data.factory();
		let mockup = factory.get("comment")?;
		mockup.mockup().generate_into(factory, data, "rating")?;
		data.set("content", "rated");
		Ok(())
	}
	model_factory
		.register_with(&ModelKey::new("blog", "comment"), rating_only)
		.unwrap();

	// Act
	let comment = model_factory.create("comment", Overrides::new()).unwrap();

	// Assert
	assert!(matches!(comment.get("rating"), Some(FieldValue::Int(_))));
	assert_eq!(comment.get("content").and_then(FieldValue::as_str), Some("rated"));
}

#[rstest]
fn test_unique_field_retries_taken_values(blog_schema: Arc<Schema>) {
	// Arrange
	init_test_logging();
	let names = Arc::new(ScriptedGenerator::new(["Movie_2", "Movie_2", "Movie_1"]));
	let factory = empty_factory(blog_schema)
		.with_generators(GeneratorRegistry::new().with("CharField", names.constructor()));
	register_blog_models(&factory);

	// Act
	let first = factory.create("movie", Overrides::new()).unwrap();
	let second = factory.create("movie", Overrides::new()).unwrap();

	// Assert
	assert_eq!(first.get("name").and_then(FieldValue::as_str), Some("Movie_2"));
	assert_eq!(second.get("name").and_then(FieldValue::as_str), Some("Movie_1"));
	assert_eq!(names.calls(), 3);
}

#[rstest]
fn test_unique_field_gives_up(blog_schema: Arc<Schema>) {
	// Arrange
	let names = Arc::new(ScriptedGenerator::new(["Movie_1"]));
	let factory = empty_factory(blog_schema)
		.with_config(FactoryConfig::new().with_max_unique_attempts(5))
		.with_generators(GeneratorRegistry::new().with("CharField", names.constructor()));
	register_blog_models(&factory);
	factory.create("movie", Overrides::new()).unwrap();

	// Act
	let result = factory.create("movie", Overrides::new());

	// Assert
	assert!(matches!(
		result,
		Err(MockupError::UniqueExhausted { field, attempts: 5, .. }) if field == "name"
	));
	assert_eq!(names.calls(), 6);
	assert_eq!(count(&factory, "blog", "movie"), 1);
}

#[rstest]
fn test_forced_unique_value_is_not_checked(model_factory: Arc<ModelFactory>) {
	model_factory
		.create("movie", overrides! { "name" => "Alien" })
		.unwrap();

	let result = model_factory.create("movie", overrides! { "name" => "Alien" });

	assert!(result.is_ok());
}

#[rstest]
fn test_forced_value_skips_generator(
	blog_schema: Arc<Schema>,
	#[values("actor", "movie")] model: &str,
) {
	// Arrange
	let names = Arc::new(ScriptedGenerator::new(["Generated"]));
	let factory = empty_factory(blog_schema)
		.with_generators(GeneratorRegistry::new().with("CharField", names.constructor()));
	register_blog_models(&factory);

	// Act
	let instance = factory.create(model, overrides! { "name" => "Forced" }).unwrap();

	// Assert
	assert_eq!(instance.get("name").and_then(FieldValue::as_str), Some("Forced"));
	assert_eq!(names.calls(), 0);
}

fn geo_schema(default: Option<&str>) -> Arc<Schema> {
	let mut location = FieldDescriptor::new("location", FieldKind::Custom("PointField".into()));
	if let Some(default) = default {
		location = location.default_value(default);
	}
	Arc::new(Schema::new().with_model(
		ModelDescriptor::new("geo", "Place")
			.field(FieldDescriptor::char("name", 64))
			.field(location),
	))
}

#[rstest]
fn test_missing_generator() {
	// Arrange
	let factory = empty_factory(geo_schema(None));
	factory.register(&ModelKey::new("geo", "place")).unwrap();

	// Act
	let error = factory.create("place", Overrides::new()).unwrap_err();

	// Assert
	assert!(matches!(
		&error,
		MockupError::MissingGenerator { field, kind, .. } if field == "location" && kind == "PointField"
	));
	assert_eq!(
		error.to_string(),
		"Could not mockup data for Place.location (PointField)"
	);
}

#[rstest]
fn test_missing_generator_avoided(#[values(true, false)] with_default: bool) {
	// Arrange
	let schema = geo_schema(with_default.then_some("POINT(0 0)"));
	let generators = GeneratorRegistry::new().with("PointField", |_: &FieldDescriptor| {
		Arc::new(|| FieldValue::from("POINT(1 1)")) as Arc<dyn ValueGenerator>
	});
	let factory = empty_factory(schema).with_generators(generators);
	factory.register(&ModelKey::new("geo", "place")).unwrap();

	// Act
	let place = factory
		.create("place", Overrides::new())
		.unwrap();

	// Assert
	let expected = if with_default { "POINT(0 0)" } else { "POINT(1 1)" };
	assert_eq!(place.get("location").and_then(FieldValue::as_str), Some(expected));
}

#[rstest]
fn test_missing_generator_avoided_by_forcing() {
	let factory = empty_factory(geo_schema(None));
	factory.register(&ModelKey::new("geo", "place")).unwrap();

	let place = factory
		.create("place", overrides! { "location" => "POINT(2 2)" })
		.unwrap();

	assert_eq!(place.get("location").and_then(FieldValue::as_str), Some("POINT(2 2)"));
}

fn tree_schema() -> Arc<Schema> {
	Arc::new(Schema::new().with_model(
		ModelDescriptor::new("tree", "Node")
			.field(FieldDescriptor::char("label", 16))
			.field(FieldDescriptor::foreign_key("parent", ModelKey::new("tree", "node"))),
	))
}

#[rstest]
#[case(FactoryConfig::default(), 32)]
#[case(FactoryConfig::new().with_max_depth(4), 4)]
fn test_self_reference_hits_recursion_limit(#[case] config: FactoryConfig, #[case] depth: usize) {
	// Arrange
	let factory = empty_factory(tree_schema()).with_config(config);
	factory.register(&ModelKey::new("tree", "node")).unwrap();

	// Act
	let result = factory.create("node", Overrides::new());

	// Assert
	assert!(matches!(
		result,
		Err(MockupError::RecursionLimit { depth: reached, .. }) if reached == depth
	));
	assert_eq!(count(&factory, "tree", "node"), 0);
}

#[rstest]
fn test_forced_null_breaks_cycle() {
	// Arrange
	let factory = empty_factory(tree_schema());
	factory.register(&ModelKey::new("tree", "node")).unwrap();
	let root = factory
		.create("node", overrides! { "parent" => FieldValue::Null })
		.unwrap();

	// Act
	let child = factory
		.create("node", overrides! { "parent" => &root })
		.unwrap();

	// Assert
	assert_eq!(root.get("parent"), Some(&FieldValue::Null));
	assert_eq!(child.related("parent"), Some(&root));
	assert_eq!(factory.related(&root, "node_set").unwrap().count().unwrap(), 1);
}
