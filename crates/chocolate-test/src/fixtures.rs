//! rstest fixtures for the blog test schema.
//!
//! The schema models a small blog (`auth.User`, `blog.Entry`,
//! `blog.Comment`, ...) plus a `zombie_blog` application whose models reuse
//! names from the other two, directly or through inheritance.

use std::sync::Arc;

use chocolate_core::prelude::*;
use chocolate_rest::resource::ResourceField;
use chocolate_rest::{Api, ModelResource, ResourceFactory};
use rstest::*;

pub use chocolate_core::prelude::{
	FieldValue, Instance, MockupError, ModelFactory, ModelKey, Overrides, Schema,
};

/// Models the default [`model_factory`] registers.
pub const REGISTERED_MODELS: [(&str, &str); 7] = [
	("blog", "entry"),
	("auth", "user"),
	("blog", "comment"),
	("blog", "movie"),
	("blog", "actor"),
	("blog", "group"),
	("blog", "person"),
];

fn auth_user() -> ModelDescriptor {
	ModelDescriptor::new("auth", "User")
		.field(FieldDescriptor::char("username", 30).unique())
		.field(FieldDescriptor::char("first_name", 30))
		.field(FieldDescriptor::char("last_name", 30))
		.field(FieldDescriptor::new("email", FieldKind::Email))
		.field(FieldDescriptor::boolean("is_staff").default_value(false))
		.field(FieldDescriptor::boolean("is_active").default_value(true))
		.field(FieldDescriptor::datetime("date_joined"))
}

fn blog_models() -> Vec<ModelDescriptor> {
	let user = ModelKey::new("auth", "user");
	let entry = ModelKey::new("blog", "entry");
	vec![
		ModelDescriptor::new("blog", "Entry")
			.field(FieldDescriptor::text("content"))
			.field(FieldDescriptor::foreign_key("author", user.clone()))
			.field(FieldDescriptor::datetime("created")),
		ModelDescriptor::new("blog", "Comment")
			.field(FieldDescriptor::foreign_key("post", entry).related_name("comments"))
			.field(FieldDescriptor::text("content"))
			.field(FieldDescriptor::foreign_key("author", user))
			.field(FieldDescriptor::datetime("created"))
			.field(FieldDescriptor::integer("rating").null()),
		ModelDescriptor::new("blog", "Actor").field(FieldDescriptor::char("name", 32)),
		ModelDescriptor::new("blog", "Movie")
			.field(FieldDescriptor::char("name", 32).unique())
			.field(
				FieldDescriptor::many_to_many("actors", ModelKey::new("blog", "actor"))
					.related_name("movies"),
			)
			.field(FieldDescriptor::integer("score").default_value(0)),
		ModelDescriptor::new("blog", "Person").field(FieldDescriptor::char("name", 64)),
		ModelDescriptor::new("blog", "Group")
			.field(FieldDescriptor::char("name", 64))
			.field(
				FieldDescriptor::many_to_many("members", ModelKey::new("blog", "person"))
					.related_name("groups")
					.through(ModelKey::new("blog", "membership")),
			),
		ModelDescriptor::new("blog", "Membership")
			.field(FieldDescriptor::foreign_key(
				"person",
				ModelKey::new("blog", "person"),
			))
			.field(FieldDescriptor::foreign_key(
				"group",
				ModelKey::new("blog", "group"),
			))
			.field(FieldDescriptor::date("date_joined"))
			.field(FieldDescriptor::char("invite_reason", 64)),
	]
}

fn zombie_blog_models() -> Vec<ModelDescriptor> {
	vec![
		ModelDescriptor::new("zombie_blog", "User")
			.inherits(ModelKey::new("auth", "user"))
			.field(FieldDescriptor::integer("brains_eaten").default_value(0)),
		ModelDescriptor::new("zombie_blog", "Entry")
			.field(FieldDescriptor::text("content"))
			.field(
				FieldDescriptor::foreign_key("zombie_author", ModelKey::new("zombie_blog", "user"))
					.related_name("zombie_entries"),
			)
			.field(FieldDescriptor::datetime("created"))
			.field(FieldDescriptor::integer("zombie_count").default_value(1)),
		ModelDescriptor::new("zombie_blog", "GutturalComment")
			.inherits(ModelKey::new("blog", "comment"))
			.field(FieldDescriptor::text("translation")),
	]
}

/// The full test schema.
#[fixture]
pub fn blog_schema() -> Arc<Schema> {
	let schema = Schema::new().with_model(auth_user());
	for model in blog_models().into_iter().chain(zombie_blog_models()) {
		schema.register(model);
	}
	Arc::new(schema)
}

/// A factory over a fresh in-memory store with nothing registered.
pub fn empty_factory(schema: Arc<Schema>) -> ModelFactory {
	let store = Arc::new(MemoryStore::new(schema.clone()));
	ModelFactory::new(schema, store)
}

/// Registers every model of [`REGISTERED_MODELS`].
pub fn register_blog_models(factory: &ModelFactory) {
	for (app, model) in REGISTERED_MODELS {
		factory
			.register(&ModelKey::new(app, model))
			.expect("blog model is in the schema");
	}
}

/// A factory over a fresh store with the blog models registered.
#[fixture]
pub fn model_factory(blog_schema: Arc<Schema>) -> Arc<ModelFactory> {
	crate::logging::init_test_logging();
	let factory = empty_factory(blog_schema);
	register_blog_models(&factory);
	Arc::new(factory)
}

/// `v1` API with an `entry` and a `comment` resource.
///
/// The comment resource exposes its `post` foreign key as `entry` and has a
/// read-only `upvotes` field.
#[fixture]
pub fn blog_api(blog_schema: Arc<Schema>) -> Arc<Api> {
	let entry = ModelResource::from_schema(
		blog_schema.as_ref(),
		"EntryResource",
		&ModelKey::new("blog", "entry"),
	)
	.expect("entry is in the schema");
	let comment = ModelResource::from_schema(
		blog_schema.as_ref(),
		"CommentResource",
		&ModelKey::new("blog", "comment"),
	)
	.expect("comment is in the schema")
	.with_field(ResourceField::foreign_key("entry", "entry").attribute("post"))
	.with_field(ResourceField::integer("upvotes").readonly());

	Arc::new(Api::new("v1").with_resource(entry).with_resource(comment))
}

/// Resource factory over [`blog_api`] and [`model_factory`].
#[fixture]
pub fn resource_factory(blog_api: Arc<Api>, model_factory: Arc<ModelFactory>) -> ResourceFactory {
	ResourceFactory::new(blog_api, model_factory).expect("resource models are in the schema")
}

/// Counts stored rows of a model, child rows included.
pub fn count(factory: &ModelFactory, app: &str, model: &str) -> usize {
	factory
		.store()
		.count(&ModelKey::new(app, model))
		.expect("model is in the schema")
}
