//! Registration keys for models.
//!
//! A [`ModelKey`] identifies a model by its application label and model name.
//! Both parts are normalized to lowercase so `"Blog.Entry"` and
//! `"blog.entry"` name the same model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespaced identity of a model (`"<app_label>.<model_name>"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelKey {
	app_label: String,
	model_name: String,
}

impl ModelKey {
	/// Creates a key from an application label and a model name.
	///
	/// # Examples
	///
	/// ```
	/// use chocolate_core::ModelKey;
	///
	/// let key = ModelKey::new("blog", "Entry");
	/// assert_eq!(key.to_string(), "blog.entry");
	/// ```
	pub fn new(app_label: impl AsRef<str>, model_name: impl AsRef<str>) -> Self {
		Self {
			app_label: app_label.as_ref().to_lowercase(),
			model_name: model_name.as_ref().to_lowercase(),
		}
	}

	/// Parses a dotted `"<app>.<model>"` string.
	///
	/// Returns `None` for bare names or malformed input.
	///
	/// # Examples
	///
	/// ```
	/// use chocolate_core::ModelKey;
	///
	/// assert_eq!(ModelKey::parse("auth.User"), Some(ModelKey::new("auth", "user")));
	/// assert_eq!(ModelKey::parse("user"), None);
	/// ```
	pub fn parse(value: &str) -> Option<Self> {
		let (app_label, model_name) = value.rsplit_once('.')?;
		if app_label.is_empty() || model_name.is_empty() {
			return None;
		}
		Some(Self::new(app_label, model_name))
	}

	pub fn app_label(&self) -> &str {
		&self.app_label
	}

	pub fn model_name(&self) -> &str {
		&self.model_name
	}

	/// Returns true if the bare model name matches, ignoring case.
	pub fn matches_name(&self, name: &str) -> bool {
		self.model_name.eq_ignore_ascii_case(name)
	}
}

impl fmt::Display for ModelKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.app_label, self.model_name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("blog.entry", Some(("blog", "entry")))]
	#[case("Zombie_Blog.Entry", Some(("zombie_blog", "entry")))]
	#[case("entry", None)]
	#[case(".entry", None)]
	#[case("blog.", None)]
	fn test_parse(#[case] input: &str, #[case] expected: Option<(&str, &str)>) {
		let parsed = ModelKey::parse(input);
		assert_eq!(parsed, expected.map(|(app, model)| ModelKey::new(app, model)));
	}

	#[rstest]
	fn test_matches_name_is_case_insensitive() {
		let key = ModelKey::new("auth", "User");
		assert!(key.matches_name("user"));
		assert!(key.matches_name("USER"));
		assert!(!key.matches_name("users"));
	}
}
