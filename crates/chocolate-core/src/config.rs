//! Factory configuration.

use serde::Deserialize;

/// Limits applied by a [`ModelFactory`](crate::ModelFactory).
///
/// Missing keys fall back to their defaults when deserialized, so a partial
/// settings file is enough.
///
/// # Examples
///
/// ```
/// use chocolate_core::FactoryConfig;
///
/// let config = FactoryConfig::default().with_max_depth(8);
/// assert_eq!(config.max_depth, 8);
/// assert_eq!(config.max_unique_attempts, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
	/// Generated candidates tried for a unique field before giving up.
	pub max_unique_attempts: usize,

	/// Maximum nesting of related-object creation.
	pub max_depth: usize,
}

impl Default for FactoryConfig {
	fn default() -> Self {
		Self {
			max_unique_attempts: 1000,
			max_depth: 32,
		}
	}
}

impl FactoryConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the unique retry bound.
	pub fn with_max_unique_attempts(mut self, attempts: usize) -> Self {
		self.max_unique_attempts = attempts;
		self
	}

	/// Set the recursion depth bound.
	pub fn with_max_depth(mut self, depth: usize) -> Self {
		self.max_depth = depth;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_partial_config_uses_defaults() {
		// Arrange
		let json = r#"{ "max_depth": 4 }"#;

		// Act
		let config: FactoryConfig = serde_json::from_str(json).unwrap();

		// Assert
		assert_eq!(config.max_depth, 4);
		assert_eq!(config.max_unique_attempts, 1000);
	}

	#[rstest]
	fn test_builders() {
		let config = FactoryConfig::new()
			.with_max_unique_attempts(3)
			.with_max_depth(2);
		assert_eq!(
			config,
			FactoryConfig {
				max_unique_attempts: 3,
				max_depth: 2,
			}
		);
	}
}
