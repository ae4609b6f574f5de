//! # Chocolate Test
//!
//! Shared test utilities for the chocolate crates.
//!
//! ## Features
//!
//! - **Fixtures**: `rstest` fixtures building the blog schema, a model factory
//!   registered the way the test suites expect, a `v1` API and its resource
//!   factory
//! - **[`ScriptedGenerator`]**: a value generator replaying fixed values
//! - **Logging**: [`logging::init_test_logging`] installs a `tracing`
//!   subscriber writing to the test output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chocolate_test::fixtures::*;
//! use rstest::rstest;
//!
//! #[rstest]
//! fn test_entry(model_factory: Arc<ModelFactory>) {
//!     let entry = model_factory.create("entry", Overrides::new()).unwrap();
//!     assert!(entry.related("author").is_some());
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod logging;

pub use generators::ScriptedGenerator;
pub use logging::init_test_logging;
