//! Deterministic value generators.

use std::collections::VecDeque;
use std::sync::Arc;

use chocolate_core::schema::FieldDescriptor;
use chocolate_core::{FieldValue, ValueGenerator};
use parking_lot::Mutex;

/// Replays a fixed sequence of values, then repeats the last one.
///
/// # Examples
///
/// ```
/// use chocolate_core::{FieldValue, ValueGenerator};
/// use chocolate_test::ScriptedGenerator;
///
/// let generator = ScriptedGenerator::new(["Movie_2", "Movie_1"]);
/// assert_eq!(generator.generate(), FieldValue::from("Movie_2"));
/// assert_eq!(generator.generate(), FieldValue::from("Movie_1"));
/// assert_eq!(generator.generate(), FieldValue::from("Movie_1"));
/// ```
#[derive(Debug)]
pub struct ScriptedGenerator {
	state: Mutex<Script>,
}

#[derive(Debug)]
struct Script {
	pending: VecDeque<FieldValue>,
	last: FieldValue,
	calls: usize,
}

impl ScriptedGenerator {
	pub fn new<I, V>(values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<FieldValue>,
	{
		Self {
			state: Mutex::new(Script {
				pending: values.into_iter().map(Into::into).collect(),
				last: FieldValue::Null,
				calls: 0,
			}),
		}
	}

	/// Number of values handed out so far.
	pub fn calls(&self) -> usize {
		self.state.lock().calls
	}

	/// Generator constructor handing out this shared script for every field,
	/// suitable for [`GeneratorRegistry::register`](chocolate_core::GeneratorRegistry::register).
	pub fn constructor(
		self: &Arc<Self>,
	) -> Box<dyn Fn(&FieldDescriptor) -> Arc<dyn ValueGenerator> + Send + Sync> {
		let script = Arc::clone(self);
		Box::new(move |_: &FieldDescriptor| Arc::clone(&script) as Arc<dyn ValueGenerator>)
	}
}

impl ValueGenerator for ScriptedGenerator {
	fn generate(&self) -> FieldValue {
		let mut state = self.state.lock();
		state.calls += 1;
		if let Some(value) = state.pending.pop_front() {
			state.last = value;
		}
		state.last.clone()
	}
}
