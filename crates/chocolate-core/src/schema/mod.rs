//! Model schema: field and model descriptors plus the introspection provider.

mod field;
mod model;
mod registry;

pub use field::{FieldDefault, FieldDescriptor, FieldKind, RelatedName};
pub use model::ModelDescriptor;
pub use registry::{Schema, SchemaProvider};
