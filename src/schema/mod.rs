//! Schema model: the raw introspection payload, its canonical form, and the
//! normalizer between them.

mod normalize;
mod raw;
mod source;
mod types;

pub use normalize::{map_raw_type, normalize, Normalized};
pub use raw::{DatabaseKind, RawField, RawResource, RawSchema};
pub use source::{parse_schema, FileSchemaSource, SchemaSource};
pub use types::{Field, LogicalKind, LogicalType, Resource, ResourceKey, ResourceKind, SchemaModel};
