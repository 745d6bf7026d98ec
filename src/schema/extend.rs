//! Schema extension: producing a new schema from an existing one plus a
//! document of additional definitions and extensions.

use crate::{
    GraphQLError,
    ast::Document,
    schema::{build::SchemaBuilder, model::Schema},
};

/// Produces a new [`SchemaBuilder`] holding `schema` extended with the
/// definitions and extensions of `document`.
///
/// Types untouched by the document keep their identity (names and attached
/// resolver functions are shared, not re-created). The returned builder
/// lets resolvers be attached to newly added fields before
/// [`SchemaBuilder::finish`] re-validates the invariants.
pub fn extend_schema(
    schema: &Schema,
    document: &Document<'_>,
) -> Result<SchemaBuilder, GraphQLError> {
    let mut builder = SchemaBuilder::from_schema(&schema.schema);
    builder.ingest(document)?;
    Ok(builder)
}
