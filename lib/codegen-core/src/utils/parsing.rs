use graphql_parser::{query, schema};

pub type SchemaDocument = schema::Document<'static, String>;
pub type QueryDocument = query::Document<'static, String>;

#[inline]
pub fn safe_parse_schema(sdl: &str) -> Result<SchemaDocument, schema::ParseError> {
    graphql_parser::parse_schema::<String>(sdl).map(|doc| doc.into_static())
}

#[inline]
pub fn safe_parse_operation(operation: &str) -> Result<QueryDocument, query::ParseError> {
    graphql_parser::parse_query::<String>(operation).map(|op| op.into_static())
}

/// Test and tooling helper. Panics on invalid SDL.
#[inline]
pub fn parse_schema(sdl: &str) -> SchemaDocument {
    safe_parse_schema(sdl).expect("failed to parse schema")
}

/// Test and tooling helper. Panics on an invalid document.
#[inline]
pub fn parse_operation(operation: &str) -> QueryDocument {
    safe_parse_operation(operation).expect("failed to parse operation")
}
