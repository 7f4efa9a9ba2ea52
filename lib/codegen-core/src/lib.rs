pub mod ast;
pub mod merge;
pub mod models;
pub mod output;
pub mod state;
pub mod type_info;
pub mod utils;

#[cfg(test)]
mod tests;

pub use ast::document::{CompiledDocument, FragmentRegistry};
pub use merge::{
    collect_and_merge_fields, collect_fragment_spreads, context::MergeContext,
    error::MergeError, merged_field::MergedField, wrap_in_boolean_conditions_if_needed,
};
pub use state::schema_state::{SchemaState, TypeRegistry};
pub use type_info::{resolve_type, resolve_type_ref, TypeDescriptor};
