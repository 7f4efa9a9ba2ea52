use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    state::schema_state::{SchemaDefinition, SchemaState, TypeKind, TypeRegistry},
    type_info::{resolve_type, TypeDescriptor},
};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Schema type '{type_name}' not found.")]
    TypeNotFound { type_name: String },

    #[error("Schema type '{type_name}' is a {kind:?} and has no fields.")]
    NotAFieldedType { type_name: String, kind: TypeKind },
}

/// A schema field with its declared type resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField<'s> {
    pub name: String,
    #[serde(rename = "type")]
    pub type_descriptor: TypeDescriptor<'s>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ResolvedArgument<'s>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedArgument<'s> {
    pub name: String,
    #[serde(rename = "type")]
    pub type_descriptor: TypeDescriptor<'s>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModel<'s> {
    pub name: String,
    pub kind: TypeKind,
    pub fields: Vec<ResolvedField<'s>>,
}

/// Resolves the declared fields of an object, interface or input object type, in schema order.
#[instrument(level = "trace", skip(state))]
pub fn resolve_model_fields<'s>(
    state: &'s SchemaState,
    type_name: &str,
) -> Result<Vec<ResolvedField<'s>>, ModelError> {
    let definition = state
        .lookup(type_name)
        .ok_or_else(|| ModelError::TypeNotFound {
            type_name: type_name.to_string(),
        })?;

    match definition {
        SchemaDefinition::Object(_)
        | SchemaDefinition::Interface(_)
        | SchemaDefinition::InputObject(_) => {}
        other => {
            return Err(ModelError::NotAFieldedType {
                type_name: type_name.to_string(),
                kind: other.kind(),
            })
        }
    }

    Ok(definition
        .fields()
        .values()
        .map(|field| ResolvedField {
            name: field.name.clone(),
            type_descriptor: resolve_type(&field.field_type, state),
            arguments: field
                .arguments
                .iter()
                .map(|argument| ResolvedArgument {
                    name: argument.name.clone(),
                    type_descriptor: resolve_type(&argument.value_type, state),
                })
                .collect(),
        })
        .collect())
}

/// Resolves every non-root object type of the schema.
#[instrument(level = "trace", skip(state))]
pub fn resolve_all_models(state: &SchemaState) -> Result<Vec<ResolvedModel<'_>>, ModelError> {
    let models = state
        .definitions
        .values()
        .filter(|definition| {
            matches!(definition, SchemaDefinition::Object(_))
                && definition.try_into_root_type().is_none()
        })
        .map(|definition| {
            Ok(ResolvedModel {
                name: definition.name().to_string(),
                kind: definition.kind(),
                fields: resolve_model_fields(state, definition.name())?,
            })
        })
        .collect::<Result<Vec<_>, ModelError>>()?;

    debug!(models = models.len(), "resolved schema models");

    Ok(models)
}
