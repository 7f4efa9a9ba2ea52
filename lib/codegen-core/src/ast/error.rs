use crate::state::schema_state::OperationKind;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Schema type '{type_name}' not found.")]
    SchemaTypeNotFound { type_name: String },

    #[error("Field '{field_name}' not found in type '{type_name}'.")]
    FieldNotFoundInType {
        field_name: String,
        type_name: String,
    },

    #[error("Schema has no root type for {operation_kind} operations.")]
    RootTypeNotDefined { operation_kind: OperationKind },

    #[error("Fragment '{fragment_name}' is defined more than once.")]
    DuplicateFragmentDefinition { fragment_name: String },
}
