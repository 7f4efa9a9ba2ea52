use std::{collections::HashSet, fmt::Display};

use graphql_parser::schema as input;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::{ast::type_node::TypeNode, utils::parsing::SchemaDocument};

static BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

type DefinitionMap = IndexMap<String, SchemaDefinition>;
type FieldMap = IndexMap<String, SchemaField>;

/// Lookup of named type definitions, the only schema access the type resolver needs.
pub trait TypeRegistry {
    fn lookup(&self, type_name: &str) -> Option<&SchemaDefinition>;
}

#[derive(Debug)]
pub struct SchemaState {
    /// All named definitions of the schema, in declaration order.
    pub definitions: DefinitionMap,
    /// A set of all known scalars in this schema, including built-ins
    pub known_scalars: HashSet<String>,
    /// The root entrypoints, when the schema declares them
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
}

impl TypeRegistry for SchemaState {
    fn lookup(&self, type_name: &str) -> Option<&SchemaDefinition> {
        self.definitions.get(type_name)
    }
}

impl SchemaState {
    #[instrument(level = "trace", skip(schema), name = "new_schema_state")]
    pub fn new(schema: &SchemaDocument) -> Self {
        let definitions = Self::build_map(schema);
        let (query_type, mutation_type, subscription_type) =
            Self::extract_root_types(schema, &definitions);

        let mut instance = Self {
            known_scalars: Self::extract_known_scalars(schema),
            definitions,
            query_type,
            mutation_type,
            subscription_type,
        };
        instance.mark_root_types();

        trace!(
            definitions = instance.definitions.len(),
            "schema state created"
        );

        instance
    }

    pub fn root_type_name(&self, kind: &OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => self.query_type.as_deref(),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn is_scalar_type(&self, type_name: &str) -> bool {
        if BUILTIN_SCALARS.contains(&type_name) {
            return true;
        }

        self.known_scalars.contains(type_name)
    }

    pub fn is_abstract_type(&self, type_name: &str) -> bool {
        self.definitions
            .get(type_name)
            .is_some_and(|def| def.is_abstract_type())
    }

    /// Concrete object types a value of `type_name` can have at runtime.
    pub fn possible_types(&self, type_name: &str) -> Vec<&str> {
        match self.definitions.get(type_name) {
            Some(SchemaDefinition::Object(object_type)) => vec![object_type.name.as_str()],
            Some(SchemaDefinition::Union(union_type)) => {
                union_type.types.iter().map(String::as_str).collect()
            }
            Some(SchemaDefinition::Interface(_)) => self
                .definitions
                .values()
                .filter_map(|def| match def {
                    SchemaDefinition::Object(object_type)
                        if object_type.implements.iter().any(|i| i == type_name) =>
                    {
                        Some(object_type.name.as_str())
                    }
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }

    /// True when every value typed `parent_type` is guaranteed to satisfy `type_condition`,
    /// so a fragment on `type_condition` needs no runtime check under `parent_type`.
    pub fn is_type_condition_implied(&self, parent_type: &str, type_condition: &str) -> bool {
        if parent_type == type_condition {
            return true;
        }

        let parent_possible = self.possible_types(parent_type);
        if parent_possible.is_empty() {
            return false;
        }

        let condition_possible = self.possible_types(type_condition);
        parent_possible
            .iter()
            .all(|possible| condition_possible.contains(possible))
    }

    fn extract_known_scalars(schema: &SchemaDocument) -> HashSet<String> {
        let mut set = HashSet::new();

        for def in schema.definitions.iter() {
            if let input::Definition::TypeDefinition(input::TypeDefinition::Scalar(scalar_type)) =
                def
            {
                set.insert(scalar_type.name.to_string());
            }
        }

        for builtin in BUILTIN_SCALARS {
            set.insert(builtin.to_string());
        }

        set
    }

    fn extract_root_types(
        schema: &SchemaDocument,
        definitions: &DefinitionMap,
    ) -> (Option<String>, Option<String>, Option<String>) {
        let schema_definition = schema.definitions.iter().find_map(|d| match d {
            input::Definition::SchemaDefinition(schema_def) => Some(schema_def),
            _ => None,
        });

        match schema_definition {
            Some(schema_def) => (
                schema_def.query.clone(),
                schema_def.mutation.clone(),
                schema_def.subscription.clone(),
            ),
            None => {
                let default_root = |name: &str| {
                    definitions
                        .get(name)
                        .filter(|def| matches!(def, SchemaDefinition::Object(_)))
                        .map(|_| name.to_string())
                };

                (
                    default_root("Query"),
                    default_root("Mutation"),
                    default_root("Subscription"),
                )
            }
        }
    }

    fn mark_root_types(&mut self) {
        let roots = [
            (self.query_type.clone(), OperationKind::Query),
            (self.mutation_type.clone(), OperationKind::Mutation),
            (self.subscription_type.clone(), OperationKind::Subscription),
        ];

        for (type_name, kind) in roots {
            if let Some(SchemaDefinition::Object(object_type)) = type_name
                .as_deref()
                .and_then(|name| self.definitions.get_mut(name))
            {
                object_type.root_type = Some(kind);
            }
        }
    }

    #[instrument(level = "trace", skip(schema))]
    fn build_map(schema: &SchemaDocument) -> DefinitionMap {
        schema
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                input::Definition::TypeDefinition(input::TypeDefinition::Object(object_type)) => {
                    Some((
                        object_type.name.to_string(),
                        SchemaDefinition::Object(Self::build_object_type(object_type)),
                    ))
                }
                input::Definition::TypeDefinition(input::TypeDefinition::Interface(
                    interface_type,
                )) => Some((
                    interface_type.name.to_string(),
                    SchemaDefinition::Interface(Self::build_interface_type(interface_type)),
                )),
                input::Definition::TypeDefinition(input::TypeDefinition::Enum(enum_type)) => {
                    Some((
                        enum_type.name.to_string(),
                        SchemaDefinition::Enum(SchemaEnumType {
                            name: enum_type.name.to_string(),
                            values: enum_type
                                .values
                                .iter()
                                .map(|value| value.name.to_string())
                                .collect(),
                        }),
                    ))
                }
                input::Definition::TypeDefinition(input::TypeDefinition::Union(union_type)) => {
                    Some((
                        union_type.name.to_string(),
                        SchemaDefinition::Union(SchemaUnionType {
                            name: union_type.name.to_string(),
                            types: union_type.types.clone(),
                        }),
                    ))
                }
                input::Definition::TypeDefinition(input::TypeDefinition::Scalar(scalar_type)) => {
                    Some((
                        scalar_type.name.to_string(),
                        SchemaDefinition::Scalar(SchemaScalarType {
                            name: scalar_type.name.to_string(),
                        }),
                    ))
                }
                input::Definition::TypeDefinition(input::TypeDefinition::InputObject(
                    input_object_type,
                )) => Some((
                    input_object_type.name.to_string(),
                    SchemaDefinition::InputObject(SchemaInputObjectType {
                        name: input_object_type.name.to_string(),
                        fields: Self::build_input_fields(&input_object_type.fields),
                    }),
                )),
                _ => None,
            })
            .collect()
    }

    #[instrument(level = "trace", skip(fields), fields(fields_count = fields.len()))]
    fn build_fields(fields: &[input::Field<'static, String>]) -> FieldMap {
        fields
            .iter()
            .map(|field| {
                (
                    field.name.to_string(),
                    SchemaField {
                        name: field.name.to_string(),
                        field_type: (&field.field_type).into(),
                        arguments: field
                            .arguments
                            .iter()
                            .map(|argument| SchemaArgument {
                                name: argument.name.to_string(),
                                value_type: (&argument.value_type).into(),
                            })
                            .collect(),
                        description: field.description.clone(),
                    },
                )
            })
            .collect()
    }

    #[instrument(level = "trace", skip(fields), fields(fields_count = fields.len()))]
    fn build_input_fields(fields: &[input::InputValue<'static, String>]) -> FieldMap {
        fields
            .iter()
            .map(|field| {
                (
                    field.name.to_string(),
                    SchemaField {
                        name: field.name.to_string(),
                        field_type: (&field.value_type).into(),
                        arguments: vec![],
                        description: field.description.clone(),
                    },
                )
            })
            .collect()
    }

    #[instrument(level = "trace", skip(interface_type), fields(name = interface_type.name))]
    fn build_interface_type(
        interface_type: &input::InterfaceType<'static, String>,
    ) -> SchemaInterfaceType {
        SchemaInterfaceType {
            name: interface_type.name.to_string(),
            fields: Self::build_fields(&interface_type.fields),
            implements: interface_type.implements_interfaces.clone(),
        }
    }

    #[instrument(level = "trace", skip(object_type), fields(name = object_type.name))]
    fn build_object_type(object_type: &input::ObjectType<'static, String>) -> SchemaObjectType {
        SchemaObjectType {
            name: object_type.name.to_string(),
            fields: Self::build_fields(&object_type.fields),
            implements: object_type.implements_interfaces.clone(),
            root_type: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "mutation")]
    Mutation,
    #[serde(rename = "subscription")]
    Subscription,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
            OperationKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// Kind of a named definition, as exposed to emitters.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Enum,
    Scalar,
    InputObject,
}

#[derive(Debug)]
pub enum SchemaDefinition {
    Object(SchemaObjectType),
    Interface(SchemaInterfaceType),
    Union(SchemaUnionType),
    Enum(SchemaEnumType),
    Scalar(SchemaScalarType),
    InputObject(SchemaInputObjectType),
}

#[derive(Debug)]
pub struct SchemaObjectType {
    pub name: String,
    pub fields: FieldMap,
    pub implements: Vec<String>,
    pub root_type: Option<OperationKind>,
}

#[derive(Debug)]
pub struct SchemaInterfaceType {
    pub name: String,
    pub fields: FieldMap,
    pub implements: Vec<String>,
}

#[derive(Debug)]
pub struct SchemaUnionType {
    pub name: String,
    pub types: Vec<String>,
}

#[derive(Debug)]
pub struct SchemaEnumType {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug)]
pub struct SchemaScalarType {
    pub name: String,
}

#[derive(Debug)]
pub struct SchemaInputObjectType {
    pub name: String,
    pub fields: FieldMap,
}

impl SchemaDefinition {
    pub fn name(&self) -> &str {
        match self {
            SchemaDefinition::Object(object_type) => &object_type.name,
            SchemaDefinition::Interface(interface_type) => &interface_type.name,
            SchemaDefinition::Union(union_type) => &union_type.name,
            SchemaDefinition::Enum(enum_type) => &enum_type.name,
            SchemaDefinition::Scalar(scalar_type) => &scalar_type.name,
            SchemaDefinition::InputObject(input_type) => &input_type.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            SchemaDefinition::Object(_) => TypeKind::Object,
            SchemaDefinition::Interface(_) => TypeKind::Interface,
            SchemaDefinition::Union(_) => TypeKind::Union,
            SchemaDefinition::Enum(_) => TypeKind::Enum,
            SchemaDefinition::Scalar(_) => TypeKind::Scalar,
            SchemaDefinition::InputObject(_) => TypeKind::InputObject,
        }
    }

    pub fn is_composite_type(&self) -> bool {
        matches!(
            self,
            SchemaDefinition::Object(_)
                | SchemaDefinition::Interface(_)
                | SchemaDefinition::Union(_)
        )
    }

    pub fn is_abstract_type(&self) -> bool {
        matches!(
            self,
            SchemaDefinition::Interface(_) | SchemaDefinition::Union(_)
        )
    }

    pub fn try_into_root_type(&self) -> Option<&OperationKind> {
        match self {
            SchemaDefinition::Object(object_type) => object_type.root_type.as_ref(),
            _ => None,
        }
    }

    /// Declared fields, in schema order. Empty for types without fields.
    pub fn fields(&self) -> &FieldMap {
        static EMPTY: std::sync::LazyLock<FieldMap> = std::sync::LazyLock::new(FieldMap::new);

        match self {
            SchemaDefinition::Object(object_type) => &object_type.fields,
            SchemaDefinition::Interface(interface_type) => &interface_type.fields,
            SchemaDefinition::InputObject(input_type) => &input_type.fields,
            SchemaDefinition::Union(_) | SchemaDefinition::Enum(_) | SchemaDefinition::Scalar(_) => {
                &EMPTY
            }
        }
    }
}

#[derive(Debug)]
pub struct SchemaField {
    pub name: String,
    pub field_type: TypeNode,
    pub arguments: Vec<SchemaArgument>,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct SchemaArgument {
    pub name: String,
    pub value_type: TypeNode,
}
