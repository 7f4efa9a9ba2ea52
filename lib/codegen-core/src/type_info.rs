use serde::Serialize;
use tracing::warn;

use crate::{
    ast::type_node::TypeNode,
    state::schema_state::{SchemaDefinition, TypeKind, TypeRegistry},
};

/// Flattened view of a type reference: the base named type plus the wrappers around it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor<'s> {
    pub base_type_name: String,
    /// Nullability of the value itself (the list, for list types).
    pub is_nullable: bool,
    pub is_list: bool,
    /// Nullability of the list items. Only meaningful when `is_list` is set.
    pub is_list_element_nullable: bool,
    #[serde(skip)]
    pub resolved_base_type: Option<&'s SchemaDefinition>,
}

impl<'s> TypeDescriptor<'s> {
    /// Descriptor for a reference that could not be understood.
    pub fn degenerate(raw: &str) -> Self {
        TypeDescriptor {
            base_type_name: raw.to_string(),
            is_nullable: false,
            is_list: false,
            is_list_element_nullable: false,
            resolved_base_type: None,
        }
    }

    pub fn base_type_kind(&self) -> Option<TypeKind> {
        self.resolved_base_type.map(SchemaDefinition::kind)
    }

    pub fn is_composite(&self) -> bool {
        self.resolved_base_type
            .is_some_and(SchemaDefinition::is_composite_type)
    }
}

impl PartialEq for TypeDescriptor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.base_type_name == other.base_type_name
            && self.is_nullable == other.is_nullable
            && self.is_list == other.is_list
            && self.is_list_element_nullable == other.is_list_element_nullable
    }
}

impl Eq for TypeDescriptor<'_> {}

/// Unwraps `List` / `NonNull` wrappers into a [`TypeDescriptor`].
///
/// A `NonNull` applies to whatever it wraps: around a list it makes the list
/// non-null, around a list's item type it makes the elements non-null.
pub fn resolve_type<'s, R: TypeRegistry + ?Sized>(
    node: &TypeNode,
    registry: &'s R,
) -> TypeDescriptor<'s> {
    match node {
        TypeNode::Named(name) => TypeDescriptor {
            base_type_name: name.clone(),
            is_nullable: true,
            is_list: false,
            is_list_element_nullable: false,
            resolved_base_type: registry.lookup(name),
        },
        TypeNode::NonNull(inner) => TypeDescriptor {
            is_nullable: false,
            ..resolve_type(inner, registry)
        },
        TypeNode::List(inner) => {
            let element = resolve_type(inner, registry);

            TypeDescriptor {
                is_list: true,
                is_list_element_nullable: element.is_nullable,
                is_nullable: true,
                ..element
            }
        }
    }
}

/// Like [`resolve_type`], for a type reference still in its textual form (`"[Post!]!"`).
/// Malformed input yields a degenerate descriptor instead of an error.
pub fn resolve_type_ref<'s, R: TypeRegistry + ?Sized>(
    raw: &str,
    registry: &'s R,
) -> TypeDescriptor<'s> {
    match TypeNode::try_from(raw) {
        Ok(node) => resolve_type(&node, registry),
        Err(reason) => {
            warn!(type_ref = raw, reason, "unable to parse type reference");
            TypeDescriptor::degenerate(raw)
        }
    }
}
