use std::fmt::Display;

use graphql_parser::schema as input;
use serde::{Deserialize, Serialize};

/// A type reference as written in the schema, wrappers included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TypeNode {
    List(Box<TypeNode>),
    NonNull(Box<TypeNode>),
    Named(String),
}

impl TypeNode {
    pub fn named(name: impl Into<String>) -> Self {
        TypeNode::Named(name.into())
    }

    pub fn list(inner: TypeNode) -> Self {
        TypeNode::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeNode) -> Self {
        TypeNode::NonNull(Box::new(inner))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeNode::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeNode::List(_) => true,
            TypeNode::NonNull(inner) => inner.as_ref().is_list(),
            TypeNode::Named(_) => false,
        }
    }

    pub fn inner_type(&self) -> &str {
        match self {
            TypeNode::List(inner) => inner.as_ref().inner_type(),
            TypeNode::NonNull(inner) => inner.as_ref().inner_type(),
            TypeNode::Named(name) => name,
        }
    }
}

impl Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::List(inner) => write!(f, "[{}]", inner),
            TypeNode::NonNull(inner) => write!(f, "{}!", inner),
            TypeNode::Named(name) => write!(f, "{}", name),
        }
    }
}

impl<'a, T: input::Text<'a>> From<&input::Type<'a, T>> for TypeNode {
    fn from(input_type: &input::Type<'a, T>) -> Self {
        match input_type {
            input::Type::ListType(inner) => TypeNode::List(Box::new(inner.as_ref().into())),
            input::Type::NonNullType(inner) => TypeNode::NonNull(Box::new(inner.as_ref().into())),
            input::Type::NamedType(name) => TypeNode::Named(name.as_ref().to_string()),
        }
    }
}

impl TryFrom<&str> for TypeNode {
    type Error = &'static str;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Input string for type parsing cannot be empty.");
        }

        if let Some(inner) = s.strip_suffix('!') {
            let inner_type = TypeNode::try_from(inner)?;
            if inner_type.is_non_null() {
                return Err("Type cannot be non-null twice");
            }
            return Ok(TypeNode::NonNull(Box::new(inner_type)));
        }

        if let Some(inner) = s.strip_prefix('[') {
            return match inner.strip_suffix(']') {
                Some(inner_content) => {
                    let inner_type = TypeNode::try_from(inner_content)?;
                    Ok(TypeNode::List(Box::new(inner_type)))
                }
                None => Err("Mismatched brackets in list type"),
            };
        }

        if s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !s.starts_with(|c: char| c.is_ascii_digit())
        {
            Ok(TypeNode::Named(s.to_string()))
        } else {
            Err("Invalid named type format")
        }
    }
}
