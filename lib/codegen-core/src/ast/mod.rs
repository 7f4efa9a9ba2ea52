pub mod conditions;
pub mod document;
pub mod error;
pub mod selection_set;
pub mod type_node;
