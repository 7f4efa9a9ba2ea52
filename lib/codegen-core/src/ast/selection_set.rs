use std::fmt::{Display, Formatter as FmtFormatter, Result as FmtResult};

use graphql_parser::query::Value;

use crate::{
    ast::conditions::ConditionTerm,
    type_info::TypeDescriptor,
    utils::pretty_display::{get_indent, PrettyDisplay},
};

/// Selections made on one parent type.
#[derive(Debug, Clone)]
pub struct SelectionSet<'s> {
    /// The type the selections are made on: a field's base type, or a fragment's type condition.
    pub type_name: String,
    pub items: Vec<Selection<'s>>,
}

#[derive(Debug, Clone)]
pub enum Selection<'s> {
    Field(FieldSelection<'s>),
    FragmentSpread(FragmentSpreadSelection),
    InlineFragment(InlineFragmentSelection<'s>),
}

#[derive(Debug, Clone)]
pub struct FieldSelection<'s> {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Vec<(String, Value<'static, String>)>,
    pub type_descriptor: TypeDescriptor<'s>,
    /// Terms from `@include` / `@skip`; empty when the field is always selected.
    pub conditions: Vec<ConditionTerm>,
    pub selection_set: Option<SelectionSet<'s>>,
}

#[derive(Debug, Clone)]
pub struct FragmentSpreadSelection {
    pub fragment_name: String,
    pub conditions: Vec<ConditionTerm>,
}

#[derive(Debug, Clone)]
pub struct InlineFragmentSelection<'s> {
    pub type_condition: Option<String>,
    pub conditions: Vec<ConditionTerm>,
    pub selection_set: SelectionSet<'s>,
}

impl<'s> SelectionSet<'s> {
    pub fn new(type_name: impl Into<String>) -> Self {
        SelectionSet {
            type_name: type_name.into(),
            items: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FieldSelection<'_> {
    /// The key the field is returned under: the alias if there is one, the name otherwise.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_leaf(&self) -> bool {
        self.selection_set.is_none()
    }
}

fn fmt_directive_terms(f: &mut FmtFormatter<'_>, conditions: &[ConditionTerm]) -> FmtResult {
    for term in conditions {
        match term {
            ConditionTerm::Variable {
                variable_name,
                inverted,
            } => {
                let directive = if *inverted { "skip" } else { "include" };
                write!(f, " @{}(if: ${})", directive, variable_name)?;
            }
            ConditionTerm::OnType { .. } => {}
        }
    }

    Ok(())
}

impl PrettyDisplay for SelectionSet<'_> {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        for item in &self.items {
            item.pretty_fmt(f, depth)?;
        }

        Ok(())
    }
}

impl PrettyDisplay for Selection<'_> {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);

        match self {
            Selection::Field(field) => {
                write!(f, "{}", indent)?;
                if let Some(alias) = &field.alias {
                    write!(f, "{}: ", alias)?;
                }
                write!(f, "{}", field.name)?;
                fmt_directive_terms(f, &field.conditions)?;

                match &field.selection_set {
                    Some(selection_set) => {
                        writeln!(f, " {{")?;
                        selection_set.pretty_fmt(f, depth + 1)?;
                        writeln!(f, "{}}}", indent)
                    }
                    None => writeln!(f),
                }
            }
            Selection::FragmentSpread(spread) => {
                write!(f, "{}...{}", indent, spread.fragment_name)?;
                fmt_directive_terms(f, &spread.conditions)?;
                writeln!(f)
            }
            Selection::InlineFragment(fragment) => {
                write!(f, "{}...", indent)?;
                if let Some(type_condition) = &fragment.type_condition {
                    write!(f, " on {}", type_condition)?;
                }
                fmt_directive_terms(f, &fragment.conditions)?;
                writeln!(f, " {{")?;
                fragment.selection_set.pretty_fmt(f, depth + 1)?;
                writeln!(f, "{}}}", indent)
            }
        }
    }
}

impl Display for SelectionSet<'_> {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}
