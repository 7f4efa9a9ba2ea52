use std::fmt::Display;

use graphql_parser::query::{Directive, Value};
use serde::Serialize;

/// A single requirement a runtime object (or the operation variables) must meet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConditionTerm {
    /// The concrete type of the object is, implements or belongs to `type_name`.
    #[serde(rename_all = "camelCase")]
    OnType { type_name: String },
    /// `@include(if: $variable_name)`, or `@skip(if: $variable_name)` when `inverted`.
    #[serde(rename_all = "camelCase")]
    Variable {
        variable_name: String,
        inverted: bool,
    },
}

impl Display for ConditionTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionTerm::OnType { type_name } => write!(f, "on {}", type_name),
            ConditionTerm::Variable {
                variable_name,
                inverted: false,
            } => write!(f, "${}", variable_name),
            ConditionTerm::Variable {
                variable_name,
                inverted: true,
            } => write!(f, "!${}", variable_name),
        }
    }
}

/// Conjunction of terms: the selection applies only when all of them hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct BooleanCondition {
    pub terms: Vec<ConditionTerm>,
}

impl BooleanCondition {
    pub fn new(terms: Vec<ConditionTerm>) -> Self {
        let mut condition = BooleanCondition::default();
        for term in terms {
            condition.push(term);
        }
        condition
    }

    pub fn on_type(type_name: impl Into<String>) -> Self {
        BooleanCondition {
            terms: vec![ConditionTerm::OnType {
                type_name: type_name.into(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn push(&mut self, term: ConditionTerm) {
        if !self.terms.contains(&term) {
            self.terms.push(term);
        }
    }

    /// True when every term of `other` is also a term of `self`.
    pub fn implies(&self, other: &BooleanCondition) -> bool {
        other.terms.iter().all(|term| self.terms.contains(term))
    }

    /// `outer AND self`, with `outer`'s terms first.
    pub fn and(&self, outer: &BooleanCondition) -> BooleanCondition {
        let mut combined = outer.clone();
        for term in &self.terms {
            combined.push(term.clone());
        }
        combined
    }
}

impl Display for BooleanCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.terms
                .iter()
                .map(|term| term.to_string())
                .collect::<Vec<_>>()
                .join(" & ")
        )
    }
}

/// What `@skip` / `@include` make of a selection.
#[derive(Debug, PartialEq, Eq)]
pub enum DirectiveConditions {
    /// Statically excluded, e.g. `@skip(if: true)`.
    Excluded,
    Terms(Vec<ConditionTerm>),
}

/// Reads `@skip(if:)` and `@include(if:)` from a selection's directives.
pub fn conditions_from_directives(directives: &[Directive<'_, String>]) -> DirectiveConditions {
    let mut terms = vec![];

    for directive in directives {
        let inverted = match directive.name.as_str() {
            "include" => false,
            "skip" => true,
            _ => continue,
        };

        let if_argument = directive
            .arguments
            .iter()
            .find_map(|(name, value)| (name == "if").then_some(value));

        match if_argument {
            Some(Value::Variable(variable_name)) => terms.push(ConditionTerm::Variable {
                variable_name: variable_name.clone(),
                inverted,
            }),
            // a literal that evaluates to "not included"
            Some(Value::Boolean(value)) if *value == inverted => {
                return DirectiveConditions::Excluded;
            }
            _ => {}
        }
    }

    DirectiveConditions::Terms(terms)
}
