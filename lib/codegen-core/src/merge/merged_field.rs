use std::fmt::{Display, Formatter as FmtFormatter, Result as FmtResult};

use graphql_parser::query::Value;
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    ast::{conditions::BooleanCondition, selection_set::FieldSelection},
    type_info::TypeDescriptor,
    utils::pretty_display::{get_indent, PrettyDisplay},
};

/// A field of a merged selection: one entry per response key, with every
/// condition under which any of its occurrences was selected.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedField<'s> {
    pub response_key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip)]
    pub arguments: Vec<(String, Value<'static, String>)>,
    #[serde(rename = "type")]
    pub type_descriptor: TypeDescriptor<'s>,
    /// Alternatives (OR). Empty means the field is always present.
    pub conditions: Vec<BooleanCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<MergedField<'s>>>,
}

impl<'s> MergedField<'s> {
    pub(crate) fn from_selection(
        field: &FieldSelection<'s>,
        conditions: Vec<BooleanCondition>,
        fields: Option<Vec<MergedField<'s>>>,
    ) -> Self {
        MergedField {
            response_key: field.response_key().to_string(),
            name: field.name.clone(),
            alias: field.alias.clone(),
            arguments: field.arguments.clone(),
            type_descriptor: field.type_descriptor.clone(),
            conditions,
            fields,
        }
    }

    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Adds `conditions` as an outer requirement of this field.
    pub(crate) fn attach_conditions(mut self, conditions: &[BooleanCondition]) -> Self {
        if conditions.is_empty() {
            return self;
        }

        if self.conditions.is_empty() {
            self.conditions = conditions.to_vec();
            return self;
        }

        self.conditions = conjoin_conditions(conditions, &self.conditions);
        self
    }

    /// Folds another occurrence of the same response key into this one.
    ///
    /// Field data of the first occurrence is kept. Sub-selections are merged
    /// recursively; the sub-fields of an occurrence whose conditions differ
    /// from the merged ones are narrowed to that occurrence's conditions.
    pub(crate) fn merge_with(&mut self, other: MergedField<'s>) {
        let merged_conditions = union_conditions(&self.conditions, &other.conditions);

        let own_fields = self
            .fields
            .take()
            .map(|fields| narrow_if_diverged(fields, &self.conditions, &merged_conditions));
        let other_fields = other
            .fields
            .map(|fields| narrow_if_diverged(fields, &other.conditions, &merged_conditions));

        self.fields = match (own_fields, other_fields) {
            (Some(own), Some(other)) => {
                let mut grouped = group_by_response_key(own);
                for field in other {
                    upsert_field(&mut grouped, field);
                }
                Some(drop_implied_conditions(
                    grouped.into_values().collect(),
                    &merged_conditions,
                ))
            }
            (own, other) => own.or(other),
        };
        self.conditions = merged_conditions;
    }
}

pub(crate) fn group_by_response_key<'s>(
    fields: Vec<MergedField<'s>>,
) -> IndexMap<String, MergedField<'s>> {
    let mut grouped = IndexMap::with_capacity(fields.len());
    for field in fields {
        upsert_field(&mut grouped, field);
    }
    grouped
}

pub(crate) fn upsert_field<'s>(
    grouped: &mut IndexMap<String, MergedField<'s>>,
    field: MergedField<'s>,
) {
    match grouped.get_mut(&field.response_key) {
        Some(existing) => existing.merge_with(field),
        None => {
            grouped.insert(field.response_key.clone(), field);
        }
    }
}

fn push_unique(conditions: &mut Vec<BooleanCondition>, condition: BooleanCondition) {
    if !conditions.contains(&condition) {
        conditions.push(condition);
    }
}

/// AND of two OR-lists. An inner alternative that already contains every term
/// of some outer alternative implies `outer` and is kept as it is; the others
/// are paired with each outer alternative.
pub(crate) fn conjoin_conditions(
    outer: &[BooleanCondition],
    inner: &[BooleanCondition],
) -> Vec<BooleanCondition> {
    if outer.is_empty() {
        return inner.to_vec();
    }
    if inner.is_empty() {
        return outer.to_vec();
    }

    let mut combined = vec![];
    for own in inner {
        if outer.iter().any(|alternative| own.implies(alternative)) {
            push_unique(&mut combined, own.clone());
            continue;
        }

        for alternative in outer {
            push_unique(&mut combined, own.and(alternative));
        }
    }
    combined
}

/// OR of two condition lists. An unconditional side makes the result unconditional.
pub(crate) fn union_conditions(
    left: &[BooleanCondition],
    right: &[BooleanCondition],
) -> Vec<BooleanCondition> {
    if left.is_empty() || right.is_empty() {
        return vec![];
    }

    let mut union = left.to_vec();
    for condition in right {
        push_unique(&mut union, condition.clone());
    }
    union
}

fn same_conditions(left: &[BooleanCondition], right: &[BooleanCondition]) -> bool {
    left.len() == right.len() && left.iter().all(|condition| right.contains(condition))
}

fn narrow_if_diverged<'s>(
    fields: Vec<MergedField<'s>>,
    occurrence_conditions: &[BooleanCondition],
    merged_conditions: &[BooleanCondition],
) -> Vec<MergedField<'s>> {
    if same_conditions(occurrence_conditions, merged_conditions) {
        return fields;
    }

    fields
        .into_iter()
        .map(|field| field.attach_conditions(occurrence_conditions))
        .collect()
}

// A sub-field selected under exactly the parent's conditions is present whenever the parent is.
fn drop_implied_conditions<'s>(
    fields: Vec<MergedField<'s>>,
    parent_conditions: &[BooleanCondition],
) -> Vec<MergedField<'s>> {
    if parent_conditions.is_empty() {
        return fields;
    }

    fields
        .into_iter()
        .map(|mut field| {
            if same_conditions(&field.conditions, parent_conditions) {
                field.conditions.clear();
            }
            field
        })
        .collect()
}

impl PrettyDisplay for MergedField<'_> {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);

        write!(f, "{}", indent)?;
        if let Some(alias) = &self.alias {
            write!(f, "{}: ", alias)?;
        }
        write!(f, "{}", self.name)?;

        if self.is_conditional() {
            write!(
                f,
                " [{}]",
                self.conditions
                    .iter()
                    .map(|condition| condition.to_string())
                    .collect::<Vec<_>>()
                    .join(" | ")
            )?;
        }

        match &self.fields {
            Some(fields) => {
                writeln!(f, " {{")?;
                for field in fields {
                    field.pretty_fmt(f, depth + 1)?;
                }
                writeln!(f, "{}}}", indent)
            }
            None => writeln!(f),
        }
    }
}

impl Display for MergedField<'_> {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

/// Renders a merged field list, one field per line.
pub struct DisplayFields<'a, 's>(pub &'a [MergedField<'s>]);

impl Display for DisplayFields<'_, '_> {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        for field in self.0 {
            field.pretty_fmt(f, 0)?;
        }
        Ok(())
    }
}
