use indexmap::IndexMap;
use serde::Serialize;
use tracing::{instrument, trace};

pub mod context;
pub mod error;
pub mod merged_field;

use crate::{
    ast::{
        conditions::{BooleanCondition, ConditionTerm},
        document::FragmentRegistry,
        selection_set::{Selection, SelectionSet},
    },
    state::schema_state::SchemaState,
};
use context::MergeContext;
use error::MergeError;
use merged_field::{
    conjoin_conditions, group_by_response_key, union_conditions, upsert_field, MergedField,
};

/// Flattens a selection set into one field per response key.
///
/// Fields reached through inline fragments and (when enabled) fragment spreads
/// carry the type conditions and `@include`/`@skip` variables they were
/// selected under. Output order is the first-occurrence order of a pre-order
/// walk of the selection set.
#[instrument(level = "trace", skip_all, fields(parent_type = %selection_set.type_name))]
pub fn collect_and_merge_fields<'s>(
    ctx: &mut MergeContext<'_, 's>,
    selection_set: &SelectionSet<'s>,
) -> Result<Vec<MergedField<'s>>, MergeError> {
    collect_fields(ctx, selection_set).map(|grouped| grouped.into_values().collect())
}

/// Returns copies of `fields` that only apply when one of `conditions` holds.
/// Empty `conditions` leave the fields as they are.
pub fn wrap_in_boolean_conditions_if_needed<'s>(
    fields: &[MergedField<'s>],
    conditions: &[BooleanCondition],
) -> Vec<MergedField<'s>> {
    if conditions.is_empty() {
        return fields.to_vec();
    }

    fields
        .iter()
        .cloned()
        .map(|field| field.attach_conditions(conditions))
        .collect()
}

fn collect_fields<'s>(
    ctx: &mut MergeContext<'_, 's>,
    selection_set: &SelectionSet<'s>,
) -> Result<IndexMap<String, MergedField<'s>>, MergeError> {
    ctx.enter_selection_set()?;
    let result = visit_selection_set(ctx, selection_set);
    ctx.leave_selection_set();
    result
}

fn visit_selection_set<'s>(
    ctx: &mut MergeContext<'_, 's>,
    selection_set: &SelectionSet<'s>,
) -> Result<IndexMap<String, MergedField<'s>>, MergeError> {
    let mut grouped: IndexMap<String, MergedField<'s>> = IndexMap::new();

    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                let fields = match &field.selection_set {
                    Some(nested) => Some(collect_fields(ctx, nested)?.into_values().collect()),
                    None => None,
                };
                let conditions = as_condition_list(field.conditions.clone());

                upsert_field(
                    &mut grouped,
                    MergedField::from_selection(field, conditions, fields),
                );
            }
            Selection::InlineFragment(fragment) => {
                let conditions = fragment_conditions(
                    ctx.schema,
                    &selection_set.type_name,
                    fragment.type_condition.as_deref(),
                    &fragment.conditions,
                );
                let fields = collect_fields(ctx, &fragment.selection_set)?;

                for field in fields.into_values() {
                    upsert_field(&mut grouped, field.attach_conditions(&conditions));
                }
            }
            Selection::FragmentSpread(spread) => {
                if !ctx.merge_fragment_spreads {
                    trace!(fragment = %spread.fragment_name, "leaving fragment spread opaque");
                    continue;
                }

                let fragments = ctx.fragments;
                let fragment = fragments.resolve(&spread.fragment_name).ok_or_else(|| {
                    MergeError::FragmentDefinitionNotFound {
                        fragment_name: spread.fragment_name.clone(),
                    }
                })?;
                trace!(
                    fragment = %fragment.name,
                    on = %fragment.type_condition,
                    "merging fragment spread"
                );

                let conditions = fragment_conditions(
                    ctx.schema,
                    &selection_set.type_name,
                    Some(&fragment.type_condition),
                    &spread.conditions,
                );

                ctx.enter_fragment(&fragment.name)?;
                let fields = collect_fields(ctx, &fragment.selection_set);
                ctx.leave_fragment();

                for field in fields?.into_values() {
                    upsert_field(&mut grouped, field.attach_conditions(&conditions));
                }
            }
        }
    }

    Ok(grouped)
}

/// A fragment spread left unexpanded, with the conditions it was reached under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentReference {
    pub fragment_name: String,
    pub conditions: Vec<BooleanCondition>,
}

/// Lists the fragment spreads of a selection set, looking through inline
/// fragments but not into sub-selections of fields.
///
/// Each reference carries the same conditions its fields would get if the
/// spread were merged: the fragment's type condition (unless implied) and
/// the `@include`/`@skip` terms around it. A spread of an unknown fragment
/// only carries the latter.
pub fn collect_fragment_spreads<'s>(
    schema: &SchemaState,
    fragments: &dyn FragmentRegistry<'s>,
    selection_set: &SelectionSet<'s>,
) -> Vec<FragmentReference> {
    let mut references: IndexMap<String, FragmentReference> = IndexMap::new();
    visit_fragment_spreads(schema, fragments, selection_set, &[], &mut references);
    references.into_values().collect()
}

fn visit_fragment_spreads<'s>(
    schema: &SchemaState,
    fragments: &dyn FragmentRegistry<'s>,
    selection_set: &SelectionSet<'s>,
    outer_conditions: &[BooleanCondition],
    references: &mut IndexMap<String, FragmentReference>,
) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(_) => {}
            Selection::InlineFragment(fragment) => {
                let conditions = fragment_conditions(
                    schema,
                    &selection_set.type_name,
                    fragment.type_condition.as_deref(),
                    &fragment.conditions,
                );
                visit_fragment_spreads(
                    schema,
                    fragments,
                    &fragment.selection_set,
                    &conjoin_conditions(outer_conditions, &conditions),
                    references,
                );
            }
            Selection::FragmentSpread(spread) => {
                let type_condition = fragments
                    .resolve(&spread.fragment_name)
                    .map(|fragment| fragment.type_condition.as_str());
                let own = fragment_conditions(
                    schema,
                    &selection_set.type_name,
                    type_condition,
                    &spread.conditions,
                );
                let conditions = conjoin_conditions(outer_conditions, &own);

                match references.get_mut(&spread.fragment_name) {
                    Some(existing) => {
                        existing.conditions = union_conditions(&existing.conditions, &conditions);
                    }
                    None => {
                        references.insert(
                            spread.fragment_name.clone(),
                            FragmentReference {
                                fragment_name: spread.fragment_name.clone(),
                                conditions,
                            },
                        );
                    }
                }
            }
        }
    }
}

fn as_condition_list(terms: Vec<ConditionTerm>) -> Vec<BooleanCondition> {
    if terms.is_empty() {
        vec![]
    } else {
        vec![BooleanCondition::new(terms)]
    }
}

/// Conditions a fragment adds to its fields. The type condition is left out
/// when every possible type of the parent already satisfies it.
fn fragment_conditions(
    schema: &SchemaState,
    parent_type: &str,
    type_condition: Option<&str>,
    directive_terms: &[ConditionTerm],
) -> Vec<BooleanCondition> {
    let mut terms = vec![];

    if let Some(type_name) = type_condition {
        if !schema.is_type_condition_implied(parent_type, type_name) {
            terms.push(ConditionTerm::OnType {
                type_name: type_name.to_string(),
            });
        }
    }
    terms.extend(directive_terms.iter().cloned());

    as_condition_list(terms)
}

/// Merges the sub-selections of several field lists into one, for callers
/// that assemble a model from more than one selection set.
pub fn merge_field_lists<'s>(lists: Vec<Vec<MergedField<'s>>>) -> Vec<MergedField<'s>> {
    let mut lists = lists.into_iter();
    let mut grouped = match lists.next() {
        Some(first) => group_by_response_key(first),
        None => return vec![],
    };

    for list in lists {
        for field in list {
            upsert_field(&mut grouped, field);
        }
    }

    grouped.into_values().collect()
}
