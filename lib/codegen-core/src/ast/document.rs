use graphql_parser::query as query_ast;
use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::{
    ast::{
        conditions::{conditions_from_directives, DirectiveConditions},
        error::CompileError,
        selection_set::{
            FieldSelection, FragmentSpreadSelection, InlineFragmentSelection, Selection,
            SelectionSet,
        },
        type_node::TypeNode,
    },
    state::schema_state::{OperationKind, SchemaState, TypeRegistry},
    type_info::resolve_type,
    utils::parsing::QueryDocument,
};

/// Named fragments by name, used to expand fragment spreads.
pub trait FragmentRegistry<'s> {
    fn resolve(&self, fragment_name: &str) -> Option<&FragmentDefinition<'s>>;
}

#[derive(Debug, Clone)]
pub struct FragmentDefinition<'s> {
    pub name: String,
    pub type_condition: String,
    pub selection_set: SelectionSet<'s>,
}

#[derive(Debug, Clone, Default)]
pub struct FragmentMap<'s> {
    fragments: IndexMap<String, FragmentDefinition<'s>>,
}

impl<'s> FragmentMap<'s> {
    pub fn insert(&mut self, fragment: FragmentDefinition<'s>) -> Result<(), CompileError> {
        if self.fragments.contains_key(&fragment.name) {
            return Err(CompileError::DuplicateFragmentDefinition {
                fragment_name: fragment.name,
            });
        }

        self.fragments.insert(fragment.name.clone(), fragment);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FragmentDefinition<'s>> {
        self.fragments.values()
    }
}

impl<'s> FragmentRegistry<'s> for FragmentMap<'s> {
    fn resolve(&self, fragment_name: &str) -> Option<&FragmentDefinition<'s>> {
        self.fragments.get(fragment_name)
    }
}

#[derive(Debug, Clone)]
pub struct Operation<'s> {
    pub name: Option<String>,
    pub kind: OperationKind,
    pub selection_set: SelectionSet<'s>,
}

/// An executable document whose selections are bound to schema types.
#[derive(Debug, Clone)]
pub struct CompiledDocument<'s> {
    pub operations: Vec<Operation<'s>>,
    pub fragments: FragmentMap<'s>,
}

impl<'s> CompiledDocument<'s> {
    #[instrument(level = "trace", skip_all, name = "compile_document")]
    pub fn compile(
        state: &'s SchemaState,
        document: &QueryDocument,
    ) -> Result<Self, CompileError> {
        let compiler = DocumentCompiler { state };
        let mut operations = vec![];
        let mut fragments = FragmentMap::default();

        for definition in &document.definitions {
            match definition {
                query_ast::Definition::Operation(op_def) => {
                    operations.push(compiler.compile_operation(op_def)?);
                }
                query_ast::Definition::Fragment(frag_def) => {
                    fragments.insert(compiler.compile_fragment(frag_def)?)?;
                }
            }
        }

        debug!(
            operations = operations.len(),
            fragments = fragments.len(),
            "document compiled"
        );

        Ok(CompiledDocument {
            operations,
            fragments,
        })
    }

    /// Finds an operation by name; `None` picks the only operation of the document.
    pub fn operation(&self, operation_name: Option<&str>) -> Option<&Operation<'s>> {
        match operation_name {
            Some(name) => self
                .operations
                .iter()
                .find(|op| op.name.as_deref() == Some(name)),
            None if self.operations.len() == 1 => self.operations.first(),
            None => None,
        }
    }
}

struct DocumentCompiler<'s> {
    state: &'s SchemaState,
}

impl<'s> DocumentCompiler<'s> {
    fn compile_operation(
        &self,
        op_def: &query_ast::OperationDefinition<'static, String>,
    ) -> Result<Operation<'s>, CompileError> {
        let (name, kind, selection_set) = match op_def {
            query_ast::OperationDefinition::SelectionSet(selection_set) => {
                (None, OperationKind::Query, selection_set)
            }
            query_ast::OperationDefinition::Query(query_ast::Query {
                name,
                selection_set,
                ..
            }) => (name.clone(), OperationKind::Query, selection_set),
            query_ast::OperationDefinition::Mutation(query_ast::Mutation {
                name,
                selection_set,
                ..
            }) => (name.clone(), OperationKind::Mutation, selection_set),
            query_ast::OperationDefinition::Subscription(query_ast::Subscription {
                name,
                selection_set,
                ..
            }) => (name.clone(), OperationKind::Subscription, selection_set),
        };

        let root_type_name =
            self.state
                .root_type_name(&kind)
                .ok_or(CompileError::RootTypeNotDefined {
                    operation_kind: kind,
                })?;

        Ok(Operation {
            name,
            kind,
            selection_set: self.compile_selection_set(root_type_name, selection_set)?,
        })
    }

    fn compile_fragment(
        &self,
        frag_def: &query_ast::FragmentDefinition<'static, String>,
    ) -> Result<FragmentDefinition<'s>, CompileError> {
        let type_condition = extract_type_condition(&frag_def.type_condition);
        let selection_set = self.compile_selection_set(&type_condition, &frag_def.selection_set)?;

        Ok(FragmentDefinition {
            name: frag_def.name.clone(),
            type_condition,
            selection_set,
        })
    }

    fn compile_selection_set(
        &self,
        parent_type: &str,
        selection_set: &query_ast::SelectionSet<'static, String>,
    ) -> Result<SelectionSet<'s>, CompileError> {
        let mut compiled = SelectionSet::new(parent_type);

        for selection in &selection_set.items {
            let directives = match selection {
                query_ast::Selection::Field(field) => &field.directives,
                query_ast::Selection::FragmentSpread(spread) => &spread.directives,
                query_ast::Selection::InlineFragment(fragment) => &fragment.directives,
            };
            let conditions = match conditions_from_directives(directives) {
                DirectiveConditions::Excluded => continue,
                DirectiveConditions::Terms(terms) => terms,
            };

            let item = match selection {
                query_ast::Selection::Field(field) => {
                    let mut compiled_field = self.compile_field(parent_type, field)?;
                    compiled_field.conditions = conditions;
                    Selection::Field(compiled_field)
                }
                query_ast::Selection::FragmentSpread(spread) => {
                    Selection::FragmentSpread(FragmentSpreadSelection {
                        fragment_name: spread.fragment_name.clone(),
                        conditions,
                    })
                }
                query_ast::Selection::InlineFragment(fragment) => {
                    let type_condition = fragment.type_condition.as_ref().map(extract_type_condition);
                    let nested_parent = type_condition.as_deref().unwrap_or(parent_type);

                    Selection::InlineFragment(InlineFragmentSelection {
                        selection_set: self
                            .compile_selection_set(nested_parent, &fragment.selection_set)?,
                        type_condition,
                        conditions,
                    })
                }
            };

            compiled.items.push(item);
        }

        Ok(compiled)
    }

    fn compile_field(
        &self,
        parent_type: &str,
        field: &query_ast::Field<'static, String>,
    ) -> Result<FieldSelection<'s>, CompileError> {
        let type_descriptor = if field.name == "__typename" {
            resolve_type(&TypeNode::non_null(TypeNode::named("String")), self.state)
        } else {
            let parent_def =
                self.state
                    .lookup(parent_type)
                    .ok_or_else(|| CompileError::SchemaTypeNotFound {
                        type_name: parent_type.to_string(),
                    })?;
            let field_def = parent_def.fields().get(&field.name).ok_or_else(|| {
                CompileError::FieldNotFoundInType {
                    field_name: field.name.clone(),
                    type_name: parent_type.to_string(),
                }
            })?;

            resolve_type(&field_def.field_type, self.state)
        };

        let selection_set = if field.selection_set.items.is_empty() {
            None
        } else {
            Some(self.compile_selection_set(&type_descriptor.base_type_name, &field.selection_set)?)
        };

        Ok(FieldSelection {
            name: field.name.clone(),
            alias: field.alias.clone(),
            arguments: field.arguments.clone(),
            type_descriptor,
            conditions: vec![],
            selection_set,
        })
    }
}

fn extract_type_condition(type_condition: &query_ast::TypeCondition<'static, String>) -> String {
    match type_condition {
        query_ast::TypeCondition::On(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parsing::{parse_operation, parse_schema};

    const SCHEMA: &str = r#"
      interface Animal { name: String owner: Person }
      type Dog implements Animal { name: String owner: Person barks: Boolean }
      type Cat implements Animal { name: String owner: Person meows: Boolean }
      type Person { id: ID! name: String pets: [Animal!] }
      type Query { animals: [Animal] person(id: ID!): Person }
      type Mutation { adopt(id: ID!): Animal }
    "#;

    #[test]
    fn compiles_operations_and_fragments() {
        let state = SchemaState::new(&parse_schema(SCHEMA));
        let document = parse_operation(
            r#"
              query Pets($withOwner: Boolean!) {
                animals {
                  name
                  ... on Dog { barks }
                  ...OwnerFields @include(if: $withOwner)
                  __typename
                }
              }

              fragment OwnerFields on Animal {
                owner { id name }
              }
            "#,
        );

        let compiled = CompiledDocument::compile(&state, &document).expect("compiles");
        let operation = compiled.operation(None).expect("single operation");

        assert_eq!(operation.name.as_deref(), Some("Pets"));
        assert_eq!(operation.kind, OperationKind::Query);
        assert_eq!(operation.selection_set.type_name, "Query");
        insta::assert_snapshot!(operation.selection_set.to_string(), @r"
        animals {
          name
          ... on Dog {
            barks
          }
          ...OwnerFields @include(if: $withOwner)
          __typename
        }
        ");

        let fragment = compiled.fragments.resolve("OwnerFields").expect("fragment");
        assert_eq!(fragment.type_condition, "Animal");
        assert_eq!(fragment.selection_set.type_name, "Animal");
    }

    #[test]
    fn annotates_fields_with_their_types() {
        let state = SchemaState::new(&parse_schema(SCHEMA));
        let document = parse_operation("{ person(id: \"1\") { id pets { name } } }");
        let compiled = CompiledDocument::compile(&state, &document).expect("compiles");

        let person = match &compiled.operations[0].selection_set.items[0] {
            Selection::Field(field) => field,
            _ => panic!("expected a field"),
        };
        assert_eq!(person.type_descriptor.base_type_name, "Person");
        assert!(person.type_descriptor.is_nullable);
        assert_eq!(person.arguments.len(), 1);

        let person_selections = person.selection_set.as_ref().expect("sub-selection");
        assert_eq!(person_selections.type_name, "Person");

        let pets = match &person_selections.items[1] {
            Selection::Field(field) => field,
            _ => panic!("expected a field"),
        };
        assert!(pets.type_descriptor.is_list);
        assert!(!pets.type_descriptor.is_list_element_nullable);
        assert_eq!(
            pets.selection_set.as_ref().map(|s| s.type_name.as_str()),
            Some("Animal")
        );
    }

    #[test]
    fn statically_skipped_selections_are_dropped() {
        let state = SchemaState::new(&parse_schema(SCHEMA));
        let document = parse_operation(
            "{ animals { name @skip(if: true) ... on Dog @include(if: false) { barks } owner @include(if: true) { id } } }",
        );
        let compiled = CompiledDocument::compile(&state, &document).expect("compiles");

        insta::assert_snapshot!(compiled.operations[0].selection_set.to_string(), @r"
        animals {
          owner {
            id
          }
        }
        ");
    }

    #[test]
    fn mutations_use_the_mutation_root() {
        let state = SchemaState::new(&parse_schema(SCHEMA));
        let document = parse_operation("mutation Adopt { adopt(id: 1) { name } }");
        let compiled = CompiledDocument::compile(&state, &document).expect("compiles");

        let operation = compiled.operation(Some("Adopt")).expect("operation");
        assert_eq!(operation.kind, OperationKind::Mutation);
        assert_eq!(operation.selection_set.type_name, "Mutation");
    }

    #[test]
    fn unknown_fields_and_roots_are_errors() {
        let state = SchemaState::new(&parse_schema(SCHEMA));

        let unknown_field = CompiledDocument::compile(&state, &parse_operation("{ animals { tail } }"));
        assert!(matches!(
            unknown_field,
            Err(CompileError::FieldNotFoundInType { ref field_name, ref type_name })
                if field_name == "tail" && type_name == "Animal"
        ));

        let no_subscription_root = CompiledDocument::compile(
            &state,
            &parse_operation("subscription { animals { name } }"),
        );
        assert!(matches!(
            no_subscription_root,
            Err(CompileError::RootTypeNotDefined {
                operation_kind: OperationKind::Subscription
            })
        ));

        let duplicated = CompiledDocument::compile(
            &state,
            &parse_operation("fragment A on Dog { barks } fragment A on Cat { meows }"),
        );
        assert!(matches!(
            duplicated,
            Err(CompileError::DuplicateFragmentDefinition { ref fragment_name }) if fragment_name == "A"
        ));
    }
}
