use std::error::Error;

use crate::{
    ast::conditions::BooleanCondition,
    merge::{
        collect_and_merge_fields, context::MergeContext, merge_field_lists,
        merged_field::DisplayFields, wrap_in_boolean_conditions_if_needed,
    },
    tests::testkit::{init_logger, merge_operation, with_compiled, PETS_SCHEMA},
};

#[test]
fn include_and_skip_variables() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query($withOwner: Boolean!, $noDog: Boolean!) {
            animal {
              name
              owner @include(if: $withOwner) { id }
              ... on Dog @skip(if: $noDog) { barks }
            }
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    animal {
      name
      owner [$withOwner] {
        id
      }
      barks [on Dog & !$noDog]
    }
    ");
    Ok(())
}

#[test]
fn variable_alternatives() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query($a: Boolean!, $b: Boolean!) {
            animal {
              name @include(if: $a)
              name @skip(if: $b)
              owner @include(if: $a) { id }
              owner { id }
            }
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    animal {
      name [$a | !$b]
      owner {
        id
      }
    }
    ");
    Ok(())
}

#[test]
fn conditional_spread() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query($withDog: Boolean!) {
            animal {
              ...DogFields @include(if: $withDog)
            }
          }

          fragment DogFields on Dog {
            barks
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    animal {
      barks [on Dog & $withDog]
    }
    ");
    Ok(())
}

#[test]
fn outer_variable_comes_before_inner_type_condition() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query($x: Boolean!) {
            animal {
              ... @include(if: $x) {
                ... on Dog { barks }
              }
            }
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    animal {
      barks [$x & on Dog]
    }
    ");
    Ok(())
}

#[test]
fn wrapping_fields_in_conditions() {
    init_logger();
    with_compiled(
        PETS_SCHEMA,
        "query($x: Boolean!) { animal { name ... on Dog @include(if: $x) { barks } } }",
        |state, compiled| {
            let operation = compiled.operation(None).expect("operation");
            let mut ctx = MergeContext::new(state, &compiled.fragments);
            let fields =
                collect_and_merge_fields(&mut ctx, &operation.selection_set).expect("merges");
            let animal_fields = fields[0].fields.as_deref().expect("animal sub-fields");

            let unchanged = wrap_in_boolean_conditions_if_needed(animal_fields, &[]);
            insta::assert_snapshot!(DisplayFields(&unchanged), @r"
            name
            barks [on Dog & $x]
            ");

            let wrapped = wrap_in_boolean_conditions_if_needed(
                animal_fields,
                &[BooleanCondition::on_type("Dog"), BooleanCondition::on_type("Cat")],
            );
            insta::assert_snapshot!(DisplayFields(&wrapped), @r"
            name [on Dog | on Cat]
            barks [on Dog & $x]
            ");
        },
    );
}

#[test]
fn merging_field_lists_of_several_operations() {
    init_logger();
    with_compiled(
        PETS_SCHEMA,
        r#"
          query A {
            animal { name }
          }

          query B {
            animal { ... on Dog { barks } }
            dog { breed }
          }
        "#,
        |state, compiled| {
            let lists = ["A", "B"]
                .into_iter()
                .map(|name| {
                    let operation = compiled.operation(Some(name)).expect("operation");
                    let mut ctx = MergeContext::new(state, &compiled.fragments);
                    collect_and_merge_fields(&mut ctx, &operation.selection_set).expect("merges")
                })
                .collect::<Vec<_>>();

            insta::assert_snapshot!(DisplayFields(&merge_field_lists(lists)), @r"
            animal {
              name
              barks [on Dog]
            }
            dog {
              breed
            }
            ");
            assert!(merge_field_lists(vec![]).is_empty());
        },
    );
}
