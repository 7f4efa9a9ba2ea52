use std::error::Error;

use pretty_assertions::assert_eq;

use crate::{
    ast::conditions::{BooleanCondition, ConditionTerm},
    merge::{
        collect_and_merge_fields, collect_fragment_spreads, context::MergeContext,
        error::MergeError, FragmentReference,
    },
    tests::testkit::{init_logger, merge_operation, try_merge_operation, with_compiled, PETS_SCHEMA},
};

#[test]
fn opaque_spreads_contribute_no_fields() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = try_merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            ...QueryFields
          }

          fragment QueryFields on Query {
            dog { name }
          }
        "#,
        false,
    )?;

    assert_eq!(result, "");
    Ok(())
}

#[test]
fn opaque_spreads_keep_sibling_fields() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = try_merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            animal {
              name
              ...DogFields
            }
          }

          fragment DogFields on Dog {
            barks
          }
        "#,
        false,
    )?;

    insta::assert_snapshot!(result, @r"
    animal {
      name
    }
    ");
    Ok(())
}

#[test]
fn spread_on_parent_type_is_unconditional() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            ...QueryFields
          }

          fragment QueryFields on Query {
            dog { name }
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    dog {
      name
    }
    ");
    Ok(())
}

#[test]
fn spread_on_narrower_type_carries_its_condition() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            animal {
              ...AnimalFields
              ...DogFields
            }
            search(term: "rex") {
              ...AnimalFields
            }
          }

          fragment AnimalFields on Animal {
            name
          }

          fragment DogFields on Dog {
            barks
            name
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    animal {
      name
      barks [on Dog]
    }
    search {
      name [on Animal]
    }
    ");
    Ok(())
}

#[test]
fn nested_spreads() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            animals {
              ...AnimalFields
            }
          }

          fragment AnimalFields on Animal {
            name
            ...DogFields
            ... on Cat { meows }
          }

          fragment DogFields on Dog {
            breed
            owner { ...PersonFields }
          }

          fragment PersonFields on Person {
            id
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    animals {
      name
      breed [on Dog]
      owner [on Dog] {
        id
      }
      meows [on Cat]
    }
    ");
    Ok(())
}

#[test]
fn the_same_fragment_may_be_spread_twice() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            animal { ...DogFields ...DogFields }
            dog { ...DogFields }
          }

          fragment DogFields on Dog {
            barks
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    animal {
      barks [on Dog]
    }
    dog {
      barks
    }
    ");
    Ok(())
}

#[test]
fn object_fragment_under_interface_keeps_its_type_condition() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            animal {
              ...DogFields
            }
          }

          fragment DogFields on Dog {
            barks
            breed
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    animal {
      barks [on Dog]
      breed [on Dog]
    }
    ");
    Ok(())
}

#[test]
fn interface_fragment_under_implementing_object_is_unconditional() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            dog {
              ...AnimalFields
            }
          }

          fragment AnimalFields on Animal {
            name
          }
        "#,
    );

    insta::assert_snapshot!(result, @r"
    dog {
      name
    }
    ");
    Ok(())
}

#[test]
fn missing_fragment_definition() {
    init_logger();
    let result = try_merge_operation(
        PETS_SCHEMA,
        "{ animal { ...Missing } }",
        true,
    );

    assert_eq!(
        result,
        Err(MergeError::FragmentDefinitionNotFound {
            fragment_name: "Missing".to_string()
        })
    );
}

#[test]
fn missing_fragment_is_fine_when_spreads_stay_opaque() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = try_merge_operation(PETS_SCHEMA, "{ animal { ...Missing } }", false)?;

    insta::assert_snapshot!(result, @r"
    animal {
    }
    ");
    Ok(())
}

#[test]
fn fragment_cycles_are_reported() {
    init_logger();
    let result = try_merge_operation(
        PETS_SCHEMA,
        r#"
          query {
            dog { ...A }
          }

          fragment A on Dog {
            name
            ...B
          }

          fragment B on Dog {
            owner { id }
            ...A
          }
        "#,
        true,
    );

    let error = result.expect_err("cycle to be detected");
    assert_eq!(
        error,
        MergeError::FragmentCycle {
            chain: vec!["A".to_string(), "B".to_string(), "A".to_string()]
        }
    );
    assert_eq!(
        error.to_string(),
        "Fragment spreads form a cycle: A -> B -> A"
    );
}

#[test]
fn self_referencing_fragment() {
    init_logger();
    let result = try_merge_operation(
        PETS_SCHEMA,
        "{ person { ...P } } fragment P on Person { pets { owner { ...P } } }",
        true,
    );

    assert_eq!(
        result,
        Err(MergeError::FragmentCycle {
            chain: vec!["P".to_string(), "P".to_string()]
        })
    );
}

#[test]
fn depth_limit() {
    init_logger();
    with_compiled(
        PETS_SCHEMA,
        "{ person { pets { owner { id } } } }",
        |state, compiled| {
            let operation = compiled.operation(None).expect("operation");

            let mut shallow = MergeContext::new(state, &compiled.fragments).with_max_depth(2);
            assert_eq!(
                collect_and_merge_fields(&mut shallow, &operation.selection_set).map(|f| f.len()),
                Err(MergeError::DepthLimitExceeded { max_depth: 2 })
            );

            let mut deep_enough = MergeContext::new(state, &compiled.fragments).with_max_depth(4);
            assert_eq!(
                collect_and_merge_fields(&mut deep_enough, &operation.selection_set)
                    .map(|f| f.len()),
                Ok(1)
            );
        },
    );
}

#[test]
fn lists_fragment_spreads_with_their_conditions() {
    init_logger();
    with_compiled(
        PETS_SCHEMA,
        r#"
          query($withOwner: Boolean!) {
            search(term: "rex") {
              ...AnimalFields
              ... on Dog {
                ...DogFields
                ...AnimalFields
              }
              ... on Person {
                ...PersonFields @include(if: $withOwner)
              }
              ... on Cat {
                owner { ...PersonFields }
              }
            }
          }

          fragment AnimalFields on Animal { name }
          fragment DogFields on Dog { barks }
          fragment PersonFields on Person { id }
        "#,
        |state, compiled| {
            let operation = compiled.operation(None).expect("operation");
            let search = match &operation.selection_set.items[0] {
                crate::ast::selection_set::Selection::Field(field) => {
                    field.selection_set.as_ref().expect("search sub-selection")
                }
                _ => panic!("expected a field"),
            };

            assert_eq!(
                collect_fragment_spreads(state, &compiled.fragments, search),
                vec![
                    FragmentReference {
                        fragment_name: "AnimalFields".to_string(),
                        conditions: vec![
                            BooleanCondition::on_type("Animal"),
                            BooleanCondition::on_type("Dog"),
                        ],
                    },
                    FragmentReference {
                        fragment_name: "DogFields".to_string(),
                        conditions: vec![BooleanCondition::on_type("Dog")],
                    },
                    FragmentReference {
                        fragment_name: "PersonFields".to_string(),
                        conditions: vec![BooleanCondition::new(vec![
                            ConditionTerm::OnType {
                                type_name: "Person".to_string()
                            },
                            ConditionTerm::Variable {
                                variable_name: "withOwner".to_string(),
                                inverted: false,
                            },
                        ])],
                    },
                ]
            );
        },
    );
}

#[test]
fn listed_spreads_match_merged_conditions() {
    init_logger();
    let operation = r#"
      query($noAnimal: Boolean!) {
        search(term: "rex") {
          ...AnimalFields @skip(if: $noAnimal)
          ...Missing
        }
      }

      fragment AnimalFields on Animal { name }
    "#;

    with_compiled(PETS_SCHEMA, operation, |state, compiled| {
        let operation = compiled.operation(None).expect("operation");
        let search = match &operation.selection_set.items[0] {
            crate::ast::selection_set::Selection::Field(field) => {
                field.selection_set.as_ref().expect("search sub-selection")
            }
            _ => panic!("expected a field"),
        };

        let references = collect_fragment_spreads(state, &compiled.fragments, search);
        let rendered: Vec<(String, Vec<String>)> = references
            .iter()
            .map(|reference| {
                (
                    reference.fragment_name.clone(),
                    reference.conditions.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect();

        assert_eq!(
            rendered,
            vec![
                (
                    "AnimalFields".to_string(),
                    vec!["on Animal & !$noAnimal".to_string()]
                ),
                ("Missing".to_string(), vec![]),
            ]
        );
    });

    let merged = try_merge_operation(
        PETS_SCHEMA,
        &operation.replace("...Missing", ""),
        true,
    )
    .expect("merges");
    insta::assert_snapshot!(merged, @r"
    search {
      name [on Animal & !$noAnimal]
    }
    ");
}
