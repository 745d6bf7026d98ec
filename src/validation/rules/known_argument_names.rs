use std::collections::HashMap;

use crate::{
    ast::{
        Definition, Directive, Document, Field, InputValue, TypeSystemDefinition,
    },
    parser::Spanning,
    util,
    validation::{ValidatorContext, Visitor},
};

#[derive(Clone)]
enum ArgumentPosition<'a> {
    Directive(&'a str, Vec<String>),
    Field(&'a str, String, Vec<String>),
}

/// Checks that named arguments are declared by the field or directive they
/// are attached to.
pub struct KnownArgumentNames<'a> {
    current_args: Option<ArgumentPosition<'a>>,
    directive_definitions: HashMap<&'a str, Vec<String>>,
}

pub fn factory<'a>() -> KnownArgumentNames<'a> {
    KnownArgumentNames {
        current_args: None,
        directive_definitions: HashMap::new(),
    }
}

/// The SDL flavor of this rule: argument names on directives attached to
/// type-system definitions, validated against built-in and
/// document-defined directives.
pub fn on_directives_factory<'a>() -> KnownArgumentNames<'a> {
    factory()
}

impl<'a> Visitor<'a> for KnownArgumentNames<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        for def in doc {
            if let Definition::TypeSystem(TypeSystemDefinition::Directive(d)) = def {
                self.directive_definitions.insert(
                    d.item.name.item,
                    d.item
                        .arguments
                        .iter()
                        .map(|a| a.item.name.item.to_owned())
                        .collect(),
                );
            }
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        let name = directive.item.name.item;
        let known_args = ctx
            .schema
            .directive_by_name(name)
            .map(|d| d.arguments.iter().map(|a| a.name.to_string()).collect())
            .or_else(|| self.directive_definitions.get(name).cloned());

        if let Some(known_args) = known_args {
            self.current_args = Some(ArgumentPosition::Directive(name, known_args));
        }
    }

    fn exit_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive<'a>>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        if let Some(parent_type) = ctx.parent_type() {
            if let Some(field_meta) = ctx.schema.lookup_field(parent_type, field.item.name.item) {
                self.current_args = Some(ArgumentPosition::Field(
                    field.item.name.item,
                    parent_type.name().to_string(),
                    field_meta
                        .arguments
                        .iter()
                        .map(|a| a.name.to_string())
                        .collect(),
                ));
            }
        }
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, _): &'a (Spanning<&'a str>, Spanning<InputValue>),
    ) {
        let Some(position) = &self.current_args else {
            return;
        };

        let (known, error) = match position {
            ArgumentPosition::Directive(directive_name, known) => (
                known,
                directive_error_message(
                    arg_name.item,
                    directive_name,
                    &util::did_you_mean(&util::suggestion_list(
                        arg_name.item,
                        known.iter().map(String::as_str),
                    )),
                ),
            ),
            ArgumentPosition::Field(field_name, type_name, known) => (
                known,
                field_error_message(
                    arg_name.item,
                    field_name,
                    type_name,
                    &util::did_you_mean(&util::suggestion_list(
                        arg_name.item,
                        known.iter().map(String::as_str),
                    )),
                ),
            ),
        };

        if !known.iter().any(|name| name == arg_name.item) {
            ctx.report_error(&error, &[arg_name.span.start]);
        }
    }
}

fn field_error_message(
    arg_name: &str,
    field_name: &str,
    type_name: &str,
    suggestion: &str,
) -> String {
    format!(
        "Unknown argument \"{arg_name}\" on field \"{type_name}.{field_name}\".{suggestion}"
    )
}

fn directive_error_message(arg_name: &str, directive_name: &str, suggestion: &str) -> String {
    format!("Unknown argument \"{arg_name}\" on directive \"@{directive_name}\".{suggestion}")
}

#[cfg(test)]
mod tests {
    use super::{directive_error_message, factory, field_error_message};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn single_arg_is_known() {
        expect_passes_rule(
            factory,
            r#"
          fragment argOnRequiredArg on Dog {
            doesKnowCommand(dogCommand: SIT)
          }
        "#,
        );
    }

    #[test]
    fn multiple_args_are_known() {
        expect_passes_rule(
            factory,
            r#"
          fragment multipleArgs on ComplicatedArgs {
            multipleReqs(req1: 1, req2: 2)
          }
        "#,
        );
    }

    #[test]
    fn ignores_args_of_unknown_fields() {
        expect_passes_rule(
            factory,
            r#"
          fragment argOnUnknownField on Dog {
            unknownField(unknownArg: SIT)
          }
        "#,
        );
    }

    #[test]
    fn multiple_args_in_reverse_order_are_known() {
        expect_passes_rule(
            factory,
            r#"
          fragment multipleArgsReverseOrder on ComplicatedArgs {
            multipleReqs(req2: 2, req1: 1)
          }
        "#,
        );
    }

    #[test]
    fn no_args_on_optional_arg() {
        expect_passes_rule(
            factory,
            r#"
          fragment noArgOnOptionalArg on Dog {
            isHousetrained
          }
        "#,
        );
    }

    #[test]
    fn args_are_known_deeply() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              doesKnowCommand(dogCommand: SIT)
            }
            human(id: 4) {
              pets {
                ... on Dog {
                  doesKnowCommand(dogCommand: SIT)
                }
              }
            }
          }
        "#,
        );
    }

    #[test]
    fn directive_args_are_known() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog @skip(if: true)
          }
        "#,
        );
    }

    #[test]
    fn undirective_args_are_invalid() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog @skip(unless: true)
          }
        "#,
            &[RuleError::new(
                &directive_error_message("unless", "skip", ""),
                &[SourcePosition::new(35, 2, 22)],
            )],
        );
    }

    #[test]
    fn misspelled_directive_args_are_reported_with_suggestion() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog @include(IF: true) {
              name
            }
          }
        "#,
            &[RuleError::new(
                &directive_error_message("IF", "include", " Did you mean \"if\"?"),
                &[SourcePosition::new(38, 2, 25)],
            )],
        );
    }

    #[test]
    fn invalid_arg_name() {
        expect_fails_rule(
            factory,
            r#"
          fragment invalidArgName on Dog {
            doesKnowCommand(unknown: true)
          }
        "#,
            &[RuleError::new(
                &field_error_message("unknown", "doesKnowCommand", "Dog", ""),
                &[SourcePosition::new(72, 2, 28)],
            )],
        );
    }

    #[test]
    fn misspelled_arg_name_is_reported_with_suggestion() {
        expect_fails_rule(
            factory,
            r#"
          fragment invalidArgName on Dog {
            doesKnowCommand(DogCommand: true)
          }
        "#,
            &[RuleError::new(
                &field_error_message(
                    "DogCommand",
                    "doesKnowCommand",
                    "Dog",
                    " Did you mean \"dogCommand\"?",
                ),
                &[SourcePosition::new(72, 2, 28)],
            )],
        );
    }

    #[test]
    fn unknown_args_amongst_known_args() {
        expect_fails_rule(
            factory,
            r#"
          fragment oneGoodArgOneInvalidArg on Dog {
            doesKnowCommand(whoknows: 1, dogCommand: SIT, unknown: true)
          }
        "#,
            &[
                RuleError::new(
                    &field_error_message("whoknows", "doesKnowCommand", "Dog", ""),
                    &[SourcePosition::new(81, 2, 28)],
                ),
                RuleError::new(
                    &field_error_message("unknown", "doesKnowCommand", "Dog", ""),
                    &[SourcePosition::new(111, 2, 58)],
                ),
            ],
        );
    }

    #[test]
    fn unknown_args_deeply() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog {
              doesKnowCommand(unknown: true)
            }
            human(id: 4) {
              pets {
                ... on Dog {
                  doesKnowCommand(unknown: true)
                }
              }
            }
          }
        "#,
            &[
                RuleError::new(
                    &field_error_message("unknown", "doesKnowCommand", "Dog", ""),
                    &[SourcePosition::new(61, 3, 30)],
                ),
                RuleError::new(
                    &field_error_message("unknown", "doesKnowCommand", "Dog", ""),
                    &[SourcePosition::new(201, 8, 34)],
                ),
            ],
        );
    }
}
