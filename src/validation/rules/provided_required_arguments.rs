use std::collections::HashMap;

use crate::{
    ast::{Definition, Directive, Document, Field, Type, TypeSystemDefinition},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

/// Checks that every non-`null` argument without a default has a provided
/// value, on fields and on directives.
pub struct ProvidedRequiredArguments<'a> {
    directive_definitions: HashMap<&'a str, Vec<(&'a str, String)>>,
}

pub fn factory<'a>() -> ProvidedRequiredArguments<'a> {
    ProvidedRequiredArguments {
        directive_definitions: HashMap::new(),
    }
}

/// The SDL flavor of this rule: required arguments of directives attached
/// to type-system definitions.
pub fn on_directives_factory<'a>() -> ProvidedRequiredArguments<'a> {
    factory()
}

impl<'a> Visitor<'a> for ProvidedRequiredArguments<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        for def in doc {
            if let Definition::TypeSystem(TypeSystemDefinition::Directive(d)) = def {
                self.directive_definitions.insert(
                    d.item.name.item,
                    d.item
                        .arguments
                        .iter()
                        .filter(|a| {
                            a.item.value_type.item.is_non_null()
                                && a.item.default_value.is_none()
                        })
                        .map(|a| (a.item.name.item, a.item.value_type.item.to_string()))
                        .collect(),
                );
            }
        }
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };
        let Some(field_meta) = ctx.schema.lookup_field(parent_type, field.item.name.item) else {
            return;
        };

        for arg in &field_meta.arguments {
            if !arg.arg_type.is_non_null() || arg.default_value.is_some() {
                continue;
            }

            let provided = field
                .item
                .arguments
                .as_ref()
                .is_some_and(|args| args.item.get(&arg.name).is_some());

            if !provided {
                ctx.report_error(
                    &field_error_message(
                        field.item.name.item,
                        &arg.name,
                        &arg.arg_type.to_string(),
                    ),
                    &[field.span.start],
                );
            }
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        let directive_name = directive.item.name.item;

        let required: Vec<(String, String)> = match ctx.schema.directive_by_name(directive_name) {
            Some(d) => d
                .arguments
                .iter()
                .filter(|a| a.arg_type.is_non_null() && a.default_value.is_none())
                .map(|a| (a.name.to_string(), a.arg_type.to_string()))
                .collect(),
            None => match self.directive_definitions.get(directive_name) {
                Some(args) => args
                    .iter()
                    .map(|(name, ty)| ((*name).to_owned(), ty.clone()))
                    .collect(),
                None => return,
            },
        };

        for (arg_name, arg_type) in required {
            let provided = directive
                .item
                .arguments
                .as_ref()
                .is_some_and(|args| args.item.get(&arg_name).is_some());

            if !provided {
                ctx.report_error(
                    &directive_error_message(directive_name, &arg_name, &arg_type),
                    &[directive.span.start],
                );
            }
        }
    }
}

fn field_error_message(field_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        "Field \"{field_name}\" argument \"{arg_name}\" of type \"{type_name}\" is required, but it was not provided."
    )
}

fn directive_error_message(directive_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        "Directive \"@{directive_name}\" argument \"{arg_name}\" of type \"{type_name}\" is required, but it was not provided."
    )
}

#[cfg(test)]
mod tests {
    use super::{directive_error_message, factory, field_error_message};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn ignores_unknown_arguments() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              isHousetrained(unknownArgument: true)
            }
          }
        "#,
        );
    }

    #[test]
    fn arg_on_optional_arg() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              isHousetrained(atOtherHomes: true)
            }
          }
        "#,
        );
    }

    #[test]
    fn no_arg_on_optional_arg() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              isHousetrained
            }
          }
        "#,
        );
    }

    #[test]
    fn missing_one_non_nullable_argument() {
        expect_fails_rule(
            factory,
            r#"
          {
            complicatedArgs {
              multipleReqs(req2: 2)
            }
          }
        "#,
            &[RuleError::new(
                &field_error_message("multipleReqs", "req1", "Int!"),
                &[SourcePosition::new(57, 3, 14)],
            )],
        );
    }

    #[test]
    fn missing_directive_argument() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog @include {
              name
            }
          }
        "#,
            &[RuleError::new(
                &directive_error_message("include", "if", "Boolean!"),
                &[SourcePosition::new(29, 2, 16)],
            )],
        );
    }
}
