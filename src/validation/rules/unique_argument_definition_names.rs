use std::collections::HashSet;

use crate::{
    ast::{DirectiveDefinition, InputValueDefinition, TypeDefinition},
    parser::Spanning,
    validation::{RuleError, ValidatorContext, Visitor},
};

pub struct UniqueArgumentDefinitionNames;

pub fn factory() -> UniqueArgumentDefinitionNames {
    UniqueArgumentDefinitionNames
}

fn check_arguments<'a>(
    ctx: &mut ValidatorContext<'a>,
    arguments: &'a [Spanning<InputValueDefinition<'a>>],
    error_message: impl Fn(&str) -> String,
) {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for arg in arguments {
        if !seen.insert(arg.item.name.item) {
            let first = arguments
                .iter()
                .find(|a| a.item.name.item == arg.item.name.item)
                .expect("a duplicate implies a first occurrence");
            errors.push(RuleError::new(
                &error_message(arg.item.name.item),
                &[first.item.name.span.start, arg.item.name.span.start],
            ));
        }
    }

    ctx.append_errors(errors);
}

impl<'a> Visitor<'a> for UniqueArgumentDefinitionNames {
    fn enter_type_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        let (type_name, fields) = match &type_def.item {
            TypeDefinition::Object(d) => (d.name.item, &d.fields),
            TypeDefinition::Interface(d) => (d.name.item, &d.fields),
            _ => return,
        };

        for field in fields {
            check_arguments(ctx, &field.item.arguments, |arg_name| {
                field_error_message(type_name, field.item.name.item, arg_name)
            });
        }
    }

    fn enter_directive_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        dir_def: &'a Spanning<DirectiveDefinition<'a>>,
    ) {
        check_arguments(ctx, &dir_def.item.arguments, |arg_name| {
            directive_error_message(dir_def.item.name.item, arg_name)
        });
    }
}

fn field_error_message(type_name: &str, field_name: &str, arg_name: &str) -> String {
    format!("Argument \"{type_name}.{field_name}({arg_name}:)\" can only be defined once.")
}

fn directive_error_message(directive_name: &str, arg_name: &str) -> String {
    format!("Argument \"@{directive_name}({arg_name}:)\" can only be defined once.")
}

#[cfg(test)]
mod tests {
    use super::{directive_error_message, factory, field_error_message};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_sdl_rule, expect_passes_sdl_rule},
    };

    #[test]
    fn distinct_argument_names() {
        expect_passes_sdl_rule(
            factory,
            r#"
          type SomeObject {
            someField(foo: String, bar: String): String
          }
        "#,
        );
    }

    #[test]
    fn duplicate_field_argument_names() {
        expect_fails_sdl_rule(
            factory,
            r#"
          type SomeObject {
            someField(foo: String, foo: String): String
          }
        "#,
            &[RuleError::new(
                &field_error_message("SomeObject", "someField", "foo"),
                &[
                    SourcePosition::new(51, 2, 22),
                    SourcePosition::new(64, 2, 35),
                ],
            )],
        );
    }

    #[test]
    fn duplicate_directive_argument_names() {
        expect_fails_sdl_rule(
            factory,
            r#"
          directive @someDirective(foo: String, foo: String) on FIELD
        "#,
            &[RuleError::new(
                &directive_error_message("someDirective", "foo"),
                &[
                    SourcePosition::new(36, 1, 35),
                    SourcePosition::new(49, 1, 48),
                ],
            )],
        );
    }
}
