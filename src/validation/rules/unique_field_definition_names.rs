use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::TypeDefinition,
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueFieldDefinitionNames<'a> {
    defined: HashMap<(&'a str, &'a str), SourcePosition>,
}

pub fn factory<'a>() -> UniqueFieldDefinitionNames<'a> {
    UniqueFieldDefinitionNames {
        defined: HashMap::new(),
    }
}

impl<'a> UniqueFieldDefinitionNames<'a> {
    fn check(&mut self, ctx: &mut ValidatorContext<'a>, type_def: &'a Spanning<TypeDefinition<'a>>) {
        let (type_name, field_names): (_, Vec<(&'a str, SourcePosition)>) = match &type_def.item {
            TypeDefinition::Object(d) => (
                d.name.item,
                d.fields
                    .iter()
                    .map(|f| (f.item.name.item, f.item.name.span.start))
                    .collect(),
            ),
            TypeDefinition::Interface(d) => (
                d.name.item,
                d.fields
                    .iter()
                    .map(|f| (f.item.name.item, f.item.name.span.start))
                    .collect(),
            ),
            TypeDefinition::InputObject(d) => (
                d.name.item,
                d.fields
                    .iter()
                    .map(|f| (f.item.name.item, f.item.name.span.start))
                    .collect(),
            ),
            _ => return,
        };

        for (field_name, position) in field_names {
            match self.defined.entry((type_name, field_name)) {
                Entry::Occupied(e) => {
                    ctx.report_error(
                        &error_message(type_name, field_name),
                        &[*e.get(), position],
                    );
                }
                Entry::Vacant(e) => {
                    e.insert(position);
                }
            }
        }
    }
}

impl<'a> Visitor<'a> for UniqueFieldDefinitionNames<'a> {
    fn enter_type_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.check(ctx, type_def);
    }

    fn enter_type_extension(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.check(ctx, type_def);
    }
}

fn error_message(type_name: &str, field_name: &str) -> String {
    format!("Field \"{type_name}.{field_name}\" can only be defined once.")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_sdl_rule, expect_passes_sdl_rule},
    };

    #[test]
    fn distinct_field_names() {
        expect_passes_sdl_rule(
            factory,
            r#"
          type SomeObject {
            foo: String
            bar: String
          }
        "#,
        );
    }

    #[test]
    fn duplicate_field_names() {
        expect_fails_sdl_rule(
            factory,
            r#"
          type SomeObject {
            foo: String
            foo: String
          }
        "#,
            &[RuleError::new(
                &error_message("SomeObject", "foo"),
                &[
                    SourcePosition::new(41, 2, 12),
                    SourcePosition::new(65, 3, 12),
                ],
            )],
        );
    }

    #[test]
    fn duplicate_field_added_by_extension() {
        expect_fails_sdl_rule(
            factory,
            r#"
          input SomeInput { foo: String }
          extend input SomeInput { foo: String }
        "#,
            &[RuleError::new(
                &error_message("SomeInput", "foo"),
                &[
                    SourcePosition::new(29, 1, 28),
                    SourcePosition::new(78, 2, 35),
                ],
            )],
        );
    }
}
