use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::TypeDefinition,
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueTypeNames<'a> {
    defined: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueTypeNames<'a> {
    UniqueTypeNames {
        defined: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueTypeNames<'a> {
    fn enter_type_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        let name = type_def.item.name();

        match self.defined.entry(name.item) {
            Entry::Occupied(e) => {
                ctx.report_error(&error_message(name.item), &[*e.get(), name.span.start]);
            }
            Entry::Vacant(e) => {
                e.insert(name.span.start);
            }
        }
    }
}

fn error_message(type_name: &str) -> String {
    format!("There can be only one type named \"{type_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_sdl_rule, expect_passes_sdl_rule},
    };

    #[test]
    fn distinct_type_names() {
        expect_passes_sdl_rule(
            factory,
            r#"
          type Foo { foo: String }
          type Bar { bar: String }
        "#,
        );
    }

    #[test]
    fn extension_is_not_a_redefinition() {
        expect_passes_sdl_rule(
            factory,
            r#"
          type Foo { foo: String }
          extend type Foo { bar: String }
        "#,
        );
    }

    #[test]
    fn duplicate_type_names() {
        expect_fails_sdl_rule(
            factory,
            r#"
          type Foo { foo: String }
          type Foo { bar: String }
        "#,
            &[RuleError::new(
                &error_message("Foo"),
                &[
                    SourcePosition::new(16, 1, 15),
                    SourcePosition::new(51, 2, 15),
                ],
            )],
        );
    }
}
