use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::DirectiveDefinition,
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueDirectiveNames<'a> {
    defined: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueDirectiveNames<'a> {
    UniqueDirectiveNames {
        defined: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueDirectiveNames<'a> {
    fn enter_directive_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        dir_def: &'a Spanning<DirectiveDefinition<'a>>,
    ) {
        let name = &dir_def.item.name;

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

fn error_message(directive_name: &str) -> String {
    format!("There can be only one directive named \"@{directive_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_sdl_rule, expect_passes_sdl_rule},
    };

    #[test]
    fn distinct_directive_names() {
        expect_passes_sdl_rule(
            factory,
            r#"
          directive @fooDirective on FIELD
          directive @barDirective on FIELD
        "#,
        );
    }

    #[test]
    fn duplicate_directive_names() {
        expect_fails_sdl_rule(
            factory,
            r#"
          directive @fooDirective on FIELD
          directive @fooDirective on OBJECT
        "#,
            &[RuleError::new(
                &error_message("fooDirective"),
                &[
                    SourcePosition::new(22, 1, 21),
                    SourcePosition::new(65, 2, 21),
                ],
            )],
        );
    }
}
