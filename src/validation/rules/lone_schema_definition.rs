use crate::{
    ast::SchemaDefinition,
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct LoneSchemaDefinition {
    schema_definition_count: usize,
}

pub fn factory() -> LoneSchemaDefinition {
    LoneSchemaDefinition {
        schema_definition_count: 0,
    }
}

impl<'a> Visitor<'a> for LoneSchemaDefinition {
    fn enter_schema_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        schema_def: &'a Spanning<SchemaDefinition<'a>>,
    ) {
        if self.schema_definition_count > 0 {
            ctx.report_error(error_message(), &[schema_def.span.start]);
        }
        self.schema_definition_count += 1;
    }
}

fn error_message() -> &'static str {
    "Must provide only one schema definition."
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_sdl_rule, expect_passes_sdl_rule},
    };

    #[test]
    fn one_schema_definition() {
        expect_passes_sdl_rule(
            factory,
            r#"
          schema {
            query: Foo
          }

          type Foo {
            foo: String
          }
        "#,
        );
    }

    #[test]
    fn multiple_schema_definitions() {
        expect_fails_sdl_rule(
            factory,
            r#"
          schema {
            query: Foo
          }

          type Foo {
            foo: String
          }

          schema {
            mutation: Foo
          }
        "#,
            &[RuleError::new(
                error_message(),
                &[SourcePosition::new(124, 9, 10)],
            )],
        );
    }
}
