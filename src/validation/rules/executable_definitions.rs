use crate::{
    ast::{Definition, Document, TypeSystemDefinition},
    validation::{ValidatorContext, Visitor},
};

pub struct ExecutableDefinitions;

pub fn factory() -> ExecutableDefinitions {
    ExecutableDefinitions
}

impl<'a> Visitor<'a> for ExecutableDefinitions {
    fn enter_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        for def in doc {
            let Definition::TypeSystem(ts) = def else {
                continue;
            };

            let (name, location) = match ts {
                TypeSystemDefinition::Schema(d) | TypeSystemDefinition::SchemaExtension(d) => {
                    ("schema".into(), d.span.start)
                }
                TypeSystemDefinition::Type(d) | TypeSystemDefinition::TypeExtension(d) => {
                    (format!("\"{}\"", d.item.name().item), d.span.start)
                }
                TypeSystemDefinition::Directive(d) => {
                    (format!("\"{}\"", d.item.name.item), d.span.start)
                }
            };

            ctx.report_error(&error_message(&name), &[location]);
        }
    }
}

fn error_message(def_name: &str) -> String {
    format!("The {def_name} definition is not executable.")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn with_only_operation() {
        expect_passes_rule(
            factory,
            r#"
          query Foo {
            dog {
              name
            }
          }
        "#,
        );
    }

    #[test]
    fn with_operation_and_fragment() {
        expect_passes_rule(
            factory,
            r#"
          query Foo {
            dog {
              name
              ...Frag
            }
          }

          fragment Frag on Dog {
            name
          }
        "#,
        );
    }

    #[test]
    fn with_type_definition() {
        expect_fails_rule(
            factory,
            r#"
          query Foo {
            dog {
              name
            }
          }

          type Cow {
            leather: String
          }

          extend type Dog {
            color: String
          }
        "#,
            &[
                RuleError::new(
                    &error_message("\"Cow\""),
                    &[SourcePosition::new(97, 7, 10)],
                ),
                RuleError::new(
                    &error_message("\"Dog\""),
                    &[SourcePosition::new(159, 11, 10)],
                ),
            ],
        );
    }

    #[test]
    fn with_schema_definition() {
        expect_fails_rule(
            factory,
            r#"
          schema {
            query: QueryRoot
          }

          query Foo {
            dog {
              name
            }
          }
        "#,
            &[RuleError::new(
                &error_message("schema"),
                &[SourcePosition::new(11, 1, 10)],
            )],
        );
    }
}
