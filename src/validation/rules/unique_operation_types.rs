use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::{OperationType, OperationTypeDefinition},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueOperationTypes {
    defined: HashMap<OperationType, SourcePosition>,
}

pub fn factory() -> UniqueOperationTypes {
    UniqueOperationTypes {
        defined: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueOperationTypes {
    fn enter_operation_type_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op_type: &'a Spanning<OperationTypeDefinition<'a>>,
    ) {
        match self.defined.entry(op_type.item.operation) {
            Entry::Occupied(e) => {
                ctx.report_error(
                    &error_message(op_type.item.operation),
                    &[*e.get(), op_type.span.start],
                );
            }
            Entry::Vacant(e) => {
                e.insert(op_type.span.start);
            }
        }
    }
}

fn error_message(operation: OperationType) -> String {
    format!("There can be only one {operation} type in schema.")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        ast::OperationType,
        parser::SourcePosition,
        validation::{RuleError, expect_fails_sdl_rule, expect_passes_sdl_rule},
    };

    #[test]
    fn no_duplicate_operation_types() {
        expect_passes_sdl_rule(
            factory,
            r#"
          schema {
            query: Foo
            mutation: Bar
          }

          type Foo { foo: String }
          type Bar { bar: String }
        "#,
        );
    }

    #[test]
    fn duplicate_operation_types_inside_one_schema_definition() {
        expect_fails_sdl_rule(
            factory,
            r#"
          schema {
            query: Foo
            query: Bar
          }

          type Foo { foo: String }
          type Bar { bar: String }
        "#,
            &[RuleError::new(
                &error_message(OperationType::Query),
                &[
                    SourcePosition::new(32, 2, 12),
                    SourcePosition::new(55, 3, 12),
                ],
            )],
        );
    }
}
