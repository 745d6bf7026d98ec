use std::collections::HashMap;

use crate::{
    ast::{
        Definition, Directive, Document, EnumValueDefinition, Field, FieldDefinition, Fragment,
        FragmentSpread, InlineFragment, InputValueDefinition, Operation, SchemaDefinition,
        TypeDefinition, TypeSystemDefinition,
    },
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

/// Checks that non-repeatable directives appear at most once per location.
pub struct UniqueDirectivesPerLocation<'a> {
    seen: HashMap<&'a str, SourcePosition>,
    repeatable_in_document: Vec<&'a str>,
}

pub fn factory<'a>() -> UniqueDirectivesPerLocation<'a> {
    UniqueDirectivesPerLocation {
        seen: HashMap::new(),
        repeatable_in_document: Vec::new(),
    }
}

impl<'a> UniqueDirectivesPerLocation<'a> {
    fn check_directives(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directives: &'a Option<Vec<Spanning<Directive<'a>>>>,
    ) {
        self.seen.clear();

        for directive in directives.iter().flatten() {
            let name = directive.item.name.item;

            let is_repeatable = ctx
                .schema
                .directive_by_name(name)
                .map(|d| d.is_repeatable)
                .unwrap_or_else(|| self.repeatable_in_document.contains(&name));
            if is_repeatable {
                continue;
            }

            match self.seen.get(name) {
                Some(first) => {
                    ctx.report_error(&error_message(name), &[*first, directive.span.start]);
                }
                None => {
                    self.seen.insert(name, directive.span.start);
                }
            }
        }
    }
}

impl<'a> Visitor<'a> for UniqueDirectivesPerLocation<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        for def in doc {
            if let Definition::TypeSystem(TypeSystemDefinition::Directive(d)) = def {
                if d.item.repeatable {
                    self.repeatable_in_document.push(d.item.name.item);
                }
            }
        }
    }

    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.check_directives(ctx, &op.item.directives);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        self.check_directives(ctx, &f.item.directives);
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        self.check_directives(ctx, &field.item.directives);
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        self.check_directives(ctx, &spread.item.directives);
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<InlineFragment<'a>>,
    ) {
        self.check_directives(ctx, &fragment.item.directives);
    }

    fn enter_schema_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        schema_def: &'a Spanning<SchemaDefinition<'a>>,
    ) {
        self.check_directives(ctx, &schema_def.item.directives);
    }

    fn enter_schema_extension(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        schema_def: &'a Spanning<SchemaDefinition<'a>>,
    ) {
        self.check_directives(ctx, &schema_def.item.directives);
    }

    fn enter_type_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.check_directives(ctx, type_definition_directives(&type_def.item));
    }

    fn enter_type_extension(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.check_directives(ctx, type_definition_directives(&type_def.item));
    }

    fn enter_field_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        field: &'a Spanning<FieldDefinition<'a>>,
    ) {
        self.check_directives(ctx, &field.item.directives);
    }

    fn enter_input_value_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        input_value: &'a Spanning<InputValueDefinition<'a>>,
    ) {
        self.check_directives(ctx, &input_value.item.directives);
    }

    fn enter_enum_value_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        value: &'a Spanning<EnumValueDefinition<'a>>,
    ) {
        self.check_directives(ctx, &value.item.directives);
    }
}

fn type_definition_directives<'d, 'a>(
    def: &'d TypeDefinition<'a>,
) -> &'d Option<Vec<Spanning<Directive<'a>>>> {
    match def {
        TypeDefinition::Scalar(d) => &d.directives,
        TypeDefinition::Object(d) => &d.directives,
        TypeDefinition::Interface(d) => &d.directives,
        TypeDefinition::Union(d) => &d.directives,
        TypeDefinition::Enum(d) => &d.directives,
        TypeDefinition::InputObject(d) => &d.directives,
    }
}

fn error_message(directive_name: &str) -> String {
    format!("The directive \"@{directive_name}\" can only be used once at this location.")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn no_directives() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              name
            }
          }
        "#,
        );
    }

    #[test]
    fn unique_directives_in_different_locations() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog @include(if: true) {
              name @include(if: true)
            }
          }
        "#,
        );
    }

    #[test]
    fn repeatable_directives_in_same_location() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              name @repeatableDirective @repeatableDirective
            }
          }
        "#,
        );
    }

    #[test]
    fn duplicate_directives_in_one_location() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog {
              name @include(if: true) @include(if: true)
            }
          }
        "#,
            &[RuleError::new(
                &error_message("include"),
                &[
                    SourcePosition::new(50, 3, 19),
                    SourcePosition::new(69, 3, 38),
                ],
            )],
        );
    }
}
