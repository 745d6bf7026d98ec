use std::collections::HashSet;

use crate::{
    ast::{
        Definition, Document, Fragment, InlineFragment, Type, TypeDefinition,
        TypeSystemDefinition, VariableDefinition,
    },
    parser::{SourcePosition, Spanning},
    util,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownTypeNames<'a> {
    defined_in_document: HashSet<&'a str>,
}

pub fn factory<'a>() -> KnownTypeNames<'a> {
    KnownTypeNames {
        defined_in_document: HashSet::new(),
    }
}

impl<'a> KnownTypeNames<'a> {
    fn validate_name(
        &self,
        ctx: &mut ValidatorContext<'a>,
        name: &str,
        location: &SourcePosition,
    ) {
        if self.defined_in_document.contains(name)
            || ctx.schema.concrete_type_by_name(name).is_some()
        {
            return;
        }

        let suggestions = util::suggestion_list(
            name,
            ctx.schema
                .concrete_type_list()
                .iter()
                .filter(|t| !t.is_builtin())
                .map(|t| t.name().as_str())
                .chain(self.defined_in_document.iter().copied()),
        );
        ctx.report_error(
            &error_message(name, &util::did_you_mean(&suggestions)),
            &[*location],
        );
    }

    fn validate_type(&self, ctx: &mut ValidatorContext<'a>, t: &Spanning<Type<&'a str>>) {
        self.validate_name(ctx, t.item.innermost_name(), &t.span.start);
    }
}

impl<'a> Visitor<'a> for KnownTypeNames<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        for def in doc {
            if let Definition::TypeSystem(TypeSystemDefinition::Type(d)) = def {
                self.defined_in_document.insert(d.item.name().item);
            }
        }
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        let type_cond = &fragment.item.type_condition;
        self.validate_name(ctx, type_cond.item, &type_cond.span.start);
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<InlineFragment<'a>>,
    ) {
        if let Some(type_cond) = &fragment.item.type_condition {
            self.validate_name(ctx, type_cond.item, &type_cond.span.start);
        }
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (_, var_def): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        self.validate_type(ctx, &var_def.var_type);
    }

    fn enter_field_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        field: &'a Spanning<crate::ast::FieldDefinition<'a>>,
    ) {
        self.validate_type(ctx, &field.item.field_type);
    }

    fn enter_input_value_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        input_value: &'a Spanning<crate::ast::InputValueDefinition<'a>>,
    ) {
        self.validate_type(ctx, &input_value.item.value_type);
    }

    fn enter_type_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        match &type_def.item {
            TypeDefinition::Object(d) => {
                for iface in &d.interfaces {
                    self.validate_name(ctx, iface.item, &iface.span.start);
                }
            }
            TypeDefinition::Interface(d) => {
                for iface in &d.interfaces {
                    self.validate_name(ctx, iface.item, &iface.span.start);
                }
            }
            TypeDefinition::Union(d) => {
                for member in &d.members {
                    self.validate_name(ctx, member.item, &member.span.start);
                }
            }
            _ => {}
        }
    }
}

fn error_message(type_name: &str, suggestion: &str) -> String {
    format!("Unknown type \"{type_name}\".{suggestion}")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn known_type_names_are_valid() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($var: String, $required: [String!]!) {
            human(id: $var) {
              pets {
                ... on Pet { name },
                ...PetFields,
                ... { name }
              }
            }
          }
          fragment PetFields on Pet {
            name
          }
        "#,
        );
    }

    #[test]
    fn unknown_type_names_are_invalid() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($var: JumbledUpLetters) {
            human(id: $var) {
              name
              pets { ... on Badger { name }, ...PetFields }
            }
          }
          fragment PetFields on Peat {
            name
          }
        "#,
            &[
                RuleError::new(
                    &error_message("JumbledUpLetters", ""),
                    &[SourcePosition::new(27, 1, 26)],
                ),
                RuleError::new(
                    &error_message("Badger", ""),
                    &[SourcePosition::new(124, 4, 28)],
                ),
                RuleError::new(
                    &error_message("Peat", " Did you mean \"Pet\" or \"Cat\"?"),
                    &[SourcePosition::new(214, 7, 32)],
                ),
            ],
        );
    }
}
