use std::collections::HashMap;

use crate::{
    ast::{
        Definition, Directive, DirectiveLocation, Document, EnumValueDefinition, Field, Fragment,
        FragmentSpread, InlineFragment, Operation, OperationType, TypeDefinition,
        TypeSystemDefinition, VariableDefinition,
    },
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownDirectives<'a> {
    location_stack: Vec<DirectiveLocation>,
    defined_in_document: HashMap<&'a str, Vec<DirectiveLocation>>,
    in_input_object: bool,
}

pub fn factory<'a>() -> KnownDirectives<'a> {
    KnownDirectives {
        location_stack: Vec::new(),
        defined_in_document: HashMap::new(),
        in_input_object: false,
    }
}

impl<'a> Visitor<'a> for KnownDirectives<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        for def in doc {
            if let Definition::TypeSystem(TypeSystemDefinition::Directive(d)) = def {
                self.defined_in_document.insert(
                    d.item.name.item,
                    d.item.locations.iter().map(|l| l.item).collect(),
                );
            }
        }
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.location_stack.push(match op.item.operation_type {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        });
    }

    fn exit_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.location_stack.push(DirectiveLocation::Field);
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field<'a>>) {
        self.location_stack.pop();
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment<'a>>,
    ) {
        self.location_stack
            .push(DirectiveLocation::FragmentDefinition);
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<FragmentSpread<'a>>,
    ) {
        self.location_stack.push(DirectiveLocation::FragmentSpread);
    }

    fn exit_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<FragmentSpread<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_inline_fragment(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<InlineFragment<'a>>,
    ) {
        self.location_stack.push(DirectiveLocation::InlineFragment);
    }

    fn exit_inline_fragment(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<InlineFragment<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        self.location_stack
            .push(DirectiveLocation::VariableDefinition);
    }

    fn exit_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        self.location_stack.pop();
    }

    fn enter_schema_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<crate::ast::SchemaDefinition<'a>>,
    ) {
        self.location_stack.push(DirectiveLocation::Schema);
    }

    fn exit_schema_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<crate::ast::SchemaDefinition<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_schema_extension(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<crate::ast::SchemaDefinition<'a>>,
    ) {
        self.location_stack.push(DirectiveLocation::Schema);
    }

    fn exit_schema_extension(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<crate::ast::SchemaDefinition<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_type_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.location_stack.push(type_system_location(&type_def.item));
        self.in_input_object = matches!(type_def.item, TypeDefinition::InputObject(..));
    }

    fn exit_type_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.location_stack.pop();
        self.in_input_object = false;
    }

    fn enter_type_extension(
        &mut self,
        _: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.location_stack.push(type_system_location(&type_def.item));
        self.in_input_object = matches!(type_def.item, TypeDefinition::InputObject(..));
    }

    fn exit_type_extension(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.location_stack.pop();
        self.in_input_object = false;
    }

    fn enter_field_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<crate::ast::FieldDefinition<'a>>,
    ) {
        self.location_stack.push(DirectiveLocation::FieldDefinition);
    }

    fn exit_field_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<crate::ast::FieldDefinition<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_input_value_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<crate::ast::InputValueDefinition<'a>>,
    ) {
        self.location_stack.push(
            if self.in_input_object
                && self.location_stack.last() == Some(&DirectiveLocation::InputObject)
            {
                DirectiveLocation::InputFieldDefinition
            } else {
                DirectiveLocation::ArgumentDefinition
            },
        );
    }

    fn exit_input_value_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<crate::ast::InputValueDefinition<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_enum_value_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<EnumValueDefinition<'a>>,
    ) {
        self.location_stack.push(DirectiveLocation::EnumValue);
    }

    fn exit_enum_value_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<EnumValueDefinition<'a>>,
    ) {
        self.location_stack.pop();
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive<'a>>,
    ) {
        let directive_name = directive.item.name.item;

        let locations: Option<Vec<DirectiveLocation>> = ctx
            .schema
            .directive_by_name(directive_name)
            .map(|d| d.locations.clone())
            .or_else(|| self.defined_in_document.get(directive_name).cloned());

        let Some(locations) = locations else {
            ctx.report_error(&unknown_error_message(directive_name), &[directive.span.start]);
            return;
        };

        if let Some(current_location) = self.location_stack.last() {
            if !locations.contains(current_location) {
                ctx.report_error(
                    &misplaced_error_message(directive_name, current_location),
                    &[directive.span.start],
                );
            }
        }
    }
}

fn type_system_location(def: &TypeDefinition<'_>) -> DirectiveLocation {
    match def {
        TypeDefinition::Scalar(..) => DirectiveLocation::Scalar,
        TypeDefinition::Object(..) => DirectiveLocation::Object,
        TypeDefinition::Interface(..) => DirectiveLocation::Interface,
        TypeDefinition::Union(..) => DirectiveLocation::Union,
        TypeDefinition::Enum(..) => DirectiveLocation::Enum,
        TypeDefinition::InputObject(..) => DirectiveLocation::InputObject,
    }
}

fn unknown_error_message(directive_name: &str) -> String {
    format!("Unknown directive \"@{directive_name}\".")
}

fn misplaced_error_message(directive_name: &str, location: &DirectiveLocation) -> String {
    format!("Directive \"@{directive_name}\" may not be used on {location}.")
}
