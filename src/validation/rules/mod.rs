//! The specified validation rules.
//!
//! Executable rules run through [`visit_all_rules`] against a schema;
//! SDL-only rules run through [`visit_all_sdl_rules`] when validating a
//! schema document.

pub mod executable_definitions;
pub mod fields_on_correct_type;
pub mod fragments_on_composite_types;
pub mod known_argument_names;
pub mod known_directives;
pub mod known_fragment_names;
pub mod known_type_names;
pub mod lone_anonymous_operation;
pub mod lone_schema_definition;
pub mod no_fragment_cycles;
pub mod no_undefined_variables;
pub mod no_unused_fragments;
pub mod no_unused_variables;
pub mod overlapping_fields_can_be_merged;
pub mod possible_fragment_spreads;
pub mod possible_type_extensions;
pub mod provided_required_arguments;
pub mod scalar_leafs;
pub mod single_field_subscriptions;
pub mod unique_argument_definition_names;
pub mod unique_argument_names;
pub mod unique_directive_names;
pub mod unique_directives_per_location;
pub mod unique_enum_value_names;
pub mod unique_field_definition_names;
pub mod unique_fragment_names;
pub mod unique_input_field_names;
pub mod unique_operation_names;
pub mod unique_operation_types;
pub mod unique_type_names;
pub mod unique_variable_names;
pub mod values_of_correct_type;
pub mod variables_are_input_types;
pub mod variables_in_allowed_position;

use crate::{
    ast::Document,
    validation::{MultiVisitorNil, ValidatorContext, visitor::visit},
};

/// Runs all executable-document rules in one traversal pass.
pub fn visit_all_rules<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
    let mut mv = MultiVisitorNil
        .with(executable_definitions::factory())
        .with(unique_operation_names::factory())
        .with(lone_anonymous_operation::factory())
        .with(single_field_subscriptions::factory())
        .with(known_type_names::factory())
        .with(fragments_on_composite_types::factory())
        .with(variables_are_input_types::factory())
        .with(scalar_leafs::factory())
        .with(fields_on_correct_type::factory())
        .with(unique_fragment_names::factory())
        .with(known_fragment_names::factory())
        .with(no_unused_fragments::factory())
        .with(possible_fragment_spreads::factory())
        .with(no_fragment_cycles::factory())
        .with(unique_variable_names::factory())
        .with(no_undefined_variables::factory())
        .with(no_unused_variables::factory())
        .with(known_directives::factory())
        .with(unique_directives_per_location::factory())
        .with(known_argument_names::factory())
        .with(unique_argument_names::factory())
        .with(values_of_correct_type::factory())
        .with(provided_required_arguments::factory())
        .with(variables_in_allowed_position::factory())
        .with(overlapping_fields_can_be_merged::factory())
        .with(unique_input_field_names::factory());

    visit(&mut mv, ctx, doc);
}

/// Runs all rules that apply to a schema definition document in one
/// traversal pass.
pub fn visit_all_sdl_rules<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
    let mut mv = MultiVisitorNil
        .with(lone_schema_definition::factory())
        .with(unique_operation_types::factory())
        .with(unique_type_names::factory())
        .with(unique_enum_value_names::factory())
        .with(unique_field_definition_names::factory())
        .with(unique_argument_definition_names::factory())
        .with(unique_directive_names::factory())
        .with(possible_type_extensions::factory())
        .with(known_type_names::factory())
        .with(known_directives::factory())
        .with(unique_directives_per_location::factory())
        .with(unique_input_field_names::factory())
        .with(known_argument_names::on_directives_factory())
        .with(provided_required_arguments::on_directives_factory());

    visit(&mut mv, ctx, doc);
}
