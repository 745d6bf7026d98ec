use crate::{
    ast::{
        Directive, DirectiveDefinition, Document, EnumValueDefinition, Field, FieldDefinition,
        Fragment, FragmentSpread, InlineFragment, InputValue, InputValueDefinition, Operation,
        OperationTypeDefinition, Selection, SchemaDefinition, TypeDefinition, VariableDefinition,
    },
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

/// Terminator of a [`MultiVisitorCons`] chain.
#[doc(hidden)]
pub struct MultiVisitorNil;

impl MultiVisitorNil {
    pub fn with<V>(self, visitor: V) -> MultiVisitorCons<V, Self> {
        MultiVisitorCons(visitor, self)
    }
}

/// Runs two visitors as one, letting a whole rule list run in a single
/// traversal pass.
#[doc(hidden)]
pub struct MultiVisitorCons<A, B>(A, B);

impl<A, B> MultiVisitorCons<A, B> {
    pub fn with<V>(self, visitor: V) -> MultiVisitorCons<V, Self> {
        MultiVisitorCons(visitor, self)
    }
}

impl<'a> Visitor<'a> for MultiVisitorNil {}

macro_rules! forward {
    ($(fn $name:ident($arg:ty);)*) => {
        $(
            fn $name(&mut self, ctx: &mut ValidatorContext<'a>, node: $arg) {
                self.0.$name(ctx, node);
                self.1.$name(ctx, node);
            }
        )*
    };
}

impl<'a, A, B> Visitor<'a> for MultiVisitorCons<A, B>
where
    A: Visitor<'a> + 'a,
    B: Visitor<'a> + 'a,
{
    forward! {
        fn enter_document(&'a Document<'a>);
        fn exit_document(&'a Document<'a>);
        fn enter_operation_definition(&'a Spanning<Operation<'a>>);
        fn exit_operation_definition(&'a Spanning<Operation<'a>>);
        fn enter_fragment_definition(&'a Spanning<Fragment<'a>>);
        fn exit_fragment_definition(&'a Spanning<Fragment<'a>>);
        fn enter_variable_definition(&'a (Spanning<&'a str>, VariableDefinition<'a>));
        fn exit_variable_definition(&'a (Spanning<&'a str>, VariableDefinition<'a>));
        fn enter_directive(&'a Spanning<Directive<'a>>);
        fn exit_directive(&'a Spanning<Directive<'a>>);
        fn enter_argument(&'a (Spanning<&'a str>, Spanning<InputValue>));
        fn exit_argument(&'a (Spanning<&'a str>, Spanning<InputValue>));
        fn enter_selection_set(&'a [Selection<'a>]);
        fn exit_selection_set(&'a [Selection<'a>]);
        fn enter_field(&'a Spanning<Field<'a>>);
        fn exit_field(&'a Spanning<Field<'a>>);
        fn enter_fragment_spread(&'a Spanning<FragmentSpread<'a>>);
        fn exit_fragment_spread(&'a Spanning<FragmentSpread<'a>>);
        fn enter_inline_fragment(&'a Spanning<InlineFragment<'a>>);
        fn exit_inline_fragment(&'a Spanning<InlineFragment<'a>>);
        fn enter_null_value(Spanning<()>);
        fn exit_null_value(Spanning<()>);
        fn enter_int_value(Spanning<i32>);
        fn exit_int_value(Spanning<i32>);
        fn enter_float_value(Spanning<f64>);
        fn exit_float_value(Spanning<f64>);
        fn enter_string_value(Spanning<&'a String>);
        fn exit_string_value(Spanning<&'a String>);
        fn enter_boolean_value(Spanning<bool>);
        fn exit_boolean_value(Spanning<bool>);
        fn enter_enum_value(Spanning<&'a String>);
        fn exit_enum_value(Spanning<&'a String>);
        fn enter_variable_value(Spanning<&'a String>);
        fn exit_variable_value(Spanning<&'a String>);
        fn enter_list_value(Spanning<&'a Vec<Spanning<InputValue>>>);
        fn exit_list_value(Spanning<&'a Vec<Spanning<InputValue>>>);
        fn enter_object_value(Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>);
        fn exit_object_value(Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>);
        fn enter_object_field(&'a (Spanning<String>, Spanning<InputValue>));
        fn exit_object_field(&'a (Spanning<String>, Spanning<InputValue>));
        fn enter_schema_definition(&'a Spanning<SchemaDefinition<'a>>);
        fn exit_schema_definition(&'a Spanning<SchemaDefinition<'a>>);
        fn enter_schema_extension(&'a Spanning<SchemaDefinition<'a>>);
        fn exit_schema_extension(&'a Spanning<SchemaDefinition<'a>>);
        fn enter_operation_type_definition(&'a Spanning<OperationTypeDefinition<'a>>);
        fn exit_operation_type_definition(&'a Spanning<OperationTypeDefinition<'a>>);
        fn enter_type_definition(&'a Spanning<TypeDefinition<'a>>);
        fn exit_type_definition(&'a Spanning<TypeDefinition<'a>>);
        fn enter_type_extension(&'a Spanning<TypeDefinition<'a>>);
        fn exit_type_extension(&'a Spanning<TypeDefinition<'a>>);
        fn enter_directive_definition(&'a Spanning<DirectiveDefinition<'a>>);
        fn exit_directive_definition(&'a Spanning<DirectiveDefinition<'a>>);
        fn enter_field_definition(&'a Spanning<FieldDefinition<'a>>);
        fn exit_field_definition(&'a Spanning<FieldDefinition<'a>>);
        fn enter_input_value_definition(&'a Spanning<InputValueDefinition<'a>>);
        fn exit_input_value_definition(&'a Spanning<InputValueDefinition<'a>>);
        fn enter_enum_value_definition(&'a Spanning<EnumValueDefinition<'a>>);
        fn exit_enum_value_definition(&'a Spanning<EnumValueDefinition<'a>>);
    }
}
