//! Printing of parsed documents back to GraphQL source text.
//!
//! The output uses the conventional 2-space indented block style; printing
//! a parsed document and re-parsing the output yields a structurally equal
//! syntax tree.

use std::fmt::Write as _;

use crate::{
    ast::{
        Arguments, Definition, Directive, Document, EnumValueDefinition, Field, FieldDefinition,
        Fragment, InlineFragment, InputValue, InputValueDefinition, Operation, OperationType,
        Selection, TypeDefinition, TypeSystemDefinition,
    },
    parser::Spanning,
};

/// Prints a full document.
pub fn print_document(document: &Document<'_>) -> String {
    let mut out = String::new();
    for (i, def) in document.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        print_definition(&mut out, def);
    }
    out.push('\n');
    out
}

fn print_definition(out: &mut String, def: &Definition<'_>) {
    match def {
        Definition::Operation(op) => print_operation(out, &op.item),
        Definition::Fragment(fragment) => print_fragment(out, &fragment.item),
        Definition::TypeSystem(ts) => print_type_system_definition(out, ts),
    }
}

fn print_operation(out: &mut String, op: &Operation<'_>) {
    let shorthand = op.operation_type == OperationType::Query
        && op.name.is_none()
        && op.variable_definitions.is_none()
        && op.directives.is_none();

    if !shorthand {
        let _ = write!(out, "{}", op.operation_type);
        if let Some(name) = &op.name {
            let _ = write!(out, " {}", name.item);
        }
        if let Some(var_defs) = &op.variable_definitions {
            out.push('(');
            for (i, (name, def)) in var_defs.item.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "${}: {}", name.item, def.var_type.item);
                if let Some(default) = &def.default_value {
                    let _ = write!(out, " = {}", default.item);
                }
                print_directives(out, &def.directives);
            }
            out.push(')');
        }
        print_directives(out, &op.directives);
        out.push(' ');
    }

    print_selection_set(out, &op.selection_set, 0);
}

fn print_fragment(out: &mut String, fragment: &Fragment<'_>) {
    let _ = write!(
        out,
        "fragment {} on {}",
        fragment.name.item, fragment.type_condition.item,
    );
    print_directives(out, &fragment.directives);
    out.push(' ');
    print_selection_set(out, &fragment.selection_set, 0);
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn print_selection_set(out: &mut String, selection_set: &[Selection<'_>], depth: usize) {
    out.push_str("{\n");
    for selection in selection_set {
        indent(out, depth + 1);
        match selection {
            Selection::Field(f) => print_field(out, &f.item, depth + 1),
            Selection::FragmentSpread(spread) => {
                let _ = write!(out, "...{}", spread.item.name.item);
                print_directives(out, &spread.item.directives);
            }
            Selection::InlineFragment(inline) => print_inline_fragment(out, &inline.item, depth + 1),
        }
        out.push('\n');
    }
    indent(out, depth);
    out.push('}');
}

fn print_field(out: &mut String, field: &Field<'_>, depth: usize) {
    if let Some(alias) = &field.alias {
        let _ = write!(out, "{}: ", alias.item);
    }
    out.push_str(field.name.item);
    print_arguments(out, &field.arguments);
    print_directives(out, &field.directives);
    if let Some(selection_set) = &field.selection_set {
        out.push(' ');
        print_selection_set(out, selection_set, depth);
    }
}

fn print_inline_fragment(out: &mut String, inline: &InlineFragment<'_>, depth: usize) {
    out.push_str("...");
    if let Some(cond) = &inline.type_condition {
        let _ = write!(out, " on {}", cond.item);
    }
    print_directives(out, &inline.directives);
    out.push(' ');
    print_selection_set(out, &inline.selection_set, depth);
}

fn print_arguments(out: &mut String, arguments: &Option<Spanning<Arguments<'_>>>) {
    if let Some(args) = arguments {
        out.push('(');
        for (i, (name, value)) in args.item.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}: {}", name.item, value.item);
        }
        out.push(')');
    }
}

fn print_directives(out: &mut String, directives: &Option<Vec<Spanning<Directive<'_>>>>) {
    for directive in directives.iter().flatten() {
        let _ = write!(out, " @{}", directive.item.name.item);
        print_arguments(out, &directive.item.arguments);
    }
}

// ----------------------------------------------------------------------------
// Type-system definitions
// ----------------------------------------------------------------------------

fn print_description(out: &mut String, description: &Option<Spanning<String>>, depth: usize) {
    if let Some(description) = description {
        indent(out, depth);
        let _ = write!(out, "{}", InputValue::String(description.item.clone()));
        out.push('\n');
    }
}

fn print_type_system_definition(out: &mut String, def: &TypeSystemDefinition<'_>) {
    match def {
        TypeSystemDefinition::Schema(schema_def) => {
            print_description(out, &schema_def.item.description, 0);
            out.push_str("schema");
            print_directives(out, &schema_def.item.directives);
            if !schema_def.item.operation_types.is_empty() {
                out.push_str(" {\n");
                for op in &schema_def.item.operation_types {
                    indent(out, 1);
                    let _ = write!(out, "{}: {}\n", op.item.operation, op.item.named_type.item);
                }
                out.push('}');
            }
        }
        TypeSystemDefinition::SchemaExtension(schema_def) => {
            out.push_str("extend schema");
            print_directives(out, &schema_def.item.directives);
            if !schema_def.item.operation_types.is_empty() {
                out.push_str(" {\n");
                for op in &schema_def.item.operation_types {
                    indent(out, 1);
                    let _ = write!(out, "{}: {}\n", op.item.operation, op.item.named_type.item);
                }
                out.push('}');
            }
        }
        TypeSystemDefinition::Type(type_def) => print_type_definition(out, &type_def.item),
        TypeSystemDefinition::TypeExtension(type_def) => {
            out.push_str("extend ");
            print_type_definition(out, &type_def.item);
        }
        TypeSystemDefinition::Directive(dir_def) => {
            print_description(out, &dir_def.item.description, 0);
            let _ = write!(out, "directive @{}", dir_def.item.name.item);
            print_argument_definitions(out, &dir_def.item.arguments);
            if dir_def.item.repeatable {
                out.push_str(" repeatable");
            }
            out.push_str(" on ");
            for (i, location) in dir_def.item.locations.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                let _ = write!(out, "{}", location.item);
            }
        }
    }
}

fn print_type_definition(out: &mut String, def: &TypeDefinition<'_>) {
    match def {
        TypeDefinition::Scalar(d) => {
            print_description(out, &d.description, 0);
            let _ = write!(out, "scalar {}", d.name.item);
            print_directives(out, &d.directives);
        }
        TypeDefinition::Object(d) => {
            print_description(out, &d.description, 0);
            let _ = write!(out, "type {}", d.name.item);
            print_implements(out, &d.interfaces);
            print_directives(out, &d.directives);
            print_field_definitions(out, &d.fields);
        }
        TypeDefinition::Interface(d) => {
            print_description(out, &d.description, 0);
            let _ = write!(out, "interface {}", d.name.item);
            print_implements(out, &d.interfaces);
            print_directives(out, &d.directives);
            print_field_definitions(out, &d.fields);
        }
        TypeDefinition::Union(d) => {
            print_description(out, &d.description, 0);
            let _ = write!(out, "union {}", d.name.item);
            print_directives(out, &d.directives);
            if !d.members.is_empty() {
                out.push_str(" = ");
                for (i, member) in d.members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    out.push_str(member.item);
                }
            }
        }
        TypeDefinition::Enum(d) => {
            print_description(out, &d.description, 0);
            let _ = write!(out, "enum {}", d.name.item);
            print_directives(out, &d.directives);
            if !d.values.is_empty() {
                out.push_str(" {\n");
                for value in &d.values {
                    print_enum_value_definition(out, &value.item);
                }
                out.push('}');
            }
        }
        TypeDefinition::InputObject(d) => {
            print_description(out, &d.description, 0);
            let _ = write!(out, "input {}", d.name.item);
            print_directives(out, &d.directives);
            if !d.fields.is_empty() {
                out.push_str(" {\n");
                for field in &d.fields {
                    print_description(out, &field.item.description, 1);
                    indent(out, 1);
                    print_input_value_definition(out, &field.item);
                    out.push('\n');
                }
                out.push('}');
            }
        }
    }
}

fn print_implements(out: &mut String, interfaces: &[Spanning<&str>]) {
    if !interfaces.is_empty() {
        out.push_str(" implements ");
        for (i, iface) in interfaces.iter().enumerate() {
            if i > 0 {
                out.push_str(" & ");
            }
            out.push_str(iface.item);
        }
    }
}

fn print_field_definitions(out: &mut String, fields: &[Spanning<FieldDefinition<'_>>]) {
    if fields.is_empty() {
        return;
    }
    out.push_str(" {\n");
    for field in fields {
        print_description(out, &field.item.description, 1);
        indent(out, 1);
        out.push_str(field.item.name.item);
        print_argument_definitions(out, &field.item.arguments);
        let _ = write!(out, ": {}", field.item.field_type.item);
        print_directives(out, &field.item.directives);
        out.push('\n');
    }
    out.push('}');
}

fn print_argument_definitions(out: &mut String, arguments: &[Spanning<InputValueDefinition<'_>>]) {
    if arguments.is_empty() {
        return;
    }
    out.push('(');
    for (i, arg) in arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        print_input_value_definition(out, &arg.item);
    }
    out.push(')');
}

fn print_input_value_definition(out: &mut String, def: &InputValueDefinition<'_>) {
    let _ = write!(out, "{}: {}", def.name.item, def.value_type.item);
    if let Some(default) = &def.default_value {
        let _ = write!(out, " = {}", default.item);
    }
    print_directives(out, &def.directives);
}

fn print_enum_value_definition(out: &mut String, def: &EnumValueDefinition<'_>) {
    print_description(out, &def.description, 1);
    indent(out, 1);
    out.push_str(def.name.item);
    print_directives(out, &def.directives);
    out.push('\n');
}
