//! Coercion of variable and argument values against their declared types.

use std::collections::HashMap;

use crate::{
    ast::{Arguments, InputValue, Operation, Variables},
    executor::{FieldError, VariableValues},
    parser::Spanning,
    schema::{
        meta::{EnumMeta, Field, InputObjectMeta, MetaType, ScalarMeta},
        model::{SchemaType, TypeType},
    },
    validation::RuleError,
    value::{Object, Value},
};

/// Coerces the provided variable values against the operation's variable
/// definitions.
///
/// For each definition: a provided value is coerced against the declared
/// type; otherwise the default value applies; otherwise a non-`null` type
/// is an error. The resulting map contains only variables that ended up
/// with a value, so "not provided" stays distinguishable from an explicit
/// `null`.
pub(crate) fn coerce_variable_values(
    schema: &SchemaType,
    operation: &Spanning<Operation<'_>>,
    inputs: &Variables,
) -> Result<VariableValues, Vec<RuleError>> {
    let mut coerced = HashMap::new();
    let mut errors = Vec::new();

    let Some(var_defs) = &operation.item.variable_definitions else {
        return Ok(coerced);
    };

    for (name, def) in var_defs.item.iter() {
        let var_type = &def.var_type.item;

        let is_input = schema
            .concrete_type_by_name(var_type.innermost_name())
            .is_some_and(MetaType::is_input);
        if !is_input {
            errors.push(RuleError::new(
                &format!(
                    "Variable \"${}\" expected value of type \"{}\" which cannot be used as an input type.",
                    name.item, var_type,
                ),
                &[name.span.start],
            ));
            continue;
        }

        let meta_type = schema.make_type(var_type);

        match inputs.get(name.item) {
            Some(value) => {
                match coerce_variable_value(schema, &meta_type, value) {
                    Ok(v) => {
                        coerced.insert(name.item.to_owned(), v);
                    }
                    Err(reason) => errors.push(RuleError::new(
                        &format!(
                            "Variable \"${}\" got invalid value {value}; {reason}",
                            name.item,
                        ),
                        &[name.span.start],
                    )),
                }
            }
            None => {
                if let Some(default) = &def.default_value {
                    match coerce_input_literal(schema, &meta_type, &default.item, &coerced) {
                        Ok(Some(v)) => {
                            coerced.insert(name.item.to_owned(), v);
                        }
                        Ok(None) => {}
                        Err(reason) => errors.push(RuleError::new(
                            &format!(
                                "Variable \"${}\" got invalid default value {}; {reason}",
                                name.item, default.item,
                            ),
                            &[name.span.start],
                        )),
                    }
                } else if var_type.is_non_null() {
                    errors.push(RuleError::new(
                        &format!(
                            "Variable \"${}\" of required type \"{}\" was not provided.",
                            name.item, var_type,
                        ),
                        &[name.span.start],
                    ));
                }
            }
        }
    }

    if errors.is_empty() { Ok(coerced) } else { Err(errors) }
}

/// Coerces one runtime-provided value against its declared type.
///
/// Unlike literals, runtime values cannot contain variables, and enum
/// values may arrive spelled as strings.
fn coerce_variable_value(
    schema: &SchemaType,
    ty: &TypeType<'_>,
    value: &InputValue,
) -> Result<Value, String> {
    match ty {
        TypeType::NonNull(inner) => {
            if value.is_null() {
                Err(format!("Expected non-nullable type \"{ty}\" not to be null."))
            } else {
                coerce_variable_value(schema, inner, value)
            }
        }
        TypeType::List(inner) => {
            if value.is_null() {
                return Ok(Value::Null);
            }
            match value.to_list_value() {
                Some(items) => items
                    .into_iter()
                    .map(|item| coerce_variable_value(schema, inner, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                // A single value coerces to a list of one item.
                None => Ok(Value::List(vec![coerce_variable_value(
                    schema, inner, value,
                )?])),
            }
        }
        TypeType::Concrete(meta) => {
            if value.is_null() {
                return Ok(Value::Null);
            }
            match meta {
                MetaType::Scalar(ScalarMeta { parse_fn, .. }) => {
                    parse_fn(value).map_err(|e| e.message().to_owned())
                }
                MetaType::Enum(em) => coerce_enum(em, value, true),
                MetaType::InputObject(iom) => {
                    coerce_input_object(schema, iom, value, &HashMap::new(), |s, t, v, _| {
                        coerce_variable_value(s, t, v)
                    })
                }
                _ => Err(format!("Expected type \"{}\" to be an input type.", meta.name())),
            }
        }
    }
}

/// Coerces a constant or variable-bearing literal against its declared
/// type, resolving variables from the already coerced `variables`.
///
/// Returns `Ok(None)` when the literal is a variable that was not
/// provided, letting the caller fall back to a default value.
pub(crate) fn coerce_input_literal(
    schema: &SchemaType,
    ty: &TypeType<'_>,
    literal: &InputValue,
    variables: &VariableValues,
) -> Result<Option<Value>, String> {
    if let InputValue::Variable(name) = literal {
        // Variable usage in an allowed position was checked by validation;
        // its value was coerced against the variable's own type already.
        return match variables.get(name) {
            Some(v) => {
                if v.is_null() && ty.is_non_null() {
                    Err(format!(
                        "Expected non-nullable type \"{ty}\" not to be null."
                    ))
                } else {
                    Ok(Some(v.clone()))
                }
            }
            None => Ok(None),
        };
    }

    match ty {
        TypeType::NonNull(inner) => {
            if literal.is_null() {
                Err(format!("Expected non-nullable type \"{ty}\" not to be null."))
            } else {
                coerce_input_literal(schema, inner, literal, variables)
            }
        }
        TypeType::List(inner) => {
            if literal.is_null() {
                return Ok(Some(Value::Null));
            }
            match literal {
                InputValue::List(items) => items
                    .iter()
                    .map(|item| {
                        coerce_input_literal(schema, inner, &item.item, variables)
                            .map(|v| v.unwrap_or(Value::Null))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(|l| Some(Value::List(l))),
                _ => Ok(Some(Value::List(vec![
                    coerce_input_literal(schema, inner, literal, variables)?
                        .unwrap_or(Value::Null),
                ]))),
            }
        }
        TypeType::Concrete(meta) => {
            if literal.is_null() {
                return Ok(Some(Value::Null));
            }
            match meta {
                MetaType::Scalar(ScalarMeta { parse_fn, .. }) => parse_fn(literal)
                    .map(Some)
                    .map_err(|e| e.message().to_owned()),
                MetaType::Enum(em) => coerce_enum(em, literal, false).map(Some),
                MetaType::InputObject(iom) => {
                    coerce_input_object(schema, iom, literal, variables, |s, t, v, vars| {
                        coerce_input_literal(s, t, v, vars).map(|v| v.unwrap_or(Value::Null))
                    })
                    .map(Some)
                }
                _ => Err(format!("Expected type \"{}\" to be an input type.", meta.name())),
            }
        }
    }
}

fn coerce_enum(em: &EnumMeta, value: &InputValue, allow_string: bool) -> Result<Value, String> {
    let name = match value {
        InputValue::Enum(name) => Some(name.as_str()),
        InputValue::String(name) if allow_string => Some(name.as_str()),
        _ => None,
    };

    match name {
        Some(name) if em.values.iter().any(|v| v.name == name) => Ok(Value::scalar(name)),
        _ => Err(format!(
            "Value \"{value}\" does not exist in \"{}\" enum.",
            em.name,
        )),
    }
}

fn coerce_input_object(
    schema: &SchemaType,
    iom: &InputObjectMeta,
    value: &InputValue,
    variables: &VariableValues,
    coerce_field: impl Fn(&SchemaType, &TypeType<'_>, &InputValue, &VariableValues) -> Result<Value, String>,
) -> Result<Value, String> {
    let Some(entries) = value.to_object_value() else {
        return Err(format!("Expected type \"{}\" to be an object.", iom.name));
    };

    // Keys outside the declared fields are errors.
    for (key, _) in &entries {
        if iom.input_fields.iter().all(|f| f.name != *key) {
            return Err(format!(
                "Field \"{key}\" is not defined by type \"{}\".",
                iom.name,
            ));
        }
    }

    let mut obj = Object::with_capacity(iom.input_fields.len());
    for field in &iom.input_fields {
        let field_type = schema.make_type(&field.arg_type);
        let provided = entries
            .iter()
            .find(|(key, _)| field.name == *key)
            .map(|(_, v)| *v);

        match provided {
            Some(v) => {
                let coerced = coerce_field(schema, &field_type, v, variables)?;
                obj.add_field(field.name.as_str(), coerced);
            }
            None => {
                if let Some(default) = &field.default_value {
                    let coerced =
                        coerce_input_literal(schema, &field_type, default, &HashMap::new())?
                            .unwrap_or(Value::Null);
                    obj.add_field(field.name.as_str(), coerced);
                } else if field.arg_type.is_non_null() {
                    return Err(format!(
                        "Field \"{}\" of required type \"{}\" was not provided.",
                        field.name, field.arg_type,
                    ));
                }
            }
        }
    }

    Ok(Value::Object(obj))
}

/// Builds the coerced argument map for one field invocation.
pub(crate) fn coerce_argument_values(
    schema: &SchemaType,
    field: &Field,
    arguments: Option<&Spanning<Arguments<'_>>>,
    variables: &VariableValues,
) -> Result<Object, FieldError> {
    let mut coerced = Object::with_capacity(field.arguments.len());

    for arg_def in &field.arguments {
        let arg_type = schema.make_type(&arg_def.arg_type);
        let provided = arguments.and_then(|args| args.item.get(&arg_def.name));

        let value = match provided {
            Some(literal) => {
                coerce_input_literal(schema, &arg_type, &literal.item, variables).map_err(
                    |reason| {
                        FieldError::from(format!(
                            "Argument \"{}\" got invalid value {}; {reason}",
                            arg_def.name, literal.item,
                        ))
                    },
                )?
            }
            None => None,
        };

        match value {
            Some(v) => {
                coerced.add_field(arg_def.name.as_str(), v);
            }
            None => {
                if let Some(default) = &arg_def.default_value {
                    let v = coerce_input_literal(schema, &arg_type, default, &HashMap::new())
                        .map_err(|reason| {
                            FieldError::from(format!(
                                "Argument \"{}\" got invalid default value; {reason}",
                                arg_def.name,
                            ))
                        })?
                        .unwrap_or(Value::Null);
                    coerced.add_field(arg_def.name.as_str(), v);
                } else if arg_def.arg_type.is_non_null() {
                    return Err(FieldError::from(format!(
                        "Argument \"{}\" of required type \"{}\" was not provided.",
                        arg_def.name, arg_def.arg_type,
                    )));
                }
            }
        }
    }

    Ok(coerced)
}

/// Resolves a literal all the way to a plain value, used for `@skip` /
/// `@include` arguments during field collection.
pub(crate) fn resolve_directive_bool(
    literal: Option<&Spanning<InputValue>>,
    variables: &VariableValues,
) -> Option<bool> {
    match literal.map(|l| &l.item) {
        Some(InputValue::Boolean(b)) => Some(*b),
        Some(InputValue::Variable(name)) => variables
            .get(name)
            .and_then(Value::as_boolean_value),
        _ => None,
    }
}
