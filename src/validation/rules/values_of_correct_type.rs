use arcstr::ArcStr;

use crate::{
    ast::{InputValue, Type},
    parser::{Span, Spanning},
    schema::meta::{EnumMeta, MetaType, ScalarMeta},
    util,
    validation::{ValidatorContext, Visitor},
};

/// Checks every constant literal against the input type of its position.
pub struct ValuesOfCorrectType;

pub fn factory() -> ValuesOfCorrectType {
    ValuesOfCorrectType
}

/// Strips the current position's type down to the named type a plain
/// (non-list, non-object) literal must satisfy. Single values are allowed
/// in list positions, so list wrappers unwrap transparently.
fn innermost_named<'t>(mut t: &'t Type<ArcStr>) -> &'t ArcStr {
    loop {
        match t {
            Type::Named(n) | Type::NonNullNamed(n) => return n,
            Type::List(inner) | Type::NonNullList(inner) => t = inner,
        }
    }
}

impl ValuesOfCorrectType {
    fn check_scalar_literal(
        &self,
        ctx: &mut ValidatorContext<'_>,
        literal: &InputValue,
        span: Span,
    ) {
        let Some(expected) = ctx.current_input_type_literal() else {
            return;
        };
        let type_name = innermost_named(expected).clone();

        // The schema borrow is independent of the context borrow, so metadata
        // can be held across `report_error`.
        let schema = ctx.schema;

        match schema.concrete_type_by_name(&type_name) {
            Some(MetaType::Scalar(ScalarMeta { parse_fn, .. })) => {
                if parse_fn(literal).is_err() {
                    ctx.report_error(&type_error_message(&type_name, literal), &[span.start]);
                }
            }
            Some(MetaType::Enum(em)) => {
                let message = match literal {
                    InputValue::Enum(name) if em.values.iter().any(|v| v.name == *name) => None,
                    InputValue::String(name) => Some(format!(
                        "Enum \"{type_name}\" cannot represent non-enum value: \"{name}\".{}",
                        enum_suggestion(em, name),
                    )),
                    InputValue::Enum(name) => Some(format!(
                        "Value \"{name}\" does not exist in \"{type_name}\" enum.{}",
                        enum_suggestion(em, name),
                    )),
                    other => Some(format!(
                        "Enum \"{type_name}\" cannot represent non-enum value: {other}.",
                    )),
                };
                if let Some(message) = message {
                    ctx.report_error(&message, &[span.start]);
                }
            }
            Some(MetaType::InputObject(..)) => {
                ctx.report_error(&type_error_message(&type_name, literal), &[span.start]);
            }
            _ => {}
        }
    }
}

fn enum_suggestion(em: &EnumMeta, input: &str) -> String {
    let suggestions =
        util::suggestion_list(input, em.values.iter().map(|v| v.name.as_str()));
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" Did you mean the enum value {}?", util::quoted_or_list(&suggestions))
    }
}

fn type_error_message(type_name: &str, literal: &InputValue) -> String {
    format!("Expected value of type \"{type_name}\", found {literal}.")
}

impl<'a> Visitor<'a> for ValuesOfCorrectType {
    fn enter_null_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<()>) {
        if let Some(expected) = ctx.current_input_type_literal() {
            if expected.is_non_null() {
                let expected = expected.to_string();
                ctx.report_error(
                    &format!("Expected value of type \"{expected}\", found null."),
                    &[value.span.start],
                );
            }
        }
    }

    fn enter_int_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<i32>) {
        self.check_scalar_literal(ctx, &InputValue::Int(value.item), value.span);
    }

    fn enter_float_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<f64>) {
        self.check_scalar_literal(ctx, &InputValue::Float(value.item), value.span);
    }

    fn enter_string_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<&'a String>) {
        self.check_scalar_literal(ctx, &InputValue::String(value.item.clone()), value.span);
    }

    fn enter_boolean_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<bool>) {
        self.check_scalar_literal(ctx, &InputValue::Boolean(value.item), value.span);
    }

    fn enter_enum_value(&mut self, ctx: &mut ValidatorContext<'a>, value: Spanning<&'a String>) {
        self.check_scalar_literal(ctx, &InputValue::Enum(value.item.clone()), value.span);
    }

    fn enter_object_value(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        value: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
    ) {
        let Some(expected) = ctx.current_input_type_literal() else {
            return;
        };
        let type_name = innermost_named(expected).clone();

        let schema = ctx.schema;
        let Some(meta) = schema.concrete_type_by_name(&type_name) else {
            return;
        };

        match meta {
            MetaType::InputObject(io) => {
                // Non-`null` fields without a value or default are errors.
                for field in &io.input_fields {
                    let provided = value.item.iter().any(|(k, _)| k.item == *field.name);
                    if field.arg_type.is_non_null()
                        && field.default_value.is_none()
                        && !provided
                    {
                        ctx.report_error(
                            &format!(
                                "Field \"{type_name}.{}\" of required type \"{}\" was not provided.",
                                field.name, field.arg_type,
                            ),
                            &[value.span.start],
                        );
                    }
                }

                // Keys outside the declared fields are errors.
                for (field_name, _) in value.item {
                    if io.input_fields.iter().all(|f| f.name != *field_name.item) {
                        let suggestions = util::suggestion_list(
                            &field_name.item,
                            io.input_fields.iter().map(|f| f.name.as_str()),
                        );
                        ctx.report_error(
                            &format!(
                                "Field \"{}\" is not defined by type \"{type_name}\".{}",
                                field_name.item,
                                util::did_you_mean(&suggestions),
                            ),
                            &[field_name.span.start],
                        );
                    }
                }
            }
            MetaType::Scalar(ScalarMeta { parse_fn, .. }) => {
                // Custom scalars may accept object literals.
                let literal = InputValue::Object(value.item.clone());
                if parse_fn(&literal).is_err() {
                    ctx.report_error(&type_error_message(&type_name, &literal), &[value.span.start]);
                }
            }
            _ => {
                let literal = InputValue::Object(value.item.clone());
                ctx.report_error(&type_error_message(&type_name, &literal), &[value.span.start]);
            }
        }
    }
}
