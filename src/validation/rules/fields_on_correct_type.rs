use crate::{
    ast::Field,
    parser::Spanning,
    schema::meta::MetaType,
    util,
    validation::{ValidatorContext, Visitor},
};

pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field<'a>>) {
        {
            if let Some(parent_type) = ctx.parent_type() {
                let field_name = &field.item.name;

                if ctx.schema.lookup_field(parent_type, field_name.item).is_none() {
                    // `__typename` is legal on a union even though the
                    // union itself declares no fields; `lookup_field`
                    // already accounts for the meta fields.
                    let suggestions = match parent_type {
                        MetaType::Union(..) => Vec::new(),
                        _ => util::suggestion_list(
                            field_name.item,
                            parent_type
                                .fields()
                                .unwrap_or_default()
                                .iter()
                                .map(|f| f.name.as_str()),
                        ),
                    };

                    ctx.report_error(
                        &error_message(
                            field_name.item,
                            parent_type.name(),
                            &util::did_you_mean(&suggestions),
                        ),
                        &[field_name.span.start],
                    );
                }
            }
        }
    }
}

fn error_message(field: &str, type_name: &str, suggestion: &str) -> String {
    format!("Cannot query field \"{field}\" on type \"{type_name}\".{suggestion}")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn selection_on_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectFieldSelection on Dog {
            __typename
            name
          }
        "#,
        );
    }

    #[test]
    fn aliased_selection_on_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment aliasedObjectFieldSelection on Dog {
            tn : __typename
            otherName : name
          }
        "#,
        );
    }

    #[test]
    fn selection_on_interface() {
        expect_passes_rule(
            factory,
            r#"
          fragment interfaceFieldSelection on Pet {
            __typename
            name
          }
        "#,
        );
    }

    #[test]
    fn lying_alias_selection() {
        expect_passes_rule(
            factory,
            r#"
          fragment lyingAliasSelection on Dog {
            name : nickname
          }
        "#,
        );
    }

    #[test]
    fn ignores_unknown_type() {
        expect_passes_rule(
            factory,
            r#"
          fragment unknownSelection on UnknownType {
            unknownField
          }
        "#,
        );
    }

    #[test]
    fn unknown_field_on_fragment() {
        expect_fails_rule(
            factory,
            r#"
          fragment fieldNotDefined on Dog {
            meowVolume
          }
        "#,
            &[RuleError::new(
                &error_message("meowVolume", "Dog", " Did you mean \"barkVolume\"?"),
                &[SourcePosition::new(57, 2, 12)],
            )],
        );
    }

    #[test]
    fn unknown_deeply_only_reports_first() {
        expect_fails_rule(
            factory,
            r#"
          fragment deepFieldNotDefined on Dog {
            unknown_field {
              deeper_unknown_field
            }
          }
        "#,
            &[RuleError::new(
                &error_message("unknown_field", "Dog", ""),
                &[SourcePosition::new(61, 2, 12)],
            )],
        );
    }

    #[test]
    fn meta_field_on_union() {
        expect_passes_rule(
            factory,
            r#"
          fragment unionQuery on CatOrDog {
            __typename
          }
        "#,
        );
    }

    #[test]
    fn fields_on_union() {
        expect_fails_rule(
            factory,
            r#"
          fragment unionQuery on CatOrDog {
            name
          }
        "#,
            &[RuleError::new(
                &error_message("name", "CatOrDog", ""),
                &[SourcePosition::new(57, 2, 12)],
            )],
        );
    }
}
