use crate::{
    ast::{Fragment, InlineFragment},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        {
            if let Some(current_type) = ctx.current_type() {
                if !current_type.is_composite() {
                    let type_name = &f.item.type_condition.item;

                    ctx.report_error(
                        &error_message(Some(f.item.name.item), type_name),
                        &[f.item.type_condition.span.start],
                    );
                }
            }
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<InlineFragment<'a>>,
    ) {
        {
            if let Some(current_type) = ctx.current_type() {
                if !current_type.is_composite() {
                    if let Some(type_cond) = &f.item.type_condition {
                        ctx.report_error(
                            &error_message(None, type_cond.item),
                            &[type_cond.span.start],
                        );
                    }
                }
            }
        }
    }
}

fn error_message(fragment_name: Option<&str>, on_type: &str) -> String {
    match fragment_name {
        Some(name) => format!(
            "Fragment \"{name}\" cannot condition on non composite type \"{on_type}\"."
        ),
        None => format!("Fragment cannot condition on non composite type \"{on_type}\"."),
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn on_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment validFragment on Dog {
            barks
          }
        "#,
        );
    }

    #[test]
    fn on_interface() {
        expect_passes_rule(
            factory,
            r#"
          fragment validFragment on Pet {
            name
          }
        "#,
        );
    }

    #[test]
    fn on_union() {
        expect_passes_rule(
            factory,
            r#"
          fragment validFragment on CatOrDog {
            __typename
          }
        "#,
        );
    }

    #[test]
    fn not_on_scalar() {
        expect_fails_rule(
            factory,
            r#"
          fragment scalarFragment on Boolean {
            bad
          }
        "#,
            &[RuleError::new(
                &error_message(Some("scalarFragment"), "Boolean"),
                &[SourcePosition::new(38, 1, 37)],
            )],
        );
    }

    #[test]
    fn not_on_enum() {
        expect_fails_rule(
            factory,
            r#"
          fragment scalarFragment on FurColor {
            bad
          }
        "#,
            &[RuleError::new(
                &error_message(Some("scalarFragment"), "FurColor"),
                &[SourcePosition::new(38, 1, 37)],
            )],
        );
    }

    #[test]
    fn inline_not_on_scalar() {
        expect_fails_rule(
            factory,
            r#"
          {
            catOrDog {
              ... on String {
                name
              }
            }
          }
        "#,
            &[RuleError::new(
                &error_message(None, "String"),
                &[SourcePosition::new(57, 3, 21)],
            )],
        );
    }
}
