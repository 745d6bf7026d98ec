use crate::{
    ast::FragmentSpread,
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownFragmentNames;

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        let spread_name = &spread.item.name;
        if !ctx.is_known_fragment(spread_name.item) {
            ctx.report_error(&error_message(spread_name.item), &[spread_name.span.start]);
        }
    }
}

fn error_message(frag_name: &str) -> String {
    format!("Unknown fragment \"{frag_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn known() {
        expect_passes_rule(
            factory,
            r#"
          {
            human(id: 4) {
              ...HumanFields
            }
          }
          fragment HumanFields on Human {
            name
          }
        "#,
        );
    }

    #[test]
    fn unknown() {
        expect_fails_rule(
            factory,
            r#"
          {
            human(id: 4) {
              ...UnknownFragment1
            }
          }
        "#,
            &[RuleError::new(
                &error_message("UnknownFragment1"),
                &[SourcePosition::new(57, 3, 17)],
            )],
        );
    }
}
