use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::Fragment,
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueFragmentNames<'a> {
    names: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueFragmentNames<'a> {
    UniqueFragmentNames {
        names: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueFragmentNames<'a> {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        match self.names.entry(f.item.name.item) {
            Entry::Occupied(e) => {
                ctx.report_error(
                    &duplicate_message(f.item.name.item),
                    &[*e.get(), f.item.name.span.start],
                );
            }
            Entry::Vacant(e) => {
                e.insert(f.item.name.span.start);
            }
        }
    }
}

fn duplicate_message(frag_name: &str) -> String {
    format!("There can be only one fragment named \"{frag_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{duplicate_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn no_fragments() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              name
            }
          }
        "#,
        );
    }

    #[test]
    fn one_fragment() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              ...fragA
            }
          }

          fragment fragA on Dog {
            name
          }
        "#,
        );
    }

    #[test]
    fn rule_is_only_about_fragment_names() {
        expect_passes_rule(
            factory,
            r#"
          {
            fragA: dog {
              name
            }
          }

          fragment fragA on Dog {
            name
          }
        "#,
        );
    }

    #[test]
    fn fragments_named_the_same() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog {
              ...fragA
            }
          }

          fragment fragA on Dog {
            name
          }

          fragment fragA on Dog {
            nickname
          }
        "#,
            &[RuleError::new(
                &duplicate_message("fragA"),
                &[
                    SourcePosition::new(100, 7, 19),
                    SourcePosition::new(164, 11, 19),
                ],
            )],
        );
    }
}
