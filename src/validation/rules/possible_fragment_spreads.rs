use std::collections::HashMap;

use crate::{
    ast::{Definition, Document, FragmentSpread, InlineFragment},
    parser::Spanning,
    schema::meta::MetaType,
    validation::{ValidatorContext, Visitor},
};

pub struct PossibleFragmentSpreads<'a> {
    fragment_types: HashMap<&'a str, &'a MetaType>,
}

pub fn factory<'a>() -> PossibleFragmentSpreads<'a> {
    PossibleFragmentSpreads {
        fragment_types: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for PossibleFragmentSpreads<'a> {
    fn enter_document(&mut self, ctx: &mut ValidatorContext<'a>, defs: &'a Document<'a>) {
        for def in defs {
            if let Definition::Fragment(f) = def {
                if let Some(t) = ctx
                    .schema
                    .concrete_type_by_name(f.item.type_condition.item)
                {
                    self.fragment_types.insert(f.item.name.item, t);
                }
            }
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &'a Spanning<InlineFragment<'a>>,
    ) {
        if let (Some(parent_type), Some(frag_type)) = (
            ctx.parent_type(),
            frag.item
                .type_condition
                .as_ref()
                .and_then(|s| ctx.schema.concrete_type_by_name(s.item)),
        ) {
            if frag_type.is_composite()
                && parent_type.is_composite()
                && !ctx.schema.type_overlap(parent_type, frag_type)
            {
                ctx.report_error(
                    &inline_error_message(parent_type.name(), frag_type.name()),
                    &[frag.span.start],
                );
            }
        }
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        if let (Some(parent_type), Some(frag_type)) = (
            ctx.parent_type(),
            self.fragment_types.get(spread.item.name.item),
        ) {
            if frag_type.is_composite()
                && parent_type.is_composite()
                && !ctx.schema.type_overlap(parent_type, frag_type)
            {
                ctx.report_error(
                    &error_message(
                        spread.item.name.item,
                        parent_type.name(),
                        frag_type.name(),
                    ),
                    &[spread.span.start],
                );
            }
        }
    }
}

fn error_message(frag_name: &str, parent_type_name: &str, frag_type: &str) -> String {
    format!(
        "Fragment \"{frag_name}\" cannot be spread here as objects of type \"{parent_type_name}\" can never be of type \"{frag_type}\"."
    )
}

fn inline_error_message(parent_type_name: &str, frag_type: &str) -> String {
    format!(
        "Fragment cannot be spread here as objects of type \"{parent_type_name}\" can never be of type \"{frag_type}\"."
    )
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory, inline_error_message};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn of_the_same_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectWithinObject on Dog { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }
        "#,
        );
    }

    #[test]
    fn object_into_implemented_interface() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectWithinInterface on Pet { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }
        "#,
        );
    }

    #[test]
    fn object_into_containing_union() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectWithinUnion on CatOrDog { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }
        "#,
        );
    }

    #[test]
    fn interface_into_implemented_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment interfaceWithinObject on Dog { ...petFragment }
          fragment petFragment on Pet { name }
        "#,
        );
    }

    #[test]
    fn interface_into_overlapping_interface() {
        // `Being` and `Pet` share several possible object types.
        expect_passes_rule(
            factory,
            r#"
          fragment interfaceWithinInterface on Pet { ...beingFragment }
          fragment beingFragment on Being { name }
        "#,
        );
    }

    #[test]
    fn interface_into_non_overlapping_interface() {
        // No object implements both `Pet` and `Intelligent`.
        expect_fails_rule(
            factory,
            r#"
          fragment invalidInterfaceWithinInterface on Pet { ...intelligentFragment }
          fragment intelligentFragment on Intelligent { iq }
        "#,
            &[RuleError::new(
                &error_message("intelligentFragment", "Pet", "Intelligent"),
                &[SourcePosition::new(61, 1, 60)],
            )],
        );
    }

    #[test]
    fn different_object_into_object() {
        expect_fails_rule(
            factory,
            r#"
          fragment invalidObjectWithinObject on Cat { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }
        "#,
            &[RuleError::new(
                &error_message("dogFragment", "Cat", "Dog"),
                &[SourcePosition::new(55, 1, 54)],
            )],
        );
    }

    #[test]
    fn different_object_into_object_in_inline_fragment() {
        expect_fails_rule(
            factory,
            r#"
          fragment invalidObjectWithinObjectAnon on Cat {
            ... on Dog { barkVolume }
          }
        "#,
            &[RuleError::new(
                &inline_error_message("Cat", "Dog"),
                &[SourcePosition::new(71, 2, 12)],
            )],
        );
    }

    #[test]
    fn unions_do_not_overlap() {
        expect_fails_rule(
            factory,
            r#"
          fragment invalidUnionWithinUnion on CatOrDog { ...humanOrAlienFragment }
          fragment humanOrAlienFragment on HumanOrAlien { __typename }
        "#,
            &[RuleError::new(
                &error_message("humanOrAlienFragment", "CatOrDog", "HumanOrAlien"),
                &[SourcePosition::new(58, 1, 57)],
            )],
        );
    }
}
