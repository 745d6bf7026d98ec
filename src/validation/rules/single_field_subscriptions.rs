use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{
    ast::{Operation, OperationType, Selection},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct SingleFieldSubscriptions;

pub fn factory() -> SingleFieldSubscriptions {
    SingleFieldSubscriptions
}

impl<'a> Visitor<'a> for SingleFieldSubscriptions {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        if op.item.operation_type != OperationType::Subscription {
            return;
        }

        let op_name = op.item.name.map(|n| n.item);

        let mut fields: IndexMap<&str, Vec<SourcePosition>> = IndexMap::new();
        let mut visited = HashSet::new();
        collect_response_keys(ctx, &op.item.selection_set, &mut visited, &mut fields);

        if fields.len() > 1 {
            let extra_positions: Vec<_> = fields
                .values()
                .skip(1)
                .flatten()
                .copied()
                .collect();
            ctx.report_error(&error_message(op_name), &extra_positions);
        }

        for (name, positions) in &fields {
            if name.starts_with("__") {
                ctx.report_error(&introspection_error_message(op_name), positions);
            }
        }
    }
}

fn collect_response_keys<'a>(
    ctx: &ValidatorContext<'a>,
    selection_set: &'a [Selection<'a>],
    visited: &mut HashSet<&'a str>,
    fields: &mut IndexMap<&'a str, Vec<SourcePosition>>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => {
                fields
                    .entry(field.item.response_key())
                    .or_default()
                    .push(field.item.name.span.start);
            }
            Selection::FragmentSpread(spread) => {
                if visited.insert(spread.item.name.item) {
                    if let Some(fragment) = ctx.fragment(spread.item.name.item) {
                        collect_response_keys(
                            ctx,
                            &fragment.item.selection_set,
                            visited,
                            fields,
                        );
                    }
                }
            }
            Selection::InlineFragment(inline) => {
                collect_response_keys(ctx, &inline.item.selection_set, visited, fields);
            }
        }
    }
}

fn error_message(op_name: Option<&str>) -> String {
    match op_name {
        Some(name) => format!("Subscription \"{name}\" must select only one top level field."),
        None => "Anonymous Subscription must select only one top level field.".into(),
    }
}

fn introspection_error_message(op_name: Option<&str>) -> String {
    match op_name {
        Some(name) => {
            format!("Subscription \"{name}\" must not select an introspection top level field.")
        }
        None => {
            "Anonymous Subscription must not select an introspection top level field.".into()
        }
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
    fn valid_subscription() {
        expect_passes_rule(
            factory,
            r#"
          subscription ImportantEmails {
            importantEmails
          }
        "#,
        );
    }

    #[test]
    fn valid_subscription_through_fragment() {
        expect_passes_rule(
            factory,
            r#"
          subscription ImportantEmails {
            ...emails
          }

          fragment emails on SubscriptionRoot {
            importantEmails
          }
        "#,
        );
    }

    #[test]
    fn fails_with_more_than_one_root_field() {
        expect_fails_rule(
            factory,
            r#"
          subscription ImportantEmails {
            importantEmails
            notImportantEmails
          }
        "#,
            &[RuleError::new(
                &error_message(Some("ImportantEmails")),
                &[SourcePosition::new(82, 3, 12)],
            )],
        );
    }

    #[test]
    fn fails_with_more_than_one_root_field_in_anonymous_subscription() {
        expect_fails_rule(
            factory,
            r#"
          subscription {
            importantEmails
            notImportantEmails
          }
        "#,
            &[RuleError::new(
                &error_message(None),
                &[SourcePosition::new(66, 3, 12)],
            )],
        );
    }
}
