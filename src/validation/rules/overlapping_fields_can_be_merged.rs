//! Validation of selection sets whose fields merge into one response key.
//!
//! Follows the specification's field-merging algorithm: fields sharing a
//! response key must be the same field with the same arguments when they
//! can apply to the same runtime object, and their return types must not
//! conflict in shape; subfields merge recursively. Fragment pairs are
//! compared at most once per direction via a pair set.

use std::collections::{HashMap, HashSet};

use arcstr::ArcStr;
use itertools::Itertools as _;

use crate::{
    ast::{
        Definition, Document, Field as AstField, Fragment, Selection, Type,
    },
    parser::{SourcePosition, Spanning},
    schema::meta::{Field as MetaField, MetaType},
    validation::{ValidatorContext, Visitor},
};

pub struct OverlappingFieldsCanBeMerged<'a> {
    named_fragments: HashMap<&'a str, &'a Spanning<Fragment<'a>>>,
    compared_fragment_pairs: PairSet<'a>,
}

pub fn factory<'a>() -> OverlappingFieldsCanBeMerged<'a> {
    OverlappingFieldsCanBeMerged {
        named_fragments: HashMap::new(),
        compared_fragment_pairs: PairSet::new(),
    }
}

/// A memo of fragment pairs already compared, separately for the mutually
/// exclusive and overlapping cases.
struct PairSet<'a> {
    data: HashSet<(&'a str, &'a str, bool)>,
}

impl<'a> PairSet<'a> {
    fn new() -> Self {
        Self {
            data: HashSet::new(),
        }
    }

    fn contains(&self, a: &'a str, b: &'a str, mutually_exclusive: bool) -> bool {
        self.data.contains(&(a, b, mutually_exclusive))
            || (!mutually_exclusive && self.data.contains(&(a, b, false)))
    }

    fn insert(&mut self, a: &'a str, b: &'a str, mutually_exclusive: bool) {
        self.data.insert((a, b, mutually_exclusive));
        self.data.insert((b, a, mutually_exclusive));
    }
}

#[derive(Clone)]
struct AstAndDef<'a> {
    parent_type: Option<&'a MetaType>,
    field: &'a Spanning<AstField<'a>>,
    meta: Option<&'a MetaField>,
}

type FieldMap<'a> = indexmap::IndexMap<&'a str, Vec<AstAndDef<'a>>>;

enum ConflictReasonMessage<'a> {
    Message(String),
    Nested(Vec<ConflictReason<'a>>),
}

struct ConflictReason<'a>(&'a str, ConflictReasonMessage<'a>);

struct Conflict<'a> {
    reason: ConflictReason<'a>,
    positions: Vec<SourcePosition>,
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        for def in doc {
            if let Definition::Fragment(f) = def {
                self.named_fragments.insert(f.item.name.item, f);
            }
        }
    }

    fn enter_selection_set(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        selection_set: &'a [Selection<'a>],
    ) {
        let parent_type = ctx.parent_type();

        let mut field_map = FieldMap::new();
        let mut fragment_names = Vec::new();
        self.collect_fields_and_fragments(
            ctx,
            parent_type,
            selection_set,
            &mut field_map,
            &mut fragment_names,
        );

        let mut conflicts = Vec::new();
        self.collect_conflicts_within(ctx, &field_map, &mut conflicts);

        for (i, frag_name) in fragment_names.iter().enumerate() {
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                false,
                &field_map,
                frag_name,
                &mut conflicts,
            );

            for other_frag_name in &fragment_names[i + 1..] {
                self.collect_conflicts_between_fragments(
                    ctx,
                    false,
                    frag_name,
                    other_frag_name,
                    &mut conflicts,
                );
            }
        }

        for conflict in conflicts {
            ctx.report_error(
                &error_message(conflict.reason.0, &conflict.reason.1),
                &conflict.positions,
            );
        }
    }
}

impl<'a> OverlappingFieldsCanBeMerged<'a> {
    fn collect_fields_and_fragments(
        &self,
        ctx: &ValidatorContext<'a>,
        parent_type: Option<&'a MetaType>,
        selection_set: &'a [Selection<'a>],
        field_map: &mut FieldMap<'a>,
        fragment_names: &mut Vec<&'a str>,
    ) {
        for selection in selection_set {
            match selection {
                Selection::Field(field) => {
                    let meta = parent_type
                        .and_then(|t| ctx.schema.lookup_field(t, field.item.name.item));
                    field_map
                        .entry(field.item.response_key())
                        .or_default()
                        .push(AstAndDef {
                            parent_type,
                            field,
                            meta,
                        });
                }
                Selection::FragmentSpread(spread) => {
                    if !fragment_names.contains(&spread.item.name.item) {
                        fragment_names.push(spread.item.name.item);
                    }
                }
                Selection::InlineFragment(inline) => {
                    let inline_parent = inline
                        .item
                        .type_condition
                        .as_ref()
                        .and_then(|cond| ctx.schema.concrete_type_by_name(cond.item))
                        .or(parent_type);
                    self.collect_fields_and_fragments(
                        ctx,
                        inline_parent,
                        &inline.item.selection_set,
                        field_map,
                        fragment_names,
                    );
                }
            }
        }
    }

    fn collect_conflicts_within(
        &mut self,
        ctx: &ValidatorContext<'a>,
        field_map: &FieldMap<'a>,
        conflicts: &mut Vec<Conflict<'a>>,
    ) {
        for (response_key, fields) in field_map {
            for (i, field_a) in fields.iter().enumerate() {
                for field_b in &fields[i + 1..] {
                    if let Some(conflict) =
                        self.find_conflict(ctx, response_key, field_a, field_b, false)
                    {
                        conflicts.push(conflict);
                    }
                }
            }
        }
    }

    fn collect_conflicts_between(
        &mut self,
        ctx: &ValidatorContext<'a>,
        mutually_exclusive: bool,
        field_map1: &FieldMap<'a>,
        field_map2: &FieldMap<'a>,
        conflicts: &mut Vec<Conflict<'a>>,
    ) {
        for (response_key, fields1) in field_map1 {
            if let Some(fields2) = field_map2.get(response_key) {
                for field_a in fields1 {
                    for field_b in fields2 {
                        if let Some(conflict) = self.find_conflict(
                            ctx,
                            response_key,
                            field_a,
                            field_b,
                            mutually_exclusive,
                        ) {
                            conflicts.push(conflict);
                        }
                    }
                }
            }
        }
    }

    fn collect_conflicts_between_fields_and_fragment(
        &mut self,
        ctx: &ValidatorContext<'a>,
        mutually_exclusive: bool,
        field_map: &FieldMap<'a>,
        fragment_name: &'a str,
        conflicts: &mut Vec<Conflict<'a>>,
    ) {
        let Some(fragment) = self.named_fragments.get(fragment_name).copied() else {
            return;
        };

        let fragment_parent = ctx
            .schema
            .concrete_type_by_name(fragment.item.type_condition.item);

        let mut fragment_fields = FieldMap::new();
        let mut nested_fragment_names = Vec::new();
        self.collect_fields_and_fragments(
            ctx,
            fragment_parent,
            &fragment.item.selection_set,
            &mut fragment_fields,
            &mut nested_fragment_names,
        );

        self.collect_conflicts_between(
            ctx,
            mutually_exclusive,
            field_map,
            &fragment_fields,
            conflicts,
        );

        for nested in nested_fragment_names {
            if nested != fragment_name {
                self.collect_conflicts_between_fields_and_fragment(
                    ctx,
                    mutually_exclusive,
                    field_map,
                    nested,
                    conflicts,
                );
            }
        }
    }

    fn collect_conflicts_between_fragments(
        &mut self,
        ctx: &ValidatorContext<'a>,
        mutually_exclusive: bool,
        fragment_name1: &'a str,
        fragment_name2: &'a str,
        conflicts: &mut Vec<Conflict<'a>>,
    ) {
        if fragment_name1 == fragment_name2 {
            return;
        }
        if self
            .compared_fragment_pairs
            .contains(fragment_name1, fragment_name2, mutually_exclusive)
        {
            return;
        }
        self.compared_fragment_pairs
            .insert(fragment_name1, fragment_name2, mutually_exclusive);

        let (Some(fragment1), Some(fragment2)) = (
            self.named_fragments.get(fragment_name1).copied(),
            self.named_fragments.get(fragment_name2).copied(),
        ) else {
            return;
        };

        let parent1 = ctx
            .schema
            .concrete_type_by_name(fragment1.item.type_condition.item);
        let parent2 = ctx
            .schema
            .concrete_type_by_name(fragment2.item.type_condition.item);

        let mut fields1 = FieldMap::new();
        let mut nested1 = Vec::new();
        self.collect_fields_and_fragments(
            ctx,
            parent1,
            &fragment1.item.selection_set,
            &mut fields1,
            &mut nested1,
        );
        let mut fields2 = FieldMap::new();
        let mut nested2 = Vec::new();
        self.collect_fields_and_fragments(
            ctx,
            parent2,
            &fragment2.item.selection_set,
            &mut fields2,
            &mut nested2,
        );

        self.collect_conflicts_between(ctx, mutually_exclusive, &fields1, &fields2, conflicts);

        for nested in nested2 {
            self.collect_conflicts_between_fragments(
                ctx,
                mutually_exclusive,
                fragment_name1,
                nested,
                conflicts,
            );
        }
        for nested in nested1 {
            self.collect_conflicts_between_fragments(
                ctx,
                mutually_exclusive,
                nested,
                fragment_name2,
                conflicts,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_conflicts_between_sub_selection_sets(
        &mut self,
        ctx: &ValidatorContext<'a>,
        mutually_exclusive: bool,
        parent1: Option<&'a MetaType>,
        selection_set1: &'a [Selection<'a>],
        parent2: Option<&'a MetaType>,
        selection_set2: &'a [Selection<'a>],
    ) -> Vec<Conflict<'a>> {
        let mut conflicts = Vec::new();

        let mut fields1 = FieldMap::new();
        let mut fragments1 = Vec::new();
        self.collect_fields_and_fragments(ctx, parent1, selection_set1, &mut fields1, &mut fragments1);

        let mut fields2 = FieldMap::new();
        let mut fragments2 = Vec::new();
        self.collect_fields_and_fragments(ctx, parent2, selection_set2, &mut fields2, &mut fragments2);

        self.collect_conflicts_between(ctx, mutually_exclusive, &fields1, &fields2, &mut conflicts);

        for fragment in &fragments2 {
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                mutually_exclusive,
                &fields1,
                fragment,
                &mut conflicts,
            );
        }
        for fragment in &fragments1 {
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                mutually_exclusive,
                &fields2,
                fragment,
                &mut conflicts,
            );
        }
        for fragment1 in &fragments1 {
            for fragment2 in &fragments2 {
                self.collect_conflicts_between_fragments(
                    ctx,
                    mutually_exclusive,
                    fragment1,
                    fragment2,
                    &mut conflicts,
                );
            }
        }

        conflicts
    }

    fn find_conflict(
        &mut self,
        ctx: &ValidatorContext<'a>,
        response_key: &'a str,
        field1: &AstAndDef<'a>,
        field2: &AstAndDef<'a>,
        parents_mutually_exclusive: bool,
    ) -> Option<Conflict<'a>> {
        // Two fields on provably different concrete object types can never
        // both apply to the same runtime object.
        let mutually_exclusive = parents_mutually_exclusive
            || match (field1.parent_type, field2.parent_type) {
                (Some(p1), Some(p2)) => {
                    !std::ptr::eq(p1, p2)
                        && matches!(p1, MetaType::Object(..))
                        && matches!(p2, MetaType::Object(..))
                }
                _ => false,
            };

        if !mutually_exclusive {
            let name1 = field1.field.item.name.item;
            let name2 = field2.field.item.name.item;

            if name1 != name2 {
                return Some(Conflict {
                    reason: ConflictReason(
                        response_key,
                        ConflictReasonMessage::Message(format!(
                            "\"{name1}\" and \"{name2}\" are different fields"
                        )),
                    ),
                    positions: vec![field1.field.span.start, field2.field.span.start],
                });
            }

            if !same_arguments(field1.field, field2.field) {
                return Some(Conflict {
                    reason: ConflictReason(
                        response_key,
                        ConflictReasonMessage::Message("they have differing arguments".into()),
                    ),
                    positions: vec![field1.field.span.start, field2.field.span.start],
                });
            }
        }

        let type1 = field1.meta.map(|m| &m.field_type);
        let type2 = field2.meta.map(|m| &m.field_type);

        if let (Some(t1), Some(t2)) = (type1, type2) {
            if do_types_conflict(ctx, t1, t2) {
                return Some(Conflict {
                    reason: ConflictReason(
                        response_key,
                        ConflictReasonMessage::Message(format!(
                            "they return conflicting types \"{t1}\" and \"{t2}\""
                        )),
                    ),
                    positions: vec![field1.field.span.start, field2.field.span.start],
                });
            }
        }

        if let (Some(set1), Some(set2)) = (
            &field1.field.item.selection_set,
            &field2.field.item.selection_set,
        ) {
            let sub_parent1 =
                type1.and_then(|t| ctx.schema.concrete_type_by_name(t.innermost_name()));
            let sub_parent2 =
                type2.and_then(|t| ctx.schema.concrete_type_by_name(t.innermost_name()));

            let sub_conflicts = self.collect_conflicts_between_sub_selection_sets(
                ctx,
                mutually_exclusive,
                sub_parent1,
                set1,
                sub_parent2,
                set2,
            );

            if !sub_conflicts.is_empty() {
                let mut positions = vec![field1.field.span.start, field2.field.span.start];
                let mut reasons = Vec::new();
                for conflict in sub_conflicts {
                    positions.extend(conflict.positions);
                    reasons.push(conflict.reason);
                }

                return Some(Conflict {
                    reason: ConflictReason(response_key, ConflictReasonMessage::Nested(reasons)),
                    positions,
                });
            }
        }

        None
    }
}

fn same_arguments(field1: &Spanning<AstField<'_>>, field2: &Spanning<AstField<'_>>) -> bool {
    let empty = [];
    let args1 = field1
        .item
        .arguments
        .as_ref()
        .map(|a| a.item.items.as_slice())
        .unwrap_or(&empty);
    let args2 = field2
        .item
        .arguments
        .as_ref()
        .map(|a| a.item.items.as_slice())
        .unwrap_or(&empty);

    if args1.len() != args2.len() {
        return false;
    }

    args1.iter().all(|(name1, value1)| {
        args2
            .iter()
            .find(|(name2, _)| name1.item == name2.item)
            .is_some_and(|(_, value2)| value1.item.unlocated_eq(&value2.item))
    })
}

fn do_types_conflict(ctx: &ValidatorContext<'_>, t1: &Type<ArcStr>, t2: &Type<ArcStr>) -> bool {
    use Type::{List, Named, NonNullList, NonNullNamed};

    match (t1, t2) {
        (List(inner1), List(inner2)) | (NonNullList(inner1), NonNullList(inner2)) => {
            do_types_conflict(ctx, inner1, inner2)
        }
        (NonNullNamed(name1), NonNullNamed(name2)) | (Named(name1), Named(name2)) => {
            names_conflict(ctx, name1, name2)
        }
        _ => true,
    }
}

fn names_conflict(ctx: &ValidatorContext<'_>, name1: &ArcStr, name2: &ArcStr) -> bool {
    if name1 == name2 {
        return false;
    }

    let is_leaf = |name: &ArcStr| {
        ctx.schema
            .concrete_type_by_name(name)
            .is_some_and(MetaType::is_leaf)
    };

    // Composite types merge through their subfields; leaves must agree.
    is_leaf(name1) || is_leaf(name2)
}

fn error_message(response_key: &str, reason: &ConflictReasonMessage<'_>) -> String {
    format!(
        "Fields \"{response_key}\" conflict because {}. Use different aliases on the fields to fetch both if this was intentional.",
        format_reason(reason),
    )
}

fn format_reason(reason: &ConflictReasonMessage<'_>) -> String {
    match reason {
        ConflictReasonMessage::Message(message) => message.clone(),
        ConflictReasonMessage::Nested(reasons) => reasons
            .iter()
            .map(|ConflictReason(key, subreason)| {
                format!("subfields \"{key}\" conflict because {}", format_reason(subreason))
            })
            .join(" and "),
    }
}

#[cfg(test)]
mod tests {
    use super::factory;

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn unique_fields() {
        expect_passes_rule(
            factory,
            r#"
          fragment uniqueFields on Dog {
            name
            nickname
          }
        "#,
        );
    }

    #[test]
    fn identical_fields() {
        expect_passes_rule(
            factory,
            r#"
          fragment mergeIdenticalFields on Dog {
            name
            name
          }
        "#,
        );
    }

    #[test]
    fn identical_fields_with_identical_args() {
        expect_passes_rule(
            factory,
            r#"
          fragment mergeIdenticalFieldsWithIdenticalArgs on Dog {
            doesKnowCommand(dogCommand: SIT)
            doesKnowCommand(dogCommand: SIT)
          }
        "#,
        );
    }

    #[test]
    fn different_args_with_different_aliases() {
        expect_passes_rule(
            factory,
            r#"
          fragment differentArgsWithDifferentAliases on Dog {
            knowsSit: doesKnowCommand(dogCommand: SIT)
            knowsDown: doesKnowCommand(dogCommand: DOWN)
          }
        "#,
        );
    }

    #[test]
    fn same_aliases_with_different_field_targets() {
        expect_fails_rule(
            factory,
            r#"
          fragment sameAliasesWithDifferentFieldTargets on Dog {
            fido: name
            fido: nickname
          }
        "#,
            &[RuleError::new(
                "Fields \"fido\" conflict because \"name\" and \"nickname\" are different fields. Use different aliases on the fields to fetch both if this was intentional.",
                &[
                    SourcePosition::new(78, 2, 12),
                    SourcePosition::new(101, 3, 12),
                ],
            )],
        );
    }

    #[test]
    fn different_args_second_adds_an_argument() {
        expect_fails_rule(
            factory,
            r#"
          fragment conflictingArgs on Dog {
            doesKnowCommand
            doesKnowCommand(dogCommand: HEEL)
          }
        "#,
            &[RuleError::new(
                "Fields \"doesKnowCommand\" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional.",
                &[
                    SourcePosition::new(57, 2, 12),
                    SourcePosition::new(85, 3, 12),
                ],
            )],
        );
    }

    #[test]
    fn allows_different_args_where_no_conflict_is_possible() {
        expect_passes_rule(
            factory,
            r#"
          fragment conflictingArgs on Pet {
            ... on Dog {
              name(surname: true)
            }
            ... on Cat {
              name
            }
          }
        "#,
        );
    }

    #[test]
    fn reports_deep_conflict() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog {
              barkVolume
            }
            dog {
              barkVolume: barks
            }
          }
        "#,
            &[RuleError::new(
                "Fields \"dog\" conflict because subfields \"barkVolume\" conflict because \"barkVolume\" and \"barks\" are different fields. Use different aliases on the fields to fetch both if this was intentional.",
                &[
                    SourcePosition::new(25, 2, 12),
                    SourcePosition::new(82, 5, 12),
                    SourcePosition::new(45, 3, 14),
                    SourcePosition::new(102, 6, 14),
                ],
            )],
        );
    }
}
