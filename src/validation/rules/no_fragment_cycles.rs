use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread},
    parser::{SourcePosition, Spanning},
    validation::{RuleError, ValidatorContext, Visitor},
};

pub fn factory<'a>() -> NoFragmentCycles<'a> {
    NoFragmentCycles {
        current_fragment: None,
        spreads: HashMap::new(),
        fragment_order: Vec::new(),
    }
}

struct SpreadRef<'a> {
    name: &'a str,
    position: SourcePosition,
}

pub struct NoFragmentCycles<'a> {
    current_fragment: Option<&'a str>,
    spreads: HashMap<&'a str, Vec<SpreadRef<'a>>>,
    fragment_order: Vec<&'a str>,
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document<'a>) {
        assert!(self.current_fragment.is_none());

        let mut detector = CycleDetector {
            visited: HashSet::new(),
            spreads: &self.spreads,
            errors: Vec::new(),
        };

        for frag in &self.fragment_order {
            if !detector.visited.contains(frag) {
                detector.detect_from(frag);
            }
        }

        ctx.append_errors(detector.errors);
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        assert!(self.current_fragment.is_none());

        let fragment_name = fragment.item.name.item;
        self.current_fragment = Some(fragment_name);
        self.fragment_order.push(fragment_name);
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        assert_eq!(Some(fragment.item.name.item), self.current_fragment);
        self.current_fragment = None;
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        if let Some(current_fragment) = self.current_fragment {
            self.spreads
                .entry(current_fragment)
                .or_default()
                .push(SpreadRef {
                    name: spread.item.name.item,
                    position: spread.span.start,
                });
        }
    }
}

type CycleDetectorState<'a, 'b> = (&'a str, Vec<&'b SpreadRef<'a>>, HashMap<&'a str, usize>);

struct CycleDetector<'a, 'b> {
    visited: HashSet<&'a str>,
    spreads: &'b HashMap<&'a str, Vec<SpreadRef<'a>>>,
    errors: Vec<RuleError>,
}

impl<'a, 'b> CycleDetector<'a, 'b> {
    fn detect_from(&mut self, from: &'a str) {
        let mut to_visit = Vec::new();
        to_visit.push((from, Vec::new(), HashMap::new()));

        while let Some((from, path, path_indices)) = to_visit.pop() {
            to_visit.extend(self.detect_from_inner(from, path, path_indices));
        }
    }

    /// Iterative counterpart of the recursive walk, visiting pending
    /// states off a heap-allocated stack.
    fn detect_from_inner(
        &mut self,
        from: &'a str,
        path: Vec<&'b SpreadRef<'a>>,
        mut path_indices: HashMap<&'a str, usize>,
    ) -> Vec<CycleDetectorState<'a, 'b>> {
        self.visited.insert(from);

        if !self.spreads.contains_key(from) {
            return Vec::new();
        }

        path_indices.insert(from, path.len());

        let mut to_visit = Vec::new();
        for node in &self.spreads[from] {
            let name = node.name;
            let index = path_indices.get(name).copied();

            if let Some(index) = index {
                let err_node = if index < path.len() {
                    path[index]
                } else {
                    node
                };
                let via: Vec<&str> = path[index..].iter().map(|s| s.name).collect();

                self.errors
                    .push(RuleError::new(&error_message(name, &via), &[err_node.position]));
            } else {
                let mut path = path.clone();
                path.push(node);
                to_visit.push((name, path, path_indices.clone()));
            }
        }

        to_visit
    }
}

fn error_message(frag_name: &str, via: &[&str]) -> String {
    if via.is_empty() {
        format!("Cannot spread fragment \"{frag_name}\" within itself.")
    } else {
        format!(
            "Cannot spread fragment \"{frag_name}\" within itself via {}.",
            via.iter()
                .map(|name| format!("\"{name}\""))
                .collect::<Vec<_>>()
                .join(", "),
        )
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
    fn single_reference_is_valid() {
        expect_passes_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB }
          fragment fragB on Dog { name }
        "#,
        );
    }

    #[test]
    fn spreading_twice_is_not_circular() {
        expect_passes_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB, ...fragB }
          fragment fragB on Dog { name }
        "#,
        );
    }

    #[test]
    fn double_spread_within_abstract_types() {
        expect_passes_rule(
            factory,
            r#"
          fragment nameFragment on Pet {
            ... on Dog { name }
            ... on Cat { name }
          }

          fragment spreadsInAnon on Pet {
            ... on Dog { ...nameFragment }
            ... on Cat { ...nameFragment }
          }
        "#,
        );
    }

    #[test]
    fn does_not_false_positive_on_unknown_fragment() {
        expect_passes_rule(
            factory,
            r#"
          fragment nameFragment on Pet {
            ...UnknownFragment
          }
        "#,
        );
    }

    #[test]
    fn no_spreading_itself_directly() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragA }
        "#,
            &[RuleError::new(
                &error_message("fragA", &[]),
                &[SourcePosition::new(35, 1, 34)],
            )],
        );
    }

    #[test]
    fn no_spreading_itself_indirectly() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB }
          fragment fragB on Dog { ...fragA }
        "#,
            &[RuleError::new(
                &error_message("fragA", &["fragB"]),
                &[SourcePosition::new(35, 1, 34)],
            )],
        );
    }

    #[test]
    fn no_spreading_itself_deeply_two_paths() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB, ...fragC }
          fragment fragB on Dog { ...fragA }
          fragment fragC on Dog { ...fragA }
        "#,
            &[
                RuleError::new(
                    &error_message("fragA", &["fragB"]),
                    &[SourcePosition::new(35, 1, 34)],
                ),
                RuleError::new(
                    &error_message("fragA", &["fragC"]),
                    &[SourcePosition::new(45, 1, 44)],
                ),
            ],
        );
    }
}
