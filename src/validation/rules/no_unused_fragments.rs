use std::collections::HashSet;

use crate::{
    ast::{Definition, Document, Fragment, FragmentSpread, Operation},
    parser::Spanning,
    validation::{RuleError, ValidatorContext, Visitor},
};

enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub struct NoUnusedFragments<'a> {
    spreads: Vec<(Scope<'a>, Vec<&'a str>)>,
    current_scope: Option<Scope<'a>>,
}

pub fn factory<'a>() -> NoUnusedFragments<'a> {
    NoUnusedFragments {
        spreads: Vec::new(),
        current_scope: None,
    }
}

impl<'a> NoUnusedFragments<'a> {
    fn spreads_of(&self, scope: &Scope<'a>) -> &[&'a str] {
        self.spreads
            .iter()
            .find(|(s, _)| match (s, scope) {
                (Scope::Operation(a), Scope::Operation(b)) => a == b,
                (Scope::Fragment(a), Scope::Fragment(b)) => a == b,
                _ => false,
            })
            .map(|(_, spreads)| spreads.as_slice())
            .unwrap_or_default()
    }

    fn find_reachable(&self, from: &Scope<'a>, result: &mut HashSet<&'a str>) {
        if let Scope::Fragment(name) = from {
            if !result.insert(name) {
                return;
            }
        }

        for spread in self.spreads_of(from) {
            self.find_reachable(&Scope::Fragment(spread), result);
        }
    }

    fn record_spread(&mut self, name: &'a str) {
        let Some(scope) = &self.current_scope else {
            return;
        };

        let entry = self.spreads.iter_mut().find(|(s, _)| match (s, scope) {
            (Scope::Operation(a), Scope::Operation(b)) => a == b,
            (Scope::Fragment(a), Scope::Fragment(b)) => a == b,
            _ => false,
        });

        match entry {
            Some((_, spreads)) => spreads.push(name),
            None => {
                let scope = match scope {
                    Scope::Operation(name) => Scope::Operation(*name),
                    Scope::Fragment(name) => Scope::Fragment(name),
                };
                self.spreads.push((scope, vec![name]));
            }
        }
    }
}

impl<'a> Visitor<'a> for NoUnusedFragments<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        let mut reachable = HashSet::new();

        for def in doc {
            if let Definition::Operation(op) = def {
                let op_name = op.item.name.map(|n| n.item);
                self.find_reachable(&Scope::Operation(op_name), &mut reachable);
            }
        }

        let mut errors = Vec::new();
        for def in doc {
            if let Definition::Fragment(fragment) = def {
                let name = fragment.item.name.item;
                if !reachable.contains(name) {
                    errors.push(RuleError::new(
                        &error_message(name),
                        &[fragment.item.name.span.start],
                    ));
                }
            }
        }

        ctx.append_errors(errors);
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.current_scope = Some(Scope::Operation(op.item.name.map(|n| n.item)));
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment<'a>>,
    ) {
        self.current_scope = Some(Scope::Fragment(f.item.name.item));
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        self.record_spread(spread.item.name.item);
    }
}

fn error_message(frag_name: &str) -> String {
    format!("Fragment \"{frag_name}\" is never used.")
}
