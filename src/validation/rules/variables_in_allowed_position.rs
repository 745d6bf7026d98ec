use std::collections::{HashMap, HashSet};

use arcstr::ArcStr;

use crate::{
    ast::{Document, Fragment, FragmentSpread, Operation, Type, VariableDefinition},
    parser::Spanning,
    validation::{RuleError, ValidatorContext, Visitor},
};

#[derive(Clone, Copy, Eq, Hash, PartialEq)]
enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub struct VariablesInAllowedPosition<'a> {
    spreads: HashMap<Scope<'a>, HashSet<&'a str>>,
    variable_usages: HashMap<Scope<'a>, Vec<(Spanning<&'a str>, Type<ArcStr>)>>,
    variable_defs: HashMap<Scope<'a>, Vec<&'a (Spanning<&'a str>, VariableDefinition<'a>)>>,
    current_scope: Option<Scope<'a>>,
}

pub fn factory<'a>() -> VariablesInAllowedPosition<'a> {
    VariablesInAllowedPosition {
        spreads: HashMap::new(),
        variable_usages: HashMap::new(),
        variable_defs: HashMap::new(),
        current_scope: None,
    }
}

impl<'a> VariablesInAllowedPosition<'a> {
    fn collect_incorrect_usages(
        &self,
        from: &Scope<'a>,
        var_defs: &[&'a (Spanning<&'a str>, VariableDefinition<'a>)],
        ctx: &mut ValidatorContext<'a>,
        visited: &mut HashSet<Scope<'a>>,
    ) {
        if !visited.insert(*from) {
            return;
        }

        if let Some(usages) = self.variable_usages.get(from) {
            for (var_name, expected_type) in usages {
                if let Some((_, var_def)) = var_defs.iter().find(|(n, _)| n.item == var_name.item)
                {
                    let var_type = var_def.var_type.item.to_arc();
                    let has_default = var_def
                        .default_value
                        .as_ref()
                        .is_some_and(|d| !d.item.is_null());

                    // A nullable variable with a non-`null` default may
                    // flow into a non-`null` position of its inner type.
                    let allowed = if expected_type.is_non_null() && !var_type.is_non_null() {
                        has_default
                            && ctx
                                .schema
                                .is_subtype(&var_type, &expected_type.clone().into_nullable())
                    } else {
                        ctx.schema.is_subtype(&var_type, expected_type)
                    };

                    if !allowed {
                        ctx.report_error(
                            &error_message(
                                var_name.item,
                                &var_def.var_type.item.to_string(),
                                &expected_type.to_string(),
                            ),
                            &[var_def.var_type.span.start, var_name.span.start],
                        );
                    }
                }
            }
        }

        if let Some(spreads) = self.spreads.get(from) {
            for spread in spreads {
                self.collect_incorrect_usages(&Scope::Fragment(spread), var_defs, ctx, visited);
            }
        }
    }
}

impl<'a> Visitor<'a> for VariablesInAllowedPosition<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document<'a>) {
        for (op_scope, var_defs) in &self.variable_defs {
            let mut visited = HashSet::new();
            self.collect_incorrect_usages(op_scope, var_defs, ctx, &mut visited);
        }
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        self.current_scope = Some(Scope::Fragment(fragment.item.name.item));
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        self.current_scope = Some(Scope::Operation(op.item.name.map(|n| n.item)));
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        def: &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        if let Some(scope) = &self.current_scope {
            self.variable_defs.entry(*scope).or_default().push(def);
        }
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread<'a>>,
    ) {
        if let Some(scope) = &self.current_scope {
            self.spreads
                .entry(*scope)
                .or_default()
                .insert(spread.item.name.item);
        }
    }

    fn enter_variable_value(&mut self, ctx: &mut ValidatorContext<'a>, var: Spanning<&'a String>) {
        if let (Some(scope), Some(input_type)) =
            (&self.current_scope, ctx.current_input_type_literal())
        {
            self.variable_usages
                .entry(*scope)
                .or_default()
                .push((
                    Spanning::new(var.span, var.item.as_str()),
                    input_type.clone(),
                ));
        }
    }
}

fn error_message(var_name: &str, type_name: &str, expected_type_name: &str) -> String {
    format!(
        "Variable \"${var_name}\" of type \"{type_name}\" used in position expecting type \"{expected_type_name}\"."
    )
}
