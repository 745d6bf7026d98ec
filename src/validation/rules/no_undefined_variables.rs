use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread, Operation, VariableDefinition},
    parser::{SourcePosition, Spanning},
    validation::{RuleError, ValidatorContext, Visitor},
};

#[derive(Clone, Copy, Eq, Hash, PartialEq)]
enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub struct NoUndefinedVariables<'a> {
    defined_variables: HashMap<Option<&'a str>, (SourcePosition, HashSet<&'a str>)>,
    used_variables: HashMap<Scope<'a>, Vec<Spanning<&'a str>>>,
    current_scope: Option<Scope<'a>>,
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
}

pub fn factory<'a>() -> NoUndefinedVariables<'a> {
    NoUndefinedVariables {
        defined_variables: HashMap::new(),
        used_variables: HashMap::new(),
        current_scope: None,
        spreads: HashMap::new(),
    }
}

impl<'a> NoUndefinedVariables<'a> {
    fn find_undef_vars(
        &'a self,
        scope: &Scope<'a>,
        defined: &HashSet<&'a str>,
        unused: &mut Vec<&'a Spanning<&'a str>>,
        visited: &mut HashSet<Scope<'a>>,
    ) {
        if !visited.insert(*scope) {
            return;
        }

        if let Some(used_vars) = self.used_variables.get(scope) {
            for var in used_vars {
                if !defined.contains(&var.item) {
                    unused.push(var);
                }
            }
        }

        if let Some(spreads) = self.spreads.get(scope) {
            for spread in spreads {
                self.find_undef_vars(&Scope::Fragment(spread), defined, unused, visited);
            }
        }
    }
}

impl<'a> Visitor<'a> for NoUndefinedVariables<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document<'a>) {
        let mut errors = Vec::new();

        for (op_name, (op_pos, def_vars)) in &self.defined_variables {
            let mut unused = Vec::new();
            let mut visited = HashSet::new();
            self.find_undef_vars(
                &Scope::Operation(*op_name),
                def_vars,
                &mut unused,
                &mut visited,
            );

            for var in unused {
                errors.push(RuleError::new(
                    &error_message(var.item, *op_name),
                    &[var.span.start, *op_pos],
                ));
            }
        }

        ctx.append_errors(errors);
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation<'a>>,
    ) {
        let op_name = op.item.name.map(|n| n.item);
        self.current_scope = Some(Scope::Operation(op_name));
        self.defined_variables
            .insert(op_name, (op.span.start, HashSet::new()));
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
        if let Some(scope) = &self.current_scope {
            self.spreads
                .entry(*scope)
                .or_default()
                .push(spread.item.name.item);
        }
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        (var_name, _): &'a (Spanning<&'a str>, VariableDefinition<'a>),
    ) {
        if let Some(Scope::Operation(op_name)) = &self.current_scope {
            if let Some((_, vars)) = self.defined_variables.get_mut(op_name) {
                vars.insert(var_name.item);
            }
        }
    }

    fn enter_variable_value(&mut self, _: &mut ValidatorContext<'a>, value: Spanning<&'a String>) {
        if let Some(scope) = &self.current_scope {
            self.used_variables
                .entry(*scope)
                .or_default()
                .push(Spanning::new(value.span, value.item.as_str()));
        }
    }
}

fn error_message(var_name: &str, op_name: Option<&str>) -> String {
    match op_name {
        Some(op_name) => {
            format!("Variable \"${var_name}\" is not defined by operation \"{op_name}\".")
        }
        None => format!("Variable \"${var_name}\" is not defined."),
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
    fn all_variables_defined() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: String, $b: String, $c: String) {
            dog(a: $a, b: $b, c: $c) { name }
          }
        "#,
        );
    }

    #[test]
    fn all_variables_in_fragments_deeply_defined() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: String, $b: String) {
            ...FragA
          }
          fragment FragA on QueryRoot {
            dog(a: $a) {
              ...FragB
            }
          }
          fragment FragB on Dog {
            isHousetrained(atOtherHomes: $b)
          }
        "#,
        );
    }

    #[test]
    fn variable_not_defined() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($a: String) {
            dog(a: $a, b: $b) { name }
          }
        "#,
            &[RuleError::new(
                &error_message("b", Some("Foo")),
                &[
                    SourcePosition::new(61, 2, 26),
                    SourcePosition::new(11, 1, 10),
                ],
            )],
        );
    }

    #[test]
    fn variable_not_defined_in_anonymous_query() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog(a: $a) { name }
          }
        "#,
            &[RuleError::new(
                &error_message("a", None),
                &[
                    SourcePosition::new(32, 2, 19),
                    SourcePosition::new(11, 1, 10),
                ],
            )],
        );
    }
}
