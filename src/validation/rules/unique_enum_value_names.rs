use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::{TypeDefinition},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueEnumValueNames<'a> {
    defined: HashMap<(&'a str, &'a str), SourcePosition>,
}

pub fn factory<'a>() -> UniqueEnumValueNames<'a> {
    UniqueEnumValueNames {
        defined: HashMap::new(),
    }
}

impl<'a> UniqueEnumValueNames<'a> {
    fn check(&mut self, ctx: &mut ValidatorContext<'a>, type_def: &'a Spanning<TypeDefinition<'a>>) {
        let TypeDefinition::Enum(d) = &type_def.item else {
            return;
        };

        for value in &d.values {
            match self.defined.entry((d.name.item, value.item.name.item)) {
                Entry::Occupied(e) => {
                    ctx.report_error(
                        &error_message(d.name.item, value.item.name.item),
                        &[*e.get(), value.item.name.span.start],
                    );
                }
                Entry::Vacant(e) => {
                    e.insert(value.item.name.span.start);
                }
            }
        }
    }
}

impl<'a> Visitor<'a> for UniqueEnumValueNames<'a> {
    fn enter_type_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.check(ctx, type_def);
    }

    fn enter_type_extension(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        type_def: &'a Spanning<TypeDefinition<'a>>,
    ) {
        self.check(ctx, type_def);
    }
}

fn error_message(type_name: &str, value_name: &str) -> String {
    format!("Enum value \"{type_name}.{value_name}\" can only be defined once.")
}
