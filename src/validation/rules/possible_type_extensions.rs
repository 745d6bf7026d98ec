use std::collections::HashMap;

use crate::{
    ast::{Definition, Document, TypeDefinition, TypeSystemDefinition},
    parser::Spanning,
    schema::meta::MetaType,
    util,
    validation::{ValidatorContext, Visitor},
};

pub struct PossibleTypeExtensions<'a> {
    defined_in_document: HashMap<&'a str, &'a TypeDefinition<'a>>,
}

pub fn factory<'a>() -> PossibleTypeExtensions<'a> {
    PossibleTypeExtensions {
        defined_in_document: HashMap::new(),
    }
}

fn kind_of_meta(meta: &MetaType) -> &'static str {
    match meta {
        MetaType::Scalar(..) => "scalar",
        MetaType::Object(..) => "object",
        MetaType::Interface(..) => "interface",
        MetaType::Union(..) => "union",
        MetaType::Enum(..) => "enum",
        MetaType::InputObject(..) => "input object",
    }
}

impl<'a> Visitor<'a> for PossibleTypeExtensions<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document<'a>) {
        for def in doc {
            if let Definition::TypeSystem(TypeSystemDefinition::Type(d)) = def {
                self.defined_in_document.insert(d.item.name().item, &d.item);
            }
        }
    }

    fn enter_type_extension(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        ext: &'a Spanning<TypeDefinition<'a>>,
    ) {
        let name = ext.item.name();
        let extended_kind = ext.item.kind();

        let existing_kind = self
            .defined_in_document
            .get(name.item)
            .map(|d| d.kind())
            .or_else(|| {
                ctx.schema
                    .concrete_type_by_name(name.item)
                    .filter(|meta| !meta.is_builtin())
                    .map(kind_of_meta)
            });

        match existing_kind {
            None => {
                let suggestions = util::suggestion_list(
                    name.item,
                    self.defined_in_document
                        .keys()
                        .copied()
                        .chain(
                            ctx.schema
                                .concrete_type_list()
                                .iter()
                                .filter(|t| !t.is_builtin())
                                .map(|t| t.name().as_str()),
                        ),
                );
                ctx.report_error(
                    &unknown_error_message(name.item, &util::did_you_mean(&suggestions)),
                    &[name.span.start],
                );
            }
            Some(kind) if kind != extended_kind => {
                ctx.report_error(
                    &mismatch_error_message(extended_kind, name.item),
                    &[name.span.start],
                );
            }
            Some(_) => {}
        }
    }
}

fn unknown_error_message(type_name: &str, suggestion: &str) -> String {
    format!("Cannot extend type \"{type_name}\" because it is not defined.{suggestion}")
}

fn mismatch_error_message(kind: &str, type_name: &str) -> String {
    format!("Cannot extend non-{kind} type \"{type_name}\".")
}

#[cfg(test)]
mod tests {
    use super::{factory, mismatch_error_message, unknown_error_message};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_sdl_rule, expect_passes_sdl_rule},
    };

    #[test]
    fn extensions_of_matching_kinds() {
        expect_passes_sdl_rule(
            factory,
            r#"
          scalar FooScalar
          type FooObject { foo: String }
          interface FooInterface { foo: String }

          extend scalar FooScalar @specifiedBy(url: "https://example.com")
          extend type FooObject { bar: String }
          extend interface FooInterface { bar: String }
        "#,
        );
    }

    #[test]
    fn extension_of_unknown_type() {
        expect_fails_sdl_rule(
            factory,
            r#"
          type Known { foo: String }
          extend type Unknown { bar: String }
        "#,
            &[RuleError::new(
                &unknown_error_message("Unknown", " Did you mean \"Known\"?"),
                &[SourcePosition::new(60, 2, 22)],
            )],
        );
    }

    #[test]
    fn extension_of_mismatched_kind() {
        expect_fails_sdl_rule(
            factory,
            r#"
          type FooObject { foo: String }
          extend interface FooObject { bar: String }
        "#,
            &[RuleError::new(
                &mismatch_error_message("interface", "FooObject"),
                &[SourcePosition::new(69, 2, 27)],
            )],
        );
    }
}
