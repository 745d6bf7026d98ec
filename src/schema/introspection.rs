//! The introspection system: `__Schema` and friends, plus their resolution.
//!
//! Introspection fields resolve against an internal source domain
//! ([`IntroValue`]) borrowed from the schema itself, driven by the same
//! selection-set machinery as host fields.

use arcstr::{ArcStr, literal};

use crate::{
    ast::Type,
    executor::{FieldError, FieldResult},
    schema::{
        meta::{Argument, EnumMeta, EnumValue, Field, InterfaceMeta, MetaType, ObjectMeta},
        model::{DirectiveType, SchemaType, TypeType},
    },
    value::{Object, Value},
};

/// A value in the introspection domain.
#[derive(Clone, Debug)]
pub(crate) enum IntroValue<'a> {
    Schema,
    Type(TypeType<'a>),
    Field(&'a Field),
    InputValue(&'a Argument),
    EnumValue(&'a EnumValue),
    Directive(&'a DirectiveType),
}

impl<'a> IntroValue<'a> {
    /// The introspection object type describing this value.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Self::Schema => "__Schema",
            Self::Type(..) => "__Type",
            Self::Field(..) => "__Field",
            Self::InputValue(..) => "__InputValue",
            Self::EnumValue(..) => "__EnumValue",
            Self::Directive(..) => "__Directive",
        }
    }
}

/// Result of resolving one introspection field.
pub(crate) enum IntroResolved<'a> {
    Null,
    Value(Value),
    One(IntroValue<'a>),
    Many(Vec<IntroValue<'a>>),
}

fn include_deprecated(args: &Object) -> bool {
    args.get_field_value("includeDeprecated")
        .and_then(Value::as_boolean_value)
        .unwrap_or(false)
}

/// Resolves `field_name` on the introspection `parent` value.
pub(crate) fn resolve_field<'a>(
    schema: &'a SchemaType,
    parent: &IntroValue<'a>,
    field_name: &str,
    args: &Object,
) -> FieldResult<IntroResolved<'a>> {
    use IntroResolved::{Many, Null, One, Value as Leaf};

    let resolved = match (parent, field_name) {
        (IntroValue::Schema, "description") => opt_str(schema.description()),
        (IntroValue::Schema, "types") => Many(
            schema
                .concrete_type_list()
                .into_iter()
                .map(|t| IntroValue::Type(TypeType::Concrete(t)))
                .collect(),
        ),
        (IntroValue::Schema, "queryType") => One(IntroValue::Type(schema.query_type())),
        (IntroValue::Schema, "mutationType") => match schema.mutation_type() {
            Some(t) => One(IntroValue::Type(t)),
            None => Null,
        },
        (IntroValue::Schema, "subscriptionType") => match schema.subscription_type() {
            Some(t) => One(IntroValue::Type(t)),
            None => Null,
        },
        (IntroValue::Schema, "directives") => Many(
            schema
                .directive_list()
                .into_iter()
                .map(IntroValue::Directive)
                .collect(),
        ),

        (IntroValue::Type(t), "kind") => Leaf(Value::scalar(match t {
            TypeType::Concrete(meta) => meta.type_kind().as_str(),
            TypeType::List(..) => "LIST",
            TypeType::NonNull(..) => "NON_NULL",
        })),
        (IntroValue::Type(t), "name") => match t {
            TypeType::Concrete(meta) => Leaf(Value::scalar(meta.name().as_str())),
            _ => Null,
        },
        (IntroValue::Type(t), "description") => match t {
            TypeType::Concrete(meta) => opt_str(meta.description()),
            _ => Null,
        },
        (IntroValue::Type(t), "specifiedByURL") => match t {
            TypeType::Concrete(meta) => opt_str(meta.specified_by_url()),
            _ => Null,
        },
        (IntroValue::Type(t), "fields") => match t {
            TypeType::Concrete(meta) => match meta.fields() {
                Some(fields) => Many(
                    fields
                        .iter()
                        .filter(|f| !f.is_builtin())
                        .filter(|f| {
                            include_deprecated(args) || !f.deprecation_status.is_deprecated()
                        })
                        .map(IntroValue::Field)
                        .collect(),
                ),
                None => Null,
            },
            _ => Null,
        },
        (IntroValue::Type(t), "interfaces") => match t {
            TypeType::Concrete(meta) => match meta {
                MetaType::Object(ObjectMeta {
                    interface_names, ..
                })
                | MetaType::Interface(InterfaceMeta {
                    interface_names, ..
                }) => Many(
                    interface_names
                        .iter()
                        .filter_map(|n| schema.type_by_name(n.as_str()))
                        .map(IntroValue::Type)
                        .collect(),
                ),
                _ => Null,
            },
            _ => Null,
        },
        (IntroValue::Type(t), "possibleTypes") => match t {
            TypeType::Concrete(meta) if meta.is_abstract() => Many(
                schema
                    .possible_types(meta)
                    .into_iter()
                    .map(|t| IntroValue::Type(TypeType::Concrete(t)))
                    .collect(),
            ),
            _ => Null,
        },
        (IntroValue::Type(t), "enumValues") => match t {
            TypeType::Concrete(MetaType::Enum(EnumMeta { values, .. })) => Many(
                values
                    .iter()
                    .filter(|v| {
                        include_deprecated(args) || !v.deprecation_status.is_deprecated()
                    })
                    .map(IntroValue::EnumValue)
                    .collect(),
            ),
            _ => Null,
        },
        (IntroValue::Type(t), "inputFields") => match t {
            TypeType::Concrete(MetaType::InputObject(io)) => {
                Many(io.input_fields.iter().map(IntroValue::InputValue).collect())
            }
            _ => Null,
        },
        (IntroValue::Type(t), "ofType") => match t {
            TypeType::Concrete(..) => Null,
            TypeType::NonNull(inner) | TypeType::List(inner) => {
                One(IntroValue::Type((**inner).clone()))
            }
        },

        (IntroValue::Field(f), "name") => Leaf(Value::scalar(f.name.as_str())),
        (IntroValue::Field(f), "description") => opt_str(f.description.as_ref()),
        (IntroValue::Field(f), "args") => {
            Many(f.arguments.iter().map(IntroValue::InputValue).collect())
        }
        (IntroValue::Field(f), "type") => One(IntroValue::Type(schema.make_type(&f.field_type))),
        (IntroValue::Field(f), "isDeprecated") => {
            Leaf(Value::scalar(f.deprecation_status.is_deprecated()))
        }
        (IntroValue::Field(f), "deprecationReason") => {
            opt_str(f.deprecation_status.reason().map(String::from).as_ref())
        }

        (IntroValue::InputValue(a), "name") => Leaf(Value::scalar(a.name.as_str())),
        (IntroValue::InputValue(a), "description") => opt_str(a.description.as_ref()),
        (IntroValue::InputValue(a), "type") => {
            One(IntroValue::Type(schema.make_type(&a.arg_type)))
        }
        (IntroValue::InputValue(a), "defaultValue") => match &a.default_value {
            Some(v) => Leaf(Value::scalar(v.to_string())),
            None => Null,
        },

        (IntroValue::EnumValue(v), "name") => Leaf(Value::scalar(v.name.as_str())),
        (IntroValue::EnumValue(v), "description") => opt_str(v.description.as_ref()),
        (IntroValue::EnumValue(v), "isDeprecated") => {
            Leaf(Value::scalar(v.deprecation_status.is_deprecated()))
        }
        (IntroValue::EnumValue(v), "deprecationReason") => {
            opt_str(v.deprecation_status.reason().map(String::from).as_ref())
        }

        (IntroValue::Directive(d), "name") => Leaf(Value::scalar(d.name.as_str())),
        (IntroValue::Directive(d), "description") => opt_str(d.description.as_ref()),
        (IntroValue::Directive(d), "isRepeatable") => Leaf(Value::scalar(d.is_repeatable)),
        (IntroValue::Directive(d), "locations") => Leaf(Value::List(
            d.locations
                .iter()
                .map(|l| Value::scalar(l.to_string()))
                .collect(),
        )),
        (IntroValue::Directive(d), "args") => {
            Many(d.arguments.iter().map(IntroValue::InputValue).collect())
        }

        (parent, name) => {
            return Err(FieldError::from(format!(
                "Cannot resolve field \"{name}\" on introspection type \"{}\"",
                parent.type_name(),
            )));
        }
    };

    Ok(resolved)
}

fn opt_str<'a, S: AsRef<str>>(s: Option<&S>) -> IntroResolved<'a> {
    match s {
        Some(s) => IntroResolved::Value(Value::scalar(s.as_ref())),
        None => IntroResolved::Null,
    }
}

fn named(name: &str) -> Type<ArcStr> {
    Type::Named(ArcStr::from(name))
}

fn non_null(name: &str) -> Type<ArcStr> {
    Type::NonNullNamed(ArcStr::from(name))
}

fn non_null_list_of_non_null(name: &str) -> Type<ArcStr> {
    Type::NonNullList(Box::new(Type::NonNullNamed(ArcStr::from(name))))
}

fn list_of_non_null(name: &str) -> Type<ArcStr> {
    Type::List(Box::new(Type::NonNullNamed(ArcStr::from(name))))
}

fn field(name: &str, field_type: Type<ArcStr>) -> Field {
    Field::new(ArcStr::from(name), field_type)
}

fn include_deprecated_arg() -> Argument {
    Argument::new("includeDeprecated", named("Boolean"))
        .default_value(crate::ast::InputValue::Boolean(false))
}

/// The meta types injected into every schema's type map.
pub(crate) fn meta_types() -> Vec<MetaType> {
    let schema_type = MetaType::Object(ObjectMeta {
        name: literal!("__Schema"),
        description: Some(literal!(
            "A GraphQL Schema defines the capabilities of a GraphQL server."
        )),
        fields: vec![
            field("description", named("String")),
            field("types", non_null_list_of_non_null("__Type")),
            field("queryType", non_null("__Type")),
            field("mutationType", named("__Type")),
            field("subscriptionType", named("__Type")),
            field("directives", non_null_list_of_non_null("__Directive")),
        ],
        interface_names: vec![],
        is_type_of: None,
    });

    let type_type = MetaType::Object(ObjectMeta {
        name: literal!("__Type"),
        description: Some(literal!(
            "The fundamental unit of any GraphQL Schema is the type."
        )),
        fields: vec![
            field("kind", non_null("__TypeKind")),
            field("name", named("String")),
            field("description", named("String")),
            field("specifiedByURL", named("String")),
            field("fields", list_of_non_null("__Field")).argument(include_deprecated_arg()),
            field("interfaces", list_of_non_null("__Type")),
            field("possibleTypes", list_of_non_null("__Type")),
            field("enumValues", list_of_non_null("__EnumValue"))
                .argument(include_deprecated_arg()),
            field("inputFields", list_of_non_null("__InputValue")),
            field("ofType", named("__Type")),
        ],
        interface_names: vec![],
        is_type_of: None,
    });

    let field_type = MetaType::Object(ObjectMeta {
        name: literal!("__Field"),
        description: None,
        fields: vec![
            field("name", non_null("String")),
            field("description", named("String")),
            field("args", non_null_list_of_non_null("__InputValue")),
            field("type", non_null("__Type")),
            field("isDeprecated", non_null("Boolean")),
            field("deprecationReason", named("String")),
        ],
        interface_names: vec![],
        is_type_of: None,
    });

    let input_value_type = MetaType::Object(ObjectMeta {
        name: literal!("__InputValue"),
        description: None,
        fields: vec![
            field("name", non_null("String")),
            field("description", named("String")),
            field("type", non_null("__Type")),
            field("defaultValue", named("String")),
        ],
        interface_names: vec![],
        is_type_of: None,
    });

    let enum_value_type = MetaType::Object(ObjectMeta {
        name: literal!("__EnumValue"),
        description: None,
        fields: vec![
            field("name", non_null("String")),
            field("description", named("String")),
            field("isDeprecated", non_null("Boolean")),
            field("deprecationReason", named("String")),
        ],
        interface_names: vec![],
        is_type_of: None,
    });

    let directive_type = MetaType::Object(ObjectMeta {
        name: literal!("__Directive"),
        description: None,
        fields: vec![
            field("name", non_null("String")),
            field("description", named("String")),
            field("isRepeatable", non_null("Boolean")),
            field("locations", non_null_list_of_non_null("__DirectiveLocation")),
            field("args", non_null_list_of_non_null("__InputValue")),
        ],
        interface_names: vec![],
        is_type_of: None,
    });

    let type_kind = MetaType::Enum(EnumMeta {
        name: literal!("__TypeKind"),
        description: Some(literal!(
            "An enum describing what kind of type a given `__Type` is."
        )),
        values: [
            "SCALAR",
            "OBJECT",
            "INTERFACE",
            "UNION",
            "ENUM",
            "INPUT_OBJECT",
            "LIST",
            "NON_NULL",
        ]
        .into_iter()
        .map(EnumValue::new)
        .collect(),
    });

    let directive_location = MetaType::Enum(EnumMeta {
        name: literal!("__DirectiveLocation"),
        description: None,
        values: [
            "QUERY",
            "MUTATION",
            "SUBSCRIPTION",
            "FIELD",
            "FRAGMENT_DEFINITION",
            "FRAGMENT_SPREAD",
            "INLINE_FRAGMENT",
            "VARIABLE_DEFINITION",
            "SCHEMA",
            "SCALAR",
            "OBJECT",
            "FIELD_DEFINITION",
            "ARGUMENT_DEFINITION",
            "INTERFACE",
            "UNION",
            "ENUM",
            "ENUM_VALUE",
            "INPUT_OBJECT",
            "INPUT_FIELD_DEFINITION",
        ]
        .into_iter()
        .map(EnumValue::new)
        .collect(),
    });

    vec![
        schema_type,
        type_type,
        field_type,
        input_value_type,
        enum_value_type,
        directive_type,
        type_kind,
        directive_location,
    ]
}

/// The meta fields `__schema`, `__type`, and `__typename`.
pub(crate) fn meta_fields() -> (Field, Field, Field) {
    let schema_field = field("__schema", non_null("__Schema"));
    let type_field = field("__type", named("__Type"))
        .argument(Argument::new("name", non_null("String")));
    let typename_field = field("__typename", non_null("String"));

    (schema_field, type_field, typename_field)
}
