use std::fmt;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    ast::{DirectiveLocation, InputValue, Type},
    schema::meta::{
        Argument, Field, InterfaceMeta, MetaType, ObjectMeta, UnionMeta,
    },
};

/// A built and validated schema, ready to execute requests against.
///
/// Immutable after construction and freely shareable between requests.
pub struct Schema {
    #[doc(hidden)]
    pub schema: SchemaType,
}

impl Schema {
    /// The underlying schema metadata.
    pub fn schema_type(&self) -> &SchemaType {
        &self.schema
    }
}

/// Metadata for a schema: the type map, root operation types, and
/// directives.
pub struct SchemaType {
    pub(crate) description: Option<ArcStr>,
    pub(crate) types: IndexMap<ArcStr, MetaType>,
    pub(crate) query_type_name: ArcStr,
    pub(crate) mutation_type_name: Option<ArcStr>,
    pub(crate) subscription_type_name: Option<ArcStr>,
    pub(crate) directives: IndexMap<ArcStr, DirectiveType>,
    // Meta fields live outside the type map, mirroring their special
    // treatment in field lookup.
    pub(crate) schema_field: Field,
    pub(crate) type_field: Field,
    pub(crate) typename_field: Field,
}

/// A directive declared by a schema.
#[derive(Clone, Debug)]
pub struct DirectiveType {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub locations: Vec<DirectiveLocation>,
    #[doc(hidden)]
    pub arguments: Vec<Argument>,
    #[doc(hidden)]
    pub is_repeatable: bool,
}

/// A modified view of a [`MetaType`], materializing the non-`null` and list
/// wrappers of a type literal.
#[derive(Clone, Debug)]
pub enum TypeType<'a> {
    /// A named type from the schema's type map.
    Concrete(&'a MetaType),
    /// A non-`null` wrapper.
    NonNull(Box<TypeType<'a>>),
    /// A list wrapper.
    List(Box<TypeType<'a>>),
}

impl<'a> TypeType<'a> {
    /// The named type this view points at, if it is not a wrapper.
    pub fn to_concrete(&self) -> Option<&'a MetaType> {
        match self {
            Self::Concrete(t) => Some(t),
            _ => None,
        }
    }

    /// Unwraps all modifiers down to the named type.
    pub fn innermost_concrete(&self) -> &'a MetaType {
        match self {
            Self::Concrete(t) => t,
            Self::NonNull(i) | Self::List(i) => i.innermost_concrete(),
        }
    }

    /// Strips one non-`null` wrapper, if present.
    pub fn nullable(&self) -> &TypeType<'a> {
        match self {
            Self::NonNull(i) => i,
            t => t,
        }
    }

    /// Returns true if this view is a non-`null` wrapper.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(..))
    }

    /// The element type, if this view is a list (behind at most one
    /// non-`null` wrapper).
    pub fn list_contents(&self) -> Option<&TypeType<'a>> {
        match self {
            Self::List(i) => Some(i),
            Self::NonNull(i) => i.list_contents(),
            Self::Concrete(..) => None,
        }
    }
}

impl<'a> fmt::Display for TypeType<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(t) => write!(f, "{}", t.name()),
            Self::List(i) => write!(f, "[{i}]"),
            Self::NonNull(i) => write!(f, "{i}!"),
        }
    }
}

impl SchemaType {
    /// A minimal stand-in schema used when validating an SDL document that
    /// has no schema to validate against yet: built-in scalars and
    /// directives only.
    pub(crate) fn sdl_placeholder() -> Self {
        let (schema_field, type_field, typename_field) =
            crate::schema::introspection::meta_fields();

        Self {
            description: None,
            types: crate::schema::build::builtin_scalars()
                .into_iter()
                .map(|meta| (meta.name().clone(), meta))
                .collect(),
            query_type_name: arcstr::literal!("Query"),
            mutation_type_name: None,
            subscription_type_name: None,
            directives: [
                DirectiveType::new_skip(),
                DirectiveType::new_include(),
                DirectiveType::new_deprecated(),
                DirectiveType::new_specified_by(),
            ]
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect(),
            schema_field,
            type_field,
            typename_field,
        }
    }

    /// The description of the schema itself, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// The name of the root query type.
    pub fn query_type_name(&self) -> &ArcStr {
        &self.query_type_name
    }

    /// The name of the root mutation type, if any.
    pub fn mutation_type_name(&self) -> Option<&ArcStr> {
        self.mutation_type_name.as_ref()
    }

    /// The name of the root subscription type, if any.
    pub fn subscription_type_name(&self) -> Option<&ArcStr> {
        self.subscription_type_name.as_ref()
    }

    /// Looks up a type by name, as a [`TypeType`] view.
    pub fn type_by_name(&self, name: &str) -> Option<TypeType<'_>> {
        self.types.get(name).map(TypeType::Concrete)
    }

    /// Looks up a type by name.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// The root query type.
    pub fn query_type(&self) -> TypeType<'_> {
        TypeType::Concrete(self.concrete_query_type())
    }

    /// The root query type.
    pub fn concrete_query_type(&self) -> &MetaType {
        self.types
            .get(&self.query_type_name)
            .expect("query type exists in a validated schema")
    }

    /// The root mutation type, if any.
    pub fn mutation_type(&self) -> Option<TypeType<'_>> {
        self.concrete_mutation_type().map(TypeType::Concrete)
    }

    /// The root mutation type, if any.
    pub fn concrete_mutation_type(&self) -> Option<&MetaType> {
        self.mutation_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("mutation type exists in a validated schema")
        })
    }

    /// The root subscription type, if any.
    pub fn subscription_type(&self) -> Option<TypeType<'_>> {
        self.concrete_subscription_type().map(TypeType::Concrete)
    }

    /// The root subscription type, if any.
    pub fn concrete_subscription_type(&self) -> Option<&MetaType> {
        self.subscription_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("subscription type exists in a validated schema")
        })
    }

    /// All types of the schema, in registration order.
    pub fn concrete_type_list(&self) -> Vec<&MetaType> {
        self.types.values().collect()
    }

    /// Materializes a type literal against this schema.
    ///
    /// # Panics
    ///
    /// If the literal names a type the schema does not contain; callers
    /// operate on validated documents.
    pub fn make_type<N: AsRef<str>>(&self, t: &Type<N>) -> TypeType<'_> {
        match t {
            Type::NonNullNamed(n) => TypeType::NonNull(Box::new(
                self.type_by_name(n.as_ref())
                    .expect("type of a validated document exists in the schema"),
            )),
            Type::NonNullList(inner) => {
                TypeType::NonNull(Box::new(TypeType::List(Box::new(self.make_type(inner)))))
            }
            Type::Named(n) => self
                .type_by_name(n.as_ref())
                .expect("type of a validated document exists in the schema"),
            Type::List(inner) => TypeType::List(Box::new(self.make_type(inner))),
        }
    }

    /// All directives declared by the schema.
    pub fn directive_list(&self) -> Vec<&DirectiveType> {
        self.directives.values().collect()
    }

    /// Looks up a directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    /// Looks up a field on `parent`, including the meta fields `__schema`,
    /// `__type`, and `__typename`.
    ///
    /// `__schema` and `__type` exist only on the root query type;
    /// `__typename` on every composite type.
    pub fn lookup_field<'a>(&'a self, parent: &'a MetaType, name: &str) -> Option<&'a Field> {
        match name {
            "__schema" if *parent.name() == self.query_type_name => Some(&self.schema_field),
            "__type" if *parent.name() == self.query_type_name => Some(&self.type_field),
            "__typename" if parent.is_composite() => Some(&self.typename_field),
            _ => parent.field_by_name(name),
        }
    }

    /// Whether two composite types can have an object in common.
    pub fn type_overlap(&self, t1: &MetaType, t2: &MetaType) -> bool {
        if std::ptr::eq(t1, t2) {
            return true;
        }

        match (t1.is_abstract(), t2.is_abstract()) {
            (true, true) => self
                .possible_types(t1)
                .iter()
                .any(|t| self.is_possible_type(t2, t)),
            (true, false) => self.is_possible_type(t1, t2),
            (false, true) => self.is_possible_type(t2, t1),
            (false, false) => false,
        }
    }

    /// The concrete object types an abstract type can resolve to.
    pub fn possible_types(&self, t: &MetaType) -> Vec<&MetaType> {
        match t {
            MetaType::Union(UnionMeta { of_type_names, .. }) => of_type_names
                .iter()
                .filter_map(|t| self.concrete_type_by_name(t.as_str()))
                .collect(),
            MetaType::Interface(InterfaceMeta { name, .. }) => self
                .concrete_type_list()
                .into_iter()
                .filter(|t| match t {
                    MetaType::Object(ObjectMeta {
                        interface_names, ..
                    }) => interface_names.iter().any(|iname| iname == name),
                    _ => false,
                })
                .collect(),
            _ => panic!("can't retrieve possible types from a non-abstract meta type"),
        }
    }

    /// Whether `possible_type` is one of `abstract_type`'s possible types.
    pub fn is_possible_type(&self, abstract_type: &MetaType, possible_type: &MetaType) -> bool {
        self.possible_types(abstract_type)
            .into_iter()
            .any(|t| std::ptr::eq(t, possible_type))
    }

    /// Whether `sub_type` is usable where `super_type` is expected.
    pub fn is_subtype<N: AsRef<str>>(&self, sub_type: &Type<N>, super_type: &Type<N>) -> bool {
        use crate::ast::Type::{List, Named, NonNullList, NonNullNamed};

        match (super_type, sub_type) {
            (NonNullNamed(super_name), NonNullNamed(sub_name))
            | (Named(super_name), Named(sub_name) | NonNullNamed(sub_name)) => {
                self.is_named_subtype(sub_name.as_ref(), super_name.as_ref())
            }
            (NonNullList(super_inner), NonNullList(sub_inner))
            | (List(super_inner), List(sub_inner) | NonNullList(sub_inner)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            _ => false,
        }
    }

    /// Whether the named type `sub_type_name` is usable where
    /// `super_type_name` is expected.
    pub fn is_named_subtype(&self, sub_type_name: &str, super_type_name: &str) -> bool {
        if sub_type_name == super_type_name {
            true
        } else if let (Some(sub_type), Some(super_type)) = (
            self.concrete_type_by_name(sub_type_name),
            self.concrete_type_by_name(super_type_name),
        ) {
            super_type.is_abstract() && self.is_possible_type(super_type, sub_type)
        } else {
            false
        }
    }
}

impl DirectiveType {
    /// Declares a new directive.
    pub fn new(
        name: impl Into<ArcStr>,
        locations: &[DirectiveLocation],
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            locations: locations.to_vec(),
            arguments,
            is_repeatable: false,
        }
    }

    /// Sets the description of this directive.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn new_skip() -> Self {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new(
                "if",
                Type::NonNullNamed(arcstr::literal!("Boolean")),
            )],
        )
        .description("Directs the executor to skip this field or fragment when the `if` argument is true.")
    }

    pub(crate) fn new_include() -> Self {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new(
                "if",
                Type::NonNullNamed(arcstr::literal!("Boolean")),
            )],
        )
        .description("Directs the executor to include this field or fragment only when the `if` argument is true.")
    }

    pub(crate) fn new_deprecated() -> Self {
        Self::new(
            "deprecated",
            &[
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::EnumValue,
            ],
            vec![
                Argument::new("reason", Type::Named(arcstr::literal!("String")))
                    .default_value(InputValue::string("No longer supported")),
            ],
        )
        .description("Marks an element of a GraphQL schema as no longer supported.")
    }

    pub(crate) fn new_specified_by() -> Self {
        Self::new(
            "specifiedBy",
            &[DirectiveLocation::Scalar],
            vec![Argument::new(
                "url",
                Type::NonNullNamed(arcstr::literal!("String")),
            )],
        )
        .description("Exposes a URL that specifies the behavior of this scalar.")
    }
}
