//! Types used to describe a GraphQL schema.

use std::sync::Arc;

use arcstr::ArcStr;
use derive_more::with_trait::Debug;

use crate::{
    ast::{InputValue, Type},
    executor::FieldError,
    resolver::{IsTypeOf, Resolver, Subscriber, TypeResolver},
    value::Value,
};

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    Current,
    /// The field/variant is deprecated, with an optional reason.
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Self::Deprecated(_))
    }

    /// An optional reason for the deprecation, or none if current.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// GraphQL type kind, as exposed by introspection.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// The introspection spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        }
    }
}

/// Coercion function applied to runtime inputs and constant literals of a
/// scalar.
pub type ParseScalarFn =
    Arc<dyn Fn(&InputValue) -> Result<Value, FieldError> + Send + Sync>;

/// Serialization function applied to resolved leaf values of a scalar.
pub type SerializeScalarFn = Arc<dyn Fn(&Value) -> Result<Value, FieldError> + Send + Sync>;

/// Scalar type metadata.
#[derive(Clone, Debug)]
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub specified_by_url: Option<ArcStr>,
    #[debug(skip)]
    pub(crate) parse_fn: ParseScalarFn,
    #[debug(skip)]
    pub(crate) serialize_fn: SerializeScalarFn,
}

/// Object type metadata.
#[derive(Clone, Debug)]
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub is_type_of: Option<IsTypeOf>,
}

/// Interface type metadata.
#[derive(Clone, Debug)]
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub resolve_type: Option<TypeResolver>,
}

/// Union type metadata.
#[derive(Clone, Debug)]
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub of_type_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub resolve_type: Option<TypeResolver>,
}

/// Enum type metadata.
#[derive(Clone, Debug)]
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub values: Vec<EnumValue>,
}

/// Input object metadata.
#[derive(Clone, Debug)]
pub struct InputObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub input_fields: Vec<Argument>,
}

/// Generic type metadata.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug)]
pub enum MetaType {
    Scalar(ScalarMeta),
    Object(ObjectMeta),
    Interface(InterfaceMeta),
    Union(UnionMeta),
    Enum(EnumMeta),
    InputObject(InputObjectMeta),
}

/// Metadata for a field.
#[derive(Clone, Debug)]
pub struct Field {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arguments: Vec<Argument>,
    #[doc(hidden)]
    pub field_type: Type<ArcStr>,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    #[doc(hidden)]
    pub resolver: Option<Resolver>,
    #[doc(hidden)]
    pub subscriber: Option<Subscriber>,
}

impl Field {
    /// Creates a plain field of the given type, without resolvers attached.
    pub fn new(name: impl Into<ArcStr>, field_type: Type<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolver: None,
            subscriber: None,
        }
    }

    /// Adds an argument to this field.
    #[must_use]
    pub fn argument(mut self, arg: Argument) -> Self {
        self.arguments.push(arg);
        self
    }

    /// Looks up a declared argument by name.
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Returns true if the field belongs to the introspection system.
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with("__")
    }
}

/// Metadata for an argument to a field, or for an input object field.
#[derive(Clone, Debug)]
pub struct Argument {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arg_type: Type<ArcStr>,
    #[doc(hidden)]
    pub default_value: Option<InputValue>,
}

impl Argument {
    /// Creates an argument of the given type.
    pub fn new(name: impl Into<ArcStr>, arg_type: Type<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
        }
    }

    /// Sets the default value of this argument.
    #[must_use]
    pub fn default_value(mut self, default: InputValue) -> Self {
        self.default_value = Some(default);
        self
    }

    /// Returns true if the argument belongs to the introspection system.
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with("__")
    }
}

/// Metadata for a single value in an enum.
#[derive(Clone, Debug)]
pub struct EnumValue {
    /// The name of the enum value.
    ///
    /// This is the string literal representation of the enum in responses.
    pub name: ArcStr,
    /// The optional description of the enum value.
    pub description: Option<ArcStr>,
    /// Whether the value is deprecated, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl EnumValue {
    /// Creates an enum value with the provided name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }
}

impl MetaType {
    /// Accesses the name of the type.
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Union(UnionMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. }) => name,
        }
    }

    /// Accesses the description of the type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Union(UnionMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. }) => description.as_ref(),
        }
    }

    /// Accesses the specification URL, if applicable.
    ///
    /// Only custom scalars can carry one.
    pub fn specified_by_url(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta {
                specified_by_url, ..
            }) => specified_by_url.as_ref(),
            _ => None,
        }
    }

    /// The introspection kind of this type.
    pub fn type_kind(&self) -> TypeKind {
        match self {
            Self::Scalar(..) => TypeKind::Scalar,
            Self::Object(..) => TypeKind::Object,
            Self::Interface(..) => TypeKind::Interface,
            Self::Union(..) => TypeKind::Union,
            Self::Enum(..) => TypeKind::Enum,
            Self::InputObject(..) => TypeKind::InputObject,
        }
    }

    /// Accesses the declared fields of an object or interface type.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            Self::Object(ObjectMeta { fields, .. })
            | Self::Interface(InterfaceMeta { fields, .. }) => Some(fields),
            _ => None,
        }
    }

    /// Accesses a field's metadata given its name.
    ///
    /// Only objects and interfaces have fields; `None` for other kinds.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields()
            .and_then(|fields| fields.iter().find(|f| f.name == name))
    }

    /// Accesses an input field's metadata given its name.
    ///
    /// Only input objects have input fields; `None` for other kinds.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match self {
            Self::InputObject(InputObjectMeta { input_fields, .. }) => {
                input_fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Returns true for composite types: objects, interfaces, and unions.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(..) | Self::Interface(..) | Self::Union(..))
    }

    /// Returns true for leaf types: enums and scalars.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Enum(..) | Self::Scalar(..))
    }

    /// Returns true for abstract types: interfaces and unions.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(..) | Self::Union(..))
    }

    /// Returns true for types usable in input positions: scalars, enums,
    /// and input objects.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(..) | Self::Enum(..) | Self::InputObject(..))
    }

    /// Returns true if the type belongs to the introspection system.
    pub fn is_builtin(&self) -> bool {
        self.name().starts_with("__")
    }
}
