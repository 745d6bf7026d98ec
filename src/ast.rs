//! The GraphQL abstract syntax tree.
//!
//! Executable definitions (operations, fragments) follow the shape produced
//! by [`crate::parser::document`]; type-system definitions (the SDL subset)
//! follow [`crate::parser::schema`]. All nodes reference slices of the
//! source text and carry [`Spanning`] location markers.

use std::{collections::HashMap, fmt, slice, vec};

use arcstr::ArcStr;

use crate::parser::Spanning;

/// Type literal in a syntax tree.
///
/// Carries no semantic information and might refer to types that don't
/// exist. A non-`null` wrapper around a non-`null` type is unrepresentable
/// by construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type<N = ArcStr> {
    /// A nullable named type, e.g. `String`.
    Named(N),
    /// A nullable list type, e.g. `[String]`.
    List(Box<Type<N>>),
    /// A non-`null` named type, e.g. `String!`.
    NonNullNamed(N),
    /// A non-`null` list type, e.g. `[String]!`.
    NonNullList(Box<Type<N>>),
}

impl<N: AsRef<str>> Type<N> {
    /// Returns the name of this type, unless it is a list.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => Some(n.as_ref()),
            Self::List(..) | Self::NonNullList(..) => None,
        }
    }

    /// Returns the innermost name of this type by unpacking lists.
    ///
    /// All type literals contain exactly one name.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => n.as_ref(),
            Self::List(l) | Self::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Indicates whether this type can not be `null`.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNullNamed(..) | Self::NonNullList(..))
    }

    /// Indicates whether this type is a list, nullable or not.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(..) | Self::NonNullList(..))
    }

    /// Converts this literal into one owning its name.
    pub fn to_arc(&self) -> Type<ArcStr> {
        match self {
            Self::Named(n) => Type::Named(ArcStr::from(n.as_ref())),
            Self::NonNullNamed(n) => Type::NonNullNamed(ArcStr::from(n.as_ref())),
            Self::List(l) => Type::List(Box::new(l.to_arc())),
            Self::NonNullList(l) => Type::NonNullList(Box::new(l.to_arc())),
        }
    }
}

impl Type<ArcStr> {
    /// Returns this type with the outermost non-`null` wrapper removed.
    pub fn into_nullable(self) -> Self {
        match self {
            Self::NonNullNamed(n) => Self::Named(n),
            Self::NonNullList(l) => Self::List(l),
            t => t,
        }
    }
}

impl<N: AsRef<str>> fmt::Display for Type<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{}", n.as_ref()),
            Self::NonNullNamed(n) => write!(f, "{}!", n.as_ref()),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

/// A JSON-like value that can occur as an argument or variable literal in a
/// document, or be passed into execution out-of-band. These are _not_
/// constant and might contain variables.
///
/// List and object variants are _spanned_, i.e. they reference their
/// position in the source file, if available.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Null,
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    Variable(String),
    List(Vec<Spanning<InputValue>>),
    Object(Vec<(Spanning<String>, Spanning<InputValue>)>),
}

/// The map of variables used for substitution during query execution.
pub type Variables = HashMap<String, InputValue>;

impl InputValue {
    /// Construct a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Construct a string value.
    pub fn string<T: AsRef<str>>(s: T) -> Self {
        Self::String(s.as_ref().into())
    }

    /// Construct an enum value.
    pub fn enum_value<T: AsRef<str>>(s: T) -> Self {
        Self::Enum(s.as_ref().into())
    }

    /// Construct a variable value.
    pub fn variable<T: AsRef<str>>(v: T) -> Self {
        Self::Variable(v.as_ref().into())
    }

    /// Construct an unlocated list.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l.into_iter().map(Spanning::unlocated).collect())
    }

    /// Construct a located list.
    pub fn parsed_list(l: Vec<Spanning<Self>>) -> Self {
        Self::List(l)
    }

    /// Construct an unlocated object.
    pub fn object<K: AsRef<str>>(o: Vec<(K, Self)>) -> Self {
        Self::Object(
            o.into_iter()
                .map(|(k, v)| {
                    (
                        Spanning::unlocated(k.as_ref().into()),
                        Spanning::unlocated(v),
                    )
                })
                .collect(),
        )
    }

    /// Construct a located object.
    pub fn parsed_object(o: Vec<(Spanning<String>, Spanning<Self>)>) -> Self {
        Self::Object(o)
    }

    /// Resolves all variables of this value to their actual `values`.
    ///
    /// If a variable is not present in `values`:
    /// - returns [`None`] in case this is an [`InputValue::Variable`];
    /// - skips the field in case of an [`InputValue::Object`] field;
    /// - replaces with [`InputValue::Null`] in case of an
    ///   [`InputValue::List`] element.
    ///
    /// A missing variable (or object field) may pick up a default value
    /// later, while a single list element cannot.
    #[must_use]
    pub fn into_const(self, values: &Variables) -> Option<Self> {
        match self {
            Self::Variable(v) => values.get(&v).cloned(),
            Self::List(l) => Some(Self::List(
                l.into_iter()
                    .map(|s| s.map(|v| v.into_const(values).unwrap_or_else(Self::null)))
                    .collect(),
            )),
            Self::Object(o) => Some(Self::Object(
                o.into_iter()
                    .filter_map(|(sk, sv)| sv.and_then(|v| v.into_const(values)).map(|sv| (sk, sv)))
                    .collect(),
            )),
            v => Some(v),
        }
    }

    /// Does the value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does the value represent a variable?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// View the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e.as_str()),
            _ => None,
        }
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// View this value as a list of its elements, if it is a list.
    pub fn to_list_value(&self) -> Option<Vec<&Self>> {
        match self {
            Self::List(l) => Some(l.iter().map(|s| &s.item).collect()),
            _ => None,
        }
    }

    /// View this value as a sequence of key/value entries, if it is an
    /// object.
    pub fn to_object_value(&self) -> Option<Vec<(&str, &Self)>> {
        match self {
            Self::Object(o) => Some(
                o.iter()
                    .map(|(sk, sv)| (sk.item.as_str(), &sv.item))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Recursively finds all variables this value references.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            Self::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }

    /// Compares equality with another value, ignoring any source position
    /// information.
    pub fn unlocated_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(i1), Self::Int(i2)) => i1 == i2,
            (Self::Float(f1), Self::Float(f2)) => f1 == f2,
            (Self::Boolean(b1), Self::Boolean(b2)) => b1 == b2,
            (Self::String(s1), Self::String(s2))
            | (Self::Enum(s1), Self::Enum(s2))
            | (Self::Variable(s1), Self::Variable(s2)) => s1 == s2,
            (Self::List(l1), Self::List(l2)) => {
                l1.len() == l2.len()
                    && l1
                        .iter()
                        .zip(l2.iter())
                        .all(|(v1, v2)| v1.item.unlocated_eq(&v2.item))
            }
            (Self::Object(o1), Self::Object(o2)) => {
                o1.len() == o2.len()
                    && o1.iter().all(|(sk1, sv1)| {
                        o2.iter().any(|(sk2, sv2)| {
                            sk1.item == sk2.item && sv1.item.unlocated_eq(&sv2.item)
                        })
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::String(s) => {
                write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, spanning) in v.iter().enumerate() {
                    spanning.item.fmt(f)?;
                    if i < v.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    write!(f, "{}: ", k.item)?;
                    v.item.fmt(f)?;
                    if i < o.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition<'a> {
    pub var_type: Spanning<Type<&'a str>>,
    pub default_value: Option<Spanning<InputValue>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arguments<'a> {
    pub items: Vec<(Spanning<&'a str>, Spanning<InputValue>)>,
}

impl<'a> Arguments<'a> {
    pub fn into_iter(self) -> vec::IntoIter<(Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.into_iter()
    }

    pub fn iter(&self) -> slice::Iter<'_, (Spanning<&'a str>, Spanning<InputValue>)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue>> {
        self.items
            .iter()
            .find(|&(k, _)| k.item == key)
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinitions<'a> {
    pub items: Vec<(Spanning<&'a str>, VariableDefinition<'a>)>,
}

impl<'a> VariableDefinitions<'a> {
    pub fn iter(&self) -> slice::Iter<'_, (Spanning<&'a str>, VariableDefinition<'a>)> {
        self.items.iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field<'a> {
    pub alias: Option<Spanning<&'a str>>,
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Option<Vec<Selection<'a>>>,
}

impl<'a> Field<'a> {
    /// The key under which this field's value appears in the response: its
    /// alias if present, its name otherwise.
    pub fn response_key(&self) -> &'a str {
        self.alias.as_ref().map_or(self.name.item, |a| a.item)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread<'a> {
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment<'a> {
    pub type_condition: Option<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

/// Entry in a GraphQL selection set.
///
/// One of the three kinds of selection that exist in GraphQL: a field, a
/// fragment spread, or an inline fragment.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum Selection<'a> {
    Field(Spanning<Field<'a>>),
    FragmentSpread(Spanning<FragmentSpread<'a>>),
    InlineFragment(Spanning<InlineFragment<'a>>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Directive<'a> {
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a>>>,
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub struct Operation<'a> {
    pub operation_type: OperationType,
    pub name: Option<Spanning<&'a str>>,
    pub variable_definitions: Option<Spanning<VariableDefinitions<'a>>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fragment<'a> {
    pub name: Spanning<&'a str>,
    pub type_condition: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub selection_set: Vec<Selection<'a>>,
}

/// All places a directive can be attached to.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// Parses the SDL spelling of a directive location.
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "QUERY" => Self::Query,
            "MUTATION" => Self::Mutation,
            "SUBSCRIPTION" => Self::Subscription,
            "FIELD" => Self::Field,
            "FRAGMENT_DEFINITION" => Self::FragmentDefinition,
            "FRAGMENT_SPREAD" => Self::FragmentSpread,
            "INLINE_FRAGMENT" => Self::InlineFragment,
            "VARIABLE_DEFINITION" => Self::VariableDefinition,
            "SCHEMA" => Self::Schema,
            "SCALAR" => Self::Scalar,
            "OBJECT" => Self::Object,
            "FIELD_DEFINITION" => Self::FieldDefinition,
            "ARGUMENT_DEFINITION" => Self::ArgumentDefinition,
            "INTERFACE" => Self::Interface,
            "UNION" => Self::Union,
            "ENUM" => Self::Enum,
            "ENUM_VALUE" => Self::EnumValue,
            "INPUT_OBJECT" => Self::InputObject,
            "INPUT_FIELD_DEFINITION" => Self::InputFieldDefinition,
            _ => return None,
        })
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::VariableDefinition => "VARIABLE_DEFINITION",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        })
    }
}

// ----------------------------------------------------------------------------
// Type-system definitions
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct OperationTypeDefinition<'a> {
    pub operation: OperationType,
    pub named_type: Spanning<&'a str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SchemaDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub operation_types: Vec<Spanning<OperationTypeDefinition<'a>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarTypeDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub arguments: Vec<Spanning<InputValueDefinition<'a>>>,
    pub field_type: Spanning<Type<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputValueDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub value_type: Spanning<Type<&'a str>>,
    pub default_value: Option<Spanning<InputValue>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTypeDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub interfaces: Vec<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub fields: Vec<Spanning<FieldDefinition<'a>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceTypeDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub interfaces: Vec<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub fields: Vec<Spanning<FieldDefinition<'a>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionTypeDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub members: Vec<Spanning<&'a str>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumValueDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumTypeDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub values: Vec<Spanning<EnumValueDefinition<'a>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectTypeDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a>>>>,
    pub fields: Vec<Spanning<InputValueDefinition<'a>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveDefinition<'a> {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<&'a str>,
    pub arguments: Vec<Spanning<InputValueDefinition<'a>>>,
    pub repeatable: bool,
    pub locations: Vec<Spanning<DirectiveLocation>>,
}

/// A named type definition of any kind.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDefinition<'a> {
    Scalar(ScalarTypeDefinition<'a>),
    Object(ObjectTypeDefinition<'a>),
    Interface(InterfaceTypeDefinition<'a>),
    Union(UnionTypeDefinition<'a>),
    Enum(EnumTypeDefinition<'a>),
    InputObject(InputObjectTypeDefinition<'a>),
}

impl<'a> TypeDefinition<'a> {
    /// The name this definition introduces.
    pub fn name(&self) -> &Spanning<&'a str> {
        match self {
            Self::Scalar(d) => &d.name,
            Self::Object(d) => &d.name,
            Self::Interface(d) => &d.name,
            Self::Union(d) => &d.name,
            Self::Enum(d) => &d.name,
            Self::InputObject(d) => &d.name,
        }
    }

    /// A human-readable kind name, as used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(..) => "scalar",
            Self::Object(..) => "object",
            Self::Interface(..) => "interface",
            Self::Union(..) => "union",
            Self::Enum(..) => "enum",
            Self::InputObject(..) => "input object",
        }
    }
}

/// A type-system definition or extension.
///
/// Extensions retain their original inner definition node.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSystemDefinition<'a> {
    Schema(Spanning<SchemaDefinition<'a>>),
    Type(Spanning<TypeDefinition<'a>>),
    Directive(Spanning<DirectiveDefinition<'a>>),
    SchemaExtension(Spanning<SchemaDefinition<'a>>),
    TypeExtension(Spanning<TypeDefinition<'a>>),
}

#[doc(hidden)]
#[derive(Clone, Debug, PartialEq)]
pub enum Definition<'a> {
    Operation(Spanning<Operation<'a>>),
    Fragment(Spanning<Fragment<'a>>),
    TypeSystem(TypeSystemDefinition<'a>),
}

#[doc(hidden)]
pub type Document<'a> = [Definition<'a>];
#[doc(hidden)]
pub type OwnedDocument<'a> = Vec<Definition<'a>>;
