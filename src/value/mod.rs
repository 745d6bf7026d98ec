//! The dynamic value model used for resolver inputs and response data.

mod object;

use std::fmt;

pub use self::object::Object;

/// A primitive leaf value.
///
/// The variant records whether the value originated as an integer, a
/// floating-point number, a string, or a boolean, backing GraphQL's
/// `Int` vs `Float` vs `Boolean` distinction. A `Float` never holds `NaN`
/// or an infinity; the lexer and the coercion layer reject both.
#[derive(Clone, Debug)]
pub enum ScalarValue {
    /// A signed 32-bit integer.
    Int(i32),
    /// An IEEE-754 double, always finite.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A boolean.
    Boolean(bool),
}

impl ScalarValue {
    /// Views this scalar as an `i32`, if it is an integer.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Views this scalar numerically, converting integer origin to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(f64::from(*i)),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Views this scalar as a string slice, if it is a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Views this scalar as a boolean, if it is one.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for ScalarValue {
    /// Numeric scalars compare by value irrespective of their
    /// integer-vs-float origin.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(i1), Self::Int(i2)) => i1 == i2,
            (Self::Float(f1), Self::Float(f2)) => f1 == f2,
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => {
                f64::from(*i) == *f
            }
            (Self::String(s1), Self::String(s2)) => s1 == s2,
            (Self::Boolean(b1), Self::Boolean(b2)) => b1 == b2,
            _ => false,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::String(s) => {
                write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl serde::Serialize for ScalarValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(i) => serializer.serialize_i32(*i),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::String(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Serializable value produced by query and field execution.
///
/// Used by the execution engine and resolvers to build up the response
/// structure, and as the erased currency between the engine and
/// host-provided resolver functions. Unlike [`crate::ast::InputValue`] it
/// can not contain enum values or variables, and carries no location
/// information.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Value {
    Null,
    Scalar(ScalarValue),
    List(Vec<Value>),
    Object(Object),
}

impl Value {
    // CONSTRUCTORS

    /// Constructs a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Constructs a list value.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    /// Constructs an object value.
    pub fn object(o: Object) -> Self {
        Self::Object(o)
    }

    /// Constructs a scalar value.
    pub fn scalar<T: Into<ScalarValue>>(s: T) -> Self {
        Self::Scalar(s.into())
    }

    // DISCRIMINATORS

    /// Does this value represent `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Views the underlying scalar value, if present.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Views the underlying integer value, if present.
    pub fn as_int_value(&self) -> Option<i32> {
        self.as_scalar().and_then(ScalarValue::as_int)
    }

    /// Views the underlying float value, if present.
    pub fn as_float_value(&self) -> Option<f64> {
        self.as_scalar().and_then(ScalarValue::as_float)
    }

    /// Views the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        self.as_scalar().and_then(ScalarValue::as_string)
    }

    /// Views the underlying boolean value, if present.
    pub fn as_boolean_value(&self) -> Option<bool> {
        self.as_scalar().and_then(ScalarValue::as_boolean)
    }

    /// Views the underlying object value, if present.
    pub fn as_object_value(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Converts this value into an [`Object`], if it is one.
    pub fn into_object(self) -> Option<Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutable view into the underlying object value, if present.
    pub fn as_mut_object_value(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Views the underlying list value, if present.
    pub fn as_list_value(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Deterministic rendering used inside error messages: object keys are
    /// printed in ascending order regardless of insertion order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Scalar(s) => write!(f, "{s}"),
            Self::List(list) => {
                write!(f, "[")?;
                for (idx, item) in list.iter().enumerate() {
                    write!(f, "{item}")?;
                    if idx < list.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Self::Object(obj) => {
                let mut entries: Vec<_> = obj.iter().collect();
                entries.sort_by_key(|(k, _)| k.as_str());

                write!(f, "{{")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    write!(f, "\"{key}\": {value}")?;
                    if idx < entries.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Scalar(s) => s.serialize(serializer),
            Self::List(l) => l.serialize(serializer),
            Self::Object(o) => o.serialize(serializer),
        }
    }
}

impl From<i32> for ScalarValue {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T> From<Option<T>> for Value
where
    Self: From<T>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::scalar(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}

impl<T> From<Vec<T>> for Value
where
    Self: From<T>,
{
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Object, Value};

    #[test]
    fn display_null() {
        assert_eq!("null", Value::Null.to_string());
    }

    #[test]
    fn display_int() {
        assert_eq!("123", Value::from(123).to_string());
    }

    #[test]
    fn display_float() {
        assert_eq!("123.456", Value::from(123.456).to_string());
    }

    #[test]
    fn display_string() {
        assert_eq!("\"foo\"", Value::from("foo").to_string());
    }

    #[test]
    fn display_bool() {
        assert_eq!("false", Value::from(false).to_string());
        assert_eq!("true", Value::from(true).to_string());
    }

    #[test]
    fn display_list() {
        let v = Value::list(vec![1.into(), Value::Null, "foo".into()]);
        assert_eq!("[1, null, \"foo\"]", v.to_string());
    }

    #[test]
    fn display_object_sorts_keys() {
        let v = Value::object(Object::from_iter([
            ("b", Value::from(2)),
            ("a", Value::from(1)),
        ]));
        assert_eq!(r#"{"a": 1, "b": 2}"#, v.to_string());
    }

    #[test]
    fn numeric_equality_ignores_origin() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from(1.5));
        assert_ne!(Value::from(1), Value::from(true));
    }

    #[test]
    fn serialization_preserves_insertion_order() {
        let v = Value::object(Object::from_iter([
            ("b", Value::from(2)),
            ("a", Value::from(1)),
        ]));
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"b":2,"a":1}"#);
    }
}
