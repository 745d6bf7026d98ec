//! The serialized response shape.

use serde::ser::{Serialize, SerializeMap as _, SerializeSeq as _, Serializer};

use crate::{
    GraphQLError,
    executor::ExecutionError,
    parser::SourcePosition,
    validation::RuleError,
    value::Value,
};

/// The outcome of running one GraphQL request, ready for serialization.
///
/// Serializes to `{"data": …, "errors": […]}`: `errors` is omitted when
/// empty, and `data` is omitted entirely when a request-level error
/// occurred before execution began.
#[derive(Debug)]
pub struct Response(Result<(Value, Vec<ExecutionError>), GraphQLError>);

impl Response {
    /// Wraps the outcome of an `execute` call.
    pub fn from_result(r: Result<(Value, Vec<ExecutionError>), GraphQLError>) -> Self {
        Self(r)
    }

    /// Builds a successful response out of data and field errors.
    pub fn from_parts(data: Value, errors: Vec<ExecutionError>) -> Self {
        Self(Ok((data, errors)))
    }

    /// Builds a request-level error response.
    pub fn from_error(error: GraphQLError) -> Self {
        Self(Err(error))
    }

    /// Whether execution produced data.
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }

    /// The `data` value, when execution ran.
    pub fn data(&self) -> Option<&Value> {
        self.0.as_ref().ok().map(|(data, _)| data)
    }

    /// The field errors, when execution ran.
    pub fn errors(&self) -> Option<&[ExecutionError]> {
        self.0.as_ref().ok().map(|(_, errors)| errors.as_slice())
    }

    /// The request-level error, when execution never began.
    pub fn request_error(&self) -> Option<&GraphQLError> {
        self.0.as_ref().err()
    }
}

impl From<Result<(Value, Vec<ExecutionError>), GraphQLError>> for Response {
    fn from(r: Result<(Value, Vec<ExecutionError>), GraphQLError>) -> Self {
        Self(r)
    }
}

struct SerializedLocation(SourcePosition);

impl Serialize for SerializedLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        // One-based in the response format.
        map.serialize_entry("line", &(self.0.line() + 1))?;
        map.serialize_entry("column", &(self.0.column() + 1))?;
        map.end()
    }
}

struct SerializedMessage<'a> {
    message: &'a str,
    locations: &'a [SourcePosition],
}

impl Serialize for SerializedMessage<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", self.message)?;
        if !self.locations.is_empty() {
            let locations: Vec<_> = self
                .locations
                .iter()
                .map(|p| SerializedLocation(*p))
                .collect();
            map.serialize_entry("locations", &locations)?;
        }
        map.end()
    }
}

impl Serialize for ExecutionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("message", self.error().message())?;
        map.serialize_entry("locations", &[SerializedLocation(*self.location())])?;
        map.serialize_entry("path", self.path())?;

        if !self.error().extensions().is_null() {
            map.serialize_entry("extensions", self.error().extensions())?;
        }

        map.end()
    }
}

impl Serialize for RuleError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SerializedMessage {
            message: self.message(),
            locations: self.locations(),
        }
        .serialize(serializer)
    }
}

fn serialize_request_error<S: Serializer>(
    error: &GraphQLError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        GraphQLError::ParseError(e) => {
            let message = format!("Syntax Error: {}", e.item);
            let mut seq = serializer.serialize_seq(Some(1))?;
            seq.serialize_element(&SerializedMessage {
                message: &message,
                locations: &[e.span.start],
            })?;
            seq.end()
        }
        GraphQLError::ValidationError(errors) | GraphQLError::VariableCoercionError(errors) => {
            errors.serialize(serializer)
        }
        other => {
            let message = other.to_string();
            let mut seq = serializer.serialize_seq(Some(1))?;
            seq.serialize_element(&SerializedMessage {
                message: &message,
                locations: &[],
            })?;
            seq.end()
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Ok((data, errors)) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("data", data)?;
                if !errors.is_empty() {
                    map.serialize_entry("errors", errors)?;
                }
                map.end()
            }
            Err(error) => {
                struct Errors<'a>(&'a GraphQLError);
                impl Serialize for Errors<'_> {
                    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                        serialize_request_error(self.0, s)
                    }
                }

                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("errors", &Errors(error))?;
                map.end()
            }
        }
    }
}
