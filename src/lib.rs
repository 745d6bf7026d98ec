//! A dynamic GraphQL query execution engine.
//!
//! Schemas are built from schema definition language at runtime, requests
//! are parsed and validated against them, and fields resolve through
//! host-provided resolver functions over an erased [`Value`] model:
//!
//! ```
//! use graphlet::{Resolver, Value, Variables, graphql};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let schema = graphlet::build_schema("type Query { hello: String }")
//!     .unwrap()
//!     .resolver(
//!         "Query",
//!         "hello",
//!         Resolver::sync(|_ctx| Ok(Value::from("world"))),
//!     )
//!     .finish()
//!     .unwrap();
//!
//! let response = graphql(
//!     &schema,
//!     "{ hello }",
//!     &Value::Null,
//!     &(),
//!     &Variables::new(),
//!     None,
//! )
//! .await;
//!
//! assert!(response.is_ok());
//! # });
//! ```

pub mod ast;
pub mod executor;
pub mod instrumentation;
pub mod parser;
pub mod persisted;
mod printer;
pub mod resolver;
mod response;
pub(crate) mod schema;
mod util;
pub mod validation;
mod value;

#[cfg(test)]
mod executor_tests;

use std::{any::Any, time::Instant};

use derive_more::with_trait::Display;
use itertools::Itertools as _;
use tracing::debug;

use crate::{
    executor::coerce_variable_values,
    instrumentation::Timing,
    validation::{ValidatorContext, visit_all_rules, visit_all_sdl_rules},
};

pub use crate::{
    ast::{Document, InputValue, OperationType, OwnedDocument, Type, Variables},
    executor::{
        CancellationToken, ExecutionError, ExecutionOptions, ExecutionResult,
        ExecutionStrategies, ExecutionStrategy, FieldError, FieldResult, PathSegment,
        ResponseStream, VariableValues,
    },
    instrumentation::{Instrumentation, NoopInstrumentation},
    parser::{ParseError, SourcePosition, Span, Spanning, parse_document_source},
    persisted::{PersistedLookup, PersistedQueries},
    printer::print_document,
    resolver::{
        IsTypeOf, ResolveInfo, Resolver, ResolverContext, Subscriber, TypeResolver, ValueStream,
    },
    response::Response,
    schema::{
        Schema, SchemaBuilder, SchemaType,
        meta::{self, DeprecationStatus, TypeKind},
        model::DirectiveType,
    },
    validation::RuleError,
    value::{Object, ScalarValue, Value},
};

/// An error that prevented execution of a request.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum GraphQLError {
    ParseError(Spanning<ParseError>),
    #[display("{_0}")]
    SchemaError(String),
    #[display("{}", _0.iter().format("\n"))]
    ValidationError(Vec<RuleError>),
    #[display("{}", _0.iter().format("\n"))]
    VariableCoercionError(Vec<RuleError>),
    #[display("Must provide an operation")]
    NoOperationProvided,
    #[display("Multiple operations provided")]
    MultipleOperationsProvided,
    #[display("Unknown operation name")]
    UnknownOperationName,
    #[display("Operation is a subscription")]
    IsSubscription,
    #[display("Operation is not a subscription")]
    NotSubscription,
    #[display("{_0}")]
    SubscriptionError(String),
    #[display("Unknown persisted query")]
    UnknownPersistedQuery,
}

impl From<Spanning<ParseError>> for GraphQLError {
    fn from(e: Spanning<ParseError>) -> Self {
        Self::ParseError(e)
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError(e) => Some(e),
            Self::ValidationError(errs) | Self::VariableCoercionError(errs) => {
                Some(errs.first()?)
            }
            _ => None,
        }
    }
}

/// Parses a GraphQL source text into a document.
pub fn parse(source: &str) -> Result<OwnedDocument<'_>, Spanning<ParseError>> {
    parse_document_source(source)
}

/// Builds a schema out of an SDL source.
///
/// The SDL document is validated first; the returned [`SchemaBuilder`]
/// accepts resolver functions before [`SchemaBuilder::finish`] seals and
/// validates the schema itself.
pub fn build_schema(sdl: &str) -> Result<SchemaBuilder, GraphQLError> {
    let document = parse_document_source(sdl)?;

    let placeholder = SchemaType::sdl_placeholder();
    let mut ctx = ValidatorContext::new(&placeholder, &document);
    visit_all_sdl_rules(&mut ctx, &document);
    let errors = ctx.into_errors();
    if !errors.is_empty() {
        return Err(GraphQLError::ValidationError(errors));
    }

    SchemaBuilder::from_document(&document)
}

/// Produces a builder holding `schema` extended with the definitions and
/// extensions of `sdl`.
pub fn extend_schema(schema: &Schema, sdl: &str) -> Result<SchemaBuilder, GraphQLError> {
    let document = parse_document_source(sdl)?;
    schema::extend_schema(schema, &document)
}

/// Validates a document against a schema with the full default rule list,
/// returning every violation found.
///
/// For identical inputs the returned list is identical: errors come out
/// sorted by source position.
pub fn validate<'a>(schema: &'a Schema, document: &'a Document<'a>) -> Vec<RuleError> {
    let mut ctx = ValidatorContext::new(&schema.schema, document);
    visit_all_rules(&mut ctx, document);
    ctx.into_errors()
}

/// Validates a document with a caller-assembled rule set instead of the
/// default list.
///
/// Chain rule visitors with [`validation::MultiVisitorNil::with`] to run
/// several rules in one traversal pass:
///
/// ```
/// use graphlet::validation::{MultiVisitorNil, rules};
///
/// let schema = graphlet::build_schema("type Query { hello: String }")
///     .unwrap()
///     .finish()
///     .unwrap();
/// let document = graphlet::parse("{ hello }").unwrap();
///
/// let mut visitor = MultiVisitorNil
///     .with(rules::fields_on_correct_type::factory())
///     .with(rules::scalar_leafs::factory());
/// let errors = graphlet::validate_with_visitor(&mut visitor, &schema, &document);
/// assert!(errors.is_empty());
/// ```
pub fn validate_with_visitor<'a, V: validation::Visitor<'a>>(
    visitor: &mut V,
    schema: &'a Schema,
    document: &'a Document<'a>,
) -> Vec<RuleError> {
    let mut ctx = ValidatorContext::new(&schema.schema, document);
    validation::visit(visitor, &mut ctx, document);
    ctx.into_errors()
}

/// Executes a query or mutation operation of a validated document.
pub async fn execute<'a>(
    document: &'a Document<'a>,
    operation_name: Option<&str>,
    schema: &'a Schema,
    variables: &Variables,
    root_value: &'a Value,
    context_value: &'a (dyn Any + Send + Sync),
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    execute_with(
        document,
        operation_name,
        schema,
        variables,
        root_value,
        context_value,
        &ExecutionOptions::default(),
    )
    .await
}

/// Executes a query or mutation operation of a validated document, with
/// explicit strategies, cancellation, and instrumentation.
pub async fn execute_with<'a>(
    document: &'a Document<'a>,
    operation_name: Option<&str>,
    schema: &'a Schema,
    variables: &Variables,
    root_value: &'a Value,
    context_value: &'a (dyn Any + Send + Sync),
    options: &ExecutionOptions,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    let operation = executor::get_operation(document, operation_name)?;

    if operation.item.operation_type == OperationType::Subscription {
        return Err(GraphQLError::IsSubscription);
    }

    let coerced_variables = coerce_variable_values(&schema.schema, operation, variables)
        .map_err(GraphQLError::VariableCoercionError)?;

    let ctx = executor::ExecutionContext::new(
        &schema.schema,
        document,
        operation,
        coerced_variables,
        context_value,
        options,
    );

    let op_name = operation.item.name.map(|n| n.item);
    ctx.instrumentation.before_operation_execution(op_name);
    let started = Instant::now();

    let data = ctx.execute_operation(root_value).await;
    let errors = ctx.finish_errors();

    ctx.instrumentation
        .after_operation_execution(op_name, &Timing::since(started));

    Ok((data, errors))
}

/// Resolves a subscription operation into a stream of responses, one per
/// source event.
pub async fn subscribe<'a>(
    document: &'a Document<'a>,
    operation_name: Option<&str>,
    schema: &'a Schema,
    variables: &Variables,
    root_value: &'a Value,
    context_value: &'a (dyn Any + Send + Sync),
) -> Result<ResponseStream<'a>, GraphQLError> {
    subscribe_with(
        document,
        operation_name,
        schema,
        variables,
        root_value,
        context_value,
        &ExecutionOptions::default(),
    )
    .await
}

/// [`subscribe`] with explicit strategies, cancellation, and
/// instrumentation.
pub async fn subscribe_with<'a>(
    document: &'a Document<'a>,
    operation_name: Option<&str>,
    schema: &'a Schema,
    variables: &Variables,
    root_value: &'a Value,
    context_value: &'a (dyn Any + Send + Sync),
    options: &ExecutionOptions,
) -> Result<ResponseStream<'a>, GraphQLError> {
    let operation = executor::get_operation(document, operation_name)?;

    if operation.item.operation_type != OperationType::Subscription {
        return Err(GraphQLError::NotSubscription);
    }

    let coerced_variables = coerce_variable_values(&schema.schema, operation, variables)
        .map_err(GraphQLError::VariableCoercionError)?;

    let ctx = executor::ExecutionContext::new(
        &schema.schema,
        document,
        operation,
        coerced_variables,
        context_value,
        options,
    );

    let source_stream =
        executor::subscription::create_source_event_stream(&ctx, root_value).await?;

    Ok(executor::subscription::map_source_to_response_stream(
        ctx,
        source_stream,
    ))
}

/// Parses, validates, and executes a request in one call.
pub async fn graphql<'a>(
    schema: &'a Schema,
    request: &'a str,
    root_value: &'a Value,
    context_value: &'a (dyn Any + Send + Sync),
    variables: &Variables,
    operation_name: Option<&str>,
) -> Response {
    graphql_with(
        schema,
        request,
        root_value,
        context_value,
        variables,
        operation_name,
        &ExecutionOptions::default(),
    )
    .await
}

/// [`graphql`] with explicit strategies, cancellation, and
/// instrumentation.
pub async fn graphql_with<'a>(
    schema: &'a Schema,
    request: &'a str,
    root_value: &'a Value,
    context_value: &'a (dyn Any + Send + Sync),
    variables: &Variables,
    operation_name: Option<&str>,
    options: &ExecutionOptions,
) -> Response {
    let instrumentation = options.instrumentation.clone();
    let noop = NoopInstrumentation;
    let instrumentation: &dyn Instrumentation = match &instrumentation {
        Some(i) => i.as_ref(),
        None => &noop,
    };

    instrumentation.before_query_parsing();
    let started = Instant::now();
    let document = parse_document_source(request);
    instrumentation.after_query_parsing(request, document.is_ok(), &Timing::since(started));

    let document = match document {
        Ok(document) => document,
        Err(e) => {
            debug!(error = %e, "request failed to parse");
            return Response::from_error(GraphQLError::ParseError(e));
        }
    };

    instrumentation.before_query_validation();
    let started = Instant::now();
    let errors = validate(schema, &document);
    instrumentation.after_query_validation(&errors, &Timing::since(started));

    if !errors.is_empty() {
        debug!(count = errors.len(), "request failed validation");
        return Response::from_error(GraphQLError::ValidationError(errors));
    }

    Response::from_result(
        execute_with(
            &document,
            operation_name,
            schema,
            variables,
            root_value,
            context_value,
            options,
        )
        .await,
    )
}

/// Executes a persisted query by id against a host-provided store.
pub async fn execute_persisted<'a>(
    schema: &'a Schema,
    store: &'a dyn PersistedQueries,
    id: &str,
    root_value: &'a Value,
    context_value: &'a (dyn Any + Send + Sync),
    variables: &Variables,
    operation_name: Option<&str>,
) -> Response {
    match store.lookup(id).await {
        PersistedLookup::Unknown => Response::from_error(GraphQLError::UnknownPersistedQuery),
        PersistedLookup::ParseError(e) => Response::from_error(GraphQLError::ParseError(e)),
        PersistedLookup::ValidateErrors(errors) => {
            Response::from_error(GraphQLError::ValidationError(errors))
        }
        PersistedLookup::Document(document) => Response::from_result(
            execute(
                document,
                operation_name,
                schema,
                variables,
                root_value,
                context_value,
            )
            .await,
        ),
    }
}
