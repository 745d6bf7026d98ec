//! The two-phase subscription algorithm: create the source event stream,
//! then map every event through the normal execution algorithm.

use std::{pin::Pin, sync::Arc, time::Instant};

use futures::{Stream, StreamExt as _, future};
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    GraphQLError,
    executor::{ExecutionContext, PathSegment, variables},
    instrumentation::Timing,
    resolver::{ResolveInfo, ResolverContext, ValueStream},
    response::Response,
    value::Value,
};

/// A lazy, cancellable stream of responses, one per source event.
pub type ResponseStream<'a> = Pin<Box<dyn Stream<Item = Response> + Send + 'a>>;

/// Locates the single subscription root field and invokes its `subscribe`
/// resolver to produce the source event stream.
///
/// Failures here are request-level: no stream is produced.
pub(crate) async fn create_source_event_stream<'a>(
    ctx: &ExecutionContext<'a>,
    root_value: &Value,
) -> Result<ValueStream, GraphQLError> {
    let Some(subscription_type) = ctx.schema.concrete_subscription_type() else {
        return Err(GraphQLError::SubscriptionError(
            "Schema is not configured for subscriptions.".into(),
        ));
    };

    let mut visited = std::collections::HashSet::new();
    let mut grouped = IndexMap::new();
    ctx.collect_fields(
        subscription_type,
        &ctx.operation.item.selection_set,
        &mut visited,
        &mut grouped,
    );

    // Single-field subscriptions are enforced by validation; guard anyway.
    let Some((response_key, fields)) = grouped.into_iter().next() else {
        return Err(GraphQLError::SubscriptionError(
            "Subscription does not select any fields.".into(),
        ));
    };

    let field_ast = fields[0];
    let field_name = field_ast.item.name.item;

    let Some(field_meta) = ctx.schema.lookup_field(subscription_type, field_name) else {
        return Err(GraphQLError::SubscriptionError(format!(
            "The subscription field \"{field_name}\" is not defined.",
        )));
    };

    let args = variables::coerce_argument_values(
        ctx.schema,
        field_meta,
        field_ast.item.arguments.as_ref(),
        &ctx.variable_values,
    )
    .map_err(|e| GraphQLError::SubscriptionError(e.message().into()))?;

    let Some(subscriber) = &field_meta.subscriber else {
        return Err(GraphQLError::SubscriptionError(format!(
            "The subscription field \"{field_name}\" has no subscribe resolver.",
        )));
    };

    let info = ResolveInfo {
        field_name,
        parent_type_name: subscription_type.name().as_str(),
        return_type: &field_meta.field_type,
        path: vec![PathSegment::Key(response_key.to_owned())],
        schema: ctx.schema,
        fragments: &ctx.fragments,
        operation: &ctx.operation,
        root_value,
        variable_values: &ctx.variable_values,
    };

    ctx.instrumentation
        .before_field_resolution(subscription_type.name().as_str(), field_name);
    let started = Instant::now();

    let result = subscriber
        .subscribe(ResolverContext {
            source: root_value,
            args: &args,
            context: ctx.context_value,
            info,
        })
        .await;

    ctx.instrumentation.after_field_resolution(
        subscription_type.name().as_str(),
        field_name,
        result.is_ok(),
        &Timing::since(started),
    );

    result.map_err(|e| GraphQLError::SubscriptionError(e.message().into()))
}

/// Transforms the source event stream into a stream of responses by
/// running the normal execute algorithm per event, with the event as the
/// root value.
///
/// An error while mapping one event yields a `data: null` response for
/// that event without terminating the stream. Cancellation ends the
/// stream, dropping (and thereby cancelling) the source.
pub(crate) fn map_source_to_response_stream<'a>(
    ctx: ExecutionContext<'a>,
    source_stream: ValueStream,
) -> ResponseStream<'a> {
    let ctx = Arc::new(ctx);
    let token = ctx.token.clone();

    debug!("subscription source event stream established");

    source_stream
        .take_while(move |_| future::ready(!token.is_cancelled()))
        .then(move |event| {
            let ctx = Arc::clone(&ctx);
            async move {
                let data = ctx.execute_operation(&event).await;
                let errors = ctx.finish_errors();
                Response::from_parts(data, errors)
            }
        })
        .boxed()
}
