//! Contracts between the engine and host-provided resolver functions.
//!
//! Resolvers are value-producing callbacks receiving the source value, the
//! coerced argument map, the opaque host context, and a [`ResolveInfo`]
//! describing the field being resolved. A resolver may produce its value
//! immediately or return a deferred one; the engine awaits deferrals
//! without blocking the scheduling thread.

use std::{any::Any, fmt, sync::Arc};

use arcstr::ArcStr;
use futures::{
    FutureExt as _,
    future::{self, BoxFuture},
    stream::BoxStream,
};

use crate::{
    ast::{Fragment, Operation, Type},
    executor::{FieldError, FieldResult, PathSegment, VariableValues},
    parser::Spanning,
    schema::model::SchemaType,
    value::{Object, Value},
};

/// A lazy, cancellable, possibly infinite sequence of event values produced
/// by a subscription's `subscribe` resolver.
pub type ValueStream = BoxStream<'static, Value>;

/// Everything a resolver can learn about the field it is resolving.
pub struct ResolveInfo<'a> {
    /// Name of the field being resolved.
    pub field_name: &'a str,
    /// Name of the object type the field belongs to.
    pub parent_type_name: &'a str,
    /// Declared return type of the field.
    pub return_type: &'a Type<ArcStr>,
    /// Absolute path of the field in the response, aliases included.
    pub path: Vec<PathSegment>,
    /// The schema the request executes against.
    pub schema: &'a SchemaType,
    /// Fragments of the request document.
    pub fragments: &'a [Fragment<'a>],
    /// The operation being executed.
    pub operation: &'a Spanning<Operation<'a>>,
    /// The root value execution started from.
    pub root_value: &'a Value,
    /// The coerced variable values of the request.
    pub variable_values: &'a VariableValues,
}

/// Per-invocation payload handed to a resolver function.
pub struct ResolverContext<'a> {
    /// The value the parent field resolved to.
    pub source: &'a Value,
    /// Coerced argument values, defaults applied.
    pub args: &'a Object,
    /// The opaque host context; recover it with [`Any::downcast_ref`].
    pub context: &'a (dyn Any + Send + Sync),
    /// Field metadata.
    pub info: ResolveInfo<'a>,
}

impl<'a> ResolverContext<'a> {
    /// Downcasts the opaque host context to a concrete type.
    pub fn context_as<T: 'static>(&self) -> Option<&'a T> {
        self.context.downcast_ref()
    }

    /// Returns the named argument value, or [`Value::Null`] if absent.
    pub fn arg(&self, name: &str) -> &'a Value {
        self.args.get_field_value(name).unwrap_or(&Value::Null)
    }
}

type DynResolveFn =
    dyn for<'a> Fn(ResolverContext<'a>) -> BoxFuture<'a, FieldResult<Value>> + Send + Sync;

/// A field's `resolve` function.
#[derive(Clone)]
pub struct Resolver(Arc<DynResolveFn>);

impl Resolver {
    /// Wraps a function producing a deferred value.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> BoxFuture<'a, FieldResult<Value>>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wraps a function producing an immediate value.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(ResolverContext<'_>) -> FieldResult<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(move |ctx| future::ready(f(ctx)).boxed()))
    }

    pub(crate) fn resolve<'a>(
        &'a self,
        ctx: ResolverContext<'a>,
    ) -> BoxFuture<'a, FieldResult<Value>> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

type DynSubscribeFn =
    dyn for<'a> Fn(ResolverContext<'a>) -> BoxFuture<'a, FieldResult<ValueStream>> + Send + Sync;

/// A subscription field's `subscribe` function, producing the source event
/// stream.
#[derive(Clone)]
pub struct Subscriber(Arc<DynSubscribeFn>);

impl Subscriber {
    /// Wraps a function producing a deferred event stream.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> BoxFuture<'a, FieldResult<ValueStream>>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wraps a function producing an immediate event stream.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(ResolverContext<'_>) -> FieldResult<ValueStream> + Send + Sync + 'static,
    {
        Self(Arc::new(move |ctx| future::ready(f(ctx)).boxed()))
    }

    pub(crate) fn subscribe<'a>(
        &'a self,
        ctx: ResolverContext<'a>,
    ) -> BoxFuture<'a, FieldResult<ValueStream>> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscriber(..)")
    }
}

type DynTypeResolveFn = dyn Fn(&Value, &SchemaType) -> Option<ArcStr> + Send + Sync;

/// An abstract type's `resolve_type` function: picks the concrete object
/// type an event value belongs to.
#[derive(Clone)]
pub struct TypeResolver(Arc<DynTypeResolveFn>);

impl TypeResolver {
    /// Wraps a type resolution function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &SchemaType) -> Option<ArcStr> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn resolve_type(&self, value: &Value, schema: &SchemaType) -> Option<ArcStr> {
        (self.0)(value, schema)
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeResolver(..)")
    }
}

type DynIsTypeOfFn = dyn Fn(&Value) -> bool + Send + Sync;

/// An object type's `is_type_of` predicate, used as a fallback when an
/// abstract type has no explicit [`TypeResolver`].
#[derive(Clone)]
pub struct IsTypeOf(Arc<DynIsTypeOfFn>);

impl IsTypeOf {
    /// Wraps a predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn is_type_of(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for IsTypeOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IsTypeOf(..)")
    }
}

/// The default field resolver: reads the property named like the field off
/// an object-shaped source value.
pub(crate) fn default_resolve(source: &Value, field_name: &str) -> FieldResult<Value> {
    match source {
        Value::Object(o) => Ok(o.get_field_value(field_name).cloned().unwrap_or(Value::Null)),
        Value::Null => Ok(Value::Null),
        _ => Err(FieldError::from(format!(
            "Cannot resolve field \"{field_name}\" on non-object value",
        ))),
    }
}
