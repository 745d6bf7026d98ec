//! Resolving a validated document to response values.

pub(crate) mod subscription;
mod strategy;
pub(crate) mod variables;

use std::{
    any::Any,
    collections::{HashMap, HashSet},
    fmt::{self, Display},
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use futures::{FutureExt as _, future::BoxFuture};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    GraphQLError,
    ast::{
        Definition, Directive, Document, Field as AstField, Fragment, Operation, OperationType,
        Selection,
    },
    instrumentation::{Instrumentation, NoopInstrumentation, Timing},
    parser::{SourcePosition, Spanning},
    resolver::{ResolveInfo, ResolverContext, default_resolve},
    schema::{
        introspection::{self, IntroResolved, IntroValue},
        meta::{EnumMeta, Field, MetaType, ScalarMeta},
        model::{SchemaType, TypeType},
    },
    value::{Object, Value},
};

pub use self::strategy::{ExecutionStrategies, ExecutionStrategy};
pub use self::subscription::ResponseStream;
pub(crate) use self::variables::coerce_variable_values;

/// One step in the path from the response root to a field: a response key
/// or a list index.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// A response key (field alias or name).
    Key(String),
    /// A list index.
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl serde::Serialize for PathSegment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Key(k) => serializer.serialize_str(k),
            Self::Index(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

/// Error type for errors that occur during field resolution.
///
/// Field errors carry a human-readable message and an optional `Value`
/// with additional information, surfaced under `"extensions"` in the
/// response. They convert from any [`Display`] type, so error chaining
/// with the `?` operator works out of the box in resolvers.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::Null,
        }
    }
}

impl FieldError {
    /// Constructs a new [`FieldError`] with additional data.
    ///
    /// If `extensions` is [`Value::Null`], no extra data is included in
    /// the response.
    #[must_use]
    pub fn new<T: Display>(e: T, extensions: Value) -> Self {
        Self {
            message: e.to_string(),
            extensions,
        }
    }

    /// The `"message"` of this error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `"extensions"` of this error, [`Value::Null`] if absent.
    #[must_use]
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }
}

/// The result of resolving the value of a field.
pub type FieldResult<T> = Result<T, FieldError>;

/// The result of resolving an unspecified field.
pub type ExecutionResult = Result<Value, FieldError>;

/// Coerced variable values, as seen by resolvers.
pub type VariableValues = HashMap<String, Value>;

/// Error that occurred during execution of a field, located in the query
/// and positioned in the response.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(location: SourcePosition, path: Vec<PathSegment>, error: FieldError) -> Self {
        Self {
            location,
            path,
            error,
        }
    }

    /// Constructs a new request-level error, located at the origin.
    pub fn at_origin(error: FieldError) -> Self {
        Self {
            location: SourcePosition::new_origin(),
            path: Vec::new(),
            error,
        }
    }

    /// The underlying field error.
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source location in the query of the field that failed.
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The path of response keys and list indices leading to the field
    /// that produced this error.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

/// A request-scoped cancellation flag.
///
/// Once cancelled, the executor stops scheduling new resolvers, keeps the
/// best-effort partial data, and appends one trailing cancellation error.
/// Subscription streams end after cancellation and drop their source.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-request execution knobs.
#[derive(Clone, Default)]
pub struct ExecutionOptions {
    /// Field-execution strategies per operation kind.
    pub strategies: ExecutionStrategies,
    /// Cancellation token for this request.
    pub token: CancellationToken,
    /// Instrumentation callbacks; a no-op when absent.
    pub instrumentation: Option<Arc<dyn Instrumentation>>,
}

/// Selects the operation a request refers to.
///
/// With an `operation_name`, the matching operation definition; without
/// one, the document must contain exactly one operation.
pub fn get_operation<'b, 'd>(
    document: &'b Document<'d>,
    operation_name: Option<&str>,
) -> Result<&'b Spanning<Operation<'d>>, GraphQLError> {
    let mut operation = None;
    for def in document {
        if let Definition::Operation(op) = def {
            if operation_name.is_none() && operation.is_some() {
                return Err(GraphQLError::MultipleOperationsProvided);
            }

            let matches =
                operation_name.is_none() || op.item.name.map(|s| s.item) == operation_name;

            if matches {
                operation = Some(op);
            }
        }
    }

    operation.ok_or(match operation_name {
        Some(_) => GraphQLError::UnknownOperationName,
        None => GraphQLError::NoOperationProvided,
    })
}

/// Marker for a `null` that must propagate to the nearest nullable
/// ancestor.
pub(crate) struct Nullified;

pub(crate) type CompletionResult = Result<Value, Nullified>;

/// The source a selection set executes against: a host value, or an
/// introspection-domain value.
#[derive(Clone, Copy)]
enum SourceRef<'e, 'a> {
    Host(&'e Value),
    Intro(&'e IntroValue<'a>),
}

/// One field's resolved output, prior to completion.
enum Completed<'a> {
    Value(Value),
    Intro(IntroValue<'a>),
    IntroMany(Vec<IntroValue<'a>>),
}

impl<'a> From<IntroResolved<'a>> for Completed<'a> {
    fn from(r: IntroResolved<'a>) -> Self {
        match r {
            IntroResolved::Null => Self::Value(Value::Null),
            IntroResolved::Value(v) => Self::Value(v),
            IntroResolved::One(iv) => Self::Intro(iv),
            IntroResolved::Many(ivs) => Self::IntroMany(ivs),
        }
    }
}

/// Per-request record driving one execution: the schema, the chosen
/// operation and the document's fragments, coerced variables, the host's
/// root/context values, strategies, and the accumulated errors.
///
/// Constructed at execute start, dropped on return, never shared across
/// requests.
pub(crate) struct ExecutionContext<'a> {
    pub(crate) schema: &'a SchemaType,
    pub(crate) operation: Spanning<Operation<'a>>,
    pub(crate) fragments: Vec<Fragment<'a>>,
    pub(crate) variable_values: VariableValues,
    pub(crate) context_value: &'a (dyn Any + Send + Sync),
    pub(crate) strategies: ExecutionStrategies,
    pub(crate) token: CancellationToken,
    pub(crate) instrumentation: Arc<dyn Instrumentation>,
    errors: RwLock<Vec<ExecutionError>>,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(
        schema: &'a SchemaType,
        document: &Document<'a>,
        operation: &Spanning<Operation<'a>>,
        variable_values: VariableValues,
        context_value: &'a (dyn Any + Send + Sync),
        options: &ExecutionOptions,
    ) -> Self {
        let fragments = document
            .iter()
            .filter_map(|def| match def {
                Definition::Fragment(f) => Some(f.item.clone()),
                _ => None,
            })
            .collect();

        Self {
            schema,
            operation: operation.clone(),
            fragments,
            variable_values,
            context_value,
            strategies: options.strategies,
            token: options.token.clone(),
            instrumentation: options
                .instrumentation
                .clone()
                .unwrap_or_else(|| Arc::new(NoopInstrumentation)),
            errors: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn fragment(&self, name: &str) -> Option<&Fragment<'a>> {
        self.fragments.iter().find(|f| f.name.item == name)
    }

    fn push_error(&self, location: SourcePosition, path: Vec<PathSegment>, error: FieldError) {
        trace!(message = error.message(), "field error recorded");
        self.errors
            .write()
            .expect("error sink lock is never poisoned")
            .push(ExecutionError {
                location,
                path,
                error,
            });
    }

    /// Drains the accumulated errors: completion order, stably re-ordered
    /// by path so concurrent scheduling cannot affect the response.
    pub(crate) fn finish_errors(&self) -> Vec<ExecutionError> {
        let mut errors = std::mem::take(
            &mut *self
                .errors
                .write()
                .expect("error sink lock is never poisoned"),
        );
        errors.sort_by(|a, b| a.path.cmp(&b.path));

        if self.token.is_cancelled() {
            errors.push(ExecutionError::at_origin(FieldError::from(
                "Execution was cancelled",
            )));
        }

        errors
    }

    fn root_strategy(&self) -> ExecutionStrategy {
        match self.operation.item.operation_type {
            OperationType::Query => self.strategies.query,
            // Mutation root selections are strictly serial in document
            // order, whatever the configured strategy says.
            OperationType::Mutation => ExecutionStrategy::Serial,
            OperationType::Subscription => self.strategies.subscription,
        }
    }

    fn nested_strategy(&self) -> ExecutionStrategy {
        match self.operation.item.operation_type {
            OperationType::Query => self.strategies.query,
            OperationType::Mutation => self.strategies.mutation,
            OperationType::Subscription => self.strategies.subscription,
        }
    }

    /// Executes the operation's root selection set against `root_value`,
    /// returning the `data` value. Errors accumulate on the context.
    pub(crate) async fn execute_operation(&self, root_value: &Value) -> Value {
        let root_type = match self.operation.item.operation_type {
            OperationType::Query => Some(self.schema.concrete_query_type()),
            OperationType::Mutation => self.schema.concrete_mutation_type(),
            OperationType::Subscription => self.schema.concrete_subscription_type(),
        };
        let Some(root_type) = root_type else {
            self.push_error(
                self.operation.span.start,
                Vec::new(),
                FieldError::from(format!(
                    "Schema is not configured for {}s.",
                    self.operation.item.operation_type,
                )),
            );
            return Value::Null;
        };

        debug!(
            operation = %self.operation.item.operation_type,
            name = self.operation.item.name.map(|n| n.item),
            "executing operation"
        );

        let result = self
            .execute_selection_set(
                self.root_strategy(),
                root_type,
                SourceRef::Host(root_value),
                vec![&self.operation.item.selection_set],
                Vec::new(),
                root_value,
            )
            .await;

        match result {
            Ok(v) => v,
            Err(Nullified) => Value::Null,
        }
    }

    // ------------------------------------------------------------------
    // Field collection
    // ------------------------------------------------------------------

    fn should_include(&self, directives: &Option<Vec<Spanning<Directive<'a>>>>) -> bool {
        for directive in directives.iter().flatten() {
            let if_arg = directive
                .item
                .arguments
                .as_ref()
                .and_then(|args| args.item.get("if"));
            let flag = variables::resolve_directive_bool(if_arg, &self.variable_values);

            match directive.item.name.item {
                "skip" if flag == Some(true) => return false,
                "include" if flag == Some(false) => return false,
                _ => {}
            }
        }
        true
    }

    fn does_fragment_type_apply(
        &self,
        object_type: &MetaType,
        type_condition: Option<&str>,
    ) -> bool {
        let Some(condition) = type_condition else {
            return true;
        };
        if *object_type.name() == condition {
            return true;
        }
        match self.schema.concrete_type_by_name(condition) {
            Some(conditional_type) if conditional_type.is_abstract() => {
                self.schema.is_possible_type(conditional_type, object_type)
            }
            _ => false,
        }
    }

    /// Produces the ordered mapping from response key to colocated field
    /// nodes, honoring `@skip` / `@include` and type conditions. Fragment
    /// cycles are impossible in validated documents, but a visited-set
    /// guards regardless.
    fn collect_fields<'e>(
        &'e self,
        object_type: &MetaType,
        selection_set: &'e [Selection<'a>],
        visited: &mut HashSet<&'e str>,
        grouped: &mut IndexMap<&'e str, Vec<&'e Spanning<AstField<'a>>>>,
    ) {
        for selection in selection_set {
            match selection {
                Selection::Field(f) => {
                    if !self.should_include(&f.item.directives) {
                        continue;
                    }
                    grouped.entry(f.item.response_key()).or_default().push(f);
                }
                Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.item.directives) {
                        continue;
                    }
                    if !visited.insert(spread.item.name.item) {
                        continue;
                    }
                    if let Some(fragment) = self.fragment(spread.item.name.item) {
                        if self.does_fragment_type_apply(
                            object_type,
                            Some(fragment.type_condition.item),
                        ) {
                            self.collect_fields(
                                object_type,
                                &fragment.selection_set,
                                visited,
                                grouped,
                            );
                        }
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.item.directives) {
                        continue;
                    }
                    if self.does_fragment_type_apply(
                        object_type,
                        inline.item.type_condition.map(|c| c.item),
                    ) {
                        self.collect_fields(
                            object_type,
                            &inline.item.selection_set,
                            visited,
                            grouped,
                        );
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection-set execution
    // ------------------------------------------------------------------

    fn execute_selection_set<'e>(
        &'e self,
        strategy: ExecutionStrategy,
        object_type: &'e MetaType,
        source: SourceRef<'e, 'a>,
        selection_sets: Vec<&'e [Selection<'a>]>,
        path: Vec<PathSegment>,
        root_value: &'e Value,
    ) -> BoxFuture<'e, CompletionResult> {
        async move {
            let mut visited = HashSet::new();
            let mut grouped = IndexMap::new();
            for selection_set in &selection_sets {
                self.collect_fields(object_type, selection_set, &mut visited, &mut grouped);
            }

            let mut field_futures = Vec::with_capacity(grouped.len());
            for (response_key, fields) in grouped {
                let mut field_path = path.clone();
                field_path.push(PathSegment::Key(response_key.to_owned()));
                field_futures.push(self.resolve_field_entry(
                    strategy,
                    object_type,
                    source,
                    response_key,
                    fields,
                    field_path,
                    root_value,
                ));
            }

            let results = strategy.run_fields(field_futures).await;

            let mut object = Object::with_capacity(results.len());
            for (response_key, is_non_null, result) in results {
                match result {
                    Ok(v) => {
                        object.add_field(response_key, v);
                    }
                    Err(Nullified) if is_non_null => return Err(Nullified),
                    Err(Nullified) => {
                        object.add_field(response_key, Value::Null);
                    }
                }
            }

            Ok(Value::Object(object))
        }
        .boxed()
    }

    // ------------------------------------------------------------------
    // Field execution
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn resolve_field_entry<'e>(
        &'e self,
        strategy: ExecutionStrategy,
        object_type: &'e MetaType,
        source: SourceRef<'e, 'a>,
        response_key: &'e str,
        fields: Vec<&'e Spanning<AstField<'a>>>,
        path: Vec<PathSegment>,
        root_value: &'e Value,
    ) -> BoxFuture<'e, (String, bool, CompletionResult)> {
        async move {
            let field_ast = fields[0];
            let field_name = field_ast.item.name.item;
            let location = field_ast.item.name.span.start;

            // `__typename` resolves to the runtime type name anywhere.
            if field_name == "__typename" {
                return (
                    response_key.to_owned(),
                    true,
                    Ok(Value::scalar(object_type.name().as_str())),
                );
            }

            let Some(field_meta) = self.schema.lookup_field(object_type, field_name) else {
                self.push_error(
                    location,
                    path,
                    FieldError::from(format!(
                        "Cannot query field \"{field_name}\" on type \"{}\".",
                        object_type.name(),
                    )),
                );
                return (response_key.to_owned(), false, Err(Nullified));
            };

            let is_non_null = field_meta.field_type.is_non_null();
            let done = |result: CompletionResult| (response_key.to_owned(), is_non_null, result);

            // Cancellation stops scheduling new resolvers; already
            // resolved data stays.
            if self.token.is_cancelled() {
                return done(if is_non_null { Err(Nullified) } else { Ok(Value::Null) });
            }

            let args = match variables::coerce_argument_values(
                self.schema,
                field_meta,
                field_ast.item.arguments.as_ref(),
                &self.variable_values,
            ) {
                Ok(args) => args,
                Err(e) => {
                    self.push_error(location, path, e);
                    return done(Err(Nullified));
                }
            };

            let field_type = self.schema.make_type(&field_meta.field_type);

            // Meta fields of the root query type enter the introspection
            // domain.
            let is_query_root =
                *object_type.name() == *self.schema.concrete_query_type().name();
            if matches!(source, SourceRef::Host(_)) && is_query_root {
                match field_name {
                    "__schema" => {
                        let node = Completed::Intro(IntroValue::Schema);
                        let result = self
                            .complete_value(
                                strategy, &field_type, object_type, field_meta, node, fields,
                                location, path, root_value,
                            )
                            .await;
                        return done(result);
                    }
                    "__type" => {
                        let name = args
                            .get_field_value("name")
                            .and_then(Value::as_string_value)
                            .unwrap_or_default()
                            .to_owned();
                        let node = match self.schema.type_by_name(&name) {
                            Some(t) => Completed::Intro(IntroValue::Type(t)),
                            None => Completed::Value(Value::Null),
                        };
                        let result = self
                            .complete_value(
                                strategy, &field_type, object_type, field_meta, node, fields,
                                location, path, root_value,
                            )
                            .await;
                        return done(result);
                    }
                    _ => {}
                }
            }

            let node = match source {
                SourceRef::Intro(intro_parent) => {
                    match introspection::resolve_field(
                        self.schema,
                        intro_parent,
                        field_name,
                        &args,
                    ) {
                        Ok(resolved) => Completed::from(resolved),
                        Err(e) => {
                            self.push_error(location, path, e);
                            return done(Err(Nullified));
                        }
                    }
                }
                SourceRef::Host(source_value) => {
                    let info = ResolveInfo {
                        field_name,
                        parent_type_name: object_type.name().as_str(),
                        return_type: &field_meta.field_type,
                        path: path.clone(),
                        schema: self.schema,
                        fragments: &self.fragments,
                        operation: &self.operation,
                        root_value,
                        variable_values: &self.variable_values,
                    };

                    self.instrumentation
                        .before_field_resolution(info.parent_type_name, field_name);
                    let started = Instant::now();

                    let result = match &field_meta.resolver {
                        Some(resolver) => {
                            resolver
                                .resolve(ResolverContext {
                                    source: source_value,
                                    args: &args,
                                    context: self.context_value,
                                    info,
                                })
                                .await
                        }
                        None => default_resolve(source_value, field_name),
                    };

                    self.instrumentation.after_field_resolution(
                        object_type.name().as_str(),
                        field_name,
                        result.is_ok(),
                        &Timing::since(started),
                    );

                    match result {
                        Ok(v) => Completed::Value(v),
                        Err(e) => {
                            self.push_error(location, path, e);
                            return done(Err(Nullified));
                        }
                    }
                }
            };

            let result = self
                .complete_value(
                    strategy, &field_type, object_type, field_meta, node, fields, location,
                    path, root_value,
                )
                .await;
            done(result)
        }
        .boxed()
    }

    // ------------------------------------------------------------------
    // Value completion
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn complete_value<'e>(
        &'e self,
        strategy: ExecutionStrategy,
        field_type: &'e TypeType<'a>,
        parent_type: &'e MetaType,
        field_meta: &'e Field,
        node: Completed<'a>,
        fields: Vec<&'e Spanning<AstField<'a>>>,
        location: SourcePosition,
        path: Vec<PathSegment>,
        root_value: &'e Value,
    ) -> BoxFuture<'e, CompletionResult> {
        async move {
            match field_type {
                TypeType::NonNull(inner) => {
                    let completed = self
                        .complete_value(
                            strategy, inner, parent_type, field_meta, node, fields, location,
                            path.clone(), root_value,
                        )
                        .await?;
                    if completed.is_null() {
                        self.push_error(
                            location,
                            path,
                            FieldError::from(format!(
                                "Cannot return null for non-nullable field {}.{}.",
                                parent_type.name(),
                                field_meta.name,
                            )),
                        );
                        Err(Nullified)
                    } else {
                        Ok(completed)
                    }
                }

                TypeType::List(inner) => {
                    let element_non_null = inner.is_non_null();

                    let elements: Vec<Completed<'a>> = match node {
                        Completed::Value(Value::Null) => return Ok(Value::Null),
                        Completed::Value(Value::List(items)) => {
                            items.into_iter().map(Completed::Value).collect()
                        }
                        Completed::IntroMany(items) => {
                            items.into_iter().map(Completed::Intro).collect()
                        }
                        Completed::Value(..) | Completed::Intro(..) => {
                            self.push_error(
                                location,
                                path,
                                FieldError::from(format!(
                                    "Expected Iterable, but did not find one for field \"{}.{}\".",
                                    parent_type.name(),
                                    field_meta.name,
                                )),
                            );
                            return Err(Nullified);
                        }
                    };

                    let mut element_futures = Vec::with_capacity(elements.len());
                    for (index, element) in elements.into_iter().enumerate() {
                        let mut element_path = path.clone();
                        element_path.push(PathSegment::Index(index));
                        element_futures.push(self.complete_value(
                            strategy,
                            inner,
                            parent_type,
                            field_meta,
                            element,
                            fields.clone(),
                            location,
                            element_path,
                            root_value,
                        ));
                    }

                    let results = strategy.run_fields(element_futures).await;

                    let mut completed = Vec::with_capacity(results.len());
                    for result in results {
                        match result {
                            Ok(v) => completed.push(v),
                            // An error in one element nullifies at most
                            // that element, unless its type forbids null.
                            Err(Nullified) if element_non_null => return Err(Nullified),
                            Err(Nullified) => completed.push(Value::Null),
                        }
                    }
                    Ok(Value::List(completed))
                }

                TypeType::Concrete(meta) => {
                    if matches!(&node, Completed::Value(Value::Null)) {
                        return Ok(Value::Null);
                    }
                    let value = node;

                    match meta {
                        MetaType::Scalar(ScalarMeta { serialize_fn, .. }) => {
                            let Completed::Value(v) = value else {
                                return self.complete_internal_mismatch(location, path);
                            };
                            match serialize_fn(&v) {
                                Ok(serialized) => Ok(serialized),
                                Err(e) => {
                                    self.push_error(location, path, e);
                                    Err(Nullified)
                                }
                            }
                        }

                        MetaType::Enum(EnumMeta { name, values, .. }) => {
                            let Completed::Value(v) = value else {
                                return self.complete_internal_mismatch(location, path);
                            };
                            match v.as_string_value() {
                                Some(s) if values.iter().any(|ev| ev.name == s) => {
                                    Ok(Value::scalar(s))
                                }
                                _ => {
                                    self.push_error(
                                        location,
                                        path,
                                        FieldError::from(format!(
                                            "Enum \"{name}\" cannot represent value: {v}",
                                        )),
                                    );
                                    Err(Nullified)
                                }
                            }
                        }

                        MetaType::Object(..) => {
                            let selection_sets: Vec<&'e [Selection<'a>]> = fields
                                .iter()
                                .filter_map(|f| f.item.selection_set.as_deref())
                                .collect();

                            match value {
                                Completed::Value(v) => {
                                    self.execute_selection_set(
                                        self.nested_strategy(),
                                        meta,
                                        SourceRef::Host(&v),
                                        selection_sets,
                                        path,
                                        root_value,
                                    )
                                    .await
                                }
                                Completed::Intro(iv) => {
                                    self.execute_selection_set(
                                        self.nested_strategy(),
                                        meta,
                                        SourceRef::Intro(&iv),
                                        selection_sets,
                                        path,
                                        root_value,
                                    )
                                    .await
                                }
                                Completed::IntroMany(..) => {
                                    self.complete_internal_mismatch(location, path)
                                }
                            }
                        }

                        MetaType::Interface(..) | MetaType::Union(..) => {
                            let Completed::Value(v) = value else {
                                return self.complete_internal_mismatch(location, path);
                            };

                            let runtime_type = match self.resolve_runtime_type(meta, &v) {
                                Ok(t) => t,
                                Err(e) => {
                                    self.push_error(location, path, e);
                                    return Err(Nullified);
                                }
                            };

                            let selection_sets: Vec<&'e [Selection<'a>]> = fields
                                .iter()
                                .filter_map(|f| f.item.selection_set.as_deref())
                                .collect();

                            self.execute_selection_set(
                                self.nested_strategy(),
                                runtime_type,
                                SourceRef::Host(&v),
                                selection_sets,
                                path,
                                root_value,
                            )
                            .await
                        }

                        MetaType::InputObject(..) => {
                            self.complete_internal_mismatch(location, path)
                        }
                    }
                }
            }
        }
        .boxed()
    }

    fn complete_internal_mismatch(
        &self,
        location: SourcePosition,
        path: Vec<PathSegment>,
    ) -> CompletionResult {
        self.push_error(
            location,
            path,
            FieldError::from("Internal error: unexpected value shape during completion"),
        );
        Err(Nullified)
    }

    /// Picks the concrete object type an abstract-typed value belongs to:
    /// the type's `resolve_type` function, the value's `__typename`
    /// property, or an `is_type_of` scan over the possible types.
    fn resolve_runtime_type(
        &self,
        abstract_type: &MetaType,
        value: &Value,
    ) -> Result<&MetaType, FieldError> {
        let resolve_type = match abstract_type {
            MetaType::Interface(i) => i.resolve_type.as_ref(),
            MetaType::Union(u) => u.resolve_type.as_ref(),
            _ => None,
        };

        let type_name = resolve_type
            .and_then(|r| r.resolve_type(value, self.schema))
            .map(|n| n.to_string())
            .or_else(|| {
                value
                    .as_object_value()
                    .and_then(|o| o.get_field_value("__typename"))
                    .and_then(Value::as_string_value)
                    .map(str::to_owned)
            })
            .or_else(|| {
                self.schema
                    .possible_types(abstract_type)
                    .into_iter()
                    .find(|t| match t {
                        MetaType::Object(o) => o
                            .is_type_of
                            .as_ref()
                            .is_some_and(|p| p.is_type_of(value)),
                        _ => false,
                    })
                    .map(|t| t.name().to_string())
            });

        let Some(type_name) = type_name else {
            return Err(FieldError::from(format!(
                "Abstract type \"{}\" must resolve to an Object type at runtime, received: {value}",
                abstract_type.name(),
            )));
        };

        let runtime_type = self
            .schema
            .concrete_type_by_name(&type_name)
            .ok_or_else(|| {
                FieldError::from(format!(
                    "Abstract type \"{}\" was resolved to a type \"{type_name}\" that does not exist inside the schema.",
                    abstract_type.name(),
                ))
            })?;

        if !self.schema.is_possible_type(abstract_type, runtime_type) {
            return Err(FieldError::from(format!(
                "Runtime Object type \"{type_name}\" is not a possible type for \"{}\".",
                abstract_type.name(),
            )));
        }

        Ok(runtime_type)
    }
}
