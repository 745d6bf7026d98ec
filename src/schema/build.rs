//! Construction of a [`Schema`] from an SDL document.

use std::{collections::HashSet, sync::Arc};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    GraphQLError,
    ast::{
        Definition, Directive as AstDirective, DirectiveLocation, Document, InputValue,
        OperationType, Type, TypeDefinition, TypeSystemDefinition,
    },
    executor::FieldError,
    parser::Spanning,
    resolver::{IsTypeOf, Resolver, Subscriber, TypeResolver},
    schema::{
        introspection,
        meta::{
            Argument, DeprecationStatus, EnumMeta, EnumValue, Field, InputObjectMeta,
            InterfaceMeta, MetaType, ObjectMeta, ParseScalarFn, ScalarMeta, SerializeScalarFn,
            UnionMeta,
        },
        model::{DirectiveType, Schema, SchemaType},
    },
    value::Value,
};

/// Incrementally builds a [`Schema`] out of an SDL document: resolvers are
/// attached by type and field name before [`SchemaBuilder::finish`] seals
/// and validates the schema.
pub struct SchemaBuilder {
    description: Option<ArcStr>,
    types: IndexMap<ArcStr, MetaType>,
    directives: IndexMap<ArcStr, DirectiveType>,
    query_type_name: Option<ArcStr>,
    mutation_type_name: Option<ArcStr>,
    subscription_type_name: Option<ArcStr>,
    has_schema_definition: bool,
    errors: Vec<String>,
}

impl SchemaBuilder {
    /// Starts a builder from a parsed SDL document.
    pub fn from_document(document: &Document<'_>) -> Result<Self, GraphQLError> {
        let mut builder = Self {
            description: None,
            types: IndexMap::new(),
            directives: IndexMap::new(),
            query_type_name: None,
            mutation_type_name: None,
            subscription_type_name: None,
            has_schema_definition: false,
            errors: Vec::new(),
        };

        for meta in builtin_scalars() {
            builder.types.insert(meta.name().clone(), meta);
        }

        builder.ingest(document)?;

        Ok(builder)
    }

    /// Starts a builder from an existing schema, for extension.
    pub(crate) fn from_schema(schema: &SchemaType) -> Self {
        Self {
            description: schema.description.clone(),
            types: schema.types.clone(),
            directives: schema.directives.clone(),
            query_type_name: Some(schema.query_type_name.clone()),
            mutation_type_name: schema.mutation_type_name.clone(),
            subscription_type_name: schema.subscription_type_name.clone(),
            has_schema_definition: true,
            errors: Vec::new(),
        }
    }

    /// Collects the definitions and extensions of `document` into this
    /// builder.
    pub(crate) fn ingest(&mut self, document: &Document<'_>) -> Result<(), GraphQLError> {
        let mut extensions: Vec<&Spanning<TypeDefinition<'_>>> = Vec::new();
        let mut schema_extensions = Vec::new();

        for def in document {
            match def {
                Definition::TypeSystem(TypeSystemDefinition::Schema(schema_def)) => {
                    if self.has_schema_definition {
                        return Err(schema_error("Must provide only one schema definition."));
                    }
                    self.has_schema_definition = true;
                    self.description =
                        schema_def.item.description.as_ref().map(|d| d.item.as_str().into());
                    for op in &schema_def.item.operation_types {
                        let name = ArcStr::from(op.item.named_type.item);
                        match op.item.operation {
                            OperationType::Query => self.query_type_name = Some(name),
                            OperationType::Mutation => self.mutation_type_name = Some(name),
                            OperationType::Subscription => {
                                self.subscription_type_name = Some(name)
                            }
                        }
                    }
                }
                Definition::TypeSystem(TypeSystemDefinition::Type(type_def)) => {
                    let meta = build_type(&type_def.item);
                    let name = meta.name().clone();
                    if self.types.insert(name.clone(), meta).is_some() {
                        return Err(schema_error(&format!(
                            "Schema must contain uniquely named types but contains multiple types named \"{name}\".",
                        )));
                    }
                }
                Definition::TypeSystem(TypeSystemDefinition::Directive(dir_def)) => {
                    let directive = build_directive(&dir_def.item);
                    let name = directive.name.clone();
                    if self.directives.insert(name.clone(), directive).is_some() {
                        return Err(schema_error(&format!(
                            "Schema must contain uniquely named directives but contains multiple directives named \"@{name}\".",
                        )));
                    }
                }
                Definition::TypeSystem(TypeSystemDefinition::TypeExtension(ext)) => {
                    extensions.push(ext);
                }
                Definition::TypeSystem(TypeSystemDefinition::SchemaExtension(ext)) => {
                    schema_extensions.push(ext);
                }
                Definition::Operation(..) | Definition::Fragment(..) => {
                    return Err(schema_error(
                        "A schema document may only contain schema definition language.",
                    ));
                }
            }
        }

        for ext in schema_extensions {
            for op in &ext.item.operation_types {
                let name = ArcStr::from(op.item.named_type.item);
                match op.item.operation {
                    OperationType::Query => self.query_type_name = Some(name),
                    OperationType::Mutation => self.mutation_type_name = Some(name),
                    OperationType::Subscription => self.subscription_type_name = Some(name),
                }
            }
        }

        for ext in extensions {
            apply_type_extension(&mut self.types, &ext.item)
                .map_err(|e| schema_error(&e))?;
        }

        Ok(())
    }

    fn field_mut(&mut self, type_name: &str, field_name: &str) -> Option<&mut Field> {
        match self.types.get_mut(type_name) {
            Some(MetaType::Object(ObjectMeta { fields, .. }))
            | Some(MetaType::Interface(InterfaceMeta { fields, .. })) => {
                fields.iter_mut().find(|f| f.name == field_name)
            }
            _ => None,
        }
    }

    /// Attaches a `resolve` function to the named field.
    #[must_use]
    pub fn resolver(mut self, type_name: &str, field_name: &str, resolver: Resolver) -> Self {
        match self.field_mut(type_name, field_name) {
            Some(field) => field.resolver = Some(resolver),
            None => self.errors.push(format!(
                "Cannot attach a resolver to unknown field \"{type_name}.{field_name}\".",
            )),
        }
        self
    }

    /// Attaches a `subscribe` function to the named subscription field.
    #[must_use]
    pub fn subscriber(mut self, type_name: &str, field_name: &str, subscriber: Subscriber) -> Self {
        match self.field_mut(type_name, field_name) {
            Some(field) => field.subscriber = Some(subscriber),
            None => self.errors.push(format!(
                "Cannot attach a subscriber to unknown field \"{type_name}.{field_name}\".",
            )),
        }
        self
    }

    /// Attaches a `resolve_type` function to the named abstract type.
    #[must_use]
    pub fn type_resolver(mut self, type_name: &str, resolver: TypeResolver) -> Self {
        match self.types.get_mut(type_name) {
            Some(MetaType::Interface(InterfaceMeta { resolve_type, .. }))
            | Some(MetaType::Union(UnionMeta { resolve_type, .. })) => {
                *resolve_type = Some(resolver);
            }
            _ => self.errors.push(format!(
                "Cannot attach a type resolver to unknown abstract type \"{type_name}\".",
            )),
        }
        self
    }

    /// Attaches an `is_type_of` predicate to the named object type.
    #[must_use]
    pub fn is_type_of(mut self, type_name: &str, predicate: IsTypeOf) -> Self {
        match self.types.get_mut(type_name) {
            Some(MetaType::Object(ObjectMeta { is_type_of, .. })) => {
                *is_type_of = Some(predicate);
            }
            _ => self.errors.push(format!(
                "Cannot attach an `is_type_of` predicate to unknown object type \"{type_name}\".",
            )),
        }
        self
    }

    /// Overrides the coercion behavior of the named custom scalar.
    #[must_use]
    pub fn scalar(
        mut self,
        type_name: &str,
        parse_fn: ParseScalarFn,
        serialize_fn: SerializeScalarFn,
    ) -> Self {
        match self.types.get_mut(type_name) {
            Some(MetaType::Scalar(meta)) => {
                meta.parse_fn = parse_fn;
                meta.serialize_fn = serialize_fn;
            }
            _ => self.errors.push(format!(
                "Cannot customize unknown scalar type \"{type_name}\".",
            )),
        }
        self
    }

    /// Seals the schema, validating the type-system invariants.
    pub fn finish(mut self) -> Result<Schema, GraphQLError> {
        if let Some(first) = self.errors.first() {
            return Err(schema_error(first));
        }

        // Default root operation types apply only without an explicit
        // `schema` definition.
        if !self.has_schema_definition {
            if self.types.contains_key("Query") {
                self.query_type_name = Some(arcstr::literal!("Query"));
            }
            if self.types.contains_key("Mutation") {
                self.mutation_type_name = Some(arcstr::literal!("Mutation"));
            }
            if self.types.contains_key("Subscription") {
                self.subscription_type_name = Some(arcstr::literal!("Subscription"));
            }
        }

        let query_type_name = self
            .query_type_name
            .ok_or_else(|| schema_error("Query root type must be provided."))?;

        for directive in [
            DirectiveType::new_skip(),
            DirectiveType::new_include(),
            DirectiveType::new_deprecated(),
            DirectiveType::new_specified_by(),
        ] {
            self.directives
                .entry(directive.name.clone())
                .or_insert(directive);
        }

        for meta in introspection::meta_types() {
            self.types.insert(meta.name().clone(), meta);
        }
        let (schema_field, type_field, typename_field) = introspection::meta_fields();

        let schema = SchemaType {
            description: self.description,
            types: self.types,
            query_type_name,
            mutation_type_name: self.mutation_type_name,
            subscription_type_name: self.subscription_type_name,
            directives: self.directives,
            schema_field,
            type_field,
            typename_field,
        };

        validate_schema(&schema).map_err(|e| schema_error(&e))?;

        Ok(Schema { schema })
    }
}

fn schema_error(msg: &str) -> GraphQLError {
    GraphQLError::SchemaError(msg.into())
}

// ----------------------------------------------------------------------------
// AST → meta conversion
// ----------------------------------------------------------------------------

fn description_of(d: &Option<Spanning<String>>) -> Option<ArcStr> {
    d.as_ref().map(|s| s.item.as_str().into())
}

fn deprecation_of(directives: &Option<Vec<Spanning<AstDirective<'_>>>>) -> DeprecationStatus {
    for d in directives.iter().flatten() {
        if d.item.name.item == "deprecated" {
            let reason = d
                .item
                .arguments
                .as_ref()
                .and_then(|args| args.item.get("reason"))
                .and_then(|v| v.item.as_string_value().map(ArcStr::from))
                .or(Some(arcstr::literal!("No longer supported")));
            return DeprecationStatus::Deprecated(reason);
        }
    }
    DeprecationStatus::Current
}

fn specified_by_of(directives: &Option<Vec<Spanning<AstDirective<'_>>>>) -> Option<ArcStr> {
    directives.iter().flatten().find_map(|d| {
        if d.item.name.item == "specifiedBy" {
            d.item
                .arguments
                .as_ref()
                .and_then(|args| args.item.get("url"))
                .and_then(|v| v.item.as_string_value().map(ArcStr::from))
        } else {
            None
        }
    })
}

fn build_argument(def: &crate::ast::InputValueDefinition<'_>) -> Argument {
    Argument {
        name: def.name.item.into(),
        description: description_of(&def.description),
        arg_type: def.value_type.item.to_arc(),
        default_value: def.default_value.as_ref().map(|v| v.item.clone()),
    }
}

fn build_field(def: &crate::ast::FieldDefinition<'_>) -> Field {
    Field {
        name: def.name.item.into(),
        description: description_of(&def.description),
        arguments: def.arguments.iter().map(|a| build_argument(&a.item)).collect(),
        field_type: def.field_type.item.to_arc(),
        deprecation_status: deprecation_of(&def.directives),
        resolver: None,
        subscriber: None,
    }
}

fn build_type(def: &TypeDefinition<'_>) -> MetaType {
    match def {
        TypeDefinition::Scalar(d) => MetaType::Scalar(ScalarMeta {
            name: d.name.item.into(),
            description: description_of(&d.description),
            specified_by_url: specified_by_of(&d.directives),
            parse_fn: identity_parse_fn(),
            serialize_fn: identity_serialize_fn(),
        }),
        TypeDefinition::Object(d) => MetaType::Object(ObjectMeta {
            name: d.name.item.into(),
            description: description_of(&d.description),
            fields: d.fields.iter().map(|f| build_field(&f.item)).collect(),
            interface_names: d.interfaces.iter().map(|i| ArcStr::from(i.item)).collect(),
            is_type_of: None,
        }),
        TypeDefinition::Interface(d) => MetaType::Interface(InterfaceMeta {
            name: d.name.item.into(),
            description: description_of(&d.description),
            fields: d.fields.iter().map(|f| build_field(&f.item)).collect(),
            interface_names: d.interfaces.iter().map(|i| ArcStr::from(i.item)).collect(),
            resolve_type: None,
        }),
        TypeDefinition::Union(d) => MetaType::Union(UnionMeta {
            name: d.name.item.into(),
            description: description_of(&d.description),
            of_type_names: d.members.iter().map(|m| ArcStr::from(m.item)).collect(),
            resolve_type: None,
        }),
        TypeDefinition::Enum(d) => MetaType::Enum(EnumMeta {
            name: d.name.item.into(),
            description: description_of(&d.description),
            values: d
                .values
                .iter()
                .map(|v| EnumValue {
                    name: v.item.name.item.into(),
                    description: description_of(&v.item.description),
                    deprecation_status: deprecation_of(&v.item.directives),
                })
                .collect(),
        }),
        TypeDefinition::InputObject(d) => MetaType::InputObject(InputObjectMeta {
            name: d.name.item.into(),
            description: description_of(&d.description),
            input_fields: d.fields.iter().map(|f| build_argument(&f.item)).collect(),
        }),
    }
}

fn build_directive(def: &crate::ast::DirectiveDefinition<'_>) -> DirectiveType {
    DirectiveType {
        name: def.name.item.into(),
        description: description_of(&def.description),
        locations: def.locations.iter().map(|l| l.item).collect(),
        arguments: def.arguments.iter().map(|a| build_argument(&a.item)).collect(),
        is_repeatable: def.repeatable,
    }
}

/// Merges a type extension into the already collected `types`.
///
/// The extended type must exist and be of the same kind; new fields,
/// interfaces, members, and values are appended.
pub(crate) fn apply_type_extension(
    types: &mut IndexMap<ArcStr, MetaType>,
    ext: &TypeDefinition<'_>,
) -> Result<(), String> {
    let name = ext.name().item;
    let Some(existing) = types.get_mut(name) else {
        return Err(format!(
            "Cannot extend type \"{name}\" because it is not defined.",
        ));
    };

    match (existing, ext) {
        (MetaType::Scalar(meta), TypeDefinition::Scalar(d)) => {
            if let Some(url) = specified_by_of(&d.directives) {
                meta.specified_by_url = Some(url);
            }
            Ok(())
        }
        (MetaType::Object(meta), TypeDefinition::Object(d)) => {
            meta.fields.extend(d.fields.iter().map(|f| build_field(&f.item)));
            meta.interface_names
                .extend(d.interfaces.iter().map(|i| ArcStr::from(i.item)));
            Ok(())
        }
        (MetaType::Interface(meta), TypeDefinition::Interface(d)) => {
            meta.fields.extend(d.fields.iter().map(|f| build_field(&f.item)));
            meta.interface_names
                .extend(d.interfaces.iter().map(|i| ArcStr::from(i.item)));
            Ok(())
        }
        (MetaType::Union(meta), TypeDefinition::Union(d)) => {
            meta.of_type_names
                .extend(d.members.iter().map(|m| ArcStr::from(m.item)));
            Ok(())
        }
        (MetaType::Enum(meta), TypeDefinition::Enum(d)) => {
            meta.values.extend(d.values.iter().map(|v| EnumValue {
                name: v.item.name.item.into(),
                description: description_of(&v.item.description),
                deprecation_status: deprecation_of(&v.item.directives),
            }));
            Ok(())
        }
        (MetaType::InputObject(meta), TypeDefinition::InputObject(d)) => {
            meta.input_fields
                .extend(d.fields.iter().map(|f| build_argument(&f.item)));
            Ok(())
        }
        (existing, ext) => Err(format!(
            "Cannot extend non-{} type \"{}\".",
            ext.kind(),
            existing.name(),
        )),
    }
}

// ----------------------------------------------------------------------------
// Schema invariants
// ----------------------------------------------------------------------------

/// Validates the invariants of a constructed schema, naming the first
/// offender.
pub(crate) fn validate_schema(schema: &SchemaType) -> Result<(), String> {
    let query_root = schema
        .concrete_type_by_name(schema.query_type_name.as_str())
        .ok_or_else(|| format!("Unknown type \"{}\".", schema.query_type_name))?;
    if !matches!(query_root, MetaType::Object(..)) {
        return Err("Query root type must be Object type.".into());
    }

    for (role, name) in [
        ("Mutation", &schema.mutation_type_name),
        ("Subscription", &schema.subscription_type_name),
    ] {
        if let Some(name) = name {
            let root = schema
                .concrete_type_by_name(name.as_str())
                .ok_or_else(|| format!("Unknown type \"{name}\"."))?;
            if !matches!(root, MetaType::Object(..)) {
                return Err(format!("{role} root type must be Object type."));
            }
        }
    }

    for meta in schema.concrete_type_list() {
        validate_type(schema, meta)?;
    }

    for directive in schema.directive_list() {
        let mut seen = HashSet::new();
        for arg in &directive.arguments {
            if !seen.insert(arg.name.as_str()) {
                return Err(format!(
                    "Argument \"@{}({}:)\" can only be defined once.",
                    directive.name, arg.name,
                ));
            }
            require_input_type(schema, &arg.arg_type)?;
        }
    }

    check_input_cycles(schema)?;

    Ok(())
}

fn validate_type(schema: &SchemaType, meta: &MetaType) -> Result<(), String> {
    match meta {
        MetaType::Object(ObjectMeta {
            name,
            fields,
            interface_names,
            ..
        })
        | MetaType::Interface(InterfaceMeta {
            name,
            fields,
            interface_names,
            ..
        }) => {
            let mut seen = HashSet::new();
            for field in fields {
                if !field.is_builtin() && !seen.insert(field.name.as_str()) {
                    return Err(format!(
                        "Field \"{}.{}\" can only be defined once.",
                        name, field.name,
                    ));
                }
                require_output_type(schema, &field.field_type)?;

                let mut seen_args = HashSet::new();
                for arg in &field.arguments {
                    if !seen_args.insert(arg.name.as_str()) {
                        return Err(format!(
                            "Argument \"{}.{}({}:)\" can only be defined once.",
                            name, field.name, arg.name,
                        ));
                    }
                    require_input_type(schema, &arg.arg_type)?;
                }
            }

            for iface_name in interface_names {
                validate_interface_implementation(schema, name, fields, iface_name)?;
            }
            Ok(())
        }
        MetaType::Union(UnionMeta {
            name, of_type_names, ..
        }) => {
            let mut seen = HashSet::new();
            for member in of_type_names {
                if !seen.insert(member.as_str()) {
                    return Err(format!(
                        "Union type {name} can only include type {member} once.",
                    ));
                }
                match schema.concrete_type_by_name(member.as_str()) {
                    Some(MetaType::Object(..)) => {}
                    Some(..) => {
                        return Err(format!(
                            "Union type {name} can only include Object types, it cannot include {member}.",
                        ));
                    }
                    None => return Err(format!("Unknown type \"{member}\".")),
                }
            }
            Ok(())
        }
        MetaType::Enum(EnumMeta { name, values, .. }) => {
            let mut seen = HashSet::new();
            for value in values {
                if !seen.insert(value.name.as_str()) {
                    return Err(format!(
                        "Enum value \"{}.{}\" can only be defined once.",
                        name, value.name,
                    ));
                }
            }
            Ok(())
        }
        MetaType::InputObject(InputObjectMeta {
            name, input_fields, ..
        }) => {
            let mut seen = HashSet::new();
            for field in input_fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(format!(
                        "Field \"{}.{}\" can only be defined once.",
                        name, field.name,
                    ));
                }
                require_input_type(schema, &field.arg_type)?;
            }
            Ok(())
        }
        MetaType::Scalar(..) => Ok(()),
    }
}

fn validate_interface_implementation(
    schema: &SchemaType,
    impl_name: &ArcStr,
    impl_fields: &[Field],
    iface_name: &ArcStr,
) -> Result<(), String> {
    let iface = match schema.concrete_type_by_name(iface_name.as_str()) {
        Some(MetaType::Interface(iface)) => iface,
        Some(..) => {
            return Err(format!(
                "Type {impl_name} must only implement Interface types, it cannot implement {iface_name}.",
            ));
        }
        None => return Err(format!("Unknown type \"{iface_name}\".")),
    };

    for iface_field in &iface.fields {
        let Some(impl_field) = impl_fields.iter().find(|f| f.name == iface_field.name) else {
            return Err(format!(
                "Interface field {iface_name}.{} expected but {impl_name} does not provide it.",
                iface_field.name,
            ));
        };

        // Covariant return positions.
        if !schema.is_subtype(&impl_field.field_type, &iface_field.field_type) {
            return Err(format!(
                "Interface field {iface_name}.{} expects type {} but {impl_name}.{} is type {}.",
                iface_field.name, iface_field.field_type, impl_field.name, impl_field.field_type,
            ));
        }

        for iface_arg in &iface_field.arguments {
            let Some(impl_arg) = impl_field
                .arguments
                .iter()
                .find(|a| a.name == iface_arg.name)
            else {
                return Err(format!(
                    "Interface field argument {iface_name}.{}({}:) expected but {impl_name}.{} does not provide it.",
                    iface_field.name, iface_arg.name, impl_field.name,
                ));
            };
            if impl_arg.arg_type != iface_arg.arg_type {
                return Err(format!(
                    "Interface field argument {iface_name}.{}({}:) expects type {} but {impl_name}.{}({}:) is type {}.",
                    iface_field.name,
                    iface_arg.name,
                    iface_arg.arg_type,
                    impl_field.name,
                    impl_arg.name,
                    impl_arg.arg_type,
                ));
            }
        }

        for impl_arg in &impl_field.arguments {
            let declared = iface_field
                .arguments
                .iter()
                .any(|a| a.name == impl_arg.name);
            if !declared && impl_arg.arg_type.is_non_null() {
                return Err(format!(
                    "Object field {impl_name}.{} includes required argument {} that is missing from the Interface field {iface_name}.{}.",
                    impl_field.name, impl_arg.name, iface_field.name,
                ));
            }
        }
    }

    Ok(())
}

fn require_output_type(schema: &SchemaType, t: &Type<ArcStr>) -> Result<(), String> {
    let name = t.innermost_name();
    match schema.concrete_type_by_name(name) {
        Some(MetaType::InputObject(..)) => Err(format!(
            "The type of a field must be Output Type but got: {t}.",
        )),
        Some(..) => Ok(()),
        None => Err(format!("Unknown type \"{name}\".")),
    }
}

fn require_input_type(schema: &SchemaType, t: &Type<ArcStr>) -> Result<(), String> {
    let name = t.innermost_name();
    match schema.concrete_type_by_name(name) {
        Some(meta) if meta.is_input() => Ok(()),
        Some(..) => Err(format!(
            "The type of an argument must be Input Type but got: {t}.",
        )),
        None => Err(format!("Unknown type \"{name}\".")),
    }
}

/// Rejects input objects referencing themselves through a chain of
/// non-nullable fields.
fn check_input_cycles(schema: &SchemaType) -> Result<(), String> {
    for meta in schema.concrete_type_list() {
        if let MetaType::InputObject(io) = meta {
            let mut path = Vec::new();
            let mut visited = HashSet::new();
            detect_input_cycle(schema, io, &mut path, &mut visited)?;
        }
    }
    Ok(())
}

fn detect_input_cycle<'s>(
    schema: &'s SchemaType,
    io: &'s InputObjectMeta,
    path: &mut Vec<&'s str>,
    visited: &mut HashSet<&'s str>,
) -> Result<(), String> {
    if !visited.insert(io.name.as_str()) {
        return Ok(());
    }
    path.push(io.name.as_str());

    for field in &io.input_fields {
        if let Type::NonNullNamed(inner) = &field.arg_type {
            if let Some(MetaType::InputObject(next)) = schema.concrete_type_by_name(inner.as_str())
            {
                if let Some(pos) = path.iter().position(|n| *n == next.name.as_str()) {
                    let cycle = path[pos..].join(".");
                    return Err(format!(
                        "Cannot reference Input Object \"{}\" within itself through a series of non-null fields: \"{cycle}.{}\".",
                        next.name, field.name,
                    ));
                }
                detect_input_cycle(schema, next, path, visited)?;
            }
        }
    }

    path.pop();
    Ok(())
}

// ----------------------------------------------------------------------------
// Built-in scalars
// ----------------------------------------------------------------------------

/// Converts a constant literal into a plain value, enums becoming their
/// name string. The default behavior of custom scalars.
pub(crate) fn literal_to_value(literal: &InputValue) -> Result<Value, FieldError> {
    Ok(match literal {
        InputValue::Null => Value::Null,
        InputValue::Int(i) => Value::scalar(*i),
        InputValue::Float(f) => Value::scalar(*f),
        InputValue::String(s) => Value::scalar(s.as_str()),
        InputValue::Boolean(b) => Value::scalar(*b),
        InputValue::Enum(name) => Value::scalar(name.as_str()),
        InputValue::List(l) => Value::List(
            l.iter()
                .map(|v| literal_to_value(&v.item))
                .collect::<Result<_, _>>()?,
        ),
        InputValue::Object(o) => Value::Object(
            o.iter()
                .map(|(k, v)| Ok((k.item.clone(), literal_to_value(&v.item)?)))
                .collect::<Result<Vec<_>, FieldError>>()?
                .into_iter()
                .collect(),
        ),
        InputValue::Variable(name) => {
            return Err(FieldError::from(format!(
                "Unexpected variable \"${name}\" in constant value",
            )));
        }
    })
}

fn identity_parse_fn() -> ParseScalarFn {
    Arc::new(literal_to_value)
}

fn identity_serialize_fn() -> SerializeScalarFn {
    Arc::new(|v| Ok(v.clone()))
}

fn scalar_meta(
    name: ArcStr,
    description: ArcStr,
    parse_fn: ParseScalarFn,
    serialize_fn: SerializeScalarFn,
) -> MetaType {
    MetaType::Scalar(ScalarMeta {
        name,
        description: Some(description),
        specified_by_url: None,
        parse_fn,
        serialize_fn,
    })
}

pub(crate) fn builtin_scalars() -> Vec<MetaType> {
    vec![
        scalar_meta(
            arcstr::literal!("Int"),
            arcstr::literal!(
                "The `Int` scalar type represents non-fractional signed whole numeric values."
            ),
            Arc::new(parse_int),
            Arc::new(serialize_int),
        ),
        scalar_meta(
            arcstr::literal!("Float"),
            arcstr::literal!(
                "The `Float` scalar type represents signed double-precision fractional values."
            ),
            Arc::new(parse_float),
            Arc::new(serialize_float),
        ),
        scalar_meta(
            arcstr::literal!("String"),
            arcstr::literal!(
                "The `String` scalar type represents textual data, represented as UTF-8 character sequences."
            ),
            Arc::new(parse_string),
            Arc::new(serialize_string),
        ),
        scalar_meta(
            arcstr::literal!("Boolean"),
            arcstr::literal!("The `Boolean` scalar type represents `true` or `false`."),
            Arc::new(parse_boolean),
            Arc::new(serialize_boolean),
        ),
        scalar_meta(
            arcstr::literal!("ID"),
            arcstr::literal!(
                "The `ID` scalar type represents a unique identifier, serialized as a string."
            ),
            Arc::new(parse_id),
            Arc::new(serialize_id),
        ),
    ]
}

fn parse_int(v: &InputValue) -> Result<Value, FieldError> {
    match v {
        InputValue::Int(i) => Ok(Value::scalar(*i)),
        InputValue::Float(f) if f.fract() == 0.0 && in_int_range(*f) => {
            Ok(Value::scalar(*f as i32))
        }
        other => Err(FieldError::from(format!(
            "Int cannot represent non-integer value: {other}",
        ))),
    }
}

fn in_int_range(f: f64) -> bool {
    (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&f)
}

fn serialize_int(v: &Value) -> Result<Value, FieldError> {
    match v {
        Value::Scalar(s) => match s.as_int() {
            Some(i) => Ok(Value::scalar(i)),
            None => match s.as_float() {
                Some(f) if f.fract() == 0.0 && in_int_range(f) => Ok(Value::scalar(f as i32)),
                _ => match s.as_boolean() {
                    Some(b) => Ok(Value::scalar(i32::from(b))),
                    None => Err(FieldError::from(format!(
                        "Int cannot represent non-integer value: {v}",
                    ))),
                },
            },
        },
        _ => Err(FieldError::from(format!(
            "Int cannot represent non-integer value: {v}",
        ))),
    }
}

fn parse_float(v: &InputValue) -> Result<Value, FieldError> {
    match v {
        InputValue::Int(i) => Ok(Value::scalar(f64::from(*i))),
        InputValue::Float(f) => Ok(Value::scalar(*f)),
        other => Err(FieldError::from(format!(
            "Float cannot represent non numeric value: {other}",
        ))),
    }
}

fn serialize_float(v: &Value) -> Result<Value, FieldError> {
    match v.as_float_value() {
        Some(f) if f.is_finite() => Ok(Value::scalar(f)),
        _ => Err(FieldError::from(format!(
            "Float cannot represent non numeric value: {v}",
        ))),
    }
}

fn parse_string(v: &InputValue) -> Result<Value, FieldError> {
    match v {
        InputValue::String(s) => Ok(Value::scalar(s.as_str())),
        other => Err(FieldError::from(format!(
            "String cannot represent a non string value: {other}",
        ))),
    }
}

fn serialize_string(v: &Value) -> Result<Value, FieldError> {
    match v {
        Value::Scalar(s) => Ok(match s.as_string() {
            Some(s) => Value::scalar(s),
            // Non-string scalars display without quoting.
            None => Value::scalar(s.to_string()),
        }),
        _ => Err(FieldError::from(format!(
            "String cannot represent value: {v}",
        ))),
    }
}

fn parse_boolean(v: &InputValue) -> Result<Value, FieldError> {
    match v {
        InputValue::Boolean(b) => Ok(Value::scalar(*b)),
        other => Err(FieldError::from(format!(
            "Boolean cannot represent a non boolean value: {other}",
        ))),
    }
}

fn serialize_boolean(v: &Value) -> Result<Value, FieldError> {
    match v {
        Value::Scalar(s) => match s.as_boolean() {
            Some(b) => Ok(Value::scalar(b)),
            None => match s.as_float() {
                Some(f) => Ok(Value::scalar(f != 0.0)),
                None => Err(FieldError::from(format!(
                    "Boolean cannot represent a non boolean value: {v}",
                ))),
            },
        },
        _ => Err(FieldError::from(format!(
            "Boolean cannot represent a non boolean value: {v}",
        ))),
    }
}

fn parse_id(v: &InputValue) -> Result<Value, FieldError> {
    match v {
        InputValue::String(s) => Ok(Value::scalar(s.as_str())),
        InputValue::Int(i) => Ok(Value::scalar(i.to_string())),
        other => Err(FieldError::from(format!(
            "ID cannot represent value: {other}",
        ))),
    }
}

fn serialize_id(v: &Value) -> Result<Value, FieldError> {
    match v {
        Value::Scalar(s) => match s.as_string() {
            Some(s) => Ok(Value::scalar(s)),
            None => match s.as_int() {
                Some(i) => Ok(Value::scalar(i.to_string())),
                None => Err(FieldError::from(format!("ID cannot represent value: {v}"))),
            },
        },
        _ => Err(FieldError::from(format!("ID cannot represent value: {v}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::SchemaBuilder;

    use crate::{GraphQLError, parser::parse_document_source};

    fn build(sdl: &str) -> Result<crate::Schema, GraphQLError> {
        let document = parse_document_source(sdl).expect("test SDL parses");
        SchemaBuilder::from_document(&document).and_then(SchemaBuilder::finish)
    }

    fn build_err(sdl: &str) -> String {
        match build(sdl) {
            Ok(_) => panic!("expected schema construction to fail"),
            Err(GraphQLError::SchemaError(msg)) => msg,
            Err(other) => panic!("expected a schema error, got: {other}"),
        }
    }

    #[test]
    fn rejects_non_null_input_object_cycles() {
        let msg = build_err(
            r#"
          type Query {
            field(arg: First): String
          }

          input First {
            second: Second!
            value: Int
          }

          input Second {
            first: First!
          }
        "#,
        );

        assert!(
            msg.contains("within itself through a series of non-null fields"),
            "unexpected message: {msg}",
        );
    }

    #[test]
    fn allows_nullable_input_object_cycles() {
        build(
            r#"
          type Query {
            field(arg: First): String
          }

          input First {
            second: Second!
          }

          input Second {
            first: First
          }
        "#,
        )
        .expect("a cycle broken by a nullable field is legal");
    }

    #[test]
    fn accepts_covariant_interface_field_implementations() {
        build(
            r#"
          type Query {
            edge: Edge
          }

          interface Node {
            id: ID
          }

          interface Connection {
            node: Node
          }

          type Concrete implements Node {
            id: ID
          }

          type Edge implements Connection {
            node: Concrete!
          }
        "#,
        )
        .expect("a non-null subtype satisfies the interface field");
    }

    #[test]
    fn rejects_non_covariant_interface_field_implementations() {
        let msg = build_err(
            r#"
          type Query {
            edge: Edge
          }

          interface Node {
            id: ID
          }

          interface Connection {
            node: Node
          }

          type Edge implements Connection {
            node: String
          }
        "#,
        );

        assert_eq!(
            msg,
            "Interface field Connection.node expects type Node but Edge.node is type String.",
        );
    }

    #[test]
    fn rejects_missing_interface_fields() {
        let msg = build_err(
            r#"
          type Query {
            edge: Edge
          }

          interface Named {
            name: String
          }

          type Edge implements Named {
            label: String
          }
        "#,
        );

        assert_eq!(
            msg,
            "Interface field Named.name expected but Edge does not provide it.",
        );
    }
}
