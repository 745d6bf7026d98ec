use std::{collections::HashSet, fmt};

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{Definition, Document, Fragment, FragmentSpread, Operation, Selection, Type},
    parser::{SourcePosition, Spanning},
    schema::{meta::MetaType, model::SchemaType},
};

/// Query validation error.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> Self {
        Self {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// The message of this validation error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The source positions of this validation error.
    ///
    /// All validation errors contain at least one position; some rules
    /// supply extra context through several.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locations = self
            .locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}. At {locations}", self.message)
    }
}

impl std::error::Error for RuleError {}

/// Shared state threaded through a validation pass: the typed traversal
/// stacks, the collected errors, and cached document analyses.
pub struct ValidatorContext<'a> {
    /// The schema the document validates against.
    pub schema: &'a SchemaType,
    document: &'a Document<'a>,
    errors: Vec<RuleError>,
    type_stack: Vec<Option<&'a MetaType>>,
    type_literal_stack: Vec<Option<Type<ArcStr>>>,
    input_type_stack: Vec<Option<&'a MetaType>>,
    input_type_literal_stack: Vec<Option<Type<ArcStr>>>,
    default_value_stack: Vec<bool>,
    parent_type_stack: Vec<Option<&'a MetaType>>,
    fragments: FnvHashMap<&'a str, &'a Spanning<Fragment<'a>>>,
}

impl<'a> ValidatorContext<'a> {
    #[doc(hidden)]
    pub fn new(schema: &'a SchemaType, document: &'a Document<'a>) -> Self {
        Self {
            errors: Vec::new(),
            schema,
            document,
            type_stack: Vec::new(),
            type_literal_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            input_type_literal_stack: Vec::new(),
            default_value_stack: Vec::new(),
            fragments: document
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(frag) => Some((frag.item.name.item, frag)),
                    _ => None,
                })
                .collect(),
        }
    }

    #[doc(hidden)]
    pub fn append_errors(&mut self, mut errors: Vec<RuleError>) {
        self.errors.append(&mut errors);
    }

    #[doc(hidden)]
    pub fn report_error(&mut self, message: &str, locations: &[SourcePosition]) {
        self.errors.push(RuleError::new(message, locations));
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[doc(hidden)]
    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort();
        self.errors
    }

    #[doc(hidden)]
    pub fn with_pushed_type<N, F, R>(&mut self, t: Option<&Type<N>>, f: F) -> R
    where
        N: AsRef<str>,
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        if let Some(t) = t {
            self.type_stack
                .push(self.schema.concrete_type_by_name(t.innermost_name()));
        } else {
            self.type_stack.push(None);
        }

        self.type_literal_stack.push(t.map(Type::to_arc));

        let res = f(self);

        self.type_literal_stack.pop();
        self.type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_pushed_parent_type<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        self.parent_type_stack
            .push(*self.type_stack.last().unwrap_or(&None));
        let res = f(self);
        self.parent_type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_pushed_input_type<F, R>(&mut self, t: Option<&Type<ArcStr>>, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        if let Some(t) = t {
            self.input_type_stack
                .push(self.schema.concrete_type_by_name(t.innermost_name()));
        } else {
            self.input_type_stack.push(None);
        }

        self.input_type_literal_stack.push(t.cloned());

        let res = f(self);

        self.input_type_literal_stack.pop();
        self.input_type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_default_value_marker<F, R>(&mut self, is_default: bool, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        self.default_value_stack.push(is_default);
        let res = f(self);
        self.default_value_stack.pop();
        res
    }

    #[doc(hidden)]
    pub fn current_type(&self) -> Option<&'a MetaType> {
        *self.type_stack.last().unwrap_or(&None)
    }

    #[doc(hidden)]
    pub fn current_type_literal(&self) -> Option<&Type<ArcStr>> {
        match self.type_literal_stack.last() {
            Some(Some(t)) => Some(t),
            _ => None,
        }
    }

    #[doc(hidden)]
    pub fn parent_type(&self) -> Option<&'a MetaType> {
        *self.parent_type_stack.last().unwrap_or(&None)
    }

    #[doc(hidden)]
    pub fn current_input_type(&self) -> Option<&'a MetaType> {
        *self.input_type_stack.last().unwrap_or(&None)
    }

    #[doc(hidden)]
    pub fn current_input_type_literal(&self) -> Option<&Type<ArcStr>> {
        match self.input_type_literal_stack.last() {
            Some(Some(t)) => Some(t),
            _ => None,
        }
    }

    /// Whether the currently visited input literal sits inside a default
    /// value position.
    #[doc(hidden)]
    pub fn in_default_value(&self) -> bool {
        self.default_value_stack.last().copied().unwrap_or(false)
    }

    #[doc(hidden)]
    pub fn is_known_fragment(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    /// The document under validation.
    pub fn document(&self) -> &'a Document<'a> {
        self.document
    }

    /// Fragment definition by name.
    pub fn fragment(&self, name: &str) -> Option<&'a Spanning<Fragment<'a>>> {
        self.fragments.get(name).copied()
    }

    /// All fragment spreads reachable from a selection set, nested
    /// selections included.
    pub fn fragment_spreads(
        &self,
        selection_set: &'a [Selection<'a>],
    ) -> Vec<&'a Spanning<FragmentSpread<'a>>> {
        let mut spreads = Vec::new();
        let mut pending = vec![selection_set];

        while let Some(set) = pending.pop() {
            for selection in set {
                match selection {
                    Selection::Field(f) => {
                        if let Some(nested) = &f.item.selection_set {
                            pending.push(nested);
                        }
                    }
                    Selection::FragmentSpread(spread) => spreads.push(spread),
                    Selection::InlineFragment(inline) => pending.push(&inline.item.selection_set),
                }
            }
        }

        spreads
    }

    /// All fragments transitively referenced by an operation.
    pub fn recursively_referenced_fragments(
        &self,
        operation: &'a Spanning<Operation<'a>>,
    ) -> Vec<&'a Spanning<Fragment<'a>>> {
        let mut collected = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![&operation.item.selection_set[..]];

        while let Some(set) = pending.pop() {
            for spread in self.fragment_spreads(set) {
                if visited.insert(spread.item.name.item) {
                    if let Some(fragment) = self.fragment(spread.item.name.item) {
                        collected.push(fragment);
                        pending.push(&fragment.item.selection_set);
                    }
                }
            }
        }

        collected
    }
}
