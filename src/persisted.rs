//! The persisted-query lookup contract.
//!
//! The engine never talks to persisted storage itself; a host supplies a
//! [`PersistedQueries`] implementation and the engine consumes whichever
//! of the four outcomes the lookup produced.

use async_trait::async_trait;

use crate::{
    ast::OwnedDocument,
    parser::{ParseError, Spanning},
    validation::RuleError,
};

/// Outcome of looking up a persisted query by id.
pub enum PersistedLookup<'a> {
    /// The id is unknown to the store.
    Unknown,
    /// The stored text failed to parse.
    ParseError(Spanning<ParseError>),
    /// The stored document failed validation against the current schema.
    ValidateErrors(Vec<RuleError>),
    /// A parsed, validated document ready for execution.
    Document(&'a OwnedDocument<'a>),
}

/// Abstract persisted-query storage: the only point at which the engine
/// depends on a store.
#[async_trait]
pub trait PersistedQueries: Send + Sync {
    /// Looks up the persisted query registered under `id`.
    async fn lookup(&self, id: &str) -> PersistedLookup<'_>;
}
