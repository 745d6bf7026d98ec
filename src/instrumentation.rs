//! Before/after callbacks around the four request phases.

use std::{
    thread::{self, ThreadId},
    time::Instant,
};

use crate::validation::RuleError;

/// Timing and origin information for one completed phase.
#[derive(Clone, Debug)]
pub struct Timing {
    /// The id of the process the phase ran in.
    pub process_id: u32,
    /// The id of the thread that finished the phase.
    pub thread_id: ThreadId,
    /// When the phase started.
    pub started: Instant,
    /// When the phase finished.
    pub finished: Instant,
}

impl Timing {
    /// Captures a timing record for a phase started at `started`.
    pub fn since(started: Instant) -> Self {
        Self {
            process_id: std::process::id(),
            thread_id: thread::current().id(),
            started,
            finished: Instant::now(),
        }
    }
}

/// Host-provided callbacks invoked around query parsing, validation,
/// operation execution, and field resolution.
///
/// All methods default to no-ops; the engine tolerates any subset being
/// implemented.
pub trait Instrumentation: Send + Sync {
    /// Called before a request's source text is parsed.
    fn before_query_parsing(&self) {}
    /// Called after parsing, with the source and whether it succeeded.
    fn after_query_parsing(&self, source: &str, succeeded: bool, timing: &Timing) {
        let (_, _, _) = (source, succeeded, timing);
    }

    /// Called before a document is validated.
    fn before_query_validation(&self) {}
    /// Called after validation, with the produced errors.
    fn after_query_validation(&self, errors: &[RuleError], timing: &Timing) {
        let (_, _) = (errors, timing);
    }

    /// Called before an operation starts executing.
    fn before_operation_execution(&self, operation_name: Option<&str>) {
        let _ = operation_name;
    }
    /// Called after an operation finished executing.
    fn after_operation_execution(&self, operation_name: Option<&str>, timing: &Timing) {
        let (_, _) = (operation_name, timing);
    }

    /// Called before one field's resolver is invoked.
    fn before_field_resolution(&self, type_name: &str, field_name: &str) {
        let (_, _) = (type_name, field_name);
    }
    /// Called after one field's resolver returned.
    fn after_field_resolution(
        &self,
        type_name: &str,
        field_name: &str,
        succeeded: bool,
        timing: &Timing,
    ) {
        let (_, _, _, _) = (type_name, field_name, succeeded, timing);
    }
}

/// The default [`Instrumentation`]: does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInstrumentation;

impl Instrumentation for NoopInstrumentation {}
