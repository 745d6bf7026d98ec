//! Pluggable field-execution strategies.

use futures::{StreamExt as _, future::BoxFuture, stream};

/// How the fields of one selection set are driven to completion.
///
/// Every strategy joins results in response-key order, so the strategy in
/// use can never affect the response JSON.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExecutionStrategy {
    /// One field at a time, in document order. Deterministic scheduling;
    /// mandatory for mutation root selections.
    Serial,

    /// All field futures polled concurrently on the current task.
    #[default]
    Concurrent,

    /// Like [`ExecutionStrategy::Concurrent`], but with at most the given
    /// number of fields in flight, the way a fixed-width dispatch queue
    /// bounds its workers.
    Dispatch(usize),
}

impl ExecutionStrategy {
    /// Drives the provided field futures to completion, returning their
    /// outputs in input order.
    pub(crate) async fn run_fields<T>(&self, futures: Vec<BoxFuture<'_, T>>) -> Vec<T> {
        match self {
            Self::Serial => {
                let mut out = Vec::with_capacity(futures.len());
                for fut in futures {
                    out.push(fut.await);
                }
                out
            }
            Self::Concurrent => {
                futures
                    .into_iter()
                    .collect::<stream::FuturesOrdered<_>>()
                    .collect()
                    .await
            }
            Self::Dispatch(width) => {
                stream::iter(futures)
                    .buffered((*width).max(1))
                    .collect()
                    .await
            }
        }
    }
}

/// The strategy used for each operation kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExecutionStrategies {
    /// Strategy for query operations.
    pub query: ExecutionStrategy,
    /// Strategy for mutation operations below the root; the root selection
    /// set of a mutation is always serial.
    pub mutation: ExecutionStrategy,
    /// Strategy for the per-event execution of subscription operations.
    pub subscription: ExecutionStrategy,
}

impl Default for ExecutionStrategies {
    fn default() -> Self {
        Self {
            query: ExecutionStrategy::Concurrent,
            mutation: ExecutionStrategy::Serial,
            subscription: ExecutionStrategy::Concurrent,
        }
    }
}
