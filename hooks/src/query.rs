//! Single-value queries and mutations.

use story_schematics_core::ApiError;
use tracing::debug;

use crate::error::HooksError;
use crate::key::QueryKey;
use crate::retry::RetryPolicy;

/// A cacheable read of one value.
pub trait Query {
    type Output;

    fn key(&self) -> QueryKey;

    /// Whether the query has what it needs to run.
    fn enabled(&self) -> bool {
        true
    }

    fn fetch_one(&self) -> Result<Self::Output, ApiError>;

    /// Only `Internal` errors are presumed transient.
    fn should_retry(&self, error: &ApiError) -> bool {
        error.is_internal()
    }
}

/// A write, triggered explicitly with its input. Never retried.
pub trait Mutation {
    type Input;
    type Output;

    fn key(&self) -> QueryKey;

    fn mutate(&self, input: &Self::Input) -> Result<Self::Output, ApiError>;
}

/// Run `query` under `retry`. Disabled queries issue no request.
pub fn fetch_query<Q: Query>(query: &Q, retry: &RetryPolicy) -> Result<Q::Output, HooksError> {
    let key = query.key();
    if !query.enabled() {
        debug!(%key, "query disabled");
        return Err(HooksError::Disabled {
            key: key.fingerprint(),
        });
    }
    let label = key.fingerprint();
    retry
        .run(&label, |err| query.should_retry(err), || query.fetch_one())
        .map_err(HooksError::from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Tracks the outcome of the latest call to a mutation.
pub struct MutationState<M: Mutation> {
    mutation: M,
    status: MutationStatus,
    outcome: Option<Result<M::Output, ApiError>>,
}

impl<M: Mutation> MutationState<M> {
    pub fn new(mutation: M) -> Self {
        Self {
            mutation,
            status: MutationStatus::Idle,
            outcome: None,
        }
    }

    pub fn key(&self) -> QueryKey {
        self.mutation.key()
    }

    pub fn status(&self) -> MutationStatus {
        self.status
    }

    pub fn data(&self) -> Option<&M::Output> {
        self.outcome.as_ref().and_then(|o| o.as_ref().ok())
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.outcome.as_ref().and_then(|o| o.as_ref().err())
    }

    /// Call the mutation and keep its result. Success and failure are
    /// returned unchanged.
    pub fn mutate(&mut self, input: &M::Input) -> Result<&M::Output, &ApiError> {
        self.status = MutationStatus::Pending;
        let outcome = self.mutation.mutate(input);
        self.status = match outcome {
            Ok(_) => MutationStatus::Success,
            Err(_) => MutationStatus::Error,
        };
        debug!(key = %self.mutation.key(), status = ?self.status, "mutation settled");
        self.outcome.insert(outcome).as_ref()
    }

    /// Forget the last outcome.
    pub fn reset(&mut self) {
        self.status = MutationStatus::Idle;
        self.outcome = None;
    }
}
