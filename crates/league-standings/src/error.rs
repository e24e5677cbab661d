//! Error types for the standings engine.

use league_store::StoreError;
use league_types::{AggregateError, Family, FixtureId, ResultEntryId, Scoreline};
use uuid::Uuid;

/// Errors returned by the aggregator, verification and reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum StandingsError {
    /// The fixture, or a team it references, does not exist.
    #[error("{family} record {id} not found")]
    NotFound {
        /// The family that was searched.
        family: Family,
        /// The missing id.
        id: Uuid,
    },

    /// Scores are missing, negative or too large, or the fixture is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The fixture is already played with a different result. Correcting it
    /// needs an explicit reconciliation step.
    #[error("fixture {fixture} is recorded as {recorded}, refusing {submitted}")]
    RequiresReconciliation {
        /// The fixture in question.
        fixture: FixtureId,
        /// The result already stored.
        recorded: Scoreline,
        /// The result that was submitted.
        submitted: Scoreline,
    },

    /// The fixture is marked played but the entry that records its result
    /// is still pending, so the standings may not include it yet.
    #[error("fixture {fixture} has pending result entry {entry}; run recovery")]
    ResultPending {
        /// The played fixture.
        fixture: FixtureId,
        /// The entry left pending.
        entry: ResultEntryId,
    },

    /// Pending result log entries must be recovered before repairing.
    #[error("{count} pending result entries must be recovered first")]
    PendingResults {
        /// How many entries are still pending.
        count: usize,
    },

    /// The store failed or refused the write. Not retried.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StoreError),

    /// A team counter would leave its range. Nothing was written.
    #[error("standings counter overflow")]
    Overflow,
}

impl From<StoreError> for StandingsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { family, id } => Self::NotFound { family, id },
            StoreError::Aggregate(_) => Self::Overflow,
            other => Self::StorageUnavailable(other),
        }
    }
}

impl From<AggregateError> for StandingsError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::MissingScore { .. } | AggregateError::ScoreOutOfRange { .. } => {
                Self::InvalidInput(err.to_string())
            }
            AggregateError::Overflow | AggregateError::Underflow => Self::Overflow,
        }
    }
}
