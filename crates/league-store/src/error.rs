//! Error types for the storage layer.
//!
//! All errors are propagated via [`StoreError`]. Connection-level failures
//! from [`sqlx`] are classified as [`StoreError::Unavailable`] so callers
//! can tell "the store is down" apart from "the data is wrong".

use league_types::{AggregateError, Family};
use uuid::Uuid;

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id exists in the family.
    #[error("{family} record {id} not found")]
    NotFound {
        /// The family that was searched.
        family: Family,
        /// The missing id.
        id: Uuid,
    },

    /// The store could not be reached or timed out.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A write was refused because it would break a stored invariant
    /// (foreign key, check constraint, settled log entry, played fixture).
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Counter arithmetic inside an atomic aggregate update failed.
    #[error("aggregate update failed: {0}")]
    Aggregate(#[from] AggregateError),

    /// A `PostgreSQL` operation failed for a reason other than availability.
    #[error("PostgreSQL error: {0}")]
    Postgres(sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into its record type.
    #[error("corrupt {family} row: {message}")]
    Decode {
        /// The family the row belongs to.
        family: Family,
        /// What was wrong with it.
        message: String,
    },

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Shorthand for a [`StoreError::NotFound`].
    pub fn not_found(family: Family, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            family,
            id: id.into(),
        }
    }

    /// Whether this error means the store itself could not be reached.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err.to_string()),
            sqlx::Error::Database(ref db) if db.constraint().is_some() => {
                Self::Constraint(db.message().to_owned())
            }
            other => Self::Postgres(other),
        }
    }
}
