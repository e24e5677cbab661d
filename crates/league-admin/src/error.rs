//! Error types for the administrative service.

use league_standings::StandingsError;
use league_store::StoreError;
use league_types::{Family, FixtureId, Scoreline};
use uuid::Uuid;

/// Errors returned by [`crate::AdminService`].
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// The caller is not signed in. Nothing was written.
    #[error("not authenticated")]
    Unauthenticated,

    /// A form value was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced record does not exist.
    #[error("{family} record {id} not found")]
    NotFound {
        /// The family that was searched.
        family: Family,
        /// The missing id.
        id: Uuid,
    },

    /// The fixture is played; changing or deleting it would leave the
    /// standings inconsistent.
    #[error("fixture {fixture} is played ({recorded}); reconcile before changing it")]
    RequiresReconciliation {
        /// The played fixture.
        fixture: FixtureId,
        /// Its recorded result.
        recorded: Scoreline,
    },

    /// Recording a result failed.
    #[error(transparent)]
    Standings(#[from] StandingsError),

    /// The store failed.
    #[error("storage error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { family, id } => Self::NotFound { family, id },
            other => Self::Store(other),
        }
    }
}

impl AdminError {
    /// Whether the failure means the store could not be reached.
    pub const fn is_unavailable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_unavailable(),
            Self::Standings(StandingsError::StorageUnavailable(_)) => true,
            _ => false,
        }
    }
}
