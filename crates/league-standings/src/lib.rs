//! Standings engine for the league dashboard.
//!
//! Team counters (wins, draws, losses, goals for, goals against) are a
//! denormalized summary of the played group fixtures. They change only
//! through this crate: [`StandingsAggregator`] applies one final score at a
//! time, and [`Reconciler`] verifies, repairs and recovers them offline.
//! Knockout fixtures never feed the standings.
//!
//! # Modules
//!
//! - [`aggregator`] -- `apply_result` and its two-phase commit through the result log
//! - [`verify`] -- Pure replay of played fixtures and drift detection
//! - [`reconcile`] -- Store-backed check, repair and pending-entry recovery
//! - [`error`] -- Shared error types
//!
//! # Standings invariant
//!
//! For every team T:
//!
//! ```text
//! T.wins + T.draws + T.losses == |played fixtures involving T|
//! ```
//!
//! with goal totals equal to the sums over those fixtures. The aggregator
//! never counts a fixture twice: a resubmitted identical result is an
//! [`ApplyOutcome::AlreadyApplied`] no-op and a differing one is refused
//! with [`StandingsError::RequiresReconciliation`]. A played fixture whose
//! result entry is still pending reports [`StandingsError::ResultPending`]
//! until recovery settles it.
//!
//! # Usage
//!
//! ```
//! use league_standings::{StandingsCheck, verify};
//!
//! // An empty league is trivially consistent.
//! let check = verify(&[], &[]).ok();
//! assert_eq!(check, Some(StandingsCheck::Consistent));
//! ```

pub mod aggregator;
pub mod error;
pub mod reconcile;
pub mod verify;

// Re-export primary types at crate root.
pub use aggregator::{ApplyOutcome, StandingsAggregator};
pub use error::StandingsError;
pub use reconcile::{Reconciler, RecoveryPolicy, RecoveryReport};
pub use verify::{StandingsCheck, StandingsDrift, TeamDrift, league_balanced, recompute, verify};
