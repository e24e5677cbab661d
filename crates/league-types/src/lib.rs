//! Shared type definitions for the league dashboard.
//!
//! This crate is the single source of truth for the records every other
//! crate in the workspace passes around. Types flow downstream to
//! `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for every record family
//! - [`enums`] -- Groups, statuses, knockout stages, families, log states
//! - [`aggregate`] -- Scorelines, outcomes, and the checked counter arithmetic
//! - [`structs`] -- Team, player, fixture, knockout fixture, result log entry
//! - [`forms`] -- Raw payloads submitted by the admin forms

pub mod aggregate;
pub mod enums;
pub mod forms;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use aggregate::{AggregateDelta, AggregateError, Outcome, Scoreline, TeamAggregate};
pub use enums::{
    Family, FixtureStatus, Group, KnockoutStage, ParseEnumError, ResultEntryState, Side,
};
pub use forms::{FixtureDraft, FixtureStatusChange, KnockoutDraft, PlayerDraft, TeamDraft};
pub use ids::{FixtureId, KnockoutFixtureId, PlayerId, ResultEntryId, TeamId};
pub use structs::{DEFAULT_KICKOFF, Fixture, KnockoutFixture, Player, ResultEntry, Team};
