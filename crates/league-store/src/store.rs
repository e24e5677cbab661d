//! The storage collaborator contract.
//!
//! [`EntityStore`] is everything the standings engine, the view
//! synchronizer and the admin service need from persistent storage:
//! CRUD by id and ordered list reads for the four record families, the
//! handful of conditional and atomic writes the standings engine relies
//! on, the result log, and the change feed.
//!
//! # Atomicity requirements
//!
//! - [`EntityStore::transition_fixture_to_played`] must only succeed for a
//!   fixture that is still unplayed at write time.
//! - [`EntityStore::apply_result_side`] and
//!   [`EntityStore::revert_result_side`] must perform the team
//!   read-modify-write and the log side flag as one atomic step, and must
//!   not interleave with another update of the same team.
//!
//! # List ordering
//!
//! - teams: name (case-insensitive), then id
//! - players: goals descending, then creation order
//! - fixtures: date descending, then kickoff time ascending
//! - knockout fixtures: stage (quarter, semi, final), then match number

use core::future::Future;

use league_types::{
    Fixture, FixtureId, KnockoutFixture, KnockoutFixtureId, Player, PlayerId, ResultEntry,
    ResultEntryId, ResultEntryState, Scoreline, Side, Team, TeamAggregate, TeamDraft, TeamId,
};

use crate::error::StoreError;
use crate::feed::ChangeFeed;

/// Result of a conditional fixture transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureTransition {
    /// The fixture was unplayed and is now played with the given scores.
    Transitioned(Fixture),
    /// The fixture was already played; it is returned unchanged.
    AlreadyPlayed(Fixture),
}

/// Async access to the league's persistent records.
pub trait EntityStore: Send + Sync {
    // -- Teams --------------------------------------------------------------

    /// Read one team.
    fn get_team(&self, id: TeamId) -> impl Future<Output = Result<Team, StoreError>> + Send;

    /// Read every team in list order.
    fn list_teams(&self) -> impl Future<Output = Result<Vec<Team>, StoreError>> + Send;

    /// Insert a new team.
    fn insert_team(&self, team: &Team) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite name, group and logo only. Counters are never written.
    fn update_team_profile(
        &self,
        id: TeamId,
        profile: &TeamDraft,
    ) -> impl Future<Output = Result<Team, StoreError>> + Send;

    /// Replace a team's counters wholesale (reconciliation only).
    fn overwrite_team_aggregate(
        &self,
        id: TeamId,
        aggregate: &TeamAggregate,
    ) -> impl Future<Output = Result<Team, StoreError>> + Send;

    /// Delete a team.
    fn delete_team(&self, id: TeamId) -> impl Future<Output = Result<(), StoreError>> + Send;

    // -- Players ------------------------------------------------------------

    /// Read one player.
    fn get_player(&self, id: PlayerId) -> impl Future<Output = Result<Player, StoreError>> + Send;

    /// Read every player in list order.
    fn list_players(&self) -> impl Future<Output = Result<Vec<Player>, StoreError>> + Send;

    /// Read the players of one team in list order.
    fn list_players_for_team(
        &self,
        team: TeamId,
    ) -> impl Future<Output = Result<Vec<Player>, StoreError>> + Send;

    /// Insert a new player.
    fn insert_player(&self, player: &Player)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite a player's editable fields.
    fn update_player(
        &self,
        player: &Player,
    ) -> impl Future<Output = Result<Player, StoreError>> + Send;

    /// Delete a player.
    fn delete_player(&self, id: PlayerId) -> impl Future<Output = Result<(), StoreError>> + Send;

    // -- Fixtures -----------------------------------------------------------

    /// Read one fixture.
    fn get_fixture(&self, id: FixtureId)
    -> impl Future<Output = Result<Fixture, StoreError>> + Send;

    /// Read every fixture in list order.
    fn list_fixtures(&self) -> impl Future<Output = Result<Vec<Fixture>, StoreError>> + Send;

    /// Insert a new fixture.
    fn insert_fixture(
        &self,
        fixture: &Fixture,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite date, time, teams and status of an unplayed fixture.
    ///
    /// Fails with [`StoreError::Constraint`] if the stored fixture is played.
    fn update_fixture_schedule(
        &self,
        fixture: &Fixture,
    ) -> impl Future<Output = Result<Fixture, StoreError>> + Send;

    /// Mark an unplayed fixture played and finished with the given scores.
    fn transition_fixture_to_played(
        &self,
        id: FixtureId,
        scoreline: Scoreline,
    ) -> impl Future<Output = Result<FixtureTransition, StoreError>> + Send;

    /// Clear the played flag and scores and set the status back to scheduled.
    fn reopen_fixture(
        &self,
        id: FixtureId,
    ) -> impl Future<Output = Result<Fixture, StoreError>> + Send;

    /// Delete an unplayed fixture and its result entries.
    ///
    /// Fails with [`StoreError::Constraint`] if the stored fixture is played.
    fn delete_fixture(&self, id: FixtureId) -> impl Future<Output = Result<(), StoreError>> + Send;

    // -- Knockout fixtures --------------------------------------------------

    /// Read one knockout fixture.
    fn get_knockout(
        &self,
        id: KnockoutFixtureId,
    ) -> impl Future<Output = Result<KnockoutFixture, StoreError>> + Send;

    /// Read every knockout fixture in list order.
    fn list_knockouts(
        &self,
    ) -> impl Future<Output = Result<Vec<KnockoutFixture>, StoreError>> + Send;

    /// Insert a new knockout fixture.
    fn insert_knockout(
        &self,
        fixture: &KnockoutFixture,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite a knockout fixture's editable fields.
    fn update_knockout(
        &self,
        fixture: &KnockoutFixture,
    ) -> impl Future<Output = Result<KnockoutFixture, StoreError>> + Send;

    /// Delete a knockout fixture.
    fn delete_knockout(
        &self,
        id: KnockoutFixtureId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    // -- Result log ---------------------------------------------------------

    /// Append a pending entry.
    fn insert_result_entry(
        &self,
        entry: &ResultEntry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Read one entry.
    fn get_result_entry(
        &self,
        id: ResultEntryId,
    ) -> impl Future<Output = Result<ResultEntry, StoreError>> + Send;

    /// Read entries in the given state, oldest first.
    fn list_result_entries(
        &self,
        state: ResultEntryState,
    ) -> impl Future<Output = Result<Vec<ResultEntry>, StoreError>> + Send;

    /// Atomically add the entry's delta for `side` to that team and mark the
    /// side applied. A side that is already applied is left alone and the
    /// current team is returned.
    fn apply_result_side(
        &self,
        id: ResultEntryId,
        side: Side,
    ) -> impl Future<Output = Result<Team, StoreError>> + Send;

    /// Atomically subtract the entry's delta for `side` from that team and
    /// clear the side flag. A side that is not applied is left alone.
    fn revert_result_side(
        &self,
        id: ResultEntryId,
        side: Side,
    ) -> impl Future<Output = Result<Team, StoreError>> + Send;

    /// Move a pending entry into a terminal state.
    fn settle_result_entry(
        &self,
        id: ResultEntryId,
        state: ResultEntryState,
    ) -> impl Future<Output = Result<ResultEntry, StoreError>> + Send;

    // -- Change feed --------------------------------------------------------

    /// Open a change feed covering every family.
    fn subscribe(&self) -> ChangeFeed;
}
