//! In-memory [`EntityStore`] implementation.
//!
//! Every table lives behind one tokio [`RwLock`], so each write (including
//! the atomic per-team result steps) is serialized against every other
//! write. Notices go out through the same [`ChangeBus`] type the
//! `PostgreSQL` store bridges its `LISTEN` channel into.
//!
//! The store mirrors the foreign-key and check constraints of the SQL
//! schema so behaviour matches across implementations. It also carries an
//! offline switch and one-shot failure injection, which tests use to drive
//! the `StorageUnavailable` and crash-recovery paths.

use std::collections::BTreeMap;

use chrono::Utc;
use league_types::{
    Family, Fixture, FixtureId, FixtureStatus, KnockoutFixture, KnockoutFixtureId, Player,
    PlayerId, ResultEntry, ResultEntryId, ResultEntryState, Scoreline, Side, Team, TeamAggregate,
    TeamDraft, TeamId,
};
use tokio::sync::{Mutex, RwLock};

use crate::error::StoreError;
use crate::feed::{ChangeBus, ChangeFeed, ChangeKind, ChangeNotice};
use crate::order;
use crate::store::{EntityStore, FixtureTransition};

/// Operations that can be targeted by failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Any read.
    Read,
    /// Any plain insert, update or delete.
    Write,
    /// [`EntityStore::transition_fixture_to_played`].
    TransitionFixture,
    /// [`EntityStore::reopen_fixture`].
    ReopenFixture,
    /// [`EntityStore::overwrite_team_aggregate`].
    OverwriteAggregate,
    /// [`EntityStore::insert_result_entry`].
    InsertResultEntry,
    /// [`EntityStore::apply_result_side`].
    ApplyResultSide,
    /// [`EntityStore::revert_result_side`].
    RevertResultSide,
    /// [`EntityStore::settle_result_entry`].
    SettleResultEntry,
}

#[derive(Debug, Default)]
struct Tables {
    teams: BTreeMap<TeamId, Team>,
    players: BTreeMap<PlayerId, Player>,
    fixtures: BTreeMap<FixtureId, Fixture>,
    knockouts: BTreeMap<KnockoutFixtureId, KnockoutFixture>,
    results: BTreeMap<ResultEntryId, ResultEntry>,
}

#[derive(Debug, Default)]
struct Faults {
    offline: bool,
    fail_next: Vec<StoreOp>,
}

/// An [`EntityStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    bus: ChangeBus,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    /// (or restore service with `false`).
    pub async fn set_offline(&self, offline: bool) {
        self.faults.lock().await.offline = offline;
    }

    /// Make the next call of the given operation fail with
    /// [`StoreError::Unavailable`]. Injections queue up in call order.
    pub async fn fail_next(&self, op: StoreOp) {
        self.faults.lock().await.fail_next.push(op);
    }

    async fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        let mut faults = self.faults.lock().await;
        if faults.offline {
            return Err(StoreError::Unavailable("memory store is offline".to_owned()));
        }
        if let Some(pos) = faults.fail_next.iter().position(|f| *f == op) {
            faults.fail_next.remove(pos);
            tracing::debug!(?op, "Injected store failure");
            return Err(StoreError::Unavailable(format!("injected failure on {op:?}")));
        }
        Ok(())
    }

    fn notify(&self, family: Family, kind: ChangeKind) {
        self.bus.publish(ChangeNotice::new(family, kind));
    }
}

fn team_must_exist(tables: &Tables, id: TeamId) -> Result<(), StoreError> {
    if tables.teams.contains_key(&id) {
        Ok(())
    } else {
        Err(StoreError::Constraint(format!("team {id} does not exist")))
    }
}

fn check_fixture_teams(tables: &Tables, fixture: &Fixture) -> Result<(), StoreError> {
    if fixture.home_team == fixture.away_team {
        return Err(StoreError::Constraint(
            "home and away team must differ".to_owned(),
        ));
    }
    team_must_exist(tables, fixture.home_team)?;
    team_must_exist(tables, fixture.away_team)
}

fn check_knockout_teams(tables: &Tables, fixture: &KnockoutFixture) -> Result<(), StoreError> {
    if let (Some(a), Some(b)) = (fixture.team1, fixture.team2) {
        if a == b {
            return Err(StoreError::Constraint(
                "knockout teams must differ".to_owned(),
            ));
        }
    }
    for team in [fixture.team1, fixture.team2].into_iter().flatten() {
        team_must_exist(tables, team)?;
    }
    Ok(())
}

/// Apply or revert one side of a pending entry inside an exclusive lock.
fn step_result_side(
    tables: &mut Tables,
    id: ResultEntryId,
    side: Side,
    apply: bool,
) -> Result<Team, StoreError> {
    let entry = tables
        .results
        .get(&id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(Family::ResultLog, id))?;
    if entry.state != ResultEntryState::Pending {
        return Err(StoreError::Constraint(format!(
            "result entry {id} is already {}",
            entry.state
        )));
    }

    let team_id = entry.team(side);
    let team = tables
        .teams
        .get_mut(&team_id)
        .ok_or_else(|| StoreError::not_found(Family::Teams, team_id))?;

    if entry.is_applied(side) == apply {
        return Ok(team.clone());
    }

    let delta = entry.delta(side);
    team.aggregate = if apply {
        team.aggregate.apply(&delta)?
    } else {
        team.aggregate.revert(&delta)?
    };
    let updated = team.clone();

    if let Some(stored) = tables.results.get_mut(&id) {
        stored.set_applied(side, apply);
    }
    Ok(updated)
}

impl EntityStore for MemoryStore {
    // -- Teams --------------------------------------------------------------

    async fn get_team(&self, id: TeamId) -> Result<Team, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        tables
            .teams
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Family::Teams, id))
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        let mut teams: Vec<Team> = tables.teams.values().cloned().collect();
        teams.sort_by(order::teams);
        Ok(teams)
    }

    async fn insert_team(&self, team: &Team) -> Result<(), StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        if tables.teams.contains_key(&team.id) {
            return Err(StoreError::Constraint(format!("team {} already exists", team.id)));
        }
        tables.teams.insert(team.id, team.clone());
        drop(tables);
        self.notify(Family::Teams, ChangeKind::Insert);
        Ok(())
    }

    async fn update_team_profile(&self, id: TeamId, profile: &TeamDraft) -> Result<Team, StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        let team = tables
            .teams
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Family::Teams, id))?;
        team.name.clone_from(&profile.name);
        team.group = profile.group;
        team.logo_url.clone_from(&profile.logo_url);
        let updated = team.clone();
        drop(tables);
        self.notify(Family::Teams, ChangeKind::Update);
        Ok(updated)
    }

    async fn overwrite_team_aggregate(
        &self,
        id: TeamId,
        aggregate: &TeamAggregate,
    ) -> Result<Team, StoreError> {
        self.check(StoreOp::OverwriteAggregate).await?;
        let mut tables = self.tables.write().await;
        let team = tables
            .teams
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Family::Teams, id))?;
        team.aggregate = *aggregate;
        let updated = team.clone();
        drop(tables);
        self.notify(Family::Teams, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete_team(&self, id: TeamId) -> Result<(), StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        if !tables.teams.contains_key(&id) {
            return Err(StoreError::not_found(Family::Teams, id));
        }
        if tables.players.values().any(|p| p.team_id == id) {
            return Err(StoreError::Constraint(format!("team {id} still has players")));
        }
        if tables.fixtures.values().any(|f| f.involves(id)) {
            return Err(StoreError::Constraint(format!("team {id} still has fixtures")));
        }
        tables.teams.remove(&id);
        let mut knockouts_touched = false;
        for knockout in tables.knockouts.values_mut() {
            if knockout.team1 == Some(id) {
                knockout.team1 = None;
                knockouts_touched = true;
            }
            if knockout.team2 == Some(id) {
                knockout.team2 = None;
                knockouts_touched = true;
            }
        }
        drop(tables);
        self.notify(Family::Teams, ChangeKind::Delete);
        if knockouts_touched {
            self.notify(Family::KnockoutFixtures, ChangeKind::Update);
        }
        Ok(())
    }

    // -- Players ------------------------------------------------------------

    async fn get_player(&self, id: PlayerId) -> Result<Player, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        tables
            .players
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Family::Players, id))
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        let mut players: Vec<Player> = tables.players.values().cloned().collect();
        players.sort_by(order::players);
        Ok(players)
    }

    async fn list_players_for_team(&self, team: TeamId) -> Result<Vec<Player>, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        let mut players: Vec<Player> = tables
            .players
            .values()
            .filter(|p| p.team_id == team)
            .cloned()
            .collect();
        players.sort_by(order::players);
        Ok(players)
    }

    async fn insert_player(&self, player: &Player) -> Result<(), StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        team_must_exist(&tables, player.team_id)?;
        if tables.players.contains_key(&player.id) {
            return Err(StoreError::Constraint(format!("player {} already exists", player.id)));
        }
        tables.players.insert(player.id, player.clone());
        drop(tables);
        self.notify(Family::Players, ChangeKind::Insert);
        Ok(())
    }

    async fn update_player(&self, player: &Player) -> Result<Player, StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        team_must_exist(&tables, player.team_id)?;
        let stored = tables
            .players
            .get_mut(&player.id)
            .ok_or_else(|| StoreError::not_found(Family::Players, player.id))?;
        stored.team_id = player.team_id;
        stored.name.clone_from(&player.name);
        stored.goals = player.goals;
        stored.assists = player.assists;
        let updated = stored.clone();
        drop(tables);
        self.notify(Family::Players, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete_player(&self, id: PlayerId) -> Result<(), StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        tables
            .players
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(Family::Players, id))?;
        drop(tables);
        self.notify(Family::Players, ChangeKind::Delete);
        Ok(())
    }

    // -- Fixtures -----------------------------------------------------------

    async fn get_fixture(&self, id: FixtureId) -> Result<Fixture, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        tables
            .fixtures
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Family::Fixtures, id))
    }

    async fn list_fixtures(&self) -> Result<Vec<Fixture>, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        let mut fixtures: Vec<Fixture> = tables.fixtures.values().cloned().collect();
        fixtures.sort_by(order::fixtures);
        Ok(fixtures)
    }

    async fn insert_fixture(&self, fixture: &Fixture) -> Result<(), StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        check_fixture_teams(&tables, fixture)?;
        if fixture.played {
            return Err(StoreError::Constraint(
                "fixtures must be created unplayed".to_owned(),
            ));
        }
        if tables.fixtures.contains_key(&fixture.id) {
            return Err(StoreError::Constraint(format!("fixture {} already exists", fixture.id)));
        }
        tables.fixtures.insert(fixture.id, fixture.clone());
        drop(tables);
        self.notify(Family::Fixtures, ChangeKind::Insert);
        Ok(())
    }

    async fn update_fixture_schedule(&self, fixture: &Fixture) -> Result<Fixture, StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        check_fixture_teams(&tables, fixture)?;
        if fixture.status == FixtureStatus::Finished {
            return Err(StoreError::Constraint(
                "finished status requires a recorded result".to_owned(),
            ));
        }
        let stored = tables
            .fixtures
            .get_mut(&fixture.id)
            .ok_or_else(|| StoreError::not_found(Family::Fixtures, fixture.id))?;
        if stored.played {
            return Err(StoreError::Constraint(format!(
                "fixture {} is already played",
                fixture.id
            )));
        }
        stored.date = fixture.date;
        stored.time = fixture.time;
        stored.home_team = fixture.home_team;
        stored.away_team = fixture.away_team;
        stored.status = fixture.status;
        let updated = stored.clone();
        drop(tables);
        self.notify(Family::Fixtures, ChangeKind::Update);
        Ok(updated)
    }

    async fn transition_fixture_to_played(
        &self,
        id: FixtureId,
        scoreline: Scoreline,
    ) -> Result<FixtureTransition, StoreError> {
        self.check(StoreOp::TransitionFixture).await?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .fixtures
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Family::Fixtures, id))?;
        if stored.played {
            return Ok(FixtureTransition::AlreadyPlayed(stored.clone()));
        }
        stored.played = true;
        stored.status = FixtureStatus::Finished;
        stored.home_score = Some(scoreline.home);
        stored.away_score = Some(scoreline.away);
        let updated = stored.clone();
        drop(tables);
        self.notify(Family::Fixtures, ChangeKind::Update);
        Ok(FixtureTransition::Transitioned(updated))
    }

    async fn reopen_fixture(&self, id: FixtureId) -> Result<Fixture, StoreError> {
        self.check(StoreOp::ReopenFixture).await?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .fixtures
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Family::Fixtures, id))?;
        stored.played = false;
        stored.status = FixtureStatus::Scheduled;
        stored.home_score = None;
        stored.away_score = None;
        let updated = stored.clone();
        drop(tables);
        self.notify(Family::Fixtures, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete_fixture(&self, id: FixtureId) -> Result<(), StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .fixtures
            .get(&id)
            .ok_or_else(|| StoreError::not_found(Family::Fixtures, id))?;
        if stored.played {
            return Err(StoreError::Constraint(format!(
                "fixture {id} is already played"
            )));
        }
        tables.fixtures.remove(&id);
        let before = tables.results.len();
        tables.results.retain(|_, entry| entry.fixture_id != id);
        let log_touched = tables.results.len() != before;
        drop(tables);
        self.notify(Family::Fixtures, ChangeKind::Delete);
        if log_touched {
            self.notify(Family::ResultLog, ChangeKind::Delete);
        }
        Ok(())
    }

    // -- Knockout fixtures --------------------------------------------------

    async fn get_knockout(&self, id: KnockoutFixtureId) -> Result<KnockoutFixture, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        tables
            .knockouts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Family::KnockoutFixtures, id))
    }

    async fn list_knockouts(&self) -> Result<Vec<KnockoutFixture>, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        let mut knockouts: Vec<KnockoutFixture> = tables.knockouts.values().cloned().collect();
        knockouts.sort_by(order::knockouts);
        Ok(knockouts)
    }

    async fn insert_knockout(&self, fixture: &KnockoutFixture) -> Result<(), StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        check_knockout_teams(&tables, fixture)?;
        if tables.knockouts.contains_key(&fixture.id) {
            return Err(StoreError::Constraint(format!(
                "knockout fixture {} already exists",
                fixture.id
            )));
        }
        tables.knockouts.insert(fixture.id, fixture.clone());
        drop(tables);
        self.notify(Family::KnockoutFixtures, ChangeKind::Insert);
        Ok(())
    }

    async fn update_knockout(&self, fixture: &KnockoutFixture) -> Result<KnockoutFixture, StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        check_knockout_teams(&tables, fixture)?;
        let stored = tables
            .knockouts
            .get_mut(&fixture.id)
            .ok_or_else(|| StoreError::not_found(Family::KnockoutFixtures, fixture.id))?;
        let created_at = stored.created_at;
        *stored = KnockoutFixture {
            created_at,
            ..fixture.clone()
        };
        let updated = stored.clone();
        drop(tables);
        self.notify(Family::KnockoutFixtures, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete_knockout(&self, id: KnockoutFixtureId) -> Result<(), StoreError> {
        self.check(StoreOp::Write).await?;
        let mut tables = self.tables.write().await;
        tables
            .knockouts
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(Family::KnockoutFixtures, id))?;
        drop(tables);
        self.notify(Family::KnockoutFixtures, ChangeKind::Delete);
        Ok(())
    }

    // -- Result log ---------------------------------------------------------

    async fn insert_result_entry(&self, entry: &ResultEntry) -> Result<(), StoreError> {
        self.check(StoreOp::InsertResultEntry).await?;
        let mut tables = self.tables.write().await;
        if !tables.fixtures.contains_key(&entry.fixture_id) {
            return Err(StoreError::Constraint(format!(
                "fixture {} does not exist",
                entry.fixture_id
            )));
        }
        if tables.results.contains_key(&entry.id) {
            return Err(StoreError::Constraint(format!(
                "result entry {} already exists",
                entry.id
            )));
        }
        tables.results.insert(entry.id, entry.clone());
        drop(tables);
        self.notify(Family::ResultLog, ChangeKind::Insert);
        Ok(())
    }

    async fn get_result_entry(&self, id: ResultEntryId) -> Result<ResultEntry, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        tables
            .results
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Family::ResultLog, id))
    }

    async fn list_result_entries(
        &self,
        state: ResultEntryState,
    ) -> Result<Vec<ResultEntry>, StoreError> {
        self.check(StoreOp::Read).await?;
        let tables = self.tables.read().await;
        let mut entries: Vec<ResultEntry> = tables
            .results
            .values()
            .filter(|e| e.state == state)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn apply_result_side(&self, id: ResultEntryId, side: Side) -> Result<Team, StoreError> {
        self.check(StoreOp::ApplyResultSide).await?;
        let mut tables = self.tables.write().await;
        let team = step_result_side(&mut tables, id, side, true)?;
        drop(tables);
        self.notify(Family::Teams, ChangeKind::Update);
        self.notify(Family::ResultLog, ChangeKind::Update);
        Ok(team)
    }

    async fn revert_result_side(&self, id: ResultEntryId, side: Side) -> Result<Team, StoreError> {
        self.check(StoreOp::RevertResultSide).await?;
        let mut tables = self.tables.write().await;
        let team = step_result_side(&mut tables, id, side, false)?;
        drop(tables);
        self.notify(Family::Teams, ChangeKind::Update);
        self.notify(Family::ResultLog, ChangeKind::Update);
        Ok(team)
    }

    async fn settle_result_entry(
        &self,
        id: ResultEntryId,
        state: ResultEntryState,
    ) -> Result<ResultEntry, StoreError> {
        self.check(StoreOp::SettleResultEntry).await?;
        let mut tables = self.tables.write().await;
        let entry = tables
            .results
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Family::ResultLog, id))?;
        if entry.state != ResultEntryState::Pending {
            return Err(StoreError::Constraint(format!(
                "result entry {id} is already {}",
                entry.state
            )));
        }
        if state == ResultEntryState::Pending {
            return Err(StoreError::Constraint(
                "cannot settle an entry as pending".to_owned(),
            ));
        }
        entry.state = state;
        entry.settled_at = Some(Utc::now());
        let settled = entry.clone();
        drop(tables);
        self.notify(Family::ResultLog, ChangeKind::Update);
        Ok(settled)
    }

    // -- Change feed --------------------------------------------------------

    fn subscribe(&self) -> ChangeFeed {
        self.bus.subscribe()
    }
}
