//! The administrative write surface.
//!
//! [`AdminService`] validates form input, checks the authentication signal
//! and talks to the store. Result entry is delegated to the
//! [`StandingsAggregator`] so team counters are only ever touched there.

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use league_standings::{ApplyOutcome, StandingsAggregator};
use league_store::{EntityStore, StoreError};
use league_types::{
    Fixture, FixtureDraft, FixtureId, FixtureStatus, FixtureStatusChange, KnockoutDraft,
    KnockoutFixture, KnockoutFixtureId, Player, PlayerDraft, PlayerId, Team, TeamAggregate,
    TeamDraft, TeamId,
};

use crate::auth::Authenticator;
use crate::error::AdminError;
use crate::validate;

/// Authenticated create, update and delete for every record family.
pub struct AdminService<S, A> {
    store: Arc<S>,
    auth: Arc<A>,
    aggregator: StandingsAggregator<S>,
    default_kickoff: NaiveTime,
}

impl<S, A> std::fmt::Debug for AdminService<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminService")
            .field("default_kickoff", &self.default_kickoff)
            .finish_non_exhaustive()
    }
}

impl<S: EntityStore, A: Authenticator> AdminService<S, A> {
    /// Create a service. `default_kickoff` fills blank fixture times.
    pub fn new(store: Arc<S>, auth: Arc<A>, default_kickoff: NaiveTime) -> Self {
        let aggregator = StandingsAggregator::new(Arc::clone(&store));
        Self {
            store,
            auth,
            aggregator,
            default_kickoff,
        }
    }

    fn authorize(&self, action: &'static str) -> Result<(), AdminError> {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            tracing::warn!(action, "Rejected unauthenticated write");
            Err(AdminError::Unauthenticated)
        }
    }

    async fn team_exists(&self, id: TeamId) -> Result<(), AdminError> {
        self.store.get_team(id).await?;
        Ok(())
    }

    // -- Reads --------------------------------------------------------------

    /// Every team in list order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] if the store fails.
    pub async fn teams(&self) -> Result<Vec<Team>, AdminError> {
        Ok(self.store.list_teams().await?)
    }

    /// Every player in list order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] if the store fails.
    pub async fn players(&self) -> Result<Vec<Player>, AdminError> {
        Ok(self.store.list_players().await?)
    }

    /// Every group fixture in list order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] if the store fails.
    pub async fn fixtures(&self) -> Result<Vec<Fixture>, AdminError> {
        Ok(self.store.list_fixtures().await?)
    }

    /// Every knockout fixture in list order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] if the store fails.
    pub async fn knockouts(&self) -> Result<Vec<KnockoutFixture>, AdminError> {
        Ok(self.store.list_knockouts().await?)
    }

    // -- Teams --------------------------------------------------------------

    /// Create a team with zeroed standings.
    ///
    /// # Errors
    ///
    /// [`AdminError::Unauthenticated`], [`AdminError::InvalidInput`] for a
    /// blank name, or a store failure.
    pub async fn create_team(&self, draft: &TeamDraft) -> Result<Team, AdminError> {
        self.authorize("create_team")?;
        let team = Team {
            id: TeamId::new(),
            name: validate::required_name("team name", &draft.name)?,
            group: draft.group,
            logo_url: validate::optional_url(draft.logo_url.as_deref()),
            aggregate: TeamAggregate::ZERO,
            created_at: Utc::now(),
        };
        self.store.insert_team(&team).await?;
        tracing::info!(team_id = %team.id, name = %team.name, group = %team.group, "Team created");
        Ok(team)
    }

    /// Change a team's name, group and logo. Standings are untouched.
    ///
    /// # Errors
    ///
    /// As [`Self::create_team`], plus [`AdminError::NotFound`].
    pub async fn update_team(&self, id: TeamId, draft: &TeamDraft) -> Result<Team, AdminError> {
        self.authorize("update_team")?;
        let profile = TeamDraft {
            name: validate::required_name("team name", &draft.name)?,
            group: draft.group,
            logo_url: validate::optional_url(draft.logo_url.as_deref()),
        };
        let team = self.store.update_team_profile(id, &profile).await?;
        tracing::info!(team_id = %id, name = %team.name, "Team updated");
        Ok(team)
    }

    /// Delete a team that no player or group fixture references.
    ///
    /// Knockout slots holding the team are cleared.
    ///
    /// # Errors
    ///
    /// [`AdminError::InvalidInput`] while players or fixtures reference
    /// the team, [`AdminError::NotFound`], or a store failure.
    pub async fn delete_team(&self, id: TeamId) -> Result<(), AdminError> {
        self.authorize("delete_team")?;
        self.team_exists(id).await?;
        let players = self.store.list_players_for_team(id).await?;
        if !players.is_empty() {
            return Err(AdminError::InvalidInput(format!(
                "team {id} still has {} player(s)",
                players.len()
            )));
        }
        let fixtures = self.store.list_fixtures().await?;
        let referencing = fixtures.iter().filter(|f| f.involves(id)).count();
        if referencing > 0 {
            return Err(AdminError::InvalidInput(format!(
                "team {id} still appears in {referencing} fixture(s)"
            )));
        }
        self.store.delete_team(id).await?;
        tracing::info!(team_id = %id, "Team deleted");
        Ok(())
    }

    // -- Players ------------------------------------------------------------

    fn player_fields(draft: &PlayerDraft) -> Result<(String, u32, u32), AdminError> {
        Ok((
            validate::required_name("player name", &draft.name)?,
            validate::counter("goals", draft.goals)?,
            validate::counter("assists", draft.assists)?,
        ))
    }

    /// Create a player on an existing team.
    ///
    /// # Errors
    ///
    /// [`AdminError::Unauthenticated`], [`AdminError::InvalidInput`] for a
    /// blank name or out-of-range counter, [`AdminError::NotFound`] for an
    /// unknown team, or a store failure.
    pub async fn create_player(&self, draft: &PlayerDraft) -> Result<Player, AdminError> {
        self.authorize("create_player")?;
        let (name, goals, assists) = Self::player_fields(draft)?;
        self.team_exists(draft.team_id).await?;
        let player = Player {
            id: PlayerId::new(),
            team_id: draft.team_id,
            name,
            goals,
            assists,
            created_at: Utc::now(),
        };
        self.store.insert_player(&player).await?;
        tracing::info!(player_id = %player.id, team_id = %player.team_id, "Player created");
        Ok(player)
    }

    /// Overwrite a player's team, name and counters.
    ///
    /// # Errors
    ///
    /// As [`Self::create_player`], plus [`AdminError::NotFound`] for an
    /// unknown player.
    pub async fn update_player(
        &self,
        id: PlayerId,
        draft: &PlayerDraft,
    ) -> Result<Player, AdminError> {
        self.authorize("update_player")?;
        let (name, goals, assists) = Self::player_fields(draft)?;
        let existing = self.store.get_player(id).await?;
        self.team_exists(draft.team_id).await?;
        let player = Player {
            team_id: draft.team_id,
            name,
            goals,
            assists,
            ..existing
        };
        let updated = self.store.update_player(&player).await?;
        tracing::info!(player_id = %id, "Player updated");
        Ok(updated)
    }

    /// Delete a player.
    ///
    /// # Errors
    ///
    /// [`AdminError::Unauthenticated`], [`AdminError::NotFound`], or a
    /// store failure.
    pub async fn delete_player(&self, id: PlayerId) -> Result<(), AdminError> {
        self.authorize("delete_player")?;
        self.store.delete_player(id).await?;
        tracing::info!(player_id = %id, "Player deleted");
        Ok(())
    }

    // -- Fixtures -----------------------------------------------------------

    async fn check_pairing(&self, home: TeamId, away: TeamId) -> Result<(), AdminError> {
        validate::distinct(home, away)?;
        self.team_exists(home).await?;
        self.team_exists(away).await
    }

    /// Schedule a group fixture. A blank time uses the default kickoff.
    ///
    /// # Errors
    ///
    /// [`AdminError::Unauthenticated`], [`AdminError::InvalidInput`] when
    /// both sides are the same team, [`AdminError::NotFound`] for an
    /// unknown team, or a store failure.
    pub async fn create_fixture(&self, draft: &FixtureDraft) -> Result<Fixture, AdminError> {
        self.authorize("create_fixture")?;
        self.check_pairing(draft.home_team, draft.away_team).await?;
        let fixture = Fixture {
            id: FixtureId::new(),
            date: draft.date,
            time: draft.time.unwrap_or(self.default_kickoff),
            home_team: draft.home_team,
            away_team: draft.away_team,
            status: FixtureStatus::Scheduled,
            played: false,
            home_score: None,
            away_score: None,
            created_at: Utc::now(),
        };
        self.store.insert_fixture(&fixture).await?;
        tracing::info!(fixture_id = %fixture.id, date = %fixture.date, "Fixture created");
        Ok(fixture)
    }

    /// Load a fixture and refuse if it is played.
    async fn unplayed_fixture(&self, id: FixtureId) -> Result<Fixture, AdminError> {
        let fixture = self.store.get_fixture(id).await?;
        match fixture.scoreline() {
            Some(recorded) => Err(AdminError::RequiresReconciliation {
                fixture: id,
                recorded,
            }),
            None if fixture.played => Err(AdminError::InvalidInput(format!(
                "fixture {id} is played without a recorded score"
            ))),
            None => Ok(fixture),
        }
    }

    /// Map a store refusal to [`AdminError::RequiresReconciliation`] when
    /// the fixture turns out to be played. The store checks `played` in the
    /// same write as the change.
    async fn refused_write(&self, id: FixtureId, err: StoreError) -> AdminError {
        if !matches!(err, StoreError::Constraint(_)) {
            return err.into();
        }
        match self.store.get_fixture(id).await.map(|f| f.scoreline()) {
            Ok(Some(recorded)) => AdminError::RequiresReconciliation {
                fixture: id,
                recorded,
            },
            _ => err.into(),
        }
    }

    /// Change the date, time or teams of an unplayed fixture.
    ///
    /// # Errors
    ///
    /// As [`Self::create_fixture`], plus
    /// [`AdminError::RequiresReconciliation`] if the fixture is played.
    pub async fn reschedule_fixture(
        &self,
        id: FixtureId,
        draft: &FixtureDraft,
    ) -> Result<Fixture, AdminError> {
        self.authorize("reschedule_fixture")?;
        let existing = self.unplayed_fixture(id).await?;
        self.check_pairing(draft.home_team, draft.away_team).await?;
        let fixture = Fixture {
            date: draft.date,
            time: draft.time.unwrap_or(self.default_kickoff),
            home_team: draft.home_team,
            away_team: draft.away_team,
            ..existing
        };
        let updated = match self.store.update_fixture_schedule(&fixture).await {
            Ok(updated) => updated,
            Err(e) => return Err(self.refused_write(id, e).await),
        };
        tracing::info!(fixture_id = %id, date = %updated.date, "Fixture rescheduled");
        Ok(updated)
    }

    /// Move an unplayed fixture between scheduled and live.
    ///
    /// Finishing a fixture goes through [`Self::record_score`].
    ///
    /// # Errors
    ///
    /// [`AdminError::InvalidInput`] for `finished`,
    /// [`AdminError::RequiresReconciliation`] if the fixture is played, or
    /// as [`Self::delete_fixture`].
    pub async fn set_fixture_status(
        &self,
        id: FixtureId,
        change: FixtureStatusChange,
    ) -> Result<Fixture, AdminError> {
        self.authorize("set_fixture_status")?;
        if change.status == FixtureStatus::Finished {
            return Err(AdminError::InvalidInput(
                "record a score to finish a fixture".to_owned(),
            ));
        }
        let existing = self.unplayed_fixture(id).await?;
        let fixture = Fixture {
            status: change.status,
            ..existing
        };
        let updated = match self.store.update_fixture_schedule(&fixture).await {
            Ok(updated) => updated,
            Err(e) => return Err(self.refused_write(id, e).await),
        };
        tracing::info!(fixture_id = %id, status = %updated.status, "Fixture status changed");
        Ok(updated)
    }

    /// Record the final score of a fixture and update the standings.
    ///
    /// Resubmitting the stored score is a no-op reported as
    /// [`ApplyOutcome::AlreadyApplied`], unless its result entry is still
    /// pending, which is an error until recovery runs.
    ///
    /// # Errors
    ///
    /// [`AdminError::Unauthenticated`] or [`AdminError::Standings`].
    pub async fn record_score(
        &self,
        id: FixtureId,
        home_score: Option<i64>,
        away_score: Option<i64>,
    ) -> Result<ApplyOutcome, AdminError> {
        self.authorize("record_score")?;
        let outcome = self.aggregator.apply_form(id, home_score, away_score).await?;
        Ok(outcome)
    }

    /// Delete an unplayed fixture.
    ///
    /// # Errors
    ///
    /// [`AdminError::Unauthenticated`], [`AdminError::NotFound`],
    /// [`AdminError::RequiresReconciliation`] if the fixture is played, or
    /// a store failure.
    pub async fn delete_fixture(&self, id: FixtureId) -> Result<(), AdminError> {
        self.authorize("delete_fixture")?;
        if let Err(e) = self.store.delete_fixture(id).await {
            return Err(self.refused_write(id, e).await);
        }
        tracing::info!(fixture_id = %id, "Fixture deleted");
        Ok(())
    }

    // -- Knockout fixtures --------------------------------------------------

    async fn knockout_fields(&self, draft: &KnockoutDraft) -> Result<(u8, NaiveTime), AdminError> {
        let match_number = validate::match_number(draft.stage, draft.match_number)?;
        validate::distinct_slots(draft.team1, draft.team2)?;
        for team in [draft.team1, draft.team2].into_iter().flatten() {
            self.team_exists(team).await?;
        }
        Ok((match_number, draft.time.unwrap_or(self.default_kickoff)))
    }

    /// Create a knockout fixture. Slots may be left empty.
    ///
    /// # Errors
    ///
    /// [`AdminError::Unauthenticated`], [`AdminError::InvalidInput`] for a
    /// match number outside the stage or equal slots,
    /// [`AdminError::NotFound`] for an unknown team, or a store failure.
    pub async fn create_knockout(
        &self,
        draft: &KnockoutDraft,
    ) -> Result<KnockoutFixture, AdminError> {
        self.authorize("create_knockout")?;
        let (match_number, time) = self.knockout_fields(draft).await?;
        let fixture = KnockoutFixture {
            id: KnockoutFixtureId::new(),
            stage: draft.stage,
            match_number,
            team1: draft.team1,
            team2: draft.team2,
            date: draft.date,
            time,
            status: draft.status,
            created_at: Utc::now(),
        };
        self.store.insert_knockout(&fixture).await?;
        tracing::info!(
            knockout_id = %fixture.id,
            stage = %fixture.stage,
            match_number = fixture.match_number,
            "Knockout fixture created"
        );
        Ok(fixture)
    }

    /// Overwrite a knockout fixture.
    ///
    /// # Errors
    ///
    /// As [`Self::create_knockout`], plus [`AdminError::NotFound`] for an
    /// unknown fixture.
    pub async fn update_knockout(
        &self,
        id: KnockoutFixtureId,
        draft: &KnockoutDraft,
    ) -> Result<KnockoutFixture, AdminError> {
        self.authorize("update_knockout")?;
        let (match_number, time) = self.knockout_fields(draft).await?;
        let existing = self.store.get_knockout(id).await?;
        let fixture = KnockoutFixture {
            stage: draft.stage,
            match_number,
            team1: draft.team1,
            team2: draft.team2,
            date: draft.date,
            time,
            status: draft.status,
            ..existing
        };
        let updated = self.store.update_knockout(&fixture).await?;
        tracing::info!(knockout_id = %id, stage = %updated.stage, "Knockout fixture updated");
        Ok(updated)
    }

    /// Delete a knockout fixture.
    ///
    /// # Errors
    ///
    /// [`AdminError::Unauthenticated`], [`AdminError::NotFound`], or a
    /// store failure.
    pub async fn delete_knockout(&self, id: KnockoutFixtureId) -> Result<(), AdminError> {
        self.authorize("delete_knockout")?;
        self.store.delete_knockout(id).await?;
        tracing::info!(knockout_id = %id, "Knockout fixture deleted");
        Ok(())
    }
}
