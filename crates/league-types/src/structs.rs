//! Core record structs for the four dashboard families and the result log.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregate::{AggregateDelta, Scoreline, TeamAggregate};
use crate::enums::{FixtureStatus, Group, KnockoutStage, ResultEntryState, Side};
use crate::ids::{FixtureId, KnockoutFixtureId, PlayerId, ResultEntryId, TeamId};

/// Kickoff time used when a fixture form leaves the time blank.
pub const DEFAULT_KICKOFF: NaiveTime = match NaiveTime::from_hms_opt(15, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// A team registered in the league.
///
/// The `aggregate` counters belong to the standings engine. Profile edits
/// (name, group, logo) never write them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Team {
    /// Unique team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Group-stage pool.
    #[serde(rename = "group_name")]
    pub group: Group,
    /// Logo image URL, if one was uploaded.
    pub logo_url: Option<String>,
    /// Derived standings counters.
    #[serde(flatten)]
    pub aggregate: TeamAggregate,
    /// When the team was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player registered to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Unique player identifier.
    pub id: PlayerId,
    /// The team the player belongs to.
    pub team_id: TeamId,
    /// Display name.
    pub name: String,
    /// Goals scored.
    pub goals: u32,
    /// Assists made.
    pub assists: u32,
    /// When the player was created.
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Goals plus assists, widened so it cannot overflow.
    pub fn total_contributions(&self) -> u64 {
        u64::from(self.goals).saturating_add(u64::from(self.assists))
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A group-stage fixture between two distinct teams.
///
/// `played == true` implies `status == Finished` and both scores present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Fixture {
    /// Unique fixture identifier.
    pub id: FixtureId,
    /// Match day.
    pub date: NaiveDate,
    /// Kickoff time.
    pub time: NaiveTime,
    /// Home team.
    pub home_team: TeamId,
    /// Away team.
    pub away_team: TeamId,
    /// Lifecycle status.
    pub status: FixtureStatus,
    /// Whether the result is final and has been applied to the standings.
    pub played: bool,
    /// Home score, meaningful only once played.
    pub home_score: Option<u32>,
    /// Away score, meaningful only once played.
    pub away_score: Option<u32>,
    /// When the fixture was created.
    pub created_at: DateTime<Utc>,
}

impl Fixture {
    /// The recorded scoreline, if the fixture has been played.
    pub fn scoreline(&self) -> Option<Scoreline> {
        if !self.played {
            return None;
        }
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some(Scoreline::new(home, away)),
            _ => None,
        }
    }

    /// The team on the given side.
    pub const fn team(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team,
            Side::Away => self.away_team,
        }
    }

    /// Whether the given team plays in this fixture.
    pub fn involves(&self, team: TeamId) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Kickoff as a single sortable value.
    pub fn kickoff(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.time)
    }
}

// ---------------------------------------------------------------------------
// Knockout fixture
// ---------------------------------------------------------------------------

/// A single-elimination bracket match. Never feeds the standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct KnockoutFixture {
    /// Unique knockout fixture identifier.
    pub id: KnockoutFixtureId,
    /// Bracket round.
    pub stage: KnockoutStage,
    /// Position within the round (`1..=stage.max_match_number()`).
    pub match_number: u8,
    /// First team, unset until the earlier round is decided.
    #[serde(rename = "team1_id")]
    pub team1: Option<TeamId>,
    /// Second team, unset until the earlier round is decided.
    #[serde(rename = "team2_id")]
    pub team2: Option<TeamId>,
    /// Match day.
    pub date: NaiveDate,
    /// Kickoff time.
    pub time: NaiveTime,
    /// Lifecycle status.
    pub status: FixtureStatus,
    /// When the fixture was created.
    pub created_at: DateTime<Utc>,
}

impl KnockoutFixture {
    /// Kickoff as a single sortable value.
    pub fn kickoff(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.time)
    }
}

// ---------------------------------------------------------------------------
// Result log
// ---------------------------------------------------------------------------

/// One application of a fixture result, recorded before the fixture
/// transition so a half-applied result can be finished or rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResultEntry {
    /// Unique entry identifier.
    pub id: ResultEntryId,
    /// The fixture being settled.
    pub fixture_id: FixtureId,
    /// Home team at the time of recording.
    pub home_team: TeamId,
    /// Away team at the time of recording.
    pub away_team: TeamId,
    /// The submitted scoreline.
    pub scoreline: Scoreline,
    /// Whether the home delta has been applied.
    pub home_applied: bool,
    /// Whether the away delta has been applied.
    pub away_applied: bool,
    /// Settlement state.
    pub state: ResultEntryState,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// When the entry left the pending state.
    pub settled_at: Option<DateTime<Utc>>,
}

impl ResultEntry {
    /// Start a pending entry for the given fixture and scoreline.
    pub fn pending(fixture: &Fixture, scoreline: Scoreline) -> Self {
        Self {
            id: ResultEntryId::new(),
            fixture_id: fixture.id,
            home_team: fixture.home_team,
            away_team: fixture.away_team,
            scoreline,
            home_applied: false,
            away_applied: false,
            state: ResultEntryState::Pending,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    /// The team on the given side.
    pub const fn team(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team,
            Side::Away => self.away_team,
        }
    }

    /// The delta this entry contributes to the given side.
    pub fn delta(&self, side: Side) -> AggregateDelta {
        self.scoreline.delta_for(side)
    }

    /// Whether the given side has been applied.
    pub const fn is_applied(&self, side: Side) -> bool {
        match side {
            Side::Home => self.home_applied,
            Side::Away => self.away_applied,
        }
    }

    /// Record whether the given side is applied.
    pub const fn set_applied(&mut self, side: Side, applied: bool) {
        match side {
            Side::Home => self.home_applied = applied,
            Side::Away => self.away_applied = applied,
        }
    }
}
