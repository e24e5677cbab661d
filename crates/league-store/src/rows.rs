//! Row types for the `PostgreSQL` tables and their conversion into records.
//!
//! Counters are stored as `BIGINT` with range checks in the schema; enums
//! are stored as their `as_str` text. A value that does not fit its record
//! type surfaces as [`StoreError::Decode`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use league_types::{
    Family, Fixture, FixtureId, KnockoutFixture, KnockoutFixtureId, Player, PlayerId,
    ResultEntry, ResultEntryId, Scoreline, Team, TeamAggregate, TeamId,
};
use uuid::Uuid;

use crate::error::StoreError;

/// Column list matching [`TeamRow`].
pub(crate) const TEAM_COLUMNS: &str =
    "id, name, group_name, logo_url, wins, draws, losses, goals_for, goals_against, created_at";

/// Column list matching [`PlayerRow`].
pub(crate) const PLAYER_COLUMNS: &str = "id, team_id, name, goals, assists, created_at";

/// Column list matching [`FixtureRow`].
pub(crate) const FIXTURE_COLUMNS: &str = "id, date, time, home_team_id, away_team_id, status, played, home_score, away_score, created_at";

/// Column list matching [`KnockoutRow`].
pub(crate) const KNOCKOUT_COLUMNS: &str =
    "id, stage, match_number, team1_id, team2_id, date, time, status, created_at";

/// Column list matching [`ResultEntryRow`].
pub(crate) const RESULT_COLUMNS: &str = "id, fixture_id, home_team_id, away_team_id, home_score, away_score, home_applied, away_applied, state, created_at, settled_at";

fn counter(family: Family, column: &str, value: i64) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_err| StoreError::Decode {
        family,
        message: format!("{column} value {value} is out of range"),
    })
}

fn parsed<T>(family: Family, value: &str) -> Result<T, StoreError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value.parse().map_err(|e: T::Err| StoreError::Decode {
        family,
        message: e.to_string(),
    })
}

/// Widen a counter for binding to a `BIGINT` column.
pub(crate) fn to_db(value: u32) -> i64 {
    i64::from(value)
}

/// A row from the `teams` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamRow {
    /// Team UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Group label.
    pub group_name: String,
    /// Logo URL.
    pub logo_url: Option<String>,
    /// Matches won.
    pub wins: i64,
    /// Matches drawn.
    pub draws: i64,
    /// Matches lost.
    pub losses: i64,
    /// Goals scored.
    pub goals_for: i64,
    /// Goals conceded.
    pub goals_against: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TeamRow> for Team {
    type Error = StoreError;

    fn try_from(row: TeamRow) -> Result<Self, Self::Error> {
        let family = Family::Teams;
        Ok(Self {
            id: TeamId(row.id),
            name: row.name,
            group: parsed(family, &row.group_name)?,
            logo_url: row.logo_url,
            aggregate: TeamAggregate {
                wins: counter(family, "wins", row.wins)?,
                draws: counter(family, "draws", row.draws)?,
                losses: counter(family, "losses", row.losses)?,
                goals_for: counter(family, "goals_for", row.goals_for)?,
                goals_against: counter(family, "goals_against", row.goals_against)?,
            },
            created_at: row.created_at,
        })
    }
}

/// A row from the `players` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Player UUID.
    pub id: Uuid,
    /// Owning team UUID.
    pub team_id: Uuid,
    /// Display name.
    pub name: String,
    /// Goals scored.
    pub goals: i64,
    /// Assists made.
    pub assists: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = StoreError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PlayerId(row.id),
            team_id: TeamId(row.team_id),
            name: row.name,
            goals: counter(Family::Players, "goals", row.goals)?,
            assists: counter(Family::Players, "assists", row.assists)?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `matches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FixtureRow {
    /// Fixture UUID.
    pub id: Uuid,
    /// Match day.
    pub date: NaiveDate,
    /// Kickoff time.
    pub time: NaiveTime,
    /// Home team UUID.
    pub home_team_id: Uuid,
    /// Away team UUID.
    pub away_team_id: Uuid,
    /// Status text.
    pub status: String,
    /// Played flag.
    pub played: bool,
    /// Home score.
    pub home_score: Option<i64>,
    /// Away score.
    pub away_score: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FixtureRow> for Fixture {
    type Error = StoreError;

    fn try_from(row: FixtureRow) -> Result<Self, Self::Error> {
        let family = Family::Fixtures;
        Ok(Self {
            id: FixtureId(row.id),
            date: row.date,
            time: row.time,
            home_team: TeamId(row.home_team_id),
            away_team: TeamId(row.away_team_id),
            status: parsed(family, &row.status)?,
            played: row.played,
            home_score: row
                .home_score
                .map(|v| counter(family, "home_score", v))
                .transpose()?,
            away_score: row
                .away_score
                .map(|v| counter(family, "away_score", v))
                .transpose()?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `elimination_matches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KnockoutRow {
    /// Knockout fixture UUID.
    pub id: Uuid,
    /// Stage text.
    pub stage: String,
    /// Position within the stage.
    pub match_number: i16,
    /// First team UUID.
    pub team1_id: Option<Uuid>,
    /// Second team UUID.
    pub team2_id: Option<Uuid>,
    /// Match day.
    pub date: NaiveDate,
    /// Kickoff time.
    pub time: NaiveTime,
    /// Status text.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<KnockoutRow> for KnockoutFixture {
    type Error = StoreError;

    fn try_from(row: KnockoutRow) -> Result<Self, Self::Error> {
        let family = Family::KnockoutFixtures;
        let match_number = u8::try_from(row.match_number).map_err(|_err| StoreError::Decode {
            family,
            message: format!("match_number value {} is out of range", row.match_number),
        })?;
        Ok(Self {
            id: KnockoutFixtureId(row.id),
            stage: parsed(family, &row.stage)?,
            match_number,
            team1: row.team1_id.map(TeamId),
            team2: row.team2_id.map(TeamId),
            date: row.date,
            time: row.time,
            status: parsed(family, &row.status)?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `result_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResultEntryRow {
    /// Entry UUID.
    pub id: Uuid,
    /// Fixture UUID.
    pub fixture_id: Uuid,
    /// Home team UUID.
    pub home_team_id: Uuid,
    /// Away team UUID.
    pub away_team_id: Uuid,
    /// Submitted home score.
    pub home_score: i64,
    /// Submitted away score.
    pub away_score: i64,
    /// Home delta applied.
    pub home_applied: bool,
    /// Away delta applied.
    pub away_applied: bool,
    /// State text.
    pub state: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Settlement timestamp.
    pub settled_at: Option<DateTime<Utc>>,
}

impl TryFrom<ResultEntryRow> for ResultEntry {
    type Error = StoreError;

    fn try_from(row: ResultEntryRow) -> Result<Self, Self::Error> {
        let family = Family::ResultLog;
        Ok(Self {
            id: ResultEntryId(row.id),
            fixture_id: FixtureId(row.fixture_id),
            home_team: TeamId(row.home_team_id),
            away_team: TeamId(row.away_team_id),
            scoreline: Scoreline::new(
                counter(family, "home_score", row.home_score)?,
                counter(family, "away_score", row.away_score)?,
            ),
            home_applied: row.home_applied,
            away_applied: row.away_applied,
            state: parsed(family, &row.state)?,
            created_at: row.created_at,
            settled_at: row.settled_at,
        })
    }
}

/// Convert a batch of rows, failing on the first bad one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}
