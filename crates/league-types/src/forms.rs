//! Form payloads submitted by the administrative dashboard.
//!
//! These carry raw input exactly as the forms produce it (untrimmed names,
//! signed counters, optional times). Validation happens in the admin
//! service, which turns a draft into a stored record or an error.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{FixtureStatus, Group, KnockoutStage};
use crate::ids::TeamId;

/// Team create/edit form. Counters are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamDraft {
    /// Display name.
    pub name: String,
    /// Group-stage pool.
    #[serde(rename = "group_name")]
    pub group: Group,
    /// Logo image URL (blank means none).
    pub logo_url: Option<String>,
}

/// Player create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerDraft {
    /// Owning team.
    pub team_id: TeamId,
    /// Display name.
    pub name: String,
    /// Goals scored.
    pub goals: i64,
    /// Assists made.
    pub assists: i64,
}

/// Fixture create/schedule form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FixtureDraft {
    /// Match day.
    pub date: NaiveDate,
    /// Kickoff time; blank falls back to the configured default.
    pub time: Option<NaiveTime>,
    /// Home team.
    pub home_team: TeamId,
    /// Away team.
    pub away_team: TeamId,
}

/// Status change for an unplayed fixture. `Finished` is only reachable by
/// recording a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FixtureStatusChange {
    /// The requested status.
    pub status: FixtureStatus,
}

/// Knockout fixture create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct KnockoutDraft {
    /// Bracket round.
    pub stage: KnockoutStage,
    /// Position within the round. Ignored for the final.
    pub match_number: i64,
    /// First team, if known.
    #[serde(rename = "team1_id")]
    pub team1: Option<TeamId>,
    /// Second team, if known.
    #[serde(rename = "team2_id")]
    pub team2: Option<TeamId>,
    /// Match day.
    pub date: NaiveDate,
    /// Kickoff time; blank falls back to the configured default.
    pub time: Option<NaiveTime>,
    /// Lifecycle status.
    pub status: FixtureStatus,
}
