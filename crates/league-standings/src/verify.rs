//! Standings verification: stored aggregates against a replay of every
//! played fixture.
//!
//! Team counters are denormalized, so they can drift from the fixtures
//! they summarize (a crash between the two steps of a result commit, a
//! manual database edit, a deleted played fixture). Two properties must
//! hold for every team T:
//!
//! ```text
//! T.wins + T.draws + T.losses == |played fixtures involving T|
//! T.goals_for     == sum(goals T scored in those fixtures)
//! T.goals_against == sum(goals T conceded in those fixtures)
//! ```
//!
//! League-wide this also means total wins equal total losses and total
//! goals for equal total goals against.
//!
//! A violation produces a [`StandingsDrift`] listing every affected team.

use std::collections::BTreeMap;

use league_types::{Fixture, Side, Team, TeamAggregate, TeamId};
use serde::Serialize;

use crate::error::StandingsError;

/// The result of verifying the stored standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StandingsCheck {
    /// Every team's counters match the played fixtures.
    Consistent,
    /// At least one team's counters do not match.
    Drift(StandingsDrift),
}

impl StandingsCheck {
    /// Whether the check passed.
    pub const fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent)
    }
}

/// Every team whose stored counters disagree with the replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsDrift {
    /// Drifted teams, in team id order.
    pub teams: Vec<TeamDrift>,
    /// Human-readable summary.
    pub message: String,
}

/// One team's stored and expected counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamDrift {
    /// The team.
    pub team: TeamId,
    /// Its display name.
    pub name: String,
    /// What the store holds.
    pub stored: TeamAggregate,
    /// What the played fixtures imply.
    pub expected: TeamAggregate,
}

impl TeamDrift {
    /// Whether matches played still equals the number of played fixtures.
    pub fn conservation_holds(&self) -> bool {
        self.stored.played() == self.expected.played()
    }

    /// Whether both goal totals match.
    pub const fn goals_hold(&self) -> bool {
        self.stored.goals_for == self.expected.goals_for
            && self.stored.goals_against == self.expected.goals_against
    }
}

/// Replay every played fixture from zero.
///
/// Every team in `teams` gets an entry, zero if it has not played.
/// Fixtures referencing unknown teams are skipped.
///
/// # Errors
///
/// Returns [`StandingsError::Overflow`] if a replayed counter would leave
/// its range.
pub fn recompute(
    teams: &[Team],
    fixtures: &[Fixture],
) -> Result<BTreeMap<TeamId, TeamAggregate>, StandingsError> {
    let mut totals: BTreeMap<TeamId, TeamAggregate> = teams
        .iter()
        .map(|t| (t.id, TeamAggregate::ZERO))
        .collect();

    for fixture in fixtures {
        let Some(scoreline) = fixture.scoreline() else {
            continue;
        };
        for side in [Side::Home, Side::Away] {
            let team = fixture.team(side);
            match totals.get_mut(&team) {
                Some(total) => *total = total.apply(&scoreline.delta_for(side))?,
                None => tracing::warn!(
                    fixture = %fixture.id,
                    team = %team,
                    "Played fixture references an unknown team"
                ),
            }
        }
    }

    Ok(totals)
}

/// Compare stored counters with a replay of the played fixtures.
///
/// # Errors
///
/// Returns [`StandingsError::Overflow`] if the replay overflows.
pub fn verify(teams: &[Team], fixtures: &[Fixture]) -> Result<StandingsCheck, StandingsError> {
    let expected = recompute(teams, fixtures)?;

    let mut drifted: Vec<TeamDrift> = teams
        .iter()
        .filter_map(|team| {
            let want = expected.get(&team.id).copied().unwrap_or_default();
            (team.aggregate != want).then(|| TeamDrift {
                team: team.id,
                name: team.name.clone(),
                stored: team.aggregate,
                expected: want,
            })
        })
        .collect();

    if drifted.is_empty() {
        return Ok(StandingsCheck::Consistent);
    }

    drifted.sort_by_key(|d| d.team);
    let count = drifted.len();
    let broken_conservation = drifted.iter().filter(|d| !d.conservation_holds()).count();
    let balance = if league_balanced(teams) {
        "league totals balance"
    } else {
        "league totals do not balance"
    };
    Ok(StandingsCheck::Drift(StandingsDrift {
        teams: drifted,
        message: format!(
            "STANDINGS_DRIFT: {count} team(s) disagree with played fixtures \
             ({broken_conservation} with a wrong match count, {balance})"
        ),
    }))
}

/// Whether total wins equal total losses and total goals for equal total
/// goals against across the stored teams.
pub fn league_balanced(teams: &[Team]) -> bool {
    let sum = |f: fn(&TeamAggregate) -> u32| -> u64 {
        teams
            .iter()
            .fold(0u64, |acc, t| acc.saturating_add(u64::from(f(&t.aggregate))))
    };
    sum(|a| a.wins) == sum(|a| a.losses) && sum(|a| a.goals_for) == sum(|a| a.goals_against)
}
