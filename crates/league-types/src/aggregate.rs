//! Team aggregates and the arithmetic that derives them from scorelines.
//!
//! A [`Scoreline`] is classified into an [`Outcome`], which yields one
//! [`AggregateDelta`] per side. Deltas are applied to a [`TeamAggregate`]
//! with checked arithmetic: a counter that would overflow (or, when
//! reverting, underflow) produces an [`AggregateError`] and leaves the
//! aggregate untouched.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Side;

/// Errors produced by scoreline validation and aggregate arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// A score was not supplied.
    #[error("{side} score is missing")]
    MissingScore {
        /// Which side's score was absent.
        side: Side,
    },

    /// A score was negative or did not fit the counter type.
    #[error("{side} score {value} is out of range")]
    ScoreOutOfRange {
        /// Which side's score was rejected.
        side: Side,
        /// The rejected value.
        value: i64,
    },

    /// Applying a delta would overflow a counter.
    #[error("counter overflow applying result")]
    Overflow,

    /// Reverting a delta would take a counter below zero.
    #[error("counter underflow reverting result")]
    Underflow,
}

// ---------------------------------------------------------------------------
// Scoreline and outcome
// ---------------------------------------------------------------------------

/// A validated final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Scoreline {
    /// Goals scored by the home team.
    pub home: u32,
    /// Goals scored by the away team.
    pub away: u32,
}

impl Scoreline {
    /// Build a scoreline from already-unsigned scores.
    pub const fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Validate raw integer scores.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::ScoreOutOfRange`] for negative scores or
    /// scores that do not fit a `u32`.
    pub fn from_raw(home: i64, away: i64) -> Result<Self, AggregateError> {
        Ok(Self {
            home: to_score(Side::Home, home)?,
            away: to_score(Side::Away, away)?,
        })
    }

    /// Validate scores as they arrive from a form, where either may be blank.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::MissingScore`] if a score is absent, or
    /// [`AggregateError::ScoreOutOfRange`] as for [`Scoreline::from_raw`].
    pub fn from_form(home: Option<i64>, away: Option<i64>) -> Result<Self, AggregateError> {
        let home = home.ok_or(AggregateError::MissingScore { side: Side::Home })?;
        let away = away.ok_or(AggregateError::MissingScore { side: Side::Away })?;
        Self::from_raw(home, away)
    }

    /// Classify this scoreline.
    pub fn outcome(self) -> Outcome {
        match self.home.cmp(&self.away) {
            core::cmp::Ordering::Greater => Outcome::HomeWin,
            core::cmp::Ordering::Less => Outcome::AwayWin,
            core::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// Goals scored by the given side.
    pub const fn goals_for(self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    /// Goals conceded by the given side.
    pub const fn goals_against(self, side: Side) -> u32 {
        match side {
            Side::Home => self.away,
            Side::Away => self.home,
        }
    }

    /// The per-team delta for one side of this result.
    pub fn delta_for(self, side: Side) -> AggregateDelta {
        let outcome = Outcome::of(self);
        let (wins, draws, losses) = if outcome == Outcome::Draw {
            (0, 1, 0)
        } else if outcome.won_by(side) {
            (1, 0, 0)
        } else {
            (0, 0, 1)
        };
        AggregateDelta {
            wins,
            draws,
            losses,
            goals_for: self.goals_for(side),
            goals_against: self.goals_against(side),
        }
    }

    /// Deltas for both sides, `(home, away)`.
    pub fn deltas(self) -> (AggregateDelta, AggregateDelta) {
        (self.delta_for(Side::Home), self.delta_for(Side::Away))
    }
}

impl core::fmt::Display for Scoreline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

fn to_score(side: Side, value: i64) -> Result<u32, AggregateError> {
    u32::try_from(value).map_err(|_err| AggregateError::ScoreOutOfRange { side, value })
}

/// Which outcome category a scoreline falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Outcome {
    /// Home scored more.
    HomeWin,
    /// Away scored more.
    AwayWin,
    /// Level scores.
    Draw,
}

impl Outcome {
    /// Classify a scoreline.
    pub fn of(scoreline: Scoreline) -> Self {
        scoreline.outcome()
    }

    /// Whether the given side won.
    pub const fn won_by(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::HomeWin, Side::Home) | (Self::AwayWin, Side::Away)
        )
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The increment one result contributes to one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AggregateDelta {
    /// 1 if the team won.
    pub wins: u32,
    /// 1 if the match was drawn.
    pub draws: u32,
    /// 1 if the team lost.
    pub losses: u32,
    /// Goals the team scored.
    pub goals_for: u32,
    /// Goals the team conceded.
    pub goals_against: u32,
}

/// The derived counters stored on a team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamAggregate {
    /// Matches won.
    pub wins: u32,
    /// Matches drawn.
    pub draws: u32,
    /// Matches lost.
    pub losses: u32,
    /// Cumulative goals scored.
    pub goals_for: u32,
    /// Cumulative goals conceded.
    pub goals_against: u32,
}

impl TeamAggregate {
    /// An aggregate with every counter at zero.
    pub const ZERO: Self = Self {
        wins: 0,
        draws: 0,
        losses: 0,
        goals_for: 0,
        goals_against: 0,
    };

    /// Matches played (`wins + draws + losses`), widened so it cannot overflow.
    pub fn played(&self) -> u64 {
        u64::from(self.wins)
            .saturating_add(u64::from(self.draws))
            .saturating_add(u64::from(self.losses))
    }

    /// Goals for minus goals against.
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for).saturating_sub(i64::from(self.goals_against))
    }

    /// Return this aggregate with `delta` added.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Overflow`] if any counter would overflow.
    pub fn apply(&self, delta: &AggregateDelta) -> Result<Self, AggregateError> {
        let add = |a: u32, b: u32| a.checked_add(b).ok_or(AggregateError::Overflow);
        Ok(Self {
            wins: add(self.wins, delta.wins)?,
            draws: add(self.draws, delta.draws)?,
            losses: add(self.losses, delta.losses)?,
            goals_for: add(self.goals_for, delta.goals_for)?,
            goals_against: add(self.goals_against, delta.goals_against)?,
        })
    }

    /// Return this aggregate with `delta` removed.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Underflow`] if any counter would go negative.
    pub fn revert(&self, delta: &AggregateDelta) -> Result<Self, AggregateError> {
        let sub = |a: u32, b: u32| a.checked_sub(b).ok_or(AggregateError::Underflow);
        Ok(Self {
            wins: sub(self.wins, delta.wins)?,
            draws: sub(self.draws, delta.draws)?,
            losses: sub(self.losses, delta.losses)?,
            goals_for: sub(self.goals_for, delta.goals_for)?,
            goals_against: sub(self.goals_against, delta.goals_against)?,
        })
    }
}
