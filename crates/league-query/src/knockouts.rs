//! The knockout bracket list.

use core::cmp::Ordering;

use league_types::{FixtureStatus, KnockoutFixture, KnockoutStage};
use serde::{Deserialize, Serialize};

use crate::join::{TeamDirectory, TeamLabel};
use crate::locale::DateLocale;
use crate::pipeline::{Filter, Query, Searchable, Selection, SortKey, SortOrder};

/// A knockout fixture with its team slots resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutView {
    /// The stored knockout fixture.
    #[serde(flatten)]
    pub fixture: KnockoutFixture,
    /// First team, if assigned and known.
    pub team1: Option<TeamLabel>,
    /// Second team, if assigned and known.
    pub team2: Option<TeamLabel>,
}

/// Join knockout fixtures with their teams, preserving input order.
pub fn join_knockouts(fixtures: &[KnockoutFixture], teams: &TeamDirectory) -> Vec<KnockoutView> {
    fixtures
        .iter()
        .map(|fixture| KnockoutView {
            team1: teams.label_of(fixture.team1),
            team2: teams.label_of(fixture.team2),
            fixture: fixture.clone(),
        })
        .collect()
}

/// Human label of a stage, as the bracket shows it.
pub const fn stage_label(stage: KnockoutStage) -> &'static str {
    match stage {
        KnockoutStage::QuarterFinal => "Quarter-final",
        KnockoutStage::SemiFinal => "Semi-final",
        KnockoutStage::Final => "Final",
    }
}

impl Searchable for KnockoutView {
    fn projections(&self, _locale: DateLocale) -> Vec<String> {
        let mut out: Vec<String> = [&self.team1, &self.team2]
            .into_iter()
            .flatten()
            .map(|label| label.name.clone())
            .collect();
        out.push(stage_label(self.fixture.stage).to_owned());
        out
    }
}

/// Knockout filter clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockoutFilter {
    /// Bracket round.
    pub stage: Selection<KnockoutStage>,
    /// Lifecycle status.
    pub status: Selection<FixtureStatus>,
}

impl Filter<KnockoutView> for KnockoutFilter {
    fn admits(&self, item: &KnockoutView) -> bool {
        self.stage.admits(&item.fixture.stage) && self.status.admits(&item.fixture.status)
    }
}

/// Knockout sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnockoutSort {
    /// Stage (quarter, semi, final), then match number.
    Bracket,
    /// Date, then kickoff time.
    Kickoff,
}

impl SortKey<KnockoutView> for KnockoutSort {
    fn compare(self, a: &KnockoutView, b: &KnockoutView) -> Ordering {
        let (a, b) = (&a.fixture, &b.fixture);
        match self {
            Self::Bracket => (a.stage, a.match_number).cmp(&(b.stage, b.match_number)),
            Self::Kickoff => a.kickoff().cmp(&b.kickoff()),
        }
    }
}

/// Parameters of the knockout list.
pub type KnockoutQuery = Query<KnockoutFilter, KnockoutSort>;

/// The query the bracket opens with: in bracket order.
pub fn bracket_order() -> KnockoutQuery {
    KnockoutQuery::sorted(KnockoutSort::Bracket, SortOrder::Ascending)
}
