//! The fixture list: filter by status and group, search by team names and
//! date, sort by kickoff or home team.

use core::cmp::Ordering;

use league_types::{Fixture, FixtureStatus, Group};
use serde::{Deserialize, Serialize};

use crate::join::{TeamDirectory, TeamLabel};
use crate::locale::DateLocale;
use crate::pipeline::{Filter, Query, Searchable, Selection, SortKey, compare_folded};

/// A fixture with both teams' names and groups resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureView {
    /// The stored fixture.
    #[serde(flatten)]
    pub fixture: Fixture,
    /// Home team, if known.
    pub home: Option<TeamLabel>,
    /// Away team, if known.
    pub away: Option<TeamLabel>,
}

impl FixtureView {
    fn home_name(&self) -> &str {
        self.home.as_ref().map_or("", |l| l.name.as_str())
    }
}

/// Join fixtures with their teams, preserving input order.
pub fn join_fixtures(fixtures: &[Fixture], teams: &TeamDirectory) -> Vec<FixtureView> {
    fixtures
        .iter()
        .map(|fixture| FixtureView {
            home: teams.label_of(Some(fixture.home_team)),
            away: teams.label_of(Some(fixture.away_team)),
            fixture: fixture.clone(),
        })
        .collect()
}

impl Searchable for FixtureView {
    fn projections(&self, locale: DateLocale) -> Vec<String> {
        let mut out: Vec<String> = [&self.home, &self.away]
            .into_iter()
            .flatten()
            .map(|label| label.name.clone())
            .collect();
        out.extend(locale.date_projections(self.fixture.date));
        out
    }
}

/// Which fixtures to show by lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum StatusFilter {
    /// Every fixture.
    #[default]
    All,
    /// Finished fixtures.
    Played,
    /// Scheduled fixtures.
    Upcoming,
    /// Fixtures in exactly this status.
    Exact(FixtureStatus),
}

impl StatusFilter {
    /// Whether a fixture in `status` passes.
    pub fn admits(self, status: FixtureStatus) -> bool {
        match self {
            Self::All => true,
            Self::Played => status == FixtureStatus::Finished,
            Self::Upcoming => status == FixtureStatus::Scheduled,
            Self::Exact(wanted) => status == wanted,
        }
    }
}

/// Fixture filter clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureFilter {
    /// Lifecycle filter.
    pub status: StatusFilter,
    /// Group of either team.
    pub group: Selection<Group>,
}

impl Filter<FixtureView> for FixtureFilter {
    fn admits(&self, item: &FixtureView) -> bool {
        self.status.admits(item.fixture.status)
            && self.group.admits_any([
                item.home.as_ref().map(|l| &l.group),
                item.away.as_ref().map(|l| &l.group),
            ])
    }
}

/// Fixture sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureSort {
    /// Date, then kickoff time.
    Kickoff,
    /// Home team name, case-insensitive.
    HomeTeam,
}

impl SortKey<FixtureView> for FixtureSort {
    fn compare(self, a: &FixtureView, b: &FixtureView) -> Ordering {
        match self {
            Self::Kickoff => a.fixture.kickoff().cmp(&b.fixture.kickoff()),
            Self::HomeTeam => compare_folded(a.home_name(), b.home_name()),
        }
    }
}

/// Parameters of the fixture list.
pub type FixtureQuery = Query<FixtureFilter, FixtureSort>;
