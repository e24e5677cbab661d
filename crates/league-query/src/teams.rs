//! The team list and standings table.

use core::cmp::Ordering;

use league_types::{Group, Team};
use serde::{Deserialize, Serialize};

use crate::locale::DateLocale;
use crate::pipeline::{Filter, Query, Searchable, Selection, SortKey, SortOrder, compare_folded};

impl Searchable for Team {
    fn projections(&self, _locale: DateLocale) -> Vec<String> {
        vec![self.name.clone()]
    }
}

/// Team filter clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamFilter {
    /// Group-stage pool.
    pub group: Selection<Group>,
}

impl Filter<Team> for TeamFilter {
    fn admits(&self, item: &Team) -> bool {
        self.group.admits(&item.group)
    }
}

/// Team sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSort {
    /// Name, case-insensitive.
    Name,
    /// Group label.
    Group,
    /// Matches won.
    Wins,
    /// Goals for minus goals against.
    GoalDifference,
    /// Matches played.
    Played,
}

impl SortKey<Team> for TeamSort {
    fn compare(self, a: &Team, b: &Team) -> Ordering {
        let (x, y) = (&a.aggregate, &b.aggregate);
        match self {
            Self::Name => compare_folded(&a.name, &b.name),
            Self::Group => a.group.cmp(&b.group),
            Self::Wins => x.wins.cmp(&y.wins),
            Self::GoalDifference => x.goal_difference().cmp(&y.goal_difference()),
            Self::Played => x.played().cmp(&y.played()),
        }
    }
}

/// Parameters of the team list.
pub type TeamQuery = Query<TeamFilter, TeamSort>;

/// The query the team list opens with: alphabetical.
pub fn by_name() -> TeamQuery {
    TeamQuery::sorted(TeamSort::Name, SortOrder::Ascending)
}
