//! View identities, active queries and the published snapshot.

use league_query::{
    FixtureQuery, FixtureView, KnockoutQuery, KnockoutView, PlayerQuery, PlayerView, TeamQuery,
    bracket_order, by_name, top_scorers,
};
use league_types::{Family, Team};
use serde::{Deserialize, Serialize};

/// One list the dashboard renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Player list.
    Players,
    /// Fixture list.
    Fixtures,
    /// Team list.
    Teams,
    /// Knockout bracket.
    Knockouts,
}

impl View {
    /// Every view.
    pub const ALL: [Self; 4] = [Self::Players, Self::Fixtures, Self::Teams, Self::Knockouts];

    /// Views whose contents depend on `family`.
    ///
    /// Player, fixture and knockout views show team names and groups, so a
    /// team change touches every view.
    pub const fn affected_by(family: Family) -> &'static [Self] {
        match family {
            Family::Teams => &Self::ALL,
            Family::Players => &[Self::Players],
            Family::Fixtures => &[Self::Fixtures],
            Family::KnockoutFixtures => &[Self::Knockouts],
            Family::ResultLog => &[],
        }
    }
}

/// Families a view session materializes and listens to.
pub const VIEW_FAMILIES: [Family; 4] = [
    Family::Teams,
    Family::Players,
    Family::Fixtures,
    Family::KnockoutFixtures,
];

/// The active query of every view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewQueries {
    /// Player list parameters.
    pub players: PlayerQuery,
    /// Fixture list parameters.
    pub fixtures: FixtureQuery,
    /// Team list parameters.
    pub teams: TeamQuery,
    /// Knockout list parameters.
    pub knockouts: KnockoutQuery,
}

impl Default for ViewQueries {
    fn default() -> Self {
        Self {
            players: top_scorers(),
            fixtures: FixtureQuery::default(),
            teams: by_name(),
            knockouts: bracket_order(),
        }
    }
}

/// The evaluated contents of every view, as last published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    /// Increases by one on every publish.
    pub revision: u64,
    /// Player list.
    pub players: Vec<PlayerView>,
    /// Fixture list.
    pub fixtures: Vec<FixtureView>,
    /// Team list.
    pub teams: Vec<Team>,
    /// Knockout bracket.
    pub knockouts: Vec<KnockoutView>,
}
