//! The player list: filter by team, search by player or team name, sort
//! by name or by contribution counts.

use core::cmp::Ordering;

use league_types::{Player, TeamId};
use serde::{Deserialize, Serialize};

use crate::join::TeamDirectory;
use crate::locale::DateLocale;
use crate::pipeline::{Filter, Query, Searchable, Selection, SortKey, SortOrder, compare_folded};

/// A player together with the name of the team they play for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// The stored player.
    #[serde(flatten)]
    pub player: Player,
    /// Owning team's name, if the team is known.
    pub team_name: Option<String>,
}

/// Join players with their team names, preserving input order.
pub fn join_players(players: &[Player], teams: &TeamDirectory) -> Vec<PlayerView> {
    players
        .iter()
        .map(|player| PlayerView {
            team_name: teams.label(player.team_id).map(|l| l.name.clone()),
            player: player.clone(),
        })
        .collect()
}

impl Searchable for PlayerView {
    fn projections(&self, _locale: DateLocale) -> Vec<String> {
        let mut out = vec![self.player.name.clone()];
        if let Some(team) = &self.team_name {
            out.push(team.clone());
        }
        out
    }
}

/// Player filter clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerFilter {
    /// Owning team.
    pub team: Selection<TeamId>,
}

impl Filter<PlayerView> for PlayerFilter {
    fn admits(&self, item: &PlayerView) -> bool {
        self.team.admits(&item.player.team_id)
    }
}

/// Player sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSort {
    /// Name, case-insensitive.
    Name,
    /// Goals scored.
    Goals,
    /// Assists made.
    Assists,
    /// Goals plus assists.
    Total,
}

impl SortKey<PlayerView> for PlayerSort {
    fn compare(self, a: &PlayerView, b: &PlayerView) -> Ordering {
        let (a, b) = (&a.player, &b.player);
        match self {
            Self::Name => compare_folded(&a.name, &b.name),
            Self::Goals => a.goals.cmp(&b.goals),
            Self::Assists => a.assists.cmp(&b.assists),
            Self::Total => a.total_contributions().cmp(&b.total_contributions()),
        }
    }
}

/// Parameters of the player list.
pub type PlayerQuery = Query<PlayerFilter, PlayerSort>;

/// The query the player list opens with: top scorers first.
pub fn top_scorers() -> PlayerQuery {
    PlayerQuery::sorted(PlayerSort::Goals, SortOrder::Descending)
}
