//! Team lookups for views that show team names next to other records.

use std::collections::HashMap;

use league_types::{Group, Team, TeamId};
use serde::{Deserialize, Serialize};

/// The parts of a team other views display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLabel {
    /// Display name.
    pub name: String,
    /// Group-stage pool.
    pub group: Group,
}

impl From<&Team> for TeamLabel {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            group: team.group,
        }
    }
}

/// Id to label lookup built from the current team list.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    labels: HashMap<TeamId, TeamLabel>,
}

impl TeamDirectory {
    /// Index the given teams.
    pub fn new<'a>(teams: impl IntoIterator<Item = &'a Team>) -> Self {
        Self {
            labels: teams
                .into_iter()
                .map(|team| (team.id, TeamLabel::from(team)))
                .collect(),
        }
    }

    /// The label of a team, if it is known.
    pub fn label(&self, id: TeamId) -> Option<&TeamLabel> {
        self.labels.get(&id)
    }

    /// Owned label for an optional team reference.
    pub fn label_of(&self, id: Option<TeamId>) -> Option<TeamLabel> {
        id.and_then(|id| self.label(id)).cloned()
    }
}
