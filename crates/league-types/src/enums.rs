//! Enumeration types for the league dashboard.
//!
//! String forms (`as_str` / [`core::str::FromStr`]) match the values stored
//! in the database and sent by the dashboard forms.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when parsing one of the enums below from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored string form of this value.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// The group-stage pool a team plays in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum Group {
    /// Group A.
    #[default]
    A,
    /// Group B.
    B,
    /// Group C.
    C,
    /// Group D.
    D,
}

string_enum!(Group, "group", {
    A => "A",
    B => "B",
    C => "C",
    D => "D",
});

// ---------------------------------------------------------------------------
// Fixture status
// ---------------------------------------------------------------------------

/// Lifecycle status of a fixture (group or knockout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FixtureStatus {
    /// Not yet started.
    Scheduled,
    /// In progress.
    Live,
    /// Completed. For group fixtures this is only set together with `played`.
    Finished,
}

string_enum!(FixtureStatus, "fixture status", {
    Scheduled => "scheduled",
    Live => "live",
    Finished => "finished",
});

// ---------------------------------------------------------------------------
// Knockout stage
// ---------------------------------------------------------------------------

/// Round of the single-elimination bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum KnockoutStage {
    /// Quarter-finals (four matches).
    #[serde(rename = "quarter")]
    QuarterFinal,
    /// Semi-finals (two matches).
    #[serde(rename = "semi")]
    SemiFinal,
    /// The final (one match).
    #[serde(rename = "final")]
    Final,
}

string_enum!(KnockoutStage, "knockout stage", {
    QuarterFinal => "quarter",
    SemiFinal => "semi",
    Final => "final",
});

impl KnockoutStage {
    /// Highest match number allowed in this stage.
    pub const fn max_match_number(self) -> u8 {
        match self {
            Self::QuarterFinal => 4,
            Self::SemiFinal => 2,
            Self::Final => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Record families
// ---------------------------------------------------------------------------

/// A record family (storage table) that emits change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Family {
    /// Teams and their aggregates.
    Teams,
    /// Players.
    Players,
    /// Group-stage fixtures.
    #[serde(rename = "matches")]
    Fixtures,
    /// Knockout fixtures.
    #[serde(rename = "elimination_matches")]
    KnockoutFixtures,
    /// The two-phase result log.
    ResultLog,
}

string_enum!(Family, "family", {
    Teams => "teams",
    Players => "players",
    Fixtures => "matches",
    KnockoutFixtures => "elimination_matches",
    ResultLog => "result_log",
});

// ---------------------------------------------------------------------------
// Result log
// ---------------------------------------------------------------------------

/// Settlement state of a result log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResultEntryState {
    /// Written before the fixture transition; not yet settled.
    Pending,
    /// Both sides applied.
    Applied,
    /// The fixture transition never happened; nothing was applied.
    Abandoned,
    /// Applied sides were reverted and the fixture reopened.
    RolledBack,
}

string_enum!(ResultEntryState, "result entry state", {
    Pending => "pending",
    Applied => "applied",
    Abandoned => "abandoned",
    RolledBack => "rolled_back",
});

/// One side of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Side {
    /// The home team.
    Home,
    /// The away team.
    Away,
}

string_enum!(Side, "side", {
    Home => "home",
    Away => "away",
});
