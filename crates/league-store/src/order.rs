//! Canonical list orderings shared by the in-memory store and tests.
//!
//! The `PostgreSQL` store expresses the same orderings in its `ORDER BY`
//! clauses.

use core::cmp::Ordering;

use league_types::{Fixture, KnockoutFixture, Player, Team};

/// Teams by case-insensitive name, then id.
pub fn teams(a: &Team, b: &Team) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}

/// Players by goals descending, then creation order.
pub fn players(a: &Player, b: &Player) -> Ordering {
    b.goals
        .cmp(&a.goals)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Fixtures by date descending, then kickoff time ascending.
pub fn fixtures(a: &Fixture, b: &Fixture) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.time.cmp(&b.time))
        .then_with(|| a.id.cmp(&b.id))
}

/// Knockout fixtures by stage (quarter, semi, final), then match number.
pub fn knockouts(a: &KnockoutFixture, b: &KnockoutFixture) -> Ordering {
    a.stage
        .cmp(&b.stage)
        .then_with(|| a.match_number.cmp(&b.match_number))
        .then_with(|| a.id.cmp(&b.id))
}
