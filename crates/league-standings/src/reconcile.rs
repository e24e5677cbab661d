//! Offline reconciliation: verify, repair and recover the standings.
//!
//! [`Reconciler::recover`] settles result log entries left pending by an
//! interrupted [`crate::StandingsAggregator::apply_result`]. Each pending
//! entry falls into one of four cases:
//!
//! | Fixture state                         | Action                              |
//! |---------------------------------------|-------------------------------------|
//! | played with the entry's scores        | finish or roll back, per policy     |
//! | unplayed                              | abandon (no side can be applied)    |
//! | played by another entry               | revert applied sides, then abandon  |
//! | deleted                               | skip (the entry went with it)       |
//!
//! [`Reconciler::repair`] overwrites drifted counters with a replay of the
//! played fixtures. It refuses to run while entries are pending, because a
//! replay already counts a transitioned fixture whose sides are not yet
//! applied and finishing the entry afterwards would count it twice.

use std::sync::Arc;

use league_store::{EntityStore, StoreError};
use league_types::{FixtureId, ResultEntry, ResultEntryState, Side};
use serde::Serialize;

use crate::error::StandingsError;
use crate::verify::{StandingsCheck, TeamDrift, verify};

/// What to do with a pending entry whose fixture transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPolicy {
    /// Apply the remaining sides and settle the entry as applied.
    Finish,
    /// Revert applied sides, reopen the fixture and settle as rolled back.
    RollBack,
}

/// Counts of what [`Reconciler::recover`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    /// Pending entries examined.
    pub examined: usize,
    /// Entries completed and settled as applied.
    pub finished: usize,
    /// Entries undone and settled as rolled back.
    pub rolled_back: usize,
    /// Entries settled as abandoned.
    pub abandoned: usize,
}

/// Verifies and repairs standings against the played fixtures.
#[derive(Debug)]
pub struct Reconciler<S> {
    store: Arc<S>,
}

impl<S> Clone for Reconciler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EntityStore> Reconciler<S> {
    /// Create a reconciler over the given store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Load every team and fixture and verify the stored counters.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError`] if the store fails or the replay
    /// overflows.
    pub async fn check(&self) -> Result<StandingsCheck, StandingsError> {
        let teams = self.store.list_teams().await?;
        let fixtures = self.store.list_fixtures().await?;
        let check = verify(&teams, &fixtures)?;
        match &check {
            StandingsCheck::Consistent => {
                tracing::info!(teams = teams.len(), "Standings consistent");
            }
            StandingsCheck::Drift(drift) => {
                tracing::warn!(teams = drift.teams.len(), "{}", drift.message);
            }
        }
        Ok(check)
    }

    /// Overwrite every drifted team with its recomputed counters.
    ///
    /// Returns the drift that was corrected (empty when already
    /// consistent).
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PendingResults`] if result entries are
    /// still pending, or any store failure.
    pub async fn repair(&self) -> Result<Vec<TeamDrift>, StandingsError> {
        let pending = self
            .store
            .list_result_entries(ResultEntryState::Pending)
            .await?;
        if !pending.is_empty() {
            return Err(StandingsError::PendingResults {
                count: pending.len(),
            });
        }

        let StandingsCheck::Drift(drift) = self.check().await? else {
            return Ok(Vec::new());
        };

        for team in &drift.teams {
            self.store
                .overwrite_team_aggregate(team.team, &team.expected)
                .await?;
            tracing::info!(
                team = %team.team,
                name = %team.name,
                stored = ?team.stored,
                expected = ?team.expected,
                "Team counters repaired"
            );
        }
        Ok(drift.teams)
    }

    /// Settle every pending result entry.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError`] on the first store failure; entries
    /// already handled stay settled and a rerun picks up the rest.
    pub async fn recover(&self, policy: RecoveryPolicy) -> Result<RecoveryReport, StandingsError> {
        let mut pending = self
            .store
            .list_result_entries(ResultEntryState::Pending)
            .await?;
        // Entries that already applied a side own their fixture's result.
        pending.sort_by_key(|e| !(e.home_applied || e.away_applied));
        let mut claimed: Vec<FixtureId> = self
            .store
            .list_result_entries(ResultEntryState::Applied)
            .await?
            .into_iter()
            .map(|e| e.fixture_id)
            .collect();

        let mut report = RecoveryReport::default();
        for entry in pending {
            report.examined = report.examined.saturating_add(1);

            let fixture = match self.store.get_fixture(entry.fixture_id).await {
                Ok(fixture) => fixture,
                Err(StoreError::NotFound { .. }) => {
                    // Only unplayed fixtures can be deleted, and their
                    // entries go with them.
                    tracing::debug!(
                        entry = %entry.id,
                        fixture = %entry.fixture_id,
                        "Fixture deleted during recovery; skipping its entry"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let owns_transition = fixture.scoreline() == Some(entry.scoreline)
                && !claimed.contains(&entry.fixture_id);

            if owns_transition {
                claimed.push(entry.fixture_id);
                match policy {
                    RecoveryPolicy::Finish => {
                        self.finish(&entry).await?;
                        report.finished = report.finished.saturating_add(1);
                    }
                    RecoveryPolicy::RollBack => {
                        self.roll_back(&entry).await?;
                        report.rolled_back = report.rolled_back.saturating_add(1);
                    }
                }
            } else {
                if fixture.played {
                    // Another entry owns the result.
                    self.revert_sides(&entry).await?;
                }
                self.store
                    .settle_result_entry(entry.id, ResultEntryState::Abandoned)
                    .await?;
                tracing::info!(
                    entry = %entry.id,
                    fixture = %entry.fixture_id,
                    "Pending result entry abandoned"
                );
                report.abandoned = report.abandoned.saturating_add(1);
            }
        }

        tracing::info!(
            policy = ?policy,
            examined = report.examined,
            finished = report.finished,
            rolled_back = report.rolled_back,
            abandoned = report.abandoned,
            "Result log recovery complete"
        );
        Ok(report)
    }

    async fn finish(&self, entry: &ResultEntry) -> Result<(), StandingsError> {
        for side in [Side::Home, Side::Away] {
            self.store.apply_result_side(entry.id, side).await?;
        }
        self.store
            .settle_result_entry(entry.id, ResultEntryState::Applied)
            .await?;
        tracing::info!(
            entry = %entry.id,
            fixture = %entry.fixture_id,
            score = %entry.scoreline,
            "Pending result entry finished"
        );
        Ok(())
    }

    async fn roll_back(&self, entry: &ResultEntry) -> Result<(), StandingsError> {
        self.revert_sides(entry).await?;
        self.store.reopen_fixture(entry.fixture_id).await?;
        self.store
            .settle_result_entry(entry.id, ResultEntryState::RolledBack)
            .await?;
        tracing::info!(
            entry = %entry.id,
            fixture = %entry.fixture_id,
            "Pending result entry rolled back; fixture reopened"
        );
        Ok(())
    }

    async fn revert_sides(&self, entry: &ResultEntry) -> Result<(), StandingsError> {
        for side in [Side::Home, Side::Away] {
            if entry.is_applied(side) {
                self.store.revert_result_side(entry.id, side).await?;
            }
        }
        Ok(())
    }
}
