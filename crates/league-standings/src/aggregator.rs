//! The standings aggregator: turns a final score into team counters.
//!
//! # Commit sequence
//!
//! ```text
//! 1. append pending ResultEntry          (result_log)
//! 2. transition fixture unplayed->played (matches, conditional)
//! 3. apply home side                     (teams + result_log, atomic)
//! 4. apply away side                     (teams + result_log, atomic)
//! 5. settle entry as applied             (result_log)
//! ```
//!
//! The fixture flag is always written before any counter. A failure after
//! step 2 leaves a pending entry that [`crate::Reconciler::recover`] can
//! finish or roll back; a failure before it leaves nothing that counts.
//!
//! # Re-invocation guard
//!
//! A fixture that is already played is never applied twice. The played flag
//! is read first and re-checked by the conditional transition, so two
//! sessions racing on the same fixture cannot both win.

use std::sync::Arc;

use league_store::{EntityStore, FixtureTransition};
use league_types::{Fixture, FixtureId, ResultEntry, ResultEntryState, Scoreline, Side, Team};
use serde::Serialize;

use crate::error::StandingsError;

/// What [`StandingsAggregator::apply_result`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// The result was recorded and both teams were updated.
    Applied {
        /// The fixture, now played.
        fixture: Fixture,
        /// The home team after the update.
        home: Team,
        /// The away team after the update.
        away: Team,
    },
    /// The fixture was already played with this exact result. Nothing
    /// changed.
    AlreadyApplied {
        /// The fixture as stored.
        fixture: Fixture,
    },
}

impl ApplyOutcome {
    /// The fixture the outcome refers to.
    pub const fn fixture(&self) -> &Fixture {
        match self {
            Self::Applied { fixture, .. } | Self::AlreadyApplied { fixture } => fixture,
        }
    }
}

/// Applies fixture results to team standings.
#[derive(Debug)]
pub struct StandingsAggregator<S> {
    store: Arc<S>,
}

impl<S> Clone for StandingsAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EntityStore> StandingsAggregator<S> {
    /// Create an aggregator over the given store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record the final score of a fixture and update both teams.
    ///
    /// # Errors
    ///
    /// - [`StandingsError::InvalidInput`] for negative or oversized scores,
    ///   or a fixture whose two sides are the same team.
    /// - [`StandingsError::NotFound`] if the fixture or a team is missing.
    /// - [`StandingsError::RequiresReconciliation`] if the fixture is
    ///   already played with a different result.
    /// - [`StandingsError::ResultPending`] if the fixture is played but its
    ///   result entry never settled.
    /// - [`StandingsError::Overflow`] if a counter would leave its range.
    /// - [`StandingsError::StorageUnavailable`] if the store fails.
    pub async fn apply_result(
        &self,
        fixture_id: FixtureId,
        home_score: i64,
        away_score: i64,
    ) -> Result<ApplyOutcome, StandingsError> {
        let scoreline = Scoreline::from_raw(home_score, away_score)?;
        self.apply_scoreline(fixture_id, scoreline).await
    }

    /// Like [`Self::apply_result`], for scores straight from a form where
    /// either may be blank.
    ///
    /// # Errors
    ///
    /// As [`Self::apply_result`]; a blank score is
    /// [`StandingsError::InvalidInput`].
    pub async fn apply_form(
        &self,
        fixture_id: FixtureId,
        home_score: Option<i64>,
        away_score: Option<i64>,
    ) -> Result<ApplyOutcome, StandingsError> {
        let scoreline = Scoreline::from_form(home_score, away_score)?;
        self.apply_scoreline(fixture_id, scoreline).await
    }

    /// Record an already-validated scoreline.
    ///
    /// # Errors
    ///
    /// As [`Self::apply_result`].
    pub async fn apply_scoreline(
        &self,
        fixture_id: FixtureId,
        scoreline: Scoreline,
    ) -> Result<ApplyOutcome, StandingsError> {
        let fixture = self.store.get_fixture(fixture_id).await?;
        if fixture.home_team == fixture.away_team {
            return Err(StandingsError::InvalidInput(format!(
                "fixture {fixture_id} has the same team on both sides"
            )));
        }
        if fixture.played {
            return self.resubmission(fixture, scoreline).await;
        }

        // Check both teams exist and can absorb the result before writing
        // anything.
        let home = self.store.get_team(fixture.home_team).await?;
        let away = self.store.get_team(fixture.away_team).await?;
        let (home_delta, away_delta) = scoreline.deltas();
        home.aggregate.apply(&home_delta)?;
        away.aggregate.apply(&away_delta)?;

        let entry = ResultEntry::pending(&fixture, scoreline);
        self.store.insert_result_entry(&entry).await?;

        let fixture = match self
            .store
            .transition_fixture_to_played(fixture_id, scoreline)
            .await
        {
            Ok(FixtureTransition::Transitioned(fixture)) => fixture,
            Ok(FixtureTransition::AlreadyPlayed(current)) => {
                tracing::warn!(
                    fixture = %fixture_id,
                    "Fixture was played by another session first"
                );
                self.store
                    .settle_result_entry(entry.id, ResultEntryState::Abandoned)
                    .await?;
                return self.resubmission(current, scoreline).await;
            }
            Err(e) => {
                tracing::error!(
                    fixture = %fixture_id,
                    entry = %entry.id,
                    error = %e,
                    "Fixture transition failed; result entry left pending"
                );
                return Err(e.into());
            }
        };

        let home = self.apply_side(&entry, Side::Home).await?;
        let away = self.apply_side(&entry, Side::Away).await?;
        self.store
            .settle_result_entry(entry.id, ResultEntryState::Applied)
            .await?;

        tracing::info!(
            fixture = %fixture_id,
            score = %scoreline,
            home = %home.name,
            away = %away.name,
            "Result applied"
        );

        Ok(ApplyOutcome::Applied {
            fixture,
            home,
            away,
        })
    }

    async fn apply_side(&self, entry: &ResultEntry, side: Side) -> Result<Team, StandingsError> {
        self.store
            .apply_result_side(entry.id, side)
            .await
            .map_err(|e| {
                tracing::error!(
                    entry = %entry.id,
                    side = %side,
                    error = %e,
                    "Applying result side failed; result entry left pending"
                );
                e.into()
            })
    }

    /// Decide what a submission for an already-played fixture means.
    async fn resubmission(
        &self,
        fixture: Fixture,
        submitted: Scoreline,
    ) -> Result<ApplyOutcome, StandingsError> {
        let Some(recorded) = fixture.scoreline() else {
            return Err(StandingsError::InvalidInput(format!(
                "fixture {} is played but has no recorded score",
                fixture.id
            )));
        };
        if recorded != submitted {
            tracing::warn!(
                fixture = %fixture.id,
                %recorded,
                %submitted,
                "Refusing to overwrite a recorded result"
            );
            return Err(StandingsError::RequiresReconciliation {
                fixture: fixture.id,
                recorded,
                submitted,
            });
        }

        let unfinished = self
            .store
            .list_result_entries(ResultEntryState::Pending)
            .await?
            .into_iter()
            .find(|e| e.fixture_id == fixture.id);
        if let Some(entry) = unfinished {
            tracing::warn!(
                fixture = %fixture.id,
                entry = %entry.id,
                "Result entry for this fixture is still pending; run recovery"
            );
            return Err(StandingsError::ResultPending {
                fixture: fixture.id,
                entry: entry.id,
            });
        }
        tracing::debug!(fixture = %fixture.id, "Result already applied");
        Ok(ApplyOutcome::AlreadyApplied { fixture })
    }
}
