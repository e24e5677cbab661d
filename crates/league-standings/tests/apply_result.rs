//! Integration tests for `apply_result` against the in-memory store.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use league_standings::{
    ApplyOutcome, Reconciler, RecoveryPolicy, StandingsAggregator, StandingsError,
};
use league_store::{EntityStore, MemoryStore, StoreOp};
use league_types::{
    DEFAULT_KICKOFF, Family, Fixture, FixtureId, FixtureStatus, Group, KnockoutFixture,
    KnockoutFixtureId, KnockoutStage, ResultEntryState, Scoreline, Team, TeamAggregate, TeamId,
};

// =============================================================================
// Helpers
// =============================================================================

struct League {
    store: Arc<MemoryStore>,
    aggregator: StandingsAggregator<MemoryStore>,
    teams: Vec<Team>,
}

impl League {
    async fn with_teams(names: &[&str]) -> Self {
        let store = Arc::new(MemoryStore::new());
        let mut teams = Vec::new();
        for name in names {
            let team = Team {
                id: TeamId::new(),
                name: (*name).to_owned(),
                group: Group::A,
                logo_url: None,
                aggregate: TeamAggregate::ZERO,
                created_at: Utc::now(),
            };
            store.insert_team(&team).await.unwrap();
            teams.push(team);
        }
        Self {
            aggregator: StandingsAggregator::new(Arc::clone(&store)),
            store,
            teams,
        }
    }

    fn id(&self, index: usize) -> TeamId {
        self.teams[index].id
    }

    async fn fixture(&self, home: usize, away: usize) -> FixtureId {
        let fixture = Fixture {
            id: FixtureId::new(),
            date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            time: DEFAULT_KICKOFF,
            home_team: self.id(home),
            away_team: self.id(away),
            status: FixtureStatus::Scheduled,
            played: false,
            home_score: None,
            away_score: None,
            created_at: Utc::now(),
        };
        self.store.insert_fixture(&fixture).await.unwrap();
        fixture.id
    }

    async fn aggregate(&self, index: usize) -> TeamAggregate {
        self.store.get_team(self.id(index)).await.unwrap().aggregate
    }

    async fn aggregates(&self) -> Vec<TeamAggregate> {
        let mut out = Vec::new();
        for i in 0..self.teams.len() {
            out.push(self.aggregate(i).await);
        }
        out
    }
}

const X: usize = 0;
const Y: usize = 1;

// =============================================================================
// Core behaviour
// =============================================================================

#[tokio::test]
async fn home_win_updates_both_teams() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;

    let outcome = league.aggregator.apply_result(f, 2, 1).await.unwrap();
    assert!(matches!(outcome, ApplyOutcome::Applied { .. }));

    let x = league.aggregate(X).await;
    assert_eq!(
        x,
        TeamAggregate {
            wins: 1,
            draws: 0,
            losses: 0,
            goals_for: 2,
            goals_against: 1
        }
    );
    let y = league.aggregate(Y).await;
    assert_eq!(
        y,
        TeamAggregate {
            wins: 0,
            draws: 0,
            losses: 1,
            goals_for: 1,
            goals_against: 2
        }
    );

    let stored = league.store.get_fixture(f).await.unwrap();
    assert!(stored.played);
    assert_eq!(stored.status, FixtureStatus::Finished);
    assert_eq!(stored.scoreline(), Some(Scoreline::new(2, 1)));

    let applied = league
        .store
        .list_result_entries(ResultEntryState::Applied)
        .await
        .unwrap();
    assert_eq!(applied.len(), 1);
    assert!(applied[0].home_applied && applied[0].away_applied);
}

#[tokio::test]
async fn identical_resubmission_is_a_no_op() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;
    league.aggregator.apply_result(f, 2, 1).await.unwrap();
    let before = league.aggregates().await;

    let outcome = league.aggregator.apply_result(f, 2, 1).await.unwrap();
    assert!(matches!(outcome, ApplyOutcome::AlreadyApplied { .. }));
    assert_eq!(league.aggregates().await, before);
    assert_eq!(
        league
            .store
            .list_result_entries(ResultEntryState::Applied)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn draw_increments_draws_only() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;
    league.aggregator.apply_result(f, 1, 1).await.unwrap();

    for i in [X, Y] {
        let a = league.aggregate(i).await;
        assert_eq!((a.wins, a.draws, a.losses), (0, 1, 0));
        assert_eq!((a.goals_for, a.goals_against), (1, 1));
    }
}

#[tokio::test]
async fn away_win() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;
    league.aggregator.apply_result(f, 0, 3).await.unwrap();
    assert_eq!(league.aggregate(X).await.losses, 1);
    assert_eq!(league.aggregate(Y).await.wins, 1);
    assert_eq!(league.aggregate(Y).await.goal_difference(), 3);
}

#[tokio::test]
async fn unknown_fixture_is_not_found() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let before = league.aggregates().await;
    let err = league
        .aggregator
        .apply_result(FixtureId::new(), 1, 0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StandingsError::NotFound {
            family: Family::Fixtures,
            ..
        }
    ));
    assert_eq!(league.aggregates().await, before);
    assert!(
        league
            .store
            .list_result_entries(ResultEntryState::Pending)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn differing_resubmission_requires_reconciliation() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;
    league.aggregator.apply_result(f, 2, 1).await.unwrap();
    let before = league.aggregates().await;

    let err = league.aggregator.apply_result(f, 0, 0).await.unwrap_err();
    match err {
        StandingsError::RequiresReconciliation {
            fixture,
            recorded,
            submitted,
        } => {
            assert_eq!(fixture, f);
            assert_eq!(recorded, Scoreline::new(2, 1));
            assert_eq!(submitted, Scoreline::new(0, 0));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(league.aggregates().await, before);
    let stored = league.store.get_fixture(f).await.unwrap();
    assert_eq!(stored.scoreline(), Some(Scoreline::new(2, 1)));
}

#[tokio::test]
async fn invalid_scores_are_rejected_before_any_write() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;

    for (home, away) in [(-1, 0), (0, -3), (i64::from(u32::MAX) + 1, 0)] {
        let err = league
            .aggregator
            .apply_result(f, home, away)
            .await
            .unwrap_err();
        assert!(matches!(err, StandingsError::InvalidInput(_)));
    }
    let err = league.aggregator.apply_form(f, Some(2), None).await.unwrap_err();
    assert!(matches!(err, StandingsError::InvalidInput(_)));

    assert!(!league.store.get_fixture(f).await.unwrap().played);
    assert_eq!(league.aggregate(X).await, TeamAggregate::ZERO);
}

#[tokio::test]
async fn overflow_writes_nothing() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let full = TeamAggregate {
        goals_against: u32::MAX,
        ..TeamAggregate::ZERO
    };
    league
        .store
        .overwrite_team_aggregate(league.id(Y), &full)
        .await
        .unwrap();
    let f = league.fixture(X, Y).await;

    let err = league.aggregator.apply_result(f, 1, 0).await.unwrap_err();
    assert!(matches!(err, StandingsError::Overflow));
    assert!(!league.store.get_fixture(f).await.unwrap().played);
    assert_eq!(league.aggregate(X).await, TeamAggregate::ZERO);
    assert!(
        league
            .store
            .list_result_entries(ResultEntryState::Pending)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn outage_surfaces_as_storage_unavailable() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;
    league.store.set_offline(true).await;
    let err = league.aggregator.apply_result(f, 1, 0).await.unwrap_err();
    assert!(matches!(err, StandingsError::StorageUnavailable(_)));
    league.store.set_offline(false).await;
    assert_eq!(league.aggregate(X).await, TeamAggregate::ZERO);
}

#[tokio::test]
async fn failed_transition_is_retryable() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;
    league.store.fail_next(StoreOp::TransitionFixture).await;

    let err = league.aggregator.apply_result(f, 3, 2).await.unwrap_err();
    assert!(matches!(err, StandingsError::StorageUnavailable(_)));
    assert_eq!(
        league
            .store
            .list_result_entries(ResultEntryState::Pending)
            .await
            .unwrap()
            .len(),
        1
    );

    // The retry applies exactly once; recovery then abandons the stale entry.
    league.aggregator.apply_result(f, 3, 2).await.unwrap();
    assert_eq!(league.aggregate(X).await.wins, 1);
    assert_eq!(league.aggregate(X).await.goals_for, 3);

    let reconciler = Reconciler::new(Arc::clone(&league.store));
    let report = reconciler.recover(RecoveryPolicy::Finish).await.unwrap();
    assert_eq!((report.examined, report.abandoned, report.finished), (1, 1, 0));
    assert_eq!(league.aggregate(X).await.wins, 1);
    let check = Reconciler::new(Arc::clone(&league.store)).check().await.unwrap();
    assert!(check.is_consistent());
}

#[tokio::test]
async fn knockout_fixtures_never_touch_standings() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let knockout = KnockoutFixture {
        id: KnockoutFixtureId::new(),
        stage: KnockoutStage::SemiFinal,
        match_number: 1,
        team1: Some(league.id(X)),
        team2: Some(league.id(Y)),
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        time: DEFAULT_KICKOFF,
        status: FixtureStatus::Finished,
        created_at: Utc::now(),
    };
    league.store.insert_knockout(&knockout).await.unwrap();

    // A knockout id is not a fixture id.
    let err = league
        .aggregator
        .apply_result(FixtureId(knockout.id.into_inner()), 2, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, StandingsError::NotFound { .. }));
    assert_eq!(league.aggregates().await, vec![TeamAggregate::ZERO; 2]);
}

// =============================================================================
// Properties
// =============================================================================

/// (home, away, home score, away score)
const SEASON: [(usize, usize, i64, i64); 8] = [
    (0, 1, 2, 1),
    (2, 3, 0, 0),
    (0, 2, 1, 3),
    (1, 3, 4, 4),
    (3, 0, 2, 0),
    (1, 2, 1, 0),
    (0, 1, 0, 0),
    (2, 3, 5, 1),
];

#[tokio::test]
async fn conservation_and_goal_accounting_hold() {
    let league = League::with_teams(&["A", "B", "C", "D"]).await;
    for (home, away, hs, as_) in SEASON {
        let f = league.fixture(home, away).await;
        league.aggregator.apply_result(f, hs, as_).await.unwrap();
    }

    for (i, aggregate) in league.aggregates().await.into_iter().enumerate() {
        let involved: Vec<_> = SEASON
            .iter()
            .filter(|(h, a, _, _)| *h == i || *a == i)
            .collect();
        assert_eq!(aggregate.played(), u64::try_from(involved.len()).unwrap());
        let (scored, conceded) = involved.iter().fold((0, 0), |(s, c), (h, _, hs, as_)| {
            if *h == i { (s + hs, c + as_) } else { (s + as_, c + hs) }
        });
        assert_eq!(i64::from(aggregate.goals_for), scored);
        assert_eq!(i64::from(aggregate.goals_against), conceded);
    }

    let check = Reconciler::new(Arc::clone(&league.store)).check().await.unwrap();
    assert!(check.is_consistent());
}

#[tokio::test]
async fn order_of_results_does_not_matter() {
    let forward = League::with_teams(&["A", "B", "C", "D"]).await;
    let backward = League::with_teams(&["A", "B", "C", "D"]).await;

    let mut forward_ids = Vec::new();
    let mut backward_ids = Vec::new();
    for (home, away, _, _) in SEASON {
        forward_ids.push(forward.fixture(home, away).await);
        backward_ids.push(backward.fixture(home, away).await);
    }

    for (i, (_, _, hs, as_)) in SEASON.iter().enumerate() {
        forward.aggregator.apply_result(forward_ids[i], *hs, *as_).await.unwrap();
    }
    for (i, (_, _, hs, as_)) in SEASON.iter().enumerate().rev() {
        backward.aggregator.apply_result(backward_ids[i], *hs, *as_).await.unwrap();
    }

    assert_eq!(forward.aggregates().await, backward.aggregates().await);
}

#[tokio::test]
async fn concurrent_results_commute() {
    let league = League::with_teams(&["A", "B", "C", "D"]).await;
    let mut ids = Vec::new();
    for (home, away, _, _) in SEASON {
        ids.push(league.fixture(home, away).await);
    }

    let calls = SEASON
        .iter()
        .zip(&ids)
        .map(|((_, _, hs, as_), id)| league.aggregator.apply_result(*id, *hs, *as_));
    for outcome in futures::future::join_all(calls).await {
        assert!(matches!(outcome, Ok(ApplyOutcome::Applied { .. })));
    }

    let check = Reconciler::new(Arc::clone(&league.store)).check().await.unwrap();
    assert!(check.is_consistent());
}

#[tokio::test]
async fn racing_sessions_apply_once() {
    let league = League::with_teams(&["Team X", "Team Y"]).await;
    let f = league.fixture(X, Y).await;
    let other_session = StandingsAggregator::new(Arc::clone(&league.store));

    let (a, b) = tokio::join!(
        league.aggregator.apply_result(f, 1, 0),
        other_session.apply_result(f, 1, 0)
    );
    let applied = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Ok(ApplyOutcome::Applied { .. })))
        .count();
    assert_eq!(applied, 1);
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(league.aggregate(X).await.wins, 1);
    assert_eq!(league.aggregate(Y).await.losses, 1);
}
