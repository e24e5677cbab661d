//! Integration tests for the in-memory store.
//!
//! These exercise the conditional and atomic writes the standings engine
//! relies on, the mirrored referential constraints, list ordering, the
//! change feed and failure injection.

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

use chrono::{Duration, NaiveDate, Utc};
use league_store::{
    ChangeKind, ChangeNotice, EntityStore, FeedEvent, FixtureTransition, MemoryStore, StoreError,
    StoreOp,
};
use league_types::{
    DEFAULT_KICKOFF, Family, Fixture, FixtureId, FixtureStatus, Group, KnockoutFixture,
    KnockoutFixtureId, KnockoutStage, Player, PlayerId, ResultEntry, ResultEntryState, Scoreline,
    Side, Team, TeamAggregate, TeamDraft, TeamId,
};

// =============================================================================
// Helpers
// =============================================================================

fn team(name: &str, group: Group) -> Team {
    Team {
        id: TeamId::new(),
        name: name.to_owned(),
        group,
        logo_url: None,
        aggregate: TeamAggregate::ZERO,
        created_at: Utc::now(),
    }
}

fn player(team_id: TeamId, name: &str, goals: u32) -> Player {
    Player {
        id: PlayerId::new(),
        team_id,
        name: name.to_owned(),
        goals,
        assists: 0,
        created_at: Utc::now(),
    }
}

fn fixture(home: TeamId, away: TeamId, day: u32) -> Fixture {
    Fixture {
        id: FixtureId::new(),
        date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        time: DEFAULT_KICKOFF,
        home_team: home,
        away_team: away,
        status: FixtureStatus::Scheduled,
        played: false,
        home_score: None,
        away_score: None,
        created_at: Utc::now(),
    }
}

async fn seeded() -> (MemoryStore, Team, Team) {
    let store = MemoryStore::new();
    let lions = team("Lions", Group::A);
    let tigers = team("Tigers", Group::B);
    store.insert_team(&lions).await.unwrap();
    store.insert_team(&tigers).await.unwrap();
    (store, lions, tigers)
}

// =============================================================================
// Fixture transitions
// =============================================================================

#[tokio::test]
async fn transition_only_succeeds_once() {
    let (store, lions, tigers) = seeded().await;
    let f = fixture(lions.id, tigers.id, 10);
    store.insert_fixture(&f).await.unwrap();

    let first = store
        .transition_fixture_to_played(f.id, Scoreline::new(2, 1))
        .await
        .unwrap();
    let FixtureTransition::Transitioned(played) = first else {
        panic!("expected a transition, got {first:?}");
    };
    assert!(played.played);
    assert_eq!(played.status, FixtureStatus::Finished);
    assert_eq!(played.scoreline(), Some(Scoreline::new(2, 1)));

    let second = store
        .transition_fixture_to_played(f.id, Scoreline::new(0, 0))
        .await
        .unwrap();
    assert!(matches!(
        second,
        FixtureTransition::AlreadyPlayed(ref f) if f.scoreline() == Some(Scoreline::new(2, 1))
    ));
}

#[tokio::test]
async fn schedule_edit_refused_once_played() {
    let (store, lions, tigers) = seeded().await;
    let f = fixture(lions.id, tigers.id, 10);
    store.insert_fixture(&f).await.unwrap();

    let moved = Fixture {
        status: FixtureStatus::Live,
        ..f.clone()
    };
    let updated = store.update_fixture_schedule(&moved).await.unwrap();
    assert_eq!(updated.status, FixtureStatus::Live);

    store
        .transition_fixture_to_played(f.id, Scoreline::new(1, 1))
        .await
        .unwrap();
    let err = store.update_fixture_schedule(&moved).await.unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));
}

#[tokio::test]
async fn played_fixture_cannot_be_deleted() {
    let (store, lions, tigers) = seeded().await;
    let f = fixture(lions.id, tigers.id, 10);
    store.insert_fixture(&f).await.unwrap();
    let entry = ResultEntry::pending(&f, Scoreline::new(2, 1));
    store.insert_result_entry(&entry).await.unwrap();
    store
        .transition_fixture_to_played(f.id, entry.scoreline)
        .await
        .unwrap();

    let err = store.delete_fixture(f.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));
    assert!(store.get_fixture(f.id).await.unwrap().played);
    assert!(store.get_result_entry(entry.id).await.is_ok());

    // Once reopened it can go, taking its result entries with it.
    store.reopen_fixture(f.id).await.unwrap();
    store.delete_fixture(f.id).await.unwrap();
    assert!(matches!(
        store.get_result_entry(entry.id).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.delete_fixture(f.id).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn reopen_clears_scores() {
    let (store, lions, tigers) = seeded().await;
    let f = fixture(lions.id, tigers.id, 10);
    store.insert_fixture(&f).await.unwrap();
    store
        .transition_fixture_to_played(f.id, Scoreline::new(3, 0))
        .await
        .unwrap();

    let reopened = store.reopen_fixture(f.id).await.unwrap();
    assert!(!reopened.played);
    assert_eq!(reopened.status, FixtureStatus::Scheduled);
    assert_eq!(reopened.home_score, None);
    assert_eq!(reopened.away_score, None);
}

// =============================================================================
// Result log
// =============================================================================

#[tokio::test]
async fn result_sides_apply_once_and_revert() {
    let (store, lions, tigers) = seeded().await;
    let f = fixture(lions.id, tigers.id, 10);
    store.insert_fixture(&f).await.unwrap();
    let entry = ResultEntry::pending(&f, Scoreline::new(2, 1));
    store.insert_result_entry(&entry).await.unwrap();

    let home = store.apply_result_side(entry.id, Side::Home).await.unwrap();
    assert_eq!(home.aggregate.wins, 1);
    assert_eq!(home.aggregate.goals_for, 2);

    // A second apply of the same side is a no-op.
    let again = store.apply_result_side(entry.id, Side::Home).await.unwrap();
    assert_eq!(again.aggregate, home.aggregate);

    let away = store.apply_result_side(entry.id, Side::Away).await.unwrap();
    assert_eq!(away.aggregate.losses, 1);
    assert_eq!(away.aggregate.goals_against, 2);

    let stored = store.get_result_entry(entry.id).await.unwrap();
    assert!(stored.home_applied && stored.away_applied);

    let reverted = store.revert_result_side(entry.id, Side::Home).await.unwrap();
    assert_eq!(reverted.aggregate, TeamAggregate::ZERO);
    let stored = store.get_result_entry(entry.id).await.unwrap();
    assert!(!stored.home_applied);
}

#[tokio::test]
async fn settled_entries_refuse_further_steps() {
    let (store, lions, tigers) = seeded().await;
    let f = fixture(lions.id, tigers.id, 10);
    store.insert_fixture(&f).await.unwrap();
    let entry = ResultEntry::pending(&f, Scoreline::new(0, 0));
    store.insert_result_entry(&entry).await.unwrap();

    let settled = store
        .settle_result_entry(entry.id, ResultEntryState::Abandoned)
        .await
        .unwrap();
    assert_eq!(settled.state, ResultEntryState::Abandoned);
    assert!(settled.settled_at.is_some());

    assert!(store.apply_result_side(entry.id, Side::Home).await.is_err());
    assert!(
        store
            .settle_result_entry(entry.id, ResultEntryState::Applied)
            .await
            .is_err()
    );
    assert!(
        store
            .list_result_entries(ResultEntryState::Pending)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn overflowing_side_leaves_team_untouched() {
    let (store, lions, tigers) = seeded().await;
    let nearly_full = TeamAggregate {
        goals_for: u32::MAX,
        ..TeamAggregate::ZERO
    };
    store
        .overwrite_team_aggregate(lions.id, &nearly_full)
        .await
        .unwrap();
    let f = fixture(lions.id, tigers.id, 10);
    store.insert_fixture(&f).await.unwrap();
    let entry = ResultEntry::pending(&f, Scoreline::new(1, 0));
    store.insert_result_entry(&entry).await.unwrap();

    let err = store.apply_result_side(entry.id, Side::Home).await.unwrap_err();
    assert!(matches!(err, StoreError::Aggregate(_)));
    assert_eq!(store.get_team(lions.id).await.unwrap().aggregate, nearly_full);
    assert!(!store.get_result_entry(entry.id).await.unwrap().home_applied);
}

// =============================================================================
// Constraints
// =============================================================================

#[tokio::test]
async fn referenced_team_cannot_be_deleted() {
    let (store, lions, tigers) = seeded().await;
    store.insert_player(&player(lions.id, "Ana", 0)).await.unwrap();
    let err = store.delete_team(lions.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));

    store
        .insert_fixture(&fixture(tigers.id, lions.id, 1))
        .await
        .unwrap();
    assert!(store.delete_team(tigers.id).await.is_err());
}

#[tokio::test]
async fn deleting_a_team_clears_knockout_slots() {
    let (store, lions, tigers) = seeded().await;
    let knockout = KnockoutFixture {
        id: KnockoutFixtureId::new(),
        stage: KnockoutStage::Final,
        match_number: 1,
        team1: Some(lions.id),
        team2: Some(tigers.id),
        date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        time: DEFAULT_KICKOFF,
        status: FixtureStatus::Scheduled,
        created_at: Utc::now(),
    };
    store.insert_knockout(&knockout).await.unwrap();
    store.delete_team(lions.id).await.unwrap();

    let stored = store.get_knockout(knockout.id).await.unwrap();
    assert_eq!(stored.team1, None);
    assert_eq!(stored.team2, Some(tigers.id));
}

#[tokio::test]
async fn fixture_teams_must_exist_and_differ() {
    let (store, lions, _) = seeded().await;
    let same = fixture(lions.id, lions.id, 1);
    assert!(matches!(
        store.insert_fixture(&same).await,
        Err(StoreError::Constraint(_))
    ));
    let ghost = fixture(lions.id, TeamId::new(), 1);
    assert!(store.insert_fixture(&ghost).await.is_err());
}

#[tokio::test]
async fn profile_update_keeps_counters() {
    let (store, lions, _) = seeded().await;
    let counters = TeamAggregate {
        wins: 3,
        ..TeamAggregate::ZERO
    };
    store
        .overwrite_team_aggregate(lions.id, &counters)
        .await
        .unwrap();
    let draft = TeamDraft {
        name: "Lions FC".to_owned(),
        group: Group::C,
        logo_url: Some("https://example.org/lions.png".to_owned()),
    };
    let updated = store.update_team_profile(lions.id, &draft).await.unwrap();
    assert_eq!(updated.name, "Lions FC");
    assert_eq!(updated.group, Group::C);
    assert_eq!(updated.aggregate, counters);
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn lists_follow_canonical_order() {
    let (store, lions, tigers) = seeded().await;
    let bears = team("bears", Group::A);
    store.insert_team(&bears).await.unwrap();
    let names: Vec<String> = store
        .list_teams()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["bears", "Lions", "Tigers"]);

    let mut early = player(lions.id, "Early", 3);
    early.created_at = Utc::now() - Duration::minutes(5);
    let late = player(tigers.id, "Late", 3);
    let top = player(tigers.id, "Top", 9);
    for p in [&late, &top, &early] {
        store.insert_player(p).await.unwrap();
    }
    let order: Vec<String> = store
        .list_players()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(order, ["Top", "Early", "Late"]);
    assert_eq!(store.list_players_for_team(lions.id).await.unwrap().len(), 1);

    let old = fixture(lions.id, tigers.id, 1);
    let mut new_late = fixture(tigers.id, lions.id, 20);
    new_late.time = DEFAULT_KICKOFF + Duration::hours(3);
    let new_early = fixture(lions.id, bears.id, 20);
    for f in [&old, &new_late, &new_early] {
        store.insert_fixture(f).await.unwrap();
    }
    let ids: Vec<FixtureId> = store
        .list_fixtures()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, [new_early.id, new_late.id, old.id]);
}

// =============================================================================
// Change feed and failure injection
// =============================================================================

#[tokio::test]
async fn writes_publish_family_notices() {
    let (store, lions, _) = seeded().await;
    let mut feed = store.subscribe();
    store.insert_player(&player(lions.id, "Ana", 1)).await.unwrap();
    assert_eq!(
        feed.recv().await,
        FeedEvent::Changed(ChangeNotice::new(Family::Players, ChangeKind::Insert))
    );

    store
        .update_team_profile(
            lions.id,
            &TeamDraft {
                name: "Lions".to_owned(),
                group: Group::D,
                logo_url: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(
        feed.recv_for(&[Family::Teams]).await,
        FeedEvent::Changed(ChangeNotice::new(Family::Teams, ChangeKind::Update))
    );
}

#[tokio::test]
async fn injected_failure_hits_only_the_next_matching_call() {
    let (store, lions, tigers) = seeded().await;
    let f = fixture(lions.id, tigers.id, 10);
    store.insert_fixture(&f).await.unwrap();
    store.fail_next(StoreOp::TransitionFixture).await;

    // Reads are unaffected.
    assert!(store.get_fixture(f.id).await.is_ok());

    let err = store
        .transition_fixture_to_played(f.id, Scoreline::new(1, 0))
        .await
        .unwrap_err();
    assert!(err.is_unavailable());
    assert!(!store.get_fixture(f.id).await.unwrap().played);

    assert!(
        store
            .transition_fixture_to_played(f.id, Scoreline::new(1, 0))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn offline_store_is_unavailable() {
    let (store, lions, _) = seeded().await;
    store.set_offline(true).await;
    assert!(store.get_team(lions.id).await.unwrap_err().is_unavailable());
    assert!(store.list_teams().await.unwrap_err().is_unavailable());
    store.set_offline(false).await;
    assert!(store.get_team(lions.id).await.is_ok());
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let store = MemoryStore::new();
    let id = TeamId::new();
    assert!(matches!(
        store.get_team(id).await,
        Err(StoreError::NotFound { family: Family::Teams, .. })
    ));
    assert!(matches!(
        store.delete_player(PlayerId::new()).await,
        Err(StoreError::NotFound { family: Family::Players, .. })
    ));
}
