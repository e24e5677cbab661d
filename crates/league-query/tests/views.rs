//! Integration tests for the player, fixture, team and knockout views.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use chrono::{NaiveDate, NaiveTime, Utc};
use league_query::{
    DateLocale, FixtureFilter, FixtureQuery, FixtureSort, KnockoutFilter, KnockoutQuery,
    PlayerFilter, PlayerQuery, PlayerSort, Selection, SortOrder, StatusFilter, TeamDirectory,
    TeamQuery, TeamSort, bracket_order, evaluate, join_fixtures, join_knockouts, join_players,
    top_scorers,
};
use league_types::{
    DEFAULT_KICKOFF, Fixture, FixtureId, FixtureStatus, Group, KnockoutFixture, KnockoutFixtureId,
    KnockoutStage, Player, PlayerId, Team, TeamAggregate, TeamId,
};

// =============================================================================
// Fixtures
// =============================================================================

fn team(name: &str, group: Group, aggregate: TeamAggregate) -> Team {
    Team {
        id: TeamId::new(),
        name: name.to_owned(),
        group,
        logo_url: None,
        aggregate,
        created_at: Utc::now(),
    }
}

fn player(team: &Team, name: &str, goals: u32, assists: u32) -> Player {
    Player {
        id: PlayerId::new(),
        team_id: team.id,
        name: name.to_owned(),
        goals,
        assists,
        created_at: Utc::now(),
    }
}

fn fixture(home: &Team, away: &Team, date: (i32, u32, u32), status: FixtureStatus) -> Fixture {
    let played = status == FixtureStatus::Finished;
    Fixture {
        id: FixtureId::new(),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        time: DEFAULT_KICKOFF,
        home_team: home.id,
        away_team: away.id,
        status,
        played,
        home_score: played.then_some(1),
        away_score: played.then_some(0),
        created_at: Utc::now(),
    }
}

struct League {
    x: Team,
    y: Team,
    z: Team,
}

fn league() -> League {
    League {
        x: team("Team X", Group::A, TeamAggregate { wins: 2, goals_for: 5, goals_against: 1, ..TeamAggregate::ZERO }),
        y: team("Team Y", Group::B, TeamAggregate { wins: 1, losses: 1, goals_for: 3, goals_against: 4, ..TeamAggregate::ZERO }),
        z: team("Zenith", Group::A, TeamAggregate { draws: 3, goals_for: 2, goals_against: 2, ..TeamAggregate::ZERO }),
    }
}

impl League {
    fn teams(&self) -> Vec<Team> {
        vec![self.x.clone(), self.y.clone(), self.z.clone()]
    }

    fn directory(&self) -> TeamDirectory {
        TeamDirectory::new(&self.teams())
    }
}

// =============================================================================
// Players
// =============================================================================

#[test]
fn team_filter_with_goals_descending_keeps_ties_in_order() {
    let l = league();
    let players = vec![
        player(&l.x, "A", 3, 0),
        player(&l.y, "Other", 9, 0),
        player(&l.x, "B", 3, 1),
        player(&l.x, "C", 7, 0),
        player(&l.x, "D", 1, 4),
    ];
    let views = join_players(&players, &l.directory());

    let query = PlayerQuery::sorted(PlayerSort::Goals, SortOrder::Descending).with_filter(
        PlayerFilter {
            team: Selection::Only(l.x.id),
        },
    );
    let out = evaluate(&views, &query, DateLocale::French);
    let names: Vec<&str> = out.iter().map(|v| v.player.name.as_str()).collect();
    assert_eq!(names, vec!["C", "A", "B", "D"]);
}

#[test]
fn player_search_matches_team_name() {
    let l = league();
    let players = vec![player(&l.x, "Ana", 0, 0), player(&l.z, "Bea", 0, 0)];
    let views = join_players(&players, &l.directory());

    let out = evaluate(&views, &top_scorers().with_search("zen"), DateLocale::French);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].player.name, "Bea");
    assert_eq!(out[0].team_name.as_deref(), Some("Zenith"));
}

#[test]
fn player_sorts_by_name_and_total() {
    let l = league();
    let players = vec![
        player(&l.x, "bruno", 1, 1),
        player(&l.x, "Alice", 0, 5),
        player(&l.x, "carla", 4, 0),
    ];
    let views = join_players(&players, &l.directory());

    let by_name = evaluate(
        &views,
        &PlayerQuery::sorted(PlayerSort::Name, SortOrder::Ascending),
        DateLocale::Iso,
    );
    let names: Vec<&str> = by_name.iter().map(|v| v.player.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "bruno", "carla"]);

    let by_total = evaluate(
        &views,
        &PlayerQuery::sorted(PlayerSort::Total, SortOrder::Descending),
        DateLocale::Iso,
    );
    let names: Vec<&str> = by_total.iter().map(|v| v.player.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "carla", "bruno"]);
}

#[test]
fn player_of_unknown_team_has_no_team_name() {
    let l = league();
    let stray = team("Gone", Group::D, TeamAggregate::ZERO);
    let views = join_players(&[player(&stray, "Lone", 0, 0)], &l.directory());
    assert_eq!(views[0].team_name, None);

    let query = PlayerQuery::default().with_search("gone");
    assert!(evaluate(&views, &query, DateLocale::Iso).is_empty());
}

// =============================================================================
// Fixtures
// =============================================================================

#[test]
fn partial_iso_date_matches() {
    let l = league();
    let fixtures = vec![
        fixture(&l.x, &l.y, (2024, 5, 10), FixtureStatus::Scheduled),
        fixture(&l.y, &l.z, (2024, 6, 1), FixtureStatus::Scheduled),
    ];
    let views = join_fixtures(&fixtures, &l.directory());

    let out = evaluate(&views, &FixtureQuery::default().with_search("2024-05"), DateLocale::French);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].fixture.id, fixtures[0].id);
}

#[test]
fn display_date_matches_in_configured_locale() {
    let l = league();
    let fixtures = vec![fixture(&l.x, &l.y, (2024, 5, 10), FixtureStatus::Scheduled)];
    let views = join_fixtures(&fixtures, &l.directory());

    let query = FixtureQuery::default().with_search("10/05");
    assert_eq!(evaluate(&views, &query, DateLocale::French).len(), 1);
    assert!(evaluate(&views, &query, DateLocale::English).is_empty());

    let query = FixtureQuery::default().with_search("5/10/2024");
    assert_eq!(evaluate(&views, &query, DateLocale::English).len(), 1);
}

#[test]
fn status_and_group_filters() {
    let l = league();
    let fixtures = vec![
        fixture(&l.x, &l.y, (2024, 5, 10), FixtureStatus::Finished),
        fixture(&l.y, &l.z, (2024, 5, 11), FixtureStatus::Scheduled),
        fixture(&l.x, &l.z, (2024, 5, 12), FixtureStatus::Live),
    ];
    let views = join_fixtures(&fixtures, &l.directory());
    let count = |filter: FixtureFilter| {
        evaluate(&views, &FixtureQuery::default().with_filter(filter), DateLocale::Iso).len()
    };

    assert_eq!(count(FixtureFilter::default()), 3);
    assert_eq!(count(FixtureFilter { status: StatusFilter::Played, ..Default::default() }), 1);
    assert_eq!(count(FixtureFilter { status: StatusFilter::Upcoming, ..Default::default() }), 1);
    assert_eq!(
        count(FixtureFilter {
            status: StatusFilter::Exact(FixtureStatus::Live),
            ..Default::default()
        }),
        1
    );
    // Either side in group B.
    assert_eq!(
        count(FixtureFilter { group: Selection::Only(Group::B), ..Default::default() }),
        2
    );
    assert_eq!(
        count(FixtureFilter {
            status: StatusFilter::Upcoming,
            group: Selection::Only(Group::A),
        }),
        1
    );
    assert_eq!(
        count(FixtureFilter { group: Selection::Only(Group::C), ..Default::default() }),
        0
    );
}

#[test]
fn fixtures_sort_by_kickoff_then_home_team() {
    let l = league();
    let mut early = fixture(&l.z, &l.y, (2024, 5, 10), FixtureStatus::Scheduled);
    early.time = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
    let late = fixture(&l.x, &l.y, (2024, 5, 10), FixtureStatus::Scheduled);
    let earliest = fixture(&l.y, &l.x, (2024, 4, 1), FixtureStatus::Scheduled);
    let fixtures = vec![late.clone(), early.clone(), earliest.clone()];
    let views = join_fixtures(&fixtures, &l.directory());

    let out = evaluate(
        &views,
        &FixtureQuery::sorted(FixtureSort::Kickoff, SortOrder::Ascending),
        DateLocale::Iso,
    );
    let ids: Vec<FixtureId> = out.iter().map(|v| v.fixture.id).collect();
    assert_eq!(ids, vec![earliest.id, early.id, late.id]);

    let out = evaluate(
        &views,
        &FixtureQuery::sorted(FixtureSort::HomeTeam, SortOrder::Descending),
        DateLocale::Iso,
    );
    let ids: Vec<FixtureId> = out.iter().map(|v| v.fixture.id).collect();
    // Zenith, Team Y, Team X.
    assert_eq!(ids, vec![early.id, earliest.id, late.id]);
}

// =============================================================================
// Teams
// =============================================================================

#[test]
fn team_sorts() {
    let l = league();
    let teams = l.teams();
    let order = |key: TeamSort, order: SortOrder| -> Vec<String> {
        evaluate(&teams, &TeamQuery::sorted(key, order), DateLocale::Iso)
            .into_iter()
            .map(|t| t.name)
            .collect()
    };

    assert_eq!(order(TeamSort::Wins, SortOrder::Descending), vec!["Team X", "Team Y", "Zenith"]);
    assert_eq!(
        order(TeamSort::GoalDifference, SortOrder::Ascending),
        vec!["Team Y", "Zenith", "Team X"]
    );
    // X and Y both played 2; Z played 3.
    assert_eq!(order(TeamSort::Played, SortOrder::Descending), vec!["Zenith", "Team X", "Team Y"]);
    assert_eq!(order(TeamSort::Group, SortOrder::Ascending), vec!["Team X", "Zenith", "Team Y"]);
}

#[test]
fn team_group_filter_and_search() {
    let l = league();
    let teams = l.teams();
    let query = league_query::by_name().with_filter(league_query::TeamFilter {
        group: Selection::AnyOf(vec![Group::A, Group::C]),
    });
    let out = evaluate(&teams, &query, DateLocale::Iso);
    assert_eq!(out.len(), 2);

    let out = evaluate(&teams, &query.with_search("TEAM"), DateLocale::Iso);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, l.x.id);
}

// =============================================================================
// Knockouts
// =============================================================================

fn knockout(stage: KnockoutStage, n: u8, teams: (Option<&Team>, Option<&Team>)) -> KnockoutFixture {
    KnockoutFixture {
        id: KnockoutFixtureId::new(),
        stage,
        match_number: n,
        team1: teams.0.map(|t| t.id),
        team2: teams.1.map(|t| t.id),
        date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        time: DEFAULT_KICKOFF,
        status: FixtureStatus::Scheduled,
        created_at: Utc::now(),
    }
}

#[test]
fn bracket_order_and_filters() {
    let l = league();
    let fixtures = vec![
        knockout(KnockoutStage::Final, 1, (None, None)),
        knockout(KnockoutStage::QuarterFinal, 2, (Some(&l.x), Some(&l.y))),
        knockout(KnockoutStage::SemiFinal, 1, (Some(&l.z), None)),
        knockout(KnockoutStage::QuarterFinal, 1, (Some(&l.y), Some(&l.z))),
    ];
    let views = join_knockouts(&fixtures, &l.directory());

    let out = evaluate(&views, &bracket_order(), DateLocale::Iso);
    let keys: Vec<(KnockoutStage, u8)> =
        out.iter().map(|v| (v.fixture.stage, v.fixture.match_number)).collect();
    assert_eq!(
        keys,
        vec![
            (KnockoutStage::QuarterFinal, 1),
            (KnockoutStage::QuarterFinal, 2),
            (KnockoutStage::SemiFinal, 1),
            (KnockoutStage::Final, 1),
        ]
    );

    let quarters = KnockoutQuery::default().with_filter(KnockoutFilter {
        stage: Selection::Only(KnockoutStage::QuarterFinal),
        ..Default::default()
    });
    assert_eq!(evaluate(&views, &quarters, DateLocale::Iso).len(), 2);

    let by_team = KnockoutQuery::default().with_search("zenith");
    assert_eq!(evaluate(&views, &by_team, DateLocale::Iso).len(), 2);

    let by_stage = KnockoutQuery::default().with_search("semi");
    assert_eq!(evaluate(&views, &by_stage, DateLocale::Iso).len(), 1);
}
