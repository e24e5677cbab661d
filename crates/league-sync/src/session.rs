//! The per-session view synchronizer.
//!
//! A [`ViewSession`] is created for one dashboard session and dropped with
//! it. It holds every view family in full, re-fetches a family whole when
//! the change feed names it, re-runs the query pipeline for the views that
//! depend on that family, and publishes the result through a `watch`
//! channel.
//!
//! # Refresh flow
//!
//! ```text
//! ChangeFeed --(family)--> refresh(family) --> store.list_*()
//!                                  |
//!                                  v
//!                    replace FamilyTable, evaluate affected views
//!                                  |
//!                                  v
//!                     watch::Sender<ViewSnapshot>::send_replace
//! ```
//!
//! A failed fetch leaves the previous contents and snapshot in place.

use std::sync::Arc;

use league_query::{
    DateLocale, FixtureQuery, KnockoutQuery, PlayerQuery, TeamDirectory, TeamQuery, evaluate,
    join_fixtures, join_knockouts, join_players,
};
use league_store::{EntityStore, FeedEvent};
use league_types::{
    Family, Fixture, FixtureId, KnockoutFixture, KnockoutFixtureId, Player, PlayerId, Team,
    TeamId,
};
use tokio::sync::{RwLock, watch};

use crate::error::SyncError;
use crate::table::FamilyTable;
use crate::views::{VIEW_FAMILIES, View, ViewQueries, ViewSnapshot};

/// Everything a session holds behind its lock.
#[derive(Debug, Default)]
struct SessionState {
    teams: FamilyTable<TeamId, Team>,
    players: FamilyTable<PlayerId, Player>,
    fixtures: FamilyTable<FixtureId, Fixture>,
    knockouts: FamilyTable<KnockoutFixtureId, KnockoutFixture>,
    queries: ViewQueries,
    snapshot: ViewSnapshot,
}

impl SessionState {
    /// Re-run the pipeline for `views` and bump the revision.
    fn reevaluate(&mut self, views: &[View], locale: DateLocale) {
        let teams = self.teams.ordered();
        let directory = TeamDirectory::new(&teams);
        for view in views {
            match view {
                View::Players => {
                    let joined = join_players(&self.players.ordered(), &directory);
                    self.snapshot.players = evaluate(&joined, &self.queries.players, locale);
                }
                View::Fixtures => {
                    let joined = join_fixtures(&self.fixtures.ordered(), &directory);
                    self.snapshot.fixtures = evaluate(&joined, &self.queries.fixtures, locale);
                }
                View::Teams => {
                    self.snapshot.teams = evaluate(&teams, &self.queries.teams, locale);
                }
                View::Knockouts => {
                    let joined = join_knockouts(&self.knockouts.ordered(), &directory);
                    self.snapshot.knockouts = evaluate(&joined, &self.queries.knockouts, locale);
                }
            }
        }
        self.snapshot.revision = self.snapshot.revision.saturating_add(1);
    }
}

/// Freshly fetched contents of one family.
enum Fetched {
    Teams(Vec<Team>),
    Players(Vec<Player>),
    Fixtures(Vec<Fixture>),
    Knockouts(Vec<KnockoutFixture>),
}

/// Materialized views for one dashboard session.
#[derive(Debug)]
pub struct ViewSession<S> {
    store: Arc<S>,
    locale: DateLocale,
    state: RwLock<SessionState>,
    tx: watch::Sender<ViewSnapshot>,
}

impl<S: EntityStore> ViewSession<S> {
    /// Create an empty session. Call [`Self::load`] or [`Self::run`] to
    /// populate it.
    pub fn new(store: Arc<S>, locale: DateLocale) -> Self {
        let (tx, _) = watch::channel(ViewSnapshot::default());
        Self {
            store,
            locale,
            state: RwLock::new(SessionState::default()),
            tx,
        }
    }

    /// Watch the published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> ViewSnapshot {
        self.tx.borrow().clone()
    }

    /// The active queries.
    pub async fn queries(&self) -> ViewQueries {
        self.state.read().await.queries.clone()
    }

    /// Look up a materialized team.
    pub async fn team(&self, id: TeamId) -> Option<Team> {
        self.state.read().await.teams.get(&id).cloned()
    }

    /// Look up a materialized fixture.
    pub async fn fixture(&self, id: FixtureId) -> Option<Fixture> {
        self.state.read().await.fixtures.get(&id).cloned()
    }

    /// Fetch every view family.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] on the first failed fetch. Families
    /// fetched before it are kept.
    pub async fn load(&self) -> Result<(), SyncError> {
        for family in VIEW_FAMILIES {
            self.refresh(family).await?;
        }
        Ok(())
    }

    /// Re-fetch one family in full and re-evaluate the views that depend
    /// on it. Families no view shows are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the fetch fails; nothing changes.
    pub async fn refresh(&self, family: Family) -> Result<(), SyncError> {
        let fetched = match family {
            Family::Teams => Fetched::Teams(self.store.list_teams().await?),
            Family::Players => Fetched::Players(self.store.list_players().await?),
            Family::Fixtures => Fetched::Fixtures(self.store.list_fixtures().await?),
            Family::KnockoutFixtures => Fetched::Knockouts(self.store.list_knockouts().await?),
            Family::ResultLog => return Ok(()),
        };

        let mut state = self.state.write().await;
        let count = match fetched {
            Fetched::Teams(rows) => {
                state.teams.replace(rows, |t| t.id);
                state.teams.len()
            }
            Fetched::Players(rows) => {
                state.players.replace(rows, |p| p.id);
                state.players.len()
            }
            Fetched::Fixtures(rows) => {
                state.fixtures.replace(rows, |f| f.id);
                state.fixtures.len()
            }
            Fetched::Knockouts(rows) => {
                state.knockouts.replace(rows, |k| k.id);
                state.knockouts.len()
            }
        };
        state.reevaluate(View::affected_by(family), self.locale);
        self.tx.send_replace(state.snapshot.clone());

        tracing::debug!(
            family = %family,
            records = count,
            revision = state.snapshot.revision,
            "View family refreshed"
        );
        Ok(())
    }

    /// Replace the player list query and re-evaluate that view.
    pub async fn set_player_query(&self, query: PlayerQuery) {
        self.requery(View::Players, |q| q.players = query).await;
    }

    /// Replace the fixture list query and re-evaluate that view.
    pub async fn set_fixture_query(&self, query: FixtureQuery) {
        self.requery(View::Fixtures, |q| q.fixtures = query).await;
    }

    /// Replace the team list query and re-evaluate that view.
    pub async fn set_team_query(&self, query: TeamQuery) {
        self.requery(View::Teams, |q| q.teams = query).await;
    }

    /// Replace the knockout list query and re-evaluate that view.
    pub async fn set_knockout_query(&self, query: KnockoutQuery) {
        self.requery(View::Knockouts, |q| q.knockouts = query).await;
    }

    async fn requery(&self, view: View, update: impl FnOnce(&mut ViewQueries)) {
        let mut state = self.state.write().await;
        update(&mut state.queries);
        state.reevaluate(&[view], self.locale);
        self.tx.send_replace(state.snapshot.clone());
    }

    /// Load everything, then refresh on every change notice until
    /// `shutdown` turns true or the store's feed closes.
    ///
    /// The feed is opened before the initial load so no change between
    /// the two is missed. A lagged feed triggers a full reload. A failed
    /// refresh is logged and the previous contents stay published.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] only if the initial load fails.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), SyncError> {
        let mut feed = self.store.subscribe();
        self.load().await?;
        tracing::info!(revision = self.tx.borrow().revision, "View session started");

        loop {
            tokio::select! {
                event = feed.recv_for(&VIEW_FAMILIES) => match event {
                    FeedEvent::Changed(notice) => {
                        if let Err(e) = self.refresh(notice.family).await {
                            tracing::warn!(
                                family = %notice.family,
                                error = %e,
                                "View refresh failed; keeping previous contents"
                            );
                        }
                    }
                    FeedEvent::Lagged(skipped) => {
                        tracing::debug!(skipped, "Change feed lagged; reloading every view");
                        if let Err(e) = self.load().await {
                            tracing::warn!(error = %e, "View reload failed; keeping previous contents");
                        }
                    }
                    FeedEvent::Closed => {
                        tracing::info!("Change feed closed; view session stopping");
                        return Ok(());
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("View session shut down");
                        return Ok(());
                    }
                }
            }
        }
    }
}
