//! Query pipeline shared by every league dashboard list view.
//!
//! A list view is a collection plus a [`Query`]: filter clauses, a search
//! term, a sort key and a direction. [`evaluate`] applies them in that
//! order and returns a new sequence; the input is never touched.
//!
//! # Modules
//!
//! - [`pipeline`] -- `Selection`, `Query`, the stage traits and `evaluate`
//! - [`locale`] -- Date display formats used by fixture search
//! - [`join`] -- Team name and group lookup for joined views
//! - [`players`] -- Player list (team filter, name/team search, counters)
//! - [`fixtures`] -- Fixture list (status and group filters, date search)
//! - [`teams`] -- Team list and standings sorts
//! - [`knockouts`] -- Bracket list (stage and status filters)
//!
//! # Usage
//!
//! ```
//! use league_query::{DateLocale, TeamFilter, TeamQuery, Selection, evaluate};
//! use league_types::{Group, Team};
//!
//! let teams: Vec<Team> = Vec::new();
//! let query = TeamQuery::default().with_filter(TeamFilter {
//!     group: Selection::Only(Group::A),
//! });
//! assert!(evaluate(&teams, &query, DateLocale::French).is_empty());
//! ```

pub mod fixtures;
pub mod join;
pub mod knockouts;
pub mod locale;
pub mod pipeline;
pub mod players;
pub mod teams;

// Re-export primary types at crate root.
pub use fixtures::{FixtureFilter, FixtureQuery, FixtureSort, FixtureView, StatusFilter, join_fixtures};
pub use join::{TeamDirectory, TeamLabel};
pub use knockouts::{
    KnockoutFilter, KnockoutQuery, KnockoutSort, KnockoutView, bracket_order, join_knockouts,
    stage_label,
};
pub use locale::{DateLocale, ParseLocaleError};
pub use pipeline::{Filter, Query, Searchable, Selection, SortKey, SortOrder, evaluate};
pub use players::{PlayerFilter, PlayerQuery, PlayerSort, PlayerView, join_players, top_scorers};
pub use teams::{TeamFilter, TeamQuery, TeamSort, by_name};
