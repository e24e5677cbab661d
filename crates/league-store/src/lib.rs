//! Storage layer for the league dashboard.
//!
//! Every component above this crate talks to storage through the
//! [`EntityStore`] trait, so the standings engine, the view synchronizer and
//! the admin service run unchanged against either implementation.
//!
//! # Architecture
//!
//! ```text
//! StandingsAggregator / ViewSession / AdminService
//!     |
//!     +-- EntityStore (trait)
//!         |-- MemoryStore   (tokio RwLock tables, in-process ChangeBus)
//!         +-- PgStore       (sqlx pool, LISTEN/NOTIFY bridged to ChangeBus)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The `EntityStore` contract and conditional-write results
//! - [`feed`] -- Change notices, the broadcast bus and per-consumer feeds
//! - [`memory`] -- In-memory store with failure injection
//! - [`postgres`] -- `PostgreSQL` pool, configuration and store
//! - [`rows`] -- `PostgreSQL` row types and record conversion
//! - [`order`] -- Canonical list orderings
//! - [`error`] -- Shared error types

pub mod error;
pub mod feed;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod rows;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use feed::{ChangeBus, ChangeFeed, ChangeKind, ChangeNotice, FEED_CAPACITY, FeedEvent};
pub use memory::{MemoryStore, StoreOp};
pub use postgres::{CHANGE_CHANNEL, PgStore, PostgresConfig};
pub use store::{EntityStore, FixtureTransition};
