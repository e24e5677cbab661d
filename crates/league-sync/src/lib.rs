//! View synchronizer for the league dashboard.
//!
//! Each dashboard session owns one [`ViewSession`]: the complete current
//! contents of the team, player, fixture and knockout families, the active
//! query of each list view, and the evaluated lists published through a
//! `watch` channel. The store's change feed drives full re-fetches; there
//! is no incremental patching and no eviction.
//!
//! # Modules
//!
//! - [`session`] -- `ViewSession`: refresh, query setters and the feed loop
//! - [`views`] -- View identities, `ViewQueries`, `ViewSnapshot`
//! - [`table`] -- Per-family id map that remembers listing order
//! - [`error`] -- `SyncError`

pub mod error;
pub mod session;
pub mod table;
pub mod views;

// Re-export primary types at crate root.
pub use error::SyncError;
pub use session::ViewSession;
pub use table::FamilyTable;
pub use views::{VIEW_FAMILIES, View, ViewQueries, ViewSnapshot};
