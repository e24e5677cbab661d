//! Administrative service, configuration and operator CLI for the league
//! dashboard.
//!
//! [`AdminService`] is the only write surface for teams, players, group
//! fixtures and knockout fixtures. Every write checks an [`Authenticator`]
//! first and validates form input before the store is touched. Scores go
//! through the standings aggregator.
//!
//! # Modules
//!
//! - [`service`] -- `AdminService`: create, update and delete per family
//! - [`validate`] -- Form field checks
//! - [`auth`] -- The authentication signal
//! - [`config`] -- `league-config.yaml` loading
//! - [`error`] -- `AdminError`

pub mod auth;
pub mod config;
pub mod error;
pub mod service;
pub mod validate;

// Re-export primary types at crate root.
pub use auth::{Authenticator, SessionAuth, StaticAuth};
pub use config::{CONFIG_FILE, ConfigError, DatabaseConfig, LeagueConfig, LeagueSettings, LoggingConfig};
pub use error::AdminError;
pub use service::AdminService;
