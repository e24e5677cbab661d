//! Operator CLI for the league dashboard.
//!
//! Connects to `PostgreSQL` using `league-config.yaml` (or `DATABASE_URL`)
//! and runs one maintenance command:
//!
//! - `migrate` applies the schema migrations
//! - `check` verifies team standings against the played fixtures
//! - `repair` overwrites drifted standings with the replayed values
//! - `recover` settles result entries left pending by an interrupted write
//! - `record-score` records a fixture result
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use league_admin::{AdminService, CONFIG_FILE, LeagueConfig, LoggingConfig, StaticAuth};
use league_standings::{Reconciler, RecoveryPolicy};
use league_store::PgStore;
use league_types::FixtureId;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "league-admin", version, about = "League dashboard maintenance")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, env = "LEAGUE_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Compare stored standings with a replay of the played fixtures.
    Check,
    /// Overwrite drifted standings. Refused while results are pending.
    Repair,
    /// Settle result entries left pending by an interrupted write.
    Recover {
        /// What to do with entries whose fixture was already marked played.
        #[arg(long, value_enum, default_value_t = PolicyArg::Finish)]
        policy: PolicyArg,
    },
    /// Record the final score of a fixture.
    RecordScore {
        /// Fixture id.
        fixture: Uuid,
        /// Home goals.
        home: i64,
        /// Away goals.
        away: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Finish,
    RollBack,
}

impl From<PolicyArg> for RecoveryPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Finish => Self::Finish,
            PolicyArg::RollBack => Self::RollBack,
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = LeagueConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    init_logging(&config.logging);

    let store = PgStore::connect(&config.database.to_postgres())
        .await
        .context("failed to connect to PostgreSQL")?;
    let store = Arc::new(store);
    let outcome = run(cli.command, &config, Arc::clone(&store)).await;
    store.close().await;
    outcome
}

async fn run(command: Command, config: &LeagueConfig, store: Arc<PgStore>) -> anyhow::Result<()> {
    match command {
        Command::Migrate => {
            store.run_migrations().await.context("migration failed")?;
            tracing::info!("Migrations applied");
        }
        Command::Check => {
            let check = Reconciler::new(store).check().await?;
            print_json(&check)?;
        }
        Command::Repair => {
            let repaired = Reconciler::new(store).repair().await?;
            tracing::info!(teams = repaired.len(), "Repair finished");
            print_json(&repaired)?;
        }
        Command::Recover { policy } => {
            let report = Reconciler::new(store).recover(policy.into()).await?;
            print_json(&report)?;
        }
        Command::RecordScore {
            fixture,
            home,
            away,
        } => {
            let kickoff = config.league.kickoff()?;
            let service = AdminService::new(store, Arc::new(StaticAuth(true)), kickoff);
            let outcome = service
                .record_score(FixtureId(fixture), Some(home), Some(away))
                .await?;
            print_json(&outcome)?;
        }
    }
    Ok(())
}
