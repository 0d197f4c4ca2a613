// Courtside entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries the JSON snapshot)
// 2. Load config
// 3. Open the favorites store
// 4. Build the API client and view model
// 5. Load team info and the requested season concurrently
// 6. Apply the optional filter and print the snapshot

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use courtside_api::BallDontLieClient;
use courtside_app::protocol::LoadOutcome;
use courtside_app::ResultsViewModel;
use courtside_core::config;
use courtside_core::db::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Courtside starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: team {}, default season {}",
        config.tracked_team_id, config.default_season
    );

    // Usage: courtside [season] [all|wins]
    let mut args = std::env::args().skip(1);
    let season = match args.next() {
        Some(arg) => arg
            .parse::<i32>()
            .with_context(|| format!("season must be a start year like 2022, got `{arg}`"))?,
        None => config.default_season,
    };
    anyhow::ensure!(
        config::SEASON_RANGE.contains(&season),
        "season must be between {} and {}, got {season}",
        config::SEASON_RANGE.start(),
        config::SEASON_RANGE.end()
    );
    let filter = args.next();

    // 3. Open the favorites store
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let store = SqliteStore::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Build the API client and view model
    let client = BallDontLieClient::from_config(&config).context("failed to build API client")?;
    let view_model = ResultsViewModel::new(&config, client, store);

    // 5. Load team info and the season
    let (_team, outcome) = tokio::join!(view_model.load_team(), view_model.load_season(season));
    match &outcome {
        LoadOutcome::Ready { season, games } => info!("Season {season}: {games} game(s)"),
        LoadOutcome::Failed { season, error } => warn!("Season {season} failed: {error}"),
        LoadOutcome::Superseded { season } => warn!("Season {season} superseded"),
        LoadOutcome::Rejected { season } => warn!("Season {season} rejected"),
    }
    info!("Showing season {}", view_model.current_season());

    // 6. Apply the filter and print
    if let Some(filter) = filter {
        view_model.set_filter(&filter);
    }
    let snapshot = view_model.snapshot();
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("failed to serialize snapshot")?
    );

    info!("Courtside finished");
    Ok(())
}

const DEFAULT_LOG_FILTER: &str =
    "courtside=info,courtside_app=info,courtside_core=info,courtside_api=info,warn";

/// Initialize tracing to log to a file so stdout stays machine-readable.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("courtside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
