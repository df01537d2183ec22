use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rotation_tracker::calculate::{current_streak, standings};
use rotation_tracker::config::AppConfig;
use rotation_tracker::models::{MatchResult, Session};
use rotation_tracker::scheduler::{RotationError, RotationScheduler};
use rotation_tracker::storage::{
    export_match_history, JsonlWriter, SnapshotStore, StorageConfig,
};

#[derive(Parser)]
#[command(name = "rotation-tracker")]
#[command(about = "Winner-stays-on team rotation tracker")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./rotation.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new rotation, discarding any current one
    Init {
        /// Number of teams (3-20)
        #[arg(long, allow_negative_numbers = true)]
        teams: Option<i64>,
    },

    /// Draw the next match from the head of the queue
    Next,

    /// Record the result of the match in progress
    Result {
        /// team1, team2 or draw
        result: MatchResult,
    },

    /// Show the current match, waiting queue and draw trackers
    Status,

    /// List completed matches
    History,

    /// Show the standings table
    Standings,

    /// Export the match log as JSONL
    Export {
        /// Output file (default: <data-dir>/exports/matches.jsonl)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Discard the current rotation
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    let log_level = cli.log_level.clone().unwrap_or(config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with(
            (!cli.json_logs)
                .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let storage = StorageConfig::new(cli.data_dir.clone().unwrap_or(config.data_dir.clone()));
    let store = SnapshotStore::from_config(&storage);
    let mut scheduler = RotationScheduler::from_session(
        store.load().context("Failed to restore saved session")?,
    );

    match cli.command {
        Commands::Init { teams } => {
            let Some(teams) = teams.or(config.rotation.default_teams) else {
                bail!("Specify --teams or set rotation.default_teams in the config file");
            };
            let session = scheduler.initialize(teams).map_err(report)?;
            store.save(session)?;
            println!("Started rotation with {} teams.", session.total_teams());
            print_queue(session);
        }
        Commands::Next => {
            if let Some(m) = scheduler.session().and_then(|s| s.current_match()) {
                bail!(
                    "Team {} vs Team {} is still in progress; record its result first",
                    m.team1,
                    m.team2
                );
            }
            let pairing = scheduler.draw_next_match().map_err(report)?;
            save(&store, &scheduler)?;
            println!("Now playing: Team {} vs Team {}", pairing.team1, pairing.team2);
        }
        Commands::Result { result } => {
            let record = scheduler.record_result(result).map_err(report)?;
            save(&store, &scheduler)?;
            match record.winner() {
                Some(winner) => println!(
                    "Match {}: Team {} wins and stays on.",
                    record.match_number, winner
                ),
                None => println!(
                    "Match {}: Team {} and Team {} draw.",
                    record.match_number, record.team1, record.team2
                ),
            }
            if let Some(session) = scheduler.session() {
                print_queue(session);
            }
        }
        Commands::Status => {
            let session = require_session(&scheduler)?;
            print_status(session);
        }
        Commands::History => {
            let session = require_session(&scheduler)?;
            if session.match_history().is_empty() {
                println!("No matches played yet.");
            }
            for record in session.match_history() {
                let outcome = match record.result {
                    MatchResult::Team1Win => format!("Team {} won", record.team1),
                    MatchResult::Team2Win => format!("Team {} won", record.team2),
                    MatchResult::Draw => "Draw".to_string(),
                };
                println!(
                    "#{:<3} Team {:>2} vs Team {:>2}  {}",
                    record.match_number, record.team1, record.team2, outcome
                );
            }
        }
        Commands::Standings => {
            let session = require_session(&scheduler)?;
            println!(
                "{:<6} {:>3} {:>3} {:>3} {:>3} {:>4} {:>6}",
                "Team", "P", "W", "D", "L", "Pts", "Win%"
            );
            for row in standings(session) {
                println!(
                    "{:<6} {:>3} {:>3} {:>3} {:>3} {:>4} {:>5.1}%",
                    row.team,
                    row.played,
                    row.wins,
                    row.draws,
                    row.losses,
                    row.points,
                    row.win_rate() * 100.0
                );
            }
            if let Some((team, length)) = current_streak(session) {
                println!("\nTeam {} has won {} in a row.", team, length);
            }
        }
        Commands::Export { out } => {
            let session = require_session(&scheduler)?;
            let count = match out {
                Some(path) => JsonlWriter::new(path).write_all(session.match_history())?,
                None => export_match_history(&storage, session.match_history())?,
            };
            println!("Exported {} matches.", count);
        }
        Commands::Reset => {
            scheduler.reset();
            store.clear()?;
            println!("Rotation reset.");
        }
    }

    Ok(())
}

/// Turn an engine error into a CLI error, keeping its message verbatim.
fn report(err: RotationError) -> anyhow::Error {
    if err.is_user_error() {
        tracing::debug!("Rejected: {}", err);
        anyhow::Error::new(err)
    } else {
        tracing::warn!("Command used out of order: {}", err);
        anyhow::Error::new(err).context("Usage error")
    }
}

fn save(store: &SnapshotStore, scheduler: &RotationScheduler) -> Result<()> {
    if let Some(session) = scheduler.session() {
        store.save(session).context("Failed to save session")?;
    }
    Ok(())
}

fn require_session(scheduler: &RotationScheduler) -> Result<&Session> {
    scheduler
        .session()
        .context("No rotation in progress; run `init` first")
}

fn print_queue(session: &Session) {
    let queue: Vec<String> = session
        .waiting_queue()
        .iter()
        .map(|t| t.to_string())
        .collect();
    println!("Queue: [{}]", queue.join(", "));
}

fn print_status(session: &Session) {
    println!(
        "Teams: {}   Matches played: {}",
        session.total_teams(),
        session.match_counter()
    );
    if let Some(started) = session.started_at() {
        println!("Started: {}", started.format("%Y-%m-%d %H:%M"));
    }

    match session.current_match() {
        Some(m) => println!("Now playing: Team {} vs Team {}", m.team1, m.team2),
        None => match session.next_up() {
            Some((a, b)) => println!("Up next: Team {} vs Team {}", a, b),
            None => println!("No match can be drawn."),
        },
    }
    print_queue(session);

    let trackers = session.draw_trackers();
    if !trackers.is_empty() {
        println!("\nDraw tie-breaks:");
        for tracker in trackers {
            println!(
                "  Teams {} & {}: Team {} plays first on the next draw",
                tracker.team1, tracker.team2, tracker.next_to_play
            );
        }
    }
}
