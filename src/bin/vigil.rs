//! Daemon binary for vigil.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vigil::config::VigilConfig;
use vigil::evaluator::TriggerEvaluator;
use vigil::probe::{GithubProbe, LeetCodeProbe};
use vigil::scheduler::{SchedulerLoop, local_minute_key};
use vigil::store::JsonStore;
use vigil::trigger::{Outcome, Platform, Trigger};

/// Vigil: daily coding-activity reminder daemon.
#[derive(Parser)]
#[command(name = "vigil", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the scheduler until interrupted.
    Run,

    /// Check both platforms once for a username and print the outcomes.
    Check {
        /// Username to check (falls back to `github.username` from config).
        username: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vigil=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = if let Some(ref path) = cli.config {
        VigilConfig::from_file(path)?
    } else {
        let path = VigilConfig::default_config_path();
        if path.exists() {
            VigilConfig::from_file(&path)?
        } else {
            VigilConfig::default()
        }
    };

    // Credentials cross the process boundary here, never inside the probes.
    if config.github.token.is_none()
        && let Ok(token) = std::env::var("GITHUB_TOKEN")
    {
        config.github.token = Some(token);
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_scheduler(config).await,
        Command::Check { username } => run_check(config, username).await,
    }
}

async fn run_scheduler(config: VigilConfig) -> anyhow::Result<()> {
    let state_path = config
        .store
        .state_path
        .clone()
        .unwrap_or_else(JsonStore::default_state_path);
    let store = Arc::new(
        JsonStore::open(&state_path)?.with_history_limit(config.store.history_limit),
    );
    info!(path = %state_path.display(), triggers = store.triggers().len(), "state loaded");

    let scheduler = Arc::new(
        SchedulerLoop::new(store.clone(), store, build_evaluator(&config))
            .with_check_interval(Duration::from_secs(config.scheduler.check_interval_secs)),
    );

    let stopper = scheduler.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            stopper.stop();
        }
    });

    scheduler.run().await;
    Ok(())
}

async fn run_check(config: VigilConfig, username: Option<String>) -> anyhow::Result<()> {
    let username = username
        .or_else(|| config.github.username.clone())
        .ok_or_else(|| anyhow::anyhow!("no username given and none configured under [github]"))?;

    println!("Checking daily activity for {username}...");

    let evaluator = build_evaluator(&config);
    for platform in [Platform::Github, Platform::Leetcode] {
        let trigger = Trigger::new(platform, username.clone(), local_minute_key());
        let record = evaluator.evaluate(&trigger).await;
        match record.outcome {
            Outcome::Fired { message } => println!("{platform}: reminder: {message}"),
            Outcome::Completed => println!("{platform}: already done today"),
            Outcome::Error { code, message } => println!("{platform}: error [{code}] {message}"),
        }
    }

    Ok(())
}

fn build_evaluator(config: &VigilConfig) -> TriggerEvaluator {
    TriggerEvaluator::new()
        .with_probe(Arc::new(GithubProbe::new(config.github.clone())))
        .with_probe(Arc::new(LeetCodeProbe::new(config.leetcode.clone())))
        .with_probe_timeout(Duration::from_secs(config.scheduler.probe_timeout_secs))
}
