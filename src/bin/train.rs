use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use connect_four_search::ai::{QAgent, RandomAgent};
use connect_four_search::config::AppConfig;
use connect_four_search::error::{CheckpointError, TrainingError};
use connect_four_search::game::Player;
use connect_four_search::training::trainer::Trainer;

/// Train a tabular Q-learning agent against a random opponent.
#[derive(Parser)]
#[command(name = "train", about = "Train a Connect Four Q-learning agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Side the agent plays (R or Y)
    #[arg(long)]
    player: Option<Player>,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Write the default configuration as TOML to stdout and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("connect_four_search=info,train=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml().context("rendering default config")?);
        return Ok(());
    }

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    if let Some(lr) = cli.lr {
        app_config.qlearning.learning_rate = lr;
    }
    if let Some(player) = cli.player {
        app_config.training.player = player;
    }
    app_config.validate().context("invalid configuration")?;

    let trainer = Trainer::new(app_config.training.clone(), app_config.checkpoint.clone())
        .context("preparing checkpoint directory")?;
    let mut agent = QAgent::new(app_config.qlearning.clone());

    if cli.resume {
        match trainer.resume(&mut agent) {
            Ok(episode) => info!(episode, "resuming training"),
            Err(TrainingError::Checkpoint(e @ CheckpointError::NoLatestSymlink(_))) => {
                warn!(error = %e, "no checkpoint found, starting fresh");
            }
            Err(e) => return Err(e).context("resuming from latest checkpoint"),
        }
    }

    let mut opponent = match app_config.qlearning.seed {
        Some(seed) => RandomAgent::with_seed(seed.wrapping_add(1)),
        None => RandomAgent::new(),
    };

    let report = trainer
        .train(&mut agent, &mut opponent)
        .context("training Q-learning agent")?;

    println!(
        "Trained {} episodes; greedy win rate vs random: {:.1}% ({} states)",
        report.episodes,
        report.final_win_rate * 100.0,
        agent.table().len()
    );
    Ok(())
}
