use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use connect_four_search::ai::{Agent, Algorithm, QAgent, QTable, RandomAgent, Strategy};
use connect_four_search::config::AppConfig;
use connect_four_search::game::{Board, GameOutcome, Player};
use connect_four_search::scenario::Scenario;

/// Pick a move for a Connect Four scenario and print the resulting board.
#[derive(Parser)]
#[command(name = "connect-four", about = "Play one move of a Connect Four scenario")]
struct Cli {
    /// Scenario file: algorithm tag, player, then six board rows
    scenario: PathBuf,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the scenario's algorithm tag (UR, UCT, QL or DQN)
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// Override the number of MCTS simulations
    #[arg(long)]
    simulations: Option<usize>,

    /// Seed every random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Value table for QL; without one a fresh table is trained first
    #[arg(long)]
    q_table: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("connect_four_search=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(simulations) = cli.simulations {
        config.mcts.simulations = simulations;
    }
    if let Some(seed) = cli.seed {
        config.random.seed = Some(seed);
        config.mcts.seed = Some(seed);
        config.qlearning.seed = Some(seed);
    }
    config.validate().context("invalid configuration")?;

    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("loading scenario {}", cli.scenario.display()))?;
    let algorithm = cli.algorithm.unwrap_or(scenario.algorithm);
    let player = scenario.player;
    let mut board = scenario.board;

    println!("{board}");
    if let Some(outcome) = board.outcome() {
        report_outcome(outcome);
        return Ok(());
    }

    let mut strategy = build_strategy(algorithm, &config, cli.q_table.as_deref(), player)?;
    let column = strategy
        .select_column(&board, player)
        .with_context(|| format!("{} found no move", strategy.name()))?;
    board
        .drop_piece(column, player)
        .with_context(|| format!("applying column {}", column + 1))?;

    println!();
    println!("{} ({}) plays column {}", player.name(), strategy.name(), column + 1);
    println!("{board}");
    if let Some(outcome) = board.outcome() {
        report_outcome(outcome);
    }
    Ok(())
}

fn build_strategy(
    algorithm: Algorithm,
    config: &AppConfig,
    q_table: Option<&std::path::Path>,
    player: Player,
) -> Result<Strategy> {
    match algorithm {
        Algorithm::QLearning => {
            let mut agent = match q_table {
                Some(path) => {
                    let table = QTable::load(path)
                        .with_context(|| format!("loading value table {}", path.display()))?;
                    QAgent::with_table(config.qlearning.clone(), table)
                }
                None => {
                    let mut agent = QAgent::new(config.qlearning.clone());
                    let mut opponent =
                        RandomAgent::from_seed(config.qlearning.seed.map(|s| s.wrapping_add(1)));
                    let episodes = config.training.num_episodes;
                    info!(episodes, "no value table given, training one first");
                    agent
                        .train(player, episodes, &Board::new(), &mut opponent)
                        .context("training Q-learning agent")?;
                    agent
                }
            };
            agent.set_epsilon(0.0);
            Ok(Strategy::q_learning(agent))
        }
        Algorithm::Model => bail!(
            "algorithm {} needs an externally supplied evaluator; use UR, UCT or QL",
            algorithm
        ),
        _ => Strategy::from_config(algorithm, config).context("building strategy"),
    }
}

fn report_outcome(outcome: GameOutcome) {
    match outcome {
        GameOutcome::Winner(player) => println!("Game over: {} wins", player.name()),
        GameOutcome::Draw => println!("Game over: draw"),
    }
}
