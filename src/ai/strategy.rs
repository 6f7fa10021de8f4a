use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::config::AppConfig;
use crate::error::{AgentError, ConfigError, ScenarioError};
use crate::game::{Board, Player};

use super::agent::Agent;
use super::greedy::GreedyAgent;
use super::mcts::SearchEngine;
use super::policy::EvaluationPolicy;
use super::qlearning::QAgent;
use super::random::RandomAgent;

/// Move-selection algorithms, named by their scenario tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// `UR`: uniform random.
    UniformRandom,
    /// `UCT`: Monte-Carlo tree search.
    Uct,
    /// `QL`: tabular Q-learning.
    QLearning,
    /// `DQN`: greedy play over an externally supplied evaluator.
    Model,
}

impl Algorithm {
    pub fn tag(self) -> &'static str {
        match self {
            Algorithm::UniformRandom => "UR",
            Algorithm::Uct => "UCT",
            Algorithm::QLearning => "QL",
            Algorithm::Model => "DQN",
        }
    }
}

impl FromStr for Algorithm {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UR" => Ok(Algorithm::UniformRandom),
            "UCT" => Ok(Algorithm::Uct),
            "QL" => Ok(Algorithm::QLearning),
            "DQN" => Ok(Algorithm::Model),
            _ => Err(ScenarioError::UnknownAlgorithm(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One agent per [`Algorithm`], dispatched without string lookups.
pub enum Engine {
    UniformRandom(RandomAgent),
    Mcts(SearchEngine<Box<dyn EvaluationPolicy>>),
    QLearning(QAgent),
    Model(GreedyAgent<Box<dyn EvaluationPolicy>>),
}

impl Engine {
    fn agent(&mut self) -> &mut dyn Agent {
        match self {
            Engine::UniformRandom(agent) => agent,
            Engine::Mcts(engine) => engine,
            Engine::QLearning(agent) => agent,
            Engine::Model(agent) => agent,
        }
    }
}

/// An [`Engine`] plus the seeded random agent used when the engine finds no
/// move on a board that still has open columns.
pub struct Strategy {
    engine: Engine,
    fallback: RandomAgent,
}

impl Strategy {
    /// Build the agent for `algorithm` from configuration alone.
    ///
    /// The fallback shares the seed of the section that configures the
    /// engine. The Q-learning agent starts with an empty table.
    /// `Algorithm::Model` has no built-in evaluator; use [`Strategy::model`]
    /// instead.
    pub fn from_config(algorithm: Algorithm, config: &AppConfig) -> Result<Self, ConfigError> {
        let (engine, seed) = match algorithm {
            Algorithm::UniformRandom => (
                Engine::UniformRandom(RandomAgent::from_config(&config.random)),
                config.random.seed,
            ),
            Algorithm::Uct => (
                Engine::Mcts(SearchEngine::from_config(config.mcts.clone())),
                config.mcts.seed,
            ),
            Algorithm::QLearning => (
                Engine::QLearning(QAgent::new(config.qlearning.clone())),
                config.qlearning.seed,
            ),
            Algorithm::Model => {
                return Err(ConfigError::UnsupportedAlgorithm(
                    algorithm.tag().to_string(),
                ))
            }
        };
        Ok(Strategy::new(engine, seed))
    }

    pub fn new(engine: Engine, fallback_seed: Option<u64>) -> Self {
        Strategy {
            engine,
            fallback: RandomAgent::from_seed(fallback_seed),
        }
    }

    /// Q-learning strategy over an already trained agent.
    pub fn q_learning(agent: QAgent) -> Self {
        let seed = agent.config().seed;
        Strategy::new(Engine::QLearning(agent), seed)
    }

    /// Greedy strategy over an injected evaluator.
    pub fn model(policy: Box<dyn EvaluationPolicy>) -> Self {
        Strategy::new(Engine::Model(GreedyAgent::new(policy)), None)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn algorithm(&self) -> Algorithm {
        match self.engine {
            Engine::UniformRandom(_) => Algorithm::UniformRandom,
            Engine::Mcts(_) => Algorithm::Uct,
            Engine::QLearning(_) => Algorithm::QLearning,
            Engine::Model(_) => Algorithm::Model,
        }
    }
}

impl Agent for Strategy {
    /// Falls back to a uniform-random column if the engine finds no move on
    /// a board that still has one.
    fn select_column(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        match self.engine.agent().select_column(board, player) {
            Err(AgentError::NoLegalMove) if !board.available_columns().is_empty() => {
                warn!(
                    algorithm = %self.algorithm(),
                    "engine returned no move on a playable board, playing a random column"
                );
                self.fallback.select_column(board, player)
            }
            result => result,
        }
    }

    fn name(&self) -> &str {
        match &self.engine {
            Engine::UniformRandom(agent) => agent.name(),
            Engine::Mcts(engine) => engine.name(),
            Engine::QLearning(agent) => agent.name(),
            Engine::Model(agent) => agent.name(),
        }
    }
}
