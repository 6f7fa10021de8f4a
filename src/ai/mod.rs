//! Move-selection strategies: the agent trait, column-scoring policies,
//! Monte-Carlo tree search, tabular Q-learning and the dispatcher tying
//! them to scenario tags.

pub(crate) mod agent;
mod greedy;
pub mod mcts;
mod policy;
pub mod qlearning;
pub(crate) mod random;
mod strategy;

pub use agent::Agent;
pub use greedy::GreedyAgent;
pub use mcts::{MctsConfig, SearchEngine, SearchResult};
pub use policy::{ColumnScores, EvaluationPolicy, HeuristicPolicy, PolicyKind, UniformPolicy};
pub use qlearning::{QAgent, QLearningConfig, QTable, Transition};
pub use random::{RandomAgent, RandomConfig};
pub use strategy::{Algorithm, Engine, Strategy};
