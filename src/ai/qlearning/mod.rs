//! Tabular Q-learning: a value table keyed by board and an epsilon-greedy
//! agent that learns it by playing against an opponent.

mod agent;
mod table;

pub use agent::{QAgent, QLearningConfig, Transition};
pub use table::QTable;
