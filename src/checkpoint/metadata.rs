use serde::{Deserialize, Serialize};

use crate::ai::QLearningConfig;
use crate::game::Player;

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Greedy win rate against the random opponent.
    pub win_rate: f64,
    pub draw_rate: f64,
    pub average_game_length: f64,
    pub average_td_error: f64,
    /// States in the value table.
    pub table_size: usize,
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningHyperparameters {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub player: Player,
}

impl QLearningHyperparameters {
    pub fn new(config: &QLearningConfig, epsilon: f64, player: Player) -> Self {
        QLearningHyperparameters {
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            epsilon,
            player,
        }
    }
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub algorithm: String,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: QLearningHyperparameters,
}
