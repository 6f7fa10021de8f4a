use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::error::AgentError;
use crate::game::{Board, Player};

use super::agent::Agent;

/// Settings for the uniform-random strategy (`[random]` in `config.toml`).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

/// An agent that selects uniformly at random from legal columns.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic agent for reproducible games.
    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is set, OS entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    pub fn from_config(config: &RandomConfig) -> Self {
        Self::from_seed(config.seed)
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn select_column(&mut self, board: &Board, _player: Player) -> Result<usize, AgentError> {
        let columns = board.available_columns();
        if columns.is_empty() {
            return Err(AgentError::NoLegalMove);
        }
        let idx = self.rng.random_range(0..columns.len());
        Ok(columns[idx])
    }

    fn name(&self) -> &str {
        "Random"
    }
}
