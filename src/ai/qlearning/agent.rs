use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::ai::agent::{apply_move, ensure_legal, Agent};
use crate::ai::random::RandomAgent;
use crate::error::{AgentError, QTableError};
use crate::game::{Board, BoardKey, Player};
use crate::training::episode::win_fraction;
use crate::training::metrics::{EpisodeOutcome, EpisodeResult};

use super::table::QTable;

/// Tabular Q-learning hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    /// Exploration probability during training.
    pub epsilon: f64,
    /// Games played by each evaluation against the random opponent.
    pub eval_games: usize,
    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        QLearningConfig {
            learning_rate: 0.1,
            discount_factor: 0.95,
            epsilon: 0.1,
            eval_games: 20,
            seed: None,
        }
    }
}

/// One recorded ply of an episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: BoardKey,
    pub action: usize,
    pub next_state: BoardKey,
}

/// Epsilon-greedy tabular Q-learning agent.
pub struct QAgent {
    config: QLearningConfig,
    table: QTable,
    epsilon: f64,
    rng: StdRng,
    episode_count: usize,
}

impl QAgent {
    pub fn new(config: QLearningConfig) -> Self {
        Self::with_table(config, QTable::new())
    }

    pub fn with_table(config: QLearningConfig, table: QTable) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        QAgent {
            epsilon: config.epsilon,
            config,
            table,
            rng,
            episode_count: 0,
        }
    }

    /// Agent over a table in JSON form; the document must be an object.
    pub fn from_json_table(config: QLearningConfig, json: &str) -> Result<Self, QTableError> {
        Ok(Self::with_table(config, QTable::from_json_str(json)?))
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    /// Episodes trained by this agent so far.
    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn set_episode_count(&mut self, count: usize) {
        self.episode_count = count;
    }

    /// Pick a column epsilon-greedily and return the board after playing it.
    ///
    /// The state's table entry is created on first sight. Greedy ties go to
    /// the lowest column.
    pub fn select_move(
        &mut self,
        player: Player,
        board: &Board,
    ) -> Result<(Board, usize), AgentError> {
        let columns = board.available_columns();
        if columns.is_empty() {
            return Err(AgentError::NoLegalMove);
        }

        let key = board.canonical_key();
        self.table.ensure_state(&key, &columns);

        let column = if self.rng.random::<f64>() < self.epsilon {
            columns[self.rng.random_range(0..columns.len())]
        } else {
            self.table.best_column(&key, &columns).unwrap_or(columns[0])
        };

        let next = apply_move(board, column, player)?;
        Ok((next, column))
    }

    /// Train for `episodes` games against `opponent`, each starting from a
    /// copy of `start` with the agent to move as `player`.
    pub fn train(
        &mut self,
        player: Player,
        episodes: usize,
        start: &Board,
        opponent: &mut dyn Agent,
    ) -> Result<Vec<EpisodeResult>, AgentError> {
        let mut results = Vec::with_capacity(episodes);
        for _ in 0..episodes {
            results.push(self.train_episode(player, start, opponent)?);
        }
        Ok(results)
    }

    /// Play one training game and learn from it.
    pub fn train_episode(
        &mut self,
        player: Player,
        start: &Board,
        opponent: &mut dyn Agent,
    ) -> Result<EpisodeResult, AgentError> {
        let (history, outcome) = self.play_episode(player, start, opponent)?;
        let td_error = self.learn(&history, outcome.reward());
        self.episode_count += 1;

        trace!(
            episode = self.episode_count,
            plies = history.len(),
            ?outcome,
            td_error,
            "training episode"
        );

        Ok(EpisodeResult {
            outcome,
            game_length: history.len(),
            td_error,
        })
    }

    fn play_episode(
        &mut self,
        player: Player,
        start: &Board,
        opponent: &mut dyn Agent,
    ) -> Result<(Vec<Transition>, EpisodeOutcome), AgentError> {
        let mut board = *start;
        let mut turn = player;
        let mut history = Vec::new();

        let outcome = loop {
            if let Some(outcome) = board.outcome() {
                break outcome;
            }

            let state = board.canonical_key();
            let (next, action) = if turn == player {
                self.select_move(player, &board)?
            } else {
                self.table.ensure_state(&state, &board.available_columns());
                let action = ensure_legal(&board, opponent.select_column(&board, turn)?)?;
                (apply_move(&board, action, turn)?, action)
            };

            history.push(Transition {
                state,
                action,
                next_state: next.canonical_key(),
            });
            board = next;
            turn = turn.other();
        };

        Ok((history, EpisodeOutcome::for_player(outcome, player)))
    }

    /// Fold the terminal reward back over `history`, last ply first,
    /// discounting it once per step. Returns the mean absolute TD error.
    fn learn(&mut self, history: &[Transition], terminal_reward: f64) -> f64 {
        let lr = self.config.learning_rate;
        let gamma = self.config.discount_factor;
        let mut reward = terminal_reward;
        let mut total_error = 0.0;

        for step in history.iter().rev() {
            let future = self.table.max_value(&step.next_state);
            let q = self.table.value_mut(&step.state, step.action);
            let error = reward + gamma * future - *q;
            *q += lr * error;
            total_error += error.abs();
            reward *= gamma;
        }

        if history.is_empty() {
            0.0
        } else {
            total_error / history.len() as f64
        }
    }

    /// Win fraction of the greedy policy over `games` games against a
    /// uniform-random opponent, the agent moving first on an empty board.
    ///
    /// Exploration is switched off for the duration and restored afterwards.
    /// Every state the agent meets is still added to the table with zero
    /// values, so evaluation grows the table without changing any value.
    pub fn evaluate(&mut self, player: Player, games: usize) -> Result<f64, AgentError> {
        let mut opponent = RandomAgent::with_seed(self.rng.random());
        let saved_epsilon = self.epsilon;
        self.epsilon = 0.0;
        let result = win_fraction(self, &mut opponent, player, games);
        self.epsilon = saved_epsilon;

        if let Ok(rate) = result {
            debug!(games, win_rate = rate, states = self.table.len(), "evaluated");
        }
        result
    }
}

impl Agent for QAgent {
    fn select_column(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        self.select_move(player, board).map(|(_, column)| column)
    }

    fn name(&self) -> &str {
        "Q-learning"
    }
}
