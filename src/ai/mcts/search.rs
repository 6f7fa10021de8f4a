//! UCT search.
//!
//! Each simulation:
//! 1. Selection: descend by UCT score until a terminal node or a node with
//!    untried columns
//! 2. Expansion: materialize one untried column, chosen uniformly at random
//! 3. Rollout: play the policy's best column for each side until the game ends
//! 4. Backpropagation: add the outcome along the path, flipping its sign per ply

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::ai::agent::{apply_move, ensure_legal, Agent};
use crate::ai::policy::{top_columns, ColumnScores, EvaluationPolicy, PolicyKind};
use crate::error::AgentError;
use crate::game::{Board, GameOutcome, Player};

use super::node::NodeId;
use super::tree::SearchTree;

/// MCTS hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Simulations per move when used as an [`Agent`].
    pub simulations: usize,
    /// Weight `C` of the exploration term in the UCT score.
    pub exploration_weight: f64,
    /// Built-in policy used for rollouts.
    pub policy: PolicyKind,
    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            simulations: 1000,
            exploration_weight: 1.4,
            policy: PolicyKind::Uniform,
            seed: None,
        }
    }
}

/// Statistics of one root child after a search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats {
    pub column: usize,
    pub visits: u32,
    pub mean_value: f64,
}

/// Result of a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Most visited root column.
    pub column: usize,
    pub children: Vec<ChildStats>,
    pub simulations: usize,
    pub tree_size: usize,
}

/// What one simulation touched.
#[derive(Debug, Clone)]
pub struct SimulationTrace {
    /// Node the rollout started from.
    pub leaf: NodeId,
    /// Nodes updated by backpropagation, leaf first.
    pub path: Vec<NodeId>,
    /// Reward added at the leaf.
    pub reward: f64,
}

/// Monte-Carlo tree search engine over an [`EvaluationPolicy`].
pub struct SearchEngine<P> {
    config: MctsConfig,
    policy: P,
    rng: StdRng,
}

impl SearchEngine<Box<dyn EvaluationPolicy>> {
    /// Engine using the built-in policy named in `config`.
    pub fn from_config(config: MctsConfig) -> Self {
        let policy = config.policy.build();
        SearchEngine::new(config, policy)
    }
}

impl<P: EvaluationPolicy> SearchEngine<P> {
    pub fn new(config: MctsConfig, policy: P) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        SearchEngine {
            config,
            policy,
            rng,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Pick a column for `player` on `board` with `budget` simulations.
    pub fn search(
        &mut self,
        board: &Board,
        player: Player,
        budget: usize,
    ) -> Result<usize, AgentError> {
        self.analyze(board, player, budget).map(|result| result.column)
    }

    /// Run a search and report per-column statistics alongside the move.
    ///
    /// A finished game (full board or an existing line of four) has no move,
    /// and neither does a search whose budget left the root unexpanded.
    pub fn analyze(
        &mut self,
        board: &Board,
        player: Player,
        budget: usize,
    ) -> Result<SearchResult, AgentError> {
        if board.outcome().is_some() {
            debug!("search called on a finished game");
            return Err(AgentError::NoLegalMove);
        }

        let mut tree = self.new_tree(board, player);
        for _ in 0..budget {
            self.simulate(&mut tree)?;
        }

        let column = tree.best_column().ok_or(AgentError::NoLegalMove)?;
        let column = ensure_legal(board, column)?;

        let children: Vec<ChildStats> = tree
            .get(tree.root())
            .children()
            .iter()
            .map(|&(column, id)| {
                let child = tree.get(id);
                ChildStats {
                    column,
                    visits: child.visits(),
                    mean_value: child.mean_value(),
                }
            })
            .collect();

        debug!(
            player = player.name(),
            column,
            simulations = budget,
            tree_size = tree.len(),
            "search finished"
        );

        Ok(SearchResult {
            column,
            children,
            simulations: budget,
            tree_size: tree.len(),
        })
    }

    /// Fresh tree for `board` with its root evaluation cached.
    pub fn new_tree(&self, board: &Board, player: Player) -> SearchTree {
        let mut tree = SearchTree::new(*board, player);
        let root = tree.root();
        tree.get_mut(root).evaluation = Some(self.policy.evaluate(board, player));
        tree
    }

    /// Run one select/expand/rollout/backpropagate cycle on `tree`.
    pub fn simulate(&mut self, tree: &mut SearchTree) -> Result<SimulationTrace, AgentError> {
        let selected = self.select(tree);
        let leaf = self.expand(tree, selected)?;

        let node = tree.get(leaf);
        let board = *node.board();
        let to_move = node.to_move();
        let cached = node.evaluation;
        // Node values are scored for the player who moved into the node,
        // not the root player; backpropagation flips the sign every ply.
        let reward = self.rollout(&board, to_move, to_move.other(), cached)?;

        let path = tree.backpropagate(leaf, reward);
        trace!(leaf = leaf.index(), depth = path.len() - 1, reward, "simulation");

        Ok(SimulationTrace { leaf, path, reward })
    }

    fn select(&self, tree: &SearchTree) -> NodeId {
        let mut current = tree.root();
        loop {
            let node = tree.get(current);
            if node.is_terminal() || !node.is_fully_expanded() {
                return current;
            }
            match tree.select_child(current, self.config.exploration_weight) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Expand one untried column of `id`; terminal nodes are returned as-is.
    fn expand(&mut self, tree: &mut SearchTree, id: NodeId) -> Result<NodeId, AgentError> {
        let node = tree.get(id);
        if node.is_terminal() || node.untried().is_empty() {
            return Ok(id);
        }

        let pick = self.rng.random_range(0..node.untried().len());
        let column = node.untried()[pick];
        let parent_board = *node.board();
        let to_move = node.to_move();

        let board = apply_move(&parent_board, column, to_move)?;
        let evaluation = self.policy.evaluate(&board, to_move.other());

        tree.get_mut(id).untried.remove(pick);
        Ok(tree.add_child(id, column, board, evaluation))
    }

    /// Play the game out from `board` and score it for `perspective`:
    /// +1 win, -1 loss, 0 draw.
    pub fn rollout(
        &mut self,
        board: &Board,
        to_move: Player,
        perspective: Player,
        first_scores: Option<ColumnScores>,
    ) -> Result<f64, AgentError> {
        let score = |winner: Player| if winner == perspective { 1.0 } else { -1.0 };

        match board.outcome() {
            Some(GameOutcome::Winner(winner)) => return Ok(score(winner)),
            Some(GameOutcome::Draw) => return Ok(0.0),
            None => {}
        }

        let mut board = *board;
        let mut turn = to_move;
        let mut scores = first_scores;
        loop {
            let columns = board.available_columns();
            if columns.is_empty() {
                return Ok(0.0);
            }

            let evaluated = scores
                .take()
                .unwrap_or_else(|| self.policy.evaluate(&board, turn));
            let top = top_columns(&evaluated, &columns);
            let candidates = if top.is_empty() { &columns } else { &top };
            let column = candidates[self.rng.random_range(0..candidates.len())];

            let row = board
                .drop_piece(column, turn)
                .map_err(|_| AgentError::IllegalColumn {
                    column,
                    legal: columns.clone(),
                })?;
            if board.wins_at(row, column) {
                return Ok(score(turn));
            }
            turn = turn.other();
        }
    }
}

impl<P: EvaluationPolicy> Agent for SearchEngine<P> {
    fn select_column(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        let budget = self.config.simulations;
        self.search(board, player, budget)
    }

    fn name(&self) -> &str {
        "MCTS"
    }
}
