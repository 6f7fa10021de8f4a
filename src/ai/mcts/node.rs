use crate::ai::policy::ColumnScores;
use crate::game::{Board, Player};

/// Small constant keeping UCT terms finite for unvisited children.
pub const UCT_EPSILON: f64 = 1e-8;

/// Index of a node in its [`SearchTree`](super::SearchTree) arena.
///
/// Parents are referenced by id, so the tree has a single owner (the arena)
/// and no reference cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One vertex of the search tree.
///
/// `value` is accumulated from the point of view of the player who moved
/// into this node, so a parent maximizes it directly when selecting.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub(crate) board: Board,
    pub(crate) to_move: Player,
    /// Column played from the parent to reach this node (`None` at the root).
    pub(crate) column: Option<usize>,
    pub(crate) parent: Option<NodeId>,
    /// Expanded children in insertion order, keyed by column.
    pub(crate) children: Vec<(usize, NodeId)>,
    pub(crate) untried: Vec<usize>,
    pub(crate) visits: u32,
    pub(crate) value: f64,
    pub(crate) evaluation: Option<ColumnScores>,
    pub(crate) depth: u32,
    terminal: bool,
}

impl SearchNode {
    pub fn new_root(board: Board, to_move: Player) -> Self {
        Self::build(board, to_move, None, None, 0)
    }

    pub(crate) fn new_child(
        board: Board,
        to_move: Player,
        column: usize,
        parent: NodeId,
        depth: u32,
    ) -> Self {
        Self::build(board, to_move, Some(column), Some(parent), depth)
    }

    fn build(
        board: Board,
        to_move: Player,
        column: Option<usize>,
        parent: Option<NodeId>,
        depth: u32,
    ) -> Self {
        let terminal = board.outcome().is_some();
        // Terminal positions are never expanded.
        let untried = if terminal {
            Vec::new()
        } else {
            board.available_columns()
        };
        SearchNode {
            board,
            to_move,
            column,
            parent,
            children: Vec::new(),
            untried,
            visits: 0,
            value: 0.0,
            evaluation: None,
            depth,
            terminal,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[(usize, NodeId)] {
        &self.children
    }

    pub fn untried(&self) -> &[usize] {
        &self.untried
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn evaluation(&self) -> Option<&ColumnScores> {
        self.evaluation.as_ref()
    }

    /// Win for either side, or no column left to play.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Child reached by playing `column`, if expanded.
    pub fn child(&self, column: usize) -> Option<NodeId> {
        self.children
            .iter()
            .find(|&&(col, _)| col == column)
            .map(|&(_, id)| id)
    }

    /// Average accumulated value, 0 when unvisited.
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / self.visits as f64
        }
    }

    /// UCT score of this node as seen from a parent with `parent_visits`.
    pub fn uct_score(&self, parent_visits: u32, exploration_weight: f64) -> f64 {
        let visits = self.visits as f64 + UCT_EPSILON;
        let exploit = self.value / visits;
        let explore = ((parent_visits as f64 + 1.0).ln() / visits).sqrt();
        exploit + exploration_weight * explore
    }
}
