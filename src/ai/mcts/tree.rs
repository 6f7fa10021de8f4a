//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`].
//! One tree is built per search and dropped afterwards.

use crate::ai::policy::ColumnScores;
use crate::game::{Board, Player};

use super::node::{NodeId, SearchNode};

#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// Create a tree holding only a root for `board` with `to_move` to play.
    pub fn new(board: Board, to_move: Player) -> Self {
        let mut nodes = Vec::with_capacity(512);
        nodes.push(SearchNode::new_root(board, to_move));
        SearchTree { nodes }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    /// Allocate the child of `parent` reached by `column` and link it.
    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        column: usize,
        board: Board,
        evaluation: ColumnScores,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let (to_move, depth) = {
            let p = self.get(parent);
            (p.to_move.other(), p.depth + 1)
        };
        let mut child = SearchNode::new_child(board, to_move, column, parent, depth);
        child.evaluation = Some(evaluation);
        self.nodes.push(child);
        self.get_mut(parent).children.push((column, id));
        id
    }

    /// Child of `id` with the highest UCT score; the earliest child wins ties.
    pub fn select_child(&self, id: NodeId, exploration_weight: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child_id) in &node.children {
            let score = self.get(child_id).uct_score(node.visits, exploration_weight);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((child_id, score));
            }
        }
        best.map(|(child_id, _)| child_id)
    }

    /// Fold `reward` from `leaf` up to the root, flipping its sign each ply.
    ///
    /// Returns the visited path, leaf first.
    pub fn backpropagate(&mut self, leaf: NodeId, reward: f64) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut reward = reward;
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            node.value += reward;
            reward = -reward;
            path.push(id);
            current = node.parent;
        }
        path
    }

    /// Column of the most visited root child; the earliest child wins ties.
    pub fn best_column(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for &(column, child_id) in &self.get(self.root()).children {
            let visits = self.get(child_id).visits;
            if best.map_or(true, |(_, best_visits)| visits > best_visits) {
                best = Some((column, visits));
            }
        }
        best.map(|(column, _)| column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::COLS;

    fn tree_with_children(columns: &[usize]) -> SearchTree {
        let board = Board::new();
        let mut tree = SearchTree::new(board, Player::Red);
        let root = tree.root();
        for &col in columns {
            let child = board.with_move(col, Player::Red).unwrap();
            tree.add_child(root, col, child, [0.0; COLS]);
        }
        tree
    }

    #[test]
    fn test_add_child_links_parent() {
        let tree = tree_with_children(&[3, 1]);
        assert_eq!(tree.len(), 3);
        let root = tree.get(tree.root());
        assert_eq!(root.children().len(), 2);
        let child = tree.get(root.child(1).unwrap());
        assert_eq!(child.parent(), Some(tree.root()));
        assert_eq!(child.to_move(), Player::Yellow);
        assert_eq!(child.depth(), 1);
        assert_eq!(child.column(), Some(1));
        assert!(child.evaluation().is_some());
    }

    #[test]
    fn test_backpropagate_alternates_sign() {
        let mut tree = tree_with_children(&[0]);
        let child = tree.get(tree.root()).child(0).unwrap();
        let grandchild_board = tree.get(child).board().with_move(0, Player::Yellow).unwrap();
        let grandchild = tree.add_child(child, 0, grandchild_board, [0.0; COLS]);

        let path = tree.backpropagate(grandchild, 1.0);
        assert_eq!(path, vec![grandchild, child, tree.root()]);
        assert_eq!(tree.get(grandchild).value(), 1.0);
        assert_eq!(tree.get(child).value(), -1.0);
        assert_eq!(tree.get(tree.root()).value(), 1.0);
        assert!(path.iter().all(|&id| tree.get(id).visits() == 1));
    }

    #[test]
    fn test_select_child_ties_go_to_first_inserted() {
        let mut tree = tree_with_children(&[5, 2, 4]);
        let root = tree.root();
        tree.get_mut(root).visits = 3;
        for &(_, id) in tree.get(root).children().to_vec().iter() {
            tree.get_mut(id).visits = 1;
        }
        let selected = tree.select_child(root, 1.4).unwrap();
        assert_eq!(tree.get(selected).column(), Some(5));
    }

    #[test]
    fn test_select_child_prefers_higher_value() {
        let mut tree = tree_with_children(&[0, 1]);
        let root = tree.root();
        tree.get_mut(root).visits = 20;
        let a = tree.get(root).child(0).unwrap();
        let b = tree.get(root).child(1).unwrap();
        tree.get_mut(a).visits = 10;
        tree.get_mut(a).value = -5.0;
        tree.get_mut(b).visits = 10;
        tree.get_mut(b).value = 5.0;
        assert_eq!(tree.select_child(root, 1.4), Some(b));
    }

    #[test]
    fn test_best_column_by_visits() {
        let mut tree = tree_with_children(&[0, 1, 2]);
        assert_eq!(tree.best_column(), Some(0));
        let root = tree.root();
        let b = tree.get(root).child(1).unwrap();
        let c = tree.get(root).child(2).unwrap();
        tree.get_mut(b).visits = 7;
        tree.get_mut(b).value = -7.0;
        tree.get_mut(c).visits = 3;
        tree.get_mut(c).value = 3.0;
        assert_eq!(tree.best_column(), Some(1));
    }

    #[test]
    fn test_best_column_without_children() {
        let tree = SearchTree::new(Board::new(), Player::Red);
        assert_eq!(tree.best_column(), None);
        assert!(tree.select_child(tree.root(), 1.4).is_none());
    }
}
