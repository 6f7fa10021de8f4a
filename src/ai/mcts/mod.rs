//! Monte-Carlo tree search (UCT) over the shared board.

mod node;
mod search;
mod tree;

pub use node::{NodeId, SearchNode, UCT_EPSILON};
pub use search::{ChildStats, MctsConfig, SearchEngine, SearchResult, SimulationTrace};
pub use tree::SearchTree;
