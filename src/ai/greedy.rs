use crate::error::AgentError;
use crate::game::{Board, Player};

use super::agent::{ensure_legal, Agent};
use super::policy::{top_columns, EvaluationPolicy};

/// Plays the highest-scoring legal column of an injected evaluator.
///
/// This is the slot for externally trained models: anything implementing
/// [`EvaluationPolicy`] can be played directly. Ties go to the lowest column.
pub struct GreedyAgent<P> {
    policy: P,
}

impl<P: EvaluationPolicy> GreedyAgent<P> {
    pub fn new(policy: P) -> Self {
        GreedyAgent { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<P: EvaluationPolicy> Agent for GreedyAgent<P> {
    fn select_column(&mut self, board: &Board, player: Player) -> Result<usize, AgentError> {
        let columns = board.available_columns();
        let &first = columns.first().ok_or(AgentError::NoLegalMove)?;
        let scores = self.policy.evaluate(board, player);
        let column = top_columns(&scores, &columns).first().copied().unwrap_or(first);
        ensure_legal(board, column)
    }

    fn name(&self) -> &str {
        self.policy.name()
    }
}
