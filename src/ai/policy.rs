//! Column-scoring policies shared by search rollouts and greedy play.

use crate::game::{Board, Cell, Player, COLS, ROWS, WIN_LENGTH};

/// One score per column; higher is better for the player about to move.
pub type ColumnScores = [f64; COLS];

/// Capability interface: score every column of a board for the player to move.
///
/// Implementations must be pure functions of their inputs. Callers restrict
/// the scores to `Board::available_columns` before acting on them.
pub trait EvaluationPolicy {
    fn evaluate(&self, board: &Board, to_move: Player) -> ColumnScores;

    fn name(&self) -> &str;
}

impl<P: EvaluationPolicy + ?Sized> EvaluationPolicy for Box<P> {
    fn evaluate(&self, board: &Board, to_move: Player) -> ColumnScores {
        (**self).evaluate(board, to_move)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Placeholder policy used when no trained evaluator is available: every
/// column scores zero, so ties are left to the caller's random tie-break.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPolicy;

impl EvaluationPolicy for UniformPolicy {
    fn evaluate(&self, _board: &Board, _to_move: Player) -> ColumnScores {
        [0.0; COLS]
    }

    fn name(&self) -> &str {
        "uniform"
    }
}

/// Built-in policies selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Uniform,
    Heuristic,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn EvaluationPolicy> {
        match self {
            PolicyKind::Uniform => Box::new(UniformPolicy),
            PolicyKind::Heuristic => Box::new(HeuristicPolicy),
        }
    }
}

/// Columns from `columns` sharing the highest score, in the order given.
pub(crate) fn top_columns(scores: &ColumnScores, columns: &[usize]) -> Vec<usize> {
    let best = columns
        .iter()
        .map(|&col| scores[col])
        .fold(f64::NEG_INFINITY, f64::max);
    columns
        .iter()
        .copied()
        .filter(|&col| scores[col] == best)
        .collect()
}

const WIN_SCORE: f64 = 1_000_000.0;
const BLOCK_SCORE: f64 = 100_000.0;

/// Threat-counting heuristic: scores each column by the position reached
/// after dropping there.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    fn score_window(own: usize, opp: usize, empty: usize) -> f64 {
        if own == 3 && empty == 1 {
            50.0
        } else if own == 2 && empty == 2 {
            10.0
        } else if opp == 3 && empty == 1 {
            -80.0
        } else if opp == 2 && empty == 2 {
            -10.0
        } else {
            0.0
        }
    }

    /// Static score of `board` from `player`'s point of view.
    pub fn position_score(board: &Board, player: Player) -> f64 {
        let own_cell = player.to_cell();
        let opp_cell = player.other().to_cell();
        let mut score = 0.0;

        // Center column bonus
        let center = COLS / 2;
        for row in 0..ROWS {
            match board.get(row, center) {
                c if c == own_cell => score += 3.0,
                c if c == opp_cell => score -= 3.0,
                _ => {}
            }
        }

        let span = WIN_LENGTH as isize - 1;
        for (dr, dc) in [(0isize, 1isize), (1, 0), (1, 1), (-1, 1)] {
            for row in 0..ROWS as isize {
                for col in 0..COLS as isize {
                    let end_row = row + dr * span;
                    let end_col = col + dc * span;
                    if !(0..ROWS as isize).contains(&end_row) || end_col >= COLS as isize {
                        continue;
                    }

                    let (mut own, mut opp, mut empty) = (0, 0, 0);
                    for i in 0..WIN_LENGTH as isize {
                        match board.get((row + dr * i) as usize, (col + dc * i) as usize) {
                            c if c == own_cell => own += 1,
                            c if c == opp_cell => opp += 1,
                            Cell::Empty => empty += 1,
                            _ => {}
                        }
                    }
                    score += Self::score_window(own, opp, empty);
                }
            }
        }

        score
    }
}

impl EvaluationPolicy for HeuristicPolicy {
    fn evaluate(&self, board: &Board, to_move: Player) -> ColumnScores {
        let opponent = to_move.other();
        let mut scores = [f64::NEG_INFINITY; COLS];

        for (col, score) in scores.iter_mut().enumerate() {
            let mut next = *board;
            let Ok(row) = next.drop_piece(col, to_move) else {
                continue;
            };
            if next.wins_at(row, col) {
                *score = WIN_SCORE;
                continue;
            }

            *score = Self::position_score(&next, to_move);

            let mut reply = *board;
            if reply
                .drop_piece(col, opponent)
                .is_ok_and(|row| reply.wins_at(row, col))
            {
                *score += BLOCK_SCORE;
            }
        }

        scores
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
