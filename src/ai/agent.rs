use crate::error::AgentError;
use crate::game::{Board, Player};

/// Universal interface for all move-selecting strategies.
pub trait Agent {
    /// Select a column for `player` to drop into on `board`.
    ///
    /// Returns [`AgentError::NoLegalMove`] when the board is full.
    fn select_column(&mut self, board: &Board, player: Player) -> Result<usize, AgentError>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}

/// Copy of `board` after `player` drops into `column`, rejecting full or
/// out-of-range columns instead of applying them.
pub(crate) fn apply_move(board: &Board, column: usize, player: Player) -> Result<Board, AgentError> {
    board
        .with_move(column, player)
        .map_err(|_| AgentError::IllegalColumn {
            column,
            legal: board.available_columns(),
        })
}

/// Reject `column` unless it is currently playable on `board`.
pub(crate) fn ensure_legal(board: &Board, column: usize) -> Result<usize, AgentError> {
    if board.drop_row(column).is_some() {
        Ok(column)
    } else {
        Err(AgentError::IllegalColumn {
            column,
            legal: board.available_columns(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_move() {
        let board = Board::new();
        let next = apply_move(&board, 2, Player::Yellow).unwrap();
        assert_eq!(next.piece_count(), 1);
        assert_eq!(
            apply_move(&board, 9, Player::Yellow),
            Err(AgentError::IllegalColumn {
                column: 9,
                legal: vec![0, 1, 2, 3, 4, 5, 6],
            })
        );
    }

    #[test]
    fn test_ensure_legal() {
        let mut board = Board::new();
        assert_eq!(ensure_legal(&board, 4), Ok(4));
        for _ in 0..6 {
            board.drop_piece(4, Player::Red).unwrap();
        }
        assert_eq!(
            ensure_legal(&board, 4),
            Err(AgentError::IllegalColumn {
                column: 4,
                legal: vec![0, 1, 2, 3, 5, 6],
            })
        );
    }
}
