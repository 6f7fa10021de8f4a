use std::fmt;

use crate::error::LayoutError;

use super::Player;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
/// Pieces in a line needed to win.
pub const WIN_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Yellow,
}

impl Cell {
    /// Board symbol used by scenario files and canonical keys.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => 'O',
            Cell::Red => 'R',
            Cell::Yellow => 'Y',
        }
    }

    /// Parse a board symbol, case-insensitively.
    pub fn from_symbol(symbol: char) -> Option<Cell> {
        match symbol.to_ascii_uppercase() {
            'O' => Some(Cell::Empty),
            'R' => Some(Cell::Red),
            'Y' => Some(Cell::Yellow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column is full")]
    ColumnFull,
    #[error("column is out of range")]
    InvalidColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

/// Canonical, owned key for a board's contents: one symbol per cell,
/// row-major from the top row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BoardKey(String);

impl BoardKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 6x7 Connect Four grid. Row 0 is the top, row 5 is the bottom.
///
/// `Board` is `Copy`: every copy is an independent value, so exploring a
/// hypothetical branch never disturbs the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Build a board from textual rows, top row first.
    ///
    /// Each row must hold exactly `COLS` symbols from `O`, `R`, `Y`
    /// (case-insensitive), and no piece may float above an empty cell.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        if rows.len() != ROWS {
            return Err(LayoutError::RowCount {
                expected: ROWS,
                found: rows.len(),
            });
        }

        let mut board = Board::new();
        for (row, text) in rows.iter().enumerate() {
            let symbols: Vec<char> = text.as_ref().trim().chars().collect();
            if symbols.len() != COLS {
                return Err(LayoutError::RowWidth {
                    row,
                    expected: COLS,
                    found: symbols.len(),
                });
            }
            for (col, &symbol) in symbols.iter().enumerate() {
                board.cells[row][col] = Cell::from_symbol(symbol)
                    .ok_or(LayoutError::UnknownSymbol { row, col, symbol })?;
            }
        }

        for row in 0..ROWS - 1 {
            for col in 0..COLS {
                if board.cells[row][col] != Cell::Empty && board.cells[row + 1][col] == Cell::Empty {
                    return Err(LayoutError::FloatingPiece { row, col });
                }
            }
        }

        Ok(board)
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Check if a column is full
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Columns whose top cell is empty, in ascending order.
    pub fn available_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// Row the next piece dropped into `col` would land on, or `None` if the
    /// column is full or out of range.
    pub fn drop_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col] == Cell::Empty)
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, player: Player) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::InvalidColumn);
        }
        let row = self.drop_row(col).ok_or(MoveError::ColumnFull)?;
        self.cells[row][col] = player.to_cell();
        Ok(row)
    }

    /// Copy of this board with `player`'s piece dropped into `col`.
    pub fn with_move(&self, col: usize, player: Player) -> Result<Board, MoveError> {
        let mut next = *self;
        next.drop_piece(col, player)?;
        Ok(next)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell != Cell::Empty)
            .count()
    }

    /// True iff `player` has four in a line anywhere on the board.
    pub fn check_win(&self, player: Player) -> bool {
        let cell = player.to_cell();
        let line = |row: usize, col: usize, dr: isize, dc: isize| {
            (0..WIN_LENGTH as isize).all(|i| {
                let r = (row as isize + dr * i) as usize;
                let c = (col as isize + dc * i) as usize;
                self.cells[r][c] == cell
            })
        };

        // Horizontal
        for row in 0..ROWS {
            for col in 0..=COLS - WIN_LENGTH {
                if line(row, col, 0, 1) {
                    return true;
                }
            }
        }

        // Vertical
        for row in 0..=ROWS - WIN_LENGTH {
            for col in 0..COLS {
                if line(row, col, 1, 0) {
                    return true;
                }
            }
        }

        // Diagonal (top-left to bottom-right, \)
        for row in 0..=ROWS - WIN_LENGTH {
            for col in 0..=COLS - WIN_LENGTH {
                if line(row, col, 1, 1) {
                    return true;
                }
            }
        }

        // Diagonal (bottom-left to top-right, /)
        for row in WIN_LENGTH - 1..ROWS {
            for col in 0..=COLS - WIN_LENGTH {
                if line(row, col, -1, 1) {
                    return true;
                }
            }
        }

        false
    }

    /// Check whether the piece at (row, col) is part of a winning line.
    ///
    /// Cheaper than [`Board::check_win`] when only the last move can have
    /// created a line.
    pub fn wins_at(&self, row: usize, col: usize) -> bool {
        let cell = self.get(row, col);
        if cell == Cell::Empty {
            return false;
        }

        const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
        DIRECTIONS.iter().any(|&(dr, dc)| {
            let run = |sign: isize| {
                let mut count = 0;
                let mut r = row as isize + dr * sign;
                let mut c = col as isize + dc * sign;
                while (0..ROWS as isize).contains(&r)
                    && (0..COLS as isize).contains(&c)
                    && self.cells[r as usize][c as usize] == cell
                {
                    count += 1;
                    r += dr * sign;
                    c += dc * sign;
                }
                count
            };
            1 + run(1) + run(-1) >= WIN_LENGTH
        })
    }

    /// The winning player, if any. Red is reported first for layouts where
    /// both sides hold a line, which legal play never produces.
    pub fn winner(&self) -> Option<Player> {
        [Player::Red, Player::Yellow]
            .into_iter()
            .find(|&player| self.check_win(player))
    }

    /// Game outcome if the position is terminal.
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.winner() {
            Some(player) => Some(GameOutcome::Winner(player)),
            None if self.is_full() => Some(GameOutcome::Draw),
            None => None,
        }
    }

    pub fn canonical_key(&self) -> BoardKey {
        let mut key = String::with_capacity(ROWS * COLS);
        key.extend(self.cells.iter().flatten().map(|cell| cell.symbol()));
        BoardKey(key)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let symbols: Vec<String> = row.iter().map(|cell| cell.symbol().to_string()).collect();
            writeln!(f, "{}", symbols.join("|"))?;
        }
        write!(f, "{}", "-".repeat(COLS * 2 - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAW_LAYOUT: [&str; ROWS] = [
        "YRRYYYR", "RYYRRRY", "YYYRYRY", "RRYRYYY", "RYRYRRR", "RRYYRYR",
    ];

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
        assert_eq!(board.available_columns(), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_drop_piece() {
        let mut board = Board::new();

        let row = board.drop_piece(3, Player::Red).unwrap();
        assert_eq!(row, 5); // Should land at bottom
        assert_eq!(board.get(5, 3), Cell::Red);

        let row = board.drop_piece(3, Player::Yellow).unwrap();
        assert_eq!(row, 4);
        assert_eq!(board.get(4, 3), Cell::Yellow);
        assert_eq!(board.drop_row(3), Some(3));
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new();
        for _ in 0..ROWS {
            board.drop_piece(0, Player::Red).unwrap();
        }

        assert!(board.is_column_full(0));
        assert_eq!(board.drop_row(0), None);
        assert_eq!(board.drop_piece(0, Player::Yellow), Err(MoveError::ColumnFull));
        assert_eq!(board.available_columns(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new();
        assert_eq!(board.drop_row(7), None);
        assert_eq!(board.drop_piece(7, Player::Red), Err(MoveError::InvalidColumn));
    }

    #[test]
    fn test_with_move_leaves_source_untouched() {
        let board = Board::new();
        let next = board.with_move(2, Player::Yellow).unwrap();
        assert_eq!(board.piece_count(), 0);
        assert_eq!(next.get(5, 2), Cell::Yellow);
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = Board::new();
        for col in 3..7 {
            board.drop_piece(col, Player::Red).unwrap();
        }
        assert!(board.check_win(Player::Red));
        assert!(!board.check_win(Player::Yellow));
        assert!(board.wins_at(5, 6));
    }

    #[test]
    fn test_vertical_win_at_top_edge() {
        let mut board = Board::new();
        board.drop_piece(6, Player::Red).unwrap();
        board.drop_piece(6, Player::Red).unwrap();
        for _ in 0..4 {
            board.drop_piece(6, Player::Yellow).unwrap();
        }
        assert!(board.check_win(Player::Yellow));
        assert!(!board.check_win(Player::Red));
        assert!(board.wins_at(0, 6));
    }

    #[test]
    fn test_diagonal_up_win() {
        let mut board = Board::new();
        // Create diagonal / pattern
        board.drop_piece(0, Player::Red).unwrap();

        board.drop_piece(1, Player::Yellow).unwrap();
        board.drop_piece(1, Player::Red).unwrap();

        board.drop_piece(2, Player::Yellow).unwrap();
        board.drop_piece(2, Player::Yellow).unwrap();
        board.drop_piece(2, Player::Red).unwrap();

        board.drop_piece(3, Player::Yellow).unwrap();
        board.drop_piece(3, Player::Yellow).unwrap();
        board.drop_piece(3, Player::Yellow).unwrap();
        assert!(!board.check_win(Player::Red));
        let row = board.drop_piece(3, Player::Red).unwrap();

        assert!(board.check_win(Player::Red));
        assert!(board.wins_at(row, 3));
    }

    #[test]
    fn test_diagonal_down_win() {
        let board = Board::from_rows(&[
            "OOOOOOO",
            "OOOOOOO",
            "OOOYOOO",
            "OOORYOO",
            "OOORRYO",
            "OOORRRY",
        ])
        .unwrap();
        assert!(board.check_win(Player::Yellow));
        assert!(!board.check_win(Player::Red));
        assert_eq!(board.winner(), Some(Player::Yellow));
    }

    #[test]
    fn test_three_in_a_row_is_not_a_win() {
        let board = Board::from_rows(&[
            "OOOOOOO",
            "OOOOOOO",
            "OOOOOOO",
            "YOOOOOO",
            "YOYRROO",
            "YRRYRRY",
        ])
        .unwrap();
        assert!(!board.check_win(Player::Red));
        assert!(!board.check_win(Player::Yellow));
        assert_eq!(board.outcome(), None);
    }

    #[test]
    fn test_full_board_draw() {
        let board = Board::from_rows(&DRAW_LAYOUT).unwrap();
        assert!(board.is_full());
        assert!(board.available_columns().is_empty());
        assert!(!board.check_win(Player::Red));
        assert!(!board.check_win(Player::Yellow));
        assert_eq!(board.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_canonical_key() {
        let mut a = Board::new();
        let b = Board::new();
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a.canonical_key().as_str().len(), ROWS * COLS);

        let before = a.canonical_key();
        a.drop_piece(0, Player::Red).unwrap();
        let after = a.canonical_key();
        assert_ne!(before, after);
        // Earlier key is unaffected by the mutation.
        assert!(before.as_str().chars().all(|c| c == 'O'));
        assert_eq!(&after.as_str()[35..], "ROOOOOO");
    }

    #[test]
    fn test_from_rows_rejects_bad_layouts() {
        assert_eq!(
            Board::from_rows(&["OOOOOOO"; 5]),
            Err(LayoutError::RowCount { expected: 6, found: 5 })
        );

        let mut rows = ["OOOOOOO"; ROWS];
        rows[2] = "OOOOOO";
        assert_eq!(
            Board::from_rows(&rows),
            Err(LayoutError::RowWidth { row: 2, expected: 7, found: 6 })
        );

        rows[2] = "OOOXOOO";
        assert_eq!(
            Board::from_rows(&rows),
            Err(LayoutError::UnknownSymbol { row: 2, col: 3, symbol: 'X' })
        );

        rows[2] = "OOOROOO";
        assert_eq!(
            Board::from_rows(&rows),
            Err(LayoutError::FloatingPiece { row: 2, col: 3 })
        );
    }

    #[test]
    fn test_display() {
        let mut board = Board::new();
        board.drop_piece(1, Player::Yellow).unwrap();
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), ROWS + 1);
        assert_eq!(lines[5], "O|Y|O|O|O|O|O");
        assert_eq!(lines[6], "-------------");
    }
}
