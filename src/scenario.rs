//! Scenario files: which algorithm plays, for which player, on which board.
//!
//! ```text
//! UCT
//! R
//! OOOOOOO
//! OOOOOOO
//! OOOOOOO
//! OOOOOOO
//! OOOOOOO
//! OOOOOOO
//! ```
//!
//! Blank lines are ignored, so a trailing newline is fine.

use std::path::Path;

use crate::ai::Algorithm;
use crate::error::ScenarioError;
use crate::game::{Board, Player, ROWS};

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub algorithm: Algorithm,
    pub player: Player,
    pub board: Board,
}

impl Scenario {
    pub fn parse(text: &str) -> Result<Self, ScenarioError> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

        let algorithm = lines
            .next()
            .ok_or(ScenarioError::MissingLine("algorithm"))?
            .parse::<Algorithm>()?;
        let player = lines
            .next()
            .ok_or(ScenarioError::MissingLine("player"))?
            .parse::<Player>()?;

        let rows: Vec<&str> = lines.collect();
        if rows.is_empty() {
            return Err(ScenarioError::MissingLine("board"));
        }
        let board = Board::from_rows(&rows)?;

        Ok(Scenario {
            algorithm,
            player,
            board,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|e| ScenarioError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text)
    }

    /// Render back to the text format.
    pub fn to_text(&self) -> String {
        let key = self.board.canonical_key();
        let cells = key.as_str().as_bytes();
        let mut out = format!("{}\n{}\n", self.algorithm, self.player.symbol());
        for row in cells.chunks(cells.len() / ROWS) {
            out.push_str(&String::from_utf8_lossy(row));
            out.push('\n');
        }
        out
    }
}
