//! Core Connect Four game logic: the gravity board with win detection and
//! canonical keys, plus the player type.

mod board;
mod player;

pub use board::{Board, BoardKey, Cell, GameOutcome, MoveError, COLS, ROWS, WIN_LENGTH};
pub use player::{ParsePlayerError, Player};
