use crate::ai::agent::{apply_move, ensure_legal, Agent};
use crate::error::AgentError;
use crate::game::{Board, Player};
use crate::training::metrics::{EpisodeOutcome, EpisodeResult};

/// Play one game from `start` between two agents; `agent` moves first as
/// `agent_player`. The result is reported from `agent`'s side.
pub fn play_game(
    agent: &mut dyn Agent,
    opponent: &mut dyn Agent,
    agent_player: Player,
    start: &Board,
) -> Result<EpisodeResult, AgentError> {
    let mut board = *start;
    let mut turn = agent_player;
    let mut plies = 0;

    let outcome = loop {
        if let Some(outcome) = board.outcome() {
            break outcome;
        }
        let column = if turn == agent_player {
            agent.select_column(&board, turn)?
        } else {
            opponent.select_column(&board, turn)?
        };
        board = apply_move(&board, ensure_legal(&board, column)?, turn)?;
        turn = turn.other();
        plies += 1;
    };

    Ok(EpisodeResult {
        outcome: EpisodeOutcome::for_player(outcome, agent_player),
        game_length: plies,
        td_error: 0.0,
    })
}

/// Fraction of `games` won by `agent` against `opponent`, each starting
/// from an empty board with `agent` first.
pub fn win_fraction(
    agent: &mut dyn Agent,
    opponent: &mut dyn Agent,
    agent_player: Player,
    games: usize,
) -> Result<f64, AgentError> {
    if games == 0 {
        return Ok(0.0);
    }
    let start = Board::new();
    let mut wins = 0;
    for _ in 0..games {
        if play_game(agent, opponent, agent_player, &start)?.outcome == EpisodeOutcome::Win {
            wins += 1;
        }
    }
    Ok(wins as f64 / games as f64)
}
