use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::game::{GameOutcome, Player};

/// Outcome of a game from the learning agent's side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    Win,
    Loss,
    Draw,
}

impl EpisodeOutcome {
    pub fn for_player(outcome: GameOutcome, player: Player) -> Self {
        match outcome {
            GameOutcome::Winner(winner) if winner == player => EpisodeOutcome::Win,
            GameOutcome::Winner(_) => EpisodeOutcome::Loss,
            GameOutcome::Draw => EpisodeOutcome::Draw,
        }
    }

    /// Terminal reward: +1 win, -1 loss, 0 draw.
    pub fn reward(self) -> f64 {
        match self {
            EpisodeOutcome::Win => 1.0,
            EpisodeOutcome::Loss => -1.0,
            EpisodeOutcome::Draw => 0.0,
        }
    }
}

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    pub outcome: EpisodeOutcome,
    /// Plies played by both sides.
    pub game_length: usize,
    /// Mean absolute temporal-difference error of the episode's updates.
    pub td_error: f64,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    fn rate(&self, last_n: usize, outcome: EpisodeOutcome) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let count = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.outcome == outcome)
            .count();
        count as f64 / n as f64
    }

    /// Agent win rate in the last N episodes.
    pub fn win_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, EpisodeOutcome::Win)
    }

    pub fn loss_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, EpisodeOutcome::Loss)
    }

    pub fn draw_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, EpisodeOutcome::Draw)
    }

    fn average(&self, last_n: usize, field: impl Fn(&EpisodeResult) -> f64) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: f64 = self.episode_results.iter().rev().take(n).map(field).sum();
        total / n as f64
    }

    /// Average game length over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f64 {
        self.average(last_n, |r| r.game_length as f64)
    }

    pub fn average_td_error(&self, last_n: usize) -> f64 {
        self.average(last_n, |r| r.td_error)
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Episodes-per-second over a window, excluding evaluation and checkpoint time.
pub struct Throughput {
    window_start: Instant,
    window_count: usize,
    overhead: Duration,
}

impl Throughput {
    pub fn new() -> Self {
        Throughput {
            window_start: Instant::now(),
            window_count: 0,
            overhead: Duration::ZERO,
        }
    }

    pub fn record_episode(&mut self) {
        self.window_count += 1;
    }

    pub fn record_overhead(&mut self, d: Duration) {
        self.overhead += d;
    }

    pub fn episodes_per_sec(&self) -> f64 {
        let net = self.window_start.elapsed().saturating_sub(self.overhead);
        if net.is_zero() {
            return 0.0;
        }
        self.window_count as f64 / net.as_secs_f64()
    }

    /// Start a new window (call after each log interval).
    pub fn reset_window(&mut self) {
        self.window_start = Instant::now();
        self.window_count = 0;
        self.overhead = Duration::ZERO;
    }
}

impl Default for Throughput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: EpisodeOutcome, game_length: usize) -> EpisodeResult {
        EpisodeResult {
            outcome,
            game_length,
            td_error: 0.0,
        }
    }

    #[test]
    fn test_outcome_for_player() {
        let red_wins = GameOutcome::Winner(Player::Red);
        assert_eq!(EpisodeOutcome::for_player(red_wins, Player::Red), EpisodeOutcome::Win);
        assert_eq!(EpisodeOutcome::for_player(red_wins, Player::Yellow), EpisodeOutcome::Loss);
        assert_eq!(
            EpisodeOutcome::for_player(GameOutcome::Draw, Player::Yellow),
            EpisodeOutcome::Draw
        );
        assert_eq!(EpisodeOutcome::Loss.reward(), -1.0);
    }

    #[test]
    fn test_win_rate() {
        let mut m = TrainingMetrics::new();
        for _ in 0..7 {
            m.record_episode(result(EpisodeOutcome::Win, 10));
        }
        for _ in 0..3 {
            m.record_episode(result(EpisodeOutcome::Loss, 10));
        }
        assert!((m.win_rate(10) - 0.7).abs() < 1e-9);
        assert!((m.loss_rate(10) - 0.3).abs() < 1e-9);
        assert!((m.win_rate(3) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_rate() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(EpisodeOutcome::Draw, 42));
        m.record_episode(result(EpisodeOutcome::Win, 10));
        assert!((m.draw_rate(10) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_average_game_length() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(EpisodeOutcome::Draw, 20));
        m.record_episode(result(EpisodeOutcome::Draw, 30));
        assert!((m.average_game_length(10) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_is_capped_but_total_is_not() {
        let mut m = TrainingMetrics::with_capacity(4);
        for _ in 0..10 {
            m.record_episode(result(EpisodeOutcome::Win, 7));
        }
        assert_eq!(m.total_episodes(), 10);
        assert!((m.win_rate(100) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_metrics_are_zero() {
        let m = TrainingMetrics::default();
        assert_eq!(m.win_rate(10), 0.0);
        assert_eq!(m.average_td_error(10), 0.0);
    }

    #[test]
    fn test_overhead_excluded_from_throughput() {
        let mut t = Throughput::new();
        for _ in 0..10 {
            t.record_episode();
        }
        t.record_overhead(Duration::from_secs(9999));
        assert_eq!(t.episodes_per_sec(), 0.0);

        t.reset_window();
        t.record_episode();
        std::thread::sleep(Duration::from_millis(5));
        assert!(t.episodes_per_sec() > 0.0);
    }
}
