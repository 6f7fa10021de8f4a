use std::time::Instant;

use tracing::{error, info};

use crate::ai::{Agent, QAgent};
use crate::checkpoint::{CheckpointManager, CheckpointManagerConfig, CheckpointMetrics};
use crate::error::TrainingError;
use crate::game::{Board, Player};
use crate::training::metrics::{Throughput, TrainingMetrics};

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    pub eval_interval: usize,
    pub checkpoint_interval: usize,
    /// Side the learning agent plays; it always moves first.
    pub player: Player,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 1000,
            log_interval: 50,
            eval_interval: 50,
            checkpoint_interval: 500,
            player: Player::Red,
        }
    }
}

/// Greedy win rate measured at one point of training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalPoint {
    pub episode: usize,
    pub win_rate: f64,
}

/// Summary of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub episodes: usize,
    pub eval_history: Vec<EvalPoint>,
    pub final_win_rate: f64,
}

/// Trains a [`QAgent`] against an opponent, logging progress, evaluating
/// periodically and writing checkpoints.
pub struct Trainer {
    config: TrainerConfig,
    checkpoint_manager: CheckpointManager,
}

impl Trainer {
    pub fn new(
        config: TrainerConfig,
        checkpoint: CheckpointManagerConfig,
    ) -> Result<Self, TrainingError> {
        Ok(Trainer {
            config,
            checkpoint_manager: CheckpointManager::new(checkpoint)?,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn checkpoint_manager(&self) -> &CheckpointManager {
        &self.checkpoint_manager
    }

    /// Run the full training loop, continuing the agent's episode count.
    pub fn train(
        &self,
        agent: &mut QAgent,
        opponent: &mut dyn Agent,
    ) -> Result<TrainingReport, TrainingError> {
        let player = self.config.player;
        let eval_games = agent.config().eval_games;
        let start = Board::new();
        let mut metrics = TrainingMetrics::with_capacity(self.config.log_interval.max(100));
        let mut throughput = Throughput::new();
        let mut eval_history = Vec::new();

        let start_episode = agent.episode_count() + 1;
        let end_episode = agent.episode_count() + self.config.num_episodes;

        info!(
            episodes = self.config.num_episodes,
            start_episode,
            end_episode,
            player = player.name(),
            opponent = opponent.name(),
            "starting Q-learning training"
        );

        for episode in start_episode..=end_episode {
            let result = agent.train_episode(player, &start, opponent)?;
            metrics.record_episode(result);
            throughput.record_episode();

            if episode % self.config.log_interval == 0 {
                let window = self.config.log_interval;
                info!(
                    episode,
                    win_rate = metrics.win_rate(window),
                    draw_rate = metrics.draw_rate(window),
                    loss_rate = metrics.loss_rate(window),
                    avg_len = metrics.average_game_length(window),
                    td_error = metrics.average_td_error(window),
                    states = agent.table().len(),
                    eps_per_sec = throughput.episodes_per_sec(),
                    "training progress"
                );
                throughput.reset_window();
            }

            let overhead = Instant::now();
            let mut eval_win_rate = None;

            if episode % self.config.eval_interval == 0 {
                let win_rate = agent.evaluate(player, eval_games)?;
                info!(episode, games = eval_games, win_rate, "eval vs random");
                eval_history.push(EvalPoint { episode, win_rate });
                eval_win_rate = Some(win_rate);
            }

            if episode % self.config.checkpoint_interval == 0 {
                let win_rate = match eval_win_rate {
                    Some(rate) => rate,
                    None => agent.evaluate(player, eval_games)?,
                };
                let window = self.config.log_interval;
                let ckpt_metrics = CheckpointMetrics {
                    win_rate,
                    draw_rate: metrics.draw_rate(window),
                    average_game_length: metrics.average_game_length(window),
                    average_td_error: metrics.average_td_error(window),
                    table_size: agent.table().len(),
                };
                if let Err(e) =
                    self.checkpoint_manager
                        .save_checkpoint(agent, player, &ckpt_metrics, episode)
                {
                    error!(episode, error = %e, "checkpoint failed");
                }
            }

            throughput.record_overhead(overhead.elapsed());
        }

        // Not checkpointed: evaluation adds the states it visits to the table.
        let final_win_rate = agent.evaluate(player, eval_games)?;
        info!(
            total_episodes = metrics.total_episodes(),
            final_win_rate,
            states = agent.table().len(),
            "training complete"
        );

        Ok(TrainingReport {
            episodes: metrics.total_episodes(),
            eval_history,
            final_win_rate,
        })
    }

    /// Restore the agent's table and episode count from the latest checkpoint.
    pub fn resume(&self, agent: &mut QAgent) -> Result<usize, TrainingError> {
        let data = self.checkpoint_manager.load_latest()?;
        *agent.table_mut() = data.table;
        agent.set_episode_count(data.metadata.episode);
        info!(
            path = %data.path.display(),
            episode = data.metadata.episode,
            states = agent.table().len(),
            "resumed from checkpoint"
        );
        Ok(data.metadata.episode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{QLearningConfig, RandomAgent};

    fn small_run(dir: &std::path::Path) -> (Trainer, QAgent) {
        let trainer = Trainer::new(
            TrainerConfig {
                num_episodes: 20,
                log_interval: 5,
                eval_interval: 10,
                checkpoint_interval: 10,
                player: Player::Red,
            },
            CheckpointManagerConfig {
                checkpoint_dir: dir.to_path_buf(),
                keep_last_n: 5,
                keep_best_n: 3,
            },
        )
        .unwrap();
        let agent = QAgent::new(QLearningConfig {
            eval_games: 4,
            seed: Some(17),
            ..Default::default()
        });
        (trainer, agent)
    }

    #[test]
    fn test_train_records_evals_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let (trainer, mut agent) = small_run(dir.path());
        let mut opponent = RandomAgent::with_seed(18);

        let report = trainer.train(&mut agent, &mut opponent).unwrap();
        assert_eq!(report.episodes, 20);
        assert_eq!(agent.episode_count(), 20);
        let eval_episodes: Vec<usize> = report.eval_history.iter().map(|p| p.episode).collect();
        assert_eq!(eval_episodes, vec![10, 20]);
        assert!((0.0..=1.0).contains(&report.final_win_rate));
        assert!(!agent.table().is_empty());

        let checkpoints = trainer.checkpoint_manager().list_checkpoints().unwrap();
        let episodes: Vec<usize> = checkpoints.iter().map(|(_, m)| m.episode).collect();
        assert_eq!(episodes, vec![10, 20]);
    }

    #[test]
    fn test_resume_continues_episode_count() {
        let dir = tempfile::tempdir().unwrap();
        let (trainer, mut agent) = small_run(dir.path());
        let mut opponent = RandomAgent::with_seed(19);
        trainer.train(&mut agent, &mut opponent).unwrap();

        let mut resumed = QAgent::new(QLearningConfig {
            seed: Some(20),
            ..Default::default()
        });
        let episode = trainer.resume(&mut resumed).unwrap();
        assert_eq!(episode, 20);
        assert_eq!(resumed.episode_count(), 20);

        // The final evaluation runs after the last checkpoint and adds the
        // states it visits, so the live table may hold more entries.
        let saved = trainer.checkpoint_manager().load_latest().unwrap().table;
        assert_eq!(resumed.table().len(), saved.len());
        assert!(agent.table().len() >= saved.len());
        for (key, _) in saved.iter() {
            assert!(resumed.table().contains(key));
            assert!(agent.table().contains(key));
        }

        let report = trainer.train(&mut resumed, &mut opponent).unwrap();
        assert_eq!(report.eval_history.last().map(|p| p.episode), Some(40));
    }

    #[test]
    fn test_resume_without_checkpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (trainer, mut agent) = small_run(dir.path());
        assert!(matches!(
            trainer.resume(&mut agent),
            Err(TrainingError::Checkpoint(_))
        ));
    }
}
