use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::ai::{QAgent, QTable};
use crate::checkpoint::metadata::{CheckpointMetadata, CheckpointMetrics, QLearningHyperparameters};
use crate::error::CheckpointError;
use crate::game::Player;

const TABLE_FILE: &str = "q_table.json";
const METADATA_FILE: &str = "metadata.json";
const LATEST_LINK: &str = "latest";

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    pub checkpoint_dir: PathBuf,
    pub keep_last_n: usize,
    pub keep_best_n: usize,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
            keep_last_n: 5,
            keep_best_n: 3,
        }
    }
}

/// A value table restored from disk with its metadata.
#[derive(Debug)]
pub struct CheckpointData {
    pub path: PathBuf,
    pub metadata: CheckpointMetadata,
    pub table: QTable,
}

/// Manages saving, loading, listing, and pruning checkpoints.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointManagerConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        Ok(CheckpointManager { config })
    }

    pub fn config(&self) -> &CheckpointManagerConfig {
        &self.config
    }

    /// Save the agent's table and metadata as `checkpoint_<episode>`.
    ///
    /// Files are written into a `.tmp` directory that is renamed into place,
    /// then `latest` is repointed and old checkpoints are pruned.
    pub fn save_checkpoint(
        &self,
        agent: &QAgent,
        player: Player,
        metrics: &CheckpointMetrics,
        episode: usize,
    ) -> Result<PathBuf, CheckpointError> {
        let dir_name = format!("checkpoint_{:07}", episode);
        let tmp_dir = self.config.checkpoint_dir.join(format!("{}.tmp", dir_name));
        let final_dir = self.config.checkpoint_dir.join(&dir_name);

        fs::create_dir_all(&tmp_dir)?;
        fs::write(tmp_dir.join(TABLE_FILE), agent.table().to_json_pretty()?)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let metadata = CheckpointMetadata {
            episode,
            timestamp,
            algorithm: "QL".to_string(),
            metrics: metrics.clone(),
            hyperparameters: QLearningHyperparameters::new(
                agent.config(),
                agent.epsilon(),
                player,
            ),
        };
        fs::write(
            tmp_dir.join(METADATA_FILE),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        // Atomic rename
        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;

        self.update_latest_symlink(&dir_name)?;
        self.prune_old_checkpoints()?;

        info!(path = %final_dir.display(), episode, "checkpoint saved");
        Ok(final_dir)
    }

    fn read_metadata(dir: &Path) -> Result<CheckpointMetadata, CheckpointError> {
        let meta_path = dir.join(METADATA_FILE);
        let meta_json = fs::read_to_string(&meta_path).map_err(|e| {
            CheckpointError::MetadataRead {
                path: meta_path.clone(),
                source: e,
            }
        })?;
        serde_json::from_str(&meta_json).map_err(|e| CheckpointError::MetadataParse {
            path: meta_path,
            source: e,
        })
    }

    /// Load the table and metadata stored in `dir`.
    pub fn load_checkpoint(&self, dir: &Path) -> Result<CheckpointData, CheckpointError> {
        if !dir.is_dir() {
            return Err(CheckpointError::DirNotFound(dir.to_path_buf()));
        }
        let metadata = Self::read_metadata(dir)?;
        let table = QTable::load(&dir.join(TABLE_FILE))?;
        debug!(path = %dir.display(), episode = metadata.episode, "checkpoint loaded");
        Ok(CheckpointData {
            path: dir.to_path_buf(),
            metadata,
            table,
        })
    }

    /// Load the checkpoint `latest` points at.
    pub fn load_latest(&self) -> Result<CheckpointData, CheckpointError> {
        let latest_link = self.config.checkpoint_dir.join(LATEST_LINK);
        if latest_link.symlink_metadata().is_err() {
            return Err(CheckpointError::NoLatestSymlink(
                self.config.checkpoint_dir.clone(),
            ));
        }
        let resolved = fs::read_link(&latest_link)?;
        let target = if resolved.is_relative() {
            self.config.checkpoint_dir.join(resolved)
        } else {
            resolved
        };
        self.load_checkpoint(&target)
    }

    /// List all checkpoints sorted by episode (ascending).
    pub fn list_checkpoints(
        &self,
    ) -> Result<Vec<(PathBuf, CheckpointMetadata)>, CheckpointError> {
        let mut results = Vec::new();
        for entry in fs::read_dir(&self.config.checkpoint_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if !name_str.starts_with("checkpoint_") || name_str.ends_with(".tmp") {
                continue;
            }
            if path.join(METADATA_FILE).exists() {
                results.push((path.clone(), Self::read_metadata(&path)?));
            }
        }
        results.sort_by_key(|(_, m)| m.episode);
        Ok(results)
    }

    /// Prune old checkpoints, keeping the union of the last N and best N by win_rate.
    fn prune_old_checkpoints(&self) -> Result<(), CheckpointError> {
        let checkpoints = self.list_checkpoints()?;
        if checkpoints.len() <= self.config.keep_last_n {
            return Ok(());
        }

        let total = checkpoints.len();
        let mut keep: HashSet<usize> =
            (total.saturating_sub(self.config.keep_last_n)..total).collect();

        let mut by_win_rate: Vec<(usize, f64)> = checkpoints
            .iter()
            .enumerate()
            .map(|(i, (_, m))| (i, m.metrics.win_rate))
            .collect();
        by_win_rate.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        keep.extend(
            by_win_rate
                .iter()
                .take(self.config.keep_best_n)
                .map(|&(i, _)| i),
        );

        for (i, (path, _)) in checkpoints.iter().enumerate() {
            if !keep.contains(&i) {
                debug!(path = %path.display(), "pruning checkpoint");
                fs::remove_dir_all(path)?;
            }
        }

        Ok(())
    }

    /// Update the `latest` symlink to point to the given checkpoint directory name.
    fn update_latest_symlink(&self, dir_name: &str) -> Result<(), CheckpointError> {
        let link_path = self.config.checkpoint_dir.join(LATEST_LINK);
        if link_path.symlink_metadata().is_ok() {
            fs::remove_file(&link_path)?;
        }
        #[cfg(unix)]
        std::os::unix::fs::symlink(dir_name, &link_path)?;
        #[cfg(windows)]
        std::os::windows::fs::symlink_dir(dir_name, &link_path)?;
        Ok(())
    }
}
