//! Persistence of trained value tables with metadata, a `latest` pointer and
//! pruning of old checkpoints.

mod manager;
mod metadata;

pub use manager::{CheckpointData, CheckpointManager, CheckpointManagerConfig};
pub use metadata::{CheckpointMetadata, CheckpointMetrics, QLearningHyperparameters};
