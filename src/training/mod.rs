//! Training infrastructure: the Q-learning trainer, shared game-playing
//! helpers and rolling metrics.

pub mod episode;
pub mod metrics;
pub mod trainer;
