//! # Connect Four search
//!
//! Move selection for Connect Four with interchangeable strategies:
//! Monte-Carlo tree search (UCT), tabular Q-learning, uniform random play,
//! and greedy play over an injected evaluation policy.
//!
//! ## Modules
//!
//! - [`game`] — Board, players, win detection and canonical keys
//! - [`ai`] — Agent trait, evaluation policies, MCTS, Q-learning, strategy dispatch
//! - [`training`] — Q-learning trainer, game helpers, metrics
//! - [`checkpoint`] — Value-table persistence and pruning
//! - [`scenario`] — Scenario file loading
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod scenario;
pub mod training;
