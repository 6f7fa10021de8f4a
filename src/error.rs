use std::path::PathBuf;

/// Errors raised by move-selecting agents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("no legal move: the board is full")]
    NoLegalMove,

    #[error("illegal column {column} (legal: {legal:?})")]
    IllegalColumn { column: usize, legal: Vec<usize> },
}

/// Errors in a textual board layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("expected {expected} board rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell symbol '{symbol}' at row {row}, column {col}")]
    UnknownSymbol { row: usize, col: usize, symbol: char },

    #[error("piece at row {row}, column {col} floats above an empty cell")]
    FloatingPiece { row: usize, col: usize },
}

/// Errors that can occur while building or persisting a Q-value table.
#[derive(Debug, thiserror::Error)]
pub enum QTableError {
    #[error("value table must be a mapping from board key to column values, found {0}")]
    NotAMapping(&'static str),

    #[error("failed to parse value table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading a scenario file.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("scenario is missing its {0} line")]
    MissingLine(&'static str),

    #[error("unknown algorithm tag '{0}' (expected UR, UCT, QL or DQN)")]
    UnknownAlgorithm(String),

    #[error("invalid player: {0}")]
    UnknownPlayer(#[from] crate::game::ParsePlayerError),

    #[error("invalid board layout: {0}")]
    Layout(#[from] LayoutError),
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("value table error: {0}")]
    Table(#[from] QTableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("algorithm {0} needs an externally supplied evaluator")]
    UnsupportedAlgorithm(String),
}
