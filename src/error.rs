use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions of a run. Anything reported here aborts before an
/// artifact is written.
#[derive(Debug, Error)]
pub enum Error {
    #[error("\"Duplicate\" files: {} and {}", first.display(), second.display())]
    DuplicateInput { first: PathBuf, second: PathBuf },

    #[error("input path '{}' does not exist", .0.display())]
    MissingInput(PathBuf),

    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("failed to write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize histogram: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool closed")]
    Closed,

    #[error("task finished without producing a result")]
    TaskLost,
}

/// Per-file failures. Logged and skipped, never fatal.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to open file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to initialize {codec} decoder for '{}': {source}", path.display())]
    Decoder {
        path: PathBuf,
        codec: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Per-game failures. The game stops contributing keys from that point on.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("illegal move '{san}' at ply {ply}: {reason}")]
    IllegalMove {
        ply: u32,
        san: String,
        reason: String,
    },
}
