use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load embedding model: {0}")]
    ModelLoad(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Process exit status for this failure. `2` is left to the argument parser.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io { .. } => 1,
            Self::ModelLoad(_) => 3,
            Self::DegenerateInput(_) => 4,
            Self::InvalidConfig(_) => 5,
            Self::DimensionMismatch { .. } | Self::Embedding(_) => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
