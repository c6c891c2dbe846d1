use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoseCsvError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse keyframe {}: {source}", path.display())]
    KeyframeParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid keypoint block '{key}' in {}: {reason}", path.display())]
    InvalidBlock {
        path: PathBuf,
        key: String,
        reason: String,
    },

    #[error(
        "Keypoint block '{key}' in {} has {actual} values, expected {expected}",
        path.display()
    )]
    BlockLength {
        path: PathBuf,
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot naturally order '{left}' against '{right}': token kinds differ")]
    UnsupportedSortInput { left: String, right: String },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Output file {} exists (enable output.overwrite to replace)", path.display())]
    OutputExists { path: PathBuf },

    #[error(
        "Video directory {} maps to output {} already used by another video",
        source_dir.display(),
        path.display()
    )]
    OutputCollision { path: PathBuf, source_dir: PathBuf },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PoseCsvError {
    pub fn file_access<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_block<P, K, R>(path: P, key: K, reason: R) -> Self
    where
        P: Into<PathBuf>,
        K: Into<String>,
        R: Into<String>,
    {
        Self::InvalidBlock {
            path: path.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PoseCsvError>;
