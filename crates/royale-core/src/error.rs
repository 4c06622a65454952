use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading game data files.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read {what} {path:?}: {source}")]
    Read {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {what} {path:?}: {source}")]
    Parse {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            CoreError::Read { path, .. } | CoreError::Parse { path, .. } => path.as_path(),
        }
    }
}
