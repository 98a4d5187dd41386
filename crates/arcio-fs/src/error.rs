use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create staging directory: {source}")]
    Create { source: io::Error },

    #[error("failed to remove staging directory '{path}': {source}")]
    Remove { path: PathBuf, source: io::Error },

    #[error("failed to walk '{path}': {source}")]
    Walk {
        path:   PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to inspect '{path}': {source}")]
    Metadata { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
