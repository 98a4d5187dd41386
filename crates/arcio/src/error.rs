use std::io;
use std::path::PathBuf;

/// The target does not name an archive format this crate can handle.
///
/// Transformers treat this as the signal to run the wrapped function
/// unmodified; direct [`Archive`](crate::Archive) construction propagates it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("unrecognized archive format: '{0}'")]
    Unsupported(String),

    #[error("a stream target requires an explicit archive extension")]
    MissingExtension,

    #[error("a stream target requires an explicit member name")]
    MissingName,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("failed to open archive '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("zip-slip attack detected: entry '{entry}' resolves to '{resolved}'")]
    ZipSlip { entry: PathBuf, resolved: PathBuf },

    #[error("symlink target escapes base directory: '{target}' -> '{resolved}'")]
    SymlinkEscape { target: PathBuf, resolved: PathBuf },

    #[error("symlink target is absolute path: '{target}' in '{symlink}'")]
    AbsoluteSymlinkTarget { target: PathBuf, symlink: PathBuf },

    #[error("entry path is not valid: '{0}'")]
    InvalidPath(String),

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("failed to create symlink '{link}' -> '{target}': {source}")]
    SymlinkCreationFailed {
        target: PathBuf,
        link:   PathBuf,
        source: io::Error,
    },

    #[error("failed to add '{path}' to archive: {source}")]
    AppendFailed { path: PathBuf, source: io::Error },

    #[error("no candidate files found in '{archive}'")]
    NoCandidates { archive: String },

    #[error("{0}")]
    CandidatesExhausted(Exhausted),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Fs(#[from] arcio_fs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Every candidate inside an archive was rejected by the consumer.
///
/// `messages` holds one entry per attempt, in attempt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted {
    pub archive:  String,
    pub messages: Vec<String>,
}

impl std::fmt::Display for Exhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not load any file in '{}':", self.archive)?;
        for message in &self.messages {
            write!(f, "\n{message}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Whether this is a format-resolution failure rather than an operational one.
    pub fn is_format(&self) -> bool { matches!(self, Self::Format(_)) }
}

pub type Result<T> = std::result::Result<T, Error>;
