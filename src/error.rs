use std::path::PathBuf;

/// Result type alias for the loading path
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the loading path. Everything past loading degrades to
/// empty defaults instead of erroring; only a broken entry module aborts.
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    LoadError { file: PathBuf, message: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::LoadError { file, message } => {
                write!(f, "failed to load {}: {}", file.display(), message)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}
