use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of an [`ExtractError`], for callers that only need to
/// branch on what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    UnavailableDependency,
    MalformedInput,
    Io,
    UnsupportedMode,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported format: no extractor registered for extension '{token}'")]
    UnsupportedFormat { token: String },

    #[error("Dependency unavailable: {collaborator} is required to extract {format} files")]
    UnavailableDependency {
        format: String,
        collaborator: String,
    },

    #[error("Malformed {format} input: {message}")]
    MalformedInput { format: String, message: String },

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{mode} output is not supported for {format} files")]
    UnsupportedMode { format: String, mode: String },
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ExtractError::UnavailableDependency { .. } => ErrorKind::UnavailableDependency,
            ExtractError::MalformedInput { .. } => ErrorKind::MalformedInput,
            ExtractError::Io { .. } => ErrorKind::Io,
            ExtractError::UnsupportedMode { .. } => ErrorKind::UnsupportedMode,
        }
    }

    pub(crate) fn unsupported(token: impl Into<String>) -> Self {
        ExtractError::UnsupportedFormat {
            token: token.into(),
        }
    }

    pub(crate) fn unavailable(format: impl Into<String>, collaborator: impl Into<String>) -> Self {
        ExtractError::UnavailableDependency {
            format: format.into(),
            collaborator: collaborator.into(),
        }
    }

    pub(crate) fn malformed(format: impl Into<String>, message: impl ToString) -> Self {
        ExtractError::MalformedInput {
            format: format.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
