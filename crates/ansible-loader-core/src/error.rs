//! Loader error types

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while resolving variables
#[derive(Error, Debug)]
pub enum LoaderError {
    /// A required file or path is missing (or was never configured)
    #[error("Not found: {what} ({})", path.display())]
    NotFound { what: String, path: PathBuf },

    /// Malformed YAML or an unexpected document shape
    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Wrong vault password or corrupt ciphertext
    #[error("Vault decryption failed for {context}: {message}")]
    Decrypt { context: String, message: String },

    /// Incoherent extension configuration
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Read failure on a file that exists
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stable, coarse classification of a [`LoaderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Parse,
    Decrypt,
    Validation,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Parse => "parse",
            ErrorKind::Decrypt => "decrypt",
            ErrorKind::Validation => "validation",
            ErrorKind::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LoaderError {
    /// Create a not-found error
    pub fn not_found(what: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a parse error
    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a decryption error
    pub fn decrypt(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decrypt {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an IO error
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Which kind of failure this is
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoaderError::NotFound { .. } => ErrorKind::NotFound,
            LoaderError::Parse { .. } => ErrorKind::Parse,
            LoaderError::Decrypt { .. } => ErrorKind::Decrypt,
            LoaderError::Validation(_) => ErrorKind::Validation,
            LoaderError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Attach a context label to a decryption error raised without one
    pub(crate) fn in_context(self, context: impl Into<String>) -> Self {
        match self {
            LoaderError::Decrypt { message, .. } => LoaderError::Decrypt {
                context: context.into(),
                message,
            },
            other => other,
        }
    }
}

pub type LoaderResult<T> = Result<T, LoaderError>;
