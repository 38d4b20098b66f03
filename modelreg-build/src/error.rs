use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error returned by every stage of the registry pipeline.
///
/// All variants are fatal to a run. Nothing is written to the output path
/// before the final emit step, so a failed run leaves any previously
/// generated registry untouched.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The source directory (or a file inside it) could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configured source path exists but is not a directory.
    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// A source file is not valid Rust.
    #[error("failed to parse {}:{line}:{column}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        #[source]
        source: syn::Error,
    },

    /// The registry could not be rendered from the configured settings.
    #[error("failed to render registry: {message}")]
    Render { message: String },

    /// The generated file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Emit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse failure class of a [`GenerateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Discovery,
    Parse,
    Emit,
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::Discovery { .. } | GenerateError::NotADirectory { .. } => ErrorKind::Discovery,
            GenerateError::Parse { .. } => ErrorKind::Parse,
            GenerateError::Render { .. } | GenerateError::Emit { .. } => ErrorKind::Emit,
        }
    }

    pub(crate) fn discovery(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenerateError::Discovery {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: syn::Error) -> Self {
        let start = source.span().start();
        GenerateError::Parse {
            path: path.into(),
            line: start.line,
            // proc-macro2 columns are 0-based
            column: start.column + 1,
            source,
        }
    }

    pub(crate) fn render(message: impl fmt::Display) -> Self {
        GenerateError::Render {
            message: message.to_string(),
        }
    }

    pub(crate) fn emit(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenerateError::Emit {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GenerateError>;
