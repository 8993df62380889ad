//! Error types for page generation.

use std::io;
use std::path::PathBuf;

use mdpage_renderer::{OptionsError, OverrideParseError};

/// Error raised while preparing or running a generation.
///
/// Variants up to `UnknownEncoding` are configuration errors raised by
/// [`SiteGenerator::new`](crate::SiteGenerator::new) before any file is
/// touched. The rest abort a running generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Malformed attribute override entry.
    #[error("Invalid attribute override: {0}")]
    InvalidOverride(#[from] OverrideParseError),
    /// Unknown Markdown extension name.
    #[error("Invalid markdown extensions: {0}")]
    InvalidExtension(#[from] OptionsError),
    /// Directory-copy pattern that does not compile.
    #[error("Invalid copy pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// Unsupported text encoding label.
    #[error("Unsupported encoding `{0}` (expected UTF-8, ISO-8859-1 or ISO-8859-15)")]
    UnknownEncoding(String),

    /// Configured header or footer file does not exist.
    #[error("Template file not found: {}", path.display())]
    MissingTemplate { path: PathBuf },
    /// Reading a document or template failed.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing a generated page or creating its directory failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// File content is not valid in the configured input encoding.
    #[error("{} is not valid {encoding}", path.display())]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },
    /// Copying an asset file failed.
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
