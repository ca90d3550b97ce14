/*!
 * Error types for the locheck application.
 *
 * Configuration errors are fatal and abort a run before any file or network
 * work starts. Parse and read errors are per-file and end up as diagnostics.
 * Validation findings are never errors; see `checks::Diagnostic`.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling a run (patterns, file types, checks)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The pattern uses named parameters that have no default value
    #[error("missing parameters {names:?} for pattern {pattern}")]
    MissingParameters {
        /// The pattern as given by the caller
        pattern: String,
        /// Parameters used in the pattern without a default
        names: Vec<String>,
    },

    /// The pattern cannot be turned into a glob or a matcher
    #[error("invalid pattern {pattern}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    /// Unknown content type key
    #[error("unknown file type: {0}")]
    UnknownFileType(String),

    /// XML content needs an element query
    #[error("file type xml requires a query")]
    MissingQuery,

    /// The check cannot run on what the parser chain produces
    #[error("check {check} is not supported for file type {filetype}")]
    UnsupportedCheck {
        check: String,
        filetype: String,
    },

    /// The root URL used to resolve relative links is not a valid URL
    #[error("invalid root url {url}: {reason}")]
    InvalidRootUrl {
        url: String,
        reason: String,
    },

    /// A configured request header cannot be sent
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        name: String,
        reason: String,
    },

    /// Any other out-of-range setting
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting {
        name: String,
        reason: String,
    },
}

/// Errors produced by a single parser stage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Raw bytes are not valid UTF-8
    #[error("content is not valid UTF-8: {0}")]
    Encoding(String),

    /// The XML document is malformed
    #[error("malformed XML: {0}")]
    Xml(String),

    /// The element query cannot be evaluated
    #[error("invalid XML query {query}: {reason}")]
    XmlQuery {
        query: String,
        reason: String,
    },
}

/// Error returned by a parser chain, carrying the content it started from
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stage {stage} failed: {source}")]
pub struct ChainError {
    /// Name of the first stage that failed
    pub stage: String,
    /// Content as it was before the chain ran
    pub original: String,
    /// What the stage reported
    #[source]
    pub source: ParseError,
}

/// Errors while reading content from disk
#[derive(Error, Debug)]
pub enum ReadError {
    /// The file does not exist
    #[error("file does not exist: {0:?}")]
    Missing(PathBuf),

    /// The file exists but cannot be read
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error in the run configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<ReadError> for AppError {
    fn from(error: ReadError) -> Self {
        Self::File(error.to_string())
    }
}
