//! Error types for Updraft
//!
//! The library uses `thiserror`; the binary wraps everything in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for publish operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Main error type for publish operations
#[derive(Error, Debug)]
pub enum PublishError {
    /// Build directory does not exist
    #[error("build directory not found: {path}")]
    BuildDirNotFound { path: PathBuf },

    /// Build path exists but is not a directory
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The local tree contained no regular files
    #[error("no files found in {path}")]
    NothingToPublish { path: PathBuf },

    /// A local file could not be read
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote request failed or was rejected by the provider
    #[error("failed to {operation}: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    /// The stack reached a failure-class terminal status
    #[error("stack {stack} failed with status {status}: {reason}")]
    StackFailed {
        stack: String,
        status: String,
        reason: String,
    },

    /// The stack completed but exposes none of the outputs publishing needs
    #[error("stack {stack} has no usable outputs; was it created by updraft?")]
    MissingOutputs { stack: String },

    /// The overall publish deadline elapsed during a blocking wait
    #[error("deadline exceeded while {operation}")]
    DeadlineExceeded { operation: &'static str },

    /// Interrupted by the operator
    #[error("publish cancelled")]
    Cancelled,

    /// No public hosted zone in the account
    #[error("no Route53 hosted zone found")]
    NoHostedZones,

    /// Several zones but no terminal to ask on
    #[error("multiple hosted zones found; run interactively or set hosted_zone_id in .updraft.toml")]
    ZoneSelectionRequired,

    /// Zone prompt answered with something unusable
    #[error("invalid selection: {input}")]
    InvalidZoneSelection { input: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Project config exists but cannot be parsed
    #[error("failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Project config cannot be serialized
    #[error("failed to serialize config: {message}")]
    ConfigSerialize { message: String },

    /// Project config cannot be written back
    #[error("failed to write {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
