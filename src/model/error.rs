//! Build error types
//!
//! A build is all-or-nothing: any malformed primary record aborts it and no
//! partial views are exposed. Dangling clip-to-stream references are the one
//! lenient case - they are dropped, never surfaced as errors.

use thiserror::Error;

/// Errors that abort a catalog build
#[derive(Error, Debug)]
pub enum BuildError {
    /// Reading the snapshot failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON or misses a required field
    #[error("Snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stream record carries an unparseable timestamp
    #[error("Malformed timestamp {value:?} on stream {id:?}")]
    MalformedTimestamp { id: String, value: String },

    /// The configured granularity sequence is unusable
    #[error("Tree error: {0}")]
    Tree(#[from] crate::tree::TreeError),
}

/// Result type alias for build operations
pub type BuildResult<T> = Result<T, BuildError>;
