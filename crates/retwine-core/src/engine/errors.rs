//! Error types for retwine construction and extraction.

use thiserror::Error;

/// Errors that can occur while loading records, building graphs, or
/// extracting the backbone.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// Unresolvable rows are *not* errors: the builders skip them silently and
/// report the aggregate count through `SkipStats`. Everything here is fatal
/// for the dataset being processed; a multi-dataset batch driver is expected
/// to isolate failures per dataset rather than abort the run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BuildError {
    /// Domain error in the statistical model (e.g., a bipartite graph with
    /// zero posts, or a significance level outside (0, 1)).
    #[error("domain error: {0}")]
    Domain(String),

    /// A record that could not be interpreted (missing required field,
    /// unparseable value). Carries the 1-based line number where known.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// CSV-level read or decode failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decode failure in recovered-content input.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}
