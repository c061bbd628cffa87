// crates/geoimport-core/src/error.rs
use thiserror::Error;

/// Errors that abort an import stage (or the whole run).
///
/// Record-level problems never surface here: they are reported through
/// [`crate::Outcome::Skip`] and the importer moves on to the next line.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A source file is missing after the fetch step.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A plugin failed with something other than a skip request.
    #[error("hook {hook} failed in plugin '{plugin}': {message}")]
    Hook {
        hook: String,
        plugin: String,
        message: String,
    },

    #[cfg(feature = "fetch")]
    #[error("fetch error: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
