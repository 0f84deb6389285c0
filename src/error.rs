use std::path::PathBuf;
use thiserror::Error;

/// Structured failures surfaced by the store, merger, and hosts-block generator.
///
/// A resolution miss is a normal negative result, not a failure - the
/// resolver returns `Option` instead of one of these.
#[derive(Debug, Error)]
pub enum Error {
    /// A persisted file exists but does not match the expected schema.
    #[error("config file {path:?} is not valid: {reason}")]
    CorruptConfig { path: PathBuf, reason: String },

    /// `category add` with a name that exactly matches an existing category.
    /// Alias collisions are permitted, only exact key matches are rejected.
    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    /// An operation referenced a category that is not declared in settings.
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    /// Import archive content with an unexpected shape. Raised before any
    /// on-disk state is touched.
    #[error("import archive is malformed: {0}")]
    ImportMalformed(String),

    /// The hosts-block target file refused write access. No partial edits
    /// are attempted.
    #[error("no write permission for {0:?}")]
    PermissionDenied(PathBuf),
}
