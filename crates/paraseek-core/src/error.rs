use thiserror::Error;

/// Failures surfaced by the core operations.
///
/// Pattern failures are recovered by [`Library::search`](crate::library::Library::search)
/// as a synthetic result row; everything else propagates to the caller
/// with no partial mutation applied.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("empty search query")]
    EmptyQuery,

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("paragraph not found in '{file}' (the file may have changed since it was read)")]
    ParagraphNotFound { file: String },

    #[error("paragraph text is empty")]
    EmptyParagraph,

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl Error {
    /// True for lookups that missed: an unknown file or a stale paragraph reference.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileNotFound(_) | Error::ParagraphNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
