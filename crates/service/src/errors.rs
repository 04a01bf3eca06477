use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The blob could not be read, parsed or written.
    #[error("storage unavailable: {0}")]
    Storage(String),
    /// A value could not be encoded for writing.
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn storage(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{}: {}", path.display(), err))
    }
}
