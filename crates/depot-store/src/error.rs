/// Errors from name resolution and object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The client-supplied name is unsafe or degenerate.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// No regular file is stored under this name.
    #[error("file '{name}' not found")]
    NotFound { name: String },

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn invalid_name(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
