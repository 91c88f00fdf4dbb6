use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Code length exceeds 10,000 characters")]
    CodeTooLong { len: usize },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("missing request context: {0}")]
    MissingContext(&'static str),
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),
    #[error("malformed data: {0}")]
    MalformedData(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// True when the caller sent something we refuse; everything else is our fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
