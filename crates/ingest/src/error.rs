use thiserror::Error;

/// The uploaded bytes could not be interpreted as the declared document container.
///
/// Never retried: the caller has to supply a readable file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to process document: {message}")]
pub struct DocumentParseError {
    pub message: String,
}

impl DocumentParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
