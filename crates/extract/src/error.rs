use ingest::DocumentParseError;
use thiserror::Error;

/// Unexpected failure in the middle of the pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to extract fields: {message}")]
pub struct FieldExtractionError {
    pub message: String,
}

impl FieldExtractionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The entity tagger model is missing or unloadable. Fatal at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("entity tagger model '{model}' could not be loaded: {reason}. {hint}")]
pub struct StartupDependencyError {
    pub model: String,
    pub reason: String,
    pub hint: String,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    DocumentParse(#[from] DocumentParseError),
    #[error(transparent)]
    FieldExtraction(#[from] FieldExtractionError),
}

impl ExtractError {
    /// 400 for unreadable input, 500 for everything else.
    pub fn status_code(&self) -> u16 {
        match self {
            ExtractError::DocumentParse(_) => 400,
            ExtractError::FieldExtraction(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        ExtractError::FieldExtraction(FieldExtractionError::new(e.to_string()))
    }
}
