use thiserror::Error;

/// Result type for extraction
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Reasons a document produced no text
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The document kind is not one we can read
    #[error("Unsupported document kind: '{0}' (expected txt or pdf)")]
    UnsupportedKind(String),

    /// The file could not be read
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A text file was not valid UTF-8
    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The PDF could not be parsed
    #[error("PDF parse error: {0}")]
    PdfError(String),

    /// Parsing worked but there was nothing to index
    #[error("No text extracted from {0}")]
    NoText(String),

    /// Blocking task failed to complete
    #[error("{0}")]
    Other(String),
}

impl ExtractError {
    /// True when the document should be skipped rather than reported as a failure.
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::UnsupportedKind(_) | Self::NoText(_))
    }
}
