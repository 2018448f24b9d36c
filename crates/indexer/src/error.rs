use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Extraction error: {0}")]
    ExtractError(#[from] ragdesk_extractor::ExtractError),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] ragdesk_chunker::ChunkerError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] ragdesk_vector_store::VectorStoreError),

    #[error("No chunks produced for {0}")]
    NoChunks(String),

    #[error("Embedding timed out after {0}s")]
    EmbeddingTimeout(u64),

    #[error("{0}")]
    Other(String),
}

impl IndexerError {
    /// Errors that mean "nothing to index" rather than "ingestion broke"
    #[must_use]
    pub fn is_skip(&self) -> bool {
        match self {
            Self::ExtractError(err) => err.is_skip(),
            Self::NoChunks(_) => true,
            _ => false,
        }
    }
}
