use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] ragdesk_vector_store::VectorStoreError),

    #[error("Embedding timed out after {0}s")]
    EmbeddingTimeout(u64),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Completion timed out after {0}s")]
    CompletionTimeout(u64),
}

impl SearchError {
    pub fn completion(msg: impl Into<String>) -> Self {
        Self::Completion(msg.into())
    }
}
