use crate::error::{Result, SearchError};
use ragdesk_vector_store::{Chunk, Embedder, SearchHit, SharedStore};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_QUERY_EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Query → nearest chunks
pub struct Retriever {
    store: SharedStore,
    embedder: Arc<dyn Embedder>,
    embed_timeout: Duration,
}

impl Retriever {
    pub fn new(store: SharedStore, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            embed_timeout: DEFAULT_QUERY_EMBED_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_embed_timeout(mut self, embed_timeout: Duration) -> Self {
        self.embed_timeout = embed_timeout;
        self
    }

    /// Up to `k` chunks nearest to `query`, nearest first.
    ///
    /// Embedding or search failures are logged and yield an empty result, which callers treat
    /// as "no context".
    pub async fn retrieve(&self, query: &str, k: usize) -> Vec<Chunk> {
        self.retrieve_scored(query, k)
            .await
            .into_iter()
            .map(|hit| hit.chunk)
            .collect()
    }

    /// Like [`Retriever::retrieve`], keeping distances.
    pub async fn retrieve_scored(&self, query: &str, k: usize) -> Vec<SearchHit> {
        match self.try_retrieve(query, k).await {
            Ok(hits) => {
                log::info!("Retrieved {} relevant chunks.", hits.len());
                hits
            }
            Err(err) => {
                log::error!("Retrieval failed for query '{query}': {err}");
                Vec::new()
            }
        }
    }

    async fn try_retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if self.store.read().await.is_empty() {
            log::warn!("Vector store is empty. Cannot retrieve chunks.");
            return Ok(Vec::new());
        }

        log::debug!("Embedding query: '{query}'");
        let vector = tokio::time::timeout(self.embed_timeout, self.embedder.embed(query))
            .await
            .map_err(|_| SearchError::EmbeddingTimeout(self.embed_timeout.as_secs()))??;

        log::debug!("Searching index for {k} nearest neighbors...");
        let hits = self.store.read().await.search(&vector, k)?;
        Ok(hits)
    }
}
