use crate::composer::{AnswerComposer, DEFAULT_COMPLETION_TIMEOUT};
use crate::completion::Completer;
use crate::retriever::{Retriever, DEFAULT_QUERY_EMBED_TIMEOUT, DEFAULT_TOP_K};
use ragdesk_extractor::DocumentKind;
use ragdesk_indexer::{DocumentIndexer, IngestOutcome};
use ragdesk_vector_store::{Chunk, SearchHit};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AssistantOptions {
    pub top_k: usize,
    pub query_embed_timeout: Duration,
    pub completion_timeout: Duration,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            query_embed_timeout: DEFAULT_QUERY_EMBED_TIMEOUT,
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }
}

/// Document Q&A facade: ingest on one side, grounded answers on the other
///
/// Both sides share the indexer's store, so an answer sees every document whose ingest has
/// returned.
pub struct Assistant {
    indexer: DocumentIndexer,
    retriever: Retriever,
    composer: AnswerComposer,
    top_k: usize,
}

impl Assistant {
    pub fn new(
        indexer: DocumentIndexer,
        completer: Arc<dyn Completer>,
        options: AssistantOptions,
    ) -> Self {
        let retriever = Retriever::new(indexer.store(), indexer.embedder())
            .with_embed_timeout(options.query_embed_timeout);
        let composer = AnswerComposer::new(completer).with_timeout(options.completion_timeout);
        Self {
            indexer,
            retriever,
            composer,
            top_k: options.top_k,
        }
    }

    /// Ingest one document; `None` resolves the kind from the extension.
    pub async fn ingest(&self, path: &Path, kind: Option<DocumentKind>) -> IngestOutcome {
        match kind {
            Some(kind) => self.indexer.ingest(path, kind).await,
            None => self.indexer.ingest_path(path).await,
        }
    }

    /// The `top_k` chunks nearest to `query`.
    pub async fn retrieve(&self, query: &str) -> Vec<Chunk> {
        self.retriever.retrieve(query, self.top_k).await
    }

    pub async fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        self.retriever.retrieve_scored(query, k).await
    }

    /// Answer `query` from the indexed documents. Never fails; completion errors come back
    /// as an apology string.
    pub async fn answer(&self, query: &str) -> String {
        log::info!("Answering query: '{query}'");
        let chunks = self.retrieve(query).await;
        self.composer.answer(query, &chunks).await
    }
}
