use crate::error::{IndexerError, Result};
use crate::index_lock::acquire_store_write_lock;
use crate::stats::{IngestOutcome, IngestReport};
use ragdesk_chunker::{Chunker, ChunkerConfig};
use ragdesk_extractor::{extract, DocumentKind, ExtractError};
use ragdesk_vector_store::{Chunk, Embedder, RestoreOutcome, SharedStore, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_INGEST_EMBED_TIMEOUT: Duration = Duration::from_secs(300);

/// Ingestion settings
#[derive(Clone, Debug)]
pub struct IndexerOptions {
    pub chunker: ChunkerConfig,
    /// Upper bound for embedding one document's chunks
    pub embed_timeout: Duration,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            embed_timeout: DEFAULT_INGEST_EMBED_TIMEOUT,
        }
    }
}

/// Ingestion pipeline and the only writer of its store
///
/// Extraction, chunking and embedding run without holding the store; the append and the
/// persist that follows it happen under the store's write guard and the on-disk store lock.
pub struct DocumentIndexer {
    store: SharedStore,
    store_dir: PathBuf,
    embedder: Arc<dyn Embedder>,
    chunker: Chunker,
    embed_timeout: Duration,
}

impl DocumentIndexer {
    /// Load (or create) the store in `store_dir` sized for `embedder`.
    pub async fn open(
        store_dir: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
        options: IndexerOptions,
    ) -> Result<(Self, RestoreOutcome)> {
        let store_dir = store_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&store_dir).await?;
        let (store, outcome) = VectorStore::open(&store_dir, embedder.dimension()).await;
        let indexer = Self::new(store.into_shared(), store_dir, embedder, options)?;
        Ok((indexer, outcome))
    }

    /// Build an indexer around an existing shared store.
    pub fn new(
        store: SharedStore,
        store_dir: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
        options: IndexerOptions,
    ) -> Result<Self> {
        options.chunker.validate()?;
        Ok(Self {
            store,
            store_dir: store_dir.as_ref().to_path_buf(),
            embedder,
            chunker: Chunker::new(options.chunker),
            embed_timeout: options.embed_timeout,
        })
    }

    #[must_use]
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    #[must_use]
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    #[must_use]
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Ingest one document of an explicit kind.
    pub async fn ingest(&self, path: &Path, kind: DocumentKind) -> IngestOutcome {
        let source = source_name(path);
        log::info!("Processing document: {}", path.display());

        let result = match extract(path, kind).await {
            Ok(text) => self.index_text(&text, &source).await,
            Err(err) => Err(err.into()),
        };
        classify(source, result)
    }

    /// Ingest one document, resolving its kind from the extension.
    pub async fn ingest_path(&self, path: &Path) -> IngestOutcome {
        match DocumentKind::from_path(path) {
            Some(kind) => self.ingest(path, kind).await,
            None => {
                let ext = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or_default()
                    .to_string();
                log::warn!("Unsupported file type skipped: {}", path.display());
                classify(
                    source_name(path),
                    Err(ExtractError::UnsupportedKind(ext).into()),
                )
            }
        }
    }

    /// Ingest several documents in order, one commit each.
    pub async fn ingest_all(&self, paths: &[(PathBuf, Option<DocumentKind>)]) -> IngestReport {
        let started = Instant::now();
        let mut report = IngestReport::default();
        for (path, kind) in paths {
            let outcome = match kind {
                Some(kind) => self.ingest(path, *kind).await,
                None => self.ingest_path(path).await,
            };
            report.record(outcome);
        }
        report.stats.time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Ingested {} documents: {} indexed, {} skipped, {} failed",
            paths.len(),
            report.stats.indexed,
            report.stats.skipped,
            report.stats.failed
        );
        report
    }

    /// Empty the store and delete its artifacts.
    pub async fn reset(&self) -> Result<()> {
        let _lock = acquire_store_write_lock(&self.store_dir).await?;
        let mut store = self.store.write().await;
        store.clear(&self.store_dir).await?;
        Ok(())
    }

    async fn index_text(&self, text: &str, source: &str) -> Result<usize> {
        let chunks = self.chunker.chunk_document(text, source);
        if chunks.is_empty() {
            return Err(IndexerError::NoChunks(source.to_string()));
        }

        log::info!(
            "Generating embeddings for {} chunks from {source}...",
            chunks.len()
        );
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = tokio::time::timeout(self.embed_timeout, self.embedder.embed_batch(&texts))
            .await
            .map_err(|_| IndexerError::EmbeddingTimeout(self.embed_timeout.as_secs()))??;
        log::info!("Generated {} embeddings.", vectors.len());

        self.commit(vectors, chunks).await
    }

    /// Append and persist as one unit; a failed persist rolls the append back.
    async fn commit(&self, vectors: Vec<Vec<f32>>, chunks: Vec<Chunk>) -> Result<usize> {
        let count = chunks.len();
        let _lock = acquire_store_write_lock(&self.store_dir).await?;
        let mut store = self.store.write().await;

        if let Some(outcome) = store.refresh_if_stale(&self.store_dir).await {
            log::info!("Store reloaded before commit: {outcome:?}");
        }

        let before = store.len();
        store.add(vectors, chunks)?;
        if let Err(err) = store.persist(&self.store_dir).await {
            log::error!("Persist failed, rolling back {count} chunks: {err}");
            store.truncate(before);
            return Err(err.into());
        }

        log::info!("Store now holds {} chunks", store.len());
        Ok(count)
    }
}

fn classify(source: String, result: Result<usize>) -> IngestOutcome {
    match result {
        Ok(chunks) => IngestOutcome::Indexed { source, chunks },
        Err(err) if err.is_skip() => {
            log::warn!("Skipping {source}: {err}");
            IngestOutcome::Skipped {
                source,
                reason: err.to_string(),
            }
        }
        Err(err) => {
            log::error!("Failed to ingest {source}: {err}");
            IngestOutcome::Failed {
                source,
                reason: err.to_string(),
            }
        }
    }
}

/// Chunks are tagged with the bare file name.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
