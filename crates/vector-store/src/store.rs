use crate::chunk_list::{PersistedChunkList, CHUNK_LIST_SCHEMA_VERSION};
use crate::error::{Result, VectorStoreError};
use crate::flat_index::{header_len, peek_generation, FlatIndex};
use crate::paths::{write_all_atomic, StorePaths};
use crate::types::{RestoreOutcome, SearchHit};
use ragdesk_chunker::Chunk;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

/// A store shared between the single writer and any number of readers.
pub type SharedStore = Arc<RwLock<VectorStore>>;

/// Embedding vectors and their chunks, related by position
#[derive(Debug, Clone)]
pub struct VectorStore {
    index: FlatIndex,
    chunks: Vec<Chunk>,
    generation: u64,
}

impl VectorStore {
    /// Empty store with a fixed vector dimension
    pub fn create(dimension: usize) -> Self {
        log::info!("Creating empty VectorStore with dimension {dimension}");
        Self {
            index: FlatIndex::new(dimension),
            chunks: Vec::new(),
            generation: 0,
        }
    }

    /// Load the store persisted in `dir`, or start empty when there is nothing usable.
    pub async fn open(dir: impl AsRef<Path>, dimension: usize) -> (Self, RestoreOutcome) {
        let mut store = Self::create(dimension);
        let outcome = store.restore(dir).await;
        (store, outcome)
    }

    /// Wrap into a [`SharedStore`].
    #[must_use]
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Append vectors and chunks in lock-step.
    ///
    /// Nothing is appended unless every vector has the store's dimension and the two
    /// sequences have the same length.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>, chunks: Vec<Chunk>) -> Result<()> {
        if vectors.len() != chunks.len() {
            return Err(VectorStoreError::LengthMismatch {
                vectors: vectors.len(),
                chunks: chunks.len(),
            });
        }
        if self.dimension() == 0 {
            return Err(VectorStoreError::IndexError(
                "cannot add to a zero-dimension store".to_string(),
            ));
        }
        self.check_consistency()?;

        self.index.add_batch(&vectors)?;
        self.chunks.extend(chunks);
        debug_assert_eq!(self.index.len(), self.chunks.len());

        log::info!(
            "Added {} vectors to VectorStore. Total: {}",
            vectors.len(),
            self.chunks.len()
        );
        Ok(())
    }

    /// Up to `k` chunks nearest to `query`, nearest first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.check_consistency()?;
        if self.is_empty() {
            log::debug!("VectorStore is empty; nothing to search");
            return Ok(Vec::new());
        }

        let hits = self
            .index
            .search(query, k)?
            .into_iter()
            .filter_map(|(position, distance)| {
                self.chunks.get(position).map(|chunk| SearchHit {
                    chunk: chunk.clone(),
                    distance,
                    position,
                })
            })
            .collect::<Vec<_>>();

        log::debug!("Search (k={k}) found {} hits", hits.len());
        Ok(hits)
    }

    /// Write both artifacts to `dir`, replacing any previous pair.
    ///
    /// Both are staged before either is renamed, so a failed write keeps the previous pair.
    pub async fn persist(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        self.check_consistency()?;
        let paths = StorePaths::new(dir);
        let generation = self.generation + 1;
        log::info!(
            "Saving VectorStore ({} chunks, generation {generation}) to {}",
            self.chunks.len(),
            paths.dir.display()
        );

        let blob = self.index.encode(generation)?;
        let list = PersistedChunkList {
            schema_version: CHUNK_LIST_SCHEMA_VERSION,
            dimension: self.dimension(),
            generation,
            chunks: self.chunks.clone(),
        }
        .to_bytes()?;

        write_all_atomic(&[
            (paths.index.as_path(), blob.as_slice()),
            (paths.chunks.as_path(), list.as_slice()),
        ])
        .await?;

        self.generation = generation;
        log::info!("VectorStore saved successfully");
        Ok(())
    }

    /// Replace the in-memory state with the pair persisted in `dir`.
    ///
    /// Never fails: anything unusable on disk leaves the store empty and is reported through
    /// [`RestoreOutcome::Reset`].
    pub async fn restore(&mut self, dir: impl AsRef<Path>) -> RestoreOutcome {
        let paths = StorePaths::new(dir);
        let dimension = self.dimension();
        self.reset();

        let index_exists = tokio::fs::try_exists(&paths.index).await.unwrap_or(false);
        let chunks_exist = tokio::fs::try_exists(&paths.chunks).await.unwrap_or(false);
        match (index_exists, chunks_exist) {
            (false, false) => {
                log::info!(
                    "No existing vector store in {}; starting empty",
                    paths.dir.display()
                );
                return RestoreOutcome::Fresh;
            }
            (true, false) | (false, true) => {
                let reason = format!(
                    "only one of {} / {} exists",
                    paths.index.display(),
                    paths.chunks.display()
                );
                log::warn!("Discarding vector store: {reason}");
                return RestoreOutcome::Reset { reason };
            }
            (true, true) => {}
        }

        match Self::load_pair(&paths, dimension).await {
            Ok(loaded) => {
                let count = loaded.chunks.len();
                *self = loaded;
                log::info!(
                    "Loaded {count} vectors and chunks from {}",
                    paths.dir.display()
                );
                RestoreOutcome::Loaded { chunks: count }
            }
            Err(err) => {
                let reason = err.to_string();
                log::warn!(
                    "Discarding vector store in {}: {reason}",
                    paths.dir.display()
                );
                RestoreOutcome::Reset { reason }
            }
        }
    }

    async fn load_pair(paths: &StorePaths, dimension: usize) -> Result<Self> {
        let blob = tokio::fs::read(&paths.index).await?;
        let decoded = FlatIndex::decode(&blob)?;
        let list = PersistedChunkList::load(&paths.chunks).await?;

        if decoded.index.dimension() != dimension || list.dimension != dimension {
            return Err(VectorStoreError::corrupted(format!(
                "stored dimension {} does not match embedding dimension {dimension}",
                decoded.index.dimension()
            )));
        }
        if decoded.index.len() != list.chunks.len() {
            return Err(VectorStoreError::corrupted(format!(
                "{} vectors but {} chunks",
                decoded.index.len(),
                list.chunks.len()
            )));
        }
        if decoded.generation != list.generation {
            return Err(VectorStoreError::corrupted(format!(
                "index generation {} does not match chunk list generation {}",
                decoded.generation, list.generation
            )));
        }

        Ok(Self {
            index: decoded.index,
            chunks: list.chunks,
            generation: decoded.generation,
        })
    }

    /// Generation of the pair currently persisted in `dir`, read from the index header only.
    pub async fn disk_generation(dir: impl AsRef<Path>) -> Option<u64> {
        let paths = StorePaths::new(dir);
        let mut file = tokio::fs::File::open(&paths.index).await.ok()?;
        let mut header = vec![0u8; header_len()];
        file.read_exact(&mut header).await.ok()?;
        peek_generation(&header)
    }

    /// Reload from `dir` when another writer persisted since this store last did.
    ///
    /// An unusable pair on disk leaves the in-memory state as it was.
    pub async fn refresh_if_stale(&mut self, dir: impl AsRef<Path>) -> Option<RestoreOutcome> {
        let dir = dir.as_ref();
        let on_disk = Self::disk_generation(dir).await.unwrap_or(0);
        if on_disk == self.generation {
            return None;
        }
        log::info!(
            "Store in {} is at generation {on_disk}, memory at {}; reloading",
            dir.display(),
            self.generation
        );
        let snapshot = self.clone();
        let outcome = self.restore(dir).await;
        if let RestoreOutcome::Reset { reason } = &outcome {
            log::warn!("Reload discarded ({reason}); keeping the in-memory store");
            *self = snapshot;
        }
        Some(outcome)
    }

    /// Drop every vector and chunk; the dimension is kept.
    pub fn reset(&mut self) {
        self.index.clear();
        self.chunks.clear();
        self.generation = 0;
    }

    /// Reset and delete the persisted pair in `dir`.
    pub async fn clear(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let paths = StorePaths::new(dir);
        self.reset();
        for path in [&paths.index, &paths.chunks] {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        log::info!("Cleared vector store in {}", paths.dir.display());
        Ok(())
    }

    /// Undo appends beyond `len`, restoring an earlier state.
    pub fn truncate(&mut self, len: usize) {
        self.index.truncate(len);
        self.chunks.truncate(len);
    }

    fn check_consistency(&self) -> Result<()> {
        if self.index.len() == self.chunks.len() {
            Ok(())
        } else {
            Err(VectorStoreError::LengthMismatch {
                vectors: self.index.len(),
                chunks: self.chunks.len(),
            })
        }
    }

    /// Get total number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Number of successful persists behind the current state
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Vector stored alongside the chunk at `position`
    #[must_use]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        self.index.vector(position)
    }

    /// Distinct sources with their chunk counts
    #[must_use]
    pub fn sources(&self) -> BTreeMap<String, usize> {
        let mut sources = BTreeMap::new();
        for chunk in &self.chunks {
            *sources.entry(chunk.source.clone()).or_insert(0) += 1;
        }
        sources
    }
}
