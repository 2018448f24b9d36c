//! # ragdesk Vector Store
//!
//! Exact nearest-neighbor storage for document chunks.
//!
//! ## Features
//!
//! - **Exact flat search** by squared Euclidean distance (O(n·d) per query)
//! - **Positional pairing** of vectors and chunks, checked on every mutation
//! - **Paired persistence**: a checksummed binary index blob plus a versioned JSON chunk list,
//!   always written and restored together
//! - **Self-healing restore**: missing, mismatched or corrupt artifacts yield an empty store
//! - **Pluggable embeddings** through the [`Embedder`] trait
//!
//! ## Architecture
//!
//! ```text
//! Chunk[]
//!     │
//!     ├──> Embedder (hash | OpenAI-compatible)
//!     │      └─> Vec<f32>[dimension]
//!     │
//!     ├──> FlatIndex
//!     │      └─> exact L2 search
//!     │
//!     └──> Persistent Storage
//!            ├─> index.bin   (RDVX header + f32 rows + SHA-256)
//!            └─> chunks.json (schema_version, generation, [{text, source}])
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ragdesk_vector_store::{Chunk, Embedder, HashEmbedder, VectorStore};
//!
//! #[tokio::main]
//! async fn main() -> ragdesk_vector_store::Result<()> {
//!     let embedder = HashEmbedder::new(384);
//!     let (mut store, _outcome) = VectorStore::open("data/vector_store", embedder.dimension()).await;
//!
//!     let chunks = vec![Chunk::new("Rust has no garbage collector.", "rust.txt")];
//!     let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
//!     let vectors = embedder.embed_batch(&texts).await?;
//!     store.add(vectors, chunks)?;
//!     store.persist("data/vector_store").await?;
//!
//!     let query = embedder.embed("memory management").await?;
//!     for hit in store.search(&query, 5)? {
//!         println!("{}: {:.3}", hit.chunk.source, hit.distance);
//!     }
//!     Ok(())
//! }
//! ```

mod chunk_list;
mod embeddings;
mod error;
mod flat_index;
mod paths;
mod store;
mod types;

pub use chunk_list::CHUNK_LIST_SCHEMA_VERSION;
pub use embeddings::{
    build_embedder, Embedder, EmbeddingConfig, EmbeddingMode, HashEmbedder, OpenAiEmbedder,
    DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
};
pub use error::{Result, VectorStoreError};
pub use flat_index::{FlatIndex, INDEX_FORMAT_VERSION};
pub use paths::{
    StorePaths, CHUNKS_FILE_NAME, DEFAULT_STORE_DIR, DEFAULT_UPLOADS_DIR, INDEX_FILE_NAME,
    LOCK_FILE_NAME,
};
pub use store::{SharedStore, VectorStore};
pub use types::{RestoreOutcome, SearchHit};

// Re-export chunk types for convenience
pub use ragdesk_chunker::Chunk;
