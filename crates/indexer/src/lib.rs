//! # ragdesk Indexer
//!
//! Document ingestion for the question-answering store.
//!
//! ## Pipeline
//!
//! ```text
//! Document (txt | pdf)
//!     │
//!     ├──> Extractor
//!     │      └─> Flat text
//!     │
//!     ├──> Chunker (500 chars, 50 overlap)
//!     │      └─> Chunk { text, source }
//!     │
//!     ├──> Embedder (batch, with timeout)
//!     │
//!     └──> VectorStore.add + persist   (single writer, file-locked)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ragdesk_indexer::{DocumentIndexer, IndexerOptions};
//! use ragdesk_vector_store::HashEmbedder;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> ragdesk_indexer::Result<()> {
//!     let embedder = Arc::new(HashEmbedder::new(384));
//!     let (indexer, _) =
//!         DocumentIndexer::open("data/vector_store", embedder, IndexerOptions::default()).await?;
//!     let outcome = indexer.ingest_path(std::path::Path::new("handbook.pdf")).await;
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```

mod error;
mod index_lock;
mod indexer;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::{DocumentIndexer, IndexerOptions, DEFAULT_INGEST_EMBED_TIMEOUT};
pub use stats::{IngestOutcome, IngestReport, IngestStats};
