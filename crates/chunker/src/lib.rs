//! # ragdesk Chunker
//!
//! Fixed-size, overlapping character windows over extracted document text.
//!
//! ## Windowing
//!
//! ```text
//! text:   |-------------------- 1200 chars --------------------|
//! chunk0: [0 ............ 500)
//! chunk1:           [450 ............ 950)
//! chunk2:                     [900 ........ 1200)
//!                    └ overlap ┘
//! ```
//!
//! Positions count Unicode scalar values, so a window never splits a code point. The splitter
//! does not look for sentence or paragraph boundaries.
//!
//! ## Example
//!
//! ```rust
//! use ragdesk_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::default());
//! let text = "a".repeat(1200);
//! let chunks = chunker.chunk_document(&text, "notes.txt");
//!
//! assert_eq!(chunks.len(), 3);
//! assert_eq!(chunks[0].source, "notes.txt");
//! ```

mod chunker;
mod config;
mod error;
mod types;

pub use chunker::{chunk_text, Chunker};
pub use config::{ChunkerConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use error::{ChunkerError, Result};
pub use types::Chunk;
