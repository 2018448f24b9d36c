use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Window size and overlap, both in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum characters per chunk
    pub size: usize,

    /// Characters shared by consecutive chunks
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkerConfig {
    #[must_use]
    pub const fn new(size: usize, overlap: usize) -> Self {
        Self { size, overlap }
    }

    /// Validate configuration
    ///
    /// `overlap >= size` is accepted: the chunker then emits back-to-back windows.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(ChunkerError::invalid_config("chunk size must be > 0"));
        }
        if self.overlap >= self.size {
            log::warn!(
                "chunk overlap ({}) >= chunk size ({}); windows will not overlap",
                self.overlap,
                self.size
            );
        }
        Ok(())
    }

    /// Distance between consecutive window starts.
    #[must_use]
    pub const fn stride(&self) -> usize {
        if self.overlap >= self.size {
            self.size
        } else {
            self.size - self.overlap
        }
    }
}
