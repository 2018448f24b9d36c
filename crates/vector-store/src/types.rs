use ragdesk_chunker::Chunk;
use serde::Serialize;

/// One nearest-neighbor result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    /// Squared Euclidean distance to the query vector
    pub distance: f32,
    /// Insertion position inside the store
    pub position: usize,
}

/// What `restore` found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// No artifacts; started empty
    Fresh,
    /// Both artifacts loaded
    Loaded { chunks: usize },
    /// Artifacts were unusable and discarded
    Reset { reason: String },
}

impl RestoreOutcome {
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        matches!(self, Self::Reset { .. })
    }
}
