use crate::error::{Result, VectorStoreError};
use ragdesk_chunker::Chunk;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CHUNK_LIST_SCHEMA_VERSION: u32 = 1;

/// On-disk chunk metadata, the partner artifact of the index blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PersistedChunkList {
    pub schema_version: u32,
    pub dimension: usize,
    pub generation: u64,
    pub chunks: Vec<Chunk>,
}

impl PersistedChunkList {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let persisted: Self = serde_json::from_slice(&bytes)
            .map_err(|e| VectorStoreError::corrupted(format!("chunk list is not valid: {e}")))?;
        if persisted.schema_version != CHUNK_LIST_SCHEMA_VERSION {
            return Err(VectorStoreError::corrupted(format!(
                "Unsupported chunk list schema_version {} (expected {CHUNK_LIST_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }
        Ok(persisted)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
