use crate::error::{Result, VectorStoreError};
use ndarray::{ArrayView1, ArrayView2};
use sha2::{Digest, Sha256};

const MAGIC: &[u8; 4] = b"RDVX";
pub const INDEX_FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8 + 8;
const DIGEST_LEN: usize = 32;

/// Exact (brute-force) L2 index over a contiguous row-major buffer
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

/// Index blob contents as read from disk
#[derive(Debug)]
pub(crate) struct DecodedIndex {
    pub index: FlatIndex,
    pub generation: u64,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append vectors; either all are added or none.
    pub fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: bad.len(),
            });
        }
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    /// k nearest positions by squared Euclidean distance, ascending.
    ///
    /// Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let matrix = ArrayView2::from_shape((self.len(), self.dimension), &self.data)
            .map_err(|e| VectorStoreError::IndexError(format!("index shape: {e}")))?;
        let query = ArrayView1::from(query);

        let mut scored: Vec<(usize, f32)> = matrix
            .outer_iter()
            .enumerate()
            .map(|(position, row)| {
                let diff = &row - &query;
                (position, diff.dot(&diff))
            })
            .collect();

        // Stable sort: ties stay in insertion order.
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }

    /// Vector stored at `position`
    #[must_use]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Number of vectors
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Keep only the first `len` vectors
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len * self.dimension);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Serialize as: magic, format version, dimension, generation, count, f32 LE rows, SHA-256.
    pub(crate) fn encode(&self, generation: u64) -> Result<Vec<u8>> {
        let dimension = u32::try_from(self.dimension).map_err(|_| {
            VectorStoreError::IndexError(format!("dimension {} too large", self.dimension))
        })?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4 + DIGEST_LEN);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&INDEX_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&dimension.to_le_bytes());
        bytes.extend_from_slice(&generation.to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        let digest = Sha256::digest(&bytes);
        bytes.extend_from_slice(&digest);
        Ok(bytes)
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<DecodedIndex> {
        if bytes.len() < HEADER_LEN + DIGEST_LEN {
            return Err(VectorStoreError::corrupted(format!(
                "index blob truncated ({} bytes)",
                bytes.len()
            )));
        }
        let (body, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
        if Sha256::digest(body).as_slice() != digest {
            return Err(VectorStoreError::corrupted("index blob checksum mismatch"));
        }
        if &body[0..4] != MAGIC {
            return Err(VectorStoreError::corrupted("index blob has wrong magic"));
        }

        let version = read_u32(body, 4);
        if version != INDEX_FORMAT_VERSION {
            return Err(VectorStoreError::corrupted(format!(
                "unsupported index format version {version} (expected {INDEX_FORMAT_VERSION})"
            )));
        }
        let dimension = read_u32(body, 8) as usize;
        let generation = read_u64(body, 12);
        let count = read_u64(body, 20) as usize;

        let payload = &body[HEADER_LEN..];
        let expected_len = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| VectorStoreError::corrupted("index blob header overflows"))?;
        if payload.len() != expected_len {
            return Err(VectorStoreError::corrupted(format!(
                "index blob holds {} payload bytes, header promises {expected_len}",
                payload.len()
            )));
        }

        let data = payload
            .chunks_exact(4)
            .map(|raw| f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            .collect();
        Ok(DecodedIndex {
            index: Self { dimension, data },
            generation,
        })
    }
}

/// Generation recorded in an index blob header, without verifying the rest of the blob.
pub(crate) fn peek_generation(header: &[u8]) -> Option<u64> {
    if header.len() < HEADER_LEN || &header[0..4] != MAGIC {
        return None;
    }
    Some(read_u64(header, 12))
}

pub(crate) const fn header_len() -> usize {
    HEADER_LEN
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}
