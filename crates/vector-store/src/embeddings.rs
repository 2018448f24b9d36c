use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Text → fixed-length vector capability
///
/// The dimension must stay constant for the lifetime of the embedder.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, used in logs and `status`.
    fn model_id(&self) -> &str;

    /// Length of every returned vector.
    fn dimension(&self) -> usize;

    /// Embed a batch; the output has one vector per input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text]).await?;
        embeddings
            .pop()
            .ok_or_else(|| VectorStoreError::embedding("Empty embedding result"))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    /// Local feature hashing, no model download
    Hash,
    /// OpenAI-compatible `/embeddings` endpoint
    OpenAi,
}

impl EmbeddingMode {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "openai" => Ok(Self::OpenAi),
            other => Err(VectorStoreError::embedding(format!(
                "Unsupported embedding mode '{other}' (expected 'hash' or 'openai')"
            ))),
        }
    }

    /// Mode from `RAGDESK_EMBEDDING_MODE`, if set.
    pub fn from_env() -> Result<Option<Self>> {
        match env::var("RAGDESK_EMBEDDING_MODE") {
            Ok(raw) => Self::parse(&raw).map(Some),
            Err(_) => Ok(None),
        }
    }
}

impl Display for EmbeddingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Hash => "hash",
            Self::OpenAi => "openai",
        })
    }
}

/// `[embedding]` configuration section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub mode: EmbeddingMode,
    pub model: String,
    pub dimension: usize,
    pub base_url: String,
    /// Read from `OPENAI_API_KEY` when absent
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request HTTP timeout
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            mode: EmbeddingMode::Hash,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 300,
        }
    }
}

/// Build the embedder selected by `config`.
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    if config.dimension == 0 {
        return Err(VectorStoreError::embedding("embedding dimension must be > 0"));
    }
    let embedder: Arc<dyn Embedder> = match config.mode {
        EmbeddingMode::Hash => Arc::new(HashEmbedder::new(config.dimension)),
        EmbeddingMode::OpenAi => Arc::new(OpenAiEmbedder::new(config)?),
    };
    log::info!(
        "Embedding backend: {} (model {}, dimension {})",
        config.mode,
        embedder.model_id(),
        embedder.dimension()
    );
    Ok(embedder)
}

/// Deterministic bag-of-words embedder
///
/// Lowercased alphanumeric tokens are hashed into `dimension` signed buckets and the result is
/// L2-normalized, so texts sharing vocabulary land close together.
#[derive(Clone, Debug)]
pub struct HashEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: format!("hash-{dimension}"),
        }
    }

    #[must_use]
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        hash_embed(text, self.dimension)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_sync(text)).collect())
    }
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dimension];
    if dimension == 0 {
        return vec;
    }
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
    {
        let mut state = fnv1a_64(token.to_lowercase().as_bytes());
        let bits = splitmix64(&mut state);
        let bucket = (bits % dimension as u64) as usize;
        let sign = if bits >> 63 == 0 { 1.0 } else { -1.0 };
        vec[bucket] += sign;
    }
    normalize(&mut vec);
    vec
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Client for an OpenAI-compatible embeddings endpoint
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| VectorStoreError::embedding(format!("HTTP client: {e}")))?;
        let api_key = config
            .api_key
            .clone()
            .or_else(|| env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            log::warn!("OpenAI API key not found; embedding requests will likely fail");
        }
        Ok(Self {
            client,
            url: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        log::debug!("Requesting {} embeddings from {}", texts.len(), self.url);

        let mut request = self.client.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| VectorStoreError::embedding(format!("embedding request failed: {e}")))?;
        let mut body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::embedding(format!("embedding response: {e}")))?;

        if body.data.len() != texts.len() {
            return Err(VectorStoreError::embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }
        body.data.sort_by_key(|datum| datum.index);
        body.data
            .into_iter()
            .map(|datum| {
                if datum.embedding.len() == self.dimension {
                    Ok(datum.embedding)
                } else {
                    Err(VectorStoreError::InvalidDimension {
                        expected: self.dimension,
                        actual: datum.embedding.len(),
                    })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[tokio::test]
    async fn hash_embedder_is_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("Rust ownership rules").await.unwrap();
        let b = embedder.embed("rust OWNERSHIP rules").await.unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn shared_vocabulary_is_closer() {
        let embedder = HashEmbedder::new(256);
        let query = embedder.embed("brown fox jumps").await.unwrap();
        let near = embedder
            .embed("the quick brown fox jumps over the dog")
            .await
            .unwrap();
        let far = embedder
            .embed("interest rates and bond markets")
            .await
            .unwrap();
        assert!(distance(&query, &near) < distance(&query, &far));
    }

    #[tokio::test]
    async fn text_without_tokens_embeds_to_zero() {
        let embedder = HashEmbedder::new(8);
        let batch = embedder.embed_batch(&["", "  ..."]).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().flatten().all(|v| *v == 0.0));
    }

    #[test]
    fn parses_modes() {
        assert_eq!(EmbeddingMode::parse("HASH").unwrap(), EmbeddingMode::Hash);
        assert_eq!(EmbeddingMode::parse("openai").unwrap(), EmbeddingMode::OpenAi);
        assert!(EmbeddingMode::parse("onnx").is_err());
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let config = EmbeddingConfig {
            dimension: 0,
            ..EmbeddingConfig::default()
        };
        assert!(build_embedder(&config).is_err());
    }
}
