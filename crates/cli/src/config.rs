use anyhow::{bail, Context, Result};
use ragdesk_chunker::ChunkerConfig;
use ragdesk_indexer::DEFAULT_INGEST_EMBED_TIMEOUT;
use ragdesk_search::{CompletionConfig, DEFAULT_QUERY_EMBED_TIMEOUT, DEFAULT_TOP_K};
use ragdesk_vector_store::{EmbeddingConfig, EmbeddingMode, DEFAULT_STORE_DIR, DEFAULT_UPLOADS_DIR};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "ragdesk.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub dir: PathBuf,
    /// Ingested files are copied here first
    pub uploads_dir: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORE_DIR),
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSection {
    pub top_k: usize,
    pub embed_timeout_secs: u64,
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            embed_timeout_secs: DEFAULT_QUERY_EMBED_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingSection {
    /// Upper bound for embedding one document's chunks
    pub embed_timeout_secs: u64,
}

impl Default for IndexingSection {
    fn default() -> Self {
        Self {
            embed_timeout_secs: DEFAULT_INGEST_EMBED_TIMEOUT.as_secs(),
        }
    }
}

/// Everything `ragdesk` reads from `ragdesk.toml`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub store: StoreSection,
    pub chunking: ChunkerConfig,
    pub indexing: IndexingSection,
    pub retrieval: RetrievalSection,
    pub embedding: EmbeddingConfig,
    pub completion: CompletionConfig,
}

impl RagConfig {
    /// Load from `path`, or from the first default location that exists.
    ///
    /// An explicit path must exist; with no file at all the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };
        let Some(path) = path else {
            log::debug!("No config file found; using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| env::var(key).ok())
    }

    /// Apply `RAGDESK_*` and `OPENAI_*` overrides read through `lookup`.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(dir) = get("RAGDESK_STORE_DIR") {
            self.store.dir = PathBuf::from(dir);
        }
        if let Some(mode) = get("RAGDESK_EMBEDDING_MODE") {
            self.embedding.mode = EmbeddingMode::parse(&mode)?;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.embedding.api_key = Some(key.clone());
            self.completion.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.embedding.base_url = url.clone();
            self.completion.base_url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.embedding.dimension == 0 {
            bail!("embedding.dimension must be > 0");
        }
        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be > 0");
        }
        for (name, secs) in [
            ("indexing.embed_timeout_secs", self.indexing.embed_timeout_secs),
            ("retrieval.embed_timeout_secs", self.retrieval.embed_timeout_secs),
            ("embedding.timeout_secs", self.embedding.timeout_secs),
            ("completion.timeout_secs", self.completion.timeout_secs),
        ] {
            if secs == 0 {
                bail!("{name} must be > 0");
            }
        }
        if self.completion.resolved_api_key().is_none() {
            log::warn!("OPENAI_API_KEY is not set; answering questions will fail");
        }
        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("ragdesk").join("config.toml"))
        .filter(|path| path.is_file())
}
