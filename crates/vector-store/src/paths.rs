use std::path::{Path, PathBuf};

pub const DEFAULT_STORE_DIR: &str = "data/vector_store";
pub const DEFAULT_UPLOADS_DIR: &str = "data/uploads";

pub const INDEX_FILE_NAME: &str = "index.bin";
pub const CHUNKS_FILE_NAME: &str = "chunks.json";
pub const LOCK_FILE_NAME: &str = "store.lock";

/// Locations of the persisted artifact pair inside a store directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub dir: PathBuf,
    pub index: PathBuf,
    pub chunks: PathBuf,
    pub lock: PathBuf,
}

impl StorePaths {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            index: dir.join(INDEX_FILE_NAME),
            chunks: dir.join(CHUNKS_FILE_NAME),
            lock: dir.join(LOCK_FILE_NAME),
            dir,
        }
    }
}

/// Temporary sibling used for write-then-rename.
#[must_use]
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `bytes` next to `path` without touching `path` itself.
async fn stage(path: &Path, bytes: &[u8]) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = tmp_path_for(path);
    tokio::fs::write(&tmp, bytes).await?;
    Ok(tmp)
}

/// Replace a group of files together: every temporary sibling is written before any rename.
///
/// A failed write leaves all targets as they were and removes the siblings already staged.
pub(crate) async fn write_all_atomic(files: &[(&Path, &[u8])]) -> std::io::Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, bytes) in files {
        match stage(path, bytes).await {
            Ok(tmp) => staged.push((tmp, *path)),
            Err(err) => {
                for (tmp, _) in &staged {
                    if let Err(cleanup) = tokio::fs::remove_file(tmp).await {
                        log::debug!("Could not remove {}: {cleanup}", tmp.display());
                    }
                }
                return Err(err);
            }
        }
    }
    for (tmp, path) in staged {
        tokio::fs::rename(&tmp, path).await?;
    }
    Ok(())
}
