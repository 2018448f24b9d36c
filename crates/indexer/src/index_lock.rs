use crate::{IndexerError, Result};
use fs2::FileExt;
use ragdesk_vector_store::StorePaths;
use std::path::Path;
use std::time::Instant;

/// Exclusive advisory lock on `<store_dir>/store.lock`, released on drop
pub(crate) struct StoreWriteLock {
    file: std::fs::File,
    pub(crate) wait_ms: u64,
}

impl Drop for StoreWriteLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

pub(crate) async fn acquire_store_write_lock(store_dir: &Path) -> Result<StoreWriteLock> {
    let path = StorePaths::new(store_dir).lock;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let lock = tokio::task::spawn_blocking(move || -> Result<StoreWriteLock> {
        use std::fs::OpenOptions;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| {
                IndexerError::Other(format!("open store lock {}: {err}", path.display()))
            })?;

        let start = Instant::now();
        file.lock_exclusive().map_err(|err| {
            IndexerError::Other(format!("acquire store lock {}: {err}", path.display()))
        })?;
        let wait_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(StoreWriteLock { file, wait_ms })
    })
    .await
    .map_err(|err| IndexerError::Other(format!("join store lock task: {err}")))??;

    if lock.wait_ms > 0 {
        log::debug!("Waited {}ms for store write lock", lock.wait_ms);
    }
    Ok(lock)
}
