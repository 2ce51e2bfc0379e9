use std::{
    future::Future,
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs,
    io::AsyncWriteExt,
    sync::{Mutex, OwnedMutexGuard},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::observability::{
    STORE_SEEDS_TOTAL, STORE_WRITES_TOTAL, STORE_WRITE_DURATION, STORE_WRITE_FAILURES_TOTAL,
};

/// Crash-safe single-document JSON file store.
///
/// Every replacement is written to a temporary file next to the target,
/// fsynced, then renamed over it, so readers only ever see a complete
/// version. Writers queue on one in-process slot: `tokio::sync::Mutex` hands
/// it out in request order, so the last write issued is the last one on disk.
/// The slot holder runs in its own task, which means a caller that stops
/// waiting cannot abort a replacement halfway.
///
/// Reads do not queue. The queue is per process; two processes sharing one
/// file are not coordinated.
pub struct JsonDocumentStore<T> {
    file_path: PathBuf,
    write_slot: Arc<Mutex<()>>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonDocumentStore<T>
where
    T: Serialize + DeserializeOwned + Default + Send,
{
    /// Create a store for `path`. No I/O happens until the first read or write.
    pub fn new<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        Arc::new(Self {
            file_path: path.into(),
            write_slot: Arc::new(Mutex::new(())),
            _doc: PhantomData,
        })
    }

    /// Load the document, seeding and persisting `T::default()` when no file exists.
    ///
    /// A file that exists but does not parse is reported as `CorruptStore` and
    /// never overwritten.
    pub async fn read(&self) -> Result<T, ServiceError> {
        match self.load().await? {
            Some(doc) => Ok(doc),
            None => self.seed().await,
        }
    }

    /// Replace the whole document.
    ///
    /// Serialization happens before queueing, so an unserializable value fails
    /// with `Serialization` without touching the disk. A failed replacement is
    /// reported to this caller only; the next queued writer proceeds normally.
    pub async fn write(&self, doc: &T) -> Result<(), ServiceError> {
        let bytes = encode(doc)?;
        let slot = self.write_slot.clone().lock_owned().await;
        self.commit(slot, bytes).await
    }

    /// Read, mutate and write back while holding the write slot for the whole span,
    /// so concurrent updates cannot lose each other's changes.
    ///
    /// If `mutate` fails nothing is written. An absent file is treated as the
    /// default document.
    pub async fn update<F, R>(&self, mutate: F) -> Result<(T, R), ServiceError>
    where
        F: FnOnce(&mut T) -> Result<R, ServiceError>,
    {
        let slot = self.write_slot.clone().lock_owned().await;
        let mut doc = match self.load().await? {
            Some(doc) => doc,
            None => {
                self.ensure_parent_dir().await?;
                T::default()
            }
        };
        let out = mutate(&mut doc)?;
        let bytes = encode(&doc)?;
        self.commit(slot, bytes).await?;
        Ok((doc, out))
    }

    /// Run `task` on the current document while holding the write slot; no other
    /// write lands until it finishes. Nothing is written back, and an absent file
    /// is seen as the default document.
    pub async fn inspect<F, Fut, R>(&self, task: F) -> Result<R, ServiceError>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R, ServiceError>>,
    {
        let _slot = self.write_slot.clone().lock_owned().await;
        let doc = self.load().await?.unwrap_or_default();
        task(doc).await
    }

    async fn load(&self) -> Result<Option<T>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                error!(path = %self.file_path.display(), error = %e, event = "store_corrupt", "document file does not parse");
                ServiceError::CorruptStore {
                    path: self.file_path.display().to_string(),
                    reason: e.to_string(),
                }
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::Io(format!("read {}: {e}", self.file_path.display()))),
        }
    }

    async fn seed(&self) -> Result<T, ServiceError> {
        let slot = self.write_slot.clone().lock_owned().await;
        // another reader may have seeded while we waited for the slot
        if let Some(doc) = self.load().await? {
            return Ok(doc);
        }
        self.ensure_parent_dir().await?;
        let doc = T::default();
        self.commit(slot, encode(&doc)?).await?;
        STORE_SEEDS_TOTAL.inc();
        info!(path = %self.file_path.display(), event = "store_seeded", "created default document");
        Ok(doc)
    }

    async fn ensure_parent_dir(&self) -> Result<(), ServiceError> {
        match self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => fs::create_dir_all(dir)
                .await
                .map_err(|e| ServiceError::Io(format!("create {}: {e}", dir.display()))),
            None => Ok(()),
        }
    }

    /// Run the replacement in a detached task that owns the slot until the rename is done.
    async fn commit(&self, slot: OwnedMutexGuard<()>, bytes: Vec<u8>) -> Result<(), ServiceError> {
        let path = self.file_path.clone();
        let task = tokio::spawn(async move {
            let _slot = slot;
            let started = Instant::now();
            let result = replace_atomically(&path, &bytes).await;
            STORE_WRITE_DURATION.observe(started.elapsed().as_secs_f64());
            match &result {
                Ok(()) => {
                    STORE_WRITES_TOTAL.inc();
                    debug!(path = %path.display(), bytes = bytes.len(), event = "store_write", "document replaced");
                }
                Err(e) => {
                    STORE_WRITE_FAILURES_TOTAL.inc();
                    warn!(path = %path.display(), error = %e, event = "store_write_failed", "document replacement failed");
                }
            }
            result
        });
        task.await
            .map_err(|e| ServiceError::Io(format!("write task for {} failed: {e}", self.file_path.display())))?
    }
}

fn encode<T: Serialize>(doc: &T) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec_pretty(doc).map_err(|e| ServiceError::Serialization(e.to_string()))
}

/// Sibling temp path, unique per write so a leftover from a crash is never reused.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

/// Write `bytes` to a fresh temp file beside `path` and fsync it. Returns the temp path.
pub(crate) async fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf, ServiceError> {
    let tmp = temp_path_for(path);
    let written = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp).await;
        return Err(ServiceError::Io(format!("write {}: {e}", tmp.display())));
    }
    Ok(tmp)
}

async fn replace_atomically(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    let tmp = stage(path, bytes).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ServiceError::Io(format!("rename {} -> {}: {e}", tmp.display(), path.display())));
    }
    // fsync the directory so the rename itself is durable; not possible on every platform
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(d) = fs::File::open(dir).await {
            let _ = d.sync_all().await;
        }
    }
    Ok(())
}
