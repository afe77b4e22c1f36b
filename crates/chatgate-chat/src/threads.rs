//! Per-sender conversation thread ids.
//!
//! Backed by a single JSON object on disk (`{"<actor>": "<thread id>"}`),
//! rewritten in full after every change. The in-memory map is authoritative:
//! a failed write is logged and the change stands. A store opened without a
//! path keeps everything in memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chatgate_core::error::{ChatgateError, Result};
use chatgate_core::types::ActorId;

pub struct ThreadStore {
    path: Option<PathBuf>,
    threads: Mutex<BTreeMap<ActorId, String>>,
}

impl ThreadStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            threads: Mutex::new(BTreeMap::new()),
        }
    }

    /// Open the snapshot at `path`.
    ///
    /// A missing file starts an empty store; an unreadable or malformed one
    /// is logged and also starts empty, and is overwritten on the next change.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let threads = if path.exists() {
            match Self::read_snapshot(&path) {
                Ok(threads) => {
                    tracing::info!(path = %path.display(), count = threads.len(), "Loaded conversation threads");
                    threads
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to load threads, starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            tracing::info!(path = %path.display(), "Thread snapshot not found, will be created on first write");
            BTreeMap::new()
        };

        Self {
            path: Some(path),
            threads: Mutex::new(threads),
        }
    }

    fn read_snapshot(path: &Path) -> Result<BTreeMap<ActorId, String>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn get(&self, actor: &ActorId) -> Result<Option<String>> {
        Ok(self.lock()?.get(actor).cloned())
    }

    /// Return the sender's thread id, allocating and persisting a new one
    /// on first use.
    pub fn get_or_create(&self, actor: &ActorId) -> Result<String> {
        let mut threads = self.lock()?;
        if let Some(id) = threads.get(actor) {
            return Ok(id.clone());
        }

        let id = format!("thread_{}", uuid::Uuid::new_v4().simple());
        threads.insert(actor.clone(), id.clone());
        tracing::info!(actor = %actor, thread_id = %id, "Created conversation thread");
        self.persist(&threads);
        Ok(id)
    }

    pub fn set(&self, actor: &ActorId, thread_id: impl Into<String>) -> Result<()> {
        let mut threads = self.lock()?;
        threads.insert(actor.clone(), thread_id.into());
        self.persist(&threads);
        Ok(())
    }

    /// Remove the sender's thread. Returns whether one existed.
    pub fn delete(&self, actor: &ActorId) -> Result<bool> {
        let mut threads = self.lock()?;
        if threads.remove(actor).is_none() {
            return Ok(false);
        }
        self.persist(&threads);
        Ok(true)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self, threads: &BTreeMap<ActorId, String>) {
        let Some(path) = &self.path else {
            return;
        };
        match Self::write_snapshot(path, threads) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), count = threads.len(), "Saved conversation threads")
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to save conversation threads")
            }
        }
    }

    fn write_snapshot(path: &Path, threads: &BTreeMap<ActorId, String>) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(threads)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<ActorId, String>>> {
        self.threads
            .lock()
            .map_err(|e| ChatgateError::LockPoisoned(format!("thread store: {e}")))
    }
}
