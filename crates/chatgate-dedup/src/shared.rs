//! Cloneable, lock-guarded handle to one [`DuplicateFilter`].
//!
//! The fingerprint index is shared by every actor, so a single mutex around
//! the whole filter makes each operation atomic with respect to all others.

use std::sync::{Arc, Mutex, MutexGuard};

use chatgate_core::config::FilterConfig;
use chatgate_core::error::{ChatgateError, Result};
use chatgate_core::types::{ActorId, FilterStats, HistoryEntry, SweepReport, Verdict};

use crate::clock::Clock;
use crate::filter::DuplicateFilter;

#[derive(Clone)]
pub struct SharedFilter {
    inner: Arc<Mutex<DuplicateFilter>>,
}

impl SharedFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self::from_filter(DuplicateFilter::new(config))
    }

    pub fn with_clock(config: FilterConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_filter(DuplicateFilter::with_clock(config, clock))
    }

    pub fn from_filter(filter: DuplicateFilter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(filter)),
        }
    }

    pub fn check(&self, actor: impl Into<ActorId>, text: &str) -> Result<Verdict> {
        Ok(self.lock()?.check(actor, text))
    }

    pub fn is_duplicate(&self, actor: impl Into<ActorId>, text: &str) -> Result<bool> {
        Ok(self.lock()?.is_duplicate(actor, text))
    }

    pub fn stats(&self) -> Result<FilterStats> {
        Ok(self.lock()?.stats())
    }

    pub fn clear_actor_cache(&self, actor: impl Into<ActorId>) -> Result<()> {
        self.lock()?.clear_actor_cache(actor);
        Ok(())
    }

    pub fn clear_all(&self) -> Result<()> {
        self.lock()?.clear_all();
        Ok(())
    }

    pub fn recent(&self, actor: impl Into<ActorId>, limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(self.lock()?.recent(actor, limit))
    }

    pub fn sweep(&self) -> Result<SweepReport> {
        Ok(self.lock()?.sweep())
    }

    pub fn config(&self) -> Result<FilterConfig> {
        Ok(self.lock()?.config().clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, DuplicateFilter>> {
        self.inner
            .lock()
            .map_err(|e| ChatgateError::LockPoisoned(format!("duplicate filter: {e}")))
    }
}
