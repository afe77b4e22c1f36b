//! The duplicate filter: per-actor windowed history, a shared fingerprint
//! index, and the admit/suppress decision.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use chatgate_core::config::{ExactMatchScope, FilterConfig};
use chatgate_core::types::{
    ActorId, ContentHash, FilterStats, HistoryEntry, SweepReport, Verdict,
};

use crate::clock::{Clock, SystemClock};
use crate::history::{ActorHistory, Retained};
use crate::index::HashIndex;
use crate::text::{fingerprint, normalize, similarity_normalized};

/// Characters of message text included in log lines.
const LOG_PREVIEW_CHARS: usize = 50;

/// Decides whether an inbound message repeats something recently seen.
///
/// Single-owner: every operation takes `&mut self` or `&self` and never
/// blocks. Wrap it in a [`crate::SharedFilter`] to use it from several tasks.
///
/// Eviction is lazy. An actor's expired entries are dropped at the start of
/// that actor's next [`check`](Self::check), or by [`sweep`](Self::sweep).
pub struct DuplicateFilter {
    config: FilterConfig,
    window: TimeDelta,
    clock: Arc<dyn Clock>,
    histories: HashMap<ActorId, ActorHistory>,
    index: HashIndex,
    total_processed: u64,
    total_blocked: u64,
}

impl DuplicateFilter {
    /// Create a filter driven by wall-clock time.
    pub fn new(config: FilterConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: FilterConfig, clock: Arc<dyn Clock>) -> Self {
        let window = window_delta(config.time_window_seconds);
        info!(
            time_window_seconds = config.time_window_seconds,
            max_history_per_actor = config.max_history_per_actor,
            similarity_threshold = config.similarity_threshold,
            exact_match_scope = ?config.exact_match_scope,
            "Duplicate filter initialized"
        );
        Self {
            config,
            window,
            clock,
            histories: HashMap::new(),
            index: HashIndex::default(),
            total_processed: 0,
            total_blocked: 0,
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Returns `true` if the message should be suppressed.
    pub fn is_duplicate(&mut self, actor: impl Into<ActorId>, text: &str) -> bool {
        self.check(actor, text).is_duplicate()
    }

    /// Classify one inbound message and record it if admitted.
    ///
    /// Order of work: count it, evict the sender's expired entries, normalize,
    /// let empty text through unrecorded, look up the fingerprint, compare word
    /// overlap against the sender's history, and finally record it.
    pub fn check(&mut self, actor: impl Into<ActorId>, text: &str) -> Verdict {
        let actor = actor.into();
        self.total_processed += 1;
        let now = self.clock.now();

        self.evict_expired(&actor, now);

        let normalized = normalize(text);
        if normalized.is_empty() {
            debug!(actor = %actor, "Empty message, allowing");
            return Verdict::Empty;
        }

        let hash = fingerprint(&normalized);
        if self.seen_exact(&actor, hash) {
            self.total_blocked += 1;
            info!(
                actor = %actor,
                text = %preview(text),
                "Exact duplicate suppressed"
            );
            return Verdict::ExactDuplicate;
        }

        if let Some(similarity) = self.first_similar(&actor, &normalized) {
            self.total_blocked += 1;
            info!(
                actor = %actor,
                similarity,
                text = %preview(text),
                "Similar message suppressed"
            );
            return Verdict::NearDuplicate { similarity };
        }

        self.admit(actor, now, hash, text, normalized);
        Verdict::Admitted
    }

    /// Read-only snapshot of the counters and cache sizes.
    pub fn stats(&self) -> FilterStats {
        FilterStats {
            total_processed: self.total_processed,
            total_blocked: self.total_blocked,
            active_actors: self.histories.values().filter(|h| !h.is_empty()).count(),
            cached_messages: self.histories.values().map(ActorHistory::len).sum(),
        }
    }

    /// Forget everything retained for one actor. Counters are untouched.
    pub fn clear_actor_cache(&mut self, actor: impl Into<ActorId>) {
        let actor = actor.into();
        let Some(history) = self.histories.get_mut(&actor) else {
            return;
        };
        let mut removed = 0usize;
        for record in history.drain() {
            self.index.release(record.entry.content_hash);
            removed += 1;
        }
        info!(actor = %actor, removed, "Cleared actor cache");
    }

    /// Reset histories, the fingerprint index, and both counters.
    pub fn clear_all(&mut self) {
        self.histories.clear();
        self.index.clear();
        self.total_processed = 0;
        self.total_blocked = 0;
        info!("Cleared all duplicate filter state");
    }

    /// Up to the last `limit` retained entries for an actor, oldest first.
    pub fn recent(&self, actor: impl Into<ActorId>, limit: usize) -> Vec<HistoryEntry> {
        self.histories
            .get(&actor.into())
            .map(|h| h.recent(limit))
            .unwrap_or_default()
    }

    /// Evict expired entries for every actor and drop actors left with none.
    ///
    /// Actors that stop writing otherwise keep their history until their
    /// next message.
    pub fn sweep(&mut self) -> SweepReport {
        let cutoff = self.cutoff(self.clock.now());
        let mut report = SweepReport::default();

        for history in self.histories.values_mut() {
            for record in history.evict_before(cutoff) {
                self.index.release(record.entry.content_hash);
                report.entries_removed += 1;
            }
        }

        let before = self.histories.len();
        self.histories.retain(|_, h| !h.is_empty());
        report.actors_removed = before - self.histories.len();

        debug!(
            actors_removed = report.actors_removed,
            entries_removed = report.entries_removed,
            "Sweep complete"
        );
        report
    }

    /// Number of distinct fingerprints currently held by any actor.
    pub fn indexed_fingerprints(&self) -> usize {
        self.index.len()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn evict_expired(&mut self, actor: &ActorId, now: DateTime<Utc>) {
        let cutoff = self.cutoff(now);
        let Some(history) = self.histories.get_mut(actor) else {
            return;
        };
        for record in history.evict_before(cutoff) {
            self.index.release(record.entry.content_hash);
            debug!(
                actor = %actor,
                text = %preview(&record.entry.raw_text),
                "Evicted expired message"
            );
        }
    }

    fn seen_exact(&self, actor: &ActorId, hash: ContentHash) -> bool {
        match self.config.exact_match_scope {
            ExactMatchScope::Global => self.index.contains(hash),
            ExactMatchScope::PerActor => self
                .histories
                .get(actor)
                .is_some_and(|h| h.contains_hash(hash)),
        }
    }

    fn first_similar(&self, actor: &ActorId, normalized: &str) -> Option<f64> {
        let history = self.histories.get(actor)?;
        history
            .iter()
            .map(|r| similarity_normalized(normalized, &r.normalized))
            .find(|score| *score >= self.config.similarity_threshold)
    }

    fn admit(
        &mut self,
        actor: ActorId,
        now: DateTime<Utc>,
        hash: ContentHash,
        text: &str,
        normalized: String,
    ) {
        debug!(actor = %actor, text = %preview(text), "New message recorded");
        let record = Retained {
            entry: HistoryEntry {
                timestamp: now,
                content_hash: hash,
                raw_text: text.to_string(),
            },
            normalized,
        };
        self.index.insert(hash);
        let history = self.histories.entry(actor).or_default();
        for evicted in history.push_bounded(record, self.config.max_history_per_actor) {
            self.index.release(evicted.entry.content_hash);
        }
    }
}

/// Convert a window in (possibly fractional) seconds to a `TimeDelta`,
/// saturating for values chrono cannot represent.
fn window_delta(seconds: f64) -> TimeDelta {
    let millis = (seconds * 1000.0).round();
    if millis.is_nan() || millis <= 0.0 {
        return TimeDelta::zero();
    }
    TimeDelta::try_milliseconds(millis as i64).unwrap_or(TimeDelta::MAX)
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}
