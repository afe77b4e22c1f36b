//! Bounded, oldest-first message history for a single actor.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use chatgate_core::types::{ContentHash, HistoryEntry};

/// A retained entry plus its normalized text, kept so comparisons against
/// later messages do not re-normalize it every time.
#[derive(Debug, Clone)]
pub(crate) struct Retained {
    pub entry: HistoryEntry,
    pub normalized: String,
}

#[derive(Debug, Default)]
pub(crate) struct ActorHistory {
    records: VecDeque<Retained>,
}

impl ActorHistory {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Retained> {
        self.records.iter()
    }

    pub fn contains_hash(&self, hash: ContentHash) -> bool {
        self.records.iter().any(|r| r.entry.content_hash == hash)
    }

    /// Pop entries from the front while they are older than `cutoff`.
    pub fn evict_before(&mut self, cutoff: DateTime<Utc>) -> Vec<Retained> {
        let mut evicted = Vec::new();
        while self
            .records
            .front()
            .is_some_and(|r| r.entry.timestamp < cutoff)
        {
            if let Some(record) = self.records.pop_front() {
                evicted.push(record);
            }
        }
        evicted
    }

    /// Append a record, then drop the oldest ones until at most `cap` remain.
    pub fn push_bounded(&mut self, record: Retained, cap: usize) -> Vec<Retained> {
        self.records.push_back(record);
        let overflow = self.records.len().saturating_sub(cap);
        self.records.drain(..overflow).collect()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Retained> + '_ {
        self.records.drain(..)
    }

    /// Up to the last `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let skip = self.records.len().saturating_sub(limit);
        self.records
            .iter()
            .skip(skip)
            .map(|r| r.entry.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn record(at: DateTime<Utc>, text: &str, hash: u128) -> Retained {
        Retained {
            entry: HistoryEntry {
                timestamp: at,
                content_hash: ContentHash(hash),
                raw_text: text.to_string(),
            },
            normalized: text.to_lowercase(),
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_push_bounded_drops_oldest() {
        let mut history = ActorHistory::default();
        assert!(history.push_bounded(record(t(0), "a", 1), 2).is_empty());
        assert!(history.push_bounded(record(t(1), "b", 2), 2).is_empty());
        let evicted = history.push_bounded(record(t(2), "c", 3), 2);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].entry.raw_text, "a");
        assert_eq!(history.len(), 2);
        assert!(!history.contains_hash(ContentHash(1)));
        assert!(history.contains_hash(ContentHash(3)));
    }

    #[test]
    fn test_evict_before_only_removes_strictly_older() {
        let mut history = ActorHistory::default();
        history.push_bounded(record(t(0), "a", 1), 10);
        history.push_bounded(record(t(5), "b", 2), 10);
        history.push_bounded(record(t(10), "c", 3), 10);

        let evicted = history.evict_before(t(5));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].entry.raw_text, "a");
        assert_eq!(history.len(), 2);

        let evicted = history.evict_before(t(10) + TimeDelta::milliseconds(1));
        assert_eq!(evicted.len(), 2);
        assert!(history.is_empty());
    }

    #[test]
    fn test_recent_returns_tail_oldest_first() {
        let mut history = ActorHistory::default();
        for (i, text) in ["a", "b", "c", "d"].iter().enumerate() {
            history.push_bounded(record(t(i as i64), text, i as u128), 10);
        }
        let recent: Vec<String> = history.recent(2).into_iter().map(|e| e.raw_text).collect();
        assert_eq!(recent, vec!["c", "d"]);
        assert_eq!(history.recent(10).len(), 4);
        assert!(history.recent(0).is_empty());
    }

    #[test]
    fn test_drain_empties_history() {
        let mut history = ActorHistory::default();
        history.push_bounded(record(t(0), "a", 1), 10);
        history.push_bounded(record(t(1), "b", 2), 10);
        let drained: Vec<Retained> = history.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(history.is_empty());
    }
}
