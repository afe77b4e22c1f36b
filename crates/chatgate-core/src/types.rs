use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Identifiers
// =============================================================================

/// Stable identifier for a message sender.
///
/// Chat platforms hand out either numeric or string ids; numeric ids are
/// stored in their decimal form so `12345` and `"12345"` name the same actor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ActorId> for ActorId {
    fn from(id: &ActorId) -> Self {
        id.clone()
    }
}

impl From<i64> for ActorId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<usize> for ActorId {
    fn from(id: usize) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for ActorId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

// =============================================================================
// Content fingerprint
// =============================================================================

/// 128-bit fingerprint of a normalized message.
///
/// Serialized as a 32-character lowercase hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentHash(pub u128);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        u128::from_str_radix(&hex, 16)
            .map(ContentHash)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Filter records
// =============================================================================

/// One admitted message retained in an actor's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub content_hash: ContentHash,
    /// The message as received, before normalization.
    pub raw_text: String,
}

/// Decision reached for one inbound message.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// New content; recorded in the sender's history.
    Admitted,
    /// Nothing left after normalization; let through without recording.
    Empty,
    /// Fingerprint already present in retained history.
    ExactDuplicate,
    /// Word overlap with a retained message reached the threshold.
    NearDuplicate { similarity: f64 },
}

impl Verdict {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Verdict::ExactDuplicate | Verdict::NearDuplicate { .. })
    }
}

/// Aggregate counters exposed by the duplicate filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub total_processed: u64,
    pub total_blocked: u64,
    /// Actors whose history currently holds at least one entry.
    pub active_actors: usize,
    pub cached_messages: usize,
}

/// Outcome of a full sweep over every actor history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub actors_removed: usize,
    pub entries_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_numeric_and_string_agree() {
        assert_eq!(ActorId::from(12345_i64), ActorId::from("12345"));
        assert_eq!(ActorId::from(7_u64).as_str(), "7");
    }

    #[test]
    fn test_actor_id_serializes_transparently() {
        let json = serde_json::to_string(&ActorId::from("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }

    #[test]
    fn test_content_hash_display_is_zero_padded_hex() {
        assert_eq!(
            ContentHash(0xff).to_string(),
            "000000000000000000000000000000ff"
        );
    }

    #[test]
    fn test_content_hash_json_roundtrip() {
        let hash = ContentHash(0x0123_4567_89ab_cdef_0011_2233_4455_6677);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"0123456789abcdef0011223344556677\"");
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_content_hash_rejects_non_hex() {
        let result: std::result::Result<ContentHash, _> = serde_json::from_str("\"not-hex\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_verdict_is_duplicate() {
        assert!(!Verdict::Admitted.is_duplicate());
        assert!(!Verdict::Empty.is_duplicate());
        assert!(Verdict::ExactDuplicate.is_duplicate());
        assert!(Verdict::NearDuplicate { similarity: 0.8 }.is_duplicate());
    }

    #[test]
    fn test_verdict_serializes_with_tag() {
        let json = serde_json::to_value(Verdict::NearDuplicate { similarity: 0.5 }).unwrap();
        assert_eq!(json["verdict"], "near_duplicate");
        assert_eq!(json["similarity"], 0.5);
        let json = serde_json::to_value(Verdict::Admitted).unwrap();
        assert_eq!(json, serde_json::json!({ "verdict": "admitted" }));
    }

    #[test]
    fn test_filter_stats_default_is_zeroed() {
        let stats = FilterStats::default();
        assert_eq!(stats.total_processed, 0);
        assert_eq!(stats.total_blocked, 0);
        assert_eq!(stats.active_actors, 0);
        assert_eq!(stats.cached_messages, 0);
    }
}
