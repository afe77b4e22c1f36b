//! Reference-counted set of fingerprints across every actor's history.

use std::collections::HashMap;

use chatgate_core::types::ContentHash;

/// A fingerprint stays present while at least one retained entry carries it.
#[derive(Debug, Default)]
pub(crate) struct HashIndex {
    counts: HashMap<ContentHash, usize>,
}

impl HashIndex {
    pub fn contains(&self, hash: ContentHash) -> bool {
        self.counts.contains_key(&hash)
    }

    pub fn insert(&mut self, hash: ContentHash) {
        *self.counts.entry(hash).or_insert(0) += 1;
    }

    /// Drop one reference; the hash disappears with its last holder.
    pub fn release(&mut self, hash: ContentHash) {
        if let Some(count) = self.counts.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&hash);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
