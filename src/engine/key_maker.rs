//! Stable, collision-free render keys for one pass over a row sequence.

use super::types::RenderKey;
use std::collections::{HashMap, HashSet};

/// Assigns render keys by occurrence count of each `uid`.
///
/// The first occurrence of a uid is keyed by the uid itself, the Nth by
/// `"{uid}_{N-1}"`. A fresh maker (or [`KeyMaker::clear`]) is required at the
/// start of every full pass, otherwise counts from the previous pass leak in
/// and keys stop being stable.
///
/// Uniqueness within a pass is structural: every issued key is remembered,
/// and a candidate that collides with an earlier key (e.g. uid `"a_1"`
/// following two `"a"` rows) is bumped to the next free suffix.
///
/// # Examples
///
/// ```
/// # use logrows::engine::key_maker::KeyMaker;
/// let mut keys = KeyMaker::new();
/// assert_eq!(keys.get_key("a").as_str(), "a");
/// assert_eq!(keys.get_key("b").as_str(), "b");
/// assert_eq!(keys.get_key("a").as_str(), "a_1");
/// ```
#[derive(Debug, Default, Clone)]
pub struct KeyMaker {
    counts: HashMap<String, usize>,
    issued: HashSet<RenderKey>,
}

impl KeyMaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for the next occurrence of `uid` in this pass.
    pub fn get_key(&mut self, uid: &str) -> RenderKey {
        let count = self.counts.entry(uid.to_string()).or_insert(0);
        loop {
            let candidate = if *count == 0 {
                RenderKey::new(uid.to_string())
            } else {
                RenderKey::new(format!("{uid}_{count}"))
            };
            *count += 1;
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Forget all counts, starting a new pass.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.issued.clear();
    }

    /// Number of keys issued in this pass.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
