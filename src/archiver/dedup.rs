use crate::archiver::codec::normalize_text;
use crate::weibo::Mblog;
use std::collections::HashSet;

pub fn dedup_key(mblog: &Mblog) -> String {
    normalize_text(mblog.the_text())
}

/// Tracks the normalized texts already present in one month file.
///
/// Only the text participates: ids and timestamps are ignored because
/// reloaded records carry fewer fields than freshly fetched ones.
#[derive(Debug, Default)]
pub struct Deduper {
    seen: HashSet<String>,
}

impl Deduper {
    pub fn from_records(existing: &[Mblog]) -> Self {
        Self {
            seen: existing.iter().map(dedup_key).collect(),
        }
    }

    /// Record `mblog` and return `true` when its text was not seen before.
    pub fn observe(&mut self, mblog: &Mblog) -> bool {
        self.seen.insert(dedup_key(mblog))
    }
}
