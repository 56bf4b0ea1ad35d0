//! Extraction store.

use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use gstx_core::InvoiceRecord;

/// An extraction kept for later retrieval.
#[derive(Debug, Clone, Serialize)]
pub struct StoredExtraction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub record: InvoiceRecord,
}

impl StoredExtraction {
    /// Wrap a record under a freshly generated id.
    pub fn new(record: InvoiceRecord) -> Self {
        let timestamp = Utc::now();
        Self {
            id: new_extraction_id(timestamp),
            timestamp,
            record,
        }
    }
}

/// Generate an id of the form `extract_<8 hex>_<unix seconds>`.
pub fn new_extraction_id(timestamp: DateTime<Utc>) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("extract_{}_{}", &uuid[..8], timestamp.timestamp())
}

/// Key-value storage for completed extractions.
pub trait ExtractionStore: Send + Sync {
    fn insert(&self, entry: StoredExtraction);

    fn get(&self, id: &str) -> Option<StoredExtraction>;

    /// Remove an entry, returning whether it existed.
    fn remove(&self, id: &str) -> bool;

    /// All entries, newest first.
    fn list(&self) -> Vec<StoredExtraction>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct Entries {
    by_id: HashMap<String, StoredExtraction>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

/// In-process store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Entries>,
    max_entries: Option<usize>,
}

impl MemoryStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store keeping at most `max_entries` extractions; `None` is unbounded.
    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        Self {
            entries: RwLock::default(),
            max_entries,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ExtractionStore for MemoryStore {
    fn insert(&self, entry: StoredExtraction) {
        let mut entries = self.write();

        let id = entry.id.clone();
        if entries.by_id.insert(id.clone(), entry).is_some() {
            entries.order.retain(|existing| *existing != id);
        }
        entries.order.push_back(id);

        if let Some(max) = self.max_entries {
            while entries.order.len() > max {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.by_id.remove(&oldest);
                }
            }
        }
    }

    fn get(&self, id: &str) -> Option<StoredExtraction> {
        self.read().by_id.get(id).cloned()
    }

    fn remove(&self, id: &str) -> bool {
        let mut entries = self.write();
        let removed = entries.by_id.remove(id).is_some();
        if removed {
            entries.order.retain(|existing| existing != id);
        }
        removed
    }

    fn list(&self) -> Vec<StoredExtraction> {
        let mut all: Vec<_> = self.read().by_id.values().cloned().collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        all
    }

    fn len(&self) -> usize {
        self.read().by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn entry(id: &str, secs: i64) -> StoredExtraction {
        StoredExtraction {
            id: id.to_string(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            record: InvoiceRecord::default(),
        }
    }

    #[test]
    fn test_id_format() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let id = new_extraction_id(ts);

        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "extract");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(parts[2], "1700000000");
    }

    #[test]
    fn test_insert_get_remove() {
        let store = MemoryStore::new();
        store.insert(entry("a", 1));

        assert_eq!(store.len(), 1);
        assert!(store.get("a").is_some());
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let store = MemoryStore::new();
        store.insert(entry("old", 10));
        store.insert(entry("new", 30));
        store.insert(entry("mid", 20));

        let ids: Vec<_> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_bounded_store_evicts_oldest() {
        let store = MemoryStore::with_max_entries(Some(2));
        store.insert(entry("first", 1));
        store.insert(entry("second", 2));
        store.insert(entry("third", 3));

        assert_eq!(store.len(), 2);
        assert!(store.get("first").is_none());
        assert!(store.get("third").is_some());
    }
}
