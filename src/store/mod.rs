//! Card record store
//!
//! The workflow only sees `CardStore`. Production uses SQLite through an
//! r2d2 pool; tests use the in-memory store, which counts inserts and can be
//! told to fail.
//!
//! Calls are synchronous. Async callers run them on `spawn_blocking`.

mod sqlite;

pub use sqlite::SqliteCardStore;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use thiserror::Error;

use crate::card::{CardRecord, NewCard};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("card {0} already exists")]
    Duplicate(String),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait CardStore: Send + Sync {
    fn insert(&self, card: NewCard) -> Result<CardRecord, StoreError>;

    /// All cards owned by `user_id`, newest first
    fn list_for_user(&self, user_id: &str) -> Result<Vec<CardRecord>, StoreError>;

    fn get(&self, id: &str) -> Result<Option<CardRecord>, StoreError>;

    /// Delete a card if `user_id` owns it. Returns whether a row was removed.
    fn delete(&self, id: &str, user_id: &str) -> Result<bool, StoreError>;
}

/// Resolve the record id for an insert
pub(crate) fn record_id(card: &NewCard) -> String {
    card.id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

#[allow(dead_code)] // Used by tests
#[derive(Default)]
pub struct MemoryCardStore {
    records: Mutex<Vec<CardRecord>>,
    inserts: AtomicUsize,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful inserts since creation
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with `Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store set to fail".into()));
        }
        Ok(())
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Vec<CardRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CardStore for MemoryCardStore {
    fn insert(&self, card: NewCard) -> Result<CardRecord, StoreError> {
        self.check()?;
        let id = record_id(&card);

        let mut records = self.records();
        if records.iter().any(|r| r.id == id) {
            return Err(StoreError::Duplicate(id));
        }

        let record = CardRecord {
            id,
            user_id: card.user_id,
            template_id: card.template,
            created_at: Utc::now(),
            data: card.data,
        };
        records.push(record.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<CardRecord>, StoreError> {
        self.check()?;
        // Pushed in insert order, so reversing gives newest first even on
        // equal timestamps
        let mut out: Vec<CardRecord> = self
            .records()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn get(&self, id: &str) -> Result<Option<CardRecord>, StoreError> {
        self.check()?;
        Ok(self.records().iter().find(|r| r.id == id).cloned())
    }

    fn delete(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut records = self.records();
        let before = records.len();
        records.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(records.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{SocialCardData, TemplateId};

    fn new_card(user: &str, name: &str) -> NewCard {
        NewCard {
            id: None,
            user_id: user.to_string(),
            template: TemplateId::Classic,
            data: SocialCardData {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_memory_insert_and_list_newest_first() {
        let store = MemoryCardStore::new();
        store.insert(new_card("u1", "first")).unwrap();
        store.insert(new_card("u2", "other")).unwrap();
        store.insert(new_card("u1", "second")).unwrap();

        let names: Vec<String> = store
            .list_for_user("u1")
            .unwrap()
            .into_iter()
            .map(|r| r.data.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(store.insert_count(), 3);
    }

    #[test]
    fn test_memory_duplicate_id() {
        let store = MemoryCardStore::new();
        let mut card = new_card("u1", "a");
        card.id = Some("fixed".into());
        store.insert(card.clone()).unwrap();
        assert!(matches!(
            store.insert(card),
            Err(StoreError::Duplicate(id)) if id == "fixed"
        ));
        assert_eq!(store.insert_count(), 1);
    }

    #[test]
    fn test_memory_delete_is_owner_scoped() {
        let store = MemoryCardStore::new();
        let record = store.insert(new_card("u1", "a")).unwrap();

        assert!(!store.delete(&record.id, "u2").unwrap());
        assert!(store.get(&record.id).unwrap().is_some());
        assert!(store.delete(&record.id, "u1").unwrap());
        assert!(store.get(&record.id).unwrap().is_none());
    }

    #[test]
    fn test_memory_failure_toggle() {
        let store = MemoryCardStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.insert(new_card("u1", "a")),
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.insert_count(), 0);

        store.set_failing(false);
        assert!(store.insert(new_card("u1", "a")).is_ok());
    }
}
