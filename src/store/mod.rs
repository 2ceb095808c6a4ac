use std::collections::HashSet;
use std::sync::Mutex;

use crate::reminders::domain::{NaturalKey, PolicyRecord};

/// Storage boundary for policy records.
///
/// Uniqueness of the natural key is the store's responsibility: concurrent
/// batch runs may race on the same sheet, so `insert_if_absent` must be
/// atomic in the implementation rather than coordinated by callers.
pub trait PolicyStore: Send + Sync {
    /// Insert the record unless one with the same natural key already
    /// exists. Returns `true` if inserted, `false` if skipped as duplicate.
    fn insert_if_absent(&self, record: PolicyRecord) -> Result<bool, StoreError>;

    fn find_by_key(&self, key: &NaturalKey) -> Result<Option<PolicyRecord>, StoreError>;

    fn all(&self) -> Result<Vec<PolicyRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("policy store unavailable: {0}")]
    Unavailable(String),
}

/// Reference store for single-operator runs and tests. A SQL-backed store
/// would implement [`PolicyStore`] with a unique index over the natural key.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<PolicyRecord>,
    keys: HashSet<NaturalKey>,
    next_id: i64,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn insert_if_absent(&self, mut record: PolicyRecord) -> Result<bool, StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        // Check and insert under one lock so concurrent runs cannot both
        // claim the same natural key.
        if !inner.keys.insert(record.natural_key()) {
            return Ok(false);
        }

        inner.next_id += 1;
        record.id = Some(inner.next_id);
        inner.rows.push(record);
        Ok(true)
    }

    fn find_by_key(&self, key: &NaturalKey) -> Result<Option<PolicyRecord>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        Ok(inner
            .rows
            .iter()
            .find(|row| &row.natural_key() == key)
            .cloned())
    }

    fn all(&self) -> Result<Vec<PolicyRecord>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        Ok(inner.rows.clone())
    }
}
