//! In-process session store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::error::SessionError;
use crate::record::SessionRecord;
use crate::store::SessionStore;

type Table = DashMap<String, SessionRecord>;

/// Session tables kept in memory, keyed by table name.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    tables: DashMap<String, Arc<Table>>,
}

impl MemorySessionStore {
    /// Create a store with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table. Returns `false` if it already existed.
    pub fn create_table(&self, name: impl Into<String>) -> bool {
        match self.tables.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(Arc::new(Table::new()));
                true
            }
        }
    }

    /// Store a record, replacing any record with the same key.
    pub fn put(&self, table: &str, record: SessionRecord) -> Result<(), SessionError> {
        self.require_table(table)?
            .insert(record.idx.clone(), record);
        Ok(())
    }

    fn require_table(&self, name: &str) -> Result<Arc<Table>, SessionError> {
        self.tables
            .get(name)
            .map(|t| Arc::clone(t.value()))
            .ok_or_else(|| SessionError::TableNotFound {
                table: name.to_owned(),
            })
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_by_key(&self, table: &str, key: &str) -> Result<SessionRecord, SessionError> {
        let records = self.require_table(table)?;
        let record = records.get(key).map(|r| r.value().clone());
        Ok(record.unwrap_or_else(|| {
            debug!(table, key, "no session record, returning placeholder");
            SessionRecord::placeholder(key)
        }))
    }
}
