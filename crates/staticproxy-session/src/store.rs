//! The session store seam.

use std::fmt;

use async_trait::async_trait;

use crate::error::SessionError;
use crate::record::SessionRecord;

/// Key-value lookup of session records.
#[async_trait]
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Fetch the record stored under `key` in `table`.
    ///
    /// A miss yields [`SessionRecord::placeholder`]; store failures are
    /// returned as-is.
    async fn get_by_key(&self, table: &str, key: &str) -> Result<SessionRecord, SessionError>;
}
