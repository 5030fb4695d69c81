//! Session record lookup for staticproxy.
//!
//! A single get-by-key operation against a key-value table. A miss is not an
//! error: callers get a placeholder record whose `_idx` is the lookup key, so
//! code that indexes by key keeps working. Store failures propagate to the
//! caller untouched.

pub mod dynamo;
pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use dynamo::DynamoSessionStore;
pub use error::SessionError;
pub use memory::MemorySessionStore;
pub use record::{SESSION_KEY_ATTRIBUTE, SessionRecord};
pub use store::SessionStore;
