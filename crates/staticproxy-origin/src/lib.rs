//! Conditional reads against the origin object store.
//!
//! The [`OriginStore`] trait is the narrow seam to whatever holds the asset
//! bytes. [`OriginReader`] drives a conditional read through it and collapses
//! every possible result into the four-case [`OriginOutcome`], so nothing
//! downstream ever branches on store-specific error shapes.
//!
//! # Architecture
//!
//! ```text
//! OriginReader::read(bucket, key, validator)
//!        |
//!        v
//!   dyn OriginStore ── S3Origin       (live object store)
//!                   ├─ LocalDirOrigin (files under a public directory)
//!                   └─ MemoryOrigin   (in-process, tests and stand-ins)
//!        |
//!        v
//!   OriginOutcome { Success | NotModified | NotFound | OriginError }
//! ```

pub mod error;
pub mod etag;
pub mod local;
pub mod memory;
pub mod outcome;
pub mod s3;
pub mod store;

pub use error::StoreError;
pub use local::LocalDirOrigin;
pub use memory::MemoryOrigin;
pub use outcome::{OriginOutcome, OriginReader};
pub use s3::S3Origin;
pub use store::{OriginObject, OriginStore};
