//! File-backed, content-addressed response cache.
//!
//! Responses from the remote repository are stored under the SHA-256 digest
//! of their request key so a fetch phase can be replayed without network
//! access. It supports:
//!
//! - Three modes: `off` (pass-through), `store` (wipe then write), `reuse`
//!   (read-only replay)
//! - Atomic writes (temp file + rename), so `load` never observes a partial entry
//! - Entries that record their request key for corruption detection
//!
//! Choosing between a live fetch and a replay is left to the caller; see
//! [`ResponseCache::mode`].

pub mod hash;
pub mod mode;
pub mod store;

pub use crate::Error;

pub use hash::request_digest;
pub use mode::CacheMode;
pub use store::{CacheEntry, ResponseCache};
