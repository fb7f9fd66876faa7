//! Key-value persistence seam.
//!
//! The quote store and the session view only need string-keyed storage. The
//! durable implementation lives in `quotebook-storage-sqlite`; the in-memory
//! one backs the per-process session store and tests.

mod kv_traits;
mod memory;

pub use kv_traits::KeyValueStore;
pub use memory::InMemoryKeyValueStore;
