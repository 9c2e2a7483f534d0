//! Resource storage for Pod.
//!
//! # Stores
//!
//! All backends and decorators implement the [`ResourceStore`] trait:
//!
//! - [`InMemoryResourceStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! A decorator owns its inner store and implements [`ResourceStore`] itself,
//! forwarding the operations it leaves unchanged.
//!
//! # Key-Value Storage
//!
//! [`KeyValueStorage`] backs auxiliary lookups such as shape definitions:
//!
//! - [`MemoryKeyValueStorage`] -- `HashMap` behind a `RwLock`
//! - [`CachedWebStorage`] -- URL keys fetched over HTTP, read through a cache
//!
//! # Design Rules
//!
//! 1. No lock is held across an `.await`.
//! 2. Conditions are evaluated only by the backing store.
//! 3. Errors carry enough information to pick an HTTP status.

pub mod error;
pub mod keyvalue;
pub mod memory;
pub mod traits;

pub use error::{BoxError, StoreError, StoreResult};
pub use keyvalue::memory::MemoryKeyValueStorage;
pub use keyvalue::web::CachedWebStorage;
pub use keyvalue::KeyValueStorage;
pub use memory::InMemoryResourceStore;
pub use traits::ResourceStore;
