//! Shape enforcement for Pod.
//!
//! [`ShapeTreeStore`] wraps any [`pod_store::ResourceStore`] and rejects
//! documents that do not declare, or do not conform to, a shape their
//! container allows. Shape definitions come from a
//! [`pod_store::KeyValueStorage`]; the actual conformance check is delegated
//! to a [`ShapeValidator`].
//!
//! # Quick Start
//!
//! ```rust
//! use pod_shape::{PermissiveValidator, ShapeTreeStore};
//! use pod_store::{InMemoryResourceStore, MemoryKeyValueStorage};
//!
//! let shapes = MemoryKeyValueStorage::<String, String>::new();
//! let store = ShapeTreeStore::new(InMemoryResourceStore::new(), shapes, PermissiveValidator);
//! assert!(store.source().is_empty());
//! ```

pub mod store;
pub mod validator;

pub use store::ShapeTreeStore;
pub use validator::{PermissiveValidator, ShapeValidator, ValidationError};
