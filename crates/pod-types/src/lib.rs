//! Foundation types for Pod.
//!
//! Every other Pod crate depends on `pod-types`.
//!
//! # Key Types
//!
//! - [`ResourceIdentifier`] -- absolute path or URL; containers end in `/`
//! - [`RepresentationMetadata`] -- ordered multi-map of assertions about a resource
//! - [`Representation`] -- single-use body stream plus metadata
//! - [`Conditions`] -- request preconditions, evaluated by the backing store
//! - [`ErrorClassification`] / [`ResponseContext`] -- what a finished response
//!   knows about its target

pub mod classification;
pub mod conditions;
pub mod error;
pub mod identifier;
pub mod metadata;
pub mod representation;
pub mod vocab;

pub use classification::{ErrorClassification, ResponseContext};
pub use conditions::Conditions;
pub use error::TypeError;
pub use identifier::ResourceIdentifier;
pub use metadata::{RepresentationMetadata, Term};
pub use representation::{DataStream, Representation};
