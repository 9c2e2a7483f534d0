//! Response metadata writers.
//!
//! A finished request is summarised as a [`ResponseMetadata`], then every
//! writer in a [`MetadataWriterChain`] turns the parts it cares about into
//! response headers.

pub mod allow_accept;
pub mod content_type;
pub mod link;
pub mod state;

use axum::http::HeaderMap;
use pod_store::StoreError;
use pod_types::{RepresentationMetadata, ResourceIdentifier, ResponseContext};

use crate::config::ServerConfig;

pub use allow_accept::{AllowAcceptMetadataWriter, Capabilities};
pub use content_type::ContentTypeMetadataWriter;
pub use link::LinkRelMetadataWriter;
pub use state::StateMetadataWriter;

// ---------------------------------------------------------------------------
// ResponseMetadata
// ---------------------------------------------------------------------------

/// Everything the writers may report about a response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
    /// Metadata of the target, or the error facts recorded for it.
    pub metadata: RepresentationMetadata,
    /// Derived once from `metadata`.
    pub context: ResponseContext,
}

impl ResponseMetadata {
    /// Metadata of a resource that was read successfully.
    pub fn from_resource(metadata: RepresentationMetadata) -> Self {
        let context = ResponseContext::from_metadata(&metadata);
        Self { metadata, context }
    }

    /// A response that reports nothing about its target.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Metadata for a request on `identifier` that failed with `error`.
    pub fn from_error(identifier: Option<ResourceIdentifier>, error: &StoreError) -> Self {
        let classification = error.classification();
        let mut metadata = match &identifier {
            Some(id) => RepresentationMetadata::for_identifier(id.clone()),
            None => RepresentationMetadata::new(),
        };
        classification.record(&mut metadata);
        Self {
            metadata,
            context: ResponseContext::from_error(identifier, classification),
        }
    }
}

// ---------------------------------------------------------------------------
// MetadataWriter
// ---------------------------------------------------------------------------

/// Turns response metadata into headers.
///
/// Writers never fail: a value that cannot be expressed as a header is
/// skipped.
pub trait MetadataWriter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn write(&self, headers: &mut HeaderMap, response: &ResponseMetadata);
}

// ---------------------------------------------------------------------------
// MetadataWriterChain
// ---------------------------------------------------------------------------

/// Ordered list of writers applied to every response.
#[derive(Default)]
pub struct MetadataWriterChain {
    writers: Vec<Box<dyn MetadataWriter>>,
}

impl MetadataWriterChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain: capabilities -> content type -> state -> link
    /// relations.
    pub fn with_default_writers(config: &ServerConfig) -> Self {
        let mut chain = Self::new();
        chain.add_writer(Box::new(AllowAcceptMetadataWriter::from_config(config)));
        chain.add_writer(Box::new(ContentTypeMetadataWriter));
        chain.add_writer(Box::new(StateMetadataWriter));
        chain.add_writer(Box::new(LinkRelMetadataWriter::default()));
        chain
    }

    /// Append a writer to the end of the chain.
    pub fn add_writer(&mut self, writer: Box<dyn MetadataWriter>) {
        self.writers.push(writer);
    }

    pub fn writer_count(&self) -> usize {
        self.writers.len()
    }

    /// Run every writer in order.
    pub fn write_all(&self, headers: &mut HeaderMap, response: &ResponseMetadata) {
        for writer in &self.writers {
            tracing::trace!(writer = writer.name(), "writing response metadata");
            writer.write(headers, response);
        }
    }
}
