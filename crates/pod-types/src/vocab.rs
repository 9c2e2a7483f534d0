//! Vocabulary terms used in resource and response metadata.
//!
//! Terms are full IRIs. Each submodule mirrors one namespace.

/// `http://www.w3.org/1999/02/22-rdf-syntax-ns#`
pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// `http://www.w3.org/ns/ldp#`
pub mod ldp {
    pub const RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
}

/// `http://www.w3.org/ns/pim/space#`
pub mod pim {
    pub const STORAGE: &str = "http://www.w3.org/ns/pim/space#Storage";
}

/// `http://shapetrees.org/#`
pub mod shape {
    /// A document declares the shape it conforms to.
    pub const HAS_SHAPE: &str = "http://shapetrees.org/#hasShape";
    /// A container lists the shapes its documents may declare.
    pub const SUPPORTS_SHAPES: &str = "http://shapetrees.org/#supportsShapes";
}

/// `http://purl.org/dc/terms/`
pub mod dc {
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
}

/// `http://www.w3.org/ns/ma-ont#`
pub mod ma {
    pub const FORMAT: &str = "http://www.w3.org/ns/ma-ont#format";
}

/// HTTP-level request facts that are not part of any RDF vocabulary.
pub mod http {
    pub const SLUG: &str = "urn:pod:http:slug";
    pub const ETAG: &str = "urn:pod:http:etag";
}

/// `urn:npm:solid:community-server:error:` -- error facts recorded on the
/// metadata of a failed request.
pub mod error {
    /// Lists one disallowed HTTP method per value.
    pub const METHOD_NOT_ALLOWED: &str =
        "urn:npm:solid:community-server:error:methodNotAllowed";
    pub const NOT_FOUND: &str = "urn:npm:solid:community-server:http:NotFoundHttpError";
    pub const METHOD_NOT_ALLOWED_ERROR: &str =
        "urn:npm:solid:community-server:http:MethodNotAllowedHttpError";
    pub const UNSUPPORTED_MEDIA_TYPE: &str =
        "urn:npm:solid:community-server:http:UnsupportedMediaTypeHttpError";
}
