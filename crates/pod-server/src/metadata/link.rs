use axum::http::header::LINK;
use axum::http::{HeaderMap, HeaderValue};
use pod_types::vocab::{rdf, shape};

use crate::metadata::{MetadataWriter, ResponseMetadata};

/// Writes one `Link` header per value of each mapped predicate.
///
/// `urn:` values are internal facts (such as recorded errors) and are never
/// exposed.
pub struct LinkRelMetadataWriter {
    /// `(predicate, rel)` pairs, in output order.
    rels: Vec<(String, String)>,
}

impl LinkRelMetadataWriter {
    pub fn new(rels: Vec<(String, String)>) -> Self {
        Self { rels }
    }
}

impl Default for LinkRelMetadataWriter {
    /// `rdf:type` as `rel="type"`; shape predicates under their own IRIs.
    fn default() -> Self {
        Self::new(vec![
            (rdf::TYPE.into(), "type".into()),
            (shape::HAS_SHAPE.into(), shape::HAS_SHAPE.into()),
            (shape::SUPPORTS_SHAPES.into(), shape::SUPPORTS_SHAPES.into()),
        ])
    }
}

impl MetadataWriter for LinkRelMetadataWriter {
    fn name(&self) -> &str {
        "link-rel"
    }

    fn write(&self, headers: &mut HeaderMap, response: &ResponseMetadata) {
        for (predicate, rel) in &self.rels {
            for term in response.metadata.get_all(predicate) {
                if term.value.starts_with("urn:") {
                    continue;
                }
                let link = format!("<{}>; rel=\"{rel}\"", term.value);
                match HeaderValue::from_str(&link) {
                    Ok(value) => {
                        headers.append(LINK, value);
                    }
                    Err(_) => tracing::warn!(%link, "skipping invalid link"),
                }
            }
        }
    }
}
