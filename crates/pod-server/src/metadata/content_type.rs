use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue};

use crate::metadata::{MetadataWriter, ResponseMetadata};

/// Writes `Content-Type` from the media type recorded in the metadata.
pub struct ContentTypeMetadataWriter;

impl MetadataWriter for ContentTypeMetadataWriter {
    fn name(&self) -> &str {
        "content-type"
    }

    fn write(&self, headers: &mut HeaderMap, response: &ResponseMetadata) {
        let Some(content_type) = response.metadata.content_type() else {
            return;
        };
        match HeaderValue::from_str(content_type) {
            Ok(value) => {
                headers.insert(CONTENT_TYPE, value);
            }
            Err(_) => tracing::warn!(%content_type, "skipping invalid content type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_types::RepresentationMetadata;

    #[test]
    fn writes_recorded_type() {
        let mut meta = RepresentationMetadata::new();
        meta.set_content_type("text/turtle");
        let mut headers = HeaderMap::new();
        ContentTypeMetadataWriter.write(&mut headers, &ResponseMetadata::from_resource(meta));
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/turtle");
    }

    #[test]
    fn nothing_without_a_type() {
        let mut headers = HeaderMap::new();
        ContentTypeMetadataWriter.write(&mut headers, &ResponseMetadata::empty());
        assert!(headers.is_empty());
    }
}
