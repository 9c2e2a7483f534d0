use axum::http::header::{ETAG, LAST_MODIFIED};
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use pod_types::vocab::{dc, http};

use crate::metadata::{MetadataWriter, ResponseMetadata};

/// Writes `ETag` and `Last-Modified` for resources read from the store.
pub struct StateMetadataWriter;

/// Format as an HTTP date (RFC 7231 IMF-fixdate).
pub fn http_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

impl MetadataWriter for StateMetadataWriter {
    fn name(&self) -> &str {
        "state"
    }

    fn write(&self, headers: &mut HeaderMap, response: &ResponseMetadata) {
        if let Some(etag) = response.metadata.get(http::ETAG) {
            if let Ok(value) = HeaderValue::from_str(&etag.value) {
                headers.insert(ETAG, value);
            }
        }
        let modified = response
            .metadata
            .get(dc::MODIFIED)
            .and_then(|term| DateTime::parse_from_rfc3339(&term.value).ok());
        if let Some(modified) = modified {
            let date = http_date(&modified.with_timezone(&Utc));
            if let Ok(value) = HeaderValue::from_str(&date) {
                headers.insert(LAST_MODIFIED, value);
            }
        }
    }
}
