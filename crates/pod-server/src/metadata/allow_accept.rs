use axum::http::header::{HeaderName, ALLOW};
use axum::http::{HeaderMap, HeaderValue};
use pod_types::{ErrorClassification, ResponseContext};

use crate::config::{AcceptTypes, ServerConfig};
use crate::metadata::{MetadataWriter, ResponseMetadata};

pub const ACCEPT_PATCH: HeaderName = HeaderName::from_static("accept-patch");
pub const ACCEPT_POST: HeaderName = HeaderName::from_static("accept-post");
pub const ACCEPT_PUT: HeaderName = HeaderName::from_static("accept-put");

/// Methods that need an existing target.
const REQUIRE_EXISTING: [&str; 5] = ["GET", "HEAD", "OPTIONS", "POST", "DELETE"];

/// Header values computed for one response.
///
/// `None` means the header is not sent at all; `Some` with an empty value
/// still produces the header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Methods for `Allow`, in configuration order.
    pub allow: Option<Vec<String>>,
    pub accept_patch: Option<String>,
    pub accept_post: Option<String>,
    pub accept_put: Option<String>,
}

/// Writes `Allow`, `Accept-Patch`, `Accept-Post` and `Accept-Put`.
///
/// Starts from the configured methods and removes those that cannot apply
/// to the target in its current state. `Allow` is only sent when the
/// response tells us whether the target exists: a successful read, a 404,
/// or a 405. `Accept-*` headers follow `Allow`, and are also sent with a 415.
#[derive(Clone, Debug)]
pub struct AllowAcceptMetadataWriter {
    supported_methods: Vec<String>,
    accept_types: AcceptTypes,
}

impl AllowAcceptMetadataWriter {
    pub fn new(supported_methods: Vec<String>, accept_types: AcceptTypes) -> Self {
        Self {
            supported_methods,
            accept_types,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.supported_methods.clone(), config.accept_types.clone())
    }

    /// Compute the header values for `context` without touching a response.
    pub fn compute(&self, context: &ResponseContext) -> Capabilities {
        let disallowed = context.classification.disallowed_methods();
        let mut allowed: Vec<&str> = Vec::with_capacity(self.supported_methods.len());
        for method in &self.supported_methods {
            if !disallowed.contains(method) && !allowed.contains(&method.as_str()) {
                allowed.push(method);
            }
        }

        if context.is_resource && !context.is_container() {
            allowed.retain(|m| *m != "POST");
        }
        if context.is_container() && (context.is_storage || context.has_members) {
            allowed.retain(|m| *m != "DELETE");
        }

        let exists = context.exists();
        let emit_allow =
            exists || matches!(context.classification, ErrorClassification::NotFound);
        if emit_allow && !exists {
            // Only PATCH and PUT can create a missing target.
            allowed.retain(|m| !REQUIRE_EXISTING.contains(m));
        }

        let emit_accept = emit_allow
            || matches!(
                context.classification,
                ErrorClassification::UnsupportedMediaType
            );
        let accept = |method: &str, types: &[String]| {
            (emit_accept && allowed.contains(&method)).then(|| types.join(", "))
        };

        Capabilities {
            accept_patch: accept("PATCH", self.accept_types.patch.as_slice()),
            accept_post: accept("POST", self.accept_types.post.as_slice()),
            accept_put: accept("PUT", self.accept_types.put.as_slice()),
            allow: emit_allow.then(|| allowed.iter().map(|m| m.to_string()).collect()),
        }
    }
}

impl MetadataWriter for AllowAcceptMetadataWriter {
    fn name(&self) -> &str {
        "allow-accept"
    }

    fn write(&self, headers: &mut HeaderMap, response: &ResponseMetadata) {
        let capabilities = self.compute(&response.context);
        let allow = capabilities.allow.map(|methods| methods.join(", "));
        for (name, value) in [
            (ALLOW, allow),
            (ACCEPT_PATCH, capabilities.accept_patch),
            (ACCEPT_POST, capabilities.accept_post),
            (ACCEPT_PUT, capabilities.accept_put),
        ] {
            let Some(value) = value else { continue };
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    headers.append(name, value);
                }
                Err(_) => tracing::warn!(header = %name, %value, "skipping invalid header value"),
            }
        }
    }
}
