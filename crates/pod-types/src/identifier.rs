use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TypeError;

/// Absolute identifier of a resource or container.
///
/// Identifiers are either absolute paths (`/docs/note`) or absolute URLs
/// (`https://pod.example/docs/note`). URLs are kept in their normalized
/// form and carry no query or fragment. A container identifier always ends
/// in a `/`; a document identifier never does.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceIdentifier {
    value: String,
    /// Byte offset of the path component in `value`.
    path_start: usize,
}

fn invalid(value: impl Into<String>, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidIdentifier {
        value: value.into(),
        reason: reason.into(),
    }
}

impl ResourceIdentifier {
    /// Parse and validate an identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        // URL parsing resolves dot segments, so check the raw text.
        if value.split('/').any(|segment| segment == "..") {
            return Err(invalid(value, "identifier must not contain `..` segments"));
        }

        let (value, path_start) = if value.starts_with('/') {
            if value.contains(['?', '#']) {
                return Err(invalid(value, "identifier must not carry a query or fragment"));
            }
            (value, 0)
        } else {
            let url = Url::parse(&value).map_err(|e| {
                invalid(
                    value.as_str(),
                    format!("identifier must be an absolute path or URL: {e}"),
                )
            })?;
            if url.cannot_be_a_base() || url.host().is_none() {
                return Err(invalid(value, "URL identifier needs a host and a path"));
            }
            if url.query().is_some() || url.fragment().is_some() {
                return Err(invalid(value, "identifier must not carry a query or fragment"));
            }
            let path_start = url.as_str().len() - url.path().len();
            (String::from(url), path_start)
        };

        if value[path_start..].contains("//") {
            return Err(invalid(value, "identifier must not contain empty segments"));
        }
        Ok(Self { value, path_start })
    }

    /// The root container `/`.
    pub fn root() -> Self {
        Self {
            value: "/".into(),
            path_start: 0,
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns `true` if this identifier is in canonical container form.
    pub fn is_container(&self) -> bool {
        self.value.ends_with('/')
    }

    /// Returns `true` if this identifier has no parent container.
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// The container directly holding this resource, `None` for a root.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.value.trim_end_matches('/');
        if trimmed.len() <= self.path_start {
            return None;
        }
        let cut = trimmed.rfind('/')?;
        if cut < self.path_start {
            return None;
        }
        Some(Self {
            value: self.value[..=cut].to_string(),
            path_start: self.path_start,
        })
    }

    /// A document identifier for `segment` inside this container.
    pub fn join(&self, segment: &str) -> Result<Self, TypeError> {
        Self::parse(format!("{}{}", self.container_prefix(), segment))
    }

    /// A container identifier for `segment` inside this container.
    pub fn join_container(&self, segment: &str) -> Result<Self, TypeError> {
        Self::parse(format!(
            "{}{}/",
            self.container_prefix(),
            segment.trim_end_matches('/')
        ))
    }

    fn container_prefix(&self) -> String {
        if self.is_container() {
            self.value.clone()
        } else {
            format!("{}/", self.value)
        }
    }
}

impl fmt::Debug for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceIdentifier({})", self.value)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl TryFrom<String> for ResourceIdentifier {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for ResourceIdentifier {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ResourceIdentifier> for String {
    fn from(id: ResourceIdentifier) -> Self {
        id.value
    }
}

impl AsRef<str> for ResourceIdentifier {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
