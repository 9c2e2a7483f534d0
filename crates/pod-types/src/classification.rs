use crate::identifier::ResourceIdentifier;
use crate::metadata::RepresentationMetadata;
use crate::vocab::{error, ldp, pim, rdf};

/// The error, if any, a response reports about its target.
///
/// Only one classification applies to a response, so a response can never
/// claim both that its target is missing and that a method on it is
/// disallowed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorClassification {
    #[default]
    None,
    /// 404: the target does not exist.
    NotFound,
    /// 405: the listed methods may not be used on the target.
    MethodNotAllowed(Vec<String>),
    /// 415: the request body had an unacceptable media type.
    UnsupportedMediaType,
}

impl ErrorClassification {
    /// Methods reported as disallowed (empty unless `MethodNotAllowed`).
    pub fn disallowed_methods(&self) -> &[String] {
        match self {
            Self::MethodNotAllowed(methods) => methods,
            _ => &[],
        }
    }

    /// Recover the classification recorded in `metadata` by [`Self::record`].
    pub fn from_metadata(metadata: &RepresentationMetadata) -> Self {
        if metadata.has_type(error::NOT_FOUND) {
            Self::NotFound
        } else if metadata.has_type(error::METHOD_NOT_ALLOWED_ERROR) {
            Self::MethodNotAllowed(
                metadata
                    .get_all(error::METHOD_NOT_ALLOWED)
                    .map(|term| term.value.clone())
                    .collect(),
            )
        } else if metadata.has_type(error::UNSUPPORTED_MEDIA_TYPE) {
            Self::UnsupportedMediaType
        } else {
            Self::None
        }
    }

    /// Record this classification as assertions on `metadata`.
    pub fn record(&self, metadata: &mut RepresentationMetadata) {
        match self {
            Self::None => {}
            Self::NotFound => {
                metadata.add(rdf::TYPE, error::NOT_FOUND);
            }
            Self::MethodNotAllowed(methods) => {
                metadata.add(rdf::TYPE, error::METHOD_NOT_ALLOWED_ERROR);
                for method in methods {
                    metadata.add(error::METHOD_NOT_ALLOWED, method.as_str());
                }
            }
            Self::UnsupportedMediaType => {
                metadata.add(rdf::TYPE, error::UNSUPPORTED_MEDIA_TYPE);
            }
        }
    }
}

/// What a finished response knows about its target.
///
/// Built once, either from the metadata of a resource that was read
/// successfully or from the error a request failed with, and then handed by
/// value to the response metadata writers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseContext {
    pub identifier: Option<ResourceIdentifier>,
    /// Resource metadata was read: the target exists.
    pub is_resource: bool,
    /// The target is a storage root.
    pub is_storage: bool,
    /// The target is a container with at least one member.
    pub has_members: bool,
    pub classification: ErrorClassification,
}

impl ResponseContext {
    /// Derive a context from response metadata.
    pub fn from_metadata(metadata: &RepresentationMetadata) -> Self {
        Self {
            identifier: metadata.identifier().cloned(),
            is_resource: metadata.has_type(ldp::RESOURCE),
            is_storage: metadata.has_type(pim::STORAGE),
            has_members: metadata.has(ldp::CONTAINS, None),
            classification: ErrorClassification::from_metadata(metadata),
        }
    }

    /// A context for a request on `identifier` that failed.
    pub fn from_error(
        identifier: Option<ResourceIdentifier>,
        classification: ErrorClassification,
    ) -> Self {
        Self {
            identifier,
            classification,
            ..Default::default()
        }
    }

    /// Returns `true` if the identifier is in container form.
    pub fn is_container(&self) -> bool {
        self.identifier
            .as_ref()
            .is_some_and(ResourceIdentifier::is_container)
    }

    /// Whether the target is assumed to exist.
    ///
    /// A 405 implies the target exists; a 404 or a generic failure does not.
    pub fn exists(&self) -> bool {
        self.is_resource || matches!(self.classification, ErrorClassification::MethodNotAllowed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ResourceIdentifier {
        ResourceIdentifier::parse(s).unwrap()
    }

    #[test]
    fn record_then_recover() {
        for classification in [
            ErrorClassification::None,
            ErrorClassification::NotFound,
            ErrorClassification::MethodNotAllowed(vec!["DELETE".into(), "POST".into()]),
            ErrorClassification::UnsupportedMediaType,
        ] {
            let mut meta = RepresentationMetadata::new();
            classification.record(&mut meta);
            assert_eq!(ErrorClassification::from_metadata(&meta), classification);
        }
    }

    #[test]
    fn disallowed_methods_only_for_405() {
        assert!(ErrorClassification::NotFound.disallowed_methods().is_empty());
        let c = ErrorClassification::MethodNotAllowed(vec!["PUT".into()]);
        assert_eq!(c.disallowed_methods(), ["PUT".to_string()]);
    }

    #[test]
    fn context_from_container_metadata() {
        let mut meta = RepresentationMetadata::for_identifier(id("/"));
        meta.add(rdf::TYPE, ldp::RESOURCE)
            .add(rdf::TYPE, pim::STORAGE)
            .add(ldp::CONTAINS, "/docs/");

        let ctx = ResponseContext::from_metadata(&meta);
        assert!(ctx.is_resource);
        assert!(ctx.is_storage);
        assert!(ctx.has_members);
        assert!(ctx.is_container());
        assert!(ctx.exists());
        assert_eq!(ctx.classification, ErrorClassification::None);
    }

    #[test]
    fn existence_hypothesis() {
        let missing = ResponseContext::from_error(Some(id("/a")), ErrorClassification::NotFound);
        assert!(!missing.exists());

        let not_allowed = ResponseContext::from_error(
            Some(id("/a")),
            ErrorClassification::MethodNotAllowed(vec!["POST".into()]),
        );
        assert!(not_allowed.exists());

        let unknown = ResponseContext::default();
        assert!(!unknown.exists());
        assert!(!unknown.is_container());
    }
}
