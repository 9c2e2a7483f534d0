use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identifier::ResourceIdentifier;
use crate::vocab::{http, ldp, ma, rdf};

/// The object of a metadata assertion: a value with an optional language tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub value: String,
    pub language: Option<String>,
}

impl Term {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }

    /// A language-tagged literal.
    pub fn with_language(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.language {
            Some(lang) => write!(f, "{:?}@{lang}", self.value),
            None => f.write_str(&self.value),
        }
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&ResourceIdentifier> for Term {
    fn from(id: &ResourceIdentifier) -> Self {
        Self::new(id.as_str())
    }
}

/// Ordered multi-map of assertions about a single subject.
///
/// Attached to stored resources, incoming requests, and outgoing responses.
/// Keys are predicates (vocabulary IRIs); each predicate may carry any number
/// of values, and insertion order is preserved across all assertions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentationMetadata {
    identifier: Option<ResourceIdentifier>,
    entries: Vec<(String, Term)>,
}

impl RepresentationMetadata {
    /// Metadata without a subject (e.g. the body of a request).
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata about `identifier`.
    pub fn for_identifier(identifier: ResourceIdentifier) -> Self {
        Self {
            identifier: Some(identifier),
            entries: Vec::new(),
        }
    }

    pub fn identifier(&self) -> Option<&ResourceIdentifier> {
        self.identifier.as_ref()
    }

    pub fn set_identifier(&mut self, identifier: ResourceIdentifier) {
        self.identifier = Some(identifier);
    }

    /// Append an assertion.
    pub fn add(&mut self, predicate: &str, object: impl Into<Term>) -> &mut Self {
        self.entries.push((predicate.to_string(), object.into()));
        self
    }

    /// Replace every value of `predicate` with `object`.
    pub fn set(&mut self, predicate: &str, object: impl Into<Term>) -> &mut Self {
        self.remove_all(predicate);
        self.add(predicate, object)
    }

    /// Remove a single assertion. Returns `true` if it was present.
    pub fn remove(&mut self, predicate: &str, value: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|(p, term)| !(p == predicate && term.value == value));
        before != self.entries.len()
    }

    /// Remove every value of `predicate`.
    pub fn remove_all(&mut self, predicate: &str) -> &mut Self {
        self.entries.retain(|(p, _)| p != predicate);
        self
    }

    /// The first value of `predicate`.
    pub fn get(&self, predicate: &str) -> Option<&Term> {
        self.get_all(predicate).next()
    }

    /// The value of a single-valued predicate.
    ///
    /// Fails when the predicate holds more than one value.
    pub fn get_single(&self, predicate: &str) -> Result<Option<&Term>, TypeError> {
        let mut values = self.get_all(predicate);
        let first = values.next();
        let rest = values.count();
        if rest > 0 {
            return Err(TypeError::MultipleValues {
                predicate: predicate.to_string(),
                count: rest + 1,
            });
        }
        Ok(first)
    }

    /// Every value of `predicate`, in insertion order.
    pub fn get_all<'a, 'p>(&'a self, predicate: &'p str) -> impl Iterator<Item = &'a Term> + 'p
    where
        'a: 'p,
    {
        self.entries
            .iter()
            .filter(move |(p, _)| p == predicate)
            .map(|(_, term)| term)
    }

    /// Returns `true` if `predicate` has any value, or the given value when
    /// `value` is `Some`.
    pub fn has(&self, predicate: &str, value: Option<&str>) -> bool {
        self.get_all(predicate)
            .any(|term| value.map_or(true, |v| term.value == v))
    }

    /// Shorthand for `has(rdf:type, Some(class))`.
    pub fn has_type(&self, class: &str) -> bool {
        self.has(rdf::TYPE, Some(class))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get(ma::FORMAT).map(|term| term.value.as_str())
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.set(ma::FORMAT, Term::new(content_type))
    }

    /// Whether a new member described by this metadata is a container.
    ///
    /// A `Slug` ending in `/` or an explicit container type marks one.
    pub fn is_new_container(&self) -> bool {
        if let Some(slug) = self.get(http::SLUG) {
            if slug.value.ends_with('/') {
                return true;
            }
        }
        self.has_type(ldp::CONTAINER) || self.has_type(ldp::BASIC_CONTAINER)
    }

    /// Copy every assertion from `other` into `self`.
    pub fn extend(&mut self, other: &RepresentationMetadata) -> &mut Self {
        self.entries.extend(other.entries.iter().cloned());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.entries.iter().map(|(p, term)| (p.as_str(), term))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{pim, shape};

    #[test]
    fn preserves_insertion_order() {
        let mut meta = RepresentationMetadata::new();
        meta.add(shape::SUPPORTS_SHAPES, "https://shapes.example/b")
            .add(rdf::TYPE, ldp::CONTAINER)
            .add(shape::SUPPORTS_SHAPES, "https://shapes.example/a");

        let shapes: Vec<_> = meta
            .get_all(shape::SUPPORTS_SHAPES)
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(shapes, ["https://shapes.example/b", "https://shapes.example/a"]);
        assert_eq!(meta.len(), 3);
    }

    #[test]
    fn set_replaces_all_values() {
        let mut meta = RepresentationMetadata::new();
        meta.add(shape::HAS_SHAPE, "a").add(shape::HAS_SHAPE, "b");
        meta.set(shape::HAS_SHAPE, "c");
        assert_eq!(meta.get(shape::HAS_SHAPE).unwrap().value, "c");
        assert_eq!(meta.get_all(shape::HAS_SHAPE).count(), 1);
    }

    #[test]
    fn get_single_rejects_multiple_values() {
        let mut meta = RepresentationMetadata::new();
        assert_eq!(meta.get_single(shape::HAS_SHAPE).unwrap(), None);
        meta.add(shape::HAS_SHAPE, "a");
        assert_eq!(meta.get_single(shape::HAS_SHAPE).unwrap().unwrap().value, "a");
        meta.add(shape::HAS_SHAPE, "b");
        assert_eq!(
            meta.get_single(shape::HAS_SHAPE),
            Err(TypeError::MultipleValues {
                predicate: shape::HAS_SHAPE.into(),
                count: 2
            })
        );
    }

    #[test]
    fn has_with_and_without_value() {
        let mut meta = RepresentationMetadata::new();
        meta.add(rdf::TYPE, pim::STORAGE);
        assert!(meta.has(rdf::TYPE, None));
        assert!(meta.has_type(pim::STORAGE));
        assert!(!meta.has_type(ldp::RESOURCE));
        assert!(!meta.has(ldp::CONTAINS, None));
    }

    #[test]
    fn remove_single_assertion() {
        let mut meta = RepresentationMetadata::new();
        meta.add(rdf::TYPE, ldp::RESOURCE).add(rdf::TYPE, ldp::CONTAINER);
        assert!(meta.remove(rdf::TYPE, ldp::RESOURCE));
        assert!(!meta.remove(rdf::TYPE, ldp::RESOURCE));
        assert!(meta.has_type(ldp::CONTAINER));
    }

    #[test]
    fn language_tagged_values() {
        let mut meta = RepresentationMetadata::new();
        meta.add("urn:title", Term::with_language("Notes", "en"))
            .add("urn:title", Term::with_language("Notities", "nl"));
        let dutch: Vec<_> = meta
            .get_all("urn:title")
            .filter(|term| term.language.as_deref() == Some("nl"))
            .collect();
        assert_eq!(dutch.len(), 1);
        assert_eq!(dutch[0].value, "Notities");
        assert_eq!(dutch[0].to_string(), "\"Notities\"@nl");
    }

    #[test]
    fn new_container_classification() {
        let mut meta = RepresentationMetadata::new();
        assert!(!meta.is_new_container());

        meta.add(http::SLUG, "folder/");
        assert!(meta.is_new_container());

        let mut typed = RepresentationMetadata::new();
        typed.add(rdf::TYPE, ldp::BASIC_CONTAINER);
        assert!(typed.is_new_container());
    }

    #[test]
    fn content_type_accessors() {
        let mut meta = RepresentationMetadata::new();
        assert_eq!(meta.content_type(), None);
        meta.set_content_type("text/turtle");
        meta.set_content_type("application/ld+json");
        assert_eq!(meta.content_type(), Some("application/ld+json"));
    }
}
