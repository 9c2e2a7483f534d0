use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use pod_types::vocab::{dc, http, ldp, pim, rdf};
use pod_types::{Conditions, Representation, RepresentationMetadata, ResourceIdentifier};

use crate::error::{StoreError, StoreResult};
use crate::traits::ResourceStore;

/// Types the store derives on read and never persists.
const MANAGED_TYPES: [&str; 4] = [
    ldp::RESOURCE,
    ldp::CONTAINER,
    ldp::BASIC_CONTAINER,
    pim::STORAGE,
];

/// A stored resource: body bytes plus the metadata supplied on write.
#[derive(Clone, Debug)]
struct StoredResource {
    data: Bytes,
    metadata: RepresentationMetadata,
    modified: DateTime<Utc>,
    etag: String,
}

impl StoredResource {
    fn new(data: Bytes, metadata: RepresentationMetadata) -> Self {
        let modified = Utc::now();
        let etag = compute_etag(&data, &metadata, modified);
        Self {
            data,
            metadata,
            modified,
            etag,
        }
    }

    fn touch(&mut self) {
        self.modified = Utc::now();
        self.etag = compute_etag(&self.data, &self.metadata, self.modified);
    }
}

fn compute_etag(data: &[u8], metadata: &RepresentationMetadata, modified: DateTime<Utc>) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(data);
    for (predicate, term) in metadata.iter() {
        hasher.update(predicate.as_bytes());
        hasher.update(term.value.as_bytes());
    }
    hasher.update(modified.to_rfc3339().as_bytes());
    let hash = hasher.finalize();
    format!("\"{}\"", hex::encode(&hash.as_bytes()[..8]))
}

/// Drop assertions the store derives itself.
fn sanitize(mut metadata: RepresentationMetadata) -> RepresentationMetadata {
    for class in MANAGED_TYPES {
        while metadata.remove(rdf::TYPE, class) {}
    }
    metadata
        .remove_all(ldp::CONTAINS)
        .remove_all(http::SLUG)
        .remove_all(http::ETAG)
        .remove_all(dc::MODIFIED);
    metadata
}

/// The same path in the other form (`/a` <-> `/a/`).
fn other_form(identifier: &ResourceIdentifier) -> Option<ResourceIdentifier> {
    let value = identifier.as_str();
    let flipped = if identifier.is_container() {
        value.trim_end_matches('/').to_string()
    } else {
        format!("{value}/")
    };
    ResourceIdentifier::parse(flipped).ok()
}

/// In-memory, `BTreeMap`-based resource store.
///
/// Intended for tests and embedding. Containers are ordinary entries whose
/// identifier ends in `/`; membership is derived from identifiers on read.
/// Any resource without a parent is a storage root.
pub struct InMemoryResourceStore {
    resources: RwLock<BTreeMap<ResourceIdentifier, StoredResource>>,
}

impl InMemoryResourceStore {
    /// Create a new empty store. Not even the root exists yet.
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored resources, containers included.
    pub fn len(&self) -> usize {
        self.read_map().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_map(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<ResourceIdentifier, StoredResource>>> {
        self.resources
            .read()
            .map_err(|_| StoreError::Internal("lock poisoned".into()))
    }

    fn write_map(
        &self,
    ) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<ResourceIdentifier, StoredResource>>> {
        self.resources
            .write()
            .map_err(|_| StoreError::Internal("lock poisoned".into()))
    }

    /// Metadata as seen by readers: stored assertions plus derived facts.
    fn describe(
        map: &BTreeMap<ResourceIdentifier, StoredResource>,
        identifier: &ResourceIdentifier,
        stored: &StoredResource,
    ) -> RepresentationMetadata {
        let mut metadata = RepresentationMetadata::for_identifier(identifier.clone());
        metadata.add(rdf::TYPE, ldp::RESOURCE);
        if identifier.is_container() {
            metadata
                .add(rdf::TYPE, ldp::CONTAINER)
                .add(rdf::TYPE, ldp::BASIC_CONTAINER);
            if identifier.is_root() {
                metadata.add(rdf::TYPE, pim::STORAGE);
            }
            for member in Self::members(map, identifier) {
                metadata.add(ldp::CONTAINS, member);
            }
        }
        metadata.extend(&stored.metadata);
        metadata
            .set(
                dc::MODIFIED,
                stored.modified.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .set(http::ETAG, stored.etag.as_str());
        if identifier.is_container() && metadata.content_type().is_none() {
            metadata.set_content_type("text/turtle");
        }
        metadata
    }

    fn members<'a>(
        map: &'a BTreeMap<ResourceIdentifier, StoredResource>,
        container: &'a ResourceIdentifier,
    ) -> impl Iterator<Item = &'a ResourceIdentifier> + 'a {
        map.range(container.clone()..)
            .map(|(id, _)| id)
            .take_while(move |id| id.as_str().starts_with(container.as_str()))
            .filter(move |id| id.parent().as_ref() == Some(container))
    }

    fn container_listing(metadata: &RepresentationMetadata) -> Bytes {
        let mut body = String::from(
            "@prefix ldp: <http://www.w3.org/ns/ldp#>.\n\n<> a ldp:Container, ldp:BasicContainer",
        );
        let members: Vec<_> = metadata.get_all(ldp::CONTAINS).collect();
        if !members.is_empty() {
            body.push_str(";\n    ldp:contains");
            for (i, member) in members.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                let _ = write!(body, "{sep}<{}>", member.value);
            }
        }
        body.push_str(".\n");
        Bytes::from(body)
    }

    fn check_conditions(
        identifier: &ResourceIdentifier,
        existing: Option<&StoredResource>,
        conditions: Option<&Conditions>,
    ) -> StoreResult<()> {
        let Some(conditions) = conditions else {
            return Ok(());
        };
        let matches = conditions.matches(
            existing.map(|r| r.etag.as_str()),
            existing.map(|r| r.modified),
        );
        if matches {
            Ok(())
        } else {
            Err(StoreError::PreconditionFailed(identifier.clone()))
        }
    }

    /// Create every missing ancestor of `identifier` as an empty container.
    fn ensure_ancestors(
        map: &mut BTreeMap<ResourceIdentifier, StoredResource>,
        identifier: &ResourceIdentifier,
        changed: &mut Vec<ResourceIdentifier>,
    ) -> StoreResult<()> {
        let mut missing = Vec::new();
        let mut cursor = identifier.parent();
        while let Some(ancestor) = cursor {
            if map.contains_key(&ancestor) {
                break;
            }
            if let Some(doc) = other_form(&ancestor) {
                if map.contains_key(&doc) {
                    return Err(StoreError::Conflict(format!(
                        "{doc} is a document and cannot contain {identifier}"
                    )));
                }
            }
            cursor = ancestor.parent();
            missing.push(ancestor);
        }
        for ancestor in missing.into_iter().rev() {
            tracing::debug!(container = %ancestor, "creating intermediate container");
            map.insert(
                ancestor.clone(),
                StoredResource::new(Bytes::new(), RepresentationMetadata::new()),
            );
            changed.push(ancestor);
        }
        Ok(())
    }

    fn touch_parent(
        map: &mut BTreeMap<ResourceIdentifier, StoredResource>,
        identifier: &ResourceIdentifier,
        changed: &mut Vec<ResourceIdentifier>,
    ) {
        if let Some(parent) = identifier.parent() {
            if let Some(stored) = map.get_mut(&parent) {
                stored.touch();
                if !changed.contains(&parent) {
                    changed.push(parent);
                }
            }
        }
    }
}

impl Default for InMemoryResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<bool> {
        Ok(self.read_map()?.contains_key(identifier))
    }

    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Representation> {
        let map = self.read_map()?;
        let stored = map
            .get(identifier)
            .ok_or_else(|| StoreError::NotFound(identifier.clone()))?;
        Self::check_conditions(identifier, Some(stored), conditions)?;

        let metadata = Self::describe(&map, identifier, stored);
        let data = if identifier.is_container() {
            Self::container_listing(&metadata)
        } else {
            stored.data.clone()
        };
        Ok(Representation::from_bytes(data, metadata))
    }

    async fn head_metadata(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<RepresentationMetadata> {
        let map = self.read_map()?;
        let stored = map
            .get(identifier)
            .ok_or_else(|| StoreError::NotFound(identifier.clone()))?;
        Self::check_conditions(identifier, Some(stored), conditions)?;
        Ok(Self::describe(&map, identifier, stored))
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&Conditions>,
    ) -> StoreResult<ResourceIdentifier> {
        if !container.is_container() {
            return Err(StoreError::MethodNotAllowed {
                identifier: container.clone(),
                methods: vec!["POST".into()],
            });
        }
        let is_container = representation.metadata.is_new_container();
        let slug = representation
            .metadata
            .get(http::SLUG)
            .map(|term| term.value.trim_matches('/').to_string())
            .filter(|slug| !slug.is_empty() && !slug.contains('/'));
        let (data, metadata) = representation.into_parts();
        let data = data.read_to_bytes().await?;

        let mut map = self.write_map()?;
        let parent = map
            .get(container)
            .ok_or_else(|| StoreError::NotFound(container.clone()))?;
        Self::check_conditions(container, Some(parent), conditions)?;

        let child = |name: &str| {
            if is_container {
                container.join_container(name)
            } else {
                container.join(name)
            }
        };
        let taken = |id: &ResourceIdentifier| {
            map.contains_key(id) || other_form(id).is_some_and(|other| map.contains_key(&other))
        };
        let identifier = match slug.map(|slug| child(&slug)).transpose()? {
            Some(id) if !taken(&id) => id,
            _ => child(&uuid::Uuid::now_v7().to_string())?,
        };

        let data = if is_container { Bytes::new() } else { data };
        map.insert(identifier.clone(), StoredResource::new(data, sanitize(metadata)));
        let mut changed = Vec::new();
        Self::touch_parent(&mut map, &identifier, &mut changed);
        tracing::debug!(%identifier, "resource created");
        Ok(identifier)
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Vec<ResourceIdentifier>> {
        let (data, metadata) = representation.into_parts();
        let data = data.read_to_bytes().await?;
        let data = if identifier.is_container() { Bytes::new() } else { data };

        let mut map = self.write_map()?;
        if let Some(other) = other_form(identifier) {
            if map.contains_key(&other) {
                return Err(StoreError::Conflict(format!(
                    "{other} already exists; {identifier} cannot be created next to it"
                )));
            }
        }
        let existing = map.get(identifier);
        Self::check_conditions(identifier, existing, conditions)?;
        let is_new = existing.is_none();

        let mut changed = Vec::new();
        Self::ensure_ancestors(&mut map, identifier, &mut changed)?;
        map.insert(identifier.clone(), StoredResource::new(data, sanitize(metadata)));
        if is_new {
            Self::touch_parent(&mut map, identifier, &mut changed);
        }
        changed.push(identifier.clone());
        tracing::debug!(%identifier, created = is_new, "representation written");
        Ok(changed)
    }

    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Vec<ResourceIdentifier>> {
        if identifier.is_root() {
            return Err(StoreError::MethodNotAllowed {
                identifier: identifier.clone(),
                methods: vec!["DELETE".into()],
            });
        }
        let mut map = self.write_map()?;
        let existing = map
            .get(identifier)
            .ok_or_else(|| StoreError::NotFound(identifier.clone()))?;
        Self::check_conditions(identifier, Some(existing), conditions)?;
        if identifier.is_container() && Self::members(&map, identifier).next().is_some() {
            return Err(StoreError::Conflict(
                "Can only delete empty containers.".into(),
            ));
        }

        map.remove(identifier);
        let mut changed = vec![identifier.clone()];
        Self::touch_parent(&mut map, identifier, &mut changed);
        tracing::debug!(%identifier, "resource deleted");
        Ok(changed)
    }
}

impl std::fmt::Debug for InMemoryResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryResourceStore")
            .field("resource_count", &self.len())
            .finish()
    }
}
