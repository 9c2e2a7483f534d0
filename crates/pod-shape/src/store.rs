use async_trait::async_trait;
use pod_store::{KeyValueStorage, ResourceStore, StoreError, StoreResult};
use pod_types::vocab::shape;
use pod_types::{
    Conditions, DataStream, Representation, RepresentationMetadata, ResourceIdentifier,
};

use crate::validator::ShapeValidator;

/// Store decorator that only lets shape-conforming documents through.
///
/// - Creating a document in a container requires the document to declare a
///   shape the container supports, and the body to validate against that
///   shape's definition.
/// - Replacing a document validates the new body against the shape recorded
///   on the stored document, which its container must still support.
/// - Containers pass through; their shape support is plain metadata.
///
/// Every rejection happens before the inner store is asked to write.
pub struct ShapeTreeStore<S, K, V> {
    source: S,
    shapes: K,
    validator: V,
}

impl<S, K, V> ShapeTreeStore<S, K, V>
where
    S: ResourceStore,
    K: KeyValueStorage<String, String>,
    V: ShapeValidator,
{
    pub fn new(source: S, shapes: K, validator: V) -> Self {
        Self {
            source,
            shapes,
            validator,
        }
    }

    /// The wrapped store.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reject `shape_id` unless `container` lists it as supported.
    async fn check_supported(
        &self,
        container: &ResourceIdentifier,
        shape_id: &str,
    ) -> StoreResult<()> {
        let container_metadata = self.source.head_metadata(container, None).await?;
        if container_metadata.has(shape::SUPPORTS_SHAPES, Some(shape_id)) {
            Ok(())
        } else {
            Err(StoreError::bad_request(format!(
                "Shape is not supported in this container: {shape_id}"
            )))
        }
    }

    /// Validate the body of `representation` against `shape_id` and return
    /// the representation with a fresh, unread body.
    async fn validate_document(
        &self,
        shape_id: &str,
        representation: Representation,
    ) -> StoreResult<Representation> {
        let definition = self
            .shapes
            .get(&shape_id.to_string())
            .await?
            .ok_or_else(|| StoreError::bad_request(format!("No shape file found for {shape_id}")))?;

        let binary = representation.binary;
        let (data, metadata) = representation.into_parts();
        let document = data.read_to_string().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                StoreError::bad_request_with("Document body is not valid UTF-8", e)
            } else {
                StoreError::Io(e)
            }
        })?;

        self.validator
            .validate(&definition, &document)
            .map_err(|e| {
                tracing::debug!(shape = %shape_id, error = %e, "document rejected by shape");
                StoreError::bad_request_with(
                    format!("Data does not conform to shape {shape_id}"),
                    e,
                )
            })?;

        Ok(Representation {
            data: DataStream::from_bytes(document),
            metadata,
            binary,
        })
    }
}

/// The single shape a document declares, if any.
fn declared_shape(metadata: &RepresentationMetadata) -> StoreResult<Option<String>> {
    Ok(metadata
        .get_single(shape::HAS_SHAPE)?
        .map(|term| term.value.clone()))
}

fn missing_shape() -> StoreError {
    StoreError::bad_request("Documents need to identify their shape.")
}

#[async_trait]
impl<S, K, V> ResourceStore for ShapeTreeStore<S, K, V>
where
    S: ResourceStore,
    K: KeyValueStorage<String, String>,
    V: ShapeValidator,
{
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<bool> {
        self.source.has_resource(identifier).await
    }

    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Representation> {
        self.source.get_representation(identifier, conditions).await
    }

    async fn head_metadata(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<RepresentationMetadata> {
        self.source.head_metadata(identifier, conditions).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&Conditions>,
    ) -> StoreResult<ResourceIdentifier> {
        if representation.metadata.is_new_container() {
            return self
                .source
                .add_resource(container, representation, conditions)
                .await;
        }

        let shape_id = declared_shape(&representation.metadata)?.ok_or_else(missing_shape)?;

        self.check_supported(container, &shape_id).await?;

        let representation = self.validate_document(&shape_id, representation).await?;
        tracing::debug!(%container, shape = %shape_id, "document conforms to shape");
        self.source
            .add_resource(container, representation, conditions)
            .await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        mut representation: Representation,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Vec<ResourceIdentifier>> {
        let stored = match self.source.head_metadata(identifier, None).await {
            Ok(metadata) => metadata,
            Err(e) if e.is_not_found() => {
                // Root metadata is written during startup before the root exists.
                tracing::debug!(%identifier, "target does not exist yet, writing without shape check");
                return self
                    .source
                    .set_representation(identifier, representation, conditions)
                    .await;
            }
            Err(e) => return Err(e),
        };

        if identifier.is_container() {
            return self
                .source
                .set_representation(identifier, representation, conditions)
                .await;
        }

        let shape_id = declared_shape(&stored)?.ok_or_else(missing_shape)?;
        match declared_shape(&representation.metadata)? {
            Some(declared) if declared != shape_id => {
                return Err(StoreError::bad_request(format!(
                    "Shape of {identifier} cannot change from {shape_id} to {declared}"
                )));
            }
            Some(_) => {}
            None => {
                representation
                    .metadata
                    .add(shape::HAS_SHAPE, shape_id.as_str());
            }
        }
        if let Some(container) = identifier.parent() {
            self.check_supported(&container, &shape_id).await?;
        }

        let representation = self.validate_document(&shape_id, representation).await?;
        tracing::debug!(%identifier, shape = %shape_id, "replacement conforms to shape");
        self.source
            .set_representation(identifier, representation, conditions)
            .await
    }

    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Vec<ResourceIdentifier>> {
        self.source.delete_resource(identifier, conditions).await
    }

    // Patches are forwarded unvalidated.
    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        patch: Representation,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Vec<ResourceIdentifier>> {
        self.source
            .modify_resource(identifier, patch, conditions)
            .await
    }
}
