use std::sync::Arc;

use async_trait::async_trait;
use pod_types::{Conditions, Representation, RepresentationMetadata, ResourceIdentifier};

use crate::error::{StoreError, StoreResult};

/// Storage of resources and containers addressed by identifier.
///
/// Stores compose: a decorator owns an inner store, implements this trait
/// itself, and forwards the operations it does not change. Conditions are
/// opaque to decorators and evaluated only by the backing store.
///
/// Implementations must not hold a lock across an `.await`.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Check whether a resource exists.
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<bool>;

    /// Read the representation of a resource.
    ///
    /// Returns [`StoreError::NotFound`] if it does not exist.
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Representation>;

    /// Read only the metadata of a resource.
    ///
    /// The default reads the full representation and drops its body stream
    /// unread. Backends that can answer from metadata alone should override.
    async fn head_metadata(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<RepresentationMetadata> {
        let (data, metadata) = self
            .get_representation(identifier, conditions)
            .await?
            .into_parts();
        drop(data);
        Ok(metadata)
    }

    /// Create a new member of `container` and return its identifier.
    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&Conditions>,
    ) -> StoreResult<ResourceIdentifier>;

    /// Create or replace the resource at `identifier`.
    ///
    /// Returns every identifier whose state changed, including containers
    /// created along the way. When the resource did not exist before, its
    /// parent container is listed too.
    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Vec<ResourceIdentifier>>;

    /// Delete a resource. Returns every identifier whose state changed.
    async fn delete_resource(
        &self,
        identifier: &ResourceIdentifier,
        conditions: Option<&Conditions>,
    ) -> StoreResult<Vec<ResourceIdentifier>>;

    /// Apply a patch document to a resource.
    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        _patch: Representation,
        _conditions: Option<&Conditions>,
    ) -> StoreResult<Vec<ResourceIdentifier>> {
        Err(StoreError::NotImplemented(format!(
            "patching {identifier} is not supported"
        )))
    }
}

macro_rules! forward_resource_store {
    ($ty:ty) => {
        #[async_trait]
        impl<T: ResourceStore + ?Sized> ResourceStore for $ty {
            async fn has_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<bool> {
                (**self).has_resource(identifier).await
            }

            async fn get_representation(
                &self,
                identifier: &ResourceIdentifier,
                conditions: Option<&Conditions>,
            ) -> StoreResult<Representation> {
                (**self).get_representation(identifier, conditions).await
            }

            async fn head_metadata(
                &self,
                identifier: &ResourceIdentifier,
                conditions: Option<&Conditions>,
            ) -> StoreResult<RepresentationMetadata> {
                (**self).head_metadata(identifier, conditions).await
            }

            async fn add_resource(
                &self,
                container: &ResourceIdentifier,
                representation: Representation,
                conditions: Option<&Conditions>,
            ) -> StoreResult<ResourceIdentifier> {
                (**self)
                    .add_resource(container, representation, conditions)
                    .await
            }

            async fn set_representation(
                &self,
                identifier: &ResourceIdentifier,
                representation: Representation,
                conditions: Option<&Conditions>,
            ) -> StoreResult<Vec<ResourceIdentifier>> {
                (**self)
                    .set_representation(identifier, representation, conditions)
                    .await
            }

            async fn delete_resource(
                &self,
                identifier: &ResourceIdentifier,
                conditions: Option<&Conditions>,
            ) -> StoreResult<Vec<ResourceIdentifier>> {
                (**self).delete_resource(identifier, conditions).await
            }

            async fn modify_resource(
                &self,
                identifier: &ResourceIdentifier,
                patch: Representation,
                conditions: Option<&Conditions>,
            ) -> StoreResult<Vec<ResourceIdentifier>> {
                (**self)
                    .modify_resource(identifier, patch, conditions)
                    .await
            }
        }
    };
}

forward_resource_store!(Arc<T>);
forward_resource_store!(Box<T>);
