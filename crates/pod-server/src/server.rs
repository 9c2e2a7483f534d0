use std::sync::Arc;

use axum::body::Bytes;
use tokio::net::TcpListener;

use pod_shape::{PermissiveValidator, ShapeTreeStore, ShapeValidator, ValidationError};
use pod_store::{
    CachedWebStorage, InMemoryResourceStore, KeyValueStorage, MemoryKeyValueStorage,
    ResourceStore,
};
use pod_types::vocab::shape;
use pod_types::{Representation, RepresentationMetadata, ResourceIdentifier};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::metadata::MetadataWriterChain;
use crate::router::build_router;

/// Shape lookup shared by the store.
type ShapeStorage = Arc<dyn KeyValueStorage<String, String>>;

/// A validator behind an `Arc`, so one instance can back several stores.
#[derive(Clone)]
struct SharedValidator(Arc<dyn ShapeValidator>);

impl ShapeValidator for SharedValidator {
    fn validate(&self, shape: &str, document: &str) -> Result<(), ValidationError> {
        self.0.validate(shape, document)
    }
}

/// Pod storage server.
pub struct PodServer {
    config: ServerConfig,
    validator: Arc<dyn ShapeValidator>,
}

impl PodServer {
    /// A server that checks shape declarations but not document content.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            validator: Arc::new(PermissiveValidator),
        }
    }

    /// Use `validator` for document content checks.
    pub fn with_validator(mut self, validator: impl ShapeValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Load shape definitions listed in the configuration.
    async fn load_shapes(&self) -> ServerResult<ShapeStorage> {
        let local = MemoryKeyValueStorage::<String, String>::new();
        for source in &self.config.shapes {
            let definition = tokio::fs::read_to_string(&source.path).await.map_err(|e| {
                ServerError::Config(format!(
                    "cannot read shape {} from {}: {e}",
                    source.id,
                    source.path.display()
                ))
            })?;
            local.set(source.id.clone(), definition).await?;
            tracing::debug!(shape = %source.id, path = %source.path.display(), "shape loaded");
        }
        if self.config.fetch_remote_shapes {
            Ok(Arc::new(CachedWebStorage::new(local)))
        } else {
            Ok(Arc::new(local))
        }
    }

    /// Write the root container, declaring the shapes it supports.
    async fn bootstrap(&self, store: &dyn ResourceStore) -> ServerResult<()> {
        let root = ResourceIdentifier::root();
        if store.has_resource(&root).await? {
            return Ok(());
        }
        let mut metadata = RepresentationMetadata::for_identifier(root.clone());
        for supported in &self.config.root_supports_shapes {
            metadata.add(shape::SUPPORTS_SHAPES, supported.as_str());
        }
        store
            .set_representation(&root, Representation::from_bytes(Bytes::new(), metadata), None)
            .await?;
        tracing::info!(
            shapes = self.config.root_supports_shapes.len(),
            "root container created"
        );
        Ok(())
    }

    /// Assemble the store stack and writer chain.
    pub async fn build_state(&self) -> ServerResult<AppState> {
        self.config.validate()?;
        let shapes = self.load_shapes().await?;
        let store: Arc<dyn ResourceStore> = Arc::new(ShapeTreeStore::new(
            InMemoryResourceStore::new(),
            shapes,
            SharedValidator(Arc::clone(&self.validator)),
        ));
        self.bootstrap(store.as_ref()).await?;

        Ok(AppState {
            store,
            writers: Arc::new(MetadataWriterChain::with_default_writers(&self.config)),
            supported_methods: self.config.supported_methods.clone().into(),
            accept_types: Arc::new(self.config.accept_types.clone()),
        })
    }

    /// Build the router (useful for testing).
    pub async fn router(&self) -> ServerResult<axum::Router> {
        Ok(build_router(self.build_state().await?))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router().await?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("Pod server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
