use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use pod_store::{ResourceStore, StoreError, StoreResult};
use pod_types::{Representation, RepresentationMetadata, ResourceIdentifier};

use crate::config::AcceptTypes;
use crate::input::{content_type, is_accepted, parse_conditions, parse_request_metadata};
use crate::metadata::{MetadataWriterChain, ResponseMetadata};

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResourceStore>,
    pub writers: Arc<MetadataWriterChain>,
    pub supported_methods: Arc<[String]>,
    pub accept_types: Arc<AcceptTypes>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// A successful request, before headers are written.
struct Outcome {
    status: StatusCode,
    metadata: ResponseMetadata,
    body: Bytes,
    location: Option<ResourceIdentifier>,
}

impl Outcome {
    fn new(status: StatusCode, metadata: ResponseMetadata) -> Self {
        Self {
            status,
            metadata,
            body: Bytes::new(),
            location: None,
        }
    }
}

/// Serves every resource path from the store.
pub async fn resource_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let identifier = match ResourceIdentifier::parse(uri.path()) {
        Ok(identifier) => identifier,
        Err(e) => return error_response(&state, &method, None, e.into()),
    };

    match dispatch(&state, &method, &identifier, &headers, body).await {
        Ok(outcome) => {
            tracing::debug!(%method, %identifier, status = %outcome.status, "request handled");
            let mut response = Response::new(Body::from(outcome.body));
            *response.status_mut() = outcome.status;
            let response_headers = response.headers_mut();
            state.writers.write_all(response_headers, &outcome.metadata);
            if let Some(location) = outcome.location {
                if let Ok(value) = HeaderValue::from_str(location.as_str()) {
                    response_headers.insert(LOCATION, value);
                }
            }
            response
        }
        Err(err) => error_response(&state, &method, Some(identifier), err),
    }
}

async fn dispatch(
    state: &AppState,
    method: &Method,
    identifier: &ResourceIdentifier,
    headers: &HeaderMap,
    body: Bytes,
) -> StoreResult<Outcome> {
    if !state.supported_methods.iter().any(|m| m == method.as_str()) {
        return Err(method_not_allowed(method, identifier));
    }
    let conditions = parse_conditions(headers);
    let conditions = conditions.as_ref();
    let store = &state.store;

    match *method {
        Method::GET => {
            let representation = store.get_representation(identifier, conditions).await?;
            let (data, metadata) = representation.into_parts();
            let mut outcome = Outcome::new(StatusCode::OK, ResponseMetadata::from_resource(metadata));
            outcome.body = data.read_to_bytes().await?;
            Ok(outcome)
        }
        Method::HEAD => {
            let metadata = store.head_metadata(identifier, conditions).await?;
            Ok(Outcome::new(StatusCode::OK, ResponseMetadata::from_resource(metadata)))
        }
        Method::OPTIONS => {
            let metadata = store.head_metadata(identifier, conditions).await?;
            Ok(Outcome::new(
                StatusCode::NO_CONTENT,
                ResponseMetadata::from_resource(metadata),
            ))
        }
        Method::POST => {
            let representation = request_representation(state, method, None, headers, body)?;
            let created = store
                .add_resource(identifier, representation, conditions)
                .await?;
            let mut outcome = Outcome::new(StatusCode::CREATED, ResponseMetadata::empty());
            outcome.location = Some(created);
            Ok(outcome)
        }
        Method::PUT => {
            let representation =
                request_representation(state, method, Some(identifier), headers, body)?;
            let changed = store
                .set_representation(identifier, representation, conditions)
                .await?;
            // A new resource changes its parent's containment.
            let created = identifier
                .parent()
                .is_some_and(|parent| changed.contains(&parent));
            if created {
                let mut outcome = Outcome::new(StatusCode::CREATED, ResponseMetadata::empty());
                outcome.location = Some(identifier.clone());
                Ok(outcome)
            } else {
                Ok(Outcome::new(StatusCode::RESET_CONTENT, ResponseMetadata::empty()))
            }
        }
        Method::PATCH => {
            let patch = request_representation(state, method, Some(identifier), headers, body)?;
            store.modify_resource(identifier, patch, conditions).await?;
            Ok(Outcome::new(StatusCode::RESET_CONTENT, ResponseMetadata::empty()))
        }
        Method::DELETE => {
            store.delete_resource(identifier, conditions).await?;
            Ok(Outcome::new(StatusCode::RESET_CONTENT, ResponseMetadata::empty()))
        }
        _ => Err(method_not_allowed(method, identifier)),
    }
}

fn method_not_allowed(method: &Method, identifier: &ResourceIdentifier) -> StoreError {
    StoreError::MethodNotAllowed {
        identifier: identifier.clone(),
        methods: vec![method.as_str().to_string()],
    }
}

/// Build the representation carried by a PATCH, POST or PUT.
///
/// Rejects media types outside the configured list for `method`.
fn request_representation(
    state: &AppState,
    method: &Method,
    identifier: Option<&ResourceIdentifier>,
    headers: &HeaderMap,
    body: Bytes,
) -> StoreResult<Representation> {
    let media_type = content_type(headers)?;
    let accepted = state
        .accept_types
        .for_method(method.as_str())
        .unwrap_or_default();
    if !is_accepted(accepted, media_type.as_deref()) {
        return Err(StoreError::UnsupportedMediaType(
            media_type.unwrap_or_default(),
        ));
    }

    let mut metadata: RepresentationMetadata = parse_request_metadata(headers)?;
    if let Some(identifier) = identifier {
        metadata.set_identifier(identifier.clone());
    }
    Ok(Representation::from_bytes(body, metadata))
}

fn error_response(
    state: &AppState,
    method: &Method,
    identifier: Option<ResourceIdentifier>,
    err: StoreError,
) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let target = identifier
        .as_ref()
        .map_or_else(String::new, |id| id.to_string());
    if err.is_client_error() {
        tracing::debug!(%method, target = %target, %status, error = %err, "request rejected");
    } else {
        tracing::error!(%method, target = %target, error = %err, "request failed");
    }

    let metadata = ResponseMetadata::from_error(identifier, &err);
    let mut response = (status, format!("{err}\n")).into_response();
    let headers = response.headers_mut();
    state.writers.write_all(headers, &metadata);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}
