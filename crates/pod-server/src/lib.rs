//! HTTP server for Pod.
//!
//! Serves an in-memory resource store through a [`pod_shape::ShapeTreeStore`]
//! so that documents must declare and conform to a shape their container
//! supports. Every response passes through a chain of metadata writers that
//! advertise what the client may do next (`Allow`, `Accept-*`, `Link`).

pub mod config;
pub mod error;
pub mod handler;
pub mod input;
pub mod metadata;
pub mod router;
pub mod server;

pub use config::{AcceptTypes, ServerConfig, ShapeSource};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use metadata::{
    AllowAcceptMetadataWriter, Capabilities, MetadataWriter, MetadataWriterChain,
    ResponseMetadata,
};
pub use server::PodServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use pod_shape::ValidationError;
    use pod_types::vocab::{pim, shape};
    use tower::util::ServiceExt;

    const NOTE: &str = "https://shapes.example/note";
    const EVENT: &str = "https://shapes.example/event";

    /// Root supports the note shape, whose definition is loaded from disk.
    fn note_config() -> (ServerConfig, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.shex");
        std::fs::write(&path, "note shape").unwrap();
        let config = ServerConfig {
            root_supports_shapes: vec![NOTE.into()],
            shapes: vec![ShapeSource {
                id: NOTE.into(),
                path,
            }],
            ..Default::default()
        };
        (config, dir)
    }

    async fn app(config: ServerConfig) -> Router {
        PodServer::new(config).router().await.unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_note(uri: &str, slug: &str, shape_id: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "text/turtle")
            .header("slug", slug);
        if let Some(shape_id) = shape_id {
            builder = builder.header("link", format!("<{shape_id}>; rel=\"{}\"", shape::HAS_SHAPE));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
        response.headers().get(name).map(|v| v.to_str().unwrap())
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = app(ServerConfig::default()).await;
        let response = send(&app, get(router::HEALTH_PATH)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let health: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(health["status"], "ok");
    }

    #[tokio::test]
    async fn root_advertises_capabilities() {
        let app = app(ServerConfig::default()).await;
        let response = send(&app, get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header(&response, "allow"),
            Some("OPTIONS, HEAD, GET, PATCH, POST, PUT")
        );
        assert_eq!(header(&response, "accept-post"), Some("*/*"));
        assert_eq!(header(&response, "content-type"), Some("text/turtle"));
        let storage_link = format!("<{}>; rel=\"type\"", pim::STORAGE);
        assert!(response
            .headers()
            .get_all("link")
            .iter()
            .any(|v| v.to_str().unwrap() == storage_link));
    }

    #[tokio::test]
    async fn missing_resource_allows_only_creation() {
        let app = app(ServerConfig::default()).await;
        let response = send(&app, get("/missing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(header(&response, "allow"), Some("PATCH, PUT"));
        assert!(header(&response, "accept-patch").is_some());
        assert!(header(&response, "accept-put").is_some());
        assert_eq!(header(&response, "accept-post"), None);
    }

    #[tokio::test]
    async fn head_and_options() {
        let app = app(ServerConfig::default()).await;
        let head = send(
            &app,
            Request::builder().method("HEAD").uri("/").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(head.status(), StatusCode::OK);
        assert!(head.headers().contains_key("etag"));
        assert!(body_string(head).await.is_empty());

        let options = send(
            &app,
            Request::builder().method("OPTIONS").uri("/").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(options.status(), StatusCode::NO_CONTENT);
        assert!(header(&options, "allow").is_some());
    }

    #[tokio::test]
    async fn create_without_shape_is_rejected() {
        let (config, _dir) = note_config();
        let app = app(config).await;
        let response = send(&app, post_note("/", "first", None, "<> a <#Note>.")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(header(&response, "allow"), None);
        assert_eq!(
            body_string(response).await,
            "Documents need to identify their shape.\n"
        );
        assert_eq!(send(&app, get("/first")).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_with_unsupported_shape_is_rejected() {
        let (config, _dir) = note_config();
        let app = app(config).await;
        let response = send(&app, post_note("/", "first", Some(EVENT), "<> a <#Event>.")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response)
            .await
            .contains("Shape is not supported in this container: https://shapes.example/event"));
    }

    #[tokio::test]
    async fn create_with_supported_shape() {
        let (config, _dir) = note_config();
        let app = app(config).await;
        let response = send(&app, post_note("/", "first", Some(NOTE), "<> a <#Note>.")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(header(&response, "location"), Some("/first"));

        let document = send(&app, get("/first")).await;
        assert_eq!(document.status(), StatusCode::OK);
        assert_eq!(
            header(&document, "allow"),
            Some("OPTIONS, HEAD, GET, PATCH, PUT, DELETE")
        );
        let shape_link = format!("<{NOTE}>; rel=\"{}\"", shape::HAS_SHAPE);
        assert!(document
            .headers()
            .get_all("link")
            .iter()
            .any(|v| v.to_str().unwrap() == shape_link));
        assert_eq!(body_string(document).await, "<> a <#Note>.");

        // Storage roots never offer DELETE, members or not.
        let root = send(&app, get("/")).await;
        assert_eq!(
            header(&root, "allow"),
            Some("OPTIONS, HEAD, GET, PATCH, POST, PUT")
        );
    }

    #[tokio::test]
    async fn nonconforming_document_is_rejected() {
        fn requires_title(_shape: &str, document: &str) -> Result<(), ValidationError> {
            if document.contains("title") {
                Ok(())
            } else {
                Err(ValidationError::new("missing title"))
            }
        }

        let (config, _dir) = note_config();
        let app = PodServer::new(config)
            .with_validator(requires_title)
            .router()
            .await
            .unwrap();

        let rejected = send(&app, post_note("/", "a", Some(NOTE), "<> a <#Note>.")).await;
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(rejected).await,
            format!("Data does not conform to shape {NOTE}\n")
        );

        let accepted = send(
            &app,
            post_note("/", "b", Some(NOTE), "<> <#title> \"Groceries\"."),
        )
        .await;
        assert_eq!(accepted.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn put_creates_then_replaces_with_stored_shape() {
        let (config, _dir) = note_config();
        let app = app(config).await;
        let container = Request::builder()
            .method("PUT")
            .uri("/notes/")
            .header("content-type", "text/turtle")
            .header("link", format!("<{NOTE}>; rel=\"{}\"", shape::SUPPORTS_SHAPES))
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, container).await.status(), StatusCode::CREATED);

        let create = Request::builder()
            .method("PUT")
            .uri("/notes/a")
            .header("content-type", "text/turtle")
            .header("link", format!("<{NOTE}>; rel=\"{}\"", shape::HAS_SHAPE))
            .body(Body::from("<> a <#Note>."))
            .unwrap();
        let response = send(&app, create).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(header(&response, "location"), Some("/notes/a"));

        let replace = Request::builder()
            .method("PUT")
            .uri("/notes/a")
            .header("content-type", "text/turtle")
            .body(Body::from("<> a <#Note>; <#done> true."))
            .unwrap();
        assert_eq!(send(&app, replace).await.status(), StatusCode::RESET_CONTENT);

        let document = send(&app, get("/notes/a")).await;
        let shape_link = format!("<{NOTE}>; rel=\"{}\"", shape::HAS_SHAPE);
        assert!(document
            .headers()
            .get_all("link")
            .iter()
            .any(|v| v.to_str().unwrap() == shape_link));
        assert_eq!(body_string(document).await, "<> a <#Note>; <#done> true.");
    }

    #[tokio::test]
    async fn replacing_outside_supported_container_is_rejected() {
        let (config, _dir) = note_config();
        let app = app(config).await;
        let put = |body: &'static str| {
            Request::builder()
                .method("PUT")
                .uri("/drafts/a")
                .header("content-type", "text/turtle")
                .header("link", format!("<{NOTE}>; rel=\"{}\"", shape::HAS_SHAPE))
                .body(Body::from(body))
                .unwrap()
        };
        // `/drafts/` is created on the way and supports no shapes.
        assert_eq!(send(&app, put("<> a <#Note>.")).await.status(), StatusCode::CREATED);

        let response = send(&app, put("<> a <#Note>; <#done> true.")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response)
            .await
            .contains("Shape is not supported in this container: https://shapes.example/note"));
    }

    #[tokio::test]
    async fn deleting_the_root_is_not_allowed() {
        let app = app(ServerConfig::default()).await;
        let response = send(
            &app,
            Request::builder().method("DELETE").uri("/").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            header(&response, "allow"),
            Some("OPTIONS, HEAD, GET, PATCH, POST, PUT")
        );
    }

    #[tokio::test]
    async fn unsupported_method_is_not_allowed() {
        let app = app(ServerConfig::default()).await;
        let response = send(
            &app,
            Request::builder().method("TRACE").uri("/").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(!header(&response, "allow").unwrap().contains("TRACE"));
    }

    #[tokio::test]
    async fn unsupported_media_type_lists_accepted_types() {
        let mut config = ServerConfig::default();
        config.accept_types.post = vec!["text/turtle".into()];
        let app = app(config).await;
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(header(&response, "allow"), None);
        assert_eq!(header(&response, "accept-post"), Some("text/turtle"));
        assert_eq!(header(&response, "accept-put"), Some("*/*"));
    }

    #[tokio::test]
    async fn patch_is_not_implemented() {
        let app = app(ServerConfig::default()).await;
        let request = Request::builder()
            .method("PATCH")
            .uri("/")
            .header("content-type", "text/n3")
            .body(Body::from("@prefix solid: <http://www.w3.org/ns/solid/terms#>."))
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(header(&response, "allow"), None);
    }

    #[tokio::test]
    async fn failed_precondition() {
        let app = app(ServerConfig::default()).await;
        let request = Request::builder()
            .uri("/")
            .header("if-none-match", "*")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[tokio::test]
    async fn invalid_paths_are_bad_requests() {
        let app = app(ServerConfig::default()).await;
        let response = send(&app, get("/a//b")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
