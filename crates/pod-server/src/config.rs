use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::{HeaderValue, Method};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Media types accepted per content-modifying method.
///
/// Any list left out of a configuration file is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptTypes {
    pub patch: Vec<String>,
    pub post: Vec<String>,
    pub put: Vec<String>,
}

impl AcceptTypes {
    /// N3 and SPARQL patches; any type for POST and PUT.
    pub fn standard() -> Self {
        Self {
            patch: vec!["text/n3".into(), "application/sparql-update".into()],
            post: vec!["*/*".into()],
            put: vec!["*/*".into()],
        }
    }

    /// The list for `method`, `None` for methods without a body.
    pub fn for_method(&self, method: &str) -> Option<&[String]> {
        match method {
            "PATCH" => Some(&self.patch),
            "POST" => Some(&self.post),
            "PUT" => Some(&self.put),
            _ => None,
        }
    }
}

/// A shape definition loaded from a local file at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeSource {
    /// Identifier documents use to declare the shape.
    pub id: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// HTTP methods the server supports, in `Allow` header order.
    pub supported_methods: Vec<String>,
    /// Shapes documents directly in the root container may declare.
    pub root_supports_shapes: Vec<String>,
    /// Fetch unknown shape identifiers over HTTP.
    pub fetch_remote_shapes: bool,
    pub accept_types: AcceptTypes,
    pub shapes: Vec<ShapeSource>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            supported_methods: ["OPTIONS", "HEAD", "GET", "PATCH", "POST", "PUT", "DELETE"]
                .into_iter()
                .map(String::from)
                .collect(),
            root_supports_shapes: Vec::new(),
            fetch_remote_shapes: false,
            accept_types: AcceptTypes::standard(),
            shapes: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Read and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&text)?;
        if let Some(dir) = path.parent() {
            for shape in &mut config.shapes {
                if shape.path.is_relative() {
                    shape.path = dir.join(&shape.path);
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> ServerResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.supported_methods.is_empty() {
            return Err(ServerError::Config("supported_methods must not be empty".into()));
        }
        for method in &self.supported_methods {
            let valid = Method::from_bytes(method.as_bytes()).is_ok()
                && method.chars().all(|c| c.is_ascii_uppercase());
            if !valid {
                return Err(ServerError::Config(format!(
                    "invalid HTTP method in supported_methods: {method:?}"
                )));
            }
        }
        for (name, types) in [
            ("patch", &self.accept_types.patch),
            ("post", &self.accept_types.post),
            ("put", &self.accept_types.put),
        ] {
            if HeaderValue::from_str(&types.join(", ")).is_err() {
                return Err(ServerError::Config(format!(
                    "accept_types.{name} contains characters not allowed in a header"
                )));
            }
        }
        for shape in &self.shapes {
            if shape.id.trim().is_empty() {
                return Err(ServerError::Config(format!(
                    "shape loaded from {} has an empty id",
                    shape.path.display()
                )));
            }
        }
        Ok(())
    }
}
