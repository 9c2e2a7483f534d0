use pod_types::{ErrorClassification, ResourceIdentifier, TypeError};

/// Boxed cause attached to a client error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from resource store operations.
///
/// Every variant maps onto an HTTP status through [`StoreError::status_code`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The target resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(ResourceIdentifier),

    /// The request itself is at fault and must not be retried as-is.
    #[error("{message}")]
    BadRequest {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The target exists but does not accept these methods.
    #[error("method not allowed on {identifier}: {}", .methods.join(", "))]
    MethodNotAllowed {
        identifier: ResourceIdentifier,
        methods: Vec<String>,
    },

    /// The request body has a media type the target cannot accept.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The request conflicts with the current state of the target.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A request precondition did not hold.
    #[error("precondition failed for {0}")]
    PreconditionFailed(ResourceIdentifier),

    /// The store does not support this operation.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A remote fetch failed before a response was received.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A malformed identifier or metadata value.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// I/O error while reading or writing a body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// A client error with a message only.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            source: None,
        }
    }

    /// A client error carrying the cause that triggered it.
    pub fn bad_request_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::BadRequest {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } | Self::Type(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::Conflict(_) => 409,
            Self::PreconditionFailed(_) => 412,
            Self::UnsupportedMediaType(_) => 415,
            Self::NotImplemented(_) => 501,
            Self::Fetch { .. } => 502,
            Self::Io(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns `true` for 4xx errors.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns `true` if this is a [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Translate this error into the facts a response can still report
    /// about its target.
    pub fn classification(&self) -> ErrorClassification {
        match self {
            Self::NotFound(_) => ErrorClassification::NotFound,
            Self::MethodNotAllowed { methods, .. } => {
                ErrorClassification::MethodNotAllowed(methods.clone())
            }
            Self::UnsupportedMediaType(_) => ErrorClassification::UnsupportedMediaType,
            _ => ErrorClassification::None,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
