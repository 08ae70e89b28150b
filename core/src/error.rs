//! Error types for the story-schematics client.
//!
//! # Design
//! Five kinds form the service taxonomy: `Forbidden`, `Unauthorized`,
//! `NotFound`, `Validation` and `Internal`. Each carries a human-readable
//! message and is told apart by `kind()` / the `is_*` predicates, never by
//! inspecting the message. Failures that are not an HTTP status (a body that
//! does not match its schema, a broken connection, a bad base URL) get their
//! own variants and report `kind() == None`.

use crate::http::{HttpResponse, ResponseBody};

/// The five status-derived error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Forbidden,
    Unauthorized,
    NotFound,
    Validation,
    Internal,
}

/// Errors returned by the client's parse methods and by `StorySchematicsApi`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the content of the request.
    #[error("validation: {0}")]
    Validation(String),

    /// Any other non-2xx status. Presumed transient.
    #[error("internal: {0}")]
    Internal(String),

    /// A request form or a 2xx response body did not match its schema.
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP exchange did not produce a response.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    /// Build the taxonomy error for `kind`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Forbidden => ApiError::Forbidden(message),
            ErrorKind::Unauthorized => ApiError::Unauthorized(message),
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::Validation => ApiError::Validation(message),
            ErrorKind::Internal => ApiError::Internal(message),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Forbidden(_) => Some(ErrorKind::Forbidden),
            ApiError::Unauthorized(_) => Some(ErrorKind::Unauthorized),
            ApiError::NotFound(_) => Some(ErrorKind::NotFound),
            ApiError::Validation(_) => Some(ErrorKind::Validation),
            ApiError::Internal(_) => Some(ErrorKind::Internal),
            ApiError::Schema(_)
            | ApiError::Serialization(_)
            | ApiError::Config(_)
            | ApiError::Transport(_) => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.kind() == Some(ErrorKind::Forbidden)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == Some(ErrorKind::Unauthorized)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == Some(ErrorKind::Validation)
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == Some(ErrorKind::Internal)
    }
}

/// A request form or response body failed decoding or validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {entity}: {errors}")]
    Invalid {
        entity: &'static str,
        errors: validator::ValidationErrors,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("story schematics api base url is not set (expected {0})")]
    MissingBaseUrl(&'static str),

    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// The transport could not complete the exchange (DNS, connect, TLS, ...).
#[derive(Debug, thiserror::Error)]
#[error("transport: {0}")]
pub struct TransportError(pub String);

/// Render a diagnostic for a non-2xx response.
///
/// Never fails: a body that could not be read is reported inline as
/// `read response: {error}`.
pub fn error_response_message(context: &str, response: &HttpResponse) -> String {
    let text = match &response.body {
        ResponseBody::Empty => {
            return format!("{context}: unexpected status code {}", response.status);
        }
        ResponseBody::Text(text) => text.clone(),
        ResponseBody::Unreadable(err) => format!("read response: {err}"),
    };
    format!("{context}: [{}] {text}", response.status)
}
