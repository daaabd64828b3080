// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! Reducers and renderers never fail; everything that talks to Notion,
//! the filesystem, or user-supplied JSON returns one of these.

use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
///
/// Instead of matching against magic strings like `"rate_limited"`,
/// the codes Notion reports are encoded in the type system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded
    RateLimited,
    /// The requested object does not exist or is not shared with the integration
    ObjectNotFound,
    /// Token is invalid or expired
    Unauthorized,
    /// Token lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation (bad filter, bad sort)
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    /// Whether this error means the stored credentials are no good.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::HttpStatus(401))
    }

    /// Whether this error means the resource simply doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound | Self::HttpStatus(404))
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API returned an error ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    QueryParse(#[from] QueryParseError),

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),

    #[error(transparent)]
    NotionClient(#[from] NotionClientError),
}

impl AppError {
    /// The typed Notion error code, when the failure came from the API.
    pub fn notion_code(&self) -> Option<NotionErrorCode> {
        match self {
            AppError::NotionService { code, .. } => Some(code.clone()),
            AppError::NotionClient(NotionClientError::NotionApi { code, .. }) => {
                Some(NotionErrorCode::from_api_response(code))
            }
            _ => None,
        }
    }

    /// Whether Notion rejected the access token.
    pub fn is_auth_failure(&self) -> bool {
        self.notion_code().is_some_and(|code| code.is_auth_failure())
    }

    /// A follow-up instruction to show next to the error, if there is one.
    pub fn hint(&self) -> Option<&'static str> {
        self.is_auth_failure().then_some(REAUTHENTICATE_HINT)
    }
}

/// Shown when the stored or environment token is rejected.
pub const REAUTHENTICATE_HINT: &str =
    "Authenticate again with `noon auth --token <token>` or update NOTION_TOKEN";

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Errors decoded from Notion API response bodies.
#[derive(Error, Debug)]
pub enum NotionClientError {
    #[error("Failed to deserialize response: {source}\nBody: {body}")]
    Deserialization {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Notion API error ({status}): {code} - {message}")]
    NotionApi {
        status: u32,
        code: String,
        message: String,
        request_id: Option<String>,
    },
}

impl From<notion_client::objects::error::Error> for NotionClientError {
    fn from(error: notion_client::objects::error::Error) -> Self {
        Self::NotionApi {
            status: error.status,
            code: error.code,
            message: error.message,
            request_id: error.request_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Query parse errors
// ---------------------------------------------------------------------------

/// Which user-supplied query argument failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Filter,
    Sorts,
}

impl fmt::Display for QueryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter => write!(f, "filter"),
            Self::Sorts => write!(f, "sorts"),
        }
    }
}

/// Why a query argument was rejected.
#[derive(Debug)]
pub enum QueryParseCause {
    /// The text is not valid JSON.
    Syntax(serde_json::Error),
    /// The text is JSON, but not the shape the field requires.
    Shape(String),
}

/// A filter or sorts argument that could not be turned into a query.
///
/// Kept distinct from [`AppError::MalformedResponse`] so callers can show
/// a one-line message instead of treating it as a transport failure.
#[derive(Debug)]
pub struct QueryParseError {
    pub field: QueryField,
    pub cause: QueryParseCause,
}

impl QueryParseError {
    pub fn syntax(field: QueryField, source: serde_json::Error) -> Self {
        Self {
            field,
            cause: QueryParseCause::Syntax(source),
        }
    }

    pub fn shape(field: QueryField, message: impl Into<String>) -> Self {
        Self {
            field,
            cause: QueryParseCause::Shape(message.into()),
        }
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(self.cause, QueryParseCause::Syntax(_))
    }
}

impl fmt::Display for QueryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            QueryParseCause::Syntax(e) => write!(f, "Invalid JSON in {}: {}", self.field, e),
            QueryParseCause::Shape(message) => write!(f, "Invalid {}: {}", self.field, message),
        }
    }
}

impl std::error::Error for QueryParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            QueryParseCause::Syntax(e) => Some(e),
            QueryParseCause::Shape(_) => None,
        }
    }
}
