//! Error types for embedding
//!
//! [`ApiError`] is the classification of a failed remote response. It is what
//! the client of the outer API eventually sees: its status code and detail
//! become the response status and body. [`EmbedError`] wraps it together with
//! configuration, lookup and transport failures.

use crate::record::plain_string;
use http::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

/// Detail rendered for errors that carry no message of their own
pub const DEFAULT_ERROR_DETAIL: &str = "A server error occurred.";

/// Classified error response of an embedded remote resource
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
	/// The remote service rejected the input (HTTP 400); the body is kept as-is
	#[error("Remote validation failed: {detail}")]
	Validation { detail: Value },

	/// The remote service answered with an object carrying a `message`
	///
	/// `code` is kept for callers but is not part of the response body.
	#[error("{message}")]
	Messaged {
		status: StatusCode,
		message: String,
		code: Option<String>,
	},

	/// The remote service answered with a list of item failures
	#[error("Remote service returned {} error(s) with status {}", .detail.len(), .status)]
	List { status: StatusCode, detail: Vec<Value> },

	/// Anything else, including bodies that are not JSON
	#[error("A server error occurred.")]
	Generic,
}

impl ApiError {
	/// Status code reported to the client
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_embed_core::ApiError;
	/// use http::StatusCode;
	///
	/// assert_eq!(ApiError::Generic.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
	/// ```
	pub fn status_code(&self) -> StatusCode {
		match self {
			ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
			ApiError::Messaged { status, .. } | ApiError::List { status, .. } => *status,
			ApiError::Generic => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Response body reported to the client
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_embed_core::ApiError;
	/// use http::StatusCode;
	/// use serde_json::json;
	///
	/// let error = ApiError::Messaged {
	///     status: StatusCode::NOT_FOUND,
	///     message: "Not found".to_string(),
	///     code: None,
	/// };
	/// assert_eq!(error.detail(), json!({"detail": "Not found"}));
	/// ```
	pub fn detail(&self) -> Value {
		match self {
			ApiError::Validation { detail } => detail.clone(),
			ApiError::Messaged { message, .. } => json!({ "detail": message }),
			ApiError::List { detail, .. } => Value::Array(detail.clone()),
			ApiError::Generic => json!({ "detail": DEFAULT_ERROR_DETAIL }),
		}
	}
}

/// Errors raised while configuring or rendering embedded fields
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbedError {
	/// The remote resource answered with an error response
	#[error(transparent)]
	Api(#[from] ApiError),

	/// Setup-time contract violation
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// The related object referenced by a primary key does not exist
	#[error("Invalid pk \"{}\" - object does not exist.", plain_string(.pk))]
	DoesNotExist { model: String, pk: Value },

	/// The HTTP request could not be completed
	#[error("Transport error: {0}")]
	Transport(String),

	/// Nested embedding went deeper than the configured limit
	#[error("Maximum embedding depth exceeded: depth={depth}, max={max_depth}")]
	MaxDepthExceeded { depth: usize, max_depth: usize },

	/// The data-access collaborator failed
	#[error("Relation source error: {0}")]
	Source(String),

	/// A value could not be converted
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl EmbedError {
	pub fn configuration(message: impl Into<String>) -> Self {
		EmbedError::Configuration(message.into())
	}

	/// Status code reported to the client
	pub fn status_code(&self) -> StatusCode {
		match self {
			EmbedError::Api(error) => error.status_code(),
			EmbedError::DoesNotExist { .. } => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Response body reported to the client
	pub fn detail(&self) -> Value {
		match self {
			EmbedError::Api(error) => error.detail(),
			EmbedError::DoesNotExist { .. } => json!({ "detail": self.to_string() }),
			_ => json!({ "detail": DEFAULT_ERROR_DETAIL }),
		}
	}

	/// Check if this error came from a remote error response
	pub fn is_api_error(&self) -> bool {
		matches!(self, EmbedError::Api(_))
	}

	/// Check if this is a setup-time error
	pub fn is_configuration_error(&self) -> bool {
		matches!(self, EmbedError::Configuration(_))
	}
}

impl From<serde_json::Error> for EmbedError {
	fn from(error: serde_json::Error) -> Self {
		EmbedError::Serialization(error.to_string())
	}
}

impl From<http::header::InvalidHeaderName> for EmbedError {
	fn from(error: http::header::InvalidHeaderName) -> Self {
		EmbedError::Configuration(format!("Invalid header name: {}", error))
	}
}

impl From<http::method::InvalidMethod> for EmbedError {
	fn from(error: http::method::InvalidMethod) -> Self {
		EmbedError::Configuration(format!("Invalid HTTP method: {}", error))
	}
}

/// Result type for embedding operations
pub type EmbedResult<T> = Result<T, EmbedError>;
