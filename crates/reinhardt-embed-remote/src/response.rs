//! Remote response handling
//!
//! Successful responses (2xx) become the embedded value. Anything else is
//! classified into an [`ApiError`] so that the outer API can answer with a
//! meaningful status and body.

use crate::transport::RemoteResponse;
use http::StatusCode;
use reinhardt_embed_core::{ApiError, EmbedResult, plain_string};
use serde_json::Value;

/// Classify an error response
///
/// The first matching rule wins:
///
/// 1. a body that is not JSON is a generic error
/// 2. status 400 is a validation error carrying the whole body
/// 3. an object with a `message` keeps the message, the optional `code` and the status
/// 4. a list (unless the status is 503) is reported as is with the status
/// 5. anything else is a generic error
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use reinhardt_embed_core::ApiError;
/// use reinhardt_embed_remote::map_error_response;
///
/// let error = map_error_response(StatusCode::NOT_FOUND, br#"{"message": "Not found", "code": "missing"}"#);
/// assert_eq!(
///     error,
///     ApiError::Messaged {
///         status: StatusCode::NOT_FOUND,
///         message: "Not found".to_string(),
///         code: Some("missing".to_string()),
///     }
/// );
/// ```
pub fn map_error_response(status: StatusCode, body: &[u8]) -> ApiError {
	let Ok(data) = serde_json::from_slice::<Value>(body) else {
		return ApiError::Generic;
	};

	if status == StatusCode::BAD_REQUEST {
		return ApiError::Validation { detail: data };
	}

	match data {
		Value::Object(object) if object.contains_key("message") => ApiError::Messaged {
			status,
			message: object.get("message").map(plain_string).unwrap_or_default(),
			code: object
				.get("code")
				.filter(|code| !code.is_null())
				.map(plain_string),
		},
		Value::Array(items) if status != StatusCode::SERVICE_UNAVAILABLE => ApiError::List {
			status,
			detail: items,
		},
		_ => ApiError::Generic,
	}
}

/// Turn a remote response into the embedded value
///
/// A 2xx body that is empty or not JSON embeds as `null`.
pub fn parse_response(response: &RemoteResponse) -> EmbedResult<Value> {
	if response.is_success() {
		return Ok(serde_json::from_slice(&response.body).unwrap_or(Value::Null));
	}

	let error = map_error_response(response.status, &response.body);
	tracing::warn!(
		status = %response.status,
		classified_status = %error.status_code(),
		"Remote resource returned an error response"
	);
	Err(error.into())
}
