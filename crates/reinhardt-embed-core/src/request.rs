//! Originating request
//!
//! Embedding only needs two things from the incoming HTTP request: its query
//! parameters (for the repeatable `embed` parameter) and its headers (for
//! header forwarding to remote resources). [`EmbedRequestContext`] keeps a
//! copy of both so that it can be shared with nested serializers.

use crate::exception::{EmbedError, EmbedResult};
use http::HeaderMap;
use http::header::AsHeaderName;

/// Query parameters and headers of the request that triggered serialization
#[derive(Debug, Clone, Default)]
pub struct EmbedRequestContext {
	query: Vec<(String, String)>,
	headers: HeaderMap,
}

impl EmbedRequestContext {
	/// Create a context from a raw query string and a header map
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_embed_core::EmbedRequestContext;
	/// use http::HeaderMap;
	///
	/// let request = EmbedRequestContext::new(Some("embed=parent&embed=children.parent"), HeaderMap::new()).unwrap();
	/// assert_eq!(request.query_params_getlist("embed"), vec!["parent", "children.parent"]);
	/// ```
	pub fn new(query: Option<&str>, headers: HeaderMap) -> EmbedResult<Self> {
		let query = match query {
			Some(query) if !query.is_empty() => serde_urlencoded::from_str(query)
				.map_err(|e| EmbedError::Serialization(format!("Invalid query string: {}", e)))?,
			_ => Vec::new(),
		};
		Ok(Self { query, headers })
	}

	/// Create a context from the parts of an `http::Request`
	pub fn from_parts(parts: &http::request::Parts) -> EmbedResult<Self> {
		Self::new(parts.uri.query(), parts.headers.clone())
	}

	/// Create a context from an `http::Request`
	pub fn from_request<B>(request: &http::Request<B>) -> EmbedResult<Self> {
		Self::new(request.uri().query(), request.headers().clone())
	}

	/// All values of a repeatable query parameter, in request order
	pub fn query_params_getlist(&self, key: &str) -> Vec<String> {
		self.query
			.iter()
			.filter(|(name, _)| name == key)
			.map(|(_, value)| value.clone())
			.collect()
	}

	/// Value of a header, if present and valid UTF-8
	///
	/// Lookup is case-insensitive.
	pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}
}
