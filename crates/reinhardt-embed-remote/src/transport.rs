//! HTTP transport
//!
//! The embedder talks to remote APIs through the [`HttpTransport`] trait so
//! that tests can replace the network with a mock. [`ReqwestTransport`] is the
//! production implementation.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use reinhardt_embed_core::{EmbedError, EmbedResult, EmbedSettings};
use reqwest::Client;

/// Outgoing call to a remote resource
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
	pub method: Method,
	pub url: String,
	pub headers: HeaderMap,
	/// Query pairs, `embed` repeated once per forwarded path
	pub query: Vec<(String, String)>,
}

impl RemoteRequest {
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			headers: HeaderMap::new(),
			query: Vec::new(),
		}
	}

	/// All values of a query parameter, in order
	pub fn query_values(&self, key: &str) -> Vec<&str> {
		self.query
			.iter()
			.filter(|(name, _)| name == key)
			.map(|(_, value)| value.as_str())
			.collect()
	}
}

/// Response of a remote resource
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
	pub status: StatusCode,
	pub body: Bytes,
}

impl RemoteResponse {
	pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	/// Response with a JSON body
	pub fn json(status: StatusCode, body: &serde_json::Value) -> Self {
		Self::new(status, body.to_string())
	}

	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}
}

/// Sends requests to remote resources
#[async_trait]
pub trait HttpTransport: Send + Sync {
	/// Send `request` and return the raw response
	///
	/// Any received response is `Ok`, whatever its status. Connection
	/// failures and timeouts are [`EmbedError::Transport`].
	async fn send(&self, request: RemoteRequest) -> EmbedResult<RemoteResponse>;
}

/// [`HttpTransport`] backed by a `reqwest` client
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::EmbedSettings;
/// use reinhardt_embed_remote::ReqwestTransport;
///
/// let transport = ReqwestTransport::new(&EmbedSettings::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: Client,
}

impl ReqwestTransport {
	/// Create a transport applying the configured request timeout
	pub fn new(settings: &EmbedSettings) -> EmbedResult<Self> {
		let client = Client::builder()
			.timeout(settings.request_timeout())
			.build()
			.map_err(|e| EmbedError::configuration(format!("Failed to create HTTP client: {}", e)))?;
		Ok(Self { client })
	}

	/// Create a transport with a custom client
	pub fn with_client(client: Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
	async fn send(&self, request: RemoteRequest) -> EmbedResult<RemoteResponse> {
		let response = self
			.client
			.request(request.method, &request.url)
			.headers(request.headers)
			.query(&request.query)
			.send()
			.await
			.map_err(|e| transport_error(&request.url, e))?;

		let status = response.status();
		let body = response
			.bytes()
			.await
			.map_err(|e| transport_error(&request.url, e))?;
		Ok(RemoteResponse { status, body })
	}
}

fn transport_error(url: &str, error: reqwest::Error) -> EmbedError {
	if error.is_timeout() {
		EmbedError::Transport(format!("Request to {} timed out", url))
	} else {
		EmbedError::Transport(format!("Request to {} failed: {}", url, error))
	}
}
