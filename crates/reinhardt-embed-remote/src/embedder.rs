//! Remote resource embedding
//!
//! A [`RemoteResourceEmbedder`] replaces a field value (usually the id of a
//! resource owned by another service) with the JSON document served by that
//! service. The URL is built from a template with an `{id}` placeholder,
//! selected headers of the incoming request are forwarded, and the suffixes
//! forwarded to the field are passed on as repeated `embed` query parameters
//! so that the remote service can embed further.
//!
//! ```
//! use reinhardt_embed_core::EmbeddableField;
//! use reinhardt_embed_remote::{RemoteResourceEmbedder, ReqwestTransport, api_resource_field};
//! use reinhardt_embed_core::EmbedSettings;
//! use std::sync::Arc;
//!
//! let transport = Arc::new(ReqwestTransport::new(&EmbedSettings::default()).unwrap());
//! let embedder = RemoteResourceEmbedder::builder("http://test-endpoint/api/v1/{id}/")
//!     .included_headers(["Authorization"])
//!     .build(transport)
//!     .unwrap();
//! let field = api_resource_field(EmbeddableField::new("external_api_field"), embedder);
//! assert!(field.is_embeddable());
//! ```

use crate::response::parse_response;
use crate::transport::{HttpTransport, RemoteRequest};
use async_trait::async_trait;
use http::header::{HeaderMap, HeaderName};
use http::Method;
use reinhardt_embed_core::{
	EmbedError, EmbedRequestContext, EmbedResult, EmbedSettings, EmbeddableField,
	EmbeddingStrategy, SerializerContext, plain_string,
};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Query parameter carrying forwarded paths to the remote service
pub const EMBED_QUERY_PARAM: &str = "embed";

/// Declarative configuration of a remote resource field
///
/// # Examples
///
/// ```
/// use reinhardt_embed_remote::RemoteResourceConfig;
///
/// let config = RemoteResourceConfig::from_toml_str(
///     r#"
///     url = "http://test-endpoint/api/v1/{id}/"
///     included_headers = ["Authorization"]
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.method, None);
/// assert_eq!(config.included_headers, vec!["Authorization"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResourceConfig {
	/// URL template, `{id}` is replaced by the field value
	pub url: String,

	/// HTTP method, case-insensitive; the settings default applies when absent
	#[serde(default)]
	pub method: Option<String>,

	/// Names of request headers forwarded to the remote service
	#[serde(default, deserialize_with = "deserialize_included_headers")]
	pub included_headers: Vec<String>,
}

fn deserialize_included_headers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => Ok(Vec::new()),
		Some(Value::Array(items)) => items
			.into_iter()
			.map(|item| match item {
				Value::String(name) => Ok(name),
				other => Err(de::Error::custom(format!(
					"included_headers entries must be strings, got {}",
					other
				))),
			})
			.collect(),
		Some(other) => Err(de::Error::custom(format!(
			"included_headers must be None or a list, got {}",
			other
		))),
	}
}

impl RemoteResourceConfig {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			method: None,
			included_headers: Vec::new(),
		}
	}

	/// Parse a configuration from a JSON value
	pub fn from_value(value: Value) -> EmbedResult<Self> {
		serde_json::from_value(value).map_err(|e| {
			EmbedError::configuration(format!("Invalid remote resource configuration: {}", e))
		})
	}

	/// Parse a configuration from a TOML table
	pub fn from_toml_str(content: &str) -> EmbedResult<Self> {
		toml::from_str(content).map_err(|e| {
			EmbedError::configuration(format!("Invalid remote resource configuration: {}", e))
		})
	}
}

/// Computes the placeholders substituted into the URL template
pub trait UrlKwargs: Send + Sync {
	fn url_kwargs(&self, value: &Value) -> Vec<(String, String)>;
}

impl<F> UrlKwargs for F
where
	F: Fn(&Value) -> Vec<(String, String)> + Send + Sync,
{
	fn url_kwargs(&self, value: &Value) -> Vec<(String, String)> {
		self(value)
	}
}

/// Default placeholders: `{id}` is the stringified value
#[derive(Debug, Clone, Copy, Default)]
pub struct IdKwarg;

impl UrlKwargs for IdKwarg {
	fn url_kwargs(&self, value: &Value) -> Vec<(String, String)> {
		vec![("id".to_string(), plain_string(value))]
	}
}

/// Builder of [`RemoteResourceEmbedder`]
pub struct RemoteResourceEmbedderBuilder {
	url: String,
	method: Option<String>,
	included_headers: Vec<String>,
	url_kwargs: Arc<dyn UrlKwargs>,
}

impl RemoteResourceEmbedderBuilder {
	pub fn method(mut self, method: impl Into<String>) -> Self {
		self.method = Some(method.into());
		self
	}

	pub fn included_headers<I, S>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.included_headers = headers.into_iter().map(Into::into).collect();
		self
	}

	pub fn url_kwargs(mut self, url_kwargs: impl UrlKwargs + 'static) -> Self {
		self.url_kwargs = Arc::new(url_kwargs);
		self
	}

	/// Validate the configuration and build the embedder
	///
	/// # Errors
	///
	/// Returns a configuration error for an invalid method or header name.
	pub fn build(self, transport: Arc<dyn HttpTransport>) -> EmbedResult<RemoteResourceEmbedder> {
		let method = self.method.as_deref().unwrap_or("GET").to_ascii_uppercase();
		let method = Method::from_bytes(method.as_bytes())?;
		let included_headers = self
			.included_headers
			.iter()
			.map(|name| HeaderName::from_bytes(name.as_bytes()))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(RemoteResourceEmbedder {
			url: self.url,
			method,
			included_headers,
			url_kwargs: self.url_kwargs,
			transport,
		})
	}
}

/// Embeds a resource fetched from a remote HTTP API
///
/// A `null` field value embeds as `null` without calling the remote service.
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::{EmbedSettings, EmbeddingStrategy, SerializerContext};
/// use reinhardt_embed_remote::{RemoteResourceEmbedder, ReqwestTransport};
/// use serde_json::Value;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let transport = Arc::new(ReqwestTransport::new(&EmbedSettings::default()).unwrap());
/// let embedder = RemoteResourceEmbedder::new("http://test-endpoint/api/v1/{id}/", transport).unwrap();
/// let context = SerializerContext::new().with_embed_fields(Vec::<String>::new());
///
/// let value = embedder.resolve(&Value::Null, &[], &context).await.unwrap();
/// assert_eq!(value, Value::Null);
/// # });
/// ```
pub struct RemoteResourceEmbedder {
	url: String,
	method: Method,
	included_headers: Vec<HeaderName>,
	url_kwargs: Arc<dyn UrlKwargs>,
	transport: Arc<dyn HttpTransport>,
}

impl RemoteResourceEmbedder {
	pub fn builder(url: impl Into<String>) -> RemoteResourceEmbedderBuilder {
		RemoteResourceEmbedderBuilder {
			url: url.into(),
			method: None,
			included_headers: Vec::new(),
			url_kwargs: Arc::new(IdKwarg),
		}
	}

	/// Embedder issuing `GET` requests without forwarded headers
	pub fn new(url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> EmbedResult<Self> {
		Self::builder(url).build(transport)
	}

	/// Build an embedder from a declarative configuration
	///
	/// A configuration without a method uses `settings.default_method`.
	pub fn from_config(
		config: RemoteResourceConfig,
		settings: &EmbedSettings,
		transport: Arc<dyn HttpTransport>,
	) -> EmbedResult<Self> {
		let method = config
			.method
			.unwrap_or_else(|| settings.default_method.clone());
		Self::builder(config.url)
			.method(method)
			.included_headers(config.included_headers)
			.build(transport)
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn method(&self) -> &Method {
		&self.method
	}

	pub fn included_headers(&self) -> &[HeaderName] {
		&self.included_headers
	}

	/// URL of the resource identified by `value`
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_embed_core::EmbedSettings;
	/// use reinhardt_embed_remote::{RemoteResourceEmbedder, ReqwestTransport};
	/// use serde_json::json;
	/// use std::sync::Arc;
	///
	/// let transport = Arc::new(ReqwestTransport::new(&EmbedSettings::default()).unwrap());
	/// let embedder = RemoteResourceEmbedder::new("http://test-endpoint/api/v1/{id}/", transport).unwrap();
	/// assert_eq!(embedder.url_for(&json!(1)).unwrap(), "http://test-endpoint/api/v1/1/");
	/// assert_eq!(embedder.url_for(&json!("abc")).unwrap(), "http://test-endpoint/api/v1/abc/");
	/// ```
	///
	/// Placeholders are read from the template only, so substituted values are
	/// inserted verbatim even when they contain braces.
	///
	/// # Errors
	///
	/// Returns a configuration error when the template names a placeholder the
	/// URL kwargs do not provide.
	pub fn url_for(&self, value: &Value) -> EmbedResult<String> {
		let kwargs = self.url_kwargs.url_kwargs(value);
		let mut url = String::with_capacity(self.url.len());
		let mut rest = self.url.as_str();
		while let Some(start) = rest.find('{') {
			let Some(len) = rest[start..].find('}') else {
				break;
			};
			let name = &rest[start + 1..start + len];
			let replacement = kwargs
				.iter()
				.find(|(key, _)| key == name)
				.map(|(_, replacement)| replacement)
				.ok_or_else(|| {
					EmbedError::configuration(format!(
						"Missing value for placeholder {{{}}} in URL template '{}'",
						name, self.url
					))
				})?;
			url.push_str(&rest[..start]);
			url.push_str(replacement);
			rest = &rest[start + len + 1..];
		}
		url.push_str(rest);
		Ok(url)
	}

	/// Declared headers present (and non-empty) on the incoming request
	pub fn forwarded_headers(&self, request: &EmbedRequestContext) -> HeaderMap {
		let mut headers = HeaderMap::new();
		for name in &self.included_headers {
			match request.headers().get(name) {
				Some(value) if !value.is_empty() => {
					headers.insert(name.clone(), value.clone());
				}
				_ => {}
			}
		}
		headers
	}

	/// The outgoing request for `value`
	pub fn build_request(
		&self,
		value: &Value,
		embed_relations: &[String],
		request: &EmbedRequestContext,
	) -> EmbedResult<RemoteRequest> {
		Ok(RemoteRequest {
			method: self.method.clone(),
			url: self.url_for(value)?,
			headers: self.forwarded_headers(request),
			query: embed_relations
				.iter()
				.map(|path| (EMBED_QUERY_PARAM.to_string(), path.clone()))
				.collect(),
		})
	}
}

#[async_trait]
impl EmbeddingStrategy for RemoteResourceEmbedder {
	#[tracing::instrument(skip_all, fields(method = %self.method, template = %self.url))]
	async fn resolve(
		&self,
		value: &Value,
		embed_relations: &[String],
		context: &SerializerContext,
	) -> EmbedResult<Value> {
		if value.is_null() {
			tracing::trace!("Field value is null, nothing to fetch");
			return Ok(Value::Null);
		}
		let request = context.request().ok_or_else(|| {
			EmbedError::configuration("Remote resource fields require the request in the context.")
		})?;
		let outgoing = self.build_request(value, embed_relations, request)?;
		tracing::debug!(url = %outgoing.url, embed = ?embed_relations, "Fetching remote resource");

		let response = self.transport.send(outgoing).await?;
		tracing::debug!(status = %response.status, "Remote resource responded");
		parse_response(&response)
	}
}

impl fmt::Debug for RemoteResourceEmbedder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RemoteResourceEmbedder")
			.field("url", &self.url)
			.field("method", &self.method)
			.field("included_headers", &self.included_headers)
			.finish()
	}
}

/// Turn `child` into a remote resource field
///
/// The child keeps its name, source and baseline representation; the
/// embedded value is fetched by `embedder`.
pub fn api_resource_field(child: EmbeddableField, embedder: RemoteResourceEmbedder) -> EmbeddableField {
	child.with_strategy(Arc::new(embedder))
}
