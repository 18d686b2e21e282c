//! Serializer context
//!
//! The context tells an embeddable serializer where its embed paths come
//! from. A top-level serializer reads them from the request; a nested
//! serializer receives the suffixes forwarded by its parent field. The
//! context also carries the request itself (for header forwarding), the
//! settings and the current nesting depth.

use crate::exception::{EmbedError, EmbedResult};
use crate::request::EmbedRequestContext;
use crate::settings::EmbedSettings;
use std::sync::Arc;

/// Per-request state handed to [`EmbeddableSerializer::initialize`](crate::EmbeddableSerializer::initialize)
#[derive(Debug, Clone, Default)]
pub struct SerializerContext {
	request: Option<Arc<EmbedRequestContext>>,
	embed_fields: Option<Vec<String>>,
	settings: Arc<EmbedSettings>,
	depth: usize,
}

impl SerializerContext {
	/// Create an empty context (no request, no explicit embed fields)
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a top-level context for a request
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_embed_core::{EmbedRequestContext, SerializerContext};
	/// use http::HeaderMap;
	///
	/// let request = EmbedRequestContext::new(Some("embed=parent"), HeaderMap::new()).unwrap();
	/// let context = SerializerContext::for_request(request);
	/// assert_eq!(context.requested_embed_fields().unwrap(), vec!["parent"]);
	/// assert_eq!(context.depth(), 0);
	/// ```
	pub fn for_request(request: EmbedRequestContext) -> Self {
		Self::new().with_request(Arc::new(request))
	}

	pub fn with_request(mut self, request: Arc<EmbedRequestContext>) -> Self {
		self.request = Some(request);
		self
	}

	/// Supply the embed paths explicitly instead of reading the request
	pub fn with_embed_fields<I, S>(mut self, embed_fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.embed_fields = Some(embed_fields.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_settings(mut self, settings: Arc<EmbedSettings>) -> Self {
		self.settings = settings;
		self
	}

	pub fn request(&self) -> Option<&Arc<EmbedRequestContext>> {
		self.request.as_ref()
	}

	pub fn embed_fields(&self) -> Option<&[String]> {
		self.embed_fields.as_deref()
	}

	pub fn settings(&self) -> &EmbedSettings {
		&self.settings
	}

	pub fn depth(&self) -> usize {
		self.depth
	}

	/// The embed paths this serializer must honor
	///
	/// Explicit embed fields win over the request. Without either, the
	/// serializer cannot know what to embed.
	pub fn requested_embed_fields(&self) -> EmbedResult<Vec<String>> {
		if let Some(fields) = &self.embed_fields {
			return Ok(fields.clone());
		}
		match &self.request {
			Some(request) => Ok(request.query_params_getlist(&self.settings.query_param)),
			None => Err(EmbedError::configuration(
				"This serializer requires that the request is sent in the context.",
			)),
		}
	}

	/// Context for a nested serializer receiving forwarded suffixes
	///
	/// The request and settings are shared; the depth grows by one and is
	/// only checked when `max_depth` is set.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_embed_core::SerializerContext;
	///
	/// let context = SerializerContext::new().with_embed_fields(["parent.root"]);
	/// let child = context.child(vec!["root".to_string()]).unwrap();
	/// assert_eq!(child.depth(), 1);
	/// assert_eq!(child.embed_fields().unwrap(), ["root".to_string()]);
	/// ```
	pub fn child(&self, embed_fields: Vec<String>) -> EmbedResult<Self> {
		let depth = self.depth + 1;
		match self.settings.max_depth {
			Some(max_depth) if depth > max_depth => {
				return Err(EmbedError::MaxDepthExceeded { depth, max_depth });
			}
			_ => {}
		}
		Ok(Self {
			request: self.request.clone(),
			embed_fields: Some(embed_fields),
			settings: Arc::clone(&self.settings),
			depth,
		})
	}
}
