//! # Reinhardt Embed Remote
//!
//! Embedding of resources served by other HTTP services.
//!
//! A field declared with a [`RemoteResourceEmbedder`] renders its value (an
//! id) by default, and the JSON document fetched from the remote service when
//! the request asks for it with `?embed=<field>`. Deeper paths
//! (`?embed=<field>.other_field`) are forwarded to the remote service as its
//! own `embed` parameters.
//!
//! Error responses are classified by [`map_error_response`] into
//! [`ApiError`](reinhardt_embed_core::ApiError) values.

pub mod embedder;
pub mod response;
pub mod transport;

pub use embedder::{
	EMBED_QUERY_PARAM, IdKwarg, RemoteResourceConfig, RemoteResourceEmbedder,
	RemoteResourceEmbedderBuilder, UrlKwargs, api_resource_field,
};
pub use response::{map_error_response, parse_response};
pub use transport::{HttpTransport, RemoteRequest, RemoteResponse, ReqwestTransport};
