//! Embedding strategies
//!
//! A strategy produces the embedded value of a field from its baseline value
//! (usually a primary key). Two strategies ship with the framework:
//! [`LocalRelationStrategy`](crate::relation::LocalRelationStrategy) and the
//! remote resource embedder of `reinhardt-embed-remote`.

use crate::context::SerializerContext;
use crate::exception::EmbedResult;
use async_trait::async_trait;
use serde_json::Value;

/// Produces the embedded representation of a field
#[async_trait]
pub trait EmbeddingStrategy: Send + Sync {
	/// Resolve the embedded value
	///
	/// # Arguments
	///
	/// * `value` - The baseline representation of the field
	/// * `embed_relations` - Suffixes forwarded to this field
	/// * `context` - Context of the serializer owning the field
	async fn resolve(
		&self,
		value: &Value,
		embed_relations: &[String],
		context: &SerializerContext,
	) -> EmbedResult<Value>;
}
