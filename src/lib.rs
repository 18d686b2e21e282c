//! # Reinhardt Embed
//!
//! Request-driven embedding of related data for Reinhardt serializers.
//!
//! Clients choose which relations to expand inline with a repeatable query
//! parameter:
//!
//! ```text
//! GET /children/?embed=parent.root&embed=external_api_field
//! ```
//!
//! - `parent` is replaced by the serialized parent object, whose `root` is in
//!   turn replaced by the serialized root object;
//! - `external_api_field` is replaced by the document fetched from a remote
//!   service;
//! - every other field renders exactly as it would without embedding.
//!
//! ## Feature Flags
//!
//! - `minimal` - Local relation embedding only
//! - `remote` - Remote resource embedding through `reqwest`
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```
//! use reinhardt_embed::prelude::*;
//! use serde_json::{Value, json};
//! use std::sync::Arc;
//!
//! struct Roots;
//!
//! #[async_trait]
//! impl RelationSource for Roots {
//!     async fn get(&self, _model: &str, pk: &Value) -> EmbedResult<Option<Record>> {
//!         Ok(into_record(json!({"id": pk, "name": "Root"})))
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let registry = Arc::new(SchemaRegistry::new());
//! registry.register(ModelSchema::new("RootModel").field("name"));
//! let parent = ModelSchema::new("ParentModel").field("str_field").foreign_key("root", "RootModel");
//! let serializer = EmbeddableSerializer::from_schema(&parent, registry, Arc::new(Roots));
//!
//! let context = SerializerContext::new().with_embed_fields(["root"]);
//! let record = into_record(json!({"id": 1, "str_field": "Parent", "root": 1})).unwrap();
//! let value = serializer.initialize(&context).unwrap().to_representation(&record).await.unwrap();
//!
//! assert_eq!(
//!     value,
//!     json!({"id": 1, "str_field": "Parent", "root": {"id": 1, "name": "Root"}})
//! );
//! # });
//! ```

pub use reinhardt_embed_core as core;

#[cfg(feature = "remote")]
pub use reinhardt_embed_remote as remote;

pub use reinhardt_embed_core::{
	ApiError, BoundField, BoundSerializer, EmbedError, EmbedRelations, EmbedRequestContext,
	EmbedResult, EmbedSettings, EmbeddableField, EmbeddableSerializer, EmbeddingStrategy,
	FieldKind, LocalRelationStrategy, ModelSchema, Record, RelationSource, SchemaRegistry,
	SerializerContext, SerializerFormatter, split_embed_relations,
};

#[cfg(feature = "remote")]
pub use reinhardt_embed_remote::{
	HttpTransport, RemoteResourceConfig, RemoteResourceEmbedder, ReqwestTransport,
	api_resource_field, map_error_response,
};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::{
		ApiError, BoundSerializer, EmbedError, EmbedRequestContext, EmbedResult, EmbedSettings,
		EmbeddableField, EmbeddableSerializer, EmbeddingStrategy, LocalRelationStrategy,
		ModelSchema, Record, RelationSource, SchemaRegistry, SerializerContext,
		SerializerFormatter,
	};
	pub use reinhardt_embed_core::field::{FieldsFormatter, Many, PrimaryKey};
	pub use reinhardt_embed_core::into_record;

	#[cfg(feature = "remote")]
	pub use crate::{
		HttpTransport, RemoteResourceConfig, RemoteResourceEmbedder, ReqwestTransport,
		api_resource_field,
	};

	// External
	pub use async_trait::async_trait;
}
