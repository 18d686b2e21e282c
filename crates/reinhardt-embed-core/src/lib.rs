//! # Reinhardt Embed Core
//!
//! Request-driven field embedding for Reinhardt serializers.
//!
//! A client asks for related data inline through a repeatable query
//! parameter (`?embed=parent.root&embed=children`). Fields named by the
//! request render an embedded value instead of their baseline value (usually
//! a primary key); deeper path levels are forwarded to the nested serializer.
//!
//! ## Building blocks
//!
//! - [`split_embed_relations`]: turns embed paths into a one-level relation map
//! - [`EmbeddableField`] / [`BoundField`]: field definition and its per-request overlay
//! - [`EmbeddingStrategy`]: how an embedded value is produced
//! - [`LocalRelationStrategy`]: embeds related objects from a [`RelationSource`]
//! - [`EmbeddableSerializer`] / [`BoundSerializer`]: declaration and per-request rendering
//! - [`SerializerFormatter`]: renders an embedded payload with a nested serializer
//! - [`SerializerContext`]: request, explicit embed fields, settings and depth
//!
//! Remote resources (HTTP APIs) are embedded by `reinhardt-embed-remote`.

pub mod context;
pub mod exception;
pub mod field;
pub mod paths;
pub mod record;
pub mod relation;
pub mod request;
pub mod schema;
pub mod serializer;
pub mod settings;
pub mod strategy;

pub use context::SerializerContext;
pub use exception::{ApiError, DEFAULT_ERROR_DETAIL, EmbedError, EmbedResult};
pub use field::{
	BoundField, DictFormatter, EmbeddableField, FieldRepresentation, FieldsFormatter, Many,
	OutputFormatter, Passthrough, PrimaryKey,
};
pub use paths::{EmbedRelations, split_embed_relations};
pub use record::{Record, into_record, plain_string};
pub use relation::{LocalRelationStrategy, RelationSource};
pub use request::EmbedRequestContext;
pub use schema::{FieldKind, FieldSchema, ModelSchema, SchemaRegistry};
pub use serializer::{
	BoundSerializer, EmbeddableSerializer, EmbeddableSerializerBuilder, SerializerFormatter,
};
pub use settings::EmbedSettings;
pub use strategy::EmbeddingStrategy;
