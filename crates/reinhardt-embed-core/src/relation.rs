//! Local relation embedding
//!
//! [`LocalRelationStrategy`] replaces a primary key with the serialized
//! related object. Objects are fetched through a [`RelationSource`], the
//! data-access seam of the embedding system, and rendered by a nested
//! embeddable serializer that receives the forwarded suffixes as its embed
//! paths. That is how `parent.root` reaches the `root` field of the parent.

use crate::context::SerializerContext;
use crate::exception::{EmbedError, EmbedResult};
use crate::record::Record;
use crate::schema::SchemaRegistry;
use crate::serializer::EmbeddableSerializer;
use crate::strategy::EmbeddingStrategy;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Looks up related objects by primary key
#[async_trait]
pub trait RelationSource: Send + Sync {
	/// Fetch the object of `model` whose primary key is `pk`
	///
	/// Returns `Ok(None)` when no such object exists.
	async fn get(&self, model: &str, pk: &Value) -> EmbedResult<Option<Record>>;
}

/// Embeds a related object stored in the local data source
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::{
///     EmbeddableField, EmbeddableSerializer, EmbedResult, LocalRelationStrategy, Record,
///     RelationSource,
/// };
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use std::sync::Arc;
///
/// struct Empty;
///
/// #[async_trait]
/// impl RelationSource for Empty {
///     async fn get(&self, _model: &str, _pk: &Value) -> EmbedResult<Option<Record>> {
///         Ok(None)
///     }
/// }
///
/// let root_serializer = Arc::new(
///     EmbeddableSerializer::builder("RootModel").field(EmbeddableField::new("name")).build(),
/// );
/// let strategy = LocalRelationStrategy::new("RootModel", Arc::new(Empty))
///     .with_serializer(root_serializer);
/// assert_eq!(strategy.related_model(), "RootModel");
/// assert!(!strategy.is_many());
/// ```
pub struct LocalRelationStrategy {
	related_model: String,
	many: bool,
	source: Arc<dyn RelationSource>,
	registry: Option<Arc<SchemaRegistry>>,
	serializer: OnceLock<Arc<EmbeddableSerializer>>,
}

impl LocalRelationStrategy {
	pub fn new(related_model: impl Into<String>, source: Arc<dyn RelationSource>) -> Self {
		Self {
			related_model: related_model.into(),
			many: false,
			source,
			registry: None,
			serializer: OnceLock::new(),
		}
	}

	/// Treat the field value as a list of primary keys
	pub fn many(mut self) -> Self {
		self.many = true;
		self
	}

	/// Render related objects with an explicit serializer
	pub fn with_serializer(self, serializer: Arc<EmbeddableSerializer>) -> Self {
		// A fresh OnceLock cannot already be set.
		let _ = self.serializer.set(serializer);
		self
	}

	/// Registry used to build the default serializer of the related model
	pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
		self.registry = Some(registry);
		self
	}

	pub fn related_model(&self) -> &str {
		&self.related_model
	}

	pub fn is_many(&self) -> bool {
		self.many
	}

	/// The serializer used for related objects
	///
	/// Without an explicit one, the default serializer of the related model is
	/// built from its schema on first use and reused afterwards.
	pub fn serializer(&self) -> EmbedResult<Arc<EmbeddableSerializer>> {
		if let Some(serializer) = self.serializer.get() {
			return Ok(Arc::clone(serializer));
		}
		let registry = self.registry.as_ref().ok_or_else(|| {
			EmbedError::configuration(format!(
				"Relation to '{}' has neither a serializer nor a schema registry",
				self.related_model
			))
		})?;
		let schema = registry.require(&self.related_model)?;
		tracing::debug!(model = %self.related_model, "Building default embeddable serializer");
		let built = Arc::new(EmbeddableSerializer::from_schema(
			&schema,
			Arc::clone(registry),
			Arc::clone(&self.source),
		));
		Ok(Arc::clone(self.serializer.get_or_init(|| built)))
	}

	async fn render_one(
		&self,
		serializer: &EmbeddableSerializer,
		pk: &Value,
		context: &SerializerContext,
	) -> EmbedResult<Value> {
		if pk.is_null() {
			return Ok(Value::Null);
		}
		let record = self
			.source
			.get(&self.related_model, pk)
			.await?
			.ok_or_else(|| EmbedError::DoesNotExist {
				model: self.related_model.clone(),
				pk: pk.clone(),
			})?;
		serializer
			.initialize(context)?
			.to_representation(&record)
			.await
	}
}

#[async_trait]
impl EmbeddingStrategy for LocalRelationStrategy {
	async fn resolve(
		&self,
		value: &Value,
		embed_relations: &[String],
		context: &SerializerContext,
	) -> EmbedResult<Value> {
		let nested = context.child(embed_relations.to_vec())?;
		let serializer = self.serializer()?;

		if !self.many {
			return self.render_one(&serializer, value, &nested).await;
		}

		let pks = match value {
			Value::Array(pks) => pks.as_slice(),
			Value::Null => &[][..],
			other => {
				return Err(EmbedError::Serialization(format!(
					"Expected a list of primary keys for '{}' but got {}",
					self.related_model, other
				)));
			}
		};
		let mut rendered = Vec::with_capacity(pks.len());
		for pk in pks {
			rendered.push(self.render_one(&serializer, pk, &nested).await?);
		}
		Ok(Value::Array(rendered))
	}
}

impl fmt::Debug for LocalRelationStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalRelationStrategy")
			.field("related_model", &self.related_model)
			.field("many", &self.many)
			.field("has_serializer", &self.serializer.get().is_some())
			.finish()
	}
}
