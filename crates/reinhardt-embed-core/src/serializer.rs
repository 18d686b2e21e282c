//! Embeddable serializers
//!
//! An [`EmbeddableSerializer`] is the shared, immutable declaration of a set
//! of fields. For each request it is initialized into a [`BoundSerializer`],
//! which reads the requested embed paths from the context, splits them and
//! flags the named fields. Rendering then goes through the bound fields, so
//! two concurrent requests never observe each other's embed flags.
//!
//! ## Example
//!
//! ```
//! use reinhardt_embed_core::{EmbeddableField, EmbeddableSerializer, SerializerContext};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let serializer = EmbeddableSerializer::builder("RootModel")
//!     .field(EmbeddableField::new("id"))
//!     .field(EmbeddableField::new("name"))
//!     .build();
//!
//! let context = SerializerContext::new().with_embed_fields(Vec::<String>::new());
//! let record = json!({"id": 1, "name": "Root"}).as_object().unwrap().clone();
//! let value = serializer.initialize(&context).unwrap().to_representation(&record).await.unwrap();
//! assert_eq!(value, json!({"id": 1, "name": "Root"}));
//! # });
//! ```

use crate::context::SerializerContext;
use crate::exception::{EmbedError, EmbedResult};
use crate::field::{BoundField, EmbeddableField, Many, OutputFormatter, PrimaryKey};
use crate::paths::split_embed_relations;
use crate::record::Record;
use crate::relation::{LocalRelationStrategy, RelationSource};
use crate::schema::{FieldKind, ModelSchema, SchemaRegistry};
use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Declaration of a serializer whose fields can be embedded on request
#[derive(Debug, Clone)]
pub struct EmbeddableSerializer {
	name: String,
	fields: IndexMap<String, EmbeddableField>,
}

impl EmbeddableSerializer {
	/// Start declaring a serializer
	pub fn builder(name: impl Into<String>) -> EmbeddableSerializerBuilder {
		EmbeddableSerializerBuilder {
			name: name.into(),
			fields: IndexMap::new(),
		}
	}

	/// Default serializer of a model
	///
	/// Covers every field of the schema. Plain fields pass through, foreign
	/// keys and many-to-many fields render by the primary key of the related
	/// model and can be embedded with its default serializer.
	pub fn from_schema(
		schema: &ModelSchema,
		registry: Arc<SchemaRegistry>,
		source: Arc<dyn RelationSource>,
	) -> Self {
		let related_pk = |model: &str| match registry.get(model) {
			Some(related) => PrimaryKey::new(related.pk_field.clone()),
			None => PrimaryKey::default(),
		};
		let mut builder = Self::builder(schema.name.clone());
		for field in schema.fields() {
			let declared = match &field.kind {
				FieldKind::Plain => EmbeddableField::new(field.name.clone()),
				FieldKind::ForeignKey { to } => {
					let strategy = LocalRelationStrategy::new(to.clone(), Arc::clone(&source))
						.with_registry(Arc::clone(&registry));
					EmbeddableField::embedded(field.name.clone(), Arc::new(strategy))
						.with_representation(related_pk(to.as_str()))
				}
				FieldKind::ManyToMany { to } => {
					let strategy = LocalRelationStrategy::new(to.clone(), Arc::clone(&source))
						.with_registry(Arc::clone(&registry))
						.many();
					EmbeddableField::embedded(field.name.clone(), Arc::new(strategy))
						.with_representation(Many::new(related_pk(to.as_str())))
				}
			};
			builder = builder.field(declared);
		}
		builder.build()
	}

	/// Replace a declared field, or append it when no field has that name
	///
	/// Typically used to turn a plain column of a model serializer into a
	/// remote resource field.
	pub fn with_field(mut self, field: EmbeddableField) -> Self {
		self.fields.insert(field.name().to_string(), field);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared fields in order
	pub fn fields(&self) -> impl Iterator<Item = &EmbeddableField> {
		self.fields.values()
	}

	pub fn get_field(&self, name: &str) -> Option<&EmbeddableField> {
		self.fields.get(name)
	}

	/// Bind the serializer to a request
	///
	/// Reads the embed paths from `context`, splits them and flags the named
	/// fields. Names that match no field, or a field without an embedding
	/// strategy, are ignored.
	///
	/// # Errors
	///
	/// Returns a configuration error when the context carries neither embed
	/// fields nor a request.
	pub fn initialize(&self, context: &SerializerContext) -> EmbedResult<BoundSerializer<'_>> {
		let requested = context.requested_embed_fields()?;
		let relations = split_embed_relations(&requested);

		let mut fields: Vec<BoundField<'_>> = self.fields.values().map(BoundField::new).collect();
		for (name, suffixes) in relations.iter() {
			let Some(index) = self.fields.get_index_of(name) else {
				tracing::trace!(serializer = %self.name, field = name, "Ignoring unknown embed field");
				continue;
			};
			let bound = &mut fields[index];
			if !bound.field().is_embeddable() {
				tracing::trace!(serializer = %self.name, field = name, "Field has no embedding strategy");
				continue;
			}
			bound.configure(true, suffixes.to_vec());
		}

		tracing::debug!(
			serializer = %self.name,
			depth = context.depth(),
			embedded = ?relations.field_names().collect::<Vec<_>>(),
			"Initialized embeddable serializer"
		);
		Ok(BoundSerializer {
			serializer: self,
			fields,
			context: context.clone(),
		})
	}
}

/// Builder of [`EmbeddableSerializer`]
#[derive(Debug)]
pub struct EmbeddableSerializerBuilder {
	name: String,
	fields: IndexMap<String, EmbeddableField>,
}

impl EmbeddableSerializerBuilder {
	/// Declare a field; a later declaration with the same name replaces it
	pub fn field(mut self, field: EmbeddableField) -> Self {
		self.fields.insert(field.name().to_string(), field);
		self
	}

	pub fn build(self) -> EmbeddableSerializer {
		EmbeddableSerializer {
			name: self.name,
			fields: self.fields,
		}
	}
}

/// An [`EmbeddableSerializer`] bound to one request
#[derive(Debug)]
pub struct BoundSerializer<'a> {
	serializer: &'a EmbeddableSerializer,
	fields: Vec<BoundField<'a>>,
	context: SerializerContext,
}

impl<'a> BoundSerializer<'a> {
	pub fn serializer(&self) -> &'a EmbeddableSerializer {
		self.serializer
	}

	pub fn context(&self) -> &SerializerContext {
		&self.context
	}

	pub fn get_field(&self, name: &str) -> Option<&BoundField<'a>> {
		self.fields.iter().find(|bound| bound.name() == name)
	}

	/// Names of the fields flagged for embedding
	pub fn embedded_fields(&self) -> Vec<&str> {
		self.fields
			.iter()
			.filter(|bound| bound.is_embedded())
			.map(BoundField::name)
			.collect()
	}

	/// Render one record
	///
	/// Fields are rendered in declaration order, one after the other. A field
	/// missing from the record renders from `null`.
	pub async fn to_representation(&self, record: &Record) -> EmbedResult<Value> {
		let mut output = Map::with_capacity(self.fields.len());
		for bound in &self.fields {
			let value = record.get(bound.field().source()).unwrap_or(&Value::Null);
			let rendered = bound.render(value, &self.context).await?;
			output.insert(bound.name().to_string(), rendered);
		}
		Ok(Value::Object(output))
	}

	/// Render a list of records, keeping their order
	///
	/// Items are rendered concurrently when `concurrent_items` is enabled.
	pub async fn to_representation_many(&self, records: &[Record]) -> EmbedResult<Value> {
		let items = if self.context.settings().concurrent_items {
			try_join_all(records.iter().map(|record| self.to_representation(record))).await?
		} else {
			let mut items = Vec::with_capacity(records.len());
			for record in records {
				items.push(self.to_representation(record).await?);
			}
			items
		};
		tracing::trace!(serializer = %self.serializer.name, items = items.len(), "Rendered list");
		Ok(Value::Array(items))
	}
}

/// Renders an embedded value with an embeddable serializer
///
/// The value (an object, or a list of objects) is treated as records of the
/// wrapped serializer, which receives the suffixes forwarded to the field as
/// its embed paths. A remote payload can therefore embed further, locally,
/// with the same paths that were sent to the remote service.
#[derive(Debug, Clone)]
pub struct SerializerFormatter {
	serializer: Arc<EmbeddableSerializer>,
}

impl SerializerFormatter {
	pub fn new(serializer: Arc<EmbeddableSerializer>) -> Self {
		Self { serializer }
	}

	pub fn serializer(&self) -> &EmbeddableSerializer {
		&self.serializer
	}
}

fn expect_record(value: Value) -> EmbedResult<Record> {
	match value {
		Value::Object(record) => Ok(record),
		other => Err(EmbedError::Serialization(format!(
			"Expected an object to serialize but got {}",
			other
		))),
	}
}

#[async_trait]
impl OutputFormatter for SerializerFormatter {
	async fn format(
		&self,
		value: Value,
		embed_relations: &[String],
		context: &SerializerContext,
	) -> EmbedResult<Value> {
		if value.is_null() {
			return Ok(Value::Null);
		}
		let context = context.child(embed_relations.to_vec())?;
		let bound = self.serializer.initialize(&context)?;
		match value {
			Value::Array(items) => {
				let records = items
					.into_iter()
					.map(expect_record)
					.collect::<EmbedResult<Vec<_>>>()?;
				bound.to_representation_many(&records).await
			}
			other => bound.to_representation(&expect_record(other)?).await,
		}
	}
}
