//! Embeddable fields
//!
//! An [`EmbeddableField`] renders either its original representation or an
//! embedded one. The definition is immutable and can be shared by every
//! request; the per-request decision lives in a [`BoundField`] created by the
//! owning serializer.
//!
//! Rendering an embedded field runs three steps:
//!
//! 1. the original representation turns the stored value into its baseline
//!    form (for a relation, the primary key),
//! 2. the [`EmbeddingStrategy`] resolves the embedded value from it,
//! 3. the [`OutputFormatter`] shapes the result.
//!
//! A failing strategy fails the field. There is no fallback to the baseline.

use crate::context::SerializerContext;
use crate::exception::{EmbedError, EmbedResult};
use crate::strategy::EmbeddingStrategy;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Original (non-embedded) representation of a field value
pub trait FieldRepresentation: Send + Sync {
	fn to_representation(&self, value: &Value) -> EmbedResult<Value>;
}

impl<F> FieldRepresentation for F
where
	F: Fn(&Value) -> EmbedResult<Value> + Send + Sync,
{
	fn to_representation(&self, value: &Value) -> EmbedResult<Value> {
		self(value)
	}
}

/// Renders the stored value unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl FieldRepresentation for Passthrough {
	fn to_representation(&self, value: &Value) -> EmbedResult<Value> {
		Ok(value.clone())
	}
}

/// Renders a relation by its primary key
///
/// The stored value is either the key itself or the related object, in which
/// case the key is read from `pk_field`.
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::field::{FieldRepresentation, PrimaryKey};
/// use serde_json::json;
///
/// let pk = PrimaryKey::default();
/// assert_eq!(pk.to_representation(&json!(3)).unwrap(), json!(3));
/// assert_eq!(pk.to_representation(&json!({"id": 3, "name": "x"})).unwrap(), json!(3));
/// ```
#[derive(Debug, Clone)]
pub struct PrimaryKey {
	pk_field: String,
}

impl PrimaryKey {
	pub fn new(pk_field: impl Into<String>) -> Self {
		Self {
			pk_field: pk_field.into(),
		}
	}
}

impl Default for PrimaryKey {
	fn default() -> Self {
		Self::new("id")
	}
}

impl FieldRepresentation for PrimaryKey {
	fn to_representation(&self, value: &Value) -> EmbedResult<Value> {
		match value {
			Value::Object(object) => object.get(&self.pk_field).cloned().ok_or_else(|| {
				EmbedError::Serialization(format!(
					"Related object has no primary key field '{}'",
					self.pk_field
				))
			}),
			other => Ok(other.clone()),
		}
	}
}

/// Applies a child representation to every element of a list
///
/// `null` renders as an empty list.
pub struct Many {
	child: Arc<dyn FieldRepresentation>,
}

impl Many {
	pub fn new(child: impl FieldRepresentation + 'static) -> Self {
		Self {
			child: Arc::new(child),
		}
	}
}

impl FieldRepresentation for Many {
	fn to_representation(&self, value: &Value) -> EmbedResult<Value> {
		match value {
			Value::Array(items) => items
				.iter()
				.map(|item| self.child.to_representation(item))
				.collect::<EmbedResult<Vec<_>>>()
				.map(Value::Array),
			Value::Null => Ok(Value::Array(Vec::new())),
			other => Err(EmbedError::Serialization(format!(
				"Expected a list of items but got {}",
				other
			))),
		}
	}
}

/// Shapes an embedded value before it is returned
///
/// The formatter sees the suffixes forwarded to the field and the context of
/// the owning serializer, so it may render the value with a nested
/// serializer (see [`SerializerFormatter`](crate::SerializerFormatter)).
/// Plain closures over the value are formatters too.
#[async_trait]
pub trait OutputFormatter: Send + Sync {
	async fn format(
		&self,
		value: Value,
		embed_relations: &[String],
		context: &SerializerContext,
	) -> EmbedResult<Value>;
}

#[async_trait]
impl<F> OutputFormatter for F
where
	F: Fn(Value) -> EmbedResult<Value> + Send + Sync,
{
	async fn format(
		&self,
		value: Value,
		_embed_relations: &[String],
		_context: &SerializerContext,
	) -> EmbedResult<Value> {
		self(value)
	}
}

/// Generic key-value passthrough, the default formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct DictFormatter;

#[async_trait]
impl OutputFormatter for DictFormatter {
	async fn format(
		&self,
		value: Value,
		_embed_relations: &[String],
		_context: &SerializerContext,
	) -> EmbedResult<Value> {
		Ok(value)
	}
}

/// Keeps only the named keys of an object (or of each object in a list)
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::field::{FieldsFormatter, OutputFormatter};
/// use reinhardt_embed_core::SerializerContext;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let formatter = FieldsFormatter::new(["id", "field_1"]);
/// let value = formatter
///     .format(
///         json!({"id": 1, "field_1": "TestExternalAPI", "secret": "x"}),
///         &[],
///         &SerializerContext::new(),
///     )
///     .await
///     .unwrap();
/// assert_eq!(value, json!({"id": 1, "field_1": "TestExternalAPI"}));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct FieldsFormatter {
	fields: Vec<String>,
}

impl FieldsFormatter {
	pub fn new<I, S>(fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			fields: fields.into_iter().map(Into::into).collect(),
		}
	}

	fn select(&self, object: &Map<String, Value>) -> Value {
		let selected = self
			.fields
			.iter()
			.map(|name| (name.clone(), object.get(name).cloned().unwrap_or(Value::Null)))
			.collect();
		Value::Object(selected)
	}

	fn shape(&self, value: Value) -> EmbedResult<Value> {
		match value {
			Value::Object(object) => Ok(self.select(&object)),
			Value::Array(items) => items
				.into_iter()
				.map(|item| self.shape(item))
				.collect::<EmbedResult<Vec<_>>>()
				.map(Value::Array),
			Value::Null => Ok(Value::Null),
			other => Err(EmbedError::Serialization(format!(
				"Expected an object to select fields from but got {}",
				other
			))),
		}
	}
}

#[async_trait]
impl OutputFormatter for FieldsFormatter {
	async fn format(
		&self,
		value: Value,
		_embed_relations: &[String],
		_context: &SerializerContext,
	) -> EmbedResult<Value> {
		self.shape(value)
	}
}

/// Definition of a serializer field that may be embedded
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::EmbeddableField;
///
/// let field = EmbeddableField::new("str_field");
/// assert_eq!(field.name(), "str_field");
/// assert_eq!(field.source(), "str_field");
/// assert!(!field.is_embeddable());
/// ```
#[derive(Clone)]
pub struct EmbeddableField {
	name: String,
	source: Option<String>,
	representation: Arc<dyn FieldRepresentation>,
	strategy: Option<Arc<dyn EmbeddingStrategy>>,
	formatter: Arc<dyn OutputFormatter>,
}

impl EmbeddableField {
	/// Create a plain field rendering its stored value unchanged
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			source: None,
			representation: Arc::new(Passthrough),
			strategy: None,
			formatter: Arc::new(DictFormatter),
		}
	}

	/// Create a field embedded through `strategy`
	pub fn embedded(name: impl Into<String>, strategy: Arc<dyn EmbeddingStrategy>) -> Self {
		Self::new(name).with_strategy(strategy)
	}

	/// Use a different key of the record as the field value
	pub fn with_source(mut self, source: impl Into<String>) -> Self {
		self.source = Some(source.into());
		self
	}

	pub fn with_representation(mut self, representation: impl FieldRepresentation + 'static) -> Self {
		self.representation = Arc::new(representation);
		self
	}

	pub fn with_strategy(mut self, strategy: Arc<dyn EmbeddingStrategy>) -> Self {
		self.strategy = Some(strategy);
		self
	}

	pub fn with_formatter(mut self, formatter: impl OutputFormatter + 'static) -> Self {
		self.formatter = Arc::new(formatter);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Record key the value is read from
	pub fn source(&self) -> &str {
		self.source.as_deref().unwrap_or(&self.name)
	}

	/// Whether an embedding strategy is attached
	pub fn is_embeddable(&self) -> bool {
		self.strategy.is_some()
	}

	/// Baseline rendering, identical to a field without embedding support
	pub fn to_representation(&self, value: &Value) -> EmbedResult<Value> {
		self.representation.to_representation(value)
	}

	/// Embedded rendering: baseline value, then strategy, then formatter
	pub async fn to_embedded_representation(
		&self,
		value: &Value,
		embed_relations: &[String],
		context: &SerializerContext,
	) -> EmbedResult<Value> {
		let strategy = self.strategy.as_ref().ok_or_else(|| {
			EmbedError::configuration(format!("Field '{}' cannot be embedded", self.name))
		})?;
		let field_value = self.to_representation(value)?;
		let embedded = strategy.resolve(&field_value, embed_relations, context).await?;
		self.formatter.format(embedded, embed_relations, context).await
	}
}

impl fmt::Debug for EmbeddableField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EmbeddableField")
			.field("name", &self.name)
			.field("source", &self.source())
			.field("embeddable", &self.is_embeddable())
			.finish()
	}
}

/// A field bound to one request
///
/// Carries the request-scoped embed flag and forwarded suffixes.
#[derive(Debug, Clone)]
pub struct BoundField<'a> {
	field: &'a EmbeddableField,
	embed: bool,
	embed_relations: Vec<String>,
}

impl<'a> BoundField<'a> {
	pub fn new(field: &'a EmbeddableField) -> Self {
		Self {
			field,
			embed: false,
			embed_relations: Vec::new(),
		}
	}

	/// Set the embed flag and the suffixes forwarded to the strategy
	pub fn configure(&mut self, embed: bool, embed_relations: Vec<String>) {
		self.embed = embed;
		self.embed_relations = embed_relations;
	}

	pub fn field(&self) -> &'a EmbeddableField {
		self.field
	}

	pub fn name(&self) -> &str {
		self.field.name()
	}

	pub fn is_embedded(&self) -> bool {
		self.embed
	}

	pub fn embed_relations(&self) -> &[String] {
		&self.embed_relations
	}

	/// Render `value` according to the embed flag
	pub async fn render(&self, value: &Value, context: &SerializerContext) -> EmbedResult<Value> {
		if !self.embed {
			return self.field.to_representation(value);
		}
		tracing::trace!(
			field = self.name(),
			relations = ?self.embed_relations,
			"Rendering embedded field"
		);
		self.field
			.to_embedded_representation(value, &self.embed_relations, context)
			.await
	}
}
