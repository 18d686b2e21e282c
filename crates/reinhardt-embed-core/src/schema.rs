//! Model schemas
//!
//! A [`ModelSchema`] describes the fields of a model and which of them are
//! relations. It is used to build the default serializer of a related model
//! when a relation field is embedded without an explicit serializer. The
//! default serializer exposes every field (including `id`) and keeps relations
//! rendered by primary key, yet embeddable.

use crate::exception::{EmbedError, EmbedResult};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Kind of a model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
	/// Stored value, rendered as is
	Plain,
	/// Single-valued relation stored as the related primary key
	ForeignKey { to: String },
	/// Multi-valued relation stored as a list of related primary keys
	ManyToMany { to: String },
}

impl FieldKind {
	/// Name of the related model, if the field is a relation
	pub fn related_model(&self) -> Option<&str> {
		match self {
			Self::Plain => None,
			Self::ForeignKey { to } | Self::ManyToMany { to } => Some(to),
		}
	}

	pub fn is_many(&self) -> bool {
		matches!(self, Self::ManyToMany { .. })
	}
}

/// One field of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
	pub name: String,
	#[serde(flatten)]
	pub kind: FieldKind,
}

/// Field layout of a model
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::ModelSchema;
///
/// let schema = ModelSchema::new("ChildModel")
///     .foreign_key("parent", "ParentModel")
///     .field("external_api_field");
///
/// assert_eq!(schema.field_names(), vec!["id", "parent", "external_api_field"]);
/// assert_eq!(schema.get_field("parent").unwrap().kind.related_model(), Some("ParentModel"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
	pub name: String,
	#[serde(default = "default_pk_field")]
	pub pk_field: String,
	#[serde(default)]
	fields: IndexMap<String, FieldSchema>,
}

fn default_pk_field() -> String {
	"id".to_string()
}

impl ModelSchema {
	/// Create a schema with an `id` primary key
	pub fn new(name: impl Into<String>) -> Self {
		let mut schema = Self {
			name: name.into(),
			pk_field: default_pk_field(),
			fields: IndexMap::new(),
		};
		schema.push("id".to_string(), FieldKind::Plain);
		schema
	}

	/// Use `pk_field` as the primary key instead of `id`
	///
	/// The previous key field is replaced at the same position.
	pub fn with_pk_field(mut self, pk_field: impl Into<String>) -> Self {
		let pk_field = pk_field.into();
		let previous = std::mem::replace(&mut self.pk_field, pk_field.clone());
		match self.fields.get_index_of(&previous) {
			Some(index) => {
				self.fields.shift_remove_index(index);
				self.fields.shift_insert(
					index,
					pk_field.clone(),
					FieldSchema {
						name: pk_field,
						kind: FieldKind::Plain,
					},
				);
			}
			None => self.push(pk_field, FieldKind::Plain),
		}
		self
	}

	fn push(&mut self, name: String, kind: FieldKind) {
		self.fields.insert(name.clone(), FieldSchema { name, kind });
	}

	/// Add a plain field
	pub fn field(mut self, name: impl Into<String>) -> Self {
		self.push(name.into(), FieldKind::Plain);
		self
	}

	pub fn foreign_key(mut self, name: impl Into<String>, to: impl Into<String>) -> Self {
		self.push(name.into(), FieldKind::ForeignKey { to: to.into() });
		self
	}

	pub fn many_to_many(mut self, name: impl Into<String>, to: impl Into<String>) -> Self {
		self.push(name.into(), FieldKind::ManyToMany { to: to.into() });
		self
	}

	pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
		self.fields.get(name)
	}

	/// Fields in declaration order
	pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
		self.fields.values()
	}

	pub fn field_names(&self) -> Vec<&str> {
		self.fields.keys().map(String::as_str).collect()
	}
}

/// Registry of model schemas, keyed by model name
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::{ModelSchema, SchemaRegistry};
///
/// let registry = SchemaRegistry::new();
/// registry.register(ModelSchema::new("RootModel").field("name"));
///
/// assert!(registry.get("RootModel").is_some());
/// assert!(registry.require("Unknown").is_err());
/// ```
#[derive(Debug, Default)]
pub struct SchemaRegistry {
	schemas: RwLock<HashMap<String, Arc<ModelSchema>>>,
}

impl SchemaRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a schema, replacing any previous one with the same name
	pub fn register(&self, schema: ModelSchema) {
		tracing::debug!(model = %schema.name, "Registering model schema");
		self.schemas
			.write()
			.insert(schema.name.clone(), Arc::new(schema));
	}

	pub fn get(&self, model: &str) -> Option<Arc<ModelSchema>> {
		self.schemas.read().get(model).cloned()
	}

	/// Look up a schema, failing with a configuration error when unknown
	pub fn require(&self, model: &str) -> EmbedResult<Arc<ModelSchema>> {
		self.get(model).ok_or_else(|| {
			EmbedError::configuration(format!("No schema registered for model '{}'", model))
		})
	}

	/// Registered model names, sorted
	pub fn models(&self) -> Vec<String> {
		let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
		names.sort();
		names
	}
}
