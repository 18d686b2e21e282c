//! Integration test utilities for Reinhardt Embed
//!
//! Provides an in-memory relation source, a recording HTTP transport, model
//! schemas and serializers mirroring a small root / parent / child / many
//! data set, and helpers rendering a list endpoint the way a view would.

use async_trait::async_trait;
use http::{HeaderMap, Request, StatusCode};
use mockall::mock;
use parking_lot::Mutex;
use reinhardt_embed::prelude::*;
use reinhardt_embed_core::plain_string;
use reinhardt_embed_remote::{RemoteRequest, RemoteResponse};
use rstest::fixture;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// URL template of the external API used by the child serializer
pub const EXTERNAL_API_URL: &str = "http://test-endpoint/api/v1/{id}/";

/// Initialize logging for tests (call once)
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_test_logging() {
	INIT.call_once(|| {
		let filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_test_writer()
			.try_init();
	});
}

/// Relation source backed by in-memory tables
#[derive(Debug, Default)]
pub struct InMemoryRelationSource {
	tables: Mutex<HashMap<String, Vec<Record>>>,
}

impl InMemoryRelationSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a row; `value` must be a JSON object
	pub fn insert(&self, model: &str, value: Value) {
		let record = into_record(value).expect("rows must be JSON objects");
		self.tables
			.lock()
			.entry(model.to_string())
			.or_default()
			.push(record);
	}

	/// All rows of a model, in insertion order
	pub fn all(&self, model: &str) -> Vec<Record> {
		self.tables.lock().get(model).cloned().unwrap_or_default()
	}
}

#[async_trait]
impl RelationSource for InMemoryRelationSource {
	async fn get(&self, model: &str, pk: &Value) -> EmbedResult<Option<Record>> {
		let wanted = plain_string(pk);
		let tables = self.tables.lock();
		let found = tables.get(model).and_then(|rows| {
			rows.iter()
				.find(|row| row.get("id").map(plain_string).as_deref() == Some(wanted.as_str()))
				.cloned()
		});
		Ok(found)
	}
}

/// HTTP transport answering from a queue and recording every request
#[derive(Debug, Default)]
pub struct RecordingTransport {
	responses: Mutex<VecDeque<EmbedResult<RemoteResponse>>>,
	requests: Mutex<Vec<RemoteRequest>>,
}

impl RecordingTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Transport answering `200 OK` with each body in turn
	pub fn with_json_bodies<I>(bodies: I) -> Self
	where
		I: IntoIterator<Item = Value>,
	{
		let transport = Self::new();
		for body in bodies {
			transport.push_json(StatusCode::OK, body);
		}
		transport
	}

	pub fn push_json(&self, status: StatusCode, body: Value) {
		self.responses
			.lock()
			.push_back(Ok(RemoteResponse::json(status, &body)));
	}

	pub fn push_response(&self, response: EmbedResult<RemoteResponse>) {
		self.responses.lock().push_back(response);
	}

	/// Requests sent so far, in order
	pub fn requests(&self) -> Vec<RemoteRequest> {
		self.requests.lock().clone()
	}
}

#[async_trait]
impl HttpTransport for RecordingTransport {
	async fn send(&self, request: RemoteRequest) -> EmbedResult<RemoteResponse> {
		self.requests.lock().push(request);
		self.responses
			.lock()
			.pop_front()
			.unwrap_or_else(|| Err(EmbedError::Transport("No response queued".to_string())))
	}
}

mock! {
	pub HttpTransport {}

	#[async_trait]
	impl HttpTransport for HttpTransport {
		async fn send(&self, request: RemoteRequest) -> EmbedResult<RemoteResponse>;
	}
}

/// Schemas of the test models
#[fixture]
pub fn model_registry() -> Arc<SchemaRegistry> {
	let registry = SchemaRegistry::new();
	registry.register(ModelSchema::new("RootModel").field("name"));
	registry.register(
		ModelSchema::new("ParentModel")
			.field("str_field")
			.foreign_key("root", "RootModel"),
	);
	registry.register(
		ModelSchema::new("ChildModel")
			.foreign_key("parent", "ParentModel")
			.field("external_api_field"),
	);
	registry.register(ModelSchema::new("ManyModel").many_to_many("children", "ChildModel"));
	Arc::new(registry)
}

/// One root, two parents, three children and one many-to-many owner
#[fixture]
pub fn store() -> Arc<InMemoryRelationSource> {
	let store = InMemoryRelationSource::new();
	store.insert("RootModel", json!({"id": 1, "name": "Test Root"}));
	store.insert("ParentModel", json!({"id": 1, "str_field": "Parent 1", "root": 1}));
	store.insert("ParentModel", json!({"id": 2, "str_field": "Parent 2", "root": 1}));
	store.insert("ChildModel", json!({"id": 1, "parent": 1, "external_api_field": 1}));
	store.insert("ChildModel", json!({"id": 2, "parent": 1, "external_api_field": 2}));
	store.insert("ChildModel", json!({"id": 3, "parent": 2, "external_api_field": 1}));
	store.insert("ManyModel", json!({"id": 1, "children": [1, 2, 3]}));
	Arc::new(store)
}

pub fn external_1() -> Value {
	json!({"id": 1, "field_1": "TestExternalAPI"})
}

pub fn external_2() -> Value {
	json!({"id": 2, "field_1": "TestExternalAPI2"})
}

/// Child serializer: the default model serializer whose
/// `external_api_field` is fetched from the external API, forwarding the
/// `Authorization` header
pub fn child_serializer(
	registry: &Arc<SchemaRegistry>,
	store: &Arc<InMemoryRelationSource>,
	transport: Arc<dyn HttpTransport>,
) -> EmbeddableSerializer {
	let schema = registry
		.require("ChildModel")
		.expect("ChildModel schema is registered");
	let embedder = RemoteResourceEmbedder::builder(EXTERNAL_API_URL)
		.included_headers(["Authorization"])
		.build(transport)
		.expect("valid remote resource configuration");
	EmbeddableSerializer::from_schema(&schema, Arc::clone(registry), store.clone())
		.with_field(api_resource_field(EmbeddableField::new("external_api_field"), embedder))
}

/// Default serializer of `ManyModel`
pub fn many_serializer(
	registry: &Arc<SchemaRegistry>,
	store: &Arc<InMemoryRelationSource>,
) -> EmbeddableSerializer {
	let schema = registry
		.require("ManyModel")
		.expect("ManyModel schema is registered");
	EmbeddableSerializer::from_schema(&schema, Arc::clone(registry), store.clone())
}

/// A `GET` request to `uri` with the given headers
pub fn get_request(uri: &str, headers: &[(&str, &str)]) -> Request<()> {
	let mut builder = Request::builder().uri(uri);
	for (name, value) in headers {
		builder = builder.header(*name, *value);
	}
	builder.body(()).expect("valid test request")
}

/// Render a list endpoint and return the response status and body
///
/// Failures are turned into the error response a view would send.
pub async fn render_list(
	serializer: &EmbeddableSerializer,
	records: &[Record],
	request: &Request<()>,
) -> (StatusCode, Value) {
	match list_body(serializer, records, request).await {
		Ok(body) => (StatusCode::OK, body),
		Err(error) => (error.status_code(), error.detail()),
	}
}

async fn list_body(
	serializer: &EmbeddableSerializer,
	records: &[Record],
	request: &Request<()>,
) -> EmbedResult<Value> {
	let context = SerializerContext::for_request(EmbedRequestContext::from_request(request)?);
	serializer
		.initialize(&context)?
		.to_representation_many(records)
		.await
}

/// Headers of a recorded request as `(name, value)` pairs
pub fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
	headers
		.iter()
		.map(|(name, value)| {
			(
				name.as_str().to_string(),
				value.to_str().unwrap_or_default().to_string(),
			)
		})
		.collect()
}
