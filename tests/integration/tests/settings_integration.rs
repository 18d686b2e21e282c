//! Settings and declarative remote field configuration

use assert_json_diff::assert_json_eq;
use http::StatusCode;
use reinhardt_embed::prelude::*;
use reinhardt_embed_integration_tests::{
	InMemoryRelationSource, RecordingTransport, external_1, get_request, model_registry, store,
};
use rstest::rstest;
use std::sync::Arc;

const SETTINGS: &str = r#"
[embed]
query_param = "expand"
max_depth = 4
default_method = "get"
"#;

#[rstest]
#[tokio::test]
async fn test_custom_query_param_from_settings(
	model_registry: Arc<SchemaRegistry>,
	store: Arc<InMemoryRelationSource>,
) {
	// Arrange
	let settings = Arc::new(EmbedSettings::from_toml_str(SETTINGS).unwrap());
	let schema = model_registry.require("ChildModel").unwrap();
	let serializer = EmbeddableSerializer::from_schema(&schema, model_registry.clone(), store.clone());
	let request =
		EmbedRequestContext::from_request(&get_request("/list/?expand=parent&embed=parent.root", &[]))
			.unwrap();
	let context = SerializerContext::for_request(request).with_settings(settings);

	// Act
	let body = serializer
		.initialize(&context)
		.unwrap()
		.to_representation(&store.all("ChildModel")[0])
		.await
		.unwrap();

	// Assert
	assert_json_eq!(body["parent"], serde_json::json!({"id": 1, "str_field": "Parent 1", "root": 1}));
}

#[rstest]
#[tokio::test]
async fn test_remote_field_from_toml(store: Arc<InMemoryRelationSource>) {
	// Arrange
	let settings = EmbedSettings::from_toml_str(SETTINGS).unwrap();
	let config = RemoteResourceConfig::from_toml_str(
		r#"
		url = "http://test-endpoint/api/v1/{id}/"
		included_headers = ["Authorization"]
		"#,
	)
	.unwrap();
	let transport = Arc::new(RecordingTransport::with_json_bodies([external_1()]));
	let embedder = RemoteResourceEmbedder::from_config(config, &settings, transport.clone()).unwrap();
	let serializer = EmbeddableSerializer::builder("ChildModel")
		.field(EmbeddableField::new("id"))
		.field(api_resource_field(EmbeddableField::new("external_api_field"), embedder))
		.build();
	let request = EmbedRequestContext::from_request(&get_request(
		"/list/?expand=external_api_field",
		&[("Authorization", "Bearer TokenHere")],
	))
	.unwrap();
	let context = SerializerContext::for_request(request).with_settings(Arc::new(settings));

	// Act
	let body = serializer
		.initialize(&context)
		.unwrap()
		.to_representation(&store.all("ChildModel")[0])
		.await
		.unwrap();

	// Assert
	assert_json_eq!(body["external_api_field"], external_1());
	let requests = transport.requests();
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].method, http::Method::GET);
	assert_eq!(
		requests[0].headers.get("authorization").unwrap(),
		"Bearer TokenHere"
	);
}

#[rstest]
fn test_invalid_remote_config_is_rejected() {
	let error = RemoteResourceConfig::from_toml_str(
		r#"
		url = "http://test-endpoint/api/v1/{id}/"
		included_headers = "Authorization"
		"#,
	)
	.unwrap_err();

	assert!(error.is_configuration_error());
	assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
