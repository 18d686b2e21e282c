//! Many-to-many embedding with the default model serializers

use assert_json_diff::assert_json_eq;
use http::StatusCode;
use reinhardt_embed::prelude::*;
use reinhardt_embed_integration_tests::{
	InMemoryRelationSource, get_request, init_test_logging, many_serializer, model_registry,
	render_list, store,
};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

#[rstest]
#[tokio::test]
async fn test_retrieve_from_many(
	model_registry: Arc<SchemaRegistry>,
	store: Arc<InMemoryRelationSource>,
) {
	// Arrange
	init_test_logging();
	let serializer = many_serializer(&model_registry, &store);

	// Act
	let (status, body) = render_list(
		&serializer,
		&store.all("ManyModel"),
		&get_request("/list/many/?embed=children", &[]),
	)
	.await;

	// Assert
	assert_eq!(status, StatusCode::OK);
	assert_json_eq!(
		body,
		json!([{
			"id": 1,
			"children": [
				{"id": 1, "parent": 1, "external_api_field": 1},
				{"id": 2, "parent": 1, "external_api_field": 2},
				{"id": 3, "parent": 2, "external_api_field": 1},
			]
		}])
	);
}

#[rstest]
#[tokio::test]
async fn test_retrieve_from_many_nested(
	model_registry: Arc<SchemaRegistry>,
	store: Arc<InMemoryRelationSource>,
) {
	// Arrange
	let serializer = many_serializer(&model_registry, &store);

	// Act
	let (status, body) = render_list(
		&serializer,
		&store.all("ManyModel"),
		&get_request(
			"/list/many/?embed=children.parent&embed=children.external_api_field",
			&[],
		),
	)
	.await;

	// Assert
	assert_eq!(status, StatusCode::OK);
	assert_json_eq!(
		body,
		json!([{
			"id": 1,
			"children": [
				{"id": 1, "parent": {"id": 1, "str_field": "Parent 1", "root": 1}, "external_api_field": 1},
				{"id": 2, "parent": {"id": 1, "str_field": "Parent 1", "root": 1}, "external_api_field": 2},
				{"id": 3, "parent": {"id": 2, "str_field": "Parent 2", "root": 1}, "external_api_field": 1},
			]
		}])
	);
}

#[rstest]
#[tokio::test]
async fn test_retrieve_from_many_not_embedded(
	model_registry: Arc<SchemaRegistry>,
	store: Arc<InMemoryRelationSource>,
) {
	let serializer = many_serializer(&model_registry, &store);

	let (status, body) =
		render_list(&serializer, &store.all("ManyModel"), &get_request("/list/many/", &[])).await;

	assert_eq!(status, StatusCode::OK);
	assert_json_eq!(body, json!([{"id": 1, "children": [1, 2, 3]}]));
}

#[rstest]
#[tokio::test]
async fn test_three_levels_deep(
	model_registry: Arc<SchemaRegistry>,
	store: Arc<InMemoryRelationSource>,
) {
	// Arrange
	let serializer = many_serializer(&model_registry, &store);

	// Act
	let (status, body) = render_list(
		&serializer,
		&store.all("ManyModel"),
		&get_request("/list/many/?embed=children.parent.root", &[]),
	)
	.await;

	// Assert
	assert_eq!(status, StatusCode::OK);
	assert_json_eq!(
		body[0]["children"][2]["parent"],
		json!({"id": 2, "str_field": "Parent 2", "root": {"id": 1, "name": "Test Root"}})
	);
}

#[rstest]
#[tokio::test]
async fn test_empty_relation_list(model_registry: Arc<SchemaRegistry>) {
	// Arrange
	let store = Arc::new(InMemoryRelationSource::new());
	store.insert("ManyModel", json!({"id": 7, "children": []}));
	let serializer = many_serializer(&model_registry, &store);

	// Act
	let (status, body) = render_list(
		&serializer,
		&store.all("ManyModel"),
		&get_request("/list/many/?embed=children", &[]),
	)
	.await;

	// Assert
	assert_eq!(status, StatusCode::OK);
	assert_json_eq!(body, json!([{"id": 7, "children": []}]));
}
