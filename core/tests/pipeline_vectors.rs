//! Client operations against simulated responses.
//!
//! Each vector pairs a scripted server answer with the request the client is
//! expected to send and the outcome it should produce. No network is used;
//! the `MockTransport` records what would have gone over the wire.

use std::sync::Arc;

use arango_core::collection::{GetCollectionsOptions, PostCollectionOptions, PostCollectionRequest};
use arango_core::error::codes;
use arango_core::pipeline::interpret;
use arango_core::{
    ArangoClient, ClientError, Convention, HttpMethod, HttpResponse, MockTransport, TransportError,
};
use serde_json::{json, Value};

fn client(transport: MockTransport) -> (ArangoClient<MockTransport>, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    (ArangoClient::from_shared(Arc::clone(&transport)), transport)
}

fn sent_body(transport: &MockTransport) -> Value {
    let request = transport.last_request().unwrap();
    serde_json::from_slice(request.body.as_deref().unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Error interpretation
// ---------------------------------------------------------------------------

struct ErrorVector {
    name: &'static str,
    status: u16,
    body: &'static str,
    error_num: i32,
    synthesized: bool,
}

const ERROR_VECTORS: &[ErrorVector] = &[
    ErrorVector {
        name: "duplicate name",
        status: 409,
        body: r#"{"error":true,"code":409,"errorNum":1207,"errorMessage":"duplicate name"}"#,
        error_num: codes::DUPLICATE_NAME,
        synthesized: false,
    },
    ErrorVector {
        name: "collection not found",
        status: 404,
        body: r#"{"error":true,"code":404,"errorNum":1203,"errorMessage":"collection or view not found"}"#,
        error_num: codes::DATA_SOURCE_NOT_FOUND,
        synthesized: false,
    },
    ErrorVector {
        name: "illegal name",
        status: 400,
        body: r#"{"error":true,"code":400,"errorNum":1208,"errorMessage":"illegal name"}"#,
        error_num: codes::ILLEGAL_NAME,
        synthesized: false,
    },
    ErrorVector {
        name: "html from a proxy",
        status: 502,
        body: "<html><body>Bad Gateway</body></html>",
        error_num: 0,
        synthesized: true,
    },
    ErrorVector {
        name: "empty body",
        status: 503,
        body: "",
        error_num: 0,
        synthesized: true,
    },
];

#[test]
fn error_vectors() {
    for vector in ERROR_VECTORS {
        let response = HttpResponse::new(vector.status, Vec::new(), vector.body);
        let err = interpret::<Value>(response, Convention::API).unwrap_err();
        let api = err
            .api_error()
            .unwrap_or_else(|| panic!("{}: expected an api error, got {err:?}", vector.name));
        assert_eq!(api.error_num, vector.error_num, "{}: errorNum", vector.name);
        assert_eq!(api.code, vector.status, "{}: code", vector.name);
        assert_eq!(api.is_synthesized(), vector.synthesized, "{}: synthesized", vector.name);
        assert!(api.error, "{}: error flag", vector.name);
    }
}

#[test]
fn synthesized_message_names_the_status() {
    let response = HttpResponse::new(503, Vec::new(), "");
    let err = interpret::<Value>(response, Convention::API).unwrap_err();
    assert_eq!(err.api_error().unwrap().error_message, "HTTP 503 Service Unavailable");
}

#[test]
fn malformed_success_body_is_a_decode_error() {
    let response = HttpResponse::new(200, Vec::new(), "{\"result\":");
    let err = interpret::<Value>(response, Convention::API).unwrap_err();
    assert!(matches!(err, ClientError::Decode { status: 200, .. }));
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

const CREATED_COLLECTION: &str = r#"{
    "error": false, "code": 200, "id": "9", "name": "MyCollection", "status": 3, "type": 2,
    "isSystem": false, "globallyUniqueId": "h1", "waitForSync": false, "statusString": "loaded",
    "keyOptions": { "type": "traditional", "allowUserKeys": true, "lastValue": 0 }
}"#;

#[tokio::test]
async fn post_collection_request_shape() {
    let (client, transport) = client(MockTransport::new().respond(200, CREATED_COLLECTION));
    let options = PostCollectionOptions {
        wait_for_sync_replication: Some(false),
        enforce_replication_factor: None,
    };

    let created = client
        .collection
        .post_collection(&PostCollectionRequest::new("MyCollection"), Some(&options))
        .await
        .unwrap();
    assert_eq!(created.collection.name, "MyCollection");
    assert_eq!(created.key_options.generator.as_deref(), Some("traditional"));

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "_api/collection?waitForSyncReplication=false");
    assert_eq!(sent_body(&transport), json!({ "name": "MyCollection" }));
}

#[tokio::test]
async fn post_collection_duplicate_surfaces_1207() {
    let (client, _) = client(MockTransport::new().respond(
        409,
        r#"{"error":true,"code":409,"errorNum":1207,"errorMessage":"duplicate name"}"#,
    ));
    let err = client
        .collection
        .post_collection(&PostCollectionRequest::new("MyCollection"), None)
        .await
        .unwrap_err();
    assert_eq!(err.error_num(), Some(1207));
    assert_eq!(err.status(), Some(409));
    assert!(err.api_error().unwrap().is_duplicate_name());
}

#[tokio::test]
async fn truncate_sends_no_body() {
    let (client, transport) = client(MockTransport::new().respond(
        200,
        concat!(
            r#"{"error":false,"code":200,"id":"9","name":"c","status":3,"type":2,"#,
            r#""isSystem":false,"globallyUniqueId":"h1"}"#,
        ),
    ));
    client.collection.truncate_collection("c").await.unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, HttpMethod::Put);
    assert_eq!(request.path, "_api/collection/c/truncate");
    assert!(request.body.is_none());
}

#[tokio::test]
async fn unset_options_leave_no_query_string() {
    let (client, transport) = client(
        MockTransport::new()
            .respond(200, r#"{"error":false,"code":200,"result":[]}"#)
            .respond(200, r#"{"error":false,"code":200,"result":[]}"#),
    );
    client
        .collection
        .get_collections(Some(&GetCollectionsOptions::default()))
        .await
        .unwrap();
    client
        .collection
        .get_collections(Some(&GetCollectionsOptions {
            exclude_system: Some(true),
        }))
        .await
        .unwrap();

    let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["_api/collection", "_api/collection?excludeSystem=true"]);
}

// ---------------------------------------------------------------------------
// Failures before or below the server
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transport_failure_is_not_an_api_error() {
    let (client, _) = client(MockTransport::new().fail(TransportError::Connect("refused".to_string())));
    let err = client.database.list_databases().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Connect(_))));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn empty_identifiers_never_reach_the_transport() {
    let (client, transport) = client(MockTransport::new());
    assert!(matches!(
        client.collection.delete_collection("").await,
        Err(ClientError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.database.delete_database(" ").await,
        Err(ClientError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.cursor.delete_cursor("").await,
        Err(ClientError::InvalidArgument(_))
    ));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn names_with_a_slash_never_reach_the_transport() {
    let (client, transport) = client(MockTransport::new());
    assert!(matches!(
        client.collection.delete_collection("a/b").await,
        Err(ClientError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.database.delete_database("shop/eu").await,
        Err(ClientError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.graph.delete_graph("social/x", None).await,
        Err(ClientError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.cursor.put_cursor::<Value>("12/34").await,
        Err(ClientError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.document.get_document::<Value>("users", "42/43").await,
        Err(ClientError::InvalidArgument(_))
    ));
    assert!(transport.requests().is_empty());
}
