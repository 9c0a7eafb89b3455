use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{parse_body, reply};
use crate::error::ArangoError;
use crate::store::{DOCUMENT_COLLECTION, EDGE_COLLECTION};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    exclude_system: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCollection {
    name: String,
    #[serde(rename = "type")]
    collection_type: Option<u8>,
    is_system: bool,
    wait_for_sync: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenameCollection {
    name: String,
}

pub async fn list(
    State(state): State<AppState>,
    Path(db): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Response, ArangoError> {
    let store = state.store.read().await;
    let exclude_system = params.exclude_system.unwrap_or(false);
    let result: Vec<Value> = store
        .database(&db)?
        .collections()
        .filter(|c| !(exclude_system && c.is_system))
        .map(|c| c.info())
        .collect();
    Ok(reply(StatusCode::OK, json!({ "result": result })))
}

pub async fn create(
    State(state): State<AppState>,
    Path(db): Path<String>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let input: CreateCollection = parse_body(&body)?;
    let collection_type = match input.collection_type {
        None | Some(DOCUMENT_COLLECTION) => DOCUMENT_COLLECTION,
        Some(EDGE_COLLECTION) => EDGE_COLLECTION,
        Some(other) => return Err(ArangoError::bad_parameter(format!("invalid collection type: {other}"))),
    };

    let mut store = state.store.write().await;
    let collection = store
        .database_mut(&db)?
        .create_collection(&input.name, collection_type, input.is_system)?;
    collection.wait_for_sync = input.wait_for_sync;
    info!(database = %db, collection = %input.name, "created collection");
    Ok(reply(StatusCode::OK, collection.details()))
}

pub async fn describe(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
) -> Result<Response, ArangoError> {
    let store = state.store.read().await;
    let collection = store.database(&db)?.collection(&name)?;
    Ok(reply(StatusCode::OK, collection.info()))
}

pub async fn properties(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
) -> Result<Response, ArangoError> {
    let store = state.store.read().await;
    let collection = store.database(&db)?.collection(&name)?;
    Ok(reply(StatusCode::OK, collection.details()))
}

pub async fn count(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
) -> Result<Response, ArangoError> {
    let store = state.store.read().await;
    let collection = store.database(&db)?.collection(&name)?;
    let mut body = collection.details();
    body["count"] = json!(collection.count());
    Ok(reply(StatusCode::OK, body))
}

pub async fn truncate(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
) -> Result<Response, ArangoError> {
    let mut store = state.store.write().await;
    let collection = store.database_mut(&db)?.collection_mut(&name)?;
    collection.truncate();
    info!(database = %db, collection = %name, "truncated collection");
    Ok(reply(StatusCode::OK, collection.info()))
}

pub async fn rename(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let input: RenameCollection = parse_body(&body)?;
    let mut store = state.store.write().await;
    let collection = store.database_mut(&db)?.rename_collection(&name, &input.name)?;
    info!(database = %db, from = %name, to = %input.name, "renamed collection");
    Ok(reply(StatusCode::OK, collection.info()))
}

pub async fn drop(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
) -> Result<Response, ArangoError> {
    let mut store = state.store.write().await;
    let collection = store.database_mut(&db)?.drop_collection(&name)?;
    info!(database = %db, collection = %name, "dropped collection");
    Ok(reply(StatusCode::OK, json!({ "id": collection.id })))
}
