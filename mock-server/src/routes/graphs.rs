use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{parse_body, reply, write_status};
use crate::error::ArangoError;
use crate::store::{document_meta, EdgeDefinition};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGraph {
    name: String,
    #[serde(default)]
    edge_definitions: Vec<EdgeDefinition>,
    #[serde(default)]
    orphan_collections: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphParams {
    wait_for_sync: Option<bool>,
    drop_collections: Option<bool>,
    return_new: Option<bool>,
}

pub async fn create(
    State(state): State<AppState>,
    Path(db): Path<String>,
    Query(params): Query<GraphParams>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let input: CreateGraph = parse_body(&body)?;
    let mut store = state.store.write().await;
    let graph = store
        .database_mut(&db)?
        .create_graph(&input.name, input.edge_definitions, input.orphan_collections)?;
    info!(database = %db, graph = %graph.name, "created graph");
    Ok(reply(write_status(params.wait_for_sync), json!({ "graph": graph.to_json() })))
}

pub async fn drop(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
    Query(params): Query<GraphParams>,
) -> Result<Response, ArangoError> {
    let mut store = state.store.write().await;
    store
        .database_mut(&db)?
        .drop_graph(&name, params.drop_collections.unwrap_or(false))?;
    info!(database = %db, graph = %name, "dropped graph");
    Ok(reply(write_status(params.wait_for_sync), json!({ "removed": true })))
}

pub async fn create_vertex(
    State(state): State<AppState>,
    Path((db, graph, collection)): Path<(String, String, String)>,
    Query(params): Query<GraphParams>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let vertex: Value = parse_body(&body)?;
    let mut store = state.store.write().await;
    let stored = store.database_mut(&db)?.insert_vertex(&graph, &collection, vertex)?;

    let mut answer = json!({ "vertex": document_meta(&stored) });
    if params.return_new.unwrap_or(false) {
        answer["new"] = stored;
    }
    Ok(reply(write_status(params.wait_for_sync), answer))
}
