use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;
use tracing::debug;

use super::{parse_body, reply};
use crate::error::ArangoError;
use crate::store::CursorRequest;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Path(db): Path<String>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let request: CursorRequest = parse_body(&body)?;
    debug!(database = %db, query = %request.query, "running query");
    let answer = state.store.write().await.create_cursor(&db, request)?;
    Ok(reply(StatusCode::CREATED, answer))
}

pub async fn next(
    State(state): State<AppState>,
    Path((db, id)): Path<(String, String)>,
) -> Result<Response, ArangoError> {
    let answer = state.store.write().await.next_batch(&db, &id)?;
    Ok(reply(StatusCode::OK, answer))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((db, id)): Path<(String, String)>,
) -> Result<Response, ArangoError> {
    state.store.write().await.delete_cursor(&db, &id)?;
    Ok(reply(StatusCode::ACCEPTED, json!({ "id": id })))
}
