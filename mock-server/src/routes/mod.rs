pub mod collections;
pub mod cursors;
pub mod databases;
pub mod documents;
pub mod graphs;

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ArangoError;

/// A success answer wrapped in the `{error: false, code}` envelope.
fn reply(status: StatusCode, mut body: Value) -> Response {
    if let Value::Object(map) = &mut body {
        map.insert("error".to_string(), json!(false));
        map.insert("code".to_string(), json!(status.as_u16()));
    }
    (status, Json(body)).into_response()
}

/// Document endpoints answer without the envelope.
fn reply_raw(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ArangoError> {
    serde_json::from_slice(body).map_err(ArangoError::corrupted_json)
}

/// 201 when the write waited for sync, 202 otherwise.
fn write_status(wait_for_sync: Option<bool>) -> StatusCode {
    if wait_for_sync.unwrap_or(false) {
        StatusCode::CREATED
    } else {
        StatusCode::ACCEPTED
    }
}
