use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_body, reply_raw, write_status};
use crate::error::ArangoError;
use crate::store::{document_meta, revision, Collection, WriteOptions};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteParams {
    wait_for_sync: Option<bool>,
    return_new: Option<bool>,
    return_old: Option<bool>,
    overwrite: Option<bool>,
    keep_null: Option<bool>,
    merge_objects: Option<bool>,
    ignore_revs: Option<bool>,
}

impl WriteParams {
    fn options(&self) -> WriteOptions {
        WriteOptions {
            overwrite: self.overwrite.unwrap_or(false),
            keep_null: self.keep_null.unwrap_or(true),
            merge_objects: self.merge_objects.unwrap_or(true),
            ignore_revs: self.ignore_revs.unwrap_or(true),
        }
    }

    /// Meta attributes plus whichever of `new` / `old` were asked for.
    fn answer(&self, current: &Value, new: Option<&Value>, old: Option<&Value>) -> Value {
        let mut answer = document_meta(current);
        if let (Some(true), Some(new)) = (self.return_new, new) {
            answer["new"] = new.clone();
        }
        if let (Some(true), Some(old)) = (self.return_old, old) {
            answer["old"] = old.clone();
        }
        answer
    }
}

fn etag(doc: &Value) -> String {
    format!("\"{}\"", revision(doc))
}

fn unquote(value: &HeaderValue) -> &str {
    value.to_str().unwrap_or_default().trim().trim_matches('"')
}

fn insert_one(collection: &mut Collection, doc: Value, params: &WriteParams) -> Result<Value, ArangoError> {
    let (stored, old) = collection.insert(doc, params.options())?;
    Ok(params.answer(&stored, Some(&stored), old.as_ref()))
}

/// Inserts one document or, for an array body, each element in turn.
pub async fn create(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
    Query(params): Query<WriteParams>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let body: Value = parse_body(&body)?;
    let mut store = state.store.write().await;
    let collection = store.database_mut(&db)?.collection_mut(&name)?;
    let status = write_status(params.wait_for_sync);

    let answer = match body {
        Value::Array(docs) => Value::Array(
            docs.into_iter()
                .map(|doc| insert_one(collection, doc, &params).unwrap_or_else(|err| err.to_item()))
                .collect(),
        ),
        doc => insert_one(collection, doc, &params)?,
    };
    Ok(reply_raw(status, answer))
}

/// Reads a document, honouring `If-None-Match` and `If-Match`.
pub async fn read(
    State(state): State<AppState>,
    Path((db, name, key)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Response, ArangoError> {
    let store = state.store.read().await;
    let doc = store.database(&db)?.collection(&name)?.get(&key)?;
    let rev = revision(doc);

    if headers.get(header::IF_NONE_MATCH).is_some_and(|v| unquote(v) == rev) {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag(doc))]).into_response());
    }
    if headers.get(header::IF_MATCH).is_some_and(|v| unquote(v) != rev) {
        return Err(ArangoError::conflict());
    }
    Ok(([(header::ETAG, etag(doc))], reply_raw(StatusCode::OK, doc.clone())).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    Path((db, name, key)): Path<(String, String, String)>,
    Query(params): Query<WriteParams>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let patch: Value = parse_body(&body)?;
    let mut store = state.store.write().await;
    let collection = store.database_mut(&db)?.collection_mut(&name)?;
    let (old, new) = collection.update(&key, patch, params.options())?;
    Ok(reply_raw(write_status(params.wait_for_sync), replaced(&params, &old, &new)))
}

pub async fn replace(
    State(state): State<AppState>,
    Path((db, name, key)): Path<(String, String, String)>,
    Query(params): Query<WriteParams>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let doc: Value = parse_body(&body)?;
    let mut store = state.store.write().await;
    let collection = store.database_mut(&db)?.collection_mut(&name)?;
    let (old, new) = collection.replace(&key, doc, params.options())?;
    Ok(reply_raw(write_status(params.wait_for_sync), replaced(&params, &old, &new)))
}

fn replaced(params: &WriteParams, old: &Value, new: &Value) -> Value {
    let mut answer = params.answer(new, Some(new), Some(old));
    answer["_oldRev"] = json!(revision(old));
    answer
}

fn removed_status(wait_for_sync: Option<bool>) -> StatusCode {
    if wait_for_sync.unwrap_or(false) {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    }
}

pub async fn remove(
    State(state): State<AppState>,
    Path((db, name, key)): Path<(String, String, String)>,
    Query(params): Query<WriteParams>,
) -> Result<Response, ArangoError> {
    let mut store = state.store.write().await;
    let old = store.database_mut(&db)?.collection_mut(&name)?.remove(&key)?;
    Ok(reply_raw(removed_status(params.wait_for_sync), params.answer(&old, None, Some(&old))))
}

fn remove_one(collection: &mut Collection, selector: &Value, params: &WriteParams) -> Result<Value, ArangoError> {
    let key = selector
        .as_str()
        .or_else(|| selector["_key"].as_str())
        .ok_or_else(ArangoError::document_not_found)?;
    let old = collection.remove(key)?;
    Ok(params.answer(&old, None, Some(&old)))
}

/// Removes every document named in the body, by key or by an object
/// carrying `_key`.
pub async fn remove_many(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
    Query(params): Query<WriteParams>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    let selectors: Vec<Value> = parse_body(&body)?;
    let mut store = state.store.write().await;
    let collection = store.database_mut(&db)?.collection_mut(&name)?;

    let answer: Vec<Value> = selectors
        .iter()
        .map(|selector| remove_one(collection, selector, &params).unwrap_or_else(|err| err.to_item()))
        .collect();
    Ok(reply_raw(removed_status(params.wait_for_sync), Value::Array(answer)))
}
