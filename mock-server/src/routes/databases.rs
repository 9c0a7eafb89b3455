use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{parse_body, reply};
use crate::error::ArangoError;
use crate::store::SYSTEM_DATABASE;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDatabase {
    name: String,
}

/// Database administration is only reachable through `_system`.
fn require_system(db: &str) -> Result<(), ArangoError> {
    if db == SYSTEM_DATABASE {
        Ok(())
    } else {
        Err(ArangoError::use_system_database())
    }
}

pub async fn list(State(state): State<AppState>, Path(db): Path<String>) -> Result<Response, ArangoError> {
    let store = state.store.read().await;
    store.database(&db)?;
    require_system(&db)?;
    Ok(reply(StatusCode::OK, json!({ "result": store.database_names() })))
}

pub async fn list_user(State(state): State<AppState>, Path(db): Path<String>) -> Result<Response, ArangoError> {
    let store = state.store.read().await;
    store.database(&db)?;
    Ok(reply(StatusCode::OK, json!({ "result": store.database_names() })))
}

pub async fn current(State(state): State<AppState>, Path(db): Path<String>) -> Result<Response, ArangoError> {
    let store = state.store.read().await;
    let database = store.database(&db)?;
    Ok(reply(
        StatusCode::OK,
        json!({
            "result": {
                "name": database.name,
                "id": database.id,
                "path": format!("/var/lib/arangodb3/databases/database-{}", database.id),
                "isSystem": database.name == SYSTEM_DATABASE,
            }
        }),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Path(db): Path<String>,
    body: Bytes,
) -> Result<Response, ArangoError> {
    require_system(&db)?;
    let input: CreateDatabase = parse_body(&body)?;
    state.store.write().await.create_database(&input.name)?;
    info!(database = %input.name, "created database");
    Ok(reply(StatusCode::CREATED, json!({ "result": true })))
}

pub async fn drop(
    State(state): State<AppState>,
    Path((db, name)): Path<(String, String)>,
) -> Result<Response, ArangoError> {
    require_system(&db)?;
    state.store.write().await.drop_database(&name)?;
    info!(database = %name, "dropped database");
    Ok(reply(StatusCode::OK, json!({ "result": true })))
}
