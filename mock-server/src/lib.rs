//! In-memory stand-in for the subset of the ArangoDB HTTP API the client
//! calls.
//!
//! # Design
//! One [`store::Store`] behind a `tokio` `RwLock` holds every database.
//! Routes live under `/_db/{db}/_api/...`, require basic auth, and answer
//! failures in the server's `{error, code, errorNum, errorMessage}` shape.
//! The cursor endpoint understands two query shapes only; it is not a query
//! engine.

pub mod error;
mod routes;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::warn;

pub use crate::error::ArangoError;
pub use crate::store::Store;

/// The single user the server accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn accepts(&self, header: &str) -> bool {
        header
            .strip_prefix("Basic ")
            .and_then(|encoded| STANDARD.decode(encoded.trim()).ok())
            .and_then(|raw| String::from_utf8(raw).ok())
            .and_then(|pair| {
                pair.split_once(':')
                    .map(|(user, password)| user == self.username && password == self.password)
            })
            .unwrap_or(false)
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("root", "")
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    credentials: Arc<Credentials>,
}

/// Router accepting `root` with an empty password.
pub fn app() -> Router {
    app_with_credentials(Credentials::default())
}

pub fn app_with_credentials(credentials: Credentials) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::new())),
        credentials: Arc::new(credentials),
    };

    Router::new()
        .route(
            "/_db/{db}/_api/collection",
            get(routes::collections::list).post(routes::collections::create),
        )
        .route(
            "/_db/{db}/_api/collection/{name}",
            get(routes::collections::describe).delete(routes::collections::drop),
        )
        .route(
            "/_db/{db}/_api/collection/{name}/properties",
            get(routes::collections::properties),
        )
        .route("/_db/{db}/_api/collection/{name}/count", get(routes::collections::count))
        .route(
            "/_db/{db}/_api/collection/{name}/truncate",
            put(routes::collections::truncate),
        )
        .route("/_db/{db}/_api/collection/{name}/rename", put(routes::collections::rename))
        .route(
            "/_db/{db}/_api/database",
            get(routes::databases::list).post(routes::databases::create),
        )
        .route("/_db/{db}/_api/database/user", get(routes::databases::list_user))
        .route("/_db/{db}/_api/database/current", get(routes::databases::current))
        .route(
            "/_db/{db}/_api/database/{name}",
            axum::routing::delete(routes::databases::drop),
        )
        .route(
            "/_db/{db}/_api/document/{collection}",
            post(routes::documents::create).delete(routes::documents::remove_many),
        )
        // HEAD is answered by the GET handler; the body is stripped.
        .route(
            "/_db/{db}/_api/document/{collection}/{key}",
            get(routes::documents::read)
                .patch(routes::documents::update)
                .put(routes::documents::replace)
                .delete(routes::documents::remove),
        )
        .route("/_db/{db}/_api/gharial", post(routes::graphs::create))
        .route(
            "/_db/{db}/_api/gharial/{graph}",
            axum::routing::delete(routes::graphs::drop),
        )
        .route(
            "/_db/{db}/_api/gharial/{graph}/vertex/{collection}",
            post(routes::graphs::create_vertex),
        )
        .route("/_db/{db}/_api/cursor", post(routes::cursors::create))
        .route(
            "/_db/{db}/_api/cursor/{id}",
            put(routes::cursors::next).delete(routes::cursors::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .fallback(unknown_path)
        .with_state(state)
}

pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_credentials(credentials)).await
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| state.credentials.accepts(value));
    if !authorized {
        warn!(path = %request.uri().path(), "rejected unauthenticated request");
        return ArangoError::unauthorized().into_response();
    }
    next.run(request).await
}

async fn unknown_path(uri: Uri) -> ArangoError {
    ArangoError::unknown_path(uri.path())
}
