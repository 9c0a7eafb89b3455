//! Client for `_api/cursor`.
//!
//! Query results are user data, so cursor bodies use
//! [`Convention::VERBATIM`] and spell out their wire names. Bind variable
//! names are passed through untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::{execute, require_name, require_present, ApiRequest};
use crate::query::path_segment;
use crate::serialization::Convention;
use crate::transport::Transport;

const CURSOR_API_PATH: &str = "_api/cursor";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostCursorBody {
    pub query: String,
    #[serde(rename = "bindVars", skip_serializing_if = "Option::is_none")]
    pub bind_vars: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(rename = "batchSize", skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
}

impl PostCursorBody {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.bind_vars
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorResponse<T> {
    pub error: bool,
    pub code: u16,
    pub result: Vec<T>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    /// Set while more batches can be fetched with
    /// [`CursorApiClient::put_cursor`].
    pub id: Option<String>,
    /// Total number of results, when `count` was requested.
    pub count: Option<u64>,
    pub cached: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCursorResponse {
    pub error: bool,
    pub code: u16,
    pub id: String,
}

#[derive(Debug)]
pub struct CursorApiClient<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for CursorApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> CursorApiClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Runs a query and returns its first batch.
    pub async fn post_cursor<R>(&self, body: &PostCursorBody) -> Result<CursorResponse<R>>
    where
        R: DeserializeOwned + Serialize,
    {
        require_present("query", &body.query)?;
        let request = ApiRequest::post(CURSOR_API_PATH)
            .with_json(body, Convention::VERBATIM)?
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    /// Fetches the next batch of an open cursor.
    pub async fn put_cursor<R>(&self, cursor_id: &str) -> Result<CursorResponse<R>>
    where
        R: DeserializeOwned + Serialize,
    {
        require_name("cursor", cursor_id)?;
        let request = ApiRequest::put(format!("{CURSOR_API_PATH}/{}", path_segment(cursor_id)))
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    /// Releases a cursor before it is exhausted.
    pub async fn delete_cursor(&self, cursor_id: &str) -> Result<DeleteCursorResponse> {
        require_name("cursor", cursor_id)?;
        let request = ApiRequest::delete(format!("{CURSOR_API_PATH}/{}", path_segment(cursor_id)));
        execute(self.transport.as_ref(), request).await
    }
}
