//! Client for the named-graph API (`_api/gharial`).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::{execute, require_name, ApiRequest};
use crate::query::{path_segment, QueryOptions, QueryParam, QueryParams};
use crate::serialization::Convention;
use crate::transport::Transport;

const GRAPH_API_PATH: &str = "_api/gharial";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub collection: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostGraphRequest {
    pub name: String,
    pub edge_definitions: Option<Vec<EdgeDefinition>>,
    pub orphan_collections: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct PostGraphOptions {
    pub wait_for_sync: Option<bool>,
}

impl QueryOptions for PostGraphOptions {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new().bool("waitForSync", self.wait_for_sync).build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInfo {
    pub name: String,
    pub edge_definitions: Vec<EdgeDefinition>,
    pub orphan_collections: Vec<String>,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostGraphResponse {
    pub error: bool,
    pub code: u16,
    pub graph: GraphInfo,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteGraphOptions {
    /// Also drop collections not used by any other graph.
    pub drop_collections: Option<bool>,
}

impl QueryOptions for DeleteGraphOptions {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new().bool("dropCollections", self.drop_collections).build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteGraphResponse {
    pub error: bool,
    pub code: u16,
    pub removed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PostVertexQuery {
    pub wait_for_sync: Option<bool>,
    /// Ask for the stored vertex in [`PostVertexResponse::new`].
    pub return_new: Option<bool>,
}

impl QueryOptions for PostVertexQuery {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new()
            .bool("waitForSync", self.wait_for_sync)
            .bool("returnNew", self.return_new)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostVertexResult {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostVertexResponse<U> {
    pub error: bool,
    pub code: u16,
    pub vertex: PostVertexResult,
    /// The complete stored vertex, including server-generated attributes.
    /// Only present when `returnNew` was requested.
    pub new: Option<U>,
}

#[derive(Debug)]
pub struct GraphApiClient<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for GraphApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> GraphApiClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub async fn post_graph(
        &self,
        request: &PostGraphRequest,
        options: Option<&PostGraphOptions>,
    ) -> Result<PostGraphResponse> {
        require_name("graph", &request.name)?;
        let request = ApiRequest::post(GRAPH_API_PATH)
            .with_options(options)
            .with_json(request, Convention::API)?;
        execute(self.transport.as_ref(), request).await
    }

    pub async fn delete_graph(&self, name: &str, options: Option<&DeleteGraphOptions>) -> Result<DeleteGraphResponse> {
        require_name("graph", name)?;
        let request = ApiRequest::delete(format!("{GRAPH_API_PATH}/{}", path_segment(name))).with_options(options);
        execute(self.transport.as_ref(), request).await
    }

    /// Adds a vertex to one of the graph's vertex collections.
    pub async fn post_vertex<V, U>(
        &self,
        graph: &str,
        collection: &str,
        vertex: &V,
        query: Option<&PostVertexQuery>,
    ) -> Result<PostVertexResponse<U>>
    where
        V: Serialize + ?Sized,
        U: DeserializeOwned + Serialize,
    {
        require_name("graph", graph)?;
        require_name("collection", collection)?;
        let path = format!(
            "{GRAPH_API_PATH}/{}/vertex/{}",
            path_segment(graph),
            path_segment(collection)
        );
        let request = ApiRequest::post(path)
            .with_options(query)
            .with_json(vertex, Convention::VERBATIM)?
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }
}
