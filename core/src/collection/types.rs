//! Request and response shapes for `_api/collection`.
//!
//! Rust field names are snake_case; they travel as camelCase under
//! [`Convention::API`](crate::serialization::Convention::API).

use serde::{Deserialize, Serialize};

use crate::query::{QueryOptions, QueryParam, QueryParams};

/// Kind of collection, sent and received as the server's integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CollectionType {
    Document,
    Edge,
}

impl TryFrom<u8> for CollectionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(CollectionType::Document),
            3 => Ok(CollectionType::Edge),
            other => Err(format!("unknown collection type {other}")),
        }
    }
}

impl From<CollectionType> for u8 {
    fn from(value: CollectionType) -> Self {
        match value {
            CollectionType::Document => 2,
            CollectionType::Edge => 3,
        }
    }
}

/// Lifecycle state behind the numeric `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    NewBorn,
    Unloaded,
    Loaded,
    Unloading,
    Deleted,
    Loading,
    Unknown(i32),
}

impl From<i32> for CollectionStatus {
    fn from(value: i32) -> Self {
        match value {
            1 => CollectionStatus::NewBorn,
            2 => CollectionStatus::Unloaded,
            3 => CollectionStatus::Loaded,
            4 => CollectionStatus::Unloading,
            5 => CollectionStatus::Deleted,
            6 => CollectionStatus::Loading,
            other => CollectionStatus::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionKeyOptions {
    /// Key generator: `traditional`, `autoincrement`, `uuid` or `padded`.
    #[serde(rename = "type")]
    pub generator: Option<String>,
    pub allow_user_keys: Option<bool>,
    pub increment: Option<u64>,
    pub offset: Option<u64>,
    pub last_value: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCollectionRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub collection_type: Option<CollectionType>,
    pub wait_for_sync: Option<bool>,
    pub is_system: Option<bool>,
    pub key_options: Option<CollectionKeyOptions>,
    pub journal_size: Option<u64>,
    pub number_of_shards: Option<u32>,
    pub shard_keys: Option<Vec<String>>,
    pub replication_factor: Option<u32>,
}

impl PostCollectionRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn edge(name: impl Into<String>) -> Self {
        Self {
            collection_type: Some(CollectionType::Edge),
            ..Self::new(name)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostCollectionOptions {
    pub wait_for_sync_replication: Option<bool>,
    pub enforce_replication_factor: Option<bool>,
}

impl QueryOptions for PostCollectionOptions {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new()
            .bool("waitForSyncReplication", self.wait_for_sync_replication)
            .bool("enforceReplicationFactor", self.enforce_replication_factor)
            .build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetCollectionsOptions {
    pub exclude_system: Option<bool>,
}

impl QueryOptions for GetCollectionsOptions {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new().bool("excludeSystem", self.exclude_system).build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameCollectionRequest {
    pub name: String,
}

/// Fields the server reports for a collection in most responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    pub status: i32,
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
    pub is_system: bool,
    pub globally_unique_id: String,
}

impl CollectionInfo {
    pub fn status_kind(&self) -> CollectionStatus {
        CollectionStatus::from(self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCollectionResponse {
    pub error: bool,
    pub code: u16,
    #[serde(flatten)]
    pub collection: CollectionInfo,
    pub wait_for_sync: bool,
    pub key_options: CollectionKeyOptions,
    pub status_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCollectionResponse {
    pub error: bool,
    pub code: u16,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncateCollectionResponse {
    pub error: bool,
    pub code: u16,
    #[serde(flatten)]
    pub collection: CollectionInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionCountResponse {
    pub error: bool,
    pub code: u16,
    #[serde(flatten)]
    pub collection: CollectionInfo,
    pub count: u64,
    pub wait_for_sync: bool,
    pub key_options: CollectionKeyOptions,
    pub status_string: String,
    pub cache_enabled: Option<bool>,
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionsResponse {
    pub error: bool,
    pub code: u16,
    pub result: Vec<CollectionInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionResponse {
    pub error: bool,
    pub code: u16,
    #[serde(flatten)]
    pub collection: CollectionInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionPropertiesResponse {
    pub error: bool,
    pub code: u16,
    #[serde(flatten)]
    pub collection: CollectionInfo,
    pub wait_for_sync: bool,
    pub key_options: CollectionKeyOptions,
    pub status_string: String,
}
