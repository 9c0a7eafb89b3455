//! Client for `_api/collection`.

mod types;

use std::sync::Arc;

use tracing::debug;

pub use self::types::*;

use crate::error::Result;
use crate::pipeline::{execute, require_name, ApiRequest};
use crate::query::path_segment;
use crate::serialization::Convention;
use crate::transport::Transport;

const COLLECTION_API_PATH: &str = "_api/collection";

#[derive(Debug)]
pub struct CollectionApiClient<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for CollectionApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> CollectionApiClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    fn collection_path(name: &str, action: Option<&str>) -> String {
        match action {
            Some(action) => format!("{COLLECTION_API_PATH}/{}/{action}", path_segment(name)),
            None => format!("{COLLECTION_API_PATH}/{}", path_segment(name)),
        }
    }

    /// Creates a collection. Never retried: a second attempt could create a
    /// duplicate.
    pub async fn post_collection(
        &self,
        request: &PostCollectionRequest,
        options: Option<&PostCollectionOptions>,
    ) -> Result<PostCollectionResponse> {
        require_name("collection", &request.name)?;
        debug!(collection = %request.name, "creating collection");
        let request = ApiRequest::post(COLLECTION_API_PATH)
            .with_options(options)
            .with_json(request, Convention::API)?;
        execute(self.transport.as_ref(), request).await
    }

    pub async fn delete_collection(&self, name: &str) -> Result<DeleteCollectionResponse> {
        require_name("collection", name)?;
        execute(self.transport.as_ref(), ApiRequest::delete(Self::collection_path(name, None))).await
    }

    /// Removes every document; the collection itself stays.
    pub async fn truncate_collection(&self, name: &str) -> Result<TruncateCollectionResponse> {
        require_name("collection", name)?;
        execute(
            self.transport.as_ref(),
            ApiRequest::put(Self::collection_path(name, Some("truncate"))),
        )
        .await
    }

    pub async fn get_collection_count(&self, name: &str) -> Result<GetCollectionCountResponse> {
        require_name("collection", name)?;
        execute(
            self.transport.as_ref(),
            ApiRequest::get(Self::collection_path(name, Some("count"))),
        )
        .await
    }

    pub async fn get_collections(&self, options: Option<&GetCollectionsOptions>) -> Result<GetCollectionsResponse> {
        execute(
            self.transport.as_ref(),
            ApiRequest::get(COLLECTION_API_PATH).with_options(options),
        )
        .await
    }

    pub async fn get_collection(&self, name: &str) -> Result<GetCollectionResponse> {
        require_name("collection", name)?;
        execute(self.transport.as_ref(), ApiRequest::get(Self::collection_path(name, None))).await
    }

    pub async fn get_collection_properties(&self, name: &str) -> Result<GetCollectionPropertiesResponse> {
        require_name("collection", name)?;
        execute(
            self.transport.as_ref(),
            ApiRequest::get(Self::collection_path(name, Some("properties"))),
        )
        .await
    }

    pub async fn rename_collection(
        &self,
        name: &str,
        request: &RenameCollectionRequest,
    ) -> Result<GetCollectionResponse> {
        require_name("collection", name)?;
        require_name("collection", &request.name)?;
        let request = ApiRequest::put(Self::collection_path(name, Some("rename"))).with_json(request, Convention::API)?;
        execute(self.transport.as_ref(), request).await
    }
}
