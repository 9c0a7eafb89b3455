//! Client for `_api/document`.

mod types;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use self::types::*;

use crate::error::Result;
use crate::pipeline::{dispatch, execute, into_api_error, require_name, split_document_id, ApiRequest};
use crate::query::path_segment;
use crate::serialization::Convention;
use crate::transport::Transport;

const DOCUMENT_API_PATH: &str = "_api/document";

#[derive(Debug)]
pub struct DocumentApiClient<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for DocumentApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

fn collection_path(collection: &str) -> String {
    format!("{DOCUMENT_API_PATH}/{}", path_segment(collection))
}

fn document_path(id: &str) -> Result<String> {
    let (collection, key) = split_document_id(id)?;
    Ok(format!(
        "{DOCUMENT_API_PATH}/{}/{}",
        path_segment(collection),
        path_segment(key)
    ))
}

impl<T: Transport> DocumentApiClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Inserts one document. Never retried.
    pub async fn post_document<D, U>(
        &self,
        collection: &str,
        document: &D,
        options: Option<&PostDocumentsOptions>,
    ) -> Result<PostDocumentResponse<U>>
    where
        D: Serialize + ?Sized,
        U: DeserializeOwned + Serialize,
    {
        require_name("collection", collection)?;
        let request = ApiRequest::post(collection_path(collection))
            .with_options(options)
            .with_json(document, Convention::VERBATIM)?
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    /// Inserts several documents in one request. Each entry of the answer is
    /// either that document's result or its error.
    pub async fn post_documents<D, U>(
        &self,
        collection: &str,
        documents: &[D],
        options: Option<&PostDocumentsOptions>,
    ) -> Result<Vec<PostDocumentsDocumentResponse<U>>>
    where
        D: Serialize,
        U: DeserializeOwned + Serialize,
    {
        require_name("collection", collection)?;
        let request = ApiRequest::post(collection_path(collection))
            .with_options(options)
            .with_json(documents, Convention::VERBATIM)?
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    pub async fn get_document<D>(&self, collection: &str, key: &str) -> Result<D>
    where
        D: DeserializeOwned + Serialize,
    {
        require_name("collection", collection)?;
        require_name("document key", key)?;
        self.get_document_by_id(&format!("{collection}/{key}")).await
    }

    /// Reads a document by its handle `collection/key`.
    pub async fn get_document_by_id<D>(&self, id: &str) -> Result<D>
    where
        D: DeserializeOwned + Serialize,
    {
        let request = ApiRequest::get(document_path(id)?).decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    /// Partially updates a document.
    pub async fn patch_document<D, U>(
        &self,
        id: &str,
        patch: &D,
        options: Option<&PatchDocumentOptions>,
    ) -> Result<PatchDocumentResult<U>>
    where
        D: Serialize + ?Sized,
        U: DeserializeOwned + Serialize,
    {
        let request = ApiRequest::patch(document_path(id)?)
            .with_options(options)
            .with_json(patch, Convention::VERBATIM)?
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    /// Replaces a document.
    pub async fn put_document<D, U>(
        &self,
        id: &str,
        document: &D,
        options: Option<&PutDocumentOptions>,
    ) -> Result<PutDocumentResult<U>>
    where
        D: Serialize + ?Sized,
        U: DeserializeOwned + Serialize,
    {
        let request = ApiRequest::put(document_path(id)?)
            .with_options(options)
            .with_json(document, Convention::VERBATIM)?
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    pub async fn delete_document<U>(
        &self,
        id: &str,
        options: Option<&DeleteDocumentOptions>,
    ) -> Result<DeleteDocumentResponse<U>>
    where
        U: DeserializeOwned + Serialize,
    {
        let request = ApiRequest::delete(document_path(id)?)
            .with_options(options)
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    /// Removes several documents, named by key or by selector object, with
    /// one DELETE carrying the list as its body.
    pub async fn delete_documents<S, U>(
        &self,
        collection: &str,
        selectors: &[S],
        options: Option<&DeleteDocumentOptions>,
    ) -> Result<Vec<DeleteDocumentsDocumentResponse<U>>>
    where
        S: Serialize,
        U: DeserializeOwned + Serialize,
    {
        require_name("collection", collection)?;
        let request = ApiRequest::delete(collection_path(collection))
            .with_options(options)
            .with_json(selectors, Convention::VERBATIM)?
            .decode_as(Convention::VERBATIM);
        execute(self.transport.as_ref(), request).await
    }

    /// Checks a document's existence and revision without fetching it.
    ///
    /// A 304 answer to `If-None-Match` is a success; any other non-2xx
    /// status is an error synthesized from the status, since HEAD answers
    /// carry no body.
    pub async fn head_document(&self, id: &str, header: Option<&HeadDocumentHeader>) -> Result<HeadDocumentResult> {
        let headers = header.map(HeadDocumentHeader::to_headers).unwrap_or_default();
        let request = ApiRequest::head(document_path(id)?, headers);
        let response = dispatch(self.transport.as_ref(), request).await?;

        if response.is_success() || response.status() == 304 {
            return Ok(HeadDocumentResult {
                code: response.status(),
                etag: response.header("etag").map(str::to_string),
            });
        }
        Err(into_api_error(response, Convention::API))
    }
}
