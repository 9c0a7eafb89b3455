//! Shapes for `_api/document`.
//!
//! Document bodies are user data and travel under
//! [`Convention::VERBATIM`](crate::serialization::Convention::VERBATIM), so
//! every wire name is spelled out here.

use serde::{Deserialize, Serialize};

use crate::query::{QueryOptions, QueryParam, QueryParams};

#[derive(Debug, Clone, Default)]
pub struct PostDocumentsOptions {
    pub wait_for_sync: Option<bool>,
    pub return_new: Option<bool>,
    pub return_old: Option<bool>,
    pub overwrite: Option<bool>,
}

impl QueryOptions for PostDocumentsOptions {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new()
            .bool("waitForSync", self.wait_for_sync)
            .bool("returnNew", self.return_new)
            .bool("returnOld", self.return_old)
            .bool("overwrite", self.overwrite)
            .build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatchDocumentOptions {
    pub wait_for_sync: Option<bool>,
    pub keep_null: Option<bool>,
    pub merge_objects: Option<bool>,
    pub return_new: Option<bool>,
    pub return_old: Option<bool>,
    pub ignore_revs: Option<bool>,
}

impl QueryOptions for PatchDocumentOptions {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new()
            .bool("waitForSync", self.wait_for_sync)
            .bool("keepNull", self.keep_null)
            .bool("mergeObjects", self.merge_objects)
            .bool("returnNew", self.return_new)
            .bool("returnOld", self.return_old)
            .bool("ignoreRevs", self.ignore_revs)
            .build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PutDocumentOptions {
    pub wait_for_sync: Option<bool>,
    pub return_new: Option<bool>,
    pub return_old: Option<bool>,
    pub ignore_revs: Option<bool>,
}

impl QueryOptions for PutDocumentOptions {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new()
            .bool("waitForSync", self.wait_for_sync)
            .bool("returnNew", self.return_new)
            .bool("returnOld", self.return_old)
            .bool("ignoreRevs", self.ignore_revs)
            .build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteDocumentOptions {
    pub wait_for_sync: Option<bool>,
    pub return_old: Option<bool>,
}

impl QueryOptions for DeleteDocumentOptions {
    fn query_params(&self) -> Vec<QueryParam> {
        QueryParams::new()
            .bool("waitForSync", self.wait_for_sync)
            .bool("returnOld", self.return_old)
            .build()
    }
}

/// Conditional headers for a HEAD request.
#[derive(Debug, Clone, Default)]
pub struct HeadDocumentHeader {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
}

impl HeadDocumentHeader {
    pub(crate) fn to_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(rev) = &self.if_match {
            headers.push(("If-Match".to_string(), rev.clone()));
        }
        if let Some(rev) = &self.if_none_match {
            headers.push(("If-None-Match".to_string(), rev.clone()));
        }
        headers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDocumentResponse<U> {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    /// Present only with `returnNew`.
    pub new: Option<U>,
    /// Present only with `returnOld` on an overwrite.
    pub old: Option<U>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchDocumentResult<U> {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "_oldRev")]
    pub old_rev: String,
    pub new: Option<U>,
    pub old: Option<U>,
}

/// Replacing answers with the same shape as patching.
pub type PutDocumentResult<U> = PatchDocumentResult<U>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDocumentResponse<U> {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    pub old: Option<U>,
}

/// Per-document failure inside a batch answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentError {
    pub error: bool,
    #[serde(rename = "errorNum")]
    pub error_num: i32,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

/// One entry of a batch answer: the per-document result or its error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem<R> {
    Ok(R),
    Err(DocumentError),
}

impl<R> BatchItem<R> {
    pub fn ok(&self) -> Option<&R> {
        match self {
            BatchItem::Ok(result) => Some(result),
            BatchItem::Err(_) => None,
        }
    }

    pub fn err(&self) -> Option<&DocumentError> {
        match self {
            BatchItem::Ok(_) => None,
            BatchItem::Err(err) => Some(err),
        }
    }
}

pub type PostDocumentsDocumentResponse<U> = BatchItem<PostDocumentResponse<U>>;
pub type DeleteDocumentsDocumentResponse<U> = BatchItem<DeleteDocumentResponse<U>>;

/// Answer to a HEAD request: the status and the revision in `ETag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadDocumentResult {
    pub code: u16,
    pub etag: Option<String>,
}

impl HeadDocumentResult {
    /// `If-None-Match` matched the current revision.
    pub fn is_not_modified(&self) -> bool {
        self.code == 304
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{self, Convention};

    #[test]
    fn batch_items_distinguish_errors() {
        let body = br#"[
            {"_key":"1","_id":"c/1","_rev":"_a"},
            {"error":true,"errorNum":1202,"errorMessage":"document not found"}
        ]"#;
        let items: Vec<DeleteDocumentsDocumentResponse<serde_json::Value>> =
            serialization::decode(202, body, Convention::VERBATIM).unwrap();
        assert_eq!(items[0].ok().map(|r| r.key.as_str()), Some("1"));
        assert_eq!(items[1].err().map(|e| e.error_num), Some(1202));
    }

    #[test]
    fn conditional_headers() {
        let header = HeadDocumentHeader {
            if_none_match: Some("\"_a\"".to_string()),
            ..Default::default()
        };
        assert_eq!(
            header.to_headers(),
            vec![("If-None-Match".to_string(), "\"_a\"".to_string())]
        );
        assert!(HeadDocumentHeader::default().to_headers().is_empty());
    }
}
