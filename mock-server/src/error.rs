use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Server error numbers the emulation answers with.
pub mod codes {
    pub const BAD_PARAMETER: i32 = 10;
    pub const FORBIDDEN: i32 = 11;
    pub const UNKNOWN_PATH: i32 = 404;
    pub const CORRUPTED_JSON: i32 = 600;
    pub const CONFLICT: i32 = 1200;
    pub const DOCUMENT_NOT_FOUND: i32 = 1202;
    pub const COLLECTION_NOT_FOUND: i32 = 1203;
    pub const DUPLICATE_NAME: i32 = 1207;
    pub const ILLEGAL_NAME: i32 = 1208;
    pub const UNIQUE_CONSTRAINT_VIOLATED: i32 = 1210;
    pub const DOCUMENT_KEY_BAD: i32 = 1221;
    pub const DOCUMENT_TYPE_INVALID: i32 = 1227;
    pub const DATABASE_NOT_FOUND: i32 = 1228;
    pub const DATABASE_NAME_INVALID: i32 = 1229;
    pub const USE_SYSTEM_DATABASE: i32 = 1230;
    pub const EDGE_ATTRIBUTE_MISSING: i32 = 1233;
    pub const QUERY_PARSE: i32 = 1501;
    pub const QUERY_BIND_PARAMETER_MISSING: i32 = 1551;
    pub const CURSOR_NOT_FOUND: i32 = 1600;
    pub const GRAPH_NOT_FOUND: i32 = 1924;
    pub const GRAPH_DUPLICATE: i32 = 1925;
    pub const VERTEX_COLLECTION_NOT_USED: i32 = 1947;
}

/// An error answer in the server's `{error, code, errorNum, errorMessage}`
/// shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArangoError {
    pub status: StatusCode,
    pub error_num: i32,
    pub message: String,
}

impl ArangoError {
    pub fn new(status: StatusCode, error_num: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            error_num,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::FORBIDDEN,
            "not authorized to execute this request",
        )
    }

    pub fn unknown_path(path: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::UNKNOWN_PATH, format!("unknown path '{path}'"))
    }

    pub fn bad_parameter(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_PARAMETER, message)
    }

    pub fn corrupted_json(detail: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::CORRUPTED_JSON, format!("VPackError error: {detail}"))
    }

    pub fn illegal_name() -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::ILLEGAL_NAME, "illegal name")
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::new(StatusCode::CONFLICT, codes::DUPLICATE_NAME, format!("duplicate name: {name}"))
    }

    pub fn collection_not_found(name: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            codes::COLLECTION_NOT_FOUND,
            format!("collection or view not found: {name}"),
        )
    }

    pub fn document_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::DOCUMENT_NOT_FOUND, "document not found")
    }

    pub fn conflict() -> Self {
        Self::new(StatusCode::PRECONDITION_FAILED, codes::CONFLICT, "conflict, _rev values do not match")
    }

    pub fn database_not_found(name: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            codes::DATABASE_NOT_FOUND,
            format!("database not found: {name}"),
        )
    }

    pub fn use_system_database() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            codes::USE_SYSTEM_DATABASE,
            "operation only allowed in system database",
        )
    }

    pub fn graph_not_found(name: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::GRAPH_NOT_FOUND, format!("graph '{name}' not found"))
    }

    pub fn cursor_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::CURSOR_NOT_FOUND, "cursor not found")
    }

    /// The per-item error entry of a batch answer. Batch items carry no
    /// `code`, the HTTP status belongs to the whole answer.
    pub fn to_item(&self) -> serde_json::Value {
        json!({
            "error": true,
            "errorNum": self.error_num,
            "errorMessage": self.message,
        })
    }
}

impl IntoResponse for ArangoError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": true,
            "code": self.status.as_u16(),
            "errorNum": self.error_num,
            "errorMessage": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_items_omit_the_status() {
        let item = ArangoError::document_not_found().to_item();
        assert_eq!(item["errorNum"], 1202);
        assert!(item.get("code").is_none());
    }

    #[test]
    fn unauthorized_uses_forbidden_number() {
        let err = ArangoError::unauthorized();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_num, codes::FORBIDDEN);
    }
}
