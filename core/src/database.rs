//! Client for `_api/database`.
//!
//! Creating, dropping and listing all databases is only allowed through a
//! transport bound to `_system`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::{execute, require_name, ApiRequest};
use crate::query::path_segment;
use crate::serialization::Convention;
use crate::transport::Transport;

const DATABASE_API_PATH: &str = "_api/database";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseUser {
    pub username: String,
    pub passwd: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDatabaseRequest {
    pub name: String,
    pub users: Option<Vec<DatabaseUser>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDatabaseResult {
    pub error: bool,
    pub code: u16,
    pub result: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDatabaseResult {
    pub error: bool,
    pub code: u16,
    pub result: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDatabaseResult {
    pub error: bool,
    pub code: u16,
    pub result: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentDatabaseInfo {
    pub name: String,
    pub id: String,
    pub path: Option<String>,
    pub is_system: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentDatabaseResult {
    pub error: bool,
    pub code: u16,
    pub result: CurrentDatabaseInfo,
}

#[derive(Debug)]
pub struct DatabaseApiClient<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for DatabaseApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> DatabaseApiClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub async fn post_database(&self, request: &PostDatabaseRequest) -> Result<PostDatabaseResult> {
        require_name("database", &request.name)?;
        let request = ApiRequest::post(DATABASE_API_PATH).with_json(request, Convention::API)?;
        execute(self.transport.as_ref(), request).await
    }

    pub async fn delete_database(&self, name: &str) -> Result<DeleteDatabaseResult> {
        require_name("database", name)?;
        let path = format!("{DATABASE_API_PATH}/{}", path_segment(name));
        execute(self.transport.as_ref(), ApiRequest::delete(path)).await
    }

    /// Every database on the server. Use
    /// [`list_user_databases`](Self::list_user_databases) for the ones the
    /// current user may access.
    pub async fn list_databases(&self) -> Result<ListDatabaseResult> {
        execute(self.transport.as_ref(), ApiRequest::get(DATABASE_API_PATH)).await
    }

    pub async fn list_user_databases(&self) -> Result<ListDatabaseResult> {
        execute(self.transport.as_ref(), ApiRequest::get(format!("{DATABASE_API_PATH}/user"))).await
    }

    /// The database this transport is bound to.
    pub async fn get_current_database(&self) -> Result<CurrentDatabaseResult> {
        execute(self.transport.as_ref(), ApiRequest::get(format!("{DATABASE_API_PATH}/current"))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::transport::MockTransport;

    #[tokio::test]
    async fn post_database_encodes_users() {
        let transport = Arc::new(MockTransport::new().respond(201, r#"{"error":false,"code":201,"result":true}"#));
        let client = DatabaseApiClient::new(Arc::clone(&transport));
        let request = PostDatabaseRequest {
            name: "shop".to_string(),
            users: Some(vec![DatabaseUser {
                username: "app".to_string(),
                passwd: None,
                active: Some(true),
            }]),
        };

        let result = client.post_database(&request).await.unwrap();
        assert_eq!(result.code, 201);
        assert!(result.result);

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.path, "_api/database");
        let body: serde_json::Value = serde_json::from_slice(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "name": "shop", "users": [{ "username": "app", "active": true }] })
        );
    }

    #[tokio::test]
    async fn list_and_current() {
        let transport = Arc::new(
            MockTransport::new()
                .respond(200, r#"{"error":false,"code":200,"result":["_system","shop"]}"#)
                .respond(
                    200,
                    r#"{"error":false,"code":200,"result":{"name":"shop","id":"81","path":"none","isSystem":false}}"#,
                ),
        );
        let client = DatabaseApiClient::new(Arc::clone(&transport));

        let list = client.list_user_databases().await.unwrap();
        assert_eq!(list.result, vec!["_system".to_string(), "shop".to_string()]);
        let current = client.get_current_database().await.unwrap();
        assert_eq!(current.result.name, "shop");
        assert!(!current.result.is_system);

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].path, "_api/database/user");
        assert_eq!(requests[1].path, "_api/database/current");
    }

    #[tokio::test]
    async fn forbidden_outside_system() {
        let transport = Arc::new(MockTransport::new().respond(
            403,
            r#"{"error":true,"errorNum":1230,"errorMessage":"operation only allowed in system database","code":403}"#,
        ));
        let client = DatabaseApiClient::new(transport);
        let err = client.list_databases().await.unwrap_err();
        assert_eq!(err.error_num(), Some(1230));
        assert_eq!(err.status(), Some(403));
    }
}
