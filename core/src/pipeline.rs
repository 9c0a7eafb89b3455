//! The call protocol every resource operation goes through.
//!
//! # Design
//! An operation describes itself as an [`ApiRequest`]: verb, path, optional
//! query string, optional encoded body and the convention used to decode the
//! answer. [`execute`] then:
//!
//! 1. sends it through the matching [`Transport`] verb (the only await),
//! 2. hands the response to [`interpret`], which decodes the success body or
//!    the error body, never both,
//! 3. drops the response on every branch, releasing the body.
//!
//! Nothing here retries or caches. Building and interpreting are plain
//! synchronous functions and can be tested without a transport.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, debug_span, error, warn, Instrument};

use crate::error::{ClientError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{encode_query, QueryOptions};
use crate::serialization::{self, Convention};
use crate::transport::Transport;

/// One resource operation, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    query: String,
    body: Option<Bytes>,
    headers: Vec<(String, String)>,
    response_convention: Convention,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: String::new(),
            body: None,
            headers: Vec::new(),
            response_convention: Convention::API,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// HEAD is the only verb that carries per-call headers.
    pub fn head(path: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            headers,
            ..Self::new(HttpMethod::Head, path)
        }
    }

    /// Appends the encoded options. `None`, or options with nothing set,
    /// leave the path without a query string.
    pub fn with_options<O: QueryOptions + ?Sized>(mut self, options: Option<&O>) -> Self {
        if let Some(options) = options {
            self.query = encode_query(options);
        }
        self
    }

    /// Encodes `body` as the JSON payload under `convention`.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B, convention: Convention) -> Result<Self> {
        self.body = Some(serialization::encode(body, convention)?);
        Ok(self)
    }

    /// Convention used to decode the success or error body.
    pub fn decode_as(mut self, convention: Convention) -> Self {
        self.response_convention = convention;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn response_convention(&self) -> Convention {
        self.response_convention
    }

    /// Path with the query string appended when there is one.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    pub fn into_http(self) -> HttpRequest {
        let mut request = HttpRequest::new(self.method, self.path_and_query());
        request.headers = self.headers;
        match self.body {
            Some(body) => request.with_body(body),
            None => request,
        }
    }
}

/// Sends `request` and decodes the answer into `R`.
pub async fn execute<T, R>(transport: &T, request: ApiRequest) -> Result<R>
where
    T: Transport + ?Sized,
    R: DeserializeOwned + Serialize,
{
    let convention = request.response_convention;
    let response = dispatch(transport, request).await?;
    interpret(response, convention)
}

/// Sends `request` and returns the raw response. Non-2xx statuses are not
/// errors at this level.
pub(crate) async fn dispatch<T>(transport: &T, request: ApiRequest) -> Result<HttpResponse>
where
    T: Transport + ?Sized,
{
    let method = request.method;
    let path = request.path_and_query();
    let span = debug_span!("arango_request", %method, %path);

    async move {
        let body = request.body.unwrap_or_default();
        let result = match method {
            HttpMethod::Get => transport.get(&path).await,
            HttpMethod::Post => transport.post(&path, body).await,
            HttpMethod::Put => transport.put(&path, body).await,
            HttpMethod::Patch => transport.patch(&path, body).await,
            HttpMethod::Delete if body.is_empty() => transport.delete(&path).await,
            HttpMethod::Delete => transport.delete_with_body(&path, body).await,
            HttpMethod::Head => transport.head(&path, request.headers).await,
        };

        match result {
            Ok(response) => {
                debug!(status = response.status(), "response received");
                Ok(response)
            }
            Err(err) => {
                error!(error = %err, "transport failure");
                Err(ClientError::Transport(err))
            }
        }
    }
    .instrument(span)
    .await
}

/// Turns a response into the operation's result.
///
/// Successful responses are decoded into `R`; failed ones into an
/// [`ApiError`](crate::error::ApiError) returned as `ClientError::Api`. The
/// response is consumed either way.
pub fn interpret<R>(response: HttpResponse, convention: Convention) -> Result<R>
where
    R: DeserializeOwned + Serialize,
{
    if response.is_success() {
        let status = response.status();
        let body = response.into_body();
        serialization::decode(status, &body, convention)
    } else {
        Err(into_api_error(response, convention))
    }
}

/// Decodes the error carried by a failed response.
pub(crate) fn into_api_error(response: HttpResponse, convention: Convention) -> ClientError {
    let status = response.status();
    let body = response.into_body();
    let api_error = serialization::decode_error(status, &body, convention);
    warn!(
        status,
        error_num = api_error.error_num,
        message = %api_error.error_message,
        "server reported an error"
    );
    ClientError::Api(api_error)
}

/// Rejects blank text before anything is sent.
pub(crate) fn require_present(kind: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidArgument(format!("{kind} must not be empty")));
    }
    Ok(())
}

/// Rejects a missing identifier, or one that would not stay a single path
/// segment, before anything is sent.
pub(crate) fn require_name(kind: &str, value: &str) -> Result<()> {
    require_present(&format!("{kind} name"), value)?;
    if value.contains('/') {
        return Err(ClientError::InvalidArgument(format!(
            "{kind} name must not contain `/`, got `{value}`"
        )));
    }
    Ok(())
}

/// Splits a document handle `collection/key`, rejecting malformed ones.
pub(crate) fn split_document_id(id: &str) -> Result<(&str, &str)> {
    match id.split_once('/') {
        Some((collection, key))
            if !collection.trim().is_empty() && !key.trim().is_empty() && !key.contains('/') =>
        {
            Ok((collection, key))
        }
        _ => Err(ClientError::InvalidArgument(format!(
            "document id must have the form `collection/key`, got `{id}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::error::TransportError;
    use crate::query::{QueryParam, QueryParams};
    use crate::transport::MockTransport;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Created {
        name: String,
        is_system: bool,
    }

    struct Flags {
        exclude_system: Option<bool>,
    }

    impl QueryOptions for Flags {
        fn query_params(&self) -> Vec<QueryParam> {
            QueryParams::new().bool("excludeSystem", self.exclude_system).build()
        }
    }

    #[test]
    fn options_are_appended_only_when_set() {
        let request = ApiRequest::get("_api/collection").with_options(Some(&Flags {
            exclude_system: Some(true),
        }));
        assert_eq!(request.path_and_query(), "_api/collection?excludeSystem=true");

        let request = ApiRequest::get("_api/collection").with_options(Some(&Flags { exclude_system: None }));
        assert_eq!(request.path_and_query(), "_api/collection");

        let request = ApiRequest::get("_api/collection").with_options::<Flags>(None);
        assert_eq!(request.path_and_query(), "_api/collection");
    }

    #[test]
    fn body_is_encoded_with_the_given_convention() {
        let request = ApiRequest::post("_api/collection")
            .with_json(&serde_json::json!({ "wait_for_sync": true, "name": "c" }), Convention::API)
            .unwrap();
        let http = request.into_http();
        assert_eq!(http.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_slice(http.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "name": "c", "waitForSync": true }));
    }

    #[test]
    fn success_statuses_decode_the_result() {
        for status in [200, 201, 202] {
            let response = HttpResponse::new(status, Vec::new(), r#"{"name":"c","isSystem":false}"#);
            let created: Created = interpret(response, Convention::API).unwrap();
            assert_eq!(
                created,
                Created {
                    name: "c".to_string(),
                    is_system: false
                }
            );
        }
    }

    #[test]
    fn success_never_takes_the_error_path() {
        // An error-shaped body on a 2xx status is decoded as the result type.
        let body = r#"{"error":true,"errorNum":1203,"errorMessage":"x","code":404}"#;
        let response = HttpResponse::new(200, Vec::new(), body);
        let value: serde_json::Value = interpret(response, Convention::VERBATIM).unwrap();
        assert_eq!(value["errorNum"], 1203);
    }

    #[test]
    fn failure_statuses_never_take_the_success_path() {
        // A result-shaped body on a 4xx/5xx status still yields an API error.
        for status in [400, 404, 409, 500, 503] {
            let response = HttpResponse::new(status, Vec::new(), r#"{"name":"c","isSystem":false}"#);
            let err = interpret::<Created>(response, Convention::API).unwrap_err();
            let api = err.api_error().expect("api error");
            assert_eq!(api.code, status);
            assert!(api.is_synthesized());
        }
    }

    #[test]
    fn failure_carries_server_error() {
        let body = r#"{"error":true,"errorNum":1203,"errorMessage":"collection or view not found","code":404}"#;
        let response = HttpResponse::new(404, Vec::new(), body);
        let err = interpret::<Created>(response, Convention::API).unwrap_err();
        assert_eq!(err.error_num(), Some(1203));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn malformed_success_body_is_a_decode_failure() {
        let response = HttpResponse::new(200, Vec::new(), "not json");
        let err = interpret::<Created>(response, Convention::API).unwrap_err();
        assert!(matches!(err, ClientError::Decode { status: 200, .. }));
    }

    #[test]
    fn document_ids_are_validated() {
        assert_eq!(split_document_id("users/42").unwrap(), ("users", "42"));
        assert!(split_document_id("users").is_err());
        assert!(split_document_id("/42").is_err());
        assert!(split_document_id("users/").is_err());
        assert!(split_document_id("users/42/x").is_err());
        assert!(require_name("collection", " ").is_err());
        assert!(require_name("collection", "users").is_ok());
        assert!(require_name("collection", "a/b").is_err());
        assert!(require_present("query", "RETURN 4 / 2").is_ok());
    }

    #[tokio::test]
    async fn execute_dispatches_on_the_verb() {
        let transport = MockTransport::new()
            .respond(200, r#"{"name":"c","isSystem":false}"#)
            .respond(200, r#"{"name":"c","isSystem":false}"#)
            .respond(200, r#"{"name":"c","isSystem":false}"#);

        let _: Created = execute(&transport, ApiRequest::put("_api/collection/c/truncate"))
            .await
            .unwrap();
        let _: Created = execute(
            &transport,
            ApiRequest::delete("_api/document/c")
                .with_json(&["a", "b"], Convention::VERBATIM)
                .unwrap(),
        )
        .await
        .unwrap();
        let _: Created = execute(&transport, ApiRequest::delete("_api/collection/c")).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert!(requests[0].body.is_none());
        assert_eq!(requests[1].method, HttpMethod::Delete);
        assert_eq!(requests[1].body.as_deref(), Some(&b"[\"a\",\"b\"]"[..]));
        assert_eq!(requests[2].method, HttpMethod::Delete);
        assert!(requests[2].body.is_none());
    }

    #[tokio::test]
    async fn transport_failure_is_not_an_api_error() {
        let transport = MockTransport::new().fail(TransportError::Timeout("30s".to_string()));
        let err = execute::<_, Created>(&transport, ApiRequest::get("_api/collection"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Timeout(_))));
    }
}
