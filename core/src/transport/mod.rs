//! The transport capability the resource clients are written against.
//!
//! # Design
//! `Transport` has one required method, `send`; the per-verb operations are
//! provided on top of it and may be overridden by an implementation that
//! wants to handle a verb differently. Implementations must return non-2xx
//! answers as ordinary [`HttpResponse`]s. Only failures that leave no
//! response at all are `Err`.
//!
//! Implementations hold immutable configuration only and are shared between
//! concurrent calls behind an `Arc`.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub use self::http::HttpApiTransport;
pub use self::mock::MockTransport;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request. No retries, no caching.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Get, path)).await
    }

    async fn post(&self, path: &str, body: Bytes) -> Result<HttpResponse, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Post, path).with_body(body)).await
    }

    async fn put(&self, path: &str, body: Bytes) -> Result<HttpResponse, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Put, path).with_body(body)).await
    }

    async fn patch(&self, path: &str, body: Bytes) -> Result<HttpResponse, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Patch, path).with_body(body)).await
    }

    async fn delete(&self, path: &str) -> Result<HttpResponse, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Delete, path)).await
    }

    /// DELETE carrying a payload, used by batch removals.
    async fn delete_with_body(&self, path: &str, body: Bytes) -> Result<HttpResponse, TransportError> {
        self.send(HttpRequest::new(HttpMethod::Delete, path).with_body(body)).await
    }

    async fn head(&self, path: &str, headers: Vec<(String, String)>) -> Result<HttpResponse, TransportError> {
        let mut request = HttpRequest::new(HttpMethod::Head, path);
        request.headers = headers;
        self.send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }

    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(path).await
    }

    async fn post(&self, path: &str, body: Bytes) -> Result<HttpResponse, TransportError> {
        (**self).post(path, body).await
    }

    async fn put(&self, path: &str, body: Bytes) -> Result<HttpResponse, TransportError> {
        (**self).put(path, body).await
    }

    async fn patch(&self, path: &str, body: Bytes) -> Result<HttpResponse, TransportError> {
        (**self).patch(path, body).await
    }

    async fn delete(&self, path: &str) -> Result<HttpResponse, TransportError> {
        (**self).delete(path).await
    }

    async fn delete_with_body(&self, path: &str, body: Bytes) -> Result<HttpResponse, TransportError> {
        (**self).delete_with_body(path, body).await
    }

    async fn head(&self, path: &str, headers: Vec<(String, String)>) -> Result<HttpResponse, TransportError> {
        (**self).head(path, headers).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Answers GET and HEAD itself and everything else through `send`.
    struct ShortCircuit;

    #[async_trait]
    impl Transport for ShortCircuit {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(500, Vec::new(), ""))
        }

        async fn get(&self, _path: &str) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(200, Vec::new(), "{}"))
        }

        async fn head(&self, _path: &str, _headers: Vec<(String, String)>) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(304, Vec::new(), ""))
        }
    }

    #[tokio::test]
    async fn shared_transport_keeps_verb_overrides() {
        let shared = Arc::new(ShortCircuit);
        assert_eq!(shared.get("_api/version").await.unwrap().status(), 200);
        assert_eq!(shared.head("_api/document/c/a", Vec::new()).await.unwrap().status(), 304);
        assert_eq!(shared.delete("_api/collection/c").await.unwrap().status(), 500);
    }

    #[tokio::test]
    async fn provided_verbs_build_requests() {
        let mock = Arc::new(MockTransport::new().respond(200, "{}"));
        mock.delete_with_body("_api/document/c", Bytes::from_static(b"[\"a\"]"))
            .await
            .unwrap();
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Delete);
        assert_eq!(sent.body.as_deref(), Some(&b"[\"a\"]"[..]));
    }
}
