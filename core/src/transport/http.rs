//! `reqwest`-backed transport talking to a real server.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::trace;

use super::Transport;
use crate::config::ConnectionConfig;
use crate::error::{ClientError, Result, TransportError};
use crate::http::{HttpRequest, HttpResponse};

/// HTTP transport bound to one server, one database and one set of
/// credentials for its whole lifetime.
#[derive(Debug, Clone)]
pub struct HttpApiTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiTransport {
    /// Builds a transport that sends `Authorization: Basic ...` with every
    /// request.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let credentials = STANDARD.encode(format!("{}:{}", config.username, config.password));
        let mut authorization =
            HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|e| ClientError::Config(e.to_string()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    /// Wraps a pre-configured client (custom TLS, proxies, auth headers).
    /// `base_url` must already include the `/_db/{database}/` prefix.
    pub fn from_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpApiTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let url = self.url(&request.path);
        trace!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(request.method.into(), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await.map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse::new(status, headers, body))
    }
}
