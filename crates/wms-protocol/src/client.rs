//! HTTP transport used for capability and map requests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;
use wms_common::{WmsError, WmsResult};

/// Fetches the body of a URL.
///
/// Non-2xx responses and connection failures are reported as
/// [`WmsError::Transport`] carrying the URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> WmsResult<Bytes>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str) -> WmsResult<Bytes> {
        (**self).get(url).await
    }
}

/// [`Transport`] backed by a shared `reqwest` client.
///
/// No request timeout is configured and failed requests are not retried.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> WmsResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("wms-video/", env!("CARGO_PKG_VERSION")))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| WmsError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> WmsResult<Bytes> {
        debug!(url = %url, "HTTP GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WmsError::Transport {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response.bytes().await.map_err(|e| transport_error(url, e))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> WmsError {
    WmsError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}
