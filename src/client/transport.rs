//! Request pipeline stages.
//!
//! The pipeline is a chain of [`Transport`] implementations: an
//! error-observing stage wrapping a terminal HTTP stage. The error stage
//! logs every transport-level failure and every query-level error entry,
//! then passes the result through unmodified. No retries, no recovery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::error;
use url::Url;

use super::request::GraphQLRequest;
use super::response::GraphQLResponse;
use super::ClientConfig;
use crate::{HolonetError, Result};

/// A stage in the request pipeline.
///
/// Terminal stages send the request somewhere; decorator stages wrap an
/// inner transport and observe or annotate the exchange.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse>;
}

/// Terminal stage: GraphQL-over-HTTP against a single fixed endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build the HTTP stage from a client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config.user_agent.parse().map_err(|e| {
                HolonetError::Configuration(format!("Invalid user agent: {}", e))
            })?,
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                HolonetError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The endpoint this transport posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| HolonetError::Network {
                message: format!("GraphQL request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(HolonetError::Server {
                status: response.status().as_u16(),
                message: format!("GraphQL server error: {}", response.status()),
            });
        }

        response
            .json::<GraphQLResponse>()
            .await
            .map_err(|e| HolonetError::Parse(format!("Failed to parse GraphQL response: {}", e)))
    }
}

/// Decorator stage: logs errors without altering the result.
#[derive(Debug)]
pub struct ErrorLink {
    inner: Arc<dyn Transport>,
}

impl ErrorLink {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for ErrorLink {
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse> {
        let result = self.inner.execute(request).await;
        match &result {
            Ok(response) => {
                for err in &response.errors {
                    error!(
                        "[GraphQL error] message: {}, locations: {:?}, path: {:?}",
                        err.message, err.locations, err.path
                    );
                }
            }
            Err(err) => error!("[Network error] {}", err),
        }
        result
    }
}

/// The default pipeline: error observation first, HTTP transport last.
pub fn default_pipeline(config: &ClientConfig) -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(ErrorLink::new(Arc::new(HttpTransport::new(
        config,
    )?))))
}
