//! GraphQL client.
//!
//! The client wraps a request pipeline (error-observing stage + HTTP
//! transport) and a normalized in-memory cache, optionally pre-seeded from
//! a serialized state snapshot. Query failures are never returned as `Err`:
//! transport-level and query-level errors both surface as fields of
//! [`QueryResult`], the way callers are expected to consume them.

pub mod accessor;
pub mod cache;
pub mod request;
pub mod response;
pub mod transport;

pub use accessor::{ClientAccessor, ExecutionContext};
pub use cache::{CacheState, NormalizedCache};
pub use request::GraphQLRequest;
pub use response::{GraphQLError, GraphQLLocation, GraphQLResponse, PathSegment};
pub use transport::{ErrorLink, HttpTransport, Transport};

use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::Result;

/// The public Star Wars GraphQL service.
pub const DEFAULT_ENDPOINT: &str = "https://swapi-graphql.netlify.app/.netlify/functions/index";

/// Configuration for a [`GraphQLClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint the HTTP transport posts to.
    pub endpoint: Url,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// True while rendering on the server, false in a browser session.
    pub ssr_mode: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).unwrap(),
            timeout_ms: 30_000,
            user_agent: format!("holonet/{}", env!("CARGO_PKG_VERSION")),
            ssr_mode: false,
        }
    }
}

/// Outcome of a query execution.
///
/// Mirrors the shape data-fetching callers consume: optional data, a list
/// of query-level errors, an optional transport-level failure. Executing a
/// query never throws; inspect these fields instead.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// The operation's data, absent on total failure.
    pub data: Option<Value>,
    /// Structured errors returned by the service.
    pub errors: Vec<GraphQLError>,
    /// Transport-level failure description, when the request never produced
    /// a GraphQL response at all.
    pub network_error: Option<String>,
}

impl QueryResult {
    /// Deserialize the data into a typed response shape.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.data
            .as_ref()
            .and_then(|data| serde_json::from_value(data.clone()).ok())
    }

    /// True when either error channel is populated.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.network_error.is_some()
    }
}

/// A GraphQL client instance.
///
/// Exactly one instance exists per server request (created and discarded
/// within that request), or exactly one per browser session (held for the
/// page's lifetime). See [`ClientAccessor`].
#[derive(Debug)]
pub struct GraphQLClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    cache: Mutex<NormalizedCache>,
}

impl GraphQLClient {
    /// Create a client with the default pipeline for the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = transport::default_pipeline(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client over an already-composed pipeline.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            cache: Mutex::new(NormalizedCache::new()),
        }
    }

    /// Create a client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// True while this instance renders on the server.
    pub fn ssr_mode(&self) -> bool {
        self.config.ssr_mode
    }

    /// The endpoint this client is configured against.
    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    /// Execute a query through the pipeline, consulting the cache first.
    ///
    /// On success the response data is written into the cache (normalized)
    /// before being returned. Partial data arriving alongside errors is
    /// still cached. Failures are carried in the result, never returned as
    /// `Err`.
    pub async fn query(&self, request: &GraphQLRequest) -> QueryResult {
        let key = request.operation_key();

        if let Some(data) = self.cache.lock().read_query(&key) {
            debug!("cache hit for operation {}", key);
            return QueryResult {
                data: Some(data),
                ..Default::default()
            };
        }

        match self.transport.execute(request).await {
            Ok(response) => {
                let data = response.data.filter(|d| !d.is_null());
                if let Some(ref data) = data {
                    self.cache.lock().write_query(&key, data);
                }
                QueryResult {
                    data,
                    errors: response.errors,
                    network_error: None,
                }
            }
            Err(err) => QueryResult {
                data: None,
                errors: Vec::new(),
                network_error: Some(err.to_string()),
            },
        }
    }

    /// Read an operation's result from the cache without fetching.
    pub fn read_cached(&self, request: &GraphQLRequest) -> Option<Value> {
        self.cache.lock().read_query(&request.operation_key())
    }

    /// Snapshot the cache as a serialized state blob.
    pub fn extract_cache(&self) -> CacheState {
        self.cache.lock().extract()
    }

    /// Replace the cache contents from a serialized state blob.
    pub fn restore_cache(&self, state: CacheState) {
        *self.cache.lock() = NormalizedCache::restore(state);
    }

    /// True when the cache holds no records.
    pub fn cache_is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

/// Builder for creating a [`GraphQLClient`].
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    initial_state: Option<CacheState>,
}

impl ClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
            initial_state: None,
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            initial_state: None,
        }
    }

    /// Set the endpoint URL.
    pub fn endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.config.endpoint = Url::parse(endpoint)?;
        Ok(self)
    }

    /// Set the request timeout.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    /// Set the server-rendering mode flag.
    pub fn ssr_mode(mut self, ssr_mode: bool) -> Self {
        self.config.ssr_mode = ssr_mode;
        self
    }

    /// Replace the default pipeline with a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Seed the cache from a previously extracted state.
    pub fn initial_state(mut self, state: CacheState) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GraphQLClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => transport::default_pipeline(&self.config)?,
        };
        let client = GraphQLClient::with_transport(self.config, transport);
        if let Some(state) = self.initial_state {
            client.restore_cache(state);
        }
        Ok(client)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned transports and fixtures shared across the crate's tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use super::request::GraphQLRequest;
    use super::response::{GraphQLError, GraphQLResponse};
    use super::transport::Transport;
    use crate::{HolonetError, Result};

    /// Terminal transport serving canned responses keyed by operation name.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        responses: Mutex<HashMap<String, GraphQLResponse>>,
        fail_with: Mutex<Option<String>>,
        executed: AtomicUsize,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, operation: &str, response: GraphQLResponse) {
            self.responses
                .lock()
                .insert(operation.to_string(), response);
        }

        pub fn respond_data(&self, operation: &str, data: Value) {
            self.respond(
                operation,
                GraphQLResponse {
                    data: Some(data),
                    errors: vec![],
                },
            );
        }

        pub fn respond_errors(&self, operation: &str, messages: &[&str]) {
            self.respond(
                operation,
                GraphQLResponse {
                    data: None,
                    errors: messages
                        .iter()
                        .map(|m| GraphQLError {
                            message: m.to_string(),
                            locations: vec![],
                            path: None,
                        })
                        .collect(),
                },
            );
        }

        /// Make every execution fail at the transport level.
        pub fn fail_network(&self, message: &str) {
            *self.fail_with.lock() = Some(message.to_string());
        }

        /// Number of executions that reached this transport.
        pub fn executions(&self) -> usize {
            self.executed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse> {
            self.executed.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.fail_with.lock().clone() {
                return Err(HolonetError::Network { message });
            }
            let key = request.operation_name.clone().unwrap_or_default();
            self.responses
                .lock()
                .get(&key)
                .cloned()
                .ok_or_else(|| HolonetError::Network {
                    message: format!("no canned response for operation {}", key),
                })
        }
    }

    pub fn films_data() -> Value {
        json!({
            "allFilms": {
                "films": [
                    {"id": "ZmlsbXM6MQ==", "title": "A New Hope"},
                    {"id": "ZmlsbXM6Mg==", "title": "The Empire Strikes Back"},
                    {"id": "ZmlsbXM6Mw==", "title": "Return of the Jedi"}
                ]
            }
        })
    }

    pub fn planets_data() -> Value {
        json!({
            "allPlanets": {
                "planets": [
                    {"id": "cGxhbmV0czox", "name": "Tatooine"},
                    {"id": "cGxhbmV0czoy", "name": "Alderaan"}
                ]
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{films_data, MockTransport};
    use super::*;

    fn client_with(transport: Arc<MockTransport>) -> GraphQLClient {
        GraphQLClient::with_transport(ClientConfig::default(), transport)
    }

    fn films_request() -> GraphQLRequest {
        GraphQLRequest::query("query getAllFilms { allFilms { films { id title } } }")
            .operation_name("getAllFilms")
    }

    #[tokio::test]
    async fn test_query_fetches_then_serves_from_cache() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_data("getAllFilms", films_data());
        let client = client_with(transport.clone());

        let first = client.query(&films_request()).await;
        assert!(first.data.is_some());
        assert!(!first.has_errors());

        let second = client.query(&films_request()).await;
        assert_eq!(second.data, first.data);
        // The repeated query never reached the transport
        assert_eq!(transport.executions(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_result_field() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_network("connection refused");
        let client = client_with(transport);

        let result = client.query(&films_request()).await;
        assert!(result.data.is_none());
        assert!(result.errors.is_empty());
        assert!(result.network_error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_structured_errors_become_result_fields() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_errors("getAllFilms", &["Cannot query field \"allFilms\""]);
        let client = client_with(transport);

        let result = client.query(&films_request()).await;
        assert!(result.data.is_none());
        assert_eq!(result.errors.len(), 1);
        assert!(result.network_error.is_none());
        // Nothing got cached for the failed operation
        assert!(client.cache_is_empty());
    }

    #[tokio::test]
    async fn test_builder_seeds_cache_from_initial_state() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_data("getAllFilms", films_data());
        let warm = client_with(transport.clone());
        warm.query(&films_request()).await;

        let seeded = GraphQLClient::builder()
            .transport(transport.clone())
            .initial_state(warm.extract_cache())
            .build()
            .unwrap();

        let result = seeded.query(&films_request()).await;
        assert!(result.data.is_some());
        // Answered entirely from the restored state
        assert_eq!(transport.executions(), 1);
    }

    #[tokio::test]
    async fn test_typed_data_access() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_data("getAllFilms", films_data());
        let client = client_with(transport);

        let result = client.query(&films_request()).await;
        let data: crate::queries::AllFilmsData = result.data_as().unwrap();
        assert_eq!(data.all_films.films.len(), 3);
        assert_eq!(data.all_films.films[0].title, "A New Hope");
    }
}
