// Holonet - Rust Edition
// A server-rendered web demo that wires a GraphQL client into an HTTP page server

//! # Holonet Library
//!
//! This is the main library crate for Holonet, a small server-rendered web
//! application backed by the public Star Wars GraphQL service. The library
//! root defines the public API and the crate-wide error type.
//!
//! ## Architecture
//!
//! The crate follows a **layered architecture**:
//! ```text
//! Browser / HTTP client
//!        ↓ GET /
//! Server Layer (axum) ← page handler, health check, CORS
//!        ↓ per-request protocol
//! App Composition ← fresh client, page prefetch, fixed-point render pass
//!        ↓ dependency injection (render context)
//! GraphQL Client ← error link → HTTP transport, normalized cache
//!        ↓ HTTP POST
//! External GraphQL service
//! ```
//!
//! ## Core Components
//!
//! - [`GraphQLClient`]: request pipeline plus normalized in-memory cache
//! - [`ClientAccessor`]: fresh client per server request, one memoized
//!   client per browser session
//! - [`App`]: the composition root that drives the server-side data
//!   prefetch handshake and hands the extracted cache state to the page
//! - [`resolve_tree`]: the fixed-point render pass that keeps re-rendering
//!   until no component reports an outstanding data dependency
//! - [`SsrServer`]: the axum host that serves the rendered page with the
//!   cache state embedded under [`STATE_PROP_NAME`]

// GraphQL client: request framing, transport pipeline, cache, accessor
pub mod client;

// Root composition component and the server-side initialization protocol
pub mod app;

// Application configuration (config crate + environment)
pub mod config;

// Demo pages
pub mod pages;

// Static query documents and their typed response shapes
pub mod queries;

// Component tree rendering and fixed-point data resolution
pub mod render;

// HTTP server hosting the server-rendered page
pub mod server;

// Re-export the main types for easy access
pub use app::{App, AppProps, Page, PageContext, PageProps, STATE_PROP_NAME};
pub use client::{
    CacheState, ClientAccessor, ClientBuilder, ClientConfig, ExecutionContext, GraphQLClient,
    GraphQLRequest, NormalizedCache, QueryResult, DEFAULT_ENDPOINT,
};
pub use config::AppConfig;
pub use render::{resolve_tree, Component, Html, QueryHook, RenderContext};
pub use server::{SsrServer, SsrServerBuilder, SsrServerConfig};

use thiserror::Error;

/// Custom error types for Holonet operations
///
/// Query execution never surfaces these to callers directly; transport and
/// query failures are carried inside [`QueryResult`] instead. The variants
/// here cover construction, configuration, and rendering paths.
#[derive(Error, Debug)]
pub enum HolonetError {
    /// Invalid configuration (bad URL, malformed settings file, bad header)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure (network unreachable, timeout)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Non-2xx response from the GraphQL service
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Malformed response body
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failure raised while rendering a component
    #[error("Render error: {0}")]
    Render(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for HolonetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            HolonetError::Network {
                message: format!("Request timed out: {}", error),
            }
        } else if error.is_connect() {
            HolonetError::Network {
                message: format!("Connection failed: {}", error),
            }
        } else {
            HolonetError::Network {
                message: error.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for HolonetError {
    fn from(error: url::ParseError) -> Self {
        HolonetError::Configuration(format!("Invalid URL: {}", error))
    }
}

impl From<::config::ConfigError> for HolonetError {
    fn from(error: ::config::ConfigError) -> Self {
        HolonetError::Configuration(error.to_string())
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, HolonetError>;
