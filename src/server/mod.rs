// Holonet server implementations
// This contains the HTTP host that exposes the server-rendered page

//! # Holonet Server Module
//!
//! The server layer sits on top of the app composition layer and serves
//! the rendered page over HTTP.
//!
//! ## Request flow
//!
//! ```text
//! GET /
//!   ↓
//! App initialization protocol ← fresh client, prefetch, fixed-point pass
//!   ↓
//! Final render from the warm cache
//!   ↓
//! HTML document with the cache state embedded for the browser bootstrap
//! ```

/// Axum-based SSR host
///
/// Contains:
/// - the page and health-check handlers
/// - CORS and middleware setup
/// - builder pattern for server configuration
pub mod ssr;

// Re-export main server types for easy access
pub use ssr::{SsrServer, SsrServerBuilder, SsrServerConfig};
