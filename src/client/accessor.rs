//! Client accessor.
//!
//! The accessor owns the dual-mode client lifecycle. Server execution
//! contexts get a brand-new client on every call so one request's fetched
//! data can never leak into another concurrent request's response. Browser
//! execution contexts construct a single client at most once per session
//! and reuse it across page navigations, preserving cache continuity.
//!
//! The execution context is an explicit parameter rather than ambient
//! global detection, so both paths are testable without a real network or
//! a real browser. The accessor itself is owned by the host application's
//! startup sequence and passed to the composition root.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::{CacheState, ClientBuilder, ClientConfig, GraphQLClient, Transport};
use crate::Result;

/// Whether code is currently running as part of handling a server request
/// or inside a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    Server,
    Browser,
}

/// Hands out client instances with the lifecycle appropriate to the
/// execution context.
#[derive(Debug)]
pub struct ClientAccessor {
    context: ExecutionContext,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    // Only populated in the browser context. Created at most once per
    // session, never torn down.
    browser_client: OnceCell<Arc<GraphQLClient>>,
}

impl ClientAccessor {
    pub fn new(context: ExecutionContext, config: ClientConfig) -> Self {
        Self {
            context,
            config,
            transport: None,
            browser_client: OnceCell::new(),
        }
    }

    /// Use a custom transport pipeline for every client this accessor
    /// builds, in place of the default error link + HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The execution context this accessor was created for.
    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// Get a client instance.
    ///
    /// - `Server`: always constructs and returns a brand-new instance,
    ///   ignoring any previously created one.
    /// - `Browser`: constructs the process-wide instance once (seeded with
    ///   `initial_state` if provided) and returns the same instance on
    ///   every subsequent call; later `initial_state` values are ignored.
    pub fn client(&self, initial_state: Option<CacheState>) -> Result<Arc<GraphQLClient>> {
        match self.context {
            ExecutionContext::Server => Ok(Arc::new(self.build_client(initial_state)?)),
            ExecutionContext::Browser => self
                .browser_client
                .get_or_try_init(|| self.build_client(initial_state).map(Arc::new))
                .cloned(),
        }
    }

    fn build_client(&self, initial_state: Option<CacheState>) -> Result<GraphQLClient> {
        let mut builder = ClientBuilder::from_config(self.config.clone())
            .ssr_mode(self.context == ExecutionContext::Server);
        if let Some(transport) = &self.transport {
            builder = builder.transport(transport.clone());
        }
        if let Some(state) = initial_state {
            builder = builder.initial_state(state);
        }
        builder.build()
    }
}
