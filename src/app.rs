//! Root composition component.
//!
//! The app wraps a page, supplies the client to its tree through the render
//! context, and drives the server-side initialization protocol: fresh
//! client, page prefetch hook, fixed-point render pass, cache extraction.
//! The extracted state travels to the browser inside the page payload under
//! [`STATE_PROP_NAME`]; the client instance itself is never serialized.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{CacheState, ClientAccessor, ExecutionContext, GraphQLClient};
use crate::render::{render_once, resolve_tree, Component, Html};
use crate::Result;

/// Fixed, well-known property name under which the serialized cache state
/// is embedded in the rendered page payload.
pub const STATE_PROP_NAME: &str = "__GRAPHQL_STATE__";

/// Extra props a page's prefetch hook merges into its rendered props.
pub type PageProps = Map<String, Value>;

/// Handle passed to a page's prefetch hook.
///
/// Exposes the request's client instance so the hook can issue queries
/// ahead of render, and lets the hook finalize the response (redirect),
/// which skips the render pass entirely.
pub struct PageContext {
    client: Arc<GraphQLClient>,
    redirect: Option<String>,
}

impl PageContext {
    pub fn new(client: Arc<GraphQLClient>) -> Self {
        Self {
            client,
            redirect: None,
        }
    }

    /// The client instance handling this request.
    pub fn client(&self) -> &Arc<GraphQLClient> {
        &self.client
    }

    /// Finalize the response with a redirect. No markup will be produced.
    pub fn redirect_to(&mut self, location: impl Into<String>) {
        self.redirect = Some(location.into());
    }

    /// True once the response has been finalized.
    pub fn is_response_ended(&self) -> bool {
        self.redirect.is_some()
    }

    /// The redirect location, if one was set.
    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }
}

/// A page component with an optional server-side prefetch hook.
#[async_trait]
pub trait Page: Component {
    /// Issue queries ahead of render and contribute extra page props.
    ///
    /// The default declares no prefetch. Results of queries issued here are
    /// cached on the client and reused when the same query runs again
    /// inside the tree.
    async fn get_initial_props(&self, _ctx: &mut PageContext) -> Result<PageProps> {
        Ok(PageProps::new())
    }
}

/// Everything the calling layer needs after the initialization protocol.
///
/// Serializing this value produces the page payload: page props, the
/// serialized cache state, and the redirect location when one was set. The
/// client field is skipped so the page transport only ever embeds the
/// extracted state, never the instance.
#[derive(Debug, Serialize)]
pub struct AppProps {
    #[serde(rename = "pageProps")]
    pub page_props: PageProps,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<CacheState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    /// The live client, returned for reuse by the calling layer.
    #[serde(skip)]
    pub client: Option<Arc<GraphQLClient>>,
}

/// The root composition component.
pub struct App {
    page: Arc<dyn Page>,
}

impl App {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self { page }
    }

    /// Server-side initialization protocol, executed once per incoming
    /// request before any markup is produced.
    ///
    /// 1. Obtain a fresh client from the accessor.
    /// 2. Invoke the page's prefetch hook with a handle to that client.
    /// 3. If the hook finalized the response, return the collected page
    ///    props only, with no render pass and no cache state.
    /// 4. Otherwise resolve the full tree to a fixed point (errors are
    ///    caught and logged inside the pass).
    /// 5. Extract the populated cache as the serialized state.
    /// 6. Return page props, state, and the client for reuse.
    pub async fn get_initial_props(&self, accessor: &ClientAccessor) -> Result<AppProps> {
        let client = accessor.client(None)?;

        let mut ctx = PageContext::new(client.clone());
        let page_props = self.page.get_initial_props(&mut ctx).await?;

        if ctx.is_response_ended() {
            debug!("response finalized during prefetch, skipping render pass");
            return Ok(AppProps {
                page_props,
                state: None,
                redirect: ctx.redirect().map(str::to_string),
                client: None,
            });
        }

        if accessor.context() == ExecutionContext::Server {
            resolve_tree(&client, self.page.as_ref()).await;
        }

        let state = client.extract_cache();
        Ok(AppProps {
            page_props,
            state: Some(state),
            redirect: None,
            client: Some(client),
        })
    }

    /// Produce the final markup from an already-populated cache.
    pub fn render(&self, client: &Arc<GraphQLClient>) -> Result<Html> {
        render_once(client, self.page.as_ref())
    }

    /// Browser-side bootstrap: reuse the instance handed down from the
    /// server-rendered payload when present, otherwise obtain one from the
    /// accessor, seeded with the state embedded in the page.
    pub fn hydrate(
        accessor: &ClientAccessor,
        handed_down: Option<Arc<GraphQLClient>>,
        state: Option<CacheState>,
    ) -> Result<Arc<GraphQLClient>> {
        match handed_down {
            Some(client) => Ok(client),
            None => accessor.client(state),
        }
    }
}
