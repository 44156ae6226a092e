//! Component tree rendering and fixed-point data resolution.
//!
//! Components declare data dependencies during `render` by calling
//! [`RenderContext::use_query`]. On the server, [`resolve_tree`] drives the
//! tree to a fixed point: it renders, collects the fetches that generation
//! registered, awaits them all, and renders again, until a generation
//! registers nothing. Naive single-pass rendering would silently drop data
//! from fetches triggered deeper in the tree than the first pass reaches.

pub mod html;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::client::{GraphQLClient, GraphQLError, GraphQLRequest, QueryResult};
use crate::Result;

/// Rendered markup.
pub type Html = String;

/// A node in the page tree.
///
/// Rendering is synchronous; data arrives through the context, fetched
/// between render generations.
pub trait Component: Send + Sync {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<Html>;
}

/// What `use_query` hands back inside `render`.
#[derive(Debug, Clone)]
pub struct QueryHook<T> {
    /// Typed data, present once the fetch resolved with data.
    pub data: Option<T>,
    /// Query-level errors from a completed fetch.
    pub errors: Vec<GraphQLError>,
    /// Transport-level failure from a completed fetch.
    pub network_error: Option<String>,
    /// True while the fetch has not been issued or has not completed yet.
    pub loading: bool,
}

impl<T> QueryHook<T> {
    fn loading() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
            network_error: None,
            loading: true,
        }
    }
}

impl<T: DeserializeOwned> QueryHook<T> {
    fn from_result(result: &QueryResult) -> Self {
        Self {
            data: result.data_as(),
            errors: result.errors.clone(),
            network_error: result.network_error.clone(),
            loading: false,
        }
    }
}

/// Supplies the client to the component tree and tracks the data
/// dependencies registered during one render generation.
pub struct RenderContext<'a> {
    client: Arc<GraphQLClient>,
    completed: &'a HashMap<String, QueryResult>,
    pending: Vec<GraphQLRequest>,
}

impl<'a> RenderContext<'a> {
    pub fn new(client: Arc<GraphQLClient>, completed: &'a HashMap<String, QueryResult>) -> Self {
        Self {
            client,
            completed,
            pending: Vec::new(),
        }
    }

    /// The client supplied to the tree.
    pub fn client(&self) -> &Arc<GraphQLClient> {
        &self.client
    }

    /// Declare a data dependency.
    ///
    /// Resolution order: the client cache first, then outcomes of fetches
    /// completed in earlier generations (which may carry errors), otherwise
    /// the fetch is registered as pending and the hook reports loading.
    pub fn use_query<T: DeserializeOwned>(&mut self, request: GraphQLRequest) -> QueryHook<T> {
        let key = request.operation_key();

        if let Some(data) = self.client.read_cached(&request) {
            return QueryHook {
                data: serde_json::from_value(data).ok(),
                errors: Vec::new(),
                network_error: None,
                loading: false,
            };
        }

        if let Some(result) = self.completed.get(&key) {
            return QueryHook::from_result(result);
        }

        if !self.pending.iter().any(|r| r.operation_key() == key) {
            self.pending.push(request);
        }
        QueryHook::loading()
    }

    fn take_pending(self) -> Vec<GraphQLRequest> {
        self.pending
    }
}

/// Recursive server-render pass: resolve all data before producing markup.
///
/// Each generation renders the tree, awaits every newly registered fetch in
/// parallel (inter-query order within a generation is unspecified), records
/// the outcomes, and renders again. The pass returns once a generation
/// registers nothing, so the final markup reflects a state where no fetch
/// remains outstanding. A fetch that completed with an error is recorded as
/// completed and not re-issued, so the pass terminates.
///
/// Errors raised while rendering are caught and logged, never propagated;
/// the pass returns whatever markup the last successful render produced.
pub async fn resolve_tree<C>(client: &Arc<GraphQLClient>, root: &C) -> Html
where
    C: Component + ?Sized,
{
    if !client.ssr_mode() {
        warn!("resolve_tree called on a client not in server-rendering mode");
    }

    let mut completed: HashMap<String, QueryResult> = HashMap::new();
    let mut markup = Html::new();
    let mut generation = 0u32;

    loop {
        let mut ctx = RenderContext::new(client.clone(), &completed);
        match root.render(&mut ctx) {
            Ok(html) => markup = html,
            Err(err) => {
                error!("Error while resolving the component tree: {}", err);
                return markup;
            }
        }

        let pending = ctx.take_pending();
        if pending.is_empty() {
            debug!("tree resolved after {} generations", generation);
            return markup;
        }

        generation += 1;
        debug!(
            "render generation {} issued {} fetches",
            generation,
            pending.len()
        );
        let results = join_all(pending.iter().map(|request| client.query(request))).await;
        for (request, result) in pending.iter().zip(results) {
            completed.insert(request.operation_key(), result);
        }
    }
}

/// Single render of a tree against an already-populated cache.
///
/// Used for the final markup pass after [`resolve_tree`] has warmed the
/// cache; nothing is fetched.
pub fn render_once<C>(client: &Arc<GraphQLClient>, root: &C) -> Result<Html>
where
    C: Component + ?Sized,
{
    let completed = HashMap::new();
    let mut ctx = RenderContext::new(client.clone(), &completed);
    root.render(&mut ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{films_data, planets_data, MockTransport};
    use crate::client::{ClientConfig, GraphQLClient};
    use crate::queries::{self, AllFilmsData, AllPlanetsData};
    use crate::HolonetError;

    fn ssr_client(transport: Arc<MockTransport>) -> Arc<GraphQLClient> {
        let mut config = ClientConfig::default();
        config.ssr_mode = true;
        Arc::new(GraphQLClient::with_transport(config, transport))
    }

    /// Renders the planet list, but only once the film query has resolved.
    /// The planet fetch is invisible to the first render generation, the
    /// shape single-pass rendering gets wrong.
    struct NestedPage;

    impl Component for NestedPage {
        fn render(&self, ctx: &mut RenderContext<'_>) -> Result<Html> {
            let films: QueryHook<AllFilmsData> = ctx.use_query(queries::all_films());
            let films = match films.data {
                Some(films) => films,
                None => return Ok(Html::new()),
            };

            let planets: QueryHook<AllPlanetsData> = ctx.use_query(queries::all_planets());
            let planets = match planets.data {
                Some(planets) => planets,
                None => return Ok(Html::new()),
            };

            Ok(format!(
                "films={} planets={}",
                films.all_films.films.len(),
                planets.all_planets.planets.len()
            ))
        }
    }

    struct FailingPage;

    impl Component for FailingPage {
        fn render(&self, _ctx: &mut RenderContext<'_>) -> Result<Html> {
            Err(HolonetError::Render("markup construction failed".into()))
        }
    }

    /// Renders an error notice when the query resolves with errors.
    struct ErrorAwarePage;

    impl Component for ErrorAwarePage {
        fn render(&self, ctx: &mut RenderContext<'_>) -> Result<Html> {
            let films: QueryHook<AllFilmsData> = ctx.use_query(queries::all_films());
            if films.loading {
                return Ok(Html::new());
            }
            match films.data {
                Some(films) => Ok(format!("films={}", films.all_films.films.len())),
                None => Ok(format!("errors={}", films.errors.len())),
            }
        }
    }

    #[tokio::test]
    async fn test_fixed_point_resolves_nested_fetches() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_data("getAllFilms", films_data());
        transport.respond_data("getAllPlanets", planets_data());
        let client = ssr_client(transport.clone());

        let markup = resolve_tree(&client, &NestedPage).await;

        assert_eq!(markup, "films=3 planets=2");
        // One fetch per query, none repeated across generations
        assert_eq!(transport.executions(), 2);
    }

    #[tokio::test]
    async fn test_resolved_cache_contains_both_query_results() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_data("getAllFilms", films_data());
        transport.respond_data("getAllPlanets", planets_data());
        let client = ssr_client(transport);

        resolve_tree(&client, &NestedPage).await;
        let state = client.extract_cache();

        let root = state.get("ROOT_QUERY").unwrap().as_object().unwrap();
        assert!(root.contains_key("getAllFilms"));
        assert!(root.contains_key("getAllPlanets"));
    }

    #[tokio::test]
    async fn test_render_errors_are_caught_not_propagated() {
        let transport = Arc::new(MockTransport::new());
        let client = ssr_client(transport);

        // Completes and yields best-effort (empty) markup
        let markup = resolve_tree(&client, &FailingPage).await;
        assert_eq!(markup, "");
    }

    #[tokio::test]
    async fn test_failed_fetch_still_reaches_fixed_point() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_errors("getAllFilms", &["Cannot query field \"allFilms\""]);
        let client = ssr_client(transport.clone());

        let markup = resolve_tree(&client, &ErrorAwarePage).await;

        assert_eq!(markup, "errors=1");
        // The errored fetch was recorded as completed, never re-issued
        assert_eq!(transport.executions(), 1);
    }

    #[tokio::test]
    async fn test_render_once_reads_only_the_cache() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_data("getAllFilms", films_data());
        transport.respond_data("getAllPlanets", planets_data());
        let client = ssr_client(transport.clone());

        resolve_tree(&client, &NestedPage).await;
        let executions_after_resolve = transport.executions();

        let markup = render_once(&client, &NestedPage).unwrap();
        assert_eq!(markup, "films=3 planets=2");
        assert_eq!(transport.executions(), executions_after_resolve);
    }
}
