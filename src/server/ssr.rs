//! Server-rendered page host.
//!
//! A thin axum server: `GET /` runs the app initialization protocol,
//! renders final markup from the warm cache, and ships a full HTML document
//! with the serialized cache state embedded under
//! [`STATE_PROP_NAME`](crate::app::STATE_PROP_NAME). Redirects raised
//! during prefetch short-circuit to a 302. Protocol failures degrade to a
//! logged 500; nothing is fatal to the process.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html as HtmlResponse, IntoResponse, Redirect, Response},
    routing::get,
    Router, Server,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::app::{App, AppProps, STATE_PROP_NAME};
use crate::client::{ClientAccessor, ClientConfig, ExecutionContext};
use crate::pages::IndexPage;

/// SSR server configuration
#[derive(Debug, Clone)]
pub struct SsrServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

impl Default for SsrServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_enabled: true,
        }
    }
}

struct AppState {
    accessor: ClientAccessor,
}

/// SSR server
pub struct SsrServer {
    config: SsrServerConfig,
    client_config: ClientConfig,
}

impl SsrServer {
    pub fn new() -> Self {
        Self {
            config: SsrServerConfig::default(),
            client_config: ClientConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SsrServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_client_config(mut self, client_config: ClientConfig) -> Self {
        self.client_config = client_config;
        self
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        // One accessor for the whole host; the server execution context
        // hands every request its own fresh client.
        let accessor =
            ClientAccessor::new(ExecutionContext::Server, self.client_config.clone());
        let state = Arc::new(AppState { accessor });

        let mut app = Router::new()
            .route("/", get(index_page))
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.cors_enabled {
            app = app.layer(CorsLayer::permissive());
        }

        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!("🚀 Holonet server running on http://localhost:{}", self.config.port);
        info!("🔗 GraphQL service: {}", self.client_config.endpoint);

        Server::bind(&addr.parse()?)
            .serve(app.into_make_service())
            .await?;
        Ok(())
    }
}

impl Default for SsrServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder pattern for server setup
pub struct SsrServerBuilder {
    server: SsrServer,
}

impl SsrServerBuilder {
    pub fn new() -> Self {
        Self {
            server: SsrServer::new(),
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        let mut config = self.server.config.clone();
        config.host = host.to_string();
        self.server = self.server.with_config(config);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        let mut config = self.server.config.clone();
        config.port = port;
        self.server = self.server.with_config(config);
        self
    }

    pub fn with_cors(mut self, cors_enabled: bool) -> Self {
        let mut config = self.server.config.clone();
        config.cors_enabled = cors_enabled;
        self.server = self.server.with_config(config);
        self
    }

    pub fn with_client_config(mut self, client_config: ClientConfig) -> Self {
        self.server = self.server.with_client_config(client_config);
        self
    }

    pub async fn build_and_run(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server.run().await
    }
}

impl Default for SsrServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// Page handler: protocol, then final render from the warm cache
async fn index_page(State(state): State<Arc<AppState>>) -> Response {
    let app = App::new(Arc::new(IndexPage));

    let props = match app.get_initial_props(&state.accessor).await {
        Ok(props) => props,
        Err(err) => {
            error!("Page initialization failed: {}", err);
            return error_page();
        }
    };

    if let Some(location) = props.redirect.as_deref() {
        return Redirect::temporary(location).into_response();
    }

    let client = match props.client.clone() {
        Some(client) => client,
        None => {
            error!("Page initialization returned no client");
            return error_page();
        }
    };

    match app.render(&client) {
        Ok(markup) => HtmlResponse(render_document(&props, &markup)).into_response(),
        Err(err) => {
            error!("Failed to render page: {}", err);
            error_page()
        }
    }
}

fn error_page() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        HtmlResponse("<h1>Something went wrong</h1>".to_string()),
    )
        .into_response()
}

// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Holonet server is running!")
}

/// Wrap page markup in a full document, embedding the serialized cache
/// state under the well-known property name so the browser bootstrap can
/// read it back without a network round trip.
fn render_document(props: &AppProps, markup: &str) -> String {
    let state_json = match &props.state {
        Some(state) => {
            serde_json::to_string(state).unwrap_or_else(|_| "{}".to_string())
        }
        None => "{}".to_string(),
    };
    // Keep "</script>" sequences inside the state from closing the tag
    let state_json = state_json.replace('<', "\\u003c");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Holonet</title>
  </head>
  <body>
    <div id="root">{}</div>
    <script>window.{} = {};</script>
  </body>
</html>
"#,
        markup, STATE_PROP_NAME, state_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PageProps;
    use crate::client::{CacheState, NormalizedCache};
    use serde_json::json;

    fn props_with_state(state: Option<CacheState>) -> AppProps {
        AppProps {
            page_props: PageProps::new(),
            state,
            redirect: None,
            client: None,
        }
    }

    #[test]
    fn test_document_embeds_state_under_well_known_name() {
        let mut cache = NormalizedCache::new();
        cache.write_query("getAllFilms", &json!({"allFilms": {"films": []}}));

        let document = render_document(&props_with_state(Some(cache.extract())), "<p>hi</p>");

        assert!(document.contains("window.__GRAPHQL_STATE__ = {"));
        assert!(document.contains("getAllFilms"));
        assert!(document.contains(r#"<div id="root"><p>hi</p></div>"#));
    }

    #[test]
    fn test_document_without_state_embeds_empty_object() {
        let document = render_document(&props_with_state(None), "");
        assert!(document.contains("window.__GRAPHQL_STATE__ = {};"));
    }

    #[test]
    fn test_state_cannot_break_out_of_the_script_tag() {
        let mut cache = NormalizedCache::new();
        cache.write_query(
            "q",
            &json!({"note": "</script><script>alert(1)</script>"}),
        );

        let document = render_document(&props_with_state(Some(cache.extract())), "");
        assert!(!document.contains("</script><script>alert(1)"));
        assert!(document.contains("\\u003c/script"));
    }
}
