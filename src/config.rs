//! Application configuration.
//!
//! Settings are layered: built-in defaults, then an optional `holonet.toml`
//! file, then `HOLONET__`-prefixed environment variables (loaded from
//! `.env` by the binary before this runs). The GraphQL endpoint defaults
//! to the public Star Wars service.

use serde::Deserialize;
use url::Url;

use crate::client::{ClientConfig, DEFAULT_ENDPOINT};
use crate::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub graphql: GraphQLSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLSettings {
    /// Endpoint URL of the external GraphQL service.
    pub endpoint: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl AppConfig {
    /// Load configuration from defaults, file, and environment.
    pub fn load() -> Result<Self> {
        let settings = ::config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000i64)?
            .set_default("server.cors_enabled", true)?
            .set_default("graphql.endpoint", DEFAULT_ENDPOINT)?
            .set_default("graphql.timeout_ms", 30_000i64)?
            .add_source(::config::File::with_name("holonet").required(false))
            .add_source(::config::Environment::with_prefix("HOLONET").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Derive the GraphQL client configuration.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::default();
        config.endpoint = Url::parse(&self.graphql.endpoint)?;
        config.timeout_ms = self.graphql.timeout_ms;
        Ok(config)
    }
}
