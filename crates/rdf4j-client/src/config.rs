//! Client configuration

use serde::{Deserialize, Serialize};

use crate::error::{Rdf4jError, Rdf4jResult};

/// Default RDF4J server location of a local Tomcat/Jetty deployment
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/rdf4j-server";

/// Connection settings shared by every request of a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:8080/rdf4j-server`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Include inferred statements in query and statement results
    pub infer: bool,
    /// `User-Agent` header override
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            infer: true,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_infer(mut self, infer: bool) -> Self {
        self.infer = infer;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Rdf4jResult<Self> {
        let config: ClientConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Base URL without trailing slashes
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Rdf4jResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(Rdf4jError::Config("base_url must not be empty".to_string()));
        }
        let url = reqwest::Url::parse(self.base_url())
            .map_err(|e| Rdf4jError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Rdf4jError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Rdf4jError::Config("timeout_secs must be greater than zero".to_string()));
        }
        Ok(())
    }
}
