//! ReqwestTransport: network transport for a running RDF4J server
//!
//! Sends requests over HTTP with reqwest. No retries are attempted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Rdf4jError, Rdf4jResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

/// HTTP transport backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    base_url: String,
    http_client: Client,
}

impl ReqwestTransport {
    /// Create a transport for the server described by `config`.
    ///
    /// # Example
    /// ```no_run
    /// # use rdf4j_client::{ClientConfig, ReqwestTransport};
    /// let transport = ReqwestTransport::new(&ClientConfig::new("http://localhost:8080/rdf4j-server"))
    ///     .unwrap();
    /// ```
    pub fn new(config: &ClientConfig) -> Rdf4jResult<Self> {
        config.validate()?;

        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self {
            base_url: config.base_url().to_string(),
            http_client: builder.build()?,
        })
    }

    /// Absolute URL of a request, query parameters included
    fn url(&self, request: &HttpRequest) -> Rdf4jResult<Url> {
        let raw = format!("{}{}", self.base_url, request.path);
        let mut url =
            Url::parse(&raw).map_err(|e| Rdf4jError::InvalidUrl(format!("{raw}: {e}")))?;
        if !request.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Rdf4jResult<HttpResponse> {
        let url = self.url(&request)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        debug!("{} {}", request.method, request.path);

        let mut builder = self.http_client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        debug!(
            "{} {} -> {} ({} bytes)",
            request.method,
            request.path,
            status,
            body.len()
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
