//! Rdf4jClient: server-level operations and entry point to repositories

use std::sync::Arc;

use rdf4j::{RdfFormat, SparqlResults};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::{Rdf4jError, Rdf4jResult};
use crate::models::RepositoryInfo;
use crate::remote::ReqwestTransport;
use crate::repository::Repository;
use crate::transport::{encode_segment, HttpRequest, HttpTransport};

/// Client for one RDF4J server
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct Rdf4jClient {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
}

impl Rdf4jClient {
    /// Create a client that talks HTTP to `config.base_url`
    pub fn new(config: ClientConfig) -> Rdf4jResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        info!("RDF4J client for {}", config.base_url());
        Ok(Self {
            transport: Arc::new(transport),
            config,
        })
    }

    /// Shortcut for `new(ClientConfig::new(base_url))`
    pub fn connect(base_url: &str) -> Rdf4jResult<Self> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn HttpTransport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// REST protocol version spoken by the server
    pub async fn protocol_version(&self) -> Rdf4jResult<String> {
        let response = self
            .transport
            .execute(HttpRequest::get("/protocol").accept("text/plain"))
            .await?;
        if !response.is_success() {
            return Err(Rdf4jError::Repository {
                status: response.status,
                message: response.error_message(),
            });
        }
        Ok(response.body.trim().to_string())
    }

    /// Every repository known to the server
    pub async fn list_repositories(&self) -> Rdf4jResult<Vec<RepositoryInfo>> {
        let request =
            HttpRequest::get("/repositories").accept(RdfFormat::SparqlResultsJson.media_type());
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(Rdf4jError::Repository {
                status: response.status,
                message: response.error_message(),
            });
        }

        let results = SparqlResults::from_json(&response.body)?;
        results
            .solutions()
            .unwrap_or_default()
            .iter()
            .map(RepositoryInfo::from_solution)
            .collect()
    }

    /// Handle on a repository; nothing is sent until it is used
    pub fn repository(&self, id: &str) -> Repository {
        Repository::new(self.transport.clone(), id, self.config.infer)
    }

    /// Handle on a repository that is known to exist
    pub async fn get_repository(&self, id: &str) -> Rdf4jResult<Repository> {
        let exists = self
            .list_repositories()
            .await?
            .iter()
            .any(|info| info.id == id);
        if !exists {
            return Err(Rdf4jError::RepositoryNotFound(id.to_string()));
        }
        Ok(self.repository(id))
    }

    /// Create a repository from an RDF4J repository configuration in Turtle
    pub async fn create_repository(&self, id: &str, config_turtle: &str) -> Rdf4jResult<Repository> {
        let request = HttpRequest::put(format!("/repositories/{}", encode_segment(id)))
            .content_type(RdfFormat::Turtle.media_type())
            .body(config_turtle);
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(Rdf4jError::RepositoryCreation {
                status: response.status,
                message: response.error_message(),
            });
        }

        info!("Created repository: {}", id);
        Ok(self.repository(id))
    }

    /// Delete a repository and all of its data
    pub async fn delete_repository(&self, id: &str) -> Rdf4jResult<()> {
        let request = HttpRequest::delete(format!("/repositories/{}", encode_segment(id)));
        let response = self.transport.execute(request).await?;
        match response.status {
            404 => Err(Rdf4jError::RepositoryNotFound(id.to_string())),
            _ if response.is_success() => {
                info!("Deleted repository: {}", id);
                Ok(())
            }
            status => Err(Rdf4jError::RepositoryDeletion {
                status,
                message: response.error_message(),
            }),
        }
    }
}

impl std::fmt::Debug for Rdf4jClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rdf4jClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;

    /// Answers every request with the same response
    struct Fixed(HttpResponse);

    #[async_trait]
    impl HttpTransport for Fixed {
        async fn execute(&self, _request: HttpRequest) -> Rdf4jResult<HttpResponse> {
            Ok(self.0.clone())
        }
    }

    fn client(response: HttpResponse) -> Rdf4jClient {
        Rdf4jClient::with_transport(Arc::new(Fixed(response)), ClientConfig::default())
    }

    const REPOSITORY_LIST: &str = r#"{
        "head": {"vars": ["uri", "id", "title", "readable", "writable"]},
        "results": {"bindings": [{
            "uri": {"type": "uri", "value": "http://localhost:8080/rdf4j-server/repositories/people"},
            "id": {"type": "literal", "value": "people"},
            "title": {"type": "literal", "value": "People"},
            "readable": {"type": "literal", "datatype": "http://www.w3.org/2001/XMLSchema#boolean", "value": "true"},
            "writable": {"type": "literal", "datatype": "http://www.w3.org/2001/XMLSchema#boolean", "value": "true"}
        }]}
    }"#;

    #[tokio::test]
    async fn test_list_and_get_repository() {
        let client = client(HttpResponse::new(200).with_body(REPOSITORY_LIST));

        let repositories = client.list_repositories().await.unwrap();
        assert_eq!(repositories.len(), 1);
        assert_eq!(repositories[0].id, "people");
        assert!(repositories[0].writable);

        assert_eq!(client.get_repository("people").await.unwrap().id(), "people");
        assert!(matches!(
            client.get_repository("missing").await,
            Err(Rdf4jError::RepositoryNotFound(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_create_and_delete_failures() {
        let client = client(HttpResponse::new(409).with_body("already exists"));
        let err = client.create_repository("people", "").await.unwrap_err();
        assert!(matches!(err, Rdf4jError::RepositoryCreation { status: 409, .. }));

        let err = client.delete_repository("people").await.unwrap_err();
        assert!(matches!(err, Rdf4jError::RepositoryDeletion { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_protocol_version() {
        let client = client(HttpResponse::new(200).with_body("12\n"));
        assert_eq!(client.protocol_version().await.unwrap(), "12");
    }
}
