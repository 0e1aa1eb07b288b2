//! NamedGraph: graph store access to one named graph of a repository

use std::sync::Arc;

use rdf4j::{NamedNode, RdfFormat};
use tracing::info;

use crate::error::{Rdf4jError, Rdf4jResult};
use crate::transport::{encode_segment, HttpRequest, HttpResponse, HttpTransport};

/// One named graph, addressed indirectly through `rdf-graphs/service?graph=`
#[derive(Clone)]
pub struct NamedGraph {
    transport: Arc<dyn HttpTransport>,
    repository_id: String,
    iri: NamedNode,
}

impl NamedGraph {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>, repository_id: &str, iri: NamedNode) -> Self {
        Self {
            transport,
            repository_id: repository_id.to_string(),
            iri,
        }
    }

    pub fn iri(&self) -> &NamedNode {
        &self.iri
    }

    fn with_graph(&self, request: HttpRequest) -> HttpRequest {
        request.param("graph", self.iri.as_str())
    }

    fn service_path(&self) -> String {
        format!(
            "/repositories/{}/rdf-graphs/service",
            encode_segment(&self.repository_id)
        )
    }

    async fn send(&self, request: HttpRequest) -> Rdf4jResult<HttpResponse> {
        let response = self.transport.execute(self.with_graph(request)).await?;
        match response.status {
            404 => Err(Rdf4jError::RepositoryNotFound(self.repository_id.clone())),
            _ if response.is_success() => Ok(response),
            status => Err(Rdf4jError::Repository {
                status,
                message: format!("Graph {}: {}", self.iri, response.error_message()),
            }),
        }
    }

    /// Every statement of the graph serialized as `format`
    pub async fn get(&self, format: RdfFormat) -> Rdf4jResult<String> {
        let request = HttpRequest::get(self.service_path()).accept(format.media_type());
        Ok(self.send(request).await?.body)
    }

    /// Add the statements of an RDF document to the graph
    pub async fn add(&self, data: &str, format: RdfFormat) -> Rdf4jResult<()> {
        let request = HttpRequest::post(self.service_path())
            .content_type(format.media_type())
            .body(data);
        self.send(request).await?;
        Ok(())
    }

    /// Replace the graph content with an RDF document
    pub async fn replace(&self, data: &str, format: RdfFormat) -> Rdf4jResult<()> {
        let request = HttpRequest::put(self.service_path())
            .content_type(format.media_type())
            .body(data);
        self.send(request).await?;
        info!("Replaced graph {} in repository {}", self.iri, self.repository_id);
        Ok(())
    }

    /// Remove the graph and its statements
    pub async fn clear(&self) -> Rdf4jResult<()> {
        self.send(HttpRequest::delete(self.service_path())).await?;
        info!("Cleared graph {} in repository {}", self.iri, self.repository_id);
        Ok(())
    }
}
