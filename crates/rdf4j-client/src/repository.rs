//! Repository: queries, updates, statements and namespaces of one repository
//!
//! Every call is a single request below `/repositories/{id}`. A 404 answer
//! means the repository does not exist and is reported as
//! [`Rdf4jError::RepositoryNotFound`], except for namespace lookups where it
//! means the prefix is undefined.

use std::sync::Arc;

use rdf4j::{
    detect_query_type, serialize_quads, NamedNode, Namespace, Quad, QuadPattern, QueryType,
    RdfFormat, RdfTerm, SparqlQuery, SparqlResults,
};
use tracing::{debug, info, warn};

use crate::error::{truncate_query, Rdf4jError, Rdf4jResult};
use crate::named_graph::NamedGraph;
use crate::transaction::{IsolationLevel, Transaction};
use crate::transport::{encode_segment, HttpRequest, HttpResponse, HttpTransport};

/// Per-call query settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Overrides the client-wide `infer` setting
    pub infer: Option<bool>,
    /// Query form the caller expects
    pub expected: Option<QueryType>,
    /// Fail instead of warning when `expected` does not match
    pub strict: bool,
    /// Values pre-bound to query variables, sent as `$name` parameters
    pub bindings: Vec<(String, RdfTerm)>,
}

impl QueryOptions {
    /// Strictly expect one query form
    pub fn expect(query_type: QueryType) -> Self {
        Self {
            expected: Some(query_type),
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_infer(mut self, infer: bool) -> Self {
        self.infer = Some(infer);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Bind variable `name` (with or without its `?`/`$` sigil) to `term`
    pub fn bind(mut self, name: &str, term: impl Into<RdfTerm>) -> Self {
        let name = name.trim_start_matches(['?', '$']);
        self.bindings.push((name.to_string(), term.into()));
        self
    }

    /// Same options, expecting `query_type`
    fn expecting(&self, query_type: QueryType) -> Self {
        Self {
            expected: Some(query_type),
            ..self.clone()
        }
    }
}

/// Handle on one repository of a server
#[derive(Clone)]
pub struct Repository {
    transport: Arc<dyn HttpTransport>,
    id: String,
    infer: bool,
}

impl Repository {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>, id: &str, infer: bool) -> Self {
        Self {
            transport,
            id: id.to_string(),
            infer,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn path(&self, suffix: &str) -> String {
        format!("/repositories/{}{}", encode_segment(&self.id), suffix)
    }

    async fn send(&self, request: HttpRequest) -> Rdf4jResult<HttpResponse> {
        let response = self.transport.execute(request).await?;
        if response.status == 404 {
            return Err(Rdf4jError::RepositoryNotFound(self.id.clone()));
        }
        Ok(response)
    }

    /// Send and require a 2xx answer
    async fn send_ok(&self, request: HttpRequest) -> Rdf4jResult<HttpResponse> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(Rdf4jError::Repository {
                status: response.status,
                message: response.error_message(),
            });
        }
        Ok(response)
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Run a SPARQL query, dispatching on its detected form
    pub async fn query(&self, query: &str) -> Rdf4jResult<SparqlResults> {
        self.query_with(query, &QueryOptions::default()).await
    }

    /// Run a SPARQL query with explicit options
    ///
    /// The result format is chosen from the detected form: SPARQL results
    /// JSON for SELECT and ASK, N-Triples for CONSTRUCT and DESCRIBE. Updates
    /// and unknown forms are rejected; use [`Repository::update`] for updates.
    /// Variable bindings are evaluated by the server, the query text is sent
    /// unchanged.
    pub async fn query_with(
        &self,
        query: &str,
        options: &QueryOptions,
    ) -> Rdf4jResult<SparqlResults> {
        let keyword = detect_query_type(query);
        let Some((detected, format)) = QueryType::from_keyword(&keyword)
            .and_then(|query_type| query_type.result_format().map(|f| (query_type, f)))
        else {
            return Err(Rdf4jError::UnsupportedQuery {
                keyword,
                query: truncate_query(query),
            });
        };

        if let Some(expected) = options.expected {
            if expected != detected {
                if options.strict {
                    return Err(Rdf4jError::QueryTypeMismatch {
                        expected: expected.to_string(),
                        actual: detected.to_string(),
                        query: truncate_query(query),
                    });
                }
                warn!(
                    "Expected a {} query but found {}; dispatching as {}",
                    expected, detected, detected
                );
            }
        }

        let infer = options.infer.unwrap_or(self.infer);
        let request = HttpRequest::get(self.path(""))
            .param("query", query)
            .param("infer", infer.to_string())
            .params(
                options
                    .bindings
                    .iter()
                    .map(|(name, term)| (format!("${name}"), term.to_string())),
            )
            .accept(format.media_type());

        debug!(
            "{} query on repository {} ({} bindings)",
            detected,
            self.id,
            options.bindings.len()
        );
        let response = self.send_ok(request).await?;
        check_media_type(&response, format)?;

        let results = if detected.is_graph() {
            SparqlResults::from_ntriples(&response.body)?
        } else {
            SparqlResults::from_json(&response.body)?
        };
        Ok(results)
    }

    /// Run a SELECT query, failing on any other form
    ///
    /// Shorthand for [`Repository::select_with`] with strict options. Use
    /// `select_with` with default options to only warn on a mismatch.
    pub async fn select(&self, query: &str) -> Rdf4jResult<SparqlResults> {
        self.select_with(query, &QueryOptions::default().with_strict(true))
            .await
    }

    /// Run a SELECT query with bindings or a non-strict form check
    pub async fn select_with(
        &self,
        query: &str,
        options: &QueryOptions,
    ) -> Rdf4jResult<SparqlResults> {
        self.query_with(query, &options.expecting(QueryType::Select))
            .await
    }

    /// Run an ASK query, failing on any other form
    pub async fn ask(&self, query: &str) -> Rdf4jResult<bool> {
        self.ask_with(query, &QueryOptions::default().with_strict(true))
            .await
    }

    pub async fn ask_with(&self, query: &str, options: &QueryOptions) -> Rdf4jResult<bool> {
        let results = self
            .query_with(query, &options.expecting(QueryType::Ask))
            .await?;
        results
            .as_boolean()
            .ok_or_else(|| Rdf4jError::Parse("ASK query did not return a boolean".to_string()))
    }

    /// Run a CONSTRUCT query, failing on any other form
    pub async fn construct(&self, query: &str) -> Rdf4jResult<Vec<Quad>> {
        self.construct_with(query, &QueryOptions::default().with_strict(true))
            .await
    }

    pub async fn construct_with(
        &self,
        query: &str,
        options: &QueryOptions,
    ) -> Rdf4jResult<Vec<Quad>> {
        self.graph_query(query, QueryType::Construct, options).await
    }

    /// Run a DESCRIBE query, failing on any other form
    pub async fn describe(&self, query: &str) -> Rdf4jResult<Vec<Quad>> {
        self.describe_with(query, &QueryOptions::default().with_strict(true))
            .await
    }

    pub async fn describe_with(
        &self,
        query: &str,
        options: &QueryOptions,
    ) -> Rdf4jResult<Vec<Quad>> {
        self.graph_query(query, QueryType::Describe, options).await
    }

    async fn graph_query(
        &self,
        query: &str,
        query_type: QueryType,
        options: &QueryOptions,
    ) -> Rdf4jResult<Vec<Quad>> {
        match self
            .query_with(query, &options.expecting(query_type))
            .await?
        {
            SparqlResults::Graph(quads) => Ok(quads),
            _ => Err(Rdf4jError::Parse(format!(
                "{query_type} query did not return statements"
            ))),
        }
    }

    /// Build `query` and run it as the form it declares
    pub async fn execute(&self, query: &impl SparqlQuery) -> Rdf4jResult<SparqlResults> {
        let text = query.build()?;
        self.query_with(&text, &QueryOptions::expect(query.query_type()))
            .await
    }

    /// Run a SPARQL 1.1 update
    pub async fn update(&self, sparql_update: &str) -> Rdf4jResult<()> {
        let request = HttpRequest::post(self.path("/statements"))
            .content_type(RdfFormat::SparqlUpdate.media_type())
            .body(sparql_update);
        self.send_ok(request).await?;
        debug!("Update executed on repository {}", self.id);
        Ok(())
    }

    // ============================================================
    // Repository information
    // ============================================================

    /// Number of statements in the repository
    pub async fn size(&self) -> Rdf4jResult<u64> {
        let response = self.send_ok(HttpRequest::get(self.path("/size"))).await?;
        let text = response.body.trim();
        text.parse()
            .map_err(|e| Rdf4jError::Parse(format!("invalid size '{text}': {e}")))
    }

    /// Named graphs holding at least one statement
    pub async fn contexts(&self) -> Rdf4jResult<Vec<NamedNode>> {
        let request = HttpRequest::get(self.path("/contexts"))
            .accept(RdfFormat::SparqlResultsJson.media_type());
        let response = self.send_ok(request).await?;
        let results = SparqlResults::from_json(&response.body)?;

        Ok(results
            .solutions()
            .unwrap_or_default()
            .iter()
            .filter_map(|solution| match solution.get("contextID") {
                Some(RdfTerm::NamedNode(node)) => Some(node.clone()),
                _ => None,
            })
            .collect())
    }

    // ============================================================
    // Namespaces
    // ============================================================

    /// Every namespace prefix declared in the repository
    pub async fn namespaces(&self) -> Rdf4jResult<Vec<Namespace>> {
        let request = HttpRequest::get(self.path("/namespaces"))
            .accept(RdfFormat::SparqlResultsJson.media_type());
        let response = self.send(request).await?;
        check_namespace(&response)?;

        let results = SparqlResults::from_json(&response.body)?;
        Ok(results
            .solutions()
            .unwrap_or_default()
            .iter()
            .filter_map(|solution| {
                let prefix = solution.get("prefix")?.value();
                let iri = solution.get("namespace")?.value();
                Some(Namespace::new(prefix, iri))
            })
            .collect())
    }

    /// IRI bound to `prefix`, `None` when the prefix is undefined
    pub async fn namespace(&self, prefix: &str) -> Rdf4jResult<Option<String>> {
        let request = HttpRequest::get(self.namespace_path(prefix)).accept("text/plain");
        let response = self.transport.execute(request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        check_namespace(&response)?;
        Ok(Some(response.body.trim().to_string()))
    }

    /// Bind `prefix` to `iri`
    pub async fn set_namespace(&self, prefix: &str, iri: &str) -> Rdf4jResult<()> {
        let request = HttpRequest::put(self.namespace_path(prefix))
            .content_type("text/plain")
            .body(iri);
        let response = self.send(request).await?;
        if response.status != 204 {
            return Err(Rdf4jError::Namespace {
                status: response.status,
                message: format!("Failed to set namespace: {}", response.error_message()),
            });
        }
        info!("Set namespace {}: {} on repository {}", prefix, iri, self.id);
        Ok(())
    }

    pub async fn delete_namespace(&self, prefix: &str) -> Rdf4jResult<()> {
        let response = self
            .send(HttpRequest::delete(self.namespace_path(prefix)))
            .await?;
        check_namespace(&response)
    }

    /// Remove every namespace declaration
    pub async fn clear_namespaces(&self) -> Rdf4jResult<()> {
        let response = self
            .send(HttpRequest::delete(self.path("/namespaces")))
            .await?;
        check_namespace(&response)
    }

    fn namespace_path(&self, prefix: &str) -> String {
        self.path(&format!("/namespaces/{}", encode_segment(prefix)))
    }

    // ============================================================
    // Statements
    // ============================================================

    /// Statements matching `pattern`
    ///
    /// `infer` overrides the client-wide setting for this call.
    pub async fn statements(
        &self,
        pattern: &QuadPattern,
        infer: Option<bool>,
    ) -> Rdf4jResult<Vec<Quad>> {
        let request = HttpRequest::get(self.path("/statements"))
            .params(pattern_params(pattern))
            .param("infer", infer.unwrap_or(self.infer).to_string())
            .accept(RdfFormat::NQuads.media_type());
        let response = self.send_ok(request).await?;
        Ok(rdf4j::parse_quads(&response.body)?)
    }

    pub async fn add_statement(&self, statement: &Quad) -> Rdf4jResult<()> {
        self.add_statements([statement]).await
    }

    /// Add statements in one request
    pub async fn add_statements<'a>(
        &self,
        statements: impl IntoIterator<Item = &'a Quad>,
    ) -> Rdf4jResult<()> {
        let body = serialize_quads(statements)?;
        let request = HttpRequest::post(self.path("/statements"))
            .content_type(RdfFormat::NQuads.media_type())
            .body(body);
        self.send_ok(request).await?;
        Ok(())
    }

    /// Remove every statement matching `pattern`
    pub async fn delete_statements(&self, pattern: &QuadPattern) -> Rdf4jResult<()> {
        let request =
            HttpRequest::delete(self.path("/statements")).params(pattern_params(pattern));
        self.send_ok(request).await?;
        Ok(())
    }

    /// Replace the whole repository content with `data`
    pub async fn replace_statements(&self, data: &str, format: RdfFormat) -> Rdf4jResult<()> {
        let request = HttpRequest::put(self.path("/statements"))
            .content_type(format.media_type())
            .body(data);
        self.send_ok(request).await?;
        info!("Replaced statements of repository {}", self.id);
        Ok(())
    }

    /// Add an RDF document, optionally into one named graph
    pub async fn upload(
        &self,
        data: &str,
        format: RdfFormat,
        context: Option<&NamedNode>,
    ) -> Rdf4jResult<()> {
        let mut request = HttpRequest::post(self.path("/statements"))
            .content_type(format.media_type())
            .body(data);
        if let Some(graph) = context {
            request = request.param("context", graph.to_string());
        }
        self.send_ok(request).await?;
        Ok(())
    }

    // ============================================================
    // Graphs and transactions
    // ============================================================

    pub fn named_graph(&self, iri: &NamedNode) -> NamedGraph {
        NamedGraph::new(self.transport.clone(), &self.id, iri.clone())
    }

    /// New transaction in PENDING state; call `begin` or `run` on it
    pub fn transaction(&self, isolation_level: Option<IsolationLevel>) -> Transaction {
        Transaction::new(self.transport.clone(), self.id.as_str(), isolation_level)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("id", &self.id)
            .field("infer", &self.infer)
            .finish_non_exhaustive()
    }
}

fn check_namespace(response: &HttpResponse) -> Rdf4jResult<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(Rdf4jError::Namespace {
            status: response.status,
            message: response.error_message(),
        })
    }
}

/// Reject an answer whose declared media type cannot hold `format`
///
/// A missing or unparsable `Content-Type` is accepted.
fn check_media_type(response: &HttpResponse, format: RdfFormat) -> Rdf4jResult<()> {
    let Some(media_type) = response.media_type() else {
        return Ok(());
    };
    let compatible = media_type == format.media_type()
        || match format {
            RdfFormat::NTriples => media_type == "text/plain",
            RdfFormat::SparqlResultsJson => media_type == "application/json",
            _ => false,
        };
    if compatible {
        Ok(())
    } else {
        Err(Rdf4jError::Parse(format!(
            "expected {} but the server answered {}",
            format.media_type(),
            media_type
        )))
    }
}

/// `subj`/`pred`/`obj`/`context` parameters in N-Triples syntax
fn pattern_params(pattern: &QuadPattern) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(subject) = &pattern.subject {
        params.push(("subj".to_string(), subject.to_string()));
    }
    if let Some(predicate) = &pattern.predicate {
        params.push(("pred".to_string(), predicate.to_string()));
    }
    if let Some(object) = &pattern.object {
        params.push(("obj".to_string(), object.to_string()));
    }
    match &pattern.graph {
        Some(Some(graph)) => params.push(("context".to_string(), graph.to_string())),
        Some(None) => params.push(("context".to_string(), "null".to_string())),
        None => {}
    }
    params
}
