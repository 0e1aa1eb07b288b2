//! In-memory stand-in for an RDF4J server
//!
//! Implements enough of the REST protocol to drive `rdf4j_client` end to end:
//! repositories, statements, namespaces, contexts, named graphs and
//! transactions. Queries are not evaluated: SELECT returns every statement as
//! `?s ?p ?o` bindings, ASK answers whether the repository is non-empty and
//! CONSTRUCT/DESCRIBE return every statement. `$s`, `$p` and `$o` bindings
//! narrow the statements considered.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rdf4j::{parse_quads, serialize_quads, NamedNode, Quad, QueryType, RdfTerm};
use rdf4j_client::{
    ClientConfig, HttpRequest, HttpResponse, HttpTransport, Method, Rdf4jClient, Rdf4jResult,
};
use serde_json::{json, Value};

pub const BASE: &str = "http://localhost:8080/rdf4j-server";

#[derive(Default)]
struct Repo {
    statements: Vec<Quad>,
    namespaces: BTreeMap<String, String>,
}

struct Txn {
    repository: String,
    /// Working copy of the repository content
    statements: Vec<Quad>,
}

#[derive(Default)]
struct State {
    repositories: BTreeMap<String, Repo>,
    transactions: HashMap<String, Txn>,
    next_txn: u64,
    /// One-shot failures: (method, path fragment or action, status)
    failures: Vec<(Method, String, u16)>,
}

#[derive(Default)]
pub struct FakeServer {
    state: Mutex<State>,
    log: Mutex<Vec<HttpRequest>>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Server with one empty repository
    pub fn with_repository(id: &str) -> Arc<Self> {
        let server = Self::new();
        server.add_repository(id);
        server
    }

    pub fn add_repository(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .repositories
            .insert(id.to_string(), Repo::default());
    }

    pub fn client(self: &Arc<Self>) -> Rdf4jClient {
        Rdf4jClient::with_transport(self.clone(), ClientConfig::new(BASE))
    }

    /// Make the next request matching `method` and `fragment` (a path
    /// fragment or a transaction action) answer with `status`
    pub fn fail_next(&self, method: Method, fragment: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method, fragment.to_string(), status));
    }

    pub fn statements(&self, repository: &str) -> Vec<Quad> {
        self.state
            .lock()
            .unwrap()
            .repositories
            .get(repository)
            .map(|r| r.statements.clone())
            .unwrap_or_default()
    }

    pub fn open_transactions(&self) -> usize {
        self.state.lock().unwrap().transactions.len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    fn take_failure(state: &mut State, request: &HttpRequest) -> Option<u16> {
        let action = request.param_value("action").unwrap_or_default();
        let position = state.failures.iter().position(|(method, fragment, _)| {
            *method == request.method
                && (request.path.contains(fragment.as_str()) || action == fragment)
        })?;
        Some(state.failures.remove(position).2)
    }

    fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let mut state = self.state.lock().unwrap();

        if let Some(status) = Self::take_failure(&mut state, request) {
            return HttpResponse::new(status).with_body("injected failure");
        }

        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            ["protocol"] => HttpResponse::new(200).with_body("12"),
            ["repositories"] => list_repositories(&state),
            ["repositories", id] => repository_root(&mut state, request, id),
            ["repositories", id, rest @ ..] => {
                if !state.repositories.contains_key(*id) {
                    return HttpResponse::new(404).with_body(format!("Unknown repository: {id}"));
                }
                match rest {
                    ["statements"] => statements(&mut state, request, id),
                    ["size"] => {
                        let size = state.repositories[*id].statements.len();
                        HttpResponse::new(200).with_body(size.to_string())
                    }
                    ["contexts"] => contexts(&state, id),
                    ["namespaces"] => namespaces(&mut state, request, id),
                    ["namespaces", prefix] => namespace(&mut state, request, id, prefix),
                    ["transactions"] => begin(&mut state, request, id),
                    ["transactions", txn] => transaction(&mut state, request, txn),
                    ["rdf-graphs", "service"] => graph_store(&mut state, request, id),
                    _ => HttpResponse::new(400).with_body("unsupported path"),
                }
            }
            _ => HttpResponse::new(400).with_body("unsupported path"),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeServer {
    async fn execute(&self, request: HttpRequest) -> Rdf4jResult<HttpResponse> {
        let response = self.handle(&request);
        self.log.lock().unwrap().push(request);
        Ok(response)
    }
}

fn list_repositories(state: &State) -> HttpResponse {
    let bindings: Vec<Value> = state
        .repositories
        .keys()
        .map(|id| {
            json!({
                "uri": {"type": "uri", "value": format!("{BASE}/repositories/{id}")},
                "id": {"type": "literal", "value": id},
                "title": {"type": "literal", "value": format!("{id} store")},
                "readable": {"type": "literal", "value": "true"},
                "writable": {"type": "literal", "value": "true"}
            })
        })
        .collect();
    json_response(json!({
        "head": {"vars": ["uri", "id", "title", "readable", "writable"]},
        "results": {"bindings": bindings}
    }))
}

fn repository_root(state: &mut State, request: &HttpRequest, id: &str) -> HttpResponse {
    match request.method {
        Method::Put => {
            if state.repositories.contains_key(id) {
                return HttpResponse::new(409).with_body(format!("Repository {id} already exists"));
            }
            state.repositories.insert(id.to_string(), Repo::default());
            HttpResponse::new(204)
        }
        Method::Delete => match state.repositories.remove(id) {
            Some(_) => HttpResponse::new(204),
            None => HttpResponse::new(404),
        },
        Method::Get => match state.repositories.get(id) {
            Some(repo) => query(repo, request),
            None => HttpResponse::new(404),
        },
        Method::Post => HttpResponse::new(405),
    }
}

fn query(repo: &Repo, request: &HttpRequest) -> HttpResponse {
    let text = request.param_value("query").unwrap_or_default();
    let bound = |name: &str, actual: String| request.param_value(name).map_or(true, |v| v == actual);
    let matching: Vec<&Quad> = repo
        .statements
        .iter()
        .filter(|q| {
            bound("$s", q.subject.to_string())
                && bound("$p", q.predicate.to_string())
                && bound("$o", q.object.to_string())
        })
        .collect();

    match QueryType::detect(text) {
        Some(QueryType::Select) => {
            let bindings: Vec<Value> = matching
                .iter()
                .map(|q| {
                    json!({
                        "s": term_json(&q.subject.clone().into()),
                        "p": term_json(&RdfTerm::NamedNode(q.predicate.as_named_node().clone())),
                        "o": term_json(&q.object.clone().into())
                    })
                })
                .collect();
            json_response(json!({
                "head": {"vars": ["s", "p", "o"]},
                "results": {"bindings": bindings}
            }))
        }
        Some(QueryType::Ask) => json_response(json!({
            "head": {},
            "boolean": !matching.is_empty()
        })),
        Some(QueryType::Construct) | Some(QueryType::Describe) => {
            let triples: Vec<Quad> = matching
                .iter()
                .map(|q| Quad::new(q.subject.clone(), q.predicate.clone(), q.object.clone(), None))
                .collect();
            nquads_response(&triples, "application/n-triples")
        }
        _ => HttpResponse::new(400).with_body("MALFORMED QUERY"),
    }
}

fn statements(state: &mut State, request: &HttpRequest, id: &str) -> HttpResponse {
    let Some(repo) = state.repositories.get_mut(id) else {
        return HttpResponse::new(404);
    };
    match request.method {
        Method::Get => {
            let matching: Vec<Quad> = repo
                .statements
                .iter()
                .filter(|q| matches_pattern(q, request))
                .cloned()
                .collect();
            nquads_response(&matching, "application/n-quads")
        }
        Method::Post => {
            if request.header_value("Content-Type") == Some("application/sparql-update") {
                return sparql_update(&mut repo.statements, request.body.as_deref().unwrap_or_default());
            }
            match parse_body(request) {
                Ok(quads) => {
                    let context = request
                        .param_value("context")
                        .and_then(|c| NamedNode::new(c.trim_start_matches('<').trim_end_matches('>')).ok());
                    for quad in quads {
                        let quad = match &context {
                            Some(graph) => Quad::new(quad.subject, quad.predicate, quad.object, Some(graph.clone())),
                            None => quad,
                        };
                        insert(&mut repo.statements, quad);
                    }
                    HttpResponse::new(204)
                }
                Err(response) => response,
            }
        }
        Method::Put => match parse_body(request) {
            Ok(quads) => {
                repo.statements.clear();
                for quad in quads {
                    insert(&mut repo.statements, quad);
                }
                HttpResponse::new(204)
            }
            Err(response) => response,
        },
        Method::Delete => {
            repo.statements.retain(|q| !matches_pattern(q, request));
            HttpResponse::new(204)
        }
    }
}

/// Only `CLEAR ALL` changes data; other updates are accepted unchanged
fn sparql_update(statements: &mut Vec<Quad>, update: &str) -> HttpResponse {
    if update.trim().is_empty() {
        return HttpResponse::new(400).with_body("MALFORMED QUERY: empty update");
    }
    if update.trim().eq_ignore_ascii_case("CLEAR ALL") {
        statements.clear();
    }
    HttpResponse::new(204)
}

fn contexts(state: &State, id: &str) -> HttpResponse {
    let mut graphs: Vec<&NamedNode> = state.repositories[id]
        .statements
        .iter()
        .filter_map(|q| q.graph.as_ref())
        .collect();
    graphs.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    graphs.dedup();
    let bindings: Vec<Value> = graphs
        .into_iter()
        .map(|g| json!({"contextID": {"type": "uri", "value": g.as_str()}}))
        .collect();
    json_response(json!({
        "head": {"vars": ["contextID"]},
        "results": {"bindings": bindings}
    }))
}

fn namespaces(state: &mut State, request: &HttpRequest, id: &str) -> HttpResponse {
    let Some(repo) = state.repositories.get_mut(id) else {
        return HttpResponse::new(404);
    };
    match request.method {
        Method::Get => {
            let bindings: Vec<Value> = repo
                .namespaces
                .iter()
                .map(|(prefix, iri)| {
                    json!({
                        "prefix": {"type": "literal", "value": prefix},
                        "namespace": {"type": "literal", "value": iri}
                    })
                })
                .collect();
            json_response(json!({
                "head": {"vars": ["prefix", "namespace"]},
                "results": {"bindings": bindings}
            }))
        }
        Method::Delete => {
            repo.namespaces.clear();
            HttpResponse::new(204)
        }
        _ => HttpResponse::new(405),
    }
}

fn namespace(state: &mut State, request: &HttpRequest, id: &str, prefix: &str) -> HttpResponse {
    let Some(repo) = state.repositories.get_mut(id) else {
        return HttpResponse::new(404);
    };
    match request.method {
        Method::Get => match repo.namespaces.get(prefix) {
            Some(iri) => HttpResponse::new(200).with_body(iri.clone()),
            None => HttpResponse::new(404).with_body(format!("Undefined prefix: {prefix}")),
        },
        Method::Put => {
            let iri = request.body.clone().unwrap_or_default();
            repo.namespaces.insert(prefix.to_string(), iri.trim().to_string());
            HttpResponse::new(204)
        }
        Method::Delete => {
            repo.namespaces.remove(prefix);
            HttpResponse::new(204)
        }
        Method::Post => HttpResponse::new(405),
    }
}

fn begin(state: &mut State, request: &HttpRequest, id: &str) -> HttpResponse {
    if request.method != Method::Post {
        return HttpResponse::new(405);
    }
    state.next_txn += 1;
    let txn_id = format!("txn-{}", state.next_txn);
    let statements = state.repositories[id].statements.clone();
    state.transactions.insert(
        txn_id.clone(),
        Txn {
            repository: id.to_string(),
            statements,
        },
    );
    HttpResponse::new(201).with_header(
        "Location",
        format!("{BASE}/repositories/{id}/transactions/{txn_id}"),
    )
}

fn transaction(state: &mut State, request: &HttpRequest, txn_id: &str) -> HttpResponse {
    if request.method == Method::Delete {
        return match state.transactions.remove(txn_id) {
            Some(_) => HttpResponse::new(204),
            None => HttpResponse::new(404).with_body("unknown transaction"),
        };
    }

    let action = request.param_value("action").unwrap_or_default();
    if action == "COMMIT" {
        return match state.transactions.remove(txn_id) {
            Some(txn) => {
                if let Some(repo) = state.repositories.get_mut(&txn.repository) {
                    repo.statements = txn.statements;
                }
                HttpResponse::new(200)
            }
            None => HttpResponse::new(404).with_body("unknown transaction"),
        };
    }

    let Some(txn) = state.transactions.get_mut(txn_id) else {
        return HttpResponse::new(404).with_body("unknown transaction");
    };
    match action {
        "ADD" => match parse_body(request) {
            Ok(quads) => {
                for quad in quads {
                    insert(&mut txn.statements, quad);
                }
                HttpResponse::new(200)
            }
            Err(response) => response,
        },
        "DELETE" => match parse_body(request) {
            Ok(quads) => {
                txn.statements.retain(|q| !quads.contains(q));
                HttpResponse::new(200)
            }
            Err(response) => response,
        },
        "UPDATE" => sparql_update(&mut txn.statements, request.body.as_deref().unwrap_or_default()),
        "SIZE" => HttpResponse::new(200).with_body(txn.statements.len().to_string()),
        _ => HttpResponse::new(400).with_body(format!("unsupported action {action}")),
    }
}

fn graph_store(state: &mut State, request: &HttpRequest, id: &str) -> HttpResponse {
    let Some(graph) = request.param_value("graph").and_then(|g| NamedNode::new(g).ok()) else {
        return HttpResponse::new(400).with_body("missing graph parameter");
    };
    let repo = match state.repositories.get_mut(id) {
        Some(repo) => repo,
        None => return HttpResponse::new(404),
    };
    let in_graph = |q: &Quad| q.graph.as_ref() == Some(&graph);

    match request.method {
        Method::Get => {
            let triples: Vec<Quad> = repo
                .statements
                .iter()
                .filter(|q| in_graph(q))
                .map(|q| Quad::new(q.subject.clone(), q.predicate.clone(), q.object.clone(), None))
                .collect();
            nquads_response(&triples, "application/n-triples")
        }
        Method::Post | Method::Put => match parse_body(request) {
            Ok(quads) => {
                if request.method == Method::Put {
                    repo.statements.retain(|q| !in_graph(q));
                }
                for quad in quads {
                    let quad = Quad::new(quad.subject, quad.predicate, quad.object, Some(graph.clone()));
                    insert(&mut repo.statements, quad);
                }
                HttpResponse::new(204)
            }
            Err(response) => response,
        },
        Method::Delete => {
            repo.statements.retain(|q| !in_graph(q));
            HttpResponse::new(204)
        }
    }
}

fn matches_pattern(quad: &Quad, request: &HttpRequest) -> bool {
    let same = |name: &str, actual: String| request.param_value(name).map_or(true, |v| v == actual);
    let context_ok = match request.param_value("context") {
        None => true,
        Some("null") => quad.graph.is_none(),
        Some(graph) => quad.graph.as_ref().map(|g| g.to_string()).as_deref() == Some(graph),
    };
    same("subj", quad.subject.to_string())
        && same("pred", quad.predicate.to_string())
        && same("obj", quad.object.to_string())
        && context_ok
}

/// Only N-Triples and N-Quads bodies are understood
fn parse_body(request: &HttpRequest) -> Result<Vec<Quad>, HttpResponse> {
    let content_type = request.header_value("Content-Type").unwrap_or_default();
    if !matches!(content_type, "application/n-quads" | "application/n-triples") {
        return Err(HttpResponse::new(415).with_body(format!("unsupported {content_type}")));
    }
    parse_quads(request.body.as_deref().unwrap_or_default())
        .map_err(|e| HttpResponse::new(400).with_body(e.to_string()))
}

fn insert(statements: &mut Vec<Quad>, quad: Quad) {
    if !statements.contains(&quad) {
        statements.push(quad);
    }
}

fn term_json(term: &RdfTerm) -> Value {
    match term {
        RdfTerm::NamedNode(node) => json!({"type": "uri", "value": node.as_str()}),
        RdfTerm::BlankNode(node) => json!({"type": "bnode", "value": node.as_str()}),
        RdfTerm::Literal(literal) => match literal.language() {
            Some(lang) => json!({"type": "literal", "value": literal.value(), "xml:lang": lang}),
            None if literal.is_plain() => json!({"type": "literal", "value": literal.value()}),
            None => json!({
                "type": "literal",
                "value": literal.value(),
                "datatype": literal.datatype().as_str()
            }),
        },
    }
}

fn json_response(value: Value) -> HttpResponse {
    HttpResponse::new(200)
        .with_header("Content-Type", "application/sparql-results+json")
        .with_body(value.to_string())
}

fn nquads_response(quads: &[Quad], media_type: &str) -> HttpResponse {
    match serialize_quads(quads) {
        Ok(body) => HttpResponse::new(200)
            .with_header("Content-Type", media_type)
            .with_body(body),
        Err(e) => HttpResponse::new(500).with_body(e.to_string()),
    }
}
