//! RDF4J client core
//!
//! The network-free half of an RDF4J client: the RDF term model exchanged
//! with the server and everything needed to produce and inspect SPARQL text.
//! The HTTP side (repositories, statements, transactions) lives in the
//! `rdf4j-client` crate, which builds on the types re-exported here.
//!
//! # Modules
//!
//! - [`rdf`]: IRIs, blank nodes, literals, triples/quads, namespaces and the
//!   N-Quads codec used for statement payloads
//! - [`sparql`]: term serializer, graph patterns, SELECT/ASK/CONSTRUCT/DESCRIBE
//!   builders, query-form detection and SPARQL results decoding
//!
//! ## Example Usage
//!
//! ```rust
//! use rdf4j::{construct, detect_query_type, Namespace, WhereClause};
//!
//! let foaf = Namespace::new("foaf", "http://xmlns.com/foaf/0.1/");
//!
//! let mut query = construct();
//! query
//!     .namespace(&foaf)
//!     .template("?a", "foaf:knows", "?b")
//!     .triple("?b", "foaf:knows", "?a");
//!
//! let text = query.build().unwrap();
//! assert!(text.starts_with("PREFIX foaf: <http://xmlns.com/foaf/0.1/>\nCONSTRUCT {"));
//! assert_eq!(detect_query_type(&text), "CONSTRUCT");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod rdf;
pub mod sparql;

// Re-export main types for convenience
pub use rdf::{
    NamedNode, BlankNode, Literal, Variable, Triple, Quad,
    RdfTerm, RdfSubject, RdfPredicate, RdfObject, QuadPattern,
    RdfError, RdfResult,
    NamespaceManager, Namespace,
    RdfFormat, ParseError, SerializeError, parse_quads, serialize_quads,
};

pub use sparql::{
    ask, construct, describe, select, detect_query_type, serialize_term,
    AskQuery, ConstructQuery, DescribeQuery, SelectQuery, GraphPattern, OptionalArg, Prefixes,
    QueryTerm, QueryType, SparqlQuery, WhereClause,
    QueryBuildError, QueryBuildResult,
    SparqlResults, QuerySolution,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
