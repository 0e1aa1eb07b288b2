//! RDF (Resource Description Framework) data model
//!
//! Terms, statements and namespaces exchanged with an RDF4J server:
//! - IRIs, blank nodes, literals and SPARQL variables
//! - Triples and quads (named graphs)
//! - Namespace prefixes
//! - N-Quads payload encoding and media types
//!
//! # Example
//!
//! ```rust
//! use rdf4j::rdf::{Literal, NamedNode, Quad, RdfPredicate};
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! let quad = Quad::new(subject.into(), predicate, object.into(), None);
//! assert_eq!(
//!     quad.to_string(),
//!     r#"<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> "Alice" ."#
//! );
//! ```

mod namespace;
mod serialization;
mod types;
pub mod vocab;

pub use types::{
    BlankNode, Literal, NamedNode, Quad, QuadPattern, RdfError, RdfObject, RdfPredicate,
    RdfResult, RdfSubject, RdfTerm, Triple, Variable,
};

pub use namespace::{Namespace, NamespaceManager, PrefixError, PrefixResult};

pub use serialization::{
    parse_quads, serialize_quads, ParseError, ParseResult, RdfFormat, SerializeError,
    SerializeResult,
};
