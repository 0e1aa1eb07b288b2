//! SPARQL query text support
//!
//! Everything here produces or inspects strings and never touches the network:
//! - term serialization into SPARQL surface syntax
//! - composable graph patterns and the SELECT/ASK/CONSTRUCT/DESCRIBE builders
//! - detection of the form of a raw query or update
//! - decoding of SPARQL Query Results JSON and graph results
//!
//! # Example
//!
//! ```rust
//! use rdf4j::sparql::{detect_query_type, ask, WhereClause, GraphPattern};
//!
//! let mut person = GraphPattern::new();
//! person.triple("?s", "a", "foaf:Person");
//! let mut agent = GraphPattern::new();
//! agent.triple("?s", "a", "foaf:Agent");
//!
//! let mut query = ask();
//! query
//!     .prefix("foaf", "http://xmlns.com/foaf/0.1/")
//!     .union([&person, &agent])
//!     .unwrap();
//!
//! let text = query.build().unwrap();
//! assert_eq!(detect_query_type(&text), "ASK");
//! ```

mod builder;
mod detect;
mod pattern;
mod results;
mod term;

pub use builder::{
    ask, construct, describe, select, AskQuery, ConstructQuery, DescribeQuery, Prefixes,
    SelectQuery, SparqlQuery, WhereClause,
};
pub use detect::{detect_query_type, QueryType};
pub use pattern::{GraphPattern, OptionalArg};
pub use results::{QuerySolution, SparqlResults};
pub use term::{serialize_term, QueryTerm};

use thiserror::Error;

/// Errors raised while assembling a query, before anything is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryBuildError {
    /// A required part of the query was never provided
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// A builder method was called with unusable arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type QueryBuildResult<T> = Result<T, QueryBuildError>;
