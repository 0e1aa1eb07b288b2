//! Error types for the RDF4J client

use rdf4j::{ParseError, QueryBuildError, RdfError, SerializeError};
use thiserror::Error;

/// Errors that can occur when talking to an RDF4J server
///
/// Builder, query-form and transaction-state errors are raised before any
/// request is sent. The status-carrying variants report a non-success answer
/// from the server.
#[derive(Error, Debug)]
pub enum Rdf4jError {
    /// A query builder was incomplete or misused
    #[error("Query validation error: {0}")]
    Validation(#[from] QueryBuildError),

    /// Strict dispatch found a different query form than the caller declared
    #[error("Query type mismatch: expected {expected}, got {actual} in query: {query}")]
    QueryTypeMismatch {
        expected: String,
        actual: String,
        query: String,
    },

    /// The leading keyword is not a SPARQL query form this call can dispatch
    #[error("Unsupported query form '{keyword}': {query}")]
    UnsupportedQuery { keyword: String, query: String },

    /// A transaction operation was attempted outside its legal state
    #[error("Transaction state error: {0}")]
    TransactionState(String),

    /// The server refused a transaction operation
    #[error("Transaction error ({status}): {message}")]
    Transaction { status: u16, message: String },

    /// The server answered without something the protocol requires
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Failed to create repository ({status}): {message}")]
    RepositoryCreation { status: u16, message: String },

    #[error("Failed to delete repository ({status}): {message}")]
    RepositoryDeletion { status: u16, message: String },

    #[error("Namespace error ({status}): {message}")]
    Namespace { status: u16, message: String },

    /// Any other non-success answer
    #[error("Repository error ({status}): {message}")]
    Repository { status: u16, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("RDF error: {0}")]
    Rdf(#[from] RdfError),
}

impl Rdf4jError {
    /// True for transport failures worth retrying (timeouts, refused connections)
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Rdf4jError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// HTTP status code of the failed request, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Rdf4jError::Transaction { status, .. }
            | Rdf4jError::RepositoryCreation { status, .. }
            | Rdf4jError::RepositoryDeletion { status, .. }
            | Rdf4jError::Namespace { status, .. }
            | Rdf4jError::Repository { status, .. } => Some(*status),
            Rdf4jError::RepositoryNotFound(_) => Some(404),
            Rdf4jError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ParseError> for Rdf4jError {
    fn from(e: ParseError) -> Self {
        Rdf4jError::Parse(e.to_string())
    }
}

impl From<SerializeError> for Rdf4jError {
    fn from(e: SerializeError) -> Self {
        Rdf4jError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Rdf4jError {
    fn from(e: serde_json::Error) -> Self {
        Rdf4jError::Config(e.to_string())
    }
}

pub type Rdf4jResult<T> = Result<T, Rdf4jError>;

/// First 100 characters of a query, for error messages
pub(crate) fn truncate_query(query: &str) -> String {
    query.chars().take(100).collect()
}
