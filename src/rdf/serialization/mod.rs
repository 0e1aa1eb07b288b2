//! RDF serialization formats
//!
//! Media types understood by an RDF4J server, plus the N-Quads codec used for
//! statement payloads and graph query results.

mod nquads;

pub use nquads::{parse_quads, serialize_quads};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RDF and SPARQL wire formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// N-Quads format (.nq)
    NQuads,
    /// RDF/XML format (.rdf)
    RdfXml,
    /// JSON-LD format (.jsonld)
    JsonLd,
    /// TriG format (.trig)
    TriG,
    /// SPARQL Query Results JSON
    SparqlResultsJson,
    /// SPARQL 1.1 Update request body
    SparqlUpdate,
}

impl RdfFormat {
    /// The IANA media type sent in `Content-Type`/`Accept` headers
    pub fn media_type(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::NQuads => "application/n-quads",
            RdfFormat::RdfXml => "application/rdf+xml",
            RdfFormat::JsonLd => "application/ld+json",
            RdfFormat::TriG => "application/trig",
            RdfFormat::SparqlResultsJson => "application/sparql-results+json",
            RdfFormat::SparqlUpdate => "application/sparql-update",
        }
    }

    /// Guess an RDF data format from a file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "nq" => Some(RdfFormat::NQuads),
            "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
            "jsonld" => Some(RdfFormat::JsonLd),
            "trig" => Some(RdfFormat::TriG),
            _ => None,
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

impl FromStr for RdfFormat {
    type Err = ParseError;

    /// Accepts short names (`turtle`, `nt`, ...) as well as media types
    fn from_str(s: &str) -> ParseResult<Self> {
        let format = match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" | "text/turtle" => RdfFormat::Turtle,
            "ntriples" | "n-triples" | "nt" | "application/n-triples" => RdfFormat::NTriples,
            "nquads" | "n-quads" | "nq" | "application/n-quads" => RdfFormat::NQuads,
            "rdfxml" | "rdf/xml" | "rdf" | "application/rdf+xml" => RdfFormat::RdfXml,
            "jsonld" | "json-ld" | "application/ld+json" => RdfFormat::JsonLd,
            "trig" | "application/trig" => RdfFormat::TriG,
            _ => return Err(ParseError::UnknownFormat(s.to_string())),
        };
        Ok(format)
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown format name
    #[error("Unknown RDF format: {0}")]
    UnknownFormat(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;
