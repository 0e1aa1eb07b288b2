//! Data models for the RDF4J client
//!
//! These types represent server answers that are not plain RDF.

use rdf4j::{QuerySolution, RdfTerm};
use serde::{Deserialize, Serialize};

use crate::error::{Rdf4jError, Rdf4jResult};

/// One entry of the server's repository list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// Repository ID
    pub id: String,
    /// Repository location on the server
    pub uri: String,
    /// Human readable title
    pub title: String,
    pub readable: bool,
    pub writable: bool,
}

impl RepositoryInfo {
    /// Build from one solution of `GET /repositories`
    pub fn from_solution(solution: &QuerySolution) -> Rdf4jResult<Self> {
        let text = |name: &str| solution.get(name).map(RdfTerm::value).unwrap_or_default().to_string();
        let flag = |name: &str| solution.get(name).map(|t| t.value() == "true").unwrap_or(false);

        let id = text("id");
        if id.is_empty() {
            return Err(Rdf4jError::Parse(
                "repository list entry without an id".to_string(),
            ));
        }

        Ok(Self {
            id,
            uri: text("uri"),
            title: text("title"),
            readable: flag("readable"),
            writable: flag("writable"),
        })
    }
}
