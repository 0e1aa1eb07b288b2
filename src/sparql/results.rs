//! SPARQL query results

use crate::rdf::{parse_quads, ParseError, ParseResult, Quad, RdfTerm};
use indexmap::IndexMap;
use sparesults::{QueryResultsFormat, QueryResultsParser, ReaderQueryResultsParserOutput};

/// Query solution (variable bindings)
///
/// Unbound variables are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings, in the order the server sent them
    pub bindings: IndexMap<String, RdfTerm>,
}

impl QuerySolution {
    /// Create a new query solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding
    pub fn get(&self, variable: &str) -> Option<&RdfTerm> {
        self.bindings.get(variable.strip_prefix('?').unwrap_or(variable))
    }

    /// Add a binding
    pub fn bind(&mut self, variable: impl Into<String>, term: RdfTerm) {
        self.bindings.insert(variable.into(), term);
    }
}

/// SPARQL query results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SparqlResults {
    /// Bindings from SELECT query
    Bindings {
        /// Variables
        variables: Vec<String>,
        /// Solutions
        solutions: Vec<QuerySolution>,
    },

    /// Boolean result from ASK query
    Boolean(bool),

    /// Statements from CONSTRUCT/DESCRIBE query
    Graph(Vec<Quad>),
}

impl SparqlResults {
    /// Create empty bindings result
    pub fn empty() -> Self {
        SparqlResults::Bindings {
            variables: Vec::new(),
            solutions: Vec::new(),
        }
    }

    /// Decode a SPARQL Query Results JSON document (SELECT or ASK)
    pub fn from_json(text: &str) -> ParseResult<Self> {
        let parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
        let output = parser
            .for_reader(text.as_bytes())
            .map_err(|e| ParseError::Parse(e.to_string()))?;

        match output {
            ReaderQueryResultsParserOutput::Boolean(value) => Ok(SparqlResults::Boolean(value)),
            ReaderQueryResultsParserOutput::Solutions(reader) => {
                let variables = reader
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();

                let mut solutions = Vec::new();
                for solution in reader {
                    let solution = solution.map_err(|e| ParseError::Parse(e.to_string()))?;
                    let mut row = QuerySolution::new();
                    for (variable, term) in solution.iter() {
                        let term = RdfTerm::try_from(term.clone())
                            .map_err(|e| ParseError::Parse(e.to_string()))?;
                        row.bind(variable.as_str(), term);
                    }
                    solutions.push(row);
                }

                Ok(SparqlResults::Bindings { variables, solutions })
            }
        }
    }

    /// Decode an N-Triples / N-Quads document returned by a graph query
    pub fn from_ntriples(text: &str) -> ParseResult<Self> {
        Ok(SparqlResults::Graph(parse_quads(text)?))
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            SparqlResults::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn solutions(&self) -> Option<&[QuerySolution]> {
        match self {
            SparqlResults::Bindings { solutions, .. } => Some(solutions),
            _ => None,
        }
    }

    pub fn statements(&self) -> Option<&[Quad]> {
        match self {
            SparqlResults::Graph(quads) => Some(quads),
            _ => None,
        }
    }

    /// Number of solutions or statements; 1 for a boolean
    pub fn len(&self) -> usize {
        match self {
            SparqlResults::Bindings { solutions, .. } => solutions.len(),
            SparqlResults::Boolean(_) => 1,
            SparqlResults::Graph(quads) => quads.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_results() {
        let results = SparqlResults::empty();
        match results {
            SparqlResults::Bindings { variables, solutions } => {
                assert!(variables.is_empty());
                assert!(solutions.is_empty());
            }
            _ => panic!("Expected bindings"),
        }
    }

    #[test]
    fn test_boolean_json() {
        let results = SparqlResults::from_json(r#"{"head":{},"boolean":true}"#).unwrap();
        assert_eq!(results.as_boolean(), Some(true));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_bindings_json() {
        let json = r#"{
            "head": {"vars": ["s", "name", "age"]},
            "results": {"bindings": [
                {
                    "s": {"type": "uri", "value": "http://example.org/alice"},
                    "name": {"type": "literal", "value": "Alice", "xml:lang": "en"},
                    "age": {"type": "literal", "value": "30",
                            "datatype": "http://www.w3.org/2001/XMLSchema#integer"}
                },
                {
                    "s": {"type": "bnode", "value": "b0"}
                }
            ]}
        }"#;

        let results = SparqlResults::from_json(json).unwrap();
        let SparqlResults::Bindings { variables, solutions } = &results else {
            panic!("Expected bindings");
        };
        assert_eq!(variables, &["s", "name", "age"]);
        assert_eq!(solutions.len(), 2);

        let alice = &solutions[0];
        assert_eq!(alice.get("s").unwrap().value(), "http://example.org/alice");
        assert_eq!(alice.get("?name").unwrap().to_string(), "\"Alice\"@en");
        assert_eq!(
            alice.get("age").unwrap().to_string(),
            "\"30\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );

        let anonymous = &solutions[1];
        assert!(matches!(anonymous.get("s"), Some(RdfTerm::BlankNode(_))));
        assert!(anonymous.get("name").is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SparqlResults::from_json("not json"),
            Err(ParseError::Parse(_))
        ));
    }

    #[test]
    fn test_graph_results() {
        let results = SparqlResults::from_ntriples(
            "<http://example.org/a> <http://example.org/b> <http://example.org/c> .\n",
        )
        .unwrap();
        assert_eq!(results.statements().map(<[Quad]>::len), Some(1));
        assert!(results.solutions().is_none());
    }
}
