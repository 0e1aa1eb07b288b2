//! Term serialization for SPARQL query building

use std::fmt;

use crate::rdf::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, RdfTerm, Variable};

/// A value usable in any position of a generated query
///
/// Typed terms are rendered in SPARQL surface syntax. `Raw` text is copied
/// verbatim: variables already written with `?`, prefixed names such as
/// `foaf:name`, `<iri>` strings, quoted literals or expressions like
/// `COUNT(?s)`. The caller is responsible for raw text being valid SPARQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryTerm {
    Iri(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    Variable(Variable),
    Raw(String),
}

impl QueryTerm {
    /// Render the term as it appears in a query
    pub fn to_sparql(&self) -> String {
        serialize_term(self)
    }
}

/// Convert a term into its SPARQL representation
///
/// Literal escaping only covers backslash and double quote. A datatype of
/// `xsd:string` is omitted since `"x"` and `"x"^^xsd:string` denote the same
/// literal in RDF 1.1.
pub fn serialize_term(term: &QueryTerm) -> String {
    match term {
        QueryTerm::Iri(iri) => format!("<{}>", iri.as_str()),
        QueryTerm::Variable(var) => format!("?{}", var.as_str()),
        QueryTerm::BlankNode(node) => format!("_:{}", node.as_str()),
        QueryTerm::Raw(text) => text.clone(),
        QueryTerm::Literal(lit) => {
            let value = lit.value().replace('\\', "\\\\").replace('"', "\\\"");
            if let Some(lang) = lit.language() {
                format!("\"{value}\"@{lang}")
            } else if lit.is_plain() {
                format!("\"{value}\"")
            } else {
                format!("\"{value}\"^^<{}>", lit.datatype().as_str())
            }
        }
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_term(self))
    }
}

impl From<&str> for QueryTerm {
    fn from(text: &str) -> Self {
        QueryTerm::Raw(text.to_string())
    }
}

impl From<String> for QueryTerm {
    fn from(text: String) -> Self {
        QueryTerm::Raw(text)
    }
}

impl From<&String> for QueryTerm {
    fn from(text: &String) -> Self {
        QueryTerm::Raw(text.clone())
    }
}

impl From<NamedNode> for QueryTerm {
    fn from(iri: NamedNode) -> Self {
        QueryTerm::Iri(iri)
    }
}

impl From<&NamedNode> for QueryTerm {
    fn from(iri: &NamedNode) -> Self {
        QueryTerm::Iri(iri.clone())
    }
}

impl From<BlankNode> for QueryTerm {
    fn from(node: BlankNode) -> Self {
        QueryTerm::BlankNode(node)
    }
}

impl From<Literal> for QueryTerm {
    fn from(lit: Literal) -> Self {
        QueryTerm::Literal(lit)
    }
}

impl From<Variable> for QueryTerm {
    fn from(var: Variable) -> Self {
        QueryTerm::Variable(var)
    }
}

impl From<&Variable> for QueryTerm {
    fn from(var: &Variable) -> Self {
        QueryTerm::Variable(var.clone())
    }
}

impl From<RdfPredicate> for QueryTerm {
    fn from(pred: RdfPredicate) -> Self {
        QueryTerm::Iri(pred.into())
    }
}

impl From<RdfSubject> for QueryTerm {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => QueryTerm::Iri(n),
            RdfSubject::BlankNode(b) => QueryTerm::BlankNode(b),
        }
    }
}

impl From<RdfObject> for QueryTerm {
    fn from(object: RdfObject) -> Self {
        RdfTerm::from(object).into()
    }
}

impl From<RdfTerm> for QueryTerm {
    fn from(term: RdfTerm) -> Self {
        match term {
            RdfTerm::NamedNode(n) => QueryTerm::Iri(n),
            RdfTerm::BlankNode(b) => QueryTerm::BlankNode(b),
            RdfTerm::Literal(l) => QueryTerm::Literal(l),
        }
    }
}

impl From<i64> for QueryTerm {
    fn from(value: i64) -> Self {
        QueryTerm::Raw(value.to_string())
    }
}
