//! Fluent builders for the four SPARQL query forms
//!
//! Each builder owns one [`GraphPattern`] for its WHERE clause plus the
//! PREFIX declarations of the query. Methods shared by every form live on the
//! [`WhereClause`] trait and forward to the pattern.
//!
//! ```rust
//! use rdf4j::rdf::NamedNode;
//! use rdf4j::sparql::{select, WhereClause};
//!
//! let name = NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let query = select(["?s", "?name"])
//!     .triple("?s", name, "?name")
//!     .limit(5)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     query,
//!     "SELECT ?s ?name\nWHERE {\n  ?s <http://xmlns.com/foaf/0.1/name> ?name .\n}\nLIMIT 5"
//! );
//! ```

use indexmap::IndexMap;

use crate::rdf::Namespace;

use super::detect::QueryType;
use super::pattern::{render_triple, GraphPattern, OptionalArg};
use super::term::{serialize_term, QueryTerm};
use super::{QueryBuildError, QueryBuildResult};

/// A query that renders to SPARQL text
pub trait SparqlQuery {
    /// Render the query, validating its required parts
    fn build(&self) -> QueryBuildResult<String>;

    /// The form this builder produces
    fn query_type(&self) -> QueryType;
}

/// PREFIX declarations, kept in insertion order with unique names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefixes(IndexMap<String, String>);

impl Prefixes {
    /// Register a prefix; re-registering a name replaces its IRI in place
    pub fn insert(&mut self, name: impl Into<String>, iri: impl Into<String>) {
        self.0.insert(name.into(), iri.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn render(&self) -> String {
        self.0
            .iter()
            .map(|(name, iri)| format!("PREFIX {name}: <{iri}>"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Operations shared by every query form
///
/// Pattern methods forward to the builder's [`GraphPattern`], so they accept
/// the same arguments and fail under the same conditions.
pub trait WhereClause {
    fn pattern_mut(&mut self) -> &mut GraphPattern;

    fn prefixes_mut(&mut self) -> &mut Prefixes;

    /// Declare `PREFIX name: <iri>`
    fn prefix(&mut self, name: &str, iri: &str) -> &mut Self {
        self.prefixes_mut().insert(name, iri);
        self
    }

    /// Declare the prefix of a [`Namespace`]
    fn namespace(&mut self, namespace: &Namespace) -> &mut Self {
        self.prefixes_mut()
            .insert(namespace.prefix.clone(), namespace.iri.clone());
        self
    }

    fn triple(
        &mut self,
        s: impl Into<QueryTerm>,
        p: impl Into<QueryTerm>,
        o: impl Into<QueryTerm>,
    ) -> &mut Self {
        self.pattern_mut().triple(s, p, o);
        self
    }

    fn filter(&mut self, expr: &str) -> &mut Self {
        self.pattern_mut().filter(expr);
        self
    }

    fn optional(&mut self, arg: impl Into<OptionalArg>) -> QueryBuildResult<&mut Self> {
        self.pattern_mut().optional(arg)?;
        Ok(self)
    }

    fn union<'a>(
        &mut self,
        patterns: impl IntoIterator<Item = &'a GraphPattern>,
    ) -> QueryBuildResult<&mut Self> {
        self.pattern_mut().union(patterns)?;
        Ok(self)
    }

    fn bind(&mut self, expr: &str, var: &str) -> &mut Self {
        self.pattern_mut().bind(expr, var);
        self
    }

    fn values<T: Into<QueryTerm>>(
        &mut self,
        var: &str,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.pattern_mut().values(var, values);
        self
    }

    fn sub_query(&mut self, query: &SelectQuery) -> QueryBuildResult<&mut Self> {
        self.pattern_mut().sub_query(query)?;
        Ok(self)
    }
}

macro_rules! impl_where_clause {
    ($($builder:ty),*) => {
        $(
            impl WhereClause for $builder {
                fn pattern_mut(&mut self) -> &mut GraphPattern {
                    &mut self.pattern
                }

                fn prefixes_mut(&mut self) -> &mut Prefixes {
                    &mut self.prefixes
                }
            }

            impl TryFrom<&$builder> for String {
                type Error = QueryBuildError;

                fn try_from(query: &$builder) -> QueryBuildResult<String> {
                    query.build()
                }
            }
        )*
    };
}

impl_where_clause!(SelectQuery, AskQuery, ConstructQuery, DescribeQuery);

fn push_where(parts: &mut Vec<String>, pattern: &GraphPattern) {
    parts.push("WHERE {".to_string());
    parts.push(pattern.to_sparql(2));
    parts.push("}".to_string());
}

fn missing(message: &str) -> QueryBuildError {
    QueryBuildError::MissingComponent(message.to_string())
}

/// Builder for `SELECT` queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    variables: Vec<String>,
    distinct: bool,
    pattern: GraphPattern,
    prefixes: Prefixes,
    group_by: Vec<String>,
    having: Option<String>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQuery {
    /// Start a SELECT projecting `variables` (`"?s"`, `"*"`, `"(COUNT(?s) AS ?n)"`, ...)
    pub fn new<T: Into<QueryTerm>>(variables: impl IntoIterator<Item = T>) -> Self {
        Self {
            variables: variables
                .into_iter()
                .map(|v| serialize_term(&v.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Append one projected variable or expression
    pub fn variable(&mut self, variable: impl Into<QueryTerm>) -> &mut Self {
        self.variables.push(serialize_term(&variable.into()));
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Append `GROUP BY` expressions; repeated calls accumulate
    pub fn group_by<S: Into<String>>(&mut self, exprs: impl IntoIterator<Item = S>) -> &mut Self {
        self.group_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Set the `HAVING` condition, replacing any previous one
    pub fn having(&mut self, expr: &str) -> &mut Self {
        self.having = Some(expr.to_string());
        self
    }

    /// Append `ORDER BY` expressions; repeated calls accumulate
    pub fn order_by<S: Into<String>>(&mut self, exprs: impl IntoIterator<Item = S>) -> &mut Self {
        self.order_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Render the query
    ///
    /// Solution modifiers always come out in grammar order (GROUP BY, HAVING,
    /// ORDER BY, LIMIT, OFFSET) whatever order they were set in.
    pub fn build(&self) -> QueryBuildResult<String> {
        if self.variables.is_empty() {
            return Err(missing("SELECT query requires at least one variable"));
        }
        if self.pattern.is_empty() {
            return Err(missing("SELECT query requires at least one WHERE pattern"));
        }

        let mut parts = Vec::new();
        if !self.prefixes.is_empty() {
            parts.push(self.prefixes.render());
        }

        let keyword = if self.distinct { "SELECT DISTINCT" } else { "SELECT" };
        parts.push(format!("{keyword} {}", self.variables.join(" ")));
        push_where(&mut parts, &self.pattern);

        if !self.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by.join(" ")));
        }
        if let Some(having) = self.having.as_deref().filter(|h| !h.is_empty()) {
            parts.push(format!("HAVING ({having})"));
        }
        if !self.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by.join(" ")));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("OFFSET {offset}"));
        }

        Ok(parts.join("\n"))
    }
}

/// Builder for `ASK` queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskQuery {
    pattern: GraphPattern,
    prefixes: Prefixes,
}

impl AskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&self) -> QueryBuildResult<String> {
        if self.pattern.is_empty() {
            return Err(missing("ASK query requires at least one WHERE pattern"));
        }

        let mut parts = Vec::new();
        if !self.prefixes.is_empty() {
            parts.push(self.prefixes.render());
        }
        parts.push("ASK {".to_string());
        parts.push(self.pattern.to_sparql(2));
        parts.push("}".to_string());

        Ok(parts.join("\n"))
    }
}

/// Builder for `CONSTRUCT` queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstructQuery {
    templates: Vec<String>,
    pattern: GraphPattern,
    prefixes: Prefixes,
}

impl ConstructQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a template triple to the CONSTRUCT block
    pub fn template(
        &mut self,
        s: impl Into<QueryTerm>,
        p: impl Into<QueryTerm>,
        o: impl Into<QueryTerm>,
    ) -> &mut Self {
        self.templates
            .push(render_triple(&s.into(), &p.into(), &o.into()));
        self
    }

    /// Render the query; the WHERE block is left out when the pattern is empty
    pub fn build(&self) -> QueryBuildResult<String> {
        if self.templates.is_empty() {
            return Err(missing("CONSTRUCT query requires at least one template triple"));
        }

        let mut parts = Vec::new();
        if !self.prefixes.is_empty() {
            parts.push(self.prefixes.render());
        }
        parts.push("CONSTRUCT {".to_string());
        parts.extend(self.templates.iter().map(|t| format!("  {t}")));
        parts.push("}".to_string());

        if !self.pattern.is_empty() {
            push_where(&mut parts, &self.pattern);
        }

        Ok(parts.join("\n"))
    }
}

/// Builder for `DESCRIBE` queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeQuery {
    resources: Vec<String>,
    pattern: GraphPattern,
    prefixes: Prefixes,
}

impl DescribeQuery {
    pub fn new<T: Into<QueryTerm>>(resources: impl IntoIterator<Item = T>) -> Self {
        Self {
            resources: resources
                .into_iter()
                .map(|r| serialize_term(&r.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Append one resource to describe
    pub fn resource(&mut self, resource: impl Into<QueryTerm>) -> &mut Self {
        self.resources.push(serialize_term(&resource.into()));
        self
    }

    pub fn build(&self) -> QueryBuildResult<String> {
        if self.resources.is_empty() {
            return Err(missing("DESCRIBE query requires at least one resource"));
        }

        let mut parts = Vec::new();
        if !self.prefixes.is_empty() {
            parts.push(self.prefixes.render());
        }
        parts.push(format!("DESCRIBE {}", self.resources.join(" ")));

        if !self.pattern.is_empty() {
            push_where(&mut parts, &self.pattern);
        }

        Ok(parts.join("\n"))
    }
}

impl SparqlQuery for SelectQuery {
    fn build(&self) -> QueryBuildResult<String> {
        SelectQuery::build(self)
    }

    fn query_type(&self) -> QueryType {
        QueryType::Select
    }
}

impl SparqlQuery for AskQuery {
    fn build(&self) -> QueryBuildResult<String> {
        AskQuery::build(self)
    }

    fn query_type(&self) -> QueryType {
        QueryType::Ask
    }
}

impl SparqlQuery for ConstructQuery {
    fn build(&self) -> QueryBuildResult<String> {
        ConstructQuery::build(self)
    }

    fn query_type(&self) -> QueryType {
        QueryType::Construct
    }
}

impl SparqlQuery for DescribeQuery {
    fn build(&self) -> QueryBuildResult<String> {
        DescribeQuery::build(self)
    }

    fn query_type(&self) -> QueryType {
        QueryType::Describe
    }
}

/// Start a `SELECT` query
pub fn select<T: Into<QueryTerm>>(variables: impl IntoIterator<Item = T>) -> SelectQuery {
    SelectQuery::new(variables)
}

/// Start an `ASK` query
pub fn ask() -> AskQuery {
    AskQuery::new()
}

/// Start a `CONSTRUCT` query; add templates with [`ConstructQuery::template`]
pub fn construct() -> ConstructQuery {
    ConstructQuery::new()
}

/// Start a `DESCRIBE` query over `resources`
pub fn describe<T: Into<QueryTerm>>(resources: impl IntoIterator<Item = T>) -> DescribeQuery {
    DescribeQuery::new(resources)
}
