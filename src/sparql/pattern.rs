//! Composable WHERE-clause bodies

use super::builder::SelectQuery;
use super::term::{serialize_term, QueryTerm};
use super::{QueryBuildError, QueryBuildResult};

/// Argument of [`GraphPattern::optional`]
///
/// Either a single triple (`(s, p, o)`) or a nested pattern block. Term lists
/// of any other length are rejected when the pattern is extended.
#[derive(Debug, Clone)]
pub enum OptionalArg {
    Terms(Vec<QueryTerm>),
    Pattern(GraphPattern),
}

impl<S, P, O> From<(S, P, O)> for OptionalArg
where
    S: Into<QueryTerm>,
    P: Into<QueryTerm>,
    O: Into<QueryTerm>,
{
    fn from((s, p, o): (S, P, O)) -> Self {
        OptionalArg::Terms(vec![s.into(), p.into(), o.into()])
    }
}

impl From<Vec<QueryTerm>> for OptionalArg {
    fn from(terms: Vec<QueryTerm>) -> Self {
        OptionalArg::Terms(terms)
    }
}

impl From<GraphPattern> for OptionalArg {
    fn from(pattern: GraphPattern) -> Self {
        OptionalArg::Pattern(pattern)
    }
}

impl From<&GraphPattern> for OptionalArg {
    fn from(pattern: &GraphPattern) -> Self {
        OptionalArg::Pattern(pattern.clone())
    }
}

/// An ordered list of rendered graph pattern elements
///
/// Element order is kept as given. Cloning produces an independent copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphPattern {
    elements: Vec<String>,
}

impl GraphPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple pattern `s p o .`
    pub fn triple(
        &mut self,
        s: impl Into<QueryTerm>,
        p: impl Into<QueryTerm>,
        o: impl Into<QueryTerm>,
    ) -> &mut Self {
        self.elements.push(render_triple(&s.into(), &p.into(), &o.into()));
        self
    }

    /// Add `FILTER(expr)`; the expression is not checked
    pub fn filter(&mut self, expr: &str) -> &mut Self {
        self.elements.push(format!("FILTER({expr})"));
        self
    }

    /// Add an `OPTIONAL` block, from a single triple or from a nested pattern
    pub fn optional(&mut self, arg: impl Into<OptionalArg>) -> QueryBuildResult<&mut Self> {
        let element = match arg.into() {
            OptionalArg::Pattern(pattern) => {
                format!("OPTIONAL {{\n{}\n  }}", pattern.to_sparql(4))
            }
            OptionalArg::Terms(terms) => match terms.as_slice() {
                [s, p, o] => format!("OPTIONAL {{ {} }}", render_triple(s, p, o)),
                _ => {
                    return Err(QueryBuildError::InvalidArgument(format!(
                        "optional() requires either a GraphPattern or three terms (s, p, o), got {} term(s)",
                        terms.len()
                    )))
                }
            },
        };
        self.elements.push(element);
        Ok(self)
    }

    /// Add `{ ... } UNION { ... }` over two or more patterns
    pub fn union<'a>(
        &mut self,
        patterns: impl IntoIterator<Item = &'a GraphPattern>,
    ) -> QueryBuildResult<&mut Self> {
        let parts: Vec<String> = patterns
            .into_iter()
            .map(|pattern| format!("{{\n{}\n  }}", pattern.to_sparql(4)))
            .collect();
        if parts.len() < 2 {
            return Err(QueryBuildError::InvalidArgument(
                "union() requires at least two patterns".to_string(),
            ));
        }
        self.elements.push(parts.join(" UNION "));
        Ok(self)
    }

    /// Add `BIND(expr AS ?var)`; a missing `?` is added to the variable
    pub fn bind(&mut self, expr: &str, var: &str) -> &mut Self {
        self.elements.push(format!("BIND({expr} AS {})", variable_name(var)));
        self
    }

    /// Add an inline `VALUES ?var { ... }` table
    pub fn values<T: Into<QueryTerm>>(
        &mut self,
        var: &str,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        let rendered: Vec<String> = values
            .into_iter()
            .map(|value| serialize_term(&value.into()))
            .collect();
        self.elements.push(format!(
            "VALUES {} {{ {} }}",
            variable_name(var),
            rendered.join(" ")
        ));
        self
    }

    /// Embed a sub-SELECT as a nested `{ ... }` group
    ///
    /// Fails when the sub-query itself does not build.
    pub fn sub_query(&mut self, query: &SelectQuery) -> QueryBuildResult<&mut Self> {
        let inner = query.build()?;
        let indented: Vec<String> = inner.lines().map(|line| format!("    {line}")).collect();
        self.elements.push(format!("{{\n{}\n  }}", indented.join("\n")));
        Ok(self)
    }

    /// Render the body without its surrounding braces, one element per line
    pub fn to_sparql(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        self.elements
            .iter()
            .map(|element| format!("{pad}{element}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of top-level elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

pub(crate) fn render_triple(s: &QueryTerm, p: &QueryTerm, o: &QueryTerm) -> String {
    format!(
        "{} {} {} .",
        serialize_term(s),
        serialize_term(p),
        serialize_term(o)
    )
}

fn variable_name(var: &str) -> String {
    if var.starts_with('?') {
        var.to_string()
    } else {
        format!("?{var}")
    }
}
