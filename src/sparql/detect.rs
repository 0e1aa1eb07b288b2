//! Query form detection
//!
//! Finds the leading keyword of a SPARQL request after dropping comments and
//! the PREFIX/BASE prologue. The result decides which Accept header and
//! response decoder a query needs, and lets callers check that a query is of
//! the form they expect.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::rdf::RdfFormat;

static PREFIX_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPREFIX\s+[^\s:]*:\s*<[^>]*>").expect("valid PREFIX regex"));

static BASE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bBASE\s+<[^>]*>").expect("valid BASE regex"));

/// SPARQL request forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    Ask,
    Construct,
    Describe,
    /// Any SPARQL 1.1 Update operation (INSERT, DELETE, LOAD, CLEAR, ...)
    Update,
}

impl QueryType {
    /// Classify a keyword as returned by [`detect_query_type`]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" => Some(QueryType::Select),
            "ASK" => Some(QueryType::Ask),
            "CONSTRUCT" => Some(QueryType::Construct),
            "DESCRIBE" => Some(QueryType::Describe),
            "INSERT" | "DELETE" | "WITH" | "LOAD" | "CLEAR" | "CREATE" | "DROP" | "COPY"
            | "MOVE" | "ADD" => Some(QueryType::Update),
            _ => None,
        }
    }

    /// Detect the form of `query`
    pub fn detect(query: &str) -> Option<Self> {
        Self::from_keyword(&detect_query_type(query))
    }

    pub fn keyword(self) -> &'static str {
        match self {
            QueryType::Select => "SELECT",
            QueryType::Ask => "ASK",
            QueryType::Construct => "CONSTRUCT",
            QueryType::Describe => "DESCRIBE",
            QueryType::Update => "UPDATE",
        }
    }

    /// CONSTRUCT and DESCRIBE return RDF statements
    pub fn is_graph(self) -> bool {
        matches!(self, QueryType::Construct | QueryType::Describe)
    }

    pub fn is_update(self) -> bool {
        self == QueryType::Update
    }

    /// Response format to request for this form, `None` for updates
    pub fn result_format(self) -> Option<RdfFormat> {
        match self {
            QueryType::Select | QueryType::Ask => Some(RdfFormat::SparqlResultsJson),
            QueryType::Construct | QueryType::Describe => Some(RdfFormat::NTriples),
            QueryType::Update => None,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Clone, Copy)]
enum Lexer {
    Bare,
    Iri,
    Str { quote: char, escaped: bool },
    Comment,
}

/// Remove `#` comments, leaving `#` inside IRIs and string literals intact
fn strip_comments(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut state = Lexer::Bare;

    for c in query.chars() {
        state = match state {
            Lexer::Comment => {
                if c == '\n' {
                    out.push(c);
                    Lexer::Bare
                } else {
                    Lexer::Comment
                }
            }
            Lexer::Bare => match c {
                '#' => Lexer::Comment,
                '<' => {
                    out.push(c);
                    Lexer::Iri
                }
                '"' | '\'' => {
                    out.push(c);
                    Lexer::Str { quote: c, escaped: false }
                }
                _ => {
                    out.push(c);
                    Lexer::Bare
                }
            },
            Lexer::Iri => {
                out.push(c);
                // IRIs never contain whitespace, so a `<` followed by a
                // space was a comparison operator
                if c == '>' || c.is_whitespace() {
                    Lexer::Bare
                } else {
                    Lexer::Iri
                }
            }
            Lexer::Str { quote, escaped } => {
                out.push(c);
                if escaped {
                    Lexer::Str { quote, escaped: false }
                } else if c == '\\' {
                    Lexer::Str { quote, escaped: true }
                } else if c == quote {
                    Lexer::Bare
                } else {
                    Lexer::Str { quote, escaped: false }
                }
            }
        };
    }

    out
}

/// Return the upper-cased leading keyword of a SPARQL query or update
///
/// Comments and `PREFIX`/`BASE` declarations are skipped. An empty string is
/// returned when nothing else is left.
pub fn detect_query_type(query: &str) -> String {
    let stripped = strip_comments(query);
    let stripped = PREFIX_DECL.replace_all(&stripped, " ");
    let stripped = BASE_DECL.replace_all(&stripped, " ");

    stripped
        .split_whitespace()
        .next()
        .map(|token| {
            // `ASK{` and `SELECT*` have no space after the keyword
            let end = token
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(token.len());
            let keyword = if end == 0 { token } else { &token[..end] };
            keyword.to_ascii_uppercase()
        })
        .unwrap_or_default()
}
