//! N-Quads / N-Triples codec

use crate::rdf::{BlankNode, Literal, NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject};
use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use rio_api::formatter::QuadsFormatter;
use rio_api::model as rio;
use rio_api::parser::QuadsParser;
use rio_turtle::{NQuadsFormatter, NQuadsParser};
use std::io::{BufReader, Cursor};

/// Parse an N-Quads (or N-Triples, its subset) document
pub fn parse_quads(input: &str) -> ParseResult<Vec<Quad>> {
    let mut reader = BufReader::new(Cursor::new(input));
    let mut parser = NQuadsParser::new(&mut reader);

    let mut quads = Vec::new();

    let res: Result<(), rio_turtle::TurtleError> = parser.parse_all(&mut |q| {
        let quad = convert_quad(q)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        quads.push(quad);
        Ok(())
    });

    match res {
        Ok(()) => Ok(quads),
        Err(e) => Err(ParseError::Parse(e.to_string())),
    }
}

/// Serialize quads as an N-Quads document, one statement per line
pub fn serialize_quads<'a>(quads: impl IntoIterator<Item = &'a Quad>) -> SerializeResult<String> {
    let mut output = Vec::new();
    let mut formatter = NQuadsFormatter::new(&mut output);

    for quad in quads {
        let subject = match &quad.subject {
            RdfSubject::NamedNode(n) => rio::Subject::NamedNode(rio::NamedNode { iri: n.as_str() }),
            RdfSubject::BlankNode(b) => rio::Subject::BlankNode(rio::BlankNode { id: b.as_str() }),
        };

        let predicate = rio::NamedNode { iri: quad.predicate.as_named_node().as_str() };

        let datatype;
        let object = match &quad.object {
            RdfObject::NamedNode(n) => rio::Term::NamedNode(rio::NamedNode { iri: n.as_str() }),
            RdfObject::BlankNode(b) => rio::Term::BlankNode(rio::BlankNode { id: b.as_str() }),
            RdfObject::Literal(l) => {
                if let Some(language) = l.language() {
                    rio::Term::Literal(rio::Literal::LanguageTaggedString {
                        value: l.value(),
                        language,
                    })
                } else if l.is_plain() {
                    rio::Term::Literal(rio::Literal::Simple { value: l.value() })
                } else {
                    datatype = l.datatype();
                    rio::Term::Literal(rio::Literal::Typed {
                        value: l.value(),
                        datatype: rio::NamedNode { iri: datatype.as_str() },
                    })
                }
            }
        };

        let graph_name = quad
            .graph
            .as_ref()
            .map(|g| rio::GraphName::NamedNode(rio::NamedNode { iri: g.as_str() }));

        formatter
            .format(&rio::Quad {
                subject,
                predicate,
                object,
                graph_name,
            })
            .map_err(|e| SerializeError::Serialize(e.to_string()))?;
    }
    drop(formatter);

    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}

fn convert_quad(q: rio::Quad<'_>) -> ParseResult<Quad> {
    let graph = match q.graph_name {
        None => None,
        Some(rio::GraphName::NamedNode(n)) => Some(named_node(n.iri)?),
        Some(rio::GraphName::BlankNode(b)) => {
            return Err(ParseError::Parse(format!(
                "Blank node graph names are not supported: _:{}",
                b.id
            )))
        }
    };
    Ok(Quad::new(
        convert_subject(q.subject)?,
        RdfPredicate::from(named_node(q.predicate.iri)?),
        convert_object(q.object)?,
        graph,
    ))
}

fn named_node(iri: &str) -> ParseResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| ParseError::Parse(e.to_string()))
}

fn blank_node(id: &str) -> ParseResult<BlankNode> {
    BlankNode::from_id(id).map_err(|e| ParseError::Parse(e.to_string()))
}

fn convert_subject(s: rio::Subject<'_>) -> ParseResult<RdfSubject> {
    match s {
        rio::Subject::NamedNode(n) => Ok(RdfSubject::NamedNode(named_node(n.iri)?)),
        rio::Subject::BlankNode(b) => Ok(RdfSubject::BlankNode(blank_node(b.id)?)),
        _ => Err(ParseError::Parse("Unsupported subject type".to_string())),
    }
}

fn convert_object(o: rio::Term<'_>) -> ParseResult<RdfObject> {
    match o {
        rio::Term::NamedNode(n) => Ok(RdfObject::NamedNode(named_node(n.iri)?)),
        rio::Term::BlankNode(b) => Ok(RdfObject::BlankNode(blank_node(b.id)?)),
        rio::Term::Literal(rio::Literal::Simple { value }) => {
            Ok(RdfObject::Literal(Literal::new_simple_literal(value)))
        }
        rio::Term::Literal(rio::Literal::LanguageTaggedString { value, language }) => {
            Ok(RdfObject::Literal(
                Literal::new_language_tagged_literal(value, language)
                    .map_err(|e| ParseError::Parse(e.to_string()))?,
            ))
        }
        rio::Term::Literal(rio::Literal::Typed { value, datatype }) => Ok(RdfObject::Literal(
            Literal::new_typed_literal(value, named_node(datatype.iri)?),
        )),
        _ => Err(ParseError::Parse("Unsupported object type".to_string())),
    }
}
