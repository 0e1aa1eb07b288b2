//! Rendering of query results, repository lists and namespaces

use comfy_table::{ContentArrangement, Table};
use rdf4j::{Namespace, NamespaceManager, Quad, RdfTerm, SparqlResults};
use rdf4j_client::RepositoryInfo;
use serde_json::{json, Map, Value};

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Formats terms for display, compacting IRIs through known prefixes
pub struct Renderer {
    pub format: OutputFormat,
    namespaces: NamespaceManager,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            namespaces: NamespaceManager::new(),
        }
    }

    /// Also compact with the prefixes declared in a repository
    pub fn learn<'a>(&mut self, namespaces: impl IntoIterator<Item = &'a Namespace>) {
        self.namespaces.extend(namespaces);
    }

    fn term(&self, term: &RdfTerm) -> String {
        match term {
            RdfTerm::NamedNode(node) => self
                .namespaces
                .compact(node.as_str())
                .unwrap_or_else(|| node.to_string()),
            RdfTerm::Literal(literal) if literal.is_plain() => literal.value().to_string(),
            other => other.to_string(),
        }
    }

    fn quad_row(&self, quad: &Quad) -> Vec<String> {
        let mut row = vec![
            self.term(&quad.subject.clone().into()),
            self.term(&RdfTerm::NamedNode(quad.predicate.as_named_node().clone())),
            self.term(&quad.object.clone().into()),
        ];
        if let Some(graph) = &quad.graph {
            row.push(self.term(&RdfTerm::NamedNode(graph.clone())));
        }
        row
    }

    pub fn results(&self, results: &SparqlResults) -> Result<(), Box<dyn std::error::Error>> {
        match results {
            SparqlResults::Boolean(value) => match self.format {
                OutputFormat::Json => println!("{}", json!({ "boolean": value })),
                _ => println!("{}", value),
            },
            SparqlResults::Bindings {
                variables,
                solutions,
            } => {
                let rows: Vec<Vec<String>> = solutions
                    .iter()
                    .map(|solution| {
                        variables
                            .iter()
                            .map(|var| solution.get(var).map(|t| self.term(t)).unwrap_or_default())
                            .collect()
                    })
                    .collect();
                self.rows(variables, &rows)?;
            }
            SparqlResults::Graph(quads) => {
                let mut header = vec!["subject".to_string(), "predicate".to_string(), "object".to_string()];
                if quads.iter().any(|q| q.graph.is_some()) {
                    header.push("graph".to_string());
                }
                let rows: Vec<Vec<String>> = quads.iter().map(|q| self.quad_row(q)).collect();
                self.rows(&header, &rows)?;
            }
        }
        Ok(())
    }

    pub fn repositories(&self, repositories: &[RepositoryInfo]) -> Result<(), Box<dyn std::error::Error>> {
        if let OutputFormat::Json = self.format {
            println!("{}", serde_json::to_string_pretty(repositories)?);
            return Ok(());
        }
        let header = ["id", "title", "readable", "writable", "uri"].map(String::from);
        let rows: Vec<Vec<String>> = repositories
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.title.clone(),
                    r.readable.to_string(),
                    r.writable.to_string(),
                    r.uri.clone(),
                ]
            })
            .collect();
        self.rows(&header, &rows)
    }

    pub fn namespaces(&self, namespaces: &[Namespace]) -> Result<(), Box<dyn std::error::Error>> {
        if let OutputFormat::Json = self.format {
            println!("{}", serde_json::to_string_pretty(namespaces)?);
            return Ok(());
        }
        let header = ["prefix", "namespace"].map(String::from);
        let rows: Vec<Vec<String>> = namespaces
            .iter()
            .map(|ns| vec![ns.prefix.clone(), ns.iri.clone()])
            .collect();
        self.rows(&header, &rows)
    }

    fn rows(&self, header: &[String], rows: &[Vec<String>]) -> Result<(), Box<dyn std::error::Error>> {
        match self.format {
            OutputFormat::Json => {
                let records: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        let record: Map<String, Value> = header
                            .iter()
                            .cloned()
                            .zip(row.iter().map(|cell| Value::String(cell.clone())))
                            .collect();
                        Value::Object(record)
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
            OutputFormat::Csv => {
                println!("{}", header.join(","));
                for row in rows {
                    let cells: Vec<String> = row.iter().map(|c| csv_cell(c)).collect();
                    println!("{}", cells.join(","));
                }
            }
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("(no results)");
                    return Ok(());
                }

                let mut table = Table::new();
                table.set_content_arrangement(ContentArrangement::Dynamic);
                table.set_header(header);
                for row in rows {
                    table.add_row(row);
                }

                println!("{}", table);
                println!("{} row(s)", rows.len());
            }
        }
        Ok(())
    }
}

fn csv_cell(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
