//! RDF4J client: async access to an RDF4J server over its REST protocol
//!
//! - **`Rdf4jClient`**: server-level calls (protocol version, repository
//!   listing, creation and deletion) and the entry point to repositories
//! - **`Repository`**: SPARQL queries and updates, statements, namespaces,
//!   size and contexts of one repository
//! - **`NamedGraph`**: graph store access to one named graph
//! - **`Transaction`**: explicit server-side transactions with commit and
//!   rollback
//!
//! All network access goes through the [`HttpTransport`] trait.
//! [`ReqwestTransport`] is the production implementation; tests plug in an
//! in-memory server instead.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rdf4j::{select, WhereClause};
//! use rdf4j_client::Rdf4jClient;
//!
//! #[tokio::main]
//! async fn main() -> rdf4j_client::Rdf4jResult<()> {
//!     let client = Rdf4jClient::connect("http://localhost:8080/rdf4j-server")?;
//!     let repo = client.repository("people");
//!
//!     let mut query = select(["?name"]);
//!     query
//!         .prefix("foaf", "http://xmlns.com/foaf/0.1/")
//!         .triple("?person", "foaf:name", "?name")
//!         .limit(10);
//!
//!     let results = repo.execute(&query).await?;
//!     println!("Found {} names", results.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod named_graph;
pub mod remote;
pub mod repository;
pub mod transaction;
pub mod transport;

pub use client::Rdf4jClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{Rdf4jError, Rdf4jResult};
pub use models::RepositoryInfo;
pub use named_graph::NamedGraph;
pub use remote::ReqwestTransport;
pub use repository::{QueryOptions, Repository};
pub use transaction::{IsolationLevel, Transaction, TransactionState};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
