//! Explicit server-side transactions
//!
//! A [`Transaction`] walks through PENDING → ACTIVE → COMMITTED or
//! ROLLED_BACK. Only an ACTIVE transaction accepts statement changes, updates,
//! commit and rollback; a transaction that left ACTIVE cannot be reused.
//! Failed server calls leave the state untouched, so the caller decides
//! whether to retry or roll back.
//!
//! ```no_run
//! # use rdf4j_client::{Rdf4jClient, Rdf4jResult, IsolationLevel};
//! # use rdf4j::{Literal, NamedNode, Quad, RdfPredicate};
//! use futures::FutureExt;
//!
//! # async fn demo(client: Rdf4jClient) -> Rdf4jResult<()> {
//! let repo = client.repository("people");
//! let quad = Quad::new(
//!     NamedNode::new("http://example.org/alice")?.into(),
//!     RdfPredicate::new("http://xmlns.com/foaf/0.1/name")?,
//!     Literal::new_simple_literal("Alice").into(),
//!     None,
//! );
//!
//! let mut txn = repo.transaction(Some(IsolationLevel::Snapshot));
//! txn.run(move |tx| {
//!     async move {
//!         tx.add_statements([&quad]).await?;
//!         tx.update("DELETE WHERE { ?s <http://example.org/obsolete> ?o }").await
//!     }
//!     .boxed()
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use rdf4j::{serialize_quads, Quad, RdfFormat};
use tracing::{debug, info, warn};

use crate::error::{Rdf4jError, Rdf4jResult};
use crate::transport::{encode_segment, HttpRequest, HttpResponse, HttpTransport};

/// Represents the state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Not started, no server resource yet
    Pending,
    Active,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionState::Pending => "pending",
            TransactionState::Active => "active",
            TransactionState::Committed => "committed",
            TransactionState::RolledBack => "rolled_back",
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction isolation levels understood by RDF4J
///
/// Stores that do not support the requested level fall back to their default;
/// nothing is checked on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    None,
    ReadUncommitted,
    ReadCommitted,
    SnapshotRead,
    Snapshot,
    Serializable,
}

impl IsolationLevel {
    /// Name sent in the `isolation-level` parameter
    pub fn as_str(self) -> &'static str {
        match self {
            IsolationLevel::None => "NONE",
            IsolationLevel::ReadUncommitted => "READ_UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ_COMMITTED",
            IsolationLevel::SnapshotRead => "SNAPSHOT_READ",
            IsolationLevel::Snapshot => "SNAPSHOT",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction on one repository
///
/// Not meant to be shared between tasks; open one transaction per concurrent
/// writer instead. Isolation between them is enforced by the server.
pub struct Transaction {
    transport: Arc<dyn HttpTransport>,
    repository_id: String,
    isolation_level: Option<IsolationLevel>,
    state: TransactionState,
    id: Option<String>,
}

impl Transaction {
    pub(crate) fn new(
        transport: Arc<dyn HttpTransport>,
        repository_id: impl Into<String>,
        isolation_level: Option<IsolationLevel>,
    ) -> Self {
        Self {
            transport,
            repository_id: repository_id.into(),
            isolation_level,
            state: TransactionState::Pending,
            id: None,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Server-assigned id, known once the transaction has begun
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn isolation_level(&self) -> Option<IsolationLevel> {
        self.isolation_level
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    fn transactions_path(&self) -> String {
        format!(
            "/repositories/{}/transactions",
            encode_segment(&self.repository_id)
        )
    }

    fn resource_path(&self) -> String {
        format!(
            "{}/{}",
            self.transactions_path(),
            encode_segment(self.id.as_deref().unwrap_or_default())
        )
    }

    /// Create the transaction on the server
    pub async fn begin(&mut self) -> Rdf4jResult<()> {
        if self.state != TransactionState::Pending {
            return Err(Rdf4jError::TransactionState(format!(
                "Cannot begin transaction: already in state {}",
                self.state
            )));
        }

        let mut request = HttpRequest::post(self.transactions_path());
        if let Some(level) = self.isolation_level {
            request = request.param("isolation-level", level.as_str());
        }

        let response = self.transport.execute(request).await?;
        if response.status != 201 {
            return Err(Rdf4jError::Transaction {
                status: response.status,
                message: format!("Failed to start transaction: {}", response.error_message()),
            });
        }

        // Location ends with .../repositories/{repo}/transactions/{txn-id}
        let location = response.header("Location").ok_or_else(|| {
            Rdf4jError::Protocol(
                "Server did not return transaction ID in Location header".to_string(),
            )
        })?;
        let id = location
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| {
                Rdf4jError::Protocol(format!(
                    "Cannot read transaction ID from Location header: {location}"
                ))
            })?
            .to_string();

        info!(
            "Started transaction {} on repository {}",
            id, self.repository_id
        );
        self.id = Some(id);
        self.state = TransactionState::Active;
        Ok(())
    }

    /// Make every change of the transaction permanent
    pub async fn commit(&mut self) -> Rdf4jResult<()> {
        self.ensure_state("Cannot commit transaction")?;

        let request = HttpRequest::put(self.resource_path()).param("action", "COMMIT");
        let response = self.transport.execute(request).await?;
        check_response(&response, "Failed to commit transaction")?;

        info!("Committed transaction {}", self.id().unwrap_or_default());
        self.state = TransactionState::Committed;
        Ok(())
    }

    /// Discard every change of the transaction
    pub async fn rollback(&mut self) -> Rdf4jResult<()> {
        self.ensure_state("Cannot rollback transaction")?;

        let request = HttpRequest::delete(self.resource_path());
        let response = self.transport.execute(request).await?;
        check_response(&response, "Failed to rollback transaction")?;

        info!("Rolled back transaction {}", self.id().unwrap_or_default());
        self.state = TransactionState::RolledBack;
        Ok(())
    }

    /// Add statements inside the transaction
    pub async fn add_statements<'a>(
        &self,
        statements: impl IntoIterator<Item = &'a Quad>,
    ) -> Rdf4jResult<()> {
        self.ensure_active()?;
        let body = serialize_quads(statements)?;
        self.send_action("ADD", RdfFormat::NQuads, body, "Failed to add statements")
            .await?;
        Ok(())
    }

    /// Delete the given statements inside the transaction
    pub async fn delete_statements<'a>(
        &self,
        statements: impl IntoIterator<Item = &'a Quad>,
    ) -> Rdf4jResult<()> {
        self.ensure_active()?;
        let body = serialize_quads(statements)?;
        self.send_action("DELETE", RdfFormat::NQuads, body, "Failed to delete statements")
            .await?;
        Ok(())
    }

    /// Run a SPARQL update inside the transaction
    pub async fn update(&self, sparql_update: &str) -> Rdf4jResult<()> {
        self.ensure_active()?;
        self.send_action(
            "UPDATE",
            RdfFormat::SparqlUpdate,
            sparql_update.to_string(),
            "Failed to execute update",
        )
        .await?;
        Ok(())
    }

    /// Number of statements as seen from inside the transaction
    pub async fn size(&self) -> Rdf4jResult<u64> {
        self.ensure_active()?;
        let request = HttpRequest::put(self.resource_path()).param("action", "SIZE");
        let response = self.transport.execute(request).await?;
        check_response(&response, "Failed to read transaction size")?;

        response
            .body
            .trim()
            .parse()
            .map_err(|e| Rdf4jError::Parse(format!("invalid size '{}': {e}", response.body.trim())))
    }

    /// Run `f` inside the transaction
    ///
    /// Begins the transaction, then commits it when `f` succeeds or rolls it
    /// back when `f` fails. If `f` already committed or rolled back, nothing
    /// more is sent. When the rollback itself fails the original error is
    /// returned and the rollback failure is logged.
    pub async fn run<F, T>(&mut self, f: F) -> Rdf4jResult<T>
    where
        F: for<'t> FnOnce(&'t mut Transaction) -> BoxFuture<'t, Rdf4jResult<T>>,
    {
        self.begin().await?;
        let outcome = f(&mut *self).await;

        if !self.is_active() {
            debug!(
                "Transaction {} already finished as {}",
                self.id().unwrap_or_default(),
                self.state
            );
            return outcome;
        }

        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(
                        "Rollback of transaction {} failed: {}",
                        self.id().unwrap_or_default(),
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }

    fn ensure_state(&self, what: &str) -> Rdf4jResult<()> {
        if self.state != TransactionState::Active {
            return Err(Rdf4jError::TransactionState(format!(
                "{what}: in state {}",
                self.state
            )));
        }
        Ok(())
    }

    fn ensure_active(&self) -> Rdf4jResult<()> {
        if self.state != TransactionState::Active {
            return Err(Rdf4jError::TransactionState(format!(
                "Cannot perform operation: transaction in state {}",
                self.state
            )));
        }
        Ok(())
    }

    async fn send_action(
        &self,
        action: &str,
        format: RdfFormat,
        body: String,
        failure: &str,
    ) -> Rdf4jResult<HttpResponse> {
        let request = HttpRequest::put(self.resource_path())
            .param("action", action)
            .content_type(format.media_type())
            .body(body);
        let response = self.transport.execute(request).await?;
        check_response(&response, failure)?;
        Ok(response)
    }
}

/// Transaction calls succeed with 200 or 204
fn check_response(response: &HttpResponse, failure: &str) -> Rdf4jResult<()> {
    if matches!(response.status, 200 | 204) {
        Ok(())
    } else {
        Err(Rdf4jError::Transaction {
            status: response.status,
            message: format!("{failure}: {}", response.error_message()),
        })
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("repository_id", &self.repository_id)
            .field("id", &self.id)
            .field("state", &self.state)
            .field("isolation_level", &self.isolation_level)
            .finish()
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state == TransactionState::Active {
            warn!(
                "Transaction {} on repository {} dropped while still active",
                self.id().unwrap_or_default(),
                self.repository_id
            );
        }
    }
}
