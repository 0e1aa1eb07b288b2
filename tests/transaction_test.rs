mod common;

use common::FakeServer;
use futures::FutureExt;
use rdf4j::{Literal, NamedNode, Quad, RdfPredicate};
use rdf4j_client::{IsolationLevel, Method, Rdf4jError, TransactionState};

fn person(name: &str) -> Quad {
    Quad::new(
        NamedNode::new(&format!("http://example.org/{}", name.to_lowercase()))
            .unwrap()
            .into(),
        RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap(),
        Literal::new_simple_literal(name).into(),
        None,
    )
}

#[tokio::test]
async fn test_commit_publishes_changes() {
    let server = FakeServer::with_repository("people");
    let repo = server.client().repository("people");

    let mut txn = repo.transaction(None);
    assert_eq!(txn.state(), TransactionState::Pending);
    assert_eq!(txn.id(), None);

    txn.begin().await.unwrap();
    assert_eq!(txn.state(), TransactionState::Active);
    assert_eq!(txn.id(), Some("txn-1"));

    let alice = person("Alice");
    let bob = person("Bob");
    txn.add_statements([&alice, &bob]).await.unwrap();
    assert_eq!(txn.size().await.unwrap(), 2);
    assert!(server.statements("people").is_empty());

    txn.commit().await.unwrap();
    assert_eq!(txn.state(), TransactionState::Committed);
    assert_eq!(server.statements("people"), vec![alice, bob]);
    assert_eq!(server.open_transactions(), 0);
}

#[tokio::test]
async fn test_rollback_discards_changes() {
    let server = FakeServer::with_repository("people");
    let repo = server.client().repository("people");

    let mut txn = repo.transaction(Some(IsolationLevel::ReadCommitted));
    txn.begin().await.unwrap();
    txn.add_statements([&person("Alice")]).await.unwrap();
    txn.rollback().await.unwrap();

    assert_eq!(txn.state(), TransactionState::RolledBack);
    assert!(server.statements("people").is_empty());

    let begin = &server.requests()[0];
    assert_eq!(begin.param_value("isolation-level"), Some("READ_COMMITTED"));
}

#[tokio::test]
async fn test_finished_transaction_cannot_be_reused() {
    let server = FakeServer::with_repository("people");
    let repo = server.client().repository("people");

    let mut txn = repo.transaction(None);
    txn.begin().await.unwrap();
    txn.commit().await.unwrap();
    let sent = server.request_count();

    assert!(matches!(txn.begin().await, Err(Rdf4jError::TransactionState(_))));
    assert!(matches!(txn.rollback().await, Err(Rdf4jError::TransactionState(_))));
    assert!(matches!(
        txn.add_statements([&person("Carol")]).await,
        Err(Rdf4jError::TransactionState(_))
    ));
    assert!(matches!(
        txn.update("CLEAR ALL").await,
        Err(Rdf4jError::TransactionState(_))
    ));
    assert_eq!(server.request_count(), sent);
}

#[tokio::test]
async fn test_pending_transaction_sends_nothing() {
    let server = FakeServer::with_repository("people");
    let mut txn = server.client().repository("people").transaction(None);

    let err = txn.commit().await.unwrap_err();
    assert!(err.to_string().contains("pending"));
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn test_run_commits_on_success() {
    let server = FakeServer::with_repository("people");
    let repo = server.client().repository("people");
    let alice = person("Alice");
    let stored = alice.clone();

    let mut txn = repo.transaction(None);
    let size = txn
        .run(move |tx| {
            async move {
                tx.add_statements([&alice]).await?;
                tx.size().await
            }
            .boxed()
        })
        .await
        .unwrap();

    assert_eq!(size, 1);
    assert_eq!(txn.state(), TransactionState::Committed);
    assert_eq!(server.statements("people"), vec![stored]);
}

#[tokio::test]
async fn test_run_rolls_back_on_error() {
    let server = FakeServer::with_repository("people");
    let repo = server.client().repository("people");
    let alice = person("Alice");

    let mut txn = repo.transaction(None);
    let result: Result<(), Rdf4jError> = txn
        .run(move |tx| {
            async move {
                tx.add_statements([&alice]).await?;
                tx.update("").await
            }
            .boxed()
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(txn.state(), TransactionState::RolledBack);
    assert!(server.statements("people").is_empty());
    assert_eq!(server.open_transactions(), 0);
}

#[tokio::test]
async fn test_run_respects_explicit_rollback() {
    let server = FakeServer::with_repository("people");
    let repo = server.client().repository("people");

    let mut txn = repo.transaction(None);
    txn.run(|tx| async move { tx.rollback().await }.boxed())
        .await
        .unwrap();

    assert_eq!(txn.state(), TransactionState::RolledBack);
    let methods: Vec<Method> = server.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![Method::Post, Method::Delete]);
}

#[tokio::test]
async fn test_failed_commit_leaves_transaction_active() {
    let server = FakeServer::with_repository("people");
    let repo = server.client().repository("people");

    let mut txn = repo.transaction(None);
    txn.begin().await.unwrap();
    txn.add_statements([&person("Alice")]).await.unwrap();

    server.fail_next(Method::Put, "COMMIT", 409);
    let err = txn.commit().await.unwrap_err();
    assert!(matches!(err, Rdf4jError::Transaction { status: 409, .. }));
    assert!(txn.is_active());

    txn.commit().await.unwrap();
    assert_eq!(server.statements("people").len(), 1);
}

#[tokio::test]
async fn test_begin_on_missing_repository() {
    let server = FakeServer::new();
    let mut txn = server.client().repository("nowhere").transaction(None);

    let err = txn.begin().await.unwrap_err();
    assert!(matches!(err, Rdf4jError::Transaction { status: 404, .. }));
    assert_eq!(txn.state(), TransactionState::Pending);
}

#[tokio::test]
async fn test_delete_and_update_inside_transaction() {
    let server = FakeServer::with_repository("people");
    let repo = server.client().repository("people");
    let alice = person("Alice");
    let bob = person("Bob");
    repo.add_statements([&alice, &bob]).await.unwrap();

    let mut txn = repo.transaction(None);
    txn.begin().await.unwrap();
    txn.delete_statements([&alice]).await.unwrap();
    assert_eq!(txn.size().await.unwrap(), 1);
    txn.update("CLEAR ALL").await.unwrap();
    assert_eq!(txn.size().await.unwrap(), 0);
    txn.commit().await.unwrap();

    assert!(server.statements("people").is_empty());
}
