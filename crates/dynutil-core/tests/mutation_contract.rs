//! Contract Test: Record Mutations
//!
//! Constraints verified:
//! - Every successful create/update/delete is followed by exactly one publish
//! - Update/delete fail without publishing when no record exists at the node
//! - Only the first matching record is touched
//! - The root node is addressed by the empty string
//! - A failed publish is reported and leaves the zone with pending changes

mod common;

use common::*;
use dynutil_core::{Dispatcher, ErrorKind, Operation, Outcome, QueryType, RecordType};

#[tokio::test]
async fn update_sets_address_and_publishes_once() {
    let session = example_session().await;
    session
        .seed_record("example.com", "www", RecordType::A, "192.0.2.1")
        .await
        .unwrap();
    let dispatcher = Dispatcher::new(&session);

    let outcome = dispatcher
        .execute(&command(
            Operation::Update,
            QueryType::A,
            Some("example.com"),
            Some("www"),
            Some("203.0.113.5"),
        ))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Mutated {
            operation: Operation::Update,
            zone: "example.com".into(),
            fqdn: "www.example.com".into(),
            record_type: RecordType::A,
        }
    );
    let live = session
        .live_records("example.com", "www.example.com", RecordType::A)
        .await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].value, "203.0.113.5");
    assert_eq!(session.publish_count(), 1);
}

#[tokio::test]
async fn update_without_record_fails_and_never_publishes() {
    let session = example_session().await;
    let dispatcher = Dispatcher::new(&session);

    let err = dispatcher
        .execute(&command(
            Operation::Update,
            QueryType::A,
            Some("example.com"),
            Some("www"),
            Some("203.0.113.5"),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(
        err.to_string()
            .starts_with("failed to update A record at node 'www' in zone 'example.com'"),
        "unexpected message: {}",
        err
    );
    assert_eq!(session.publish_count(), 0);
}

#[tokio::test]
async fn update_touches_only_first_matching_record() {
    let session = example_session().await;
    session
        .seed_record("example.com", "www", RecordType::A, "192.0.2.1")
        .await
        .unwrap();
    session
        .seed_record("example.com", "www", RecordType::A, "192.0.2.2")
        .await
        .unwrap();
    let dispatcher = Dispatcher::new(&session);

    dispatcher
        .execute(&command(
            Operation::Update,
            QueryType::A,
            Some("example.com"),
            Some("www"),
            Some("203.0.113.5"),
        ))
        .await
        .unwrap();

    let values: Vec<String> = session
        .live_records("example.com", "www.example.com", RecordType::A)
        .await
        .into_iter()
        .map(|r| r.value)
        .collect();
    assert_eq!(values, vec!["203.0.113.5", "192.0.2.2"]);
}

#[tokio::test]
async fn update_cname_sets_cname_field() {
    let session = example_session().await;
    session
        .seed_record("example.com", "blog", RecordType::Cname, "old.example.net")
        .await
        .unwrap();
    let dispatcher = Dispatcher::new(&session);

    dispatcher
        .execute(&command(
            Operation::Update,
            QueryType::Cname,
            Some("example.com"),
            Some("blog"),
            Some("new.example.net"),
        ))
        .await
        .unwrap();

    let live = session
        .live_records("example.com", "blog.example.com", RecordType::Cname)
        .await;
    assert_eq!(live[0].value, "new.example.net");
}

#[tokio::test]
async fn create_mx_at_root_node_and_publish() {
    let session = example_session().await;
    let dispatcher = Dispatcher::new(&session);

    dispatcher
        .execute(&command(
            Operation::Create,
            QueryType::Mx,
            Some("example.com"),
            Some(""),
            Some("mail.example.com"),
        ))
        .await
        .unwrap();

    let live = session
        .live_records("example.com", "example.com", RecordType::Mx)
        .await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].value, "mail.example.com");
    assert_eq!(session.publish_count(), 1);
}

#[tokio::test]
async fn delete_removes_first_record_and_publishes() {
    let session = example_session().await;
    session
        .seed_record("example.com", "www", RecordType::A, "192.0.2.1")
        .await
        .unwrap();
    session
        .seed_record("example.com", "www", RecordType::A, "192.0.2.2")
        .await
        .unwrap();
    let dispatcher = Dispatcher::new(&session);

    dispatcher
        .execute(&command(
            Operation::Delete,
            QueryType::A,
            Some("example.com"),
            Some("www"),
            None,
        ))
        .await
        .unwrap();

    let live = session
        .live_records("example.com", "www.example.com", RecordType::A)
        .await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].value, "192.0.2.2");
    assert_eq!(session.publish_count(), 1);
}

#[tokio::test]
async fn delete_without_record_fails_and_never_publishes() {
    let session = example_session().await;
    session
        .seed_record("example.com", "www", RecordType::Cname, "example.com")
        .await
        .unwrap();
    let dispatcher = Dispatcher::new(&session);

    let err = dispatcher
        .execute(&command(
            Operation::Delete,
            QueryType::A,
            Some("example.com"),
            Some("www"),
            None,
        ))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("no A record at www.example.com"));
    assert_eq!(session.publish_count(), 0);
}

#[tokio::test]
async fn mutation_in_unknown_zone_fails() {
    let session = example_session().await;
    let dispatcher = Dispatcher::new(&session);

    let err = dispatcher
        .execute(&command(
            Operation::Create,
            QueryType::A,
            Some("missing.net"),
            Some("www"),
            Some("192.0.2.1"),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Query);
    assert_eq!(session.publish_count(), 0);
}

#[tokio::test]
async fn failed_publish_is_reported_and_not_rolled_back() {
    let session = example_session().await;
    session.fail_publish(true).await;
    let dispatcher = Dispatcher::new(&session);

    let err = dispatcher
        .execute(&command(
            Operation::Create,
            QueryType::A,
            Some("example.com"),
            Some("www"),
            Some("192.0.2.1"),
        ))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("publish rejected"));
    assert!(session.has_pending_changes("example.com").await);
    assert!(
        session
            .live_records("example.com", "www.example.com", RecordType::A)
            .await
            .is_empty()
    );
}
