// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Client Integration Tests
//!
//! - `test_negotiation_*`: capability exchange and version selection
//! - `test_retry_*`: retry of reads, single-shot mutations
//! - `test_store_*`: queries and mutations end to end
//! - `test_deadline_*`: timeouts and cancellation

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use witsml::client::{
    Deadline, NegotiationState, OptionsIn, QueryDescriptor, QueryTemplate,
};
use witsml::error::WitsmlError;
use witsml::types::{ObjectIdentity, ObjectType, StoreMethod, Well};

use witsml_tests::common::{
    init_test_logging, mock_client, CapabilityFixtures, ConfigFixtures, MockFailure,
    MockWitsmlServer, ObjectFixtures,
};

const HOST: &str = "mock-store";

fn store(versions: &[&str]) -> Arc<MockWitsmlServer> {
    let server = Arc::new(MockWitsmlServer::new(CapabilityFixtures::server(versions)));
    server.add_well(ObjectFixtures::well("w-1"));
    server.add_well(ObjectFixtures::well("w-2"));
    server
}

fn well_names() -> QueryTemplate {
    QueryTemplate::all().request_all(["name", "field"])
}

// =============================================================================
// Negotiation
// =============================================================================

#[tokio::test]
async fn test_negotiation_selects_highest_common_version() {
    init_test_logging();
    let server = store(&["1.3.1.1", "1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let caps = client.capabilities().await.unwrap();
    assert_eq!(caps.version(), "1.4.1.1");
    assert_eq!(client.negotiation_state().name(), "negotiated");

    let get_cap = &server.requests_for(StoreMethod::GetCap)[0];
    assert_eq!(get_cap.options, "dataVersion=1.4.1.1");
    assert!(get_cap.capabilities.as_deref().unwrap().contains("<capClients"));

    let wells: Vec<Well> = client.get_objects(well_names(), OptionsIn::new()).await.unwrap();
    assert_eq!(wells.len(), 2);

    let query = server.requests_for(StoreMethod::GetFromStore)[0].query.clone().unwrap();
    assert!(query.contains(r#"version="1.4.1.1""#));
}

#[tokio::test]
async fn test_negotiation_falls_back_to_older_version() {
    let server = store(&["1.3.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let caps = client.capabilities().await.unwrap();
    assert_eq!(caps.version(), "1.3.1.1");
}

#[tokio::test]
async fn test_negotiation_rejects_incompatible_server() {
    init_test_logging();
    let server = store(&["2.0"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let err = client.capabilities().await.unwrap_err();
    assert!(err.is_incompatible_server());
    assert!(matches!(client.negotiation_state(), NegotiationState::Failed { .. }));

    // Later calls fail without another exchange and never reach the store.
    let err = client
        .get_objects::<Well>(well_names(), OptionsIn::new())
        .await
        .unwrap_err();
    assert!(err.is_incompatible_server());
    assert_eq!(server.call_count(StoreMethod::GetCap), 1);
    assert_eq!(server.call_count(StoreMethod::GetFromStore), 0);
}

#[tokio::test]
async fn test_negotiation_shared_by_concurrent_callers() {
    let server = store(&["1.4.1.1"]);
    server.set_delay(Duration::from_millis(30));
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let results = join_all((0..8).map(|_| client.capabilities())).await;
    for result in &results {
        assert_eq!(result.as_ref().unwrap().version(), "1.4.1.1");
    }
    assert_eq!(server.call_count(StoreMethod::GetCap), 1);
}

#[tokio::test]
async fn test_negotiation_retries_without_data_version() {
    let server = store(&["1.4.1.1"]);
    server.fail_next(
        StoreMethod::GetCap,
        1,
        MockFailure::Rejected(-424, "dataVersion not supported".into()),
    );
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    client.capabilities().await.unwrap();

    let calls = server.requests_for(StoreMethod::GetCap);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].options, "");
}

#[tokio::test]
async fn test_negotiation_failure_is_not_cached() {
    let server = store(&["1.4.1.1"]);
    server.fail_next(StoreMethod::GetCap, 1, MockFailure::Fault("starting".into()));
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    assert!(client.capabilities().await.is_err());
    assert_eq!(client.negotiation_state(), NegotiationState::Unnegotiated);
    assert!(client.capabilities().await.is_ok());
    assert_eq!(server.call_count(StoreMethod::GetCap), 2);
}

#[tokio::test]
async fn test_negotiation_failure_shared_by_waiting_callers() {
    let server = store(&["1.4.1.1"]);
    server.set_delay(Duration::from_millis(30));
    server.fail_next(StoreMethod::GetCap, 1, MockFailure::Fault("starting".into()));
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let results = join_all((0..3).map(|_| client.capabilities())).await;
    for result in &results {
        assert!(matches!(result, Err(WitsmlError::Transport(_))));
    }
    assert_eq!(server.call_count(StoreMethod::GetCap), 1);

    // The next caller negotiates afresh.
    assert_eq!(client.capabilities().await.unwrap().version(), "1.4.1.1");
    assert_eq!(server.call_count(StoreMethod::GetCap), 2);
}

// =============================================================================
// Retry
// =============================================================================

#[tokio::test]
async fn test_retry_read_recovers_after_transient_failures() {
    init_test_logging();
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));
    client.capabilities().await.unwrap();

    server.fail_next(StoreMethod::GetFromStore, 2, MockFailure::ConnectionReset);
    let envelope = client
        .query(ObjectType::Well, well_names(), OptionsIn::new())
        .await
        .unwrap();

    assert_eq!(envelope.attempts, 3);
    assert_eq!(server.call_count(StoreMethod::GetFromStore), 3);

    let metrics = client.metrics();
    assert_eq!(metrics.retry_count(HOST, "WMLS_GetFromStore"), 2);
    assert_eq!(metrics.active_requests(HOST, "WMLS_GetFromStore", "well"), 0);
    assert_eq!(metrics.request_count(HOST, "WMLS_GetFromStore", "well", "1"), 1);
    assert_eq!(client.stats().retries(), 2);
}

#[tokio::test]
async fn test_retry_gives_up_after_max_retries() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));
    client.capabilities().await.unwrap();

    server.fail_next(StoreMethod::GetFromStore, 10, MockFailure::ConnectionReset);
    let err = client
        .query(ObjectType::Well, well_names(), OptionsIn::new())
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    // One attempt plus three retries.
    assert_eq!(server.call_count(StoreMethod::GetFromStore), 4);
    assert_eq!(client.metrics().active_requests(HOST, "WMLS_GetFromStore", "well"), 0);
}

#[tokio::test]
async fn test_retry_skips_permanent_failures() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));
    client.capabilities().await.unwrap();

    server.fail_next(StoreMethod::GetFromStore, 1, MockFailure::Fault("bad request".into()));
    assert!(client.query(ObjectType::Well, well_names(), OptionsIn::new()).await.is_err());
    assert_eq!(server.call_count(StoreMethod::GetFromStore), 1);
}

#[tokio::test]
async fn test_retry_never_applies_to_mutations() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));
    client.capabilities().await.unwrap();

    server.fail_next(StoreMethod::AddToStore, 1, MockFailure::ConnectionReset);
    let err = client
        .add_to_store(&[ObjectFixtures::well("w-3")])
        .await
        .unwrap_err();

    assert!(matches!(err, WitsmlError::Transport(_)));
    assert_eq!(server.call_count(StoreMethod::AddToStore), 1);
    assert_eq!(client.metrics().retry_count(HOST, "WMLS_AddToStore"), 0);
    assert_eq!(client.stats().retries(), 0);
}

// =============================================================================
// Store calls
// =============================================================================

#[tokio::test]
async fn test_store_add_then_query() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let envelope = client.add_to_store(&[ObjectFixtures::well("w-3")]).await.unwrap();
    assert_eq!(envelope.result_code, 1);

    let sent = server.requests_for(StoreMethod::AddToStore)[0].clone();
    assert_eq!(sent.object_type, Some(ObjectType::Well));
    assert!(sent.query.unwrap().contains(r#"<well uid="w-3">"#));

    let wells: Vec<Well> = client
        .get_objects(QueryTemplate::new(ObjectIdentity::well("w-3")).request("name"), OptionsIn::new())
        .await
        .unwrap();
    assert_eq!(wells.len(), 1);
    assert_eq!(wells[0].name.as_deref(), Some("Well w-3"));
}

#[tokio::test]
async fn test_store_empty_mutation_is_rejected_locally() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let empty: [Well; 0] = [];
    assert!(client.update_in_store(&empty).await.is_err());
    assert_eq!(server.call_count(StoreMethod::UpdateInStore), 0);
}

#[tokio::test]
async fn test_store_delete_sends_identity() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    client
        .delete_from_store(ObjectType::Well, ObjectIdentity::well("w-2"), OptionsIn::new())
        .await
        .unwrap();

    let sent = server.requests_for(StoreMethod::DeleteFromStore)[0].clone();
    assert!(sent.query.unwrap().contains(r#"uid="w-2""#));
}

#[tokio::test]
async fn test_store_rejection_carries_result_code() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));
    client.capabilities().await.unwrap();

    server.fail_next(
        StoreMethod::GetFromStore,
        1,
        MockFailure::Rejected(-401, "missing plural root".into()),
    );
    let err = client
        .query(ObjectType::Well, well_names(), OptionsIn::new())
        .await
        .unwrap_err();

    assert_eq!(err.result_code(), Some(-401));
    assert_eq!(server.call_count(StoreMethod::GetFromStore), 1);
    assert_eq!(
        client.metrics().request_count(HOST, "WMLS_GetFromStore", "well", "-401"),
        1
    );

    let stats = client.stats().snapshot();
    assert_eq!(stats.succeeded(), 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.total(), 2);
}

#[tokio::test]
async fn test_store_unknown_option_fails_before_sending() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let options = OptionsIn::new().with("vendorTurbo", "true");
    let err = client
        .query(ObjectType::Well, well_names(), options)
        .await
        .unwrap_err();

    assert!(matches!(err, WitsmlError::Request(_)));
    assert_eq!(server.call_count(StoreMethod::GetFromStore), 0);
}

#[tokio::test]
async fn test_store_version_and_base_message() {
    let server = store(&["1.3.1.1", "1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    assert_eq!(client.server_version().await.unwrap(), vec!["1.3.1.1", "1.4.1.1"]);
    assert_eq!(client.base_message(-401).await.unwrap(), "Base message -401");
}

// =============================================================================
// Deadlines
// =============================================================================

#[tokio::test]
async fn test_deadline_timeout() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000))
        .with_retry(witsml::client::RetryConfig::no_retry());
    client.capabilities().await.unwrap();

    server.set_delay(Duration::from_millis(300));
    let descriptor = QueryDescriptor::new(ObjectType::Well, well_names(), OptionsIn::new());
    let err = client
        .query_with(&descriptor, &Deadline::after(Duration::from_millis(20)))
        .await
        .unwrap_err();

    assert!(matches!(err, WitsmlError::Timeout(_)));
    assert_eq!(client.metrics().active_requests(HOST, "WMLS_GetFromStore", "well"), 0);
}

#[tokio::test]
async fn test_deadline_cancellation() {
    let server = store(&["1.4.1.1"]);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));
    client.capabilities().await.unwrap();

    server.set_delay(Duration::from_millis(500));
    let token = CancellationToken::new();
    let deadline = Deadline::none().with_cancel(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let descriptor = QueryDescriptor::new(ObjectType::Well, well_names(), OptionsIn::new());
    let err = client.query_with(&descriptor, &deadline).await.unwrap_err();
    canceller.await.unwrap();

    assert!(err.is_cancelled());
    assert_eq!(client.metrics().active_requests(HOST, "WMLS_GetFromStore", "well"), 0);
}
