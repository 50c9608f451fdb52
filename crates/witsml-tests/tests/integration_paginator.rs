// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Growing-Object Integration Tests
//!
//! - `test_paging_*`: chunk sizes, read counts and ordering
//! - `test_cursor_*`: snapshots, resume and invalidation
//! - `test_cancel_*`: cancellation between and during reads
//! - `test_bounds_*`: materialised read limits

use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use tokio_util::sync::CancellationToken;

use witsml::client::{Deadline, LogChunk, LogCursor, LogRange, LogStream, OptionsIn, WitsmlClient};
use witsml::config::{ClientConfig, PaginationConfig};
use witsml::error::{PaginationError, WitsmlError};
use witsml::types::{LogIndex, StoreMethod};

use witsml_tests::common::{
    init_test_logging, mock_client, CapabilityFixtures, ConfigFixtures, MockWitsmlServer,
    ObjectFixtures,
};

const LOG: &str = "gr-log";

fn store_with_log(rows: usize) -> Arc<MockWitsmlServer> {
    let server = Arc::new(MockWitsmlServer::new(CapabilityFixtures::server(&["1.4.1.1"])));
    server.add_log(ObjectFixtures::depth_log(LOG, rows));
    server
}

fn config_with(pagination: PaginationConfig) -> ClientConfig {
    let mut config = ConfigFixtures::client_config(pagination.max_rows_per_request);
    config.pagination = pagination;
    config
}

async fn drain(stream: &mut LogStream<'_, Arc<MockWitsmlServer>>) -> Vec<LogChunk> {
    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next_chunk().await.unwrap() {
        chunks.push(chunk);
    }
    chunks
}

fn rows_of(chunks: &[LogChunk]) -> Vec<String> {
    chunks.iter().flat_map(|c| c.rows.iter().cloned()).collect()
}

async fn open(client: &WitsmlClient<Arc<MockWitsmlServer>>, deadline: Deadline) -> LogStream<'_, Arc<MockWitsmlServer>> {
    client
        .stream_log(&ObjectFixtures::log_identity(LOG), LogRange::all(), deadline)
        .await
        .unwrap()
}

// =============================================================================
// Paging
// =============================================================================

#[tokio::test]
async fn test_paging_ten_thousand_rows_in_ten_reads() {
    init_test_logging();
    let server = store_with_log(10_000);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let mut stream = open(&client, Deadline::none()).await;
    assert_eq!(stream.row_cap(), 1000);
    let chunks = drain(&mut stream).await;

    assert_eq!(chunks.len(), 10);
    assert!(chunks.iter().all(|c| c.len() == 1000));
    assert_eq!(
        chunks.iter().map(|c| c.sequence).collect::<Vec<_>>(),
        (1..=10).collect::<Vec<_>>()
    );

    let reads = server.data_reads();
    assert_eq!(reads.len(), 10);
    let first = OptionsIn::parse(&reads[0].options).unwrap();
    assert_eq!(first.get("maxReturnNodes"), Some("1000"));
    let second = OptionsIn::parse(&reads[1].options).unwrap();
    assert_eq!(second.get("maxReturnNodes"), Some("1001"));

    let cursor = stream.cursor();
    assert!(cursor.finished);
    assert_eq!(cursor.rows_read, 10_000);
    assert_eq!(cursor.last_index, Some(LogIndex::Depth(9999.0)));

    // Same rows, same order, as one unbounded read.
    let unbounded = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(100_000));
    let mut single = open(&unbounded, Deadline::none()).await;
    let whole = drain(&mut single).await;
    assert_eq!(whole.len(), 1);
    assert_eq!(rows_of(&chunks), rows_of(&whole));
    assert_eq!(rows_of(&whole), ObjectFixtures::depth_log(LOG, 10_000).rows);
}

#[tokio::test]
async fn test_paging_clamped_by_server_max_data_nodes() {
    let server = Arc::new(MockWitsmlServer::new(CapabilityFixtures::with_log_cap(400)));
    server.add_log(ObjectFixtures::depth_log(LOG, 2000));
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let mut stream = open(&client, Deadline::none()).await;
    assert_eq!(stream.row_cap(), 400);
    let chunks = drain(&mut stream).await;

    assert_eq!(chunks.len(), 5);
    assert_eq!(rows_of(&chunks).len(), 2000);
}

#[tokio::test]
async fn test_paging_continues_after_partial_results() {
    let server = store_with_log(1000);
    server.set_server_row_cap(Some(300));
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let mut stream = open(&client, Deadline::none()).await;
    let chunks = drain(&mut stream).await;

    assert!(chunks[0].partial);
    assert_eq!(rows_of(&chunks), ObjectFixtures::depth_log(LOG, 1000).rows);
}

#[tokio::test]
async fn test_paging_bounded_range() {
    let server = store_with_log(1000);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(100));

    let range = LogRange::between(LogIndex::Depth(100.0), LogIndex::Depth(349.0));
    let mut stream = client
        .stream_log(&ObjectFixtures::log_identity(LOG), range, Deadline::none())
        .await
        .unwrap();
    let chunks = drain(&mut stream).await;
    let rows = rows_of(&chunks);

    assert_eq!(rows.len(), 250);
    assert_eq!(chunks[0].first_index, Some(LogIndex::Depth(100.0)));
    assert_eq!(chunks.last().unwrap().last_index, Some(LogIndex::Depth(349.0)));
    assert_eq!(server.data_reads().len(), 3);
}

#[tokio::test]
async fn test_paging_as_futures_stream() {
    let server = store_with_log(2500);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let stream = open(&client, Deadline::none()).await;
    let chunks: Vec<LogChunk> = stream.into_stream().try_collect().await.unwrap();

    assert_eq!(chunks.iter().map(LogChunk::len).collect::<Vec<_>>(), vec![1000, 1000, 500]);
}

#[tokio::test]
async fn test_paging_read_log_materialises_rows() {
    let server = store_with_log(2500);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let log = client
        .read_log(&ObjectFixtures::log_identity(LOG), LogRange::all())
        .await
        .unwrap();

    assert_eq!(log.row_count(), 2500);
    assert_eq!(log.index_curve.as_deref(), Some("DEPTH"));
    assert_eq!(log.curves.len(), 3);
    let data = log.data.unwrap();
    assert_eq!(data.mnemonic_list, vec!["DEPTH", "GR", "ROP"]);
    assert_eq!(data.rows, ObjectFixtures::depth_log(LOG, 2500).rows);
}

#[tokio::test]
async fn test_paging_empty_log() {
    let server = store_with_log(0);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let log = client
        .read_log(&ObjectFixtures::log_identity(LOG), LogRange::all())
        .await
        .unwrap();
    assert_eq!(log.row_count(), 0);
    assert_eq!(server.data_reads().len(), 1);
}

// =============================================================================
// Cursor
// =============================================================================

#[tokio::test]
async fn test_cursor_resume_from_snapshot() {
    let server = store_with_log(10_000);
    let config = ConfigFixtures::client_config(1000);
    let client = mock_client(Arc::clone(&server), &config);

    let mut stream = open(&client, Deadline::none()).await;
    let mut first = Vec::new();
    for _ in 0..3 {
        first.push(stream.next_chunk().await.unwrap().unwrap());
    }
    let snapshot = stream.cursor().to_json().unwrap();
    drop(stream);

    // A different client picks the read up where it stopped.
    let resumed_client = mock_client(Arc::clone(&server), &config);
    let cursor = LogCursor::from_json(&snapshot).unwrap();
    assert_eq!(cursor.rows_read, 3000);
    let mut resumed = resumed_client.resume_log(cursor, Deadline::none()).await.unwrap();
    let rest = drain(&mut resumed).await;

    assert_eq!(rest.len(), 7);
    assert_eq!(rest[0].first_index, Some(LogIndex::Depth(3000.0)));
    assert_eq!(rest[0].sequence, 4);

    let mut all = rows_of(&first);
    all.extend(rows_of(&rest));
    assert_eq!(all, ObjectFixtures::depth_log(LOG, 10_000).rows);
}

#[tokio::test]
async fn test_cursor_invalidated_by_new_curve() {
    init_test_logging();
    let server = store_with_log(3000);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let mut stream = open(&client, Deadline::none()).await;
    stream.next_chunk().await.unwrap().unwrap();

    server.set_data_columns(LOG, &["DEPTH", "GR", "RPM"], &["m", "gAPI", "rpm"]);
    let err = stream.next_chunk().await.unwrap_err();

    assert!(matches!(
        err,
        WitsmlError::Pagination(PaginationError::CursorInvalidated { .. })
    ));
    // The stream is over after the failure.
    assert!(stream.next_chunk().await.unwrap().is_none());
}

#[tokio::test]
async fn test_cursor_invalidated_by_unit_change() {
    let server = store_with_log(3000);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let mut stream = open(&client, Deadline::none()).await;
    stream.next_chunk().await.unwrap().unwrap();

    server.set_data_columns(LOG, &["DEPTH", "GR", "ROP"], &["ft", "gAPI", "m/h"]);
    let err = stream.next_chunk().await.unwrap_err();
    assert!(err.to_string().contains("unit of 'DEPTH' changed"));
}

#[tokio::test]
async fn test_cursor_invalidated_when_columns_drop() {
    let server = store_with_log(3000);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let mut stream = open(&client, Deadline::none()).await;
    stream.next_chunk().await.unwrap().unwrap();

    server.set_data_columns(LOG, &["DEPTH", "GR"], &["m", "gAPI"]);
    let err = stream.next_chunk().await.unwrap_err();
    assert!(matches!(
        err,
        WitsmlError::Pagination(PaginationError::CursorInvalidated { .. })
    ));
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_between_chunks_then_resume() {
    let server = store_with_log(3000);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let token = CancellationToken::new();
    let mut stream = open(&client, Deadline::none().with_cancel(token.clone())).await;
    stream.next_chunk().await.unwrap().unwrap();

    token.cancel();
    assert!(stream.next_chunk().await.unwrap().is_none());
    assert_eq!(server.data_reads().len(), 1);

    let cursor = stream.cursor();
    assert_eq!(cursor.rows_read, 1000);
    assert!(!cursor.finished);

    let mut resumed = client.resume_log(cursor, Deadline::none()).await.unwrap();
    let rest = drain(&mut resumed).await;
    assert_eq!(rows_of(&rest).len(), 2000);
}

#[tokio::test]
async fn test_cancel_during_read_keeps_cursor() {
    let server = store_with_log(3000);
    let client = mock_client(Arc::clone(&server), &ConfigFixtures::client_config(1000));

    let token = CancellationToken::new();
    let mut stream = open(&client, Deadline::none().with_cancel(token.clone())).await;

    server.set_delay(Duration::from_millis(500));
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    assert!(stream.next_chunk().await.unwrap().is_none());
    canceller.await.unwrap();

    let cursor = stream.cursor();
    assert_eq!(cursor.rows_read, 0);
    assert_eq!(cursor.last_index, None);
    assert_eq!(
        client.metrics().active_requests("mock-store", "WMLS_GetFromStore", "log"),
        0
    );
}

// =============================================================================
// Bounds
// =============================================================================

#[tokio::test]
async fn test_bounds_row_limit() {
    let server = store_with_log(10_000);
    let client = mock_client(
        Arc::clone(&server),
        &config_with(PaginationConfig {
            max_rows_per_request: 1000,
            max_total_rows: 5000,
            ..Default::default()
        }),
    );

    let err = client
        .read_log(&ObjectFixtures::log_identity(LOG), LogRange::all())
        .await
        .unwrap_err();

    match err {
        WitsmlError::Pagination(PaginationError::ResultTooLarge { limit_name, limit, .. }) => {
            assert_eq!(limit_name, "rows");
            assert_eq!(limit, 5000);
        }
        other => panic!("unexpected error: {other}"),
    }
    // Reading stops at the first chunk past the bound.
    assert_eq!(server.data_reads().len(), 6);
}

#[tokio::test]
async fn test_bounds_byte_limit() {
    let server = store_with_log(10_000);
    let client = mock_client(
        Arc::clone(&server),
        &config_with(PaginationConfig {
            max_rows_per_request: 1000,
            max_total_bytes: 4096,
            ..Default::default()
        }),
    );

    let err = client
        .read_log(&ObjectFixtures::log_identity(LOG), LogRange::all())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WitsmlError::Pagination(PaginationError::ResultTooLarge { limit_name: "bytes", .. })
    ));
    assert_eq!(server.call_count(StoreMethod::GetCap), 1);
}
