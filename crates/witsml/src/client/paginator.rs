// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Growing-object pagination.
//!
//! ```text
//! header-only read ──► LogCursor { last_index: None, fingerprint }
//!                              │
//!        ┌─────────────────────┘
//!        ▼
//!   data-only read [last_index .. end], maxReturnNodes = cap (first) / cap+1
//!        │  drop rows not strictly after last_index
//!        │  check fingerprint
//!        ▼
//!   LogChunk ──► cursor.last_index = last row
//!        │
//!        └─ finished when: rows < requested (and not partial)
//!                          last_index reached the range end
//!                          no new rows
//! ```
//!
//! A [`Paginator`] is the pure state machine; a [`LogStream`] drives it
//! through an executor. Reads are strictly sequential: the stream hands out
//! chunks through `&mut self`.

use std::time::Duration;

use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};

use super::executor::{Deadline, Executor, ResultEnvelope};
use super::request::{IndexWindow, OptionsIn, QueryDescriptor, QueryTemplate, RequestBuilder};
use super::transport::{WireRequest, WitsmlTransport};
use crate::codec;
use crate::config::PaginationConfig;
use crate::error::{CodecError, PaginationError, WitsmlError, WitsmlResult};
use crate::types::{
    Log, LogData, LogIndex, LogIndexDirection, LogIndexType, ObjectIdentity, ObjectType,
    ReturnElements,
};

// =============================================================================
// Range and fingerprint
// =============================================================================

/// Requested index range. Open ends fall back to the header range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRange {
    /// Inclusive start.
    pub start: Option<LogIndex>,
    /// Inclusive end.
    pub end: Option<LogIndex>,
}

impl LogRange {
    /// The whole log.
    pub fn all() -> Self {
        Self::default()
    }

    /// A bounded range.
    pub fn between(start: LogIndex, end: LogIndex) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Structure of a log that must stay stable while paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureFingerprint {
    /// Index curve mnemonic.
    pub index_curve: String,
    /// Column mnemonics.
    pub mnemonics: Vec<String>,
    /// Column units (empty string when absent).
    pub units: Vec<String>,
}

impl StructureFingerprint {
    /// Fingerprint of a log header.
    pub fn from_header(log: &Log) -> Self {
        let index_curve = log
            .index_curve
            .clone()
            .or_else(|| log.curves.first().map(|c| c.mnemonic.clone()))
            .unwrap_or_default();
        Self {
            index_curve,
            mnemonics: log.curves.iter().map(|c| c.mnemonic.clone()).collect(),
            units: log
                .curves
                .iter()
                .map(|c| c.unit.clone().unwrap_or_default())
                .collect(),
        }
    }

    /// Fingerprint of a data chunk.
    fn from_data(index_curve: &str, data: &LogData) -> Self {
        Self {
            index_curve: index_curve.to_string(),
            mnemonics: data.mnemonic_list.clone(),
            units: data.unit_list.clone(),
        }
    }

    /// Unit of a mnemonic.
    fn unit_of(&self, mnemonic: &str) -> Option<&str> {
        self.mnemonics
            .iter()
            .position(|m| m == mnemonic)
            .and_then(|i| self.units.get(i))
            .map(String::as_str)
    }
}

// =============================================================================
// LogCursor
// =============================================================================

/// Serializable position of a log read.
///
/// A snapshot taken between chunks resumes the read where it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogCursor {
    /// Log identity.
    pub identity: ObjectIdentity,
    /// Index type.
    pub index_type: LogIndexType,
    /// Index direction.
    pub direction: LogIndexDirection,
    /// Unit of depth indexes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_uom: Option<String>,
    /// First index to read when nothing was read yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<LogIndex>,
    /// Last index to read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<LogIndex>,
    /// Index of the last row delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_index: Option<LogIndex>,
    /// Header structure.
    pub fingerprint: StructureFingerprint,
    /// Structure of the first data chunk, pinned for the rest of the read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_fingerprint: Option<StructureFingerprint>,
    /// Rows delivered so far.
    pub rows_read: u64,
    /// Data reads made so far.
    pub reads: u64,
    /// No more rows to read.
    pub finished: bool,
}

impl LogCursor {
    /// Creates a cursor from a log header and the requested range.
    pub fn from_header(log: &Log, range: LogRange) -> WitsmlResult<Self> {
        let (header_start, header_end) = log.index_range()?;
        Ok(Self {
            identity: log.identity.clone(),
            index_type: log.index_type(),
            direction: log.direction(),
            index_uom: log.index_uom().map(str::to_string),
            start: range.start.or(header_start),
            end: range.end.or(header_end),
            last_index: None,
            fingerprint: StructureFingerprint::from_header(log),
            data_fingerprint: None,
            rows_read: 0,
            reads: 0,
            finished: false,
        })
    }

    /// Remaining depth span, for depth-indexed logs with a known end.
    pub fn remaining_span(&self) -> Option<f64> {
        match (self.last_index.or(self.start), self.end) {
            (Some(LogIndex::Depth(from)), Some(LogIndex::Depth(to))) => Some((to - from).abs()),
            _ => None,
        }
    }

    /// Serializes the cursor for later [`resume`](crate::WitsmlClient::resume_log).
    pub fn to_json(&self) -> WitsmlResult<String> {
        serde_json::to_string(self).map_err(|e| CodecError::encode(e).into())
    }

    /// Restores a cursor from [`to_json`](Self::to_json) output.
    pub fn from_json(json: &str) -> WitsmlResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CodecError::malformed("cursor", e.to_string()).into())
    }

    fn identity_label(&self) -> String {
        self.identity.to_string()
    }

    fn invalidated(&self, detail: impl Into<String>) -> WitsmlError {
        PaginationError::CursorInvalidated {
            identity: self.identity_label(),
            detail: detail.into(),
        }
        .into()
    }
}

// =============================================================================
// LogChunk
// =============================================================================

/// One page of log rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LogChunk {
    /// 1-based read number.
    pub sequence: u64,
    /// Column mnemonics.
    pub mnemonics: Vec<String>,
    /// Column units.
    pub units: Vec<String>,
    /// New rows, in reading order.
    pub rows: Vec<String>,
    /// Index of the first new row.
    pub first_index: Option<LogIndex>,
    /// Index of the last new row.
    pub last_index: Option<LogIndex>,
    /// The server reported a truncated result (code 2).
    pub partial: bool,
}

impl LogChunk {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` without rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Size of the rows in bytes.
    pub fn byte_size(&self) -> usize {
        self.rows.iter().map(String::len).sum()
    }
}

// =============================================================================
// Paginator
// =============================================================================

/// Cursor state machine for one log read.
#[derive(Debug, Clone)]
pub struct Paginator {
    cursor: LogCursor,
    row_cap: u32,
}

impl Paginator {
    /// Creates a paginator. A zero cap is raised to one row.
    pub fn new(cursor: LogCursor, row_cap: u32) -> Self {
        Self {
            cursor,
            row_cap: row_cap.max(1),
        }
    }

    /// Effective cap: the configured cap clamped to the server's
    /// `maxDataNodes` when advertised.
    pub fn effective_cap(configured: u32, server_max: Option<u32>) -> u32 {
        match server_max {
            Some(max) if max > 0 => configured.min(max),
            _ => configured,
        }
        .max(1)
    }

    /// Current cursor.
    pub fn cursor(&self) -> &LogCursor {
        &self.cursor
    }

    /// Row cap.
    pub fn row_cap(&self) -> u32 {
        self.row_cap
    }

    /// Returns `true` once the read is complete.
    pub fn is_finished(&self) -> bool {
        self.cursor.finished
    }

    /// Rows asked for in the next read. Restarts ask for one extra row to
    /// cover the overlapping last row.
    pub fn requested_rows(&self) -> u32 {
        if self.cursor.last_index.is_some() {
            self.row_cap.saturating_add(1)
        } else {
            self.row_cap
        }
    }

    /// Descriptor of the next data read.
    pub fn next_descriptor(&self) -> QueryDescriptor {
        let options = OptionsIn::new()
            .return_elements(ReturnElements::DataOnly)
            .max_return_nodes(self.requested_rows());
        QueryDescriptor::new(
            ObjectType::Log,
            QueryTemplate::new(self.cursor.identity.clone()),
            options,
        )
        .with_window(IndexWindow {
            start: self.cursor.last_index.or(self.cursor.start),
            end: self.cursor.end,
            uom: self.cursor.index_uom.clone(),
        })
    }

    /// Applies the result of a data read and advances the cursor.
    pub fn accept(&mut self, envelope: &ResultEnvelope) -> WitsmlResult<LogChunk> {
        let requested = self.requested_rows() as usize;
        let partial = envelope.is_partial();
        self.cursor.reads += 1;

        let logs: Vec<Log> = codec::decode_collection(envelope.xml_or_empty())?;
        let data = logs.into_iter().next().and_then(|log| log.data).unwrap_or_default();
        let received = data.rows.len();

        if received > 0 {
            self.check_structure(&data)?;
        }

        let direction = self.cursor.direction;
        let mut rows = Vec::with_capacity(received);
        let mut first_index = None;
        let mut last_index = None;
        for row in data.rows {
            let index = LogIndex::parse(LogData::row_index(&row), self.cursor.index_type)?;
            if let Some(previous) = self.cursor.last_index {
                if !index.is_after(&previous, direction) {
                    continue;
                }
            }
            if let Some(end) = self.cursor.end {
                if index.is_after(&end, direction) {
                    break;
                }
            }
            if first_index.is_none() {
                first_index = Some(index);
            }
            last_index = Some(index);
            rows.push(row);
        }

        if let Some(index) = last_index {
            self.cursor.last_index = Some(index);
        }
        self.cursor.rows_read += rows.len() as u64;

        let reached_end = match (self.cursor.last_index, self.cursor.end) {
            (Some(last), Some(end)) => !end.is_after(&last, direction),
            _ => false,
        };
        let short = received < requested && !partial;
        if short || reached_end || rows.is_empty() {
            self.cursor.finished = true;
        }

        tracing::debug!(
            identity = %self.cursor.identity,
            read = self.cursor.reads,
            requested,
            received,
            new_rows = rows.len(),
            partial,
            finished = self.cursor.finished,
            "Log chunk read"
        );

        Ok(LogChunk {
            sequence: self.cursor.reads,
            mnemonics: data.mnemonic_list,
            units: data.unit_list,
            rows,
            first_index,
            last_index,
            partial,
        })
    }

    fn check_structure(&mut self, data: &LogData) -> WitsmlResult<()> {
        let header = &self.cursor.fingerprint;
        let chunk = StructureFingerprint::from_data(&header.index_curve, data);

        if !header.index_curve.is_empty()
            && chunk.mnemonics.first().map(String::as_str) != Some(header.index_curve.as_str())
        {
            return Err(self.cursor.invalidated(format!(
                "index curve '{}' is not the first column",
                header.index_curve
            )));
        }
        for (i, mnemonic) in chunk.mnemonics.iter().enumerate() {
            let Some(unit) = header.unit_of(mnemonic) else {
                return Err(self.cursor.invalidated(format!("unknown curve '{}'", mnemonic)));
            };
            if let Some(chunk_unit) = chunk.units.get(i) {
                if !chunk_unit.is_empty() && !unit.is_empty() && chunk_unit != unit {
                    return Err(self.cursor.invalidated(format!(
                        "unit of '{}' changed from '{}' to '{}'",
                        mnemonic, unit, chunk_unit
                    )));
                }
            }
        }

        match &self.cursor.data_fingerprint {
            Some(pinned) if *pinned != chunk => Err(self.cursor.invalidated(format!(
                "columns changed from [{}] to [{}]",
                pinned.mnemonics.join(","),
                chunk.mnemonics.join(",")
            ))),
            Some(_) => Ok(()),
            None => {
                self.cursor.data_fingerprint = Some(chunk);
                Ok(())
            }
        }
    }
}

// =============================================================================
// LogStream
// =============================================================================

/// Lazily read log chunks.
///
/// Not `Clone`: one cursor, one reader.
pub struct LogStream<'a, T: WitsmlTransport> {
    executor: &'a Executor<T>,
    builder: &'a RequestBuilder,
    version: String,
    capabilities_in: Option<String>,
    deadline: Deadline,
    request_timeout: Duration,
    paginator: Paginator,
    done: bool,
}

impl<'a, T: WitsmlTransport> LogStream<'a, T> {
    pub(crate) fn new(
        executor: &'a Executor<T>,
        builder: &'a RequestBuilder,
        version: String,
        capabilities_in: Option<String>,
        deadline: Deadline,
        request_timeout: Duration,
        paginator: Paginator,
    ) -> Self {
        let done = paginator.is_finished();
        Self {
            executor,
            builder,
            version,
            capabilities_in,
            deadline,
            request_timeout,
            paginator,
            done,
        }
    }

    /// Snapshot of the cursor for a later resume.
    pub fn cursor(&self) -> LogCursor {
        self.paginator.cursor().clone()
    }

    /// Row cap per read.
    pub fn row_cap(&self) -> u32 {
        self.paginator.row_cap()
    }

    /// Reads the next chunk.
    ///
    /// Returns `Ok(None)` when the log is exhausted or the deadline's token
    /// was cancelled. A cancelled read leaves the cursor where it was. Each
    /// read is bounded by the request timeout and the stream deadline.
    pub async fn next_chunk(&mut self) -> WitsmlResult<Option<LogChunk>> {
        if self.done || self.paginator.is_finished() {
            self.done = true;
            return Ok(None);
        }
        if self.deadline.is_cancelled() {
            self.done = true;
            return Ok(None);
        }

        let descriptor = self.paginator.next_descriptor();
        let request: WireRequest = self
            .builder
            .build(&descriptor, &self.version)?
            .with_capabilities(self.capabilities_in.clone());

        let deadline = self.deadline.narrowed(self.request_timeout);
        let envelope = match self.executor.execute(&request, &deadline).await {
            Ok(envelope) => envelope,
            Err(error) if error.is_cancelled() => {
                self.done = true;
                return Ok(None);
            }
            Err(error) => {
                self.done = true;
                return Err(error);
            }
        };

        match self.paginator.accept(&envelope) {
            Ok(chunk) if chunk.is_empty() => {
                self.done = true;
                Ok(None)
            }
            Ok(chunk) => Ok(Some(chunk)),
            Err(error) => {
                self.done = true;
                Err(error)
            }
        }
    }

    /// Converts into a `futures` stream of chunks. The stream ends after the
    /// first error.
    pub fn into_stream(self) -> impl Stream<Item = WitsmlResult<LogChunk>> + 'a {
        stream::unfold(self, |mut reader| async move {
            match reader.next_chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), reader)),
                Ok(None) => None,
                Err(error) => Some((Err(error), reader)),
            }
        })
    }

    /// Reads every remaining chunk into `log.data`, bounded by the
    /// configured totals.
    pub async fn collect_into(mut self, mut log: Log, limits: &PaginationConfig) -> WitsmlResult<Log> {
        let identity = self.paginator.cursor().identity_label();
        let mut data = LogData::default();
        let mut bytes = 0u64;

        while let Some(chunk) = self.next_chunk().await? {
            if data.mnemonic_list.is_empty() {
                data.mnemonic_list = chunk.mnemonics.clone();
                data.unit_list = chunk.units.clone();
            }
            bytes += chunk.byte_size() as u64;
            let rows = (data.rows.len() + chunk.len()) as u64;
            if rows > limits.max_total_rows {
                return Err(PaginationError::ResultTooLarge {
                    identity,
                    limit_name: "rows",
                    limit: limits.max_total_rows,
                }
                .into());
            }
            if bytes > limits.max_total_bytes {
                return Err(PaginationError::ResultTooLarge {
                    identity,
                    limit_name: "bytes",
                    limit: limits.max_total_bytes,
                }
                .into());
            }
            data.rows.extend(chunk.rows);
        }

        if self.deadline.is_cancelled() {
            return Err(WitsmlError::cancelled("read_log"));
        }
        log.data = Some(data);
        Ok(log)
    }
}

impl<T: WitsmlTransport> std::fmt::Debug for LogStream<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream")
            .field("cursor", self.paginator.cursor())
            .field("row_cap", &self.paginator.row_cap())
            .field("done", &self.done)
            .finish()
    }
}

/// Decodes the single log of a header-only result.
pub fn decode_header(envelope: &ResultEnvelope, identity: &ObjectIdentity) -> WitsmlResult<Log> {
    let logs: Vec<Log> = codec::decode_collection(envelope.xml_or_empty())?;
    logs.into_iter().next().ok_or_else(|| {
        CodecError::malformed("logs", format!("no log matched {}", identity)).into()
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogCurveInfo, Measure, StoreMethod};

    fn header() -> Log {
        Log {
            identity: ObjectIdentity::child("w1", "wb1", "l1"),
            index_type: Some(LogIndexType::MeasuredDepth),
            direction: Some(LogIndexDirection::Increasing),
            index_curve: Some("DEPTH".into()),
            start_index: Some(Measure::new(0.0, "m")),
            end_index: Some(Measure::new(9.0, "m")),
            curves: vec![
                LogCurveInfo::new("DEPTH", Some("m")),
                LogCurveInfo::new("GR", Some("gAPI")),
            ],
            ..Default::default()
        }
    }

    fn envelope(rows: std::ops::RangeInclusive<u32>, code: i32) -> ResultEnvelope {
        let data: String = rows
            .map(|i| format!("<data>{},{}</data>", i, i * 10))
            .collect();
        let xml = format!(
            concat!(
                r#"<logs xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1">"#,
                r#"<log uidWell="w1" uidWellbore="wb1" uid="l1"><logData>"#,
                "<mnemonicList>DEPTH,GR</mnemonicList><unitList>m,gAPI</unitList>{}",
                "</logData></log></logs>"
            ),
            data
        );
        ResultEnvelope {
            method: StoreMethod::GetFromStore,
            object_type: Some(ObjectType::Log),
            result_code: code,
            xml: Some(xml),
            message: None,
            attempts: 1,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_effective_cap() {
        assert_eq!(Paginator::effective_cap(1000, Some(500)), 500);
        assert_eq!(Paginator::effective_cap(1000, None), 1000);
        assert_eq!(Paginator::effective_cap(0, None), 1);
    }

    #[test]
    fn test_restart_drops_overlap() {
        let cursor = LogCursor::from_header(&header(), LogRange::all()).unwrap();
        let mut paginator = Paginator::new(cursor, 4);

        assert_eq!(paginator.requested_rows(), 4);
        let first = paginator.accept(&envelope(0..=3, 1)).unwrap();
        assert_eq!(first.rows.len(), 4);
        assert!(!paginator.is_finished());

        assert_eq!(paginator.requested_rows(), 5);
        let window = paginator.next_descriptor().window.unwrap();
        assert_eq!(window.start, Some(LogIndex::Depth(3.0)));

        let second = paginator.accept(&envelope(3..=7, 1)).unwrap();
        assert_eq!(second.first_index, Some(LogIndex::Depth(4.0)));
        assert_eq!(second.rows.len(), 4);

        let third = paginator.accept(&envelope(7..=9, 1)).unwrap();
        assert_eq!(third.rows.len(), 2);
        assert!(paginator.is_finished());
        assert_eq!(paginator.cursor().rows_read, 10);
    }

    #[test]
    fn test_partial_result_does_not_stop() {
        let mut header = header();
        header.end_index = None;
        let cursor = LogCursor::from_header(&header, LogRange::all()).unwrap();
        let mut paginator = Paginator::new(cursor, 4);
        let chunk = paginator.accept(&envelope(0..=1, 2)).unwrap();
        assert!(chunk.partial);
        assert!(!paginator.is_finished());
        paginator.accept(&envelope(1..=2, 1)).unwrap();
        assert!(paginator.is_finished());
    }

    #[test]
    fn test_unknown_curve_invalidates_cursor() {
        let mut log = header();
        log.curves.pop();
        let cursor = LogCursor::from_header(&log, LogRange::all()).unwrap();
        let mut paginator = Paginator::new(cursor, 4);
        let err = paginator.accept(&envelope(0..=3, 1)).unwrap_err();
        assert!(matches!(
            err,
            WitsmlError::Pagination(PaginationError::CursorInvalidated { .. })
        ));
    }

    #[test]
    fn test_cursor_serde_roundtrip() {
        let cursor = LogCursor::from_header(&header(), LogRange::all()).unwrap();
        let mut paginator = Paginator::new(cursor, 4);
        paginator.accept(&envelope(0..=3, 1)).unwrap();
        let json = paginator.cursor().to_json().unwrap();
        let back = LogCursor::from_json(&json).unwrap();
        assert_eq!(&back, paginator.cursor());
        assert_eq!(back.remaining_span(), Some(6.0));
    }
}
