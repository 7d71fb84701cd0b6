//! Audit sink contract and the in-memory implementation.

use std::collections::VecDeque;

use parking_lot::Mutex;
use thiserror::Error;

use crate::audit::record::{LogEntry, ScanRecord};

/// Storage failure. Never surfaces to a scan caller.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit storage encoding failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Append-only store of scan records.
///
/// Implementations assign strictly increasing ids and return records newest
/// first. Calls may block; async callers go through `spawn_blocking`.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: ScanRecord) -> Result<LogEntry, AuditError>;

    fn recent(&self, limit: usize) -> Result<Vec<LogEntry>, AuditError>;
}

/// Bounded, newest-first entry list shared by the sinks.
#[derive(Debug)]
pub(crate) struct EntryBuffer {
    entries: VecDeque<LogEntry>,
    next_id: u64,
    capacity: usize,
}

impl EntryBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self::from_entries(Vec::new(), capacity)
    }

    /// Rebuild from stored entries in any order. Ids continue after the highest.
    pub(crate) fn from_entries(mut entries: Vec<LogEntry>, capacity: usize) -> Self {
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        let next_id = entries.first().map_or(1, |newest| newest.id + 1);
        entries.truncate(capacity);
        Self {
            entries: entries.into(),
            next_id,
            capacity,
        }
    }

    /// The entry `record` would become, without storing it.
    pub(crate) fn stage(&self, record: ScanRecord) -> LogEntry {
        LogEntry {
            id: self.next_id,
            record,
        }
    }

    /// Retained entries as they would be after committing `staged`.
    pub(crate) fn preview<'a>(&'a self, staged: &'a LogEntry) -> Vec<&'a LogEntry> {
        std::iter::once(staged)
            .chain(self.entries.iter())
            .take(self.capacity)
            .collect()
    }

    pub(crate) fn commit(&mut self, entry: LogEntry) {
        self.next_id = entry.id + 1;
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub(crate) fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Process-memory sink. Records are lost on restart.
#[derive(Debug)]
pub struct MemorySink {
    buffer: Mutex<EntryBuffer>,
}

impl MemorySink {
    pub fn new(max_entries: usize) -> Self {
        Self {
            buffer: Mutex::new(EntryBuffer::new(max_entries)),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn append(&self, record: ScanRecord) -> Result<LogEntry, AuditError> {
        let mut buffer = self.buffer.lock();
        let entry = buffer.stage(record);
        buffer.commit(entry.clone());
        Ok(entry)
    }

    fn recent(&self, limit: usize) -> Result<Vec<LogEntry>, AuditError> {
        Ok(self.buffer.lock().recent(limit))
    }
}
