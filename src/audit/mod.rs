//! Scan audit subsystem.
//!
//! # Data Flow
//! ```text
//! POST /scan → ScanRecord
//!     → AuditLog::submit (spawn_blocking, not awaited by the handler)
//!     → AuditSink::append (MemorySink ring or file.rs JSON array)
//!     → broadcast → /ws/logs subscribers
//! ```
//!
//! # Design Decisions
//! - A storage failure never fails a scan; it is logged and counted
//! - Live subscribers only see entries that were actually stored
//! - Slow subscribers lag and skip rather than block the writer

pub mod file;
pub mod record;
pub mod sink;

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{AuditBackend, AuditConfig};
use crate::observability::metrics;

pub use file::JsonFileSink;
pub use record::{LogEntry, ScanRecord};
pub use sink::{AuditError, AuditSink, MemorySink};

/// Entries buffered per live subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 256;

/// Front door to the configured sink plus the live entry feed.
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
    events: broadcast::Sender<LogEntry>,
}

impl AuditLog {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sink, events }
    }

    pub fn from_config(config: &AuditConfig) -> Result<Self, AuditError> {
        let sink: Arc<dyn AuditSink> = match config.backend {
            AuditBackend::File => Arc::new(JsonFileSink::open(&config.path, config.max_entries)?),
            AuditBackend::Memory => Arc::new(MemorySink::new(config.max_entries)),
        };
        Ok(Self::new(sink))
    }

    /// Store `record` off the request path.
    ///
    /// The returned handle only matters to tests; request handlers drop it.
    pub fn submit(&self, record: ScanRecord) -> JoinHandle<()> {
        let sink = self.sink.clone();
        let events = self.events.clone();

        tokio::task::spawn_blocking(move || match sink.append(record) {
            Ok(entry) => {
                tracing::debug!(id = entry.id, "Scan record stored");
                // No subscribers is not an error.
                let _ = events.send(entry);
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to store scan record");
                metrics::record_audit_failure();
            }
        })
    }

    /// Newest-first stored entries.
    pub fn recent(&self, limit: usize) -> Result<Vec<LogEntry>, AuditError> {
        self.sink.recent(limit)
    }

    /// Live feed of entries stored from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::sink::tests::record;

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn append(&self, _record: ScanRecord) -> Result<LogEntry, AuditError> {
            Err(std::io::Error::other("disk full").into())
        }

        fn recent(&self, _limit: usize) -> Result<Vec<LogEntry>, AuditError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_submit_stores_and_broadcasts() {
        let log = AuditLog::new(Arc::new(MemorySink::new(10)));
        let mut feed = log.subscribe();

        log.submit(record("hello")).await.unwrap();

        let pushed = feed.recv().await.unwrap();
        assert_eq!(pushed.record.payload, "hello");
        assert_eq!(log.recent(10).unwrap(), vec![pushed]);
    }

    #[tokio::test]
    async fn test_failed_append_is_swallowed() {
        let log = AuditLog::new(Arc::new(BrokenSink));
        let mut feed = log.subscribe();

        log.submit(record("lost")).await.unwrap();

        assert!(matches!(feed.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    }

    #[test]
    fn test_memory_backend_from_config() {
        let config = AuditConfig {
            backend: AuditBackend::Memory,
            ..AuditConfig::default()
        };
        let log = AuditLog::from_config(&config).unwrap();
        assert!(log.recent(5).unwrap().is_empty());
    }
}
