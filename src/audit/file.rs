//! JSON file audit sink.
//!
//! The file holds one JSON array, newest entry first, trimmed to
//! `max_entries`. Every append rewrites it through a temporary file and a
//! rename, so a crash leaves either the old or the new array on disk.
//!
//! An append costs O(`max_entries`): the whole array is serialized (compact,
//! one line) while the sink lock is held, so appends serialize behind each
//! other. Keep `max_entries` modest or use the memory backend for heavy load.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::audit::record::{LogEntry, ScanRecord};
use crate::audit::sink::{AuditError, AuditSink, EntryBuffer};

#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    buffer: Mutex<EntryBuffer>,
}

impl JsonFileSink {
    /// Open (or create) the log at `path`, loading any existing entries.
    pub fn open(path: impl Into<PathBuf>, max_entries: usize) -> Result<Self, AuditError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let entries = read_entries(&path)?;
        tracing::info!(
            path = %path.display(),
            entries = entries.len(),
            "Audit log opened"
        );

        Ok(Self {
            path,
            buffer: Mutex::new(EntryBuffer::from_entries(entries, max_entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonFileSink {
    fn append(&self, record: ScanRecord) -> Result<LogEntry, AuditError> {
        let mut buffer = self.buffer.lock();
        let entry = buffer.stage(record);

        // Memory only moves forward once the file does.
        write_entries(&self.path, &buffer.preview(&entry))?;
        buffer.commit(entry.clone());
        Ok(entry)
    }

    fn recent(&self, limit: usize) -> Result<Vec<LogEntry>, AuditError> {
        Ok(self.buffer.lock().recent(limit))
    }
}

fn read_entries(path: &Path) -> Result<Vec<LogEntry>, AuditError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_entries(path: &Path, entries: &[&LogEntry]) -> Result<(), AuditError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut writer = BufWriter::new(File::create(&tmp)?);
    serde_json::to_writer(&mut writer, entries)?;
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp, path)?;
    Ok(())
}
