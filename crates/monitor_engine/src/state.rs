//! Durable per-hostname endpoint records.
//!
//! Each target owns `<output-dir>/latest_endpoints/<key>.txt`, a flat list of
//! every endpoint ever observed for that hostname, one per line.

use std::path::{Path, PathBuf};

use monitor_core::{merge, parse_record, render_record, EndpointSet, TargetKey};
use monitor_logging::{monitor_debug, monitor_warn};

use crate::persist::{AtomicFileWriter, PersistError};

pub const STATE_DIR_NAME: &str = "latest_endpoints";
const RECORD_EXTENSION: &str = "txt";

#[derive(Debug, Clone)]
pub struct StateStore {
    writer: AtomicFileWriter,
}

impl StateStore {
    /// Store rooted at `<output_dir>/latest_endpoints`.
    pub fn new(output_dir: &Path) -> Self {
        Self::at(output_dir.join(STATE_DIR_NAME))
    }

    /// Store keeping records directly in `dir`.
    pub fn at(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn record_path(&self, key: &TargetKey) -> PathBuf {
        self.writer.path_of(&record_filename(key))
    }

    /// Endpoints stored for `key`. A missing, unreadable or non-UTF-8 record
    /// is treated as empty state.
    pub fn load(&self, key: &TargetKey) -> EndpointSet {
        match self.writer.read(&record_filename(key)) {
            Ok(Some(content)) => {
                let endpoints = parse_record(&content);
                monitor_debug!("Loaded {} stored endpoints for {}", endpoints.len(), key);
                endpoints
            }
            Ok(None) => EndpointSet::new(),
            Err(err) => {
                monitor_warn!(
                    "Ignoring unreadable state record {:?}: {}",
                    self.record_path(key),
                    err
                );
                EndpointSet::new()
            }
        }
    }

    /// Replaces the record for `key` with `old` plus whatever `new` adds and
    /// returns the stored set. The write is atomic; on error the previous
    /// record is left untouched.
    pub fn persist(
        &self,
        key: &TargetKey,
        old: &EndpointSet,
        new: &EndpointSet,
    ) -> Result<EndpointSet, PersistError> {
        let merged = merge(old, new);
        let path = self
            .writer
            .write(&record_filename(key), &render_record(&merged))?;
        monitor_debug!("Stored {} endpoints at {:?}", merged.len(), path);
        Ok(merged)
    }
}

fn record_filename(key: &TargetKey) -> String {
    format!("{key}.{RECORD_EXTENSION}")
}
