//! Failure log: where the fail-soft path reports what went wrong.
//!
//! When a conversion falls back to the original bytes the caller still gets a
//! valid PDF, so the failure would otherwise be invisible. The pipeline hands
//! a [`FailureRecord`] to the injected [`FailureLog`] exactly once per
//! fallback. The log is owned by the hosting process, not by the pipeline.

use chrono::{DateTime, SecondsFormat, Utc};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, warn};

/// One fallback event.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub timestamp: DateTime<Utc>,
    /// Display form of the top-level error.
    pub message: String,
    /// Display forms of the `source()` chain, outermost first.
    pub causes: Vec<String>,
    /// Free-form request context (input size, page spec, theme).
    pub context: String,
    /// Captured backtrace, empty unless `RUST_BACKTRACE` is enabled.
    pub backtrace: String,
}

impl FailureRecord {
    pub fn new(err: &(dyn std::error::Error + 'static), context: impl Into<String>) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        let backtrace = Backtrace::capture();
        let backtrace = match backtrace.status() {
            BacktraceStatus::Captured => backtrace.to_string(),
            _ => String::new(),
        };

        Self {
            timestamp: Utc::now(),
            message: err.to_string(),
            causes,
            context: context.into(),
            backtrace,
        }
    }

    /// Render as a block of text lines for an append-only log file.
    pub fn to_log_entry(&self) -> String {
        let mut entry = format!(
            "[{}] conversion failed: {}\n  context: {}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message,
            self.context
        );
        for cause in &self.causes {
            entry.push_str(&format!("  caused by: {}\n", cause));
        }
        if !self.backtrace.is_empty() {
            entry.push_str("  backtrace:\n");
            for line in self.backtrace.lines() {
                entry.push_str("    ");
                entry.push_str(line);
                entry.push('\n');
            }
        }
        entry
    }
}

/// Receives fallback events. Implementations must not panic.
pub trait FailureLog: Send + Sync {
    fn record(&self, record: &FailureRecord);
}

/// Emits each record as a `tracing` error event. (default)
#[derive(Debug, Default)]
pub struct TracingFailureLog;

impl FailureLog for TracingFailureLog {
    fn record(&self, record: &FailureRecord) {
        error!(
            context = %record.context,
            causes = ?record.causes,
            "Conversion failed, returning original document: {}",
            record.message
        );
    }
}

/// Appends each record to a text file, creating it on first use.
///
/// Write errors are logged and swallowed: a broken log file must not turn a
/// soft failure into a hard one.
#[derive(Debug)]
pub struct FileFailureLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileFailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())
    }
}

impl FailureLog for FileFailureLog {
    fn record(&self, record: &FailureRecord) {
        if let Err(e) = self.append(&record.to_log_entry()) {
            warn!(
                "Could not append to failure log '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}
