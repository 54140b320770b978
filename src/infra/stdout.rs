use super::cloud_logging::{log_entries, to_monitored_resource};
use crate::domain::{Entry, LogBackend, Resource};
use async_trait::async_trait;
use googlelog::logger::{construct_request, LogSeverity};
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StdoutError {
    #[error("could not serialize log entries: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not write log entries: {0}")]
    Io(#[from] io::Error),
}

/// A [LogBackend] that prints every submission as one line of JSON, shaped like the body of an
/// `entries:write` call. For setups where an agent picks up the process output and ships it.
pub struct StdoutBackend<W = io::Stdout> {
    log_name: String,
    out: Mutex<W>,
}

impl StdoutBackend<io::Stdout> {
    pub fn stdout(log_name: impl Into<String>) -> Self {
        Self::new(log_name, io::stdout())
    }
}

impl<W: Write + Send> StdoutBackend<W> {
    pub fn new(log_name: impl Into<String>, out: W) -> Self {
        StdoutBackend {
            log_name: log_name.into(),
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self, severity: LogSeverity, entries: Vec<Entry>, resource: &Resource) -> Result<(), StdoutError> {
        let request = construct_request(
            self.log_name.clone(),
            severity,
            log_entries(entries),
            to_monitored_resource(resource),
        );
        let mut request = serde_json::to_value(&request)?;
        drop_nulls(&mut request);
        let mut line = serde_json::to_vec(&request)?;
        line.push(b'\n');

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(&line)?;
        out.flush()?;
        Ok(())
    }
}

// Unset fields of the request types serialize as `null`. Readers of the lines don't need them.
fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_nulls),
        _ => {}
    }
}

impl<W> fmt::Debug for StdoutBackend<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdoutBackend")
            .field("log_name", &self.log_name)
            .finish()
    }
}

#[async_trait]
impl<W: Write + Send> LogBackend for StdoutBackend<W> {
    type Error = StdoutError;

    async fn submit_info(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), StdoutError> {
        self.submit(LogSeverity::Info, entries, resource)
    }

    async fn submit_warning(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), StdoutError> {
        self.submit(LogSeverity::Warning, entries, resource)
    }

    async fn submit_error(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), StdoutError> {
        self.submit(LogSeverity::Error, entries, resource)
    }
}
