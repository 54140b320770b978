//! A small client for writing log entries to [Google Cloud Logging](https://cloud.google.com/logging).
//!
//! # Usage
//!
//! Warning: Currently, this library only authenticates in the context of [workload identity](https://cloud.google.com/iam/docs/workload-identity-federation),
//! i.e. through the metadata server.
//!
//! Configure the client with the [`Builder`](logger::Builder::new) and call one of the write
//! methods on the resulting [`Client`](logger::Client). Every call results in exactly one
//! [`entries:write`](https://cloud.google.com/logging/docs/reference/v2/rest/v2/entries/write)
//! request carrying all the entries passed in. Nothing is buffered and nothing is retried: the
//! outcome of the request is what the caller gets back.
//!
//! ```no_run
//! use googlelog::logger::{monitored_resource, Builder};
//! use google_logging2::api::LogEntry;
//! use std::collections::HashMap;
//!
//! # async fn run() -> Result<(), googlelog::error::Error> {
//! let client = Builder::new("skills_audit").build();
//! let entry = LogEntry {
//!     text_payload: Some("hello".to_string()),
//!     ..Default::default()
//! };
//! client
//!     .info(vec![entry], monitored_resource("global", HashMap::new()))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
/// Googlelog Error types
pub mod error;

/// The client and its builder
pub mod logger;

/// HTTP plumbing towards the metadata server and the Google Logging API
pub mod shipper;

pub use google_logging2::api::{LogEntry, MonitoredResource, WriteLogEntriesRequest};
